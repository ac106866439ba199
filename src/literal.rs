//! Literal syntax for the `/r` tag.
//!
//! Values tagged `r` are written in a small literal grammar (quoted strings,
//! byte strings, numbers, `True`, `False`, `None`, lists, tuples, dicts and
//! sets) and read back by [`parse_literal`], a recursive-descent parser that
//! only knows that grammar. Names, calls, operators and attribute access are
//! refused outright, so untrusted input can never do more than build a
//! [`Value`].
//!
//! ## Examples
//!
//! ```rust
//! use plain_config::literal::{parse_literal, to_literal};
//! use plain_config::Value;
//!
//! let value = parse_literal("{'retries': 3, 'hosts': ('a', 'b')}").unwrap();
//! assert_eq!(value.get("retries"), Some(&Value::Int(3)));
//! assert_eq!(to_literal(&value).unwrap(), "{'retries': 3, 'hosts': ('a', 'b')}");
//!
//! assert!(parse_literal("__import__('os')").is_err());
//! assert!(parse_literal("1 + 1").is_err());
//! ```

use crate::{Error, Result, Value};
use num_bigint::BigInt;
use std::fmt::Write;

/// Deepest container nesting accepted by the parser and the writer.
pub const MAX_LITERAL_DEPTH: usize = 64;

/// Renders a value in literal syntax.
///
/// # Errors
///
/// Returns an error for values [`Value::is_literal_safe`] rejects.
pub fn to_literal(value: &Value) -> Result<String> {
    if !value.is_literal_safe() {
        return Err(Error::custom(format!(
            "{} value has no literal spelling",
            value.type_name()
        )));
    }
    let mut output = String::with_capacity(32);
    write_literal(&mut output, value);
    Ok(output)
}

fn write_literal(output: &mut String, value: &Value) {
    match value {
        Value::None => output.push_str("None"),
        Value::Bool(true) => output.push_str("True"),
        Value::Bool(false) => output.push_str("False"),
        Value::Int(i) => output.push_str(&i.to_string()),
        Value::BigInt(bi) => output.push_str(&bi.to_string()),
        Value::Float(f) => output.push_str(&format_float(*f)),
        Value::Str(s) => write_str(output, s),
        Value::Bytes(b) => write_bytes(output, b),
        Value::List(items) => write_seq(output, '[', ']', items),
        Value::Tuple(items) => {
            write_seq(output, '(', ')', items);
            if items.len() == 1 {
                // (x,) rather than (x)
                output.insert(output.len() - 1, ',');
            }
        }
        Value::Set(items) if items.is_empty() => output.push_str("set()"),
        Value::Set(items) => write_seq(output, '{', '}', items),
        Value::Dict(entries) => {
            output.push('{');
            for (i, (k, v)) in entries.iter().enumerate() {
                if i > 0 {
                    output.push_str(", ");
                }
                write_literal(output, k);
                output.push_str(": ");
                write_literal(output, v);
            }
            output.push('}');
        }
        // rejected by is_literal_safe
        Value::Object(_) => output.push_str("None"),
    }
}

fn write_seq(output: &mut String, open: char, close: char, items: &[Value]) {
    output.push(open);
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            output.push_str(", ");
        }
        write_literal(output, item);
    }
    output.push(close);
}

/// Shortest spelling that reads back to the same `f64`, always with a `.` or
/// an exponent so it never reads back as an integer.
pub(crate) fn format_float(f: f64) -> String {
    format!("{:?}", f)
}

fn pick_quote(has_single: bool, has_double: bool) -> char {
    if has_single && !has_double {
        '"'
    } else {
        '\''
    }
}

fn write_str(output: &mut String, s: &str) {
    let quote = pick_quote(s.contains('\''), s.contains('"'));
    output.push(quote);
    for ch in s.chars() {
        match ch {
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            c if c == quote => {
                output.push('\\');
                output.push(c);
            }
            c if c.is_control() || c == '\u{2028}' || c == '\u{2029}' => {
                let code = c as u32;
                if code <= 0xff {
                    let _ = write!(output, "\\x{:02x}", code);
                } else {
                    let _ = write!(output, "\\u{:04x}", code);
                }
            }
            c => output.push(c),
        }
    }
    output.push(quote);
}

fn write_bytes(output: &mut String, bytes: &[u8]) {
    let quote = pick_quote(bytes.contains(&b'\''), bytes.contains(&b'"'));
    output.push('b');
    output.push(quote);
    for &byte in bytes {
        match byte {
            b'\\' => output.push_str("\\\\"),
            b'\n' => output.push_str("\\n"),
            b'\r' => output.push_str("\\r"),
            b'\t' => output.push_str("\\t"),
            b if b as char == quote => {
                output.push('\\');
                output.push(quote);
            }
            0x20..=0x7e => output.push(byte as char),
            _ => {
                let _ = write!(output, "\\x{:02x}", byte);
            }
        }
    }
    output.push(quote);
}

/// Parses a literal, refusing anything that is not plain data.
///
/// # Errors
///
/// Returns [`Error::MalformedValue`] with the offending byte offset.
pub fn parse_literal(input: &str) -> Result<Value> {
    let mut parser = LiteralParser::new(input);
    let value = parser.parse_value(0)?;
    parser.skip_whitespace();
    if !parser.at_end() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(value)
}

/// Text or byte string under construction; escapes produce code units.
enum StrKind {
    Text,
    Bytes,
}

struct LiteralParser<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> LiteralParser<'a> {
    fn new(input: &'a str) -> Self {
        LiteralParser { input, position: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if matches!(ch, ' ' | '\t' | '\n' | '\r' | '\x0c') {
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn error(&self, msg: &str) -> Error {
        Error::malformed(format!("literal: {} at offset {}", msg, self.position))
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.next_char() {
            Some(ch) if ch == expected => Ok(()),
            _ => Err(self.error(&format!("expected '{}'", expected))),
        }
    }

    fn parse_value(&mut self, depth: usize) -> Result<Value> {
        if depth > MAX_LITERAL_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.skip_whitespace();
        match self.peek_char() {
            None => Err(self.error("unexpected end of literal")),
            Some('[') => self.parse_list(depth),
            Some('(') => self.parse_paren(depth),
            Some('{') => self.parse_brace(depth),
            Some('\'') | Some('"') => self.parse_string_run(String::new()),
            Some('-') | Some('+') => {
                let negative = self.next_char() == Some('-');
                self.skip_whitespace();
                match self.peek_char() {
                    Some(ch) if ch.is_ascii_digit() || ch == '.' => self.parse_number(negative),
                    _ => Err(self.error("sign must be followed by a number")),
                }
            }
            Some(ch) if ch.is_ascii_digit() || ch == '.' => self.parse_number(false),
            Some(ch) if ch.is_alphabetic() || ch == '_' => self.parse_name(),
            Some(ch) => Err(self.error(&format!("unexpected character {:?}", ch))),
        }
    }

    fn read_identifier(&mut self) -> &'a str {
        let start = self.position;
        while let Some(ch) = self.peek_char() {
            if ch.is_alphanumeric() || ch == '_' {
                self.next_char();
            } else {
                break;
            }
        }
        &self.input[start..self.position]
    }

    fn parse_name(&mut self) -> Result<Value> {
        let start = self.position;
        let name = self.read_identifier();
        if matches!(self.peek_char(), Some('\'') | Some('"')) && is_string_prefix(name) {
            return self.parse_string_run(name.to_string());
        }
        match name {
            "None" => Ok(Value::None),
            "True" => Ok(Value::Bool(true)),
            "False" => Ok(Value::Bool(false)),
            "set" if self.eat_empty_call() => Ok(Value::Set(Vec::new())),
            _ => {
                self.position = start;
                Err(self.error(&format!("name `{}` is not a literal", name)))
            }
        }
    }

    /// Consumes `()` with optional whitespace around and inside it, or
    /// leaves the position untouched.
    fn eat_empty_call(&mut self) -> bool {
        let checkpoint = self.position;
        self.skip_whitespace();
        if self.peek_char() == Some('(') {
            self.next_char();
            self.skip_whitespace();
            if self.peek_char() == Some(')') {
                self.next_char();
                return true;
            }
        }
        self.position = checkpoint;
        false
    }

    fn parse_number(&mut self, negative: bool) -> Result<Value> {
        let start = self.position;
        let mut prev = '\0';
        while let Some(ch) = self.peek_char() {
            let exponent_sign = (ch == '+' || ch == '-')
                && (prev == 'e' || prev == 'E')
                && !self.input[start..self.position].starts_with("0x")
                && !self.input[start..self.position].starts_with("0X");
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || exponent_sign {
                prev = ch;
                self.next_char();
            } else {
                break;
            }
        }
        let token = &self.input[start..self.position];
        if token.contains("__") || token.ends_with('_') || token.starts_with('_') {
            return Err(self.error("misplaced '_' in number"));
        }
        if token.ends_with('j') || token.ends_with('J') {
            return Err(self.error("complex numbers are not supported"));
        }
        let digits = token.replace('_', "");

        let lower = digits.to_ascii_lowercase();
        let radix_digits = [("0x", 16), ("0o", 8), ("0b", 2)]
            .iter()
            .find_map(|(prefix, radix)| lower.strip_prefix(prefix).map(|rest| (rest, *radix)));
        if let Some((rest, radix)) = radix_digits {
            return self.integer_value(rest, radix, negative);
        }

        if lower.contains('.') || lower.contains('e') {
            let parsed: f64 = digits
                .parse()
                .map_err(|_| self.error(&format!("invalid float {:?}", token)))?;
            return Ok(Value::Float(if negative { -parsed } else { parsed }));
        }

        if digits.len() > 1 && digits.starts_with('0') && digits.bytes().any(|b| b != b'0') {
            return Err(self.error("leading zeros in decimal integer"));
        }
        self.integer_value(&digits, 10, negative)
    }

    fn integer_value(&self, digits: &str, radix: u32, negative: bool) -> Result<Value> {
        if digits.is_empty() {
            return Err(self.error("missing digits"));
        }
        let magnitude = BigInt::parse_bytes(digits.as_bytes(), radix)
            .ok_or_else(|| self.error(&format!("invalid base-{} integer {:?}", radix, digits)))?;
        Ok(Value::from_bigint(if negative {
            -magnitude
        } else {
            magnitude
        }))
    }

    /// Parses one string and any adjacent ones, which concatenate.
    fn parse_string_run(&mut self, first_prefix: String) -> Result<Value> {
        let (kind, mut units) = self.parse_string(&first_prefix)?;
        loop {
            let checkpoint = self.position;
            self.skip_whitespace();
            let prefix = match self.peek_char() {
                Some('\'') | Some('"') => String::new(),
                Some(ch) if ch.is_alphabetic() => {
                    let name = self.read_identifier();
                    if is_string_prefix(name) && matches!(self.peek_char(), Some('\'') | Some('"'))
                    {
                        name.to_string()
                    } else {
                        self.position = checkpoint;
                        break;
                    }
                }
                _ => {
                    self.position = checkpoint;
                    break;
                }
            };
            let (next_kind, next_units) = self.parse_string(&prefix)?;
            if std::mem::discriminant(&next_kind) != std::mem::discriminant(&kind) {
                return Err(self.error("cannot mix bytes and text literals"));
            }
            units.extend(next_units);
        }

        match kind {
            StrKind::Text => {
                let mut text = String::with_capacity(units.len());
                for unit in units {
                    let ch = char::from_u32(unit)
                        .ok_or_else(|| self.error(&format!("invalid code point {:#x}", unit)))?;
                    text.push(ch);
                }
                Ok(Value::Str(text))
            }
            StrKind::Bytes => {
                let mut bytes = Vec::with_capacity(units.len());
                for unit in units {
                    let byte = u8::try_from(unit)
                        .map_err(|_| self.error("byte value out of range"))?;
                    bytes.push(byte);
                }
                Ok(Value::Bytes(bytes))
            }
        }
    }

    fn parse_string(&mut self, prefix: &str) -> Result<(StrKind, Vec<u32>)> {
        let lower = prefix.to_ascii_lowercase();
        let kind = if lower.contains('b') {
            StrKind::Bytes
        } else {
            StrKind::Text
        };
        let raw = lower.contains('r');

        let quote = match self.next_char() {
            Some(q @ '\'') | Some(q @ '"') => q,
            _ => return Err(self.error("expected quote")),
        };
        let triple: String = std::iter::repeat(quote).take(3).collect();
        let is_triple = self.rest().starts_with(&triple[..2]);
        if is_triple {
            self.position += 2;
        }

        let mut units = Vec::new();
        loop {
            if is_triple && self.rest().starts_with(&triple) {
                self.position += 3;
                break;
            }
            let ch = self
                .next_char()
                .ok_or_else(|| self.error("unterminated string"))?;
            if !is_triple && ch == quote {
                break;
            }
            if !is_triple && ch == '\n' {
                return Err(self.error("newline in single-quoted string"));
            }
            if matches!(kind, StrKind::Bytes) && !ch.is_ascii() {
                return Err(self.error("bytes literals may only contain ASCII characters"));
            }
            if ch != '\\' {
                units.push(ch as u32);
                continue;
            }

            let escaped = self
                .next_char()
                .ok_or_else(|| self.error("unterminated escape"))?;
            if raw {
                units.push('\\' as u32);
                units.push(escaped as u32);
                continue;
            }
            match escaped {
                '\n' => {}
                '\\' | '\'' | '"' => units.push(escaped as u32),
                'a' => units.push(0x07),
                'b' => units.push(0x08),
                'f' => units.push(0x0c),
                'n' => units.push(0x0a),
                'r' => units.push(0x0d),
                't' => units.push(0x09),
                'v' => units.push(0x0b),
                '0'..='7' => {
                    let mut code = escaped.to_digit(8).unwrap_or(0);
                    for _ in 0..2 {
                        match self.peek_char().and_then(|c| c.to_digit(8)) {
                            Some(digit) => {
                                code = code * 8 + digit;
                                self.next_char();
                            }
                            None => break,
                        }
                    }
                    units.push(code);
                }
                'x' => units.push(self.read_hex(2)?),
                'u' if matches!(kind, StrKind::Text) => units.push(self.read_hex(4)?),
                'U' if matches!(kind, StrKind::Text) => units.push(self.read_hex(8)?),
                'N' if matches!(kind, StrKind::Text) => {
                    return Err(self.error("named unicode escapes are not supported"));
                }
                other => {
                    units.push('\\' as u32);
                    units.push(other as u32);
                }
            }
        }
        Ok((kind, units))
    }

    fn read_hex(&mut self, count: usize) -> Result<u32> {
        let mut code = 0u32;
        for _ in 0..count {
            let digit = self
                .next_char()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error(&format!("expected {} hex digits", count)))?;
            code = code * 16 + digit;
        }
        Ok(code)
    }

    /// Parses comma-separated values up to `close`, allowing a trailing comma.
    fn parse_items(&mut self, close: char, depth: usize, mut items: Vec<Value>) -> Result<Vec<Value>> {
        loop {
            self.skip_whitespace();
            if self.peek_char() == Some(close) {
                self.next_char();
                return Ok(items);
            }
            items.push(self.parse_value(depth + 1)?);
            self.skip_whitespace();
            match self.next_char() {
                Some(',') => continue,
                Some(ch) if ch == close => return Ok(items),
                _ => return Err(self.error(&format!("expected ',' or '{}'", close))),
            }
        }
    }

    fn parse_list(&mut self, depth: usize) -> Result<Value> {
        self.expect('[')?;
        Ok(Value::List(self.parse_items(']', depth, Vec::new())?))
    }

    fn parse_paren(&mut self, depth: usize) -> Result<Value> {
        self.expect('(')?;
        self.skip_whitespace();
        if self.peek_char() == Some(')') {
            self.next_char();
            return Ok(Value::Tuple(Vec::new()));
        }
        let first = self.parse_value(depth + 1)?;
        self.skip_whitespace();
        match self.next_char() {
            // plain parentheses around a single value
            Some(')') => Ok(first),
            Some(',') => Ok(Value::Tuple(self.parse_items(')', depth, vec![first])?)),
            _ => Err(self.error("expected ',' or ')'")),
        }
    }

    fn parse_brace(&mut self, depth: usize) -> Result<Value> {
        self.expect('{')?;
        self.skip_whitespace();
        if self.peek_char() == Some('}') {
            self.next_char();
            return Ok(Value::Dict(Vec::new()));
        }
        let first = self.parse_value(depth + 1)?;
        self.skip_whitespace();
        if self.peek_char() == Some(':') {
            self.next_char();
            let value = self.parse_value(depth + 1)?;
            return self.parse_dict_rest(depth, first, value);
        }

        let mut members = Vec::new();
        for item in self.parse_set_items(depth, first)? {
            if !item.is_hashable() {
                return Err(self.error(&format!("unhashable {} in set", item.type_name())));
            }
            if !members.contains(&item) {
                members.push(item);
            }
        }
        Ok(Value::Set(members))
    }

    fn parse_set_items(&mut self, depth: usize, first: Value) -> Result<Vec<Value>> {
        match self.next_char() {
            Some('}') => Ok(vec![first]),
            Some(',') => self.parse_items('}', depth, vec![first]),
            _ => Err(self.error("expected ',' or '}'")),
        }
    }

    fn parse_dict_rest(&mut self, depth: usize, key: Value, value: Value) -> Result<Value> {
        let mut entries: Vec<(Value, Value)> = Vec::new();
        let mut pending = Some((key, value));
        loop {
            if let Some((key, value)) = pending.take() {
                if !key.is_hashable() {
                    return Err(self.error(&format!("unhashable {} as dict key", key.type_name())));
                }
                // later duplicates win, in the position of the first
                match entries.iter_mut().find(|(k, _)| *k == key) {
                    Some(entry) => entry.1 = value,
                    None => entries.push((key, value)),
                }
            }
            self.skip_whitespace();
            match self.next_char() {
                Some('}') => return Ok(Value::Dict(entries)),
                Some(',') => {}
                _ => return Err(self.error("expected ',' or '}'")),
            }
            self.skip_whitespace();
            if self.peek_char() == Some('}') {
                self.next_char();
                return Ok(Value::Dict(entries));
            }
            let key = self.parse_value(depth + 1)?;
            self.skip_whitespace();
            self.expect(':')?;
            let value = self.parse_value(depth + 1)?;
            pending = Some((key, value));
        }
    }
}

fn is_string_prefix(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "r" | "u" | "b" | "br" | "rb"
    )
}
