//! Value codec: typed values to tagged strings and back.
//!
//! Every entry carries a tag chain such as `i`, `64s` or `C~r`. Each tag is a
//! pair of inverse transformations:
//!
//! | Symbol | Encode                 | Decode                        |
//! |--------|------------------------|-------------------------------|
//! | `i`    | integer to decimal     | decimal to integer            |
//! | `f`    | float to text          | text to float                 |
//! | `r`    | value to literal       | literal to value              |
//! | `s`    | string to UTF-8 bytes  | UTF-8 bytes to string         |
//! | `b`    | UTF-8 bytes to string  | string to bytes               |
//! | `32`   | bytes to base32        | base32 to bytes               |
//! | `64`   | bytes to base64        | base64 to bytes               |
//! | `p`    | value to pickle bytes  | pickle bytes to value         |
//! | `C<g>` | none                   | none (joins wrapped lines)    |
//!
//! Decoding starts from the payload string and applies tags left to right.
//! Encoding applies them right to left, ending in a string.
//!
//! ## Examples
//!
//! ```rust
//! use plain_config::codec::{decode_value, encode_value};
//! use plain_config::{ConfigOptions, TrustMode, Value};
//!
//! let options = ConfigOptions::new();
//! let (chain, payload) = encode_value("port", &Value::from(8080), &options).unwrap();
//! assert_eq!(chain.to_string(), "i");
//! assert_eq!(payload, "8080");
//!
//! let back = decode_value(&chain, &payload, TrustMode::Restrictive).unwrap();
//! assert_eq!(back, Value::from(8080));
//! ```

use crate::literal::{format_float, parse_literal, to_literal};
use crate::options::{BytesEncoding, ConfigOptions, TrustMode};
use crate::pickle::{pickle, unpickle};
use crate::{Error, Result, Value};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use data_encoding::BASE32;
use num_bigint::BigInt;
use std::fmt;
use tracing::warn;

/// A single step of a tag chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    Int,
    Float,
    Literal,
    Str,
    Utf8Bytes,
    Base32,
    Base64,
    Pickle,
    /// Wrapped value; the glyph ends every physical line but the last.
    Continuation(char),
}

/// Symbol table of the fixed-width tags. `C<glyph>` is handled apart.
const SYMBOLS: [(&str, Tag); 8] = [
    ("i", Tag::Int),
    ("f", Tag::Float),
    ("r", Tag::Literal),
    ("s", Tag::Str),
    ("b", Tag::Utf8Bytes),
    ("32", Tag::Base32),
    ("64", Tag::Base64),
    ("p", Tag::Pickle),
];

impl Tag {
    /// Transforms a value one step towards its line form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Custom`] if the value has the wrong type for the tag.
    pub fn encode(self, value: Value) -> Result<Value> {
        match (self, value) {
            (Tag::Int, Value::Int(i)) => Ok(Value::Str(i.to_string())),
            (Tag::Int, Value::BigInt(bi)) => Ok(Value::Str(bi.to_string())),
            (Tag::Float, Value::Float(f)) => Ok(Value::Str(format_float(f))),
            (Tag::Literal, value) => to_literal(&value).map(Value::Str),
            (Tag::Str, Value::Str(s)) => Ok(Value::Bytes(s.into_bytes())),
            (Tag::Utf8Bytes, Value::Bytes(b)) => String::from_utf8(b)
                .map(Value::Str)
                .map_err(|e| Error::custom(format!("bytes are not UTF-8: {}", e))),
            (Tag::Base32, Value::Bytes(b)) => Ok(Value::Str(BASE32.encode(&b))),
            (Tag::Base64, Value::Bytes(b)) => Ok(Value::Str(STANDARD.encode(&b))),
            (Tag::Pickle, value) => pickle(&value).map(Value::Bytes),
            (Tag::Continuation(_), value) => Ok(value),
            (tag, value) => Err(Error::custom(format!(
                "tag `{}` cannot encode a {} value",
                tag,
                value.type_name()
            ))),
        }
    }

    /// Transforms a value one step away from its line form.
    ///
    /// `s` and `b` leave values they cannot convert unchanged, with a
    /// warning. `p` refuses to run in restrictive mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedValue`] when the input does not parse under
    /// the tag, and [`Error::UnsafeObject`] when unpickling fails or is not
    /// trusted.
    pub fn decode(self, value: Value, trust: TrustMode) -> Result<Value> {
        match self {
            Tag::Int => parse_int(text_of(&value, self)?),
            Tag::Float => parse_float(text_of(&value, self)?),
            Tag::Literal => parse_literal(text_of(&value, self)?),
            Tag::Str => match value {
                Value::Bytes(b) => String::from_utf8(b)
                    .map(Value::Str)
                    .map_err(|e| Error::malformed(format!("invalid UTF-8: {}", e))),
                Value::Int(i) => Ok(Value::Str(i.to_string())),
                Value::BigInt(bi) => Ok(Value::Str(bi.to_string())),
                other => {
                    warn!(kind = other.type_name(), "cannot convert value to a string");
                    Ok(other)
                }
            },
            Tag::Utf8Bytes => match value {
                Value::Str(s) => Ok(Value::Bytes(s.into_bytes())),
                other => {
                    warn!(kind = other.type_name(), "cannot convert value to bytes");
                    Ok(other)
                }
            },
            Tag::Base32 => BASE32
                .decode(raw_of(&value, self)?)
                .map(Value::Bytes)
                .map_err(|e| Error::malformed(format!("invalid base32: {}", e))),
            Tag::Base64 => STANDARD
                .decode(raw_of(&value, self)?)
                .map(Value::Bytes)
                .map_err(|e| Error::malformed(format!("invalid base64: {}", e))),
            Tag::Pickle => {
                if !trust.allows_pickle() {
                    return Err(Error::unsafe_object(
                        "pickled value refused in restrictive mode",
                    ));
                }
                unpickle(raw_of(&value, self)?)
            }
            Tag::Continuation(_) => Ok(value),
        }
    }
}

fn text_of(value: &Value, tag: Tag) -> Result<&str> {
    match value {
        Value::Str(s) => Ok(s),
        Value::Bytes(b) => std::str::from_utf8(b)
            .map_err(|e| Error::malformed(format!("tag `{}` input is not UTF-8: {}", tag, e))),
        other => Err(Error::malformed(format!(
            "tag `{}` cannot decode a {} value",
            tag,
            other.type_name()
        ))),
    }
}

fn raw_of(value: &Value, tag: Tag) -> Result<&[u8]> {
    match value {
        Value::Str(s) => Ok(s.as_bytes()),
        Value::Bytes(b) => Ok(b),
        other => Err(Error::malformed(format!(
            "tag `{}` cannot decode a {} value",
            tag,
            other.type_name()
        ))),
    }
}

/// Parses a decimal integer. Surrounding whitespace, a sign and `_` between
/// digits are accepted.
fn parse_int(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let well_formed = !digits.is_empty()
        && !digits.starts_with('_')
        && !digits.ends_with('_')
        && !digits.contains("__")
        && digits.bytes().all(|b| b.is_ascii_digit() || b == b'_');
    if !well_formed {
        return Err(Error::malformed(format!("invalid integer {:?}", text)));
    }
    let magnitude = BigInt::parse_bytes(digits.replace('_', "").as_bytes(), 10)
        .ok_or_else(|| Error::malformed(format!("invalid integer {:?}", text)))?;
    Ok(Value::from_bigint(if negative {
        -magnitude
    } else {
        magnitude
    }))
}

fn parse_float(text: &str) -> Result<Value> {
    text.trim()
        .parse::<f64>()
        .map(Value::Float)
        .map_err(|e| Error::malformed(format!("invalid float {:?}: {}", text, e)))
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Continuation(glyph) => write!(f, "C{}", glyph),
            tag => {
                let symbol = SYMBOLS
                    .iter()
                    .find(|(_, t)| t == tag)
                    .map_or("?", |(s, _)| *s);
                f.write_str(symbol)
            }
        }
    }
}

/// An ordered sequence of tags, as written between `/` and `=`.
///
/// # Examples
///
/// ```rust
/// use plain_config::codec::{Tag, TagChain};
///
/// let chain = TagChain::parse("C~64s").unwrap();
/// assert_eq!(chain.continuation(), Some('~'));
/// assert_eq!(chain.tags(), &[Tag::Continuation('~'), Tag::Base64, Tag::Str]);
/// assert_eq!(chain.to_string(), "C~64s");
///
/// assert!(TagChain::parse("x").is_err());
/// assert!(TagChain::parse("iC~").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default, Hash)]
pub struct TagChain(Vec<Tag>);

impl TagChain {
    #[must_use]
    pub fn new(tags: Vec<Tag>) -> Self {
        TagChain(tags)
    }

    /// Parses the tag characters of a line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedValue`] for unknown symbols or a
    /// continuation tag that is not first.
    pub fn parse(symbols: &str) -> Result<Self> {
        let mut tags = Vec::new();
        let mut rest = symbols;
        if let Some(after) = rest.strip_prefix('C') {
            let mut chars = after.chars();
            let glyph = chars
                .next()
                .ok_or_else(|| Error::malformed("continuation tag without a glyph"))?;
            tags.push(Tag::Continuation(glyph));
            rest = chars.as_str();
        }
        while !rest.is_empty() {
            let (symbol, tag) = SYMBOLS
                .iter()
                .find(|(symbol, _)| rest.starts_with(symbol))
                .ok_or_else(|| {
                    Error::malformed(format!("unknown tag at {:?} in {:?}", rest, symbols))
                })?;
            tags.push(*tag);
            rest = &rest[symbol.len()..];
        }
        Ok(TagChain(tags))
    }

    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The glyph of a leading continuation tag, if any.
    #[must_use]
    pub fn continuation(&self) -> Option<char> {
        match self.0.first() {
            Some(Tag::Continuation(glyph)) => Some(*glyph),
            _ => None,
        }
    }

    /// Returns the chain with a continuation tag in front.
    #[must_use]
    pub fn with_continuation(&self, glyph: char) -> Self {
        let mut tags = Vec::with_capacity(self.0.len() + 1);
        tags.push(Tag::Continuation(glyph));
        tags.extend(self.without_continuation().0);
        TagChain(tags)
    }

    /// Returns the chain with any continuation tag removed.
    #[must_use]
    pub fn without_continuation(&self) -> Self {
        TagChain(
            self.0
                .iter()
                .copied()
                .filter(|tag| !matches!(tag, Tag::Continuation(_)))
                .collect(),
        )
    }

    /// Whether decoding this chain unpickles.
    #[must_use]
    pub fn requires_trust(&self) -> bool {
        self.0.contains(&Tag::Pickle)
    }
}

impl fmt::Display for TagChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tag in &self.0 {
            write!(f, "{}", tag)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for TagChain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TagChain::parse(s)
    }
}

/// Whether a string can be written as a plain, untagged payload.
#[must_use]
pub fn is_line_safe(s: &str) -> bool {
    !s.chars().any(char::is_control)
}

/// Picks the tag chain for a value; the first matching rule wins.
///
/// 1. line-safe string: no tags
/// 2. integer: `i`
/// 3. float: `f`
/// 4. `None`, bool, or literal-safe container: `r`
/// 5. bytes: `32`, or the shortest form under [`BytesEncoding::Shortest`]
/// 6. other string: `64s`
/// 7. anything else: `64p`, permissive mode only
///
/// # Errors
///
/// Returns [`Error::UnencodableValue`] when rule 7 applies in restrictive mode.
///
/// # Examples
///
/// ```rust
/// use plain_config::codec::choose_chain;
/// use plain_config::{ConfigOptions, Error, Value};
///
/// let options = ConfigOptions::new();
/// let chain = |v: Value| choose_chain("k", &v, &options).unwrap().to_string();
/// assert_eq!(chain(Value::from("plain")), "");
/// assert_eq!(chain(Value::from("two\nlines")), "64s");
/// assert_eq!(chain(Value::from(true)), "r");
/// assert_eq!(chain(Value::from(vec![1u8, 2])), "32");
///
/// let object = Value::object(&("opaque", 1)).unwrap();
/// assert!(matches!(
///     choose_chain("k", &object, &options),
///     Err(Error::UnencodableValue { .. })
/// ));
/// ```
pub fn choose_chain(key: &str, value: &Value, options: &ConfigOptions) -> Result<TagChain> {
    let tags = match value {
        Value::Str(s) if is_line_safe(s) => vec![],
        Value::Int(_) | Value::BigInt(_) => vec![Tag::Int],
        Value::Float(_) => vec![Tag::Float],
        Value::None | Value::Bool(_) => vec![Tag::Literal],
        v if v.is_container() && v.is_literal_safe() => vec![Tag::Literal],
        Value::Bytes(b) => vec![bytes_tag(b, options.bytes)],
        Value::Str(_) => vec![Tag::Base64, Tag::Str],
        other => {
            if !options.trust.allows_pickle() {
                return Err(Error::unencodable(
                    key,
                    &format!(
                        "a {} value needs pickling, which restrictive mode refuses",
                        other.type_name()
                    ),
                ));
            }
            vec![Tag::Base64, Tag::Pickle]
        }
    };
    Ok(TagChain(tags))
}

fn bytes_tag(bytes: &[u8], encoding: BytesEncoding) -> Tag {
    if encoding == BytesEncoding::Base32 {
        return Tag::Base32;
    }
    let utf8_len = std::str::from_utf8(bytes)
        .ok()
        .filter(|s| is_line_safe(s))
        .map(str::len);
    let base32_len = BASE32.encode_len(bytes.len());
    let base64_len = STANDARD.encode(bytes).len();

    let mut best = (Tag::Base32, base32_len);
    if let Some(len) = utf8_len {
        if len <= best.1 {
            best = (Tag::Utf8Bytes, len);
        }
    }
    if base64_len < best.1 {
        best = (Tag::Base64, base64_len);
    }
    best.0
}

/// Encodes a value into its tag chain and payload string.
///
/// The chain never holds a continuation tag; wrapping is left to
/// [`wrap`](crate::line::wrap).
///
/// # Errors
///
/// Returns [`Error::UnencodableValue`] for values that need pickling in
/// restrictive mode, or if a tag fails to apply.
pub fn encode_value(key: &str, value: &Value, options: &ConfigOptions) -> Result<(TagChain, String)> {
    let chain = choose_chain(key, value, options)?;
    let mut current = value.clone();
    for tag in chain.tags().iter().rev() {
        current = tag
            .encode(current)
            .map_err(|e| Error::unencodable(key, &e.to_string()))?;
    }
    match current {
        Value::Str(payload) => Ok((chain, payload)),
        other => Err(Error::unencodable(
            key,
            &format!("tag chain `{}` ended in a {} value", chain, other.type_name()),
        )),
    }
}

/// Decodes a payload by applying its tags left to right.
///
/// A continuation tag is skipped; the payload must already be joined.
///
/// # Errors
///
/// Returns the error of the first tag that fails.
pub fn decode_value(chain: &TagChain, payload: &str, trust: TrustMode) -> Result<Value> {
    chain
        .tags()
        .iter()
        .try_fold(Value::Str(payload.to_string()), |value, tag| {
            tag.decode(value, trust)
        })
}
