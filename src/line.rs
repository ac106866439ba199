//! Line protocol: the `key[/tags]=payload` grammar and continuation wrapping.
//!
//! A physical line is one of:
//!
//! - trivia: blank, or starting with `#` after optional whitespace
//! - an entry: `key=payload` or `key/tags=payload`
//! - anything else, which is kept as an invalid line
//!
//! A payload too long for the width budget is wrapped. The tag chain gets a
//! leading `C<glyph>` tag, where the glyph is the first one of the pool that
//! does not occur in the payload, and every physical line but the last ends
//! with the glyph:
//!
//! ```text
//! motd/C\64s=V2VsY29tZSB0byB0aGUgc3RhZ2luZyBjbHVzdGVyLgpNYWludGVuYW5jZSB3\
//! aW5kb3c6IFN1bmRheSAwMjowMC0wNDowMCBVVEMuCg==
//! ```

use crate::codec::TagChain;
use crate::{Error, Result};
use std::io::BufRead;
use tracing::debug;

/// A classified physical line.
#[derive(Clone, Debug, PartialEq)]
pub enum Line<'a> {
    /// Blank line or comment.
    Trivia,
    Entry {
        key: &'a str,
        chain: TagChain,
        payload: &'a str,
    },
    /// A line that does not follow the grammar. `key` is kept when the
    /// line had a well-formed key but unreadable tags.
    Invalid {
        key: Option<&'a str>,
        reason: String,
    },
}

/// Classifies one physical line, without its terminator.
///
/// # Examples
///
/// ```rust
/// use plain_config::line::{classify, Line};
///
/// assert_eq!(classify("  # comment"), Line::Trivia);
/// assert_eq!(classify(""), Line::Trivia);
/// match classify("port/i=8080") {
///     Line::Entry { key, chain, payload } => {
///         assert_eq!(key, "port");
///         assert_eq!(chain.to_string(), "i");
///         assert_eq!(payload, "8080");
///     }
///     other => panic!("unexpected {:?}", other),
/// }
/// assert!(matches!(classify("no equals sign"), Line::Invalid { key: None, .. }));
/// assert!(matches!(classify("k/zz=1"), Line::Invalid { key: Some("k"), .. }));
/// ```
#[must_use]
pub fn classify(line: &str) -> Line<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Line::Trivia;
    }
    let Some((head, payload)) = line.split_once('=') else {
        return Line::Invalid {
            key: None,
            reason: "missing '='".to_string(),
        };
    };
    let (key, tags) = head.split_once('/').unwrap_or((head, ""));
    if let Err(e) = validate_key(key) {
        return Line::Invalid {
            key: None,
            reason: e.to_string(),
        };
    }
    match TagChain::parse(tags) {
        Ok(chain) => Line::Entry {
            key,
            chain,
            payload,
        },
        Err(e) => Line::Invalid {
            key: Some(key),
            reason: e.to_string(),
        },
    }
}

/// Checks that a key can be written and read back by the line grammar.
///
/// # Errors
///
/// Returns [`Error::InvalidKey`] naming the broken rule.
///
/// # Examples
///
/// ```rust
/// use plain_config::line::validate_key;
///
/// assert!(validate_key("server.port").is_ok());
/// assert!(validate_key("a=b").is_err());
/// assert!(validate_key("a/b").is_err());
/// assert!(validate_key("#hidden").is_err());
/// assert!(validate_key(" lead").is_err());
/// assert!(validate_key("").is_err());
/// ```
pub fn validate_key(key: &str) -> Result<()> {
    let reason = if key.is_empty() {
        "key is empty"
    } else if key.contains('=') {
        "key contains '='"
    } else if key.contains('/') {
        "key contains '/'"
    } else if key.chars().any(char::is_control) {
        "key contains a control character"
    } else if key.starts_with(char::is_whitespace) {
        "key starts with whitespace"
    } else if key.starts_with('#') {
        "key starts with '#'"
    } else {
        return Ok(());
    };
    Err(Error::invalid_key(key, reason))
}

/// Renders an entry into physical lines of at most `width` characters.
///
/// A single line is used whenever the whole `key/tags=payload` line fits.
/// Otherwise the first glyph of `glyphs` absent from the payload is used to
/// wrap it. A key too long to leave room for the payload still gets one
/// payload character per line.
///
/// # Errors
///
/// Returns [`Error::GlyphExhaustion`] when every glyph occurs in the payload.
///
/// # Examples
///
/// ```rust
/// use plain_config::codec::TagChain;
/// use plain_config::line::wrap;
///
/// let lines = wrap("k", &TagChain::default(), "abcdefghij", 8, &['\\']).unwrap();
/// assert_eq!(lines, vec!["k/C\\=ab\\", "cdefghij"]);
///
/// let lines = wrap("k", &TagChain::default(), "abcdef", 8, &['\\']).unwrap();
/// assert_eq!(lines, vec!["k=abcdef"]);
/// ```
pub fn wrap(
    key: &str,
    chain: &TagChain,
    payload: &str,
    width: usize,
    glyphs: &[char],
) -> Result<Vec<String>> {
    let chain = chain.without_continuation();
    let single = render_line(key, &chain, payload);
    if single.chars().count() <= width {
        return Ok(vec![single]);
    }

    let glyph = glyphs
        .iter()
        .copied()
        .find(|g| !payload.contains(*g))
        .ok_or_else(|| Error::GlyphExhaustion {
            key: key.to_string(),
            pool: glyphs.iter().collect(),
        })?;
    debug!(key = %key, glyph = %glyph, "wrapping long value");

    let prefix = render_line(key, &chain.with_continuation(glyph), "");
    let chars: Vec<char> = payload.chars().collect();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut budget = width.saturating_sub(prefix.chars().count());
    let mut current = prefix;
    loop {
        let remaining = chars.len() - start;
        if remaining <= budget {
            current.extend(&chars[start..]);
            lines.push(current);
            return Ok(lines);
        }
        let take = budget.saturating_sub(1).max(1);
        current.extend(&chars[start..start + take]);
        current.push(glyph);
        lines.push(current);
        start += take;
        current = String::with_capacity(width);
        budget = width;
    }
}

fn render_line(key: &str, chain: &TagChain, payload: &str) -> String {
    if chain.is_empty() {
        format!("{}={}", key, payload)
    } else {
        format!("{}/{}={}", key, chain, payload)
    }
}

/// Reads physical lines from a buffered reader, stripping `\n` or `\r\n`.
pub struct LineReader<R> {
    reader: R,
    line_number: usize,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        LineReader {
            reader,
            line_number: 0,
        }
    }

    /// Number of the last line returned, starting at 1.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Returns the next line without its terminator, or `None` at the end.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if reading fails or the input is not UTF-8.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        self.line_number += 1;
        Ok(Some(line))
    }
}

/// One logical line: a physical line, or a wrapped entry joined back.
#[derive(Clone, Debug, PartialEq)]
pub struct Logical {
    /// First physical line number.
    pub line: usize,
    /// Physical lines joined with `\n`.
    pub raw: String,
    pub kind: LogicalKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LogicalKind {
    Trivia,
    /// An entry with its payload joined and the continuation tag removed.
    Entry {
        key: String,
        chain: TagChain,
        payload: String,
    },
    Invalid {
        key: Option<String>,
        reason: String,
    },
}

/// Reads the next logical line, absorbing continuation lines.
///
/// Each continuation line has one trailing glyph stripped; the first line
/// not ending in the glyph is the last chunk.
///
/// # Errors
///
/// Returns [`Error::TruncatedContinuation`] if the input ends before the last
/// chunk, and [`Error::Io`] on read failures.
///
/// # Examples
///
/// ```rust
/// use plain_config::line::{unwrap, LineReader, LogicalKind};
///
/// let mut reader = LineReader::new("k/C~i=12~\n34~\n5\nnext=1\n".as_bytes());
/// let logical = unwrap(&mut reader).unwrap().unwrap();
/// assert_eq!(logical.raw, "k/C~i=12~\n34~\n5");
/// match logical.kind {
///     LogicalKind::Entry { key, chain, payload } => {
///         assert_eq!(key, "k");
///         assert_eq!(chain.to_string(), "i");
///         assert_eq!(payload, "12345");
///     }
///     other => panic!("unexpected {:?}", other),
/// }
/// assert_eq!(reader.line_number(), 3);
/// ```
pub fn unwrap<R: BufRead>(reader: &mut LineReader<R>) -> Result<Option<Logical>> {
    let Some(first) = reader.next_line()? else {
        return Ok(None);
    };
    let line = reader.line_number();

    let kind = match classify(&first) {
        Line::Trivia => LogicalKind::Trivia,
        Line::Invalid { key, reason } => LogicalKind::Invalid {
            key: key.map(str::to_string),
            reason,
        },
        Line::Entry {
            key,
            chain,
            payload,
        } => match chain.continuation() {
            None => LogicalKind::Entry {
                key: key.to_string(),
                chain,
                payload: payload.to_string(),
            },
            Some(glyph) => {
                let mut joined = String::with_capacity(payload.len() * 2);
                let mut raw = first.clone();
                let mut chunk = payload.to_string();
                while let Some(stripped) = chunk.strip_suffix(glyph) {
                    joined.push_str(stripped);
                    chunk = reader
                        .next_line()?
                        .ok_or(Error::TruncatedContinuation { line, glyph })?;
                    raw.push('\n');
                    raw.push_str(&chunk);
                }
                joined.push_str(&chunk);
                return Ok(Some(Logical {
                    line,
                    raw,
                    kind: LogicalKind::Entry {
                        key: key.to_string(),
                        chain: chain.without_continuation(),
                        payload: joined,
                    },
                }));
            }
        },
    };
    Ok(Some(Logical {
        line,
        raw: first,
        kind,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DEFAULT_GLYPHS;

    fn unwrap_all(text: &str) -> Result<Vec<Logical>> {
        let mut reader = LineReader::new(text.as_bytes());
        let mut out = Vec::new();
        while let Some(logical) = unwrap(&mut reader)? {
            out.push(logical);
        }
        Ok(out)
    }

    fn joined_payload(lines: &[String]) -> String {
        let text = lines.join("\n") + "\n";
        match unwrap_all(&text).unwrap().remove(0).kind {
            LogicalKind::Entry { payload, .. } => payload,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_width_boundary() {
        let width = 20;
        let exact = "x".repeat(width - 2);
        let lines = wrap("k", &TagChain::default(), &exact, width, &DEFAULT_GLYPHS).unwrap();
        assert_eq!(lines, vec![format!("k={}", exact)]);

        let over = "x".repeat(width - 1);
        let lines = wrap("k", &TagChain::default(), &over, width, &DEFAULT_GLYPHS).unwrap();
        assert!(lines.len() >= 2);
        assert!(lines[0].starts_with("k/C\\="));
        assert!(lines.iter().all(|l| l.chars().count() <= width));
        assert_eq!(joined_payload(&lines), over);
    }

    #[test]
    fn test_wrap_never_exceeds_width() {
        let payload: String = ('a'..='z').cycle().take(500).collect();
        for width in [17, 18, 24, 72, 100] {
            let chain = TagChain::parse("64s").unwrap();
            let lines = wrap("some.key", &chain, &payload, width, &DEFAULT_GLYPHS).unwrap();
            assert!(lines.iter().all(|l| l.chars().count() <= width), "width {}", width);
            assert_eq!(joined_payload(&lines), payload);
        }
    }

    #[test]
    fn test_wrap_counts_characters() {
        let payload = "é".repeat(30);
        let lines = wrap("k", &TagChain::default(), &payload, 12, &DEFAULT_GLYPHS).unwrap();
        assert!(lines.iter().all(|l| l.chars().count() <= 12));
        assert_eq!(joined_payload(&lines), payload);
    }

    #[test]
    fn test_glyph_fallback_and_exhaustion() {
        let payload = "a\\b|c".repeat(10);
        let lines = wrap("k", &TagChain::default(), &payload, 16, &DEFAULT_GLYPHS).unwrap();
        assert!(lines[0].starts_with("k/C~="));
        assert_eq!(joined_payload(&lines), payload);

        let payload = "\\|~^".repeat(10);
        let err = wrap("k", &TagChain::default(), &payload, 16, &DEFAULT_GLYPHS).unwrap_err();
        assert!(matches!(err, Error::GlyphExhaustion { ref key, .. } if key == "k"));
    }

    #[test]
    fn test_long_key_still_wraps() {
        let key = "k".repeat(30);
        let lines = wrap(&key, &TagChain::default(), "abcdef", 10, &['|']).unwrap();
        assert!(lines.len() > 1);
        assert_eq!(joined_payload(&lines), "abcdef");
    }

    #[test]
    fn test_truncated_continuation() {
        let err = unwrap_all("ok=1\nk/C|=abc|\ndef|\n").unwrap_err();
        assert!(matches!(
            err,
            Error::TruncatedContinuation { line: 2, glyph: '|' }
        ));
    }

    #[test]
    fn test_single_chunk_continuation() {
        let logical = unwrap_all("k/C|=abc\n").unwrap().remove(0);
        assert_eq!(
            logical.kind,
            LogicalKind::Entry {
                key: "k".into(),
                chain: TagChain::default(),
                payload: "abc".into()
            }
        );
    }

    #[test]
    fn test_crlf_and_missing_final_newline() {
        let logical = unwrap_all("a=1\r\nb=2").unwrap();
        assert_eq!(logical[0].raw, "a=1");
        assert_eq!(logical[1].raw, "b=2");
        assert_eq!(logical[1].line, 2);
    }

    #[test]
    fn test_classify_keeps_payload_verbatim() {
        match classify("k= spaced = value ") {
            Line::Entry { payload, .. } => assert_eq!(payload, " spaced = value "),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(classify("=value"), Line::Invalid { key: None, .. }));
        assert!(matches!(classify("  k=v"), Line::Invalid { key: None, .. }));
    }
}
