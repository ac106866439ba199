//! Structure store: the layout of a loaded file, replayed on write.
//!
//! [`load`] returns every logical line it read as a [`Record`], in order.
//! Handing the same [`Structure`] back to [`store`] writes comments, blank
//! lines and unreadable lines back verbatim, rewrites each entry in place
//! with its current value, and appends keys that were not in the file.

use crate::codec::{decode_value, encode_value};
use crate::line::{unwrap, validate_key, wrap, LineReader, LogicalKind};
use crate::options::ConfigOptions;
use crate::{ConfMap, Error, Result, Value};
use std::io::{BufRead, Write};
use tracing::{debug, warn};

/// One logical line of a loaded file.
///
/// `raw` never includes the line terminator. For an entry wrapped across
/// several physical lines it holds all of them joined with `\n`.
#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    /// A successfully decoded entry.
    Entry { key: String, value: Value, raw: String },
    /// A comment or blank line.
    Trivia { raw: String },
    /// A line that could not be read. `key` is set when the key itself was
    /// readable, e.g. a malformed value or a pickled value in restrictive mode.
    Invalid { key: Option<String>, raw: String },
}

impl Record {
    /// The key of an entry, or of an invalid line with a readable key.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Record::Entry { key, .. } => Some(key),
            Record::Invalid { key, .. } => key.as_deref(),
            Record::Trivia { .. } => None,
        }
    }

    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match self {
            Record::Entry { value, .. } => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Record::Entry { raw, .. } | Record::Trivia { raw } | Record::Invalid { raw, .. } => {
                raw
            }
        }
    }

    #[must_use]
    pub fn is_entry(&self) -> bool {
        matches!(self, Record::Entry { .. })
    }

    #[must_use]
    pub fn is_trivia(&self) -> bool {
        matches!(self, Record::Trivia { .. })
    }

    #[must_use]
    pub fn is_invalid(&self) -> bool {
        matches!(self, Record::Invalid { .. })
    }
}

/// The ordered records of a loaded file.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Structure(Vec<Record>);

impl Structure {
    #[must_use]
    pub fn new() -> Self {
        Structure(Vec::new())
    }

    pub fn push(&mut self, record: Record) {
        self.0.push(record);
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.0.iter()
    }
}

impl From<Vec<Record>> for Structure {
    fn from(records: Vec<Record>) -> Self {
        Structure(records)
    }
}

impl FromIterator<Record> for Structure {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Structure(iter.into_iter().collect())
    }
}

impl IntoIterator for Structure {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Structure {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Reads a configuration, returning its mapping and layout.
///
/// Lines that cannot be read become [`Record::Invalid`] and loading goes on:
/// lines off the grammar, malformed values, and pickled values in
/// restrictive mode. The last of several entries with the same key wins in
/// the mapping; every one of them stays in the structure.
///
/// # Errors
///
/// Stops at [`Error::TruncatedContinuation`], [`Error::UnsafeObject`] (a
/// trusted pickle that fails to load) and [`Error::Io`].
pub fn load<R: BufRead>(reader: R, options: &ConfigOptions) -> Result<(ConfMap, Structure)> {
    let mut lines = LineReader::new(reader);
    let mut map = ConfMap::new();
    let mut structure = Structure::new();

    while let Some(logical) = unwrap(&mut lines)? {
        let line = logical.line;
        let raw = logical.raw;
        match logical.kind {
            LogicalKind::Trivia => structure.push(Record::Trivia { raw }),
            LogicalKind::Invalid { key, reason } => {
                warn!(line, reason = %reason, "ignoring unreadable line");
                structure.push(Record::Invalid { key, raw });
            }
            LogicalKind::Entry {
                key,
                chain,
                payload,
            } => {
                if chain.requires_trust() && !options.trust.allows_pickle() {
                    warn!(line, key = %key, "skipping pickled value in restrictive mode");
                    structure.push(Record::Invalid { key: Some(key), raw });
                    continue;
                }
                match decode_value(&chain, &payload, options.trust) {
                    Ok(value) => {
                        map.insert(key.clone(), value.clone());
                        structure.push(Record::Entry { key, value, raw });
                    }
                    Err(Error::MalformedValue(reason)) => {
                        warn!(line, key = %key, reason = %reason, "ignoring malformed value");
                        structure.push(Record::Invalid { key: Some(key), raw });
                    }
                    Err(e) => return Err(e.at_line(line)),
                }
            }
        }
    }
    Ok((map, structure))
}

/// Writes a mapping, following the layout of `structure`.
///
/// - trivia is written verbatim
/// - an entry or invalid line whose key is in `map` is replaced by the
///   current value, once
/// - an entry whose key is not in `map` is kept only with `rewrite_old`
/// - an invalid line whose key is not in `map` is kept verbatim
///
/// Keys of `map` not placed by the structure follow, in map order.
///
/// The output is rendered in full before anything is written, so a failing
/// call leaves `writer` untouched.
///
/// # Errors
///
/// Returns [`Error::InvalidOptions`], [`Error::InvalidKey`],
/// [`Error::UnencodableValue`], [`Error::GlyphExhaustion`] or [`Error::Io`].
pub fn store<W: Write>(
    mut writer: W,
    map: &ConfMap,
    structure: &Structure,
    options: &ConfigOptions,
) -> Result<()> {
    let output = render(map, structure, options)?;
    writer.write_all(output.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Renders what [`store`] writes.
pub(crate) fn render(map: &ConfMap, structure: &Structure, options: &ConfigOptions) -> Result<String> {
    options.validate()?;
    for key in map.keys() {
        validate_key(key)?;
    }

    let mut pending = map.clone();
    let mut output = String::with_capacity(64 * (map.len() + structure.len()));
    for record in structure {
        match record {
            Record::Trivia { raw } => push_line(&mut output, raw),
            record => match record.key() {
                Some(key) if pending.contains_key(key) => {
                    if let Some(value) = pending.remove(key) {
                        render_entry(&mut output, key, &value, options)?;
                    }
                }
                Some(key) if record.is_entry() && !options.rewrite_old => {
                    debug!(key = %key, "dropping entry absent from the mapping");
                }
                _ => push_line(&mut output, record.raw()),
            },
        }
    }
    for (key, value) in &pending {
        render_entry(&mut output, key, value, options)?;
    }
    Ok(output)
}

fn render_entry(output: &mut String, key: &str, value: &Value, options: &ConfigOptions) -> Result<()> {
    let (chain, payload) = encode_value(key, value, options)?;
    for line in wrap(key, &chain, &payload, options.width, &options.glyphs)? {
        push_line(output, &line);
    }
    Ok(())
}

fn push_line(output: &mut String, line: &str) {
    output.push_str(line);
    output.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TrustMode;

    fn load_str(text: &str, options: &ConfigOptions) -> (ConfMap, Structure) {
        load(text.as_bytes(), options).unwrap()
    }

    #[test]
    fn test_load_records() {
        let (map, structure) = load_str("# note\n\nhost=example.com\n", &ConfigOptions::new());
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("host"), Some(&Value::from("example.com")));
        assert_eq!(
            structure.records(),
            &[
                Record::Trivia { raw: "# note".into() },
                Record::Trivia { raw: "".into() },
                Record::Entry {
                    key: "host".into(),
                    value: Value::from("example.com"),
                    raw: "host=example.com".into()
                },
            ]
        );
    }

    #[test]
    fn test_malformed_values_do_not_stop_loading() {
        let (map, structure) = load_str("a/i=oops\nb/i=2\ngarbage\n", &ConfigOptions::new());
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("b"), Some(&Value::Int(2)));
        assert_eq!(structure.records()[0].key(), Some("a"));
        assert!(structure.records()[0].is_invalid());
        assert_eq!(structure.records()[2].key(), None);
        assert!(structure.records()[2].is_invalid());
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let (map, structure) = load_str("k=1\nk=2\n", &ConfigOptions::new());
        assert_eq!(map.get("k"), Some(&Value::from("2")));
        assert_eq!(structure.len(), 2);

        let out = render(&map, &structure, &ConfigOptions::new()).unwrap();
        assert_eq!(out, "k=2\n");
        let out = render(&map, &structure, &ConfigOptions::new().with_rewrite_old(true)).unwrap();
        assert_eq!(out, "k=2\nk=2\n");
    }

    #[test]
    fn test_pickle_gating() {
        let mut map = ConfMap::new();
        map.insert("obj".into(), Value::object(&("x", 1)).unwrap());
        let permissive = ConfigOptions::permissive();
        let text = render(&map, &Structure::new(), &permissive).unwrap();
        assert!(text.starts_with("obj/64p="));

        let (restricted, structure) = load_str(&text, &ConfigOptions::new());
        assert!(restricted.is_empty());
        assert_eq!(structure.records()[0].key(), Some("obj"));
        assert!(structure.records()[0].is_invalid());

        let (trusted, _) = load_str(&text, &permissive);
        assert_eq!(trusted, map);
    }

    #[test]
    fn test_failed_unpickle_is_fatal() {
        let options = ConfigOptions::new().with_trust(TrustMode::Permissive);
        let err = load("ok=1\nbad/64p=/w==\n".as_bytes(), &options).unwrap_err();
        assert!(matches!(err, Error::UnsafeObject(ref msg) if msg.starts_with("line 2:")));
    }

    #[test]
    fn test_errors_write_nothing() {
        let mut map = ConfMap::new();
        map.insert("fine".into(), Value::from(1));
        map.insert("obj".into(), Value::object(&1).unwrap());
        let mut out = Vec::new();
        assert!(store(&mut out, &map, &Structure::new(), &ConfigOptions::new()).is_err());
        assert!(out.is_empty());
    }
}
