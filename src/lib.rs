//! # plain_config
//!
//! A codec for plain, hand-editable configuration files with typed values.
//!
//! ## What is it?
//!
//! A configuration file is a list of `key=value` lines. Values that are not
//! plain strings carry a short tag chain after the key, so that integers,
//! floats, booleans, bytes and literal containers come back with their type:
//!
//! ```text
//! # service
//! host=example.com
//! port/i=8080
//! debug/r=True
//! peers/r=['10.0.0.1', '10.0.0.2']
//! secret/32=ONSWG4TFOQ======
//! ```
//!
//! ## Key Features
//!
//! - **Typed values**: integers of any size, floats, `None`, bools, bytes,
//!   lists, tuples, sets and dicts
//! - **Layout preserving**: comments, blank lines and key order survive a
//!   load/modify/store cycle
//! - **Safe by default**: literals are read by a data-only parser, and
//!   pickled objects are refused unless the caller opts in
//! - **Long values**: lines over the width budget are wrapped with a
//!   continuation glyph and joined back on read
//! - **Serde Compatible**: typed configuration structs via [`to_map`] and
//!   [`from_map`]
//!
//! ## Quick Start
//!
//! ```rust
//! use plain_config::{from_str, to_string_with_options, ConfigOptions, Value};
//!
//! let text = "# service\nhost=example.com\nport/i=8080\n";
//! let (mut map, structure) = from_str(text).unwrap();
//! assert_eq!(map.get("port"), Some(&Value::Int(8080)));
//!
//! map.insert("port".to_string(), Value::from(9090));
//! map.insert("debug".to_string(), Value::from(true));
//!
//! let updated = to_string_with_options(&map, &structure, &ConfigOptions::new()).unwrap();
//! assert_eq!(updated, "# service\nhost=example.com\nport/i=9090\ndebug/r=True\n");
//! ```
//!
//! ### Typed Configuration
//!
//! ```rust
//! use plain_config::{from_map, from_str, to_map, to_string};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Service {
//!     host: String,
//!     port: u16,
//!     peers: Vec<String>,
//! }
//!
//! let service = Service {
//!     host: "example.com".to_string(),
//!     port: 8080,
//!     peers: vec!["a".to_string(), "b".to_string()],
//! };
//!
//! let text = to_string(&to_map(&service).unwrap()).unwrap();
//! assert_eq!(text, "host=example.com\nport/i=8080\npeers/r=['a', 'b']\n");
//!
//! let (map, _) = from_str(&text).unwrap();
//! let back: Service = from_map(map).unwrap();
//! assert_eq!(service, back);
//! ```
//!
//! ### Dynamic Values with conf! Macro
//!
//! ```rust
//! use plain_config::{conf_map, to_string};
//!
//! let map = conf_map!({
//!     "name": "worker",
//!     "limits": {"cpu": 2, "memory": 512},
//!     "enabled": true
//! });
//! assert_eq!(
//!     to_string(&map).unwrap(),
//!     "name=worker\nlimits/r={'cpu': 2, 'memory': 512}\nenabled/r=True\n"
//! );
//! ```
//!
//! ## Error Handling
//!
//! A malformed value does not stop a load: the line is kept in the
//! [`Structure`] as a [`Record::Invalid`], logged with `tracing`, and left
//! out of the mapping. A truncated continuation or a failing trusted
//! unpickle stops it. Writing renders everything before touching the
//! writer, so a failed [`encode`] writes nothing.
//!
//! ## Logging
//!
//! Diagnostics go through the [`tracing`](https://docs.rs/tracing) facade:
//! skipped lines at `warn`, dropped entries and wrapping at `debug`. No
//! subscriber is installed by this crate.
//!
//! ## Format Reference
//!
//! See the [`format`] module for the full description of lines, tags and
//! continuation.
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - write and read a configuration
//! - **`macro.rs`** - building values with the conf! macros
//! - **`preserve_layout.rs`** - editing a file without losing comments
//! - **`typed_config.rs`** - loading a configuration into a struct
//! - **`custom_options.rs`** - width, glyphs, trust and bytes encoding
//!
//! Run any example with: `cargo run --example <name>`

pub mod codec;
pub mod de;
pub mod error;
pub mod format;
pub mod line;
pub mod literal;
pub mod macros;
pub mod map;
pub mod options;
mod pickle;
pub mod ser;
pub mod structure;
pub mod value;

pub use codec::{Tag, TagChain};
pub use de::{from_value, ValueDeserializer};
pub use error::{Error, Result};
pub use map::ConfMap;
pub use options::{BytesEncoding, ConfigOptions, TrustMode, DEFAULT_GLYPHS, DEFAULT_WIDTH};
pub use ser::{to_value, ValueSerializer};
pub use structure::{Record, Structure};
pub use value::Value;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;

/// Reads a configuration from a stream.
///
/// Returns the mapping of keys to values and the [`Structure`] needed to
/// write it back in the same layout.
///
/// # Examples
///
/// ```rust
/// use plain_config::{decode, Record, TrustMode, Value};
///
/// let input = "# note\n\nhost=example.com\n";
/// let (map, structure) = decode(input.as_bytes(), TrustMode::Restrictive).unwrap();
///
/// assert_eq!(map.get("host"), Some(&Value::from("example.com")));
/// assert_eq!(structure.len(), 3);
/// assert_eq!(structure.records()[2].raw(), "host=example.com");
/// ```
///
/// # Errors
///
/// Returns [`Error::TruncatedContinuation`] if the stream ends inside a
/// wrapped value, [`Error::UnsafeObject`] if a trusted pickle cannot be
/// read, and [`Error::Io`] on read failures or invalid UTF-8.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode<R>(reader: R, trust: TrustMode) -> Result<(ConfMap, Structure)>
where
    R: io::Read,
{
    decode_with_options(reader, &ConfigOptions::new().with_trust(trust))
}

/// Reads a configuration from a stream with custom options.
///
/// Only the trust mode matters when reading.
///
/// # Errors
///
/// See [`decode`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode_with_options<R>(reader: R, options: &ConfigOptions) -> Result<(ConfMap, Structure)>
where
    R: io::Read,
{
    structure::load(io::BufReader::new(reader), options)
}

/// Reads a configuration from a string, in restrictive mode.
///
/// # Examples
///
/// ```rust
/// use plain_config::{from_str, Value};
///
/// let (map, _) = from_str("port/i=8080\nratio/f=0.5\n").unwrap();
/// assert_eq!(map.get("port"), Some(&Value::Int(8080)));
/// assert_eq!(map.get("ratio"), Some(&Value::Float(0.5)));
/// ```
///
/// # Errors
///
/// See [`decode`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str(s: &str) -> Result<(ConfMap, Structure)> {
    from_str_with_options(s, &ConfigOptions::new())
}

/// Reads a configuration from a string with custom options.
///
/// # Errors
///
/// See [`decode`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with_options(s: &str, options: &ConfigOptions) -> Result<(ConfMap, Structure)> {
    structure::load(s.as_bytes(), options)
}

/// Writes a configuration to a stream.
///
/// Entries follow the layout of `structure` (pass [`Structure::new`] for a
/// fresh file); keys not in it are appended in map order. Nothing is written
/// if any entry fails to encode.
///
/// # Examples
///
/// ```rust
/// use plain_config::{encode, ConfMap, ConfigOptions, Structure, Value};
///
/// let mut map = ConfMap::new();
/// map.insert("key".to_string(), Value::from(vec![0u8, 1]));
///
/// let mut out = Vec::new();
/// encode(&mut out, &map, &Structure::new(), &ConfigOptions::new()).unwrap();
/// assert_eq!(out, b"key/32=AAAQ====\n");
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidKey`] for keys the line grammar cannot carry,
/// [`Error::UnencodableValue`] for values that need pickling in restrictive
/// mode, [`Error::GlyphExhaustion`] for long values no glyph can wrap,
/// [`Error::InvalidOptions`] and [`Error::Io`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode<W>(writer: W, map: &ConfMap, structure: &Structure, options: &ConfigOptions) -> Result<()>
where
    W: io::Write,
{
    structure::store(writer, map, structure, options)
}

/// Renders a mapping as a fresh configuration file with default options.
///
/// # Examples
///
/// ```rust
/// use plain_config::{to_string, ConfMap, Value};
///
/// let mut map = ConfMap::new();
/// map.insert("port".to_string(), Value::from(8080));
/// map.insert("debug".to_string(), Value::from(true));
///
/// assert_eq!(to_string(&map).unwrap(), "port/i=8080\ndebug/r=True\n");
/// ```
///
/// # Errors
///
/// See [`encode`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string(map: &ConfMap) -> Result<String> {
    to_string_with_options(map, &Structure::new(), &ConfigOptions::new())
}

/// Renders a mapping following `structure`, with custom options.
///
/// # Errors
///
/// See [`encode`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options(
    map: &ConfMap,
    structure: &Structure,
    options: &ConfigOptions,
) -> Result<String> {
    structure::render(map, structure, options)
}

/// Converts a struct or string-keyed map into a [`ConfMap`].
///
/// # Examples
///
/// ```rust
/// use plain_config::{to_map, Value};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Limits { cpu: u32, memory: Option<u64> }
///
/// let map = to_map(&Limits { cpu: 2, memory: None }).unwrap();
/// assert_eq!(map.get("cpu"), Some(&Value::Int(2)));
/// assert_eq!(map.get("memory"), Some(&Value::None));
/// ```
///
/// # Errors
///
/// Returns an error if `value` does not serialize to a dict with string keys.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_map<T>(value: &T) -> Result<ConfMap>
where
    T: ?Sized + Serialize,
{
    match to_value(value)? {
        Value::Dict(entries) => entries
            .into_iter()
            .map(|(key, value)| match key {
                Value::Str(key) => Ok((key, value)),
                other => Err(Error::custom(format!(
                    "configuration keys must be strings, found {}",
                    other.type_name()
                ))),
            })
            .collect(),
        other => Err(Error::custom(format!(
            "expected a struct or map, found {}",
            other.type_name()
        ))),
    }
}

/// Converts a [`ConfMap`] into a typed struct or map.
///
/// # Errors
///
/// Returns an error if the entries do not match the fields of `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_map<T>(map: ConfMap) -> Result<T>
where
    T: DeserializeOwned,
{
    from_value(Value::Dict(
        map.into_iter()
            .map(|(key, value)| (Value::Str(key), value))
            .collect(),
    ))
}
