//! Error types for reading and writing plain configuration files.
//!
//! The variants follow the failure modes of the codec:
//!
//! - **Encoding errors**: a value that needs the pickle escape hatch while the
//!   caller is in restrictive mode, a key the line grammar cannot carry, or a
//!   long value that no continuation glyph can wrap.
//! - **Decoding errors**: a payload that does not parse under its tag, an
//!   opaque object that fails to unpickle, or a stream that ends in the middle
//!   of a wrapped value.
//! - **I/O errors**: failures of the underlying reader or writer.
//!
//! Only some of these end a call. A [`Error::MalformedValue`] met while
//! loading is recorded as a failure line in the
//! [`Structure`](crate::Structure) and the load carries on; see
//! [`decode`](crate::decode) for the exact rules.
//!
//! ## Examples
//!
//! ```rust
//! use plain_config::{to_string, ConfMap, Error, Value};
//!
//! let mut map = ConfMap::new();
//! map.insert("bad=key".to_string(), Value::from(1));
//!
//! let err = to_string(&map).unwrap_err();
//! assert!(matches!(err, Error::InvalidKey { .. }));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised while encoding or decoding a configuration.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// The value can only be written as a pickled object and pickling is not trusted
    #[error("cannot encode value of `{key}`: {reason}")]
    UnencodableValue { key: String, reason: String },

    /// A payload does not parse under the grammar of its tag
    #[error("malformed value: {0}")]
    MalformedValue(String),

    /// Unpickling an opaque object failed in permissive mode
    #[error("unsafe object: {0}")]
    UnsafeObject(String),

    /// The input ended while a wrapped value still expected more lines
    #[error("truncated continuation at line {line}: input ended before a line not ending in `{glyph}`")]
    TruncatedContinuation { line: usize, glyph: char },

    /// Every glyph of the pool occurs in a payload that must be wrapped
    #[error("cannot wrap value of `{key}`: every continuation glyph in {pool:?} occurs in the payload")]
    GlyphExhaustion { key: String, pool: String },

    /// The key cannot be represented by the line grammar
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// Rejected configuration options
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a malformed-value error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use plain_config::Error;
    ///
    /// let err = Error::malformed("invalid digit in integer");
    /// assert!(err.to_string().contains("invalid digit"));
    /// ```
    pub fn malformed<T: fmt::Display>(msg: T) -> Self {
        Error::MalformedValue(msg.to_string())
    }

    /// Creates an unsafe-object error for a failed unpickle.
    pub fn unsafe_object<T: fmt::Display>(msg: T) -> Self {
        Error::UnsafeObject(msg.to_string())
    }

    /// Creates an error for a value that needs pickling in restrictive mode.
    pub fn unencodable(key: &str, reason: &str) -> Self {
        Error::UnencodableValue {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates an invalid-key error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use plain_config::Error;
    ///
    /// let err = Error::invalid_key("a/b", "contains '/'");
    /// assert!(err.to_string().contains("a/b"));
    /// ```
    pub fn invalid_key(key: &str, reason: &str) -> Self {
        Error::InvalidKey {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates an invalid-options error.
    pub fn invalid_options<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidOptions(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for stream reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Prefixes value-level errors with the physical line they came from.
    ///
    /// Other variants already carry their own position, or have none, and are
    /// returned unchanged.
    #[must_use]
    pub fn at_line(self, line: usize) -> Self {
        match self {
            Error::MalformedValue(msg) => Error::MalformedValue(format!("line {}: {}", line, msg)),
            Error::UnsafeObject(msg) => Error::UnsafeObject(format!("line {}: {}", line, msg)),
            other => other,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_line_prefixes_value_errors() {
        let err = Error::malformed("bad digit").at_line(7);
        assert_eq!(err.to_string(), "malformed value: line 7: bad digit");

        let err = Error::unsafe_object("truncated").at_line(3);
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_at_line_keeps_other_variants() {
        let err = Error::invalid_key("a=b", "contains '='").at_line(9);
        assert!(matches!(err, Error::InvalidKey { .. }));
        assert!(!err.to_string().contains("line 9"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "boom");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(ref msg) if msg.contains("boom")));
    }
}
