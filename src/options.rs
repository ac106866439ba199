//! Options controlling how configurations are read and written.
//!
//! - [`TrustMode`]: whether pickled objects may be written and read
//! - [`BytesEncoding`]: which text form byte strings take
//! - [`ConfigOptions`]: all per-call settings, built with `with_*` methods
//!
//! ## Examples
//!
//! ```rust
//! use plain_config::{ConfigOptions, TrustMode};
//!
//! let options = ConfigOptions::new()
//!     .with_trust(TrustMode::Permissive)
//!     .with_width(100)
//!     .with_glyphs("~^");
//! assert!(options.validate().is_ok());
//! ```

use crate::{Error, Result};

/// Default maximum length, in characters, of a physical line.
pub const DEFAULT_WIDTH: usize = 72;

/// Default continuation glyphs, tried in order.
pub const DEFAULT_GLYPHS: [char; 4] = ['\\', '|', '~', '^'];

/// Smallest accepted width budget.
pub const MIN_WIDTH: usize = 8;

/// Whether arbitrary objects may be pickled on write and unpickled on read.
///
/// # Examples
///
/// ```rust
/// use plain_config::TrustMode;
///
/// assert_eq!(TrustMode::default(), TrustMode::Restrictive);
/// assert!(TrustMode::Permissive.allows_pickle());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TrustMode {
    /// Pickled entries are skipped on read and refused on write.
    #[default]
    Restrictive,
    /// Pickled entries are read and written. Only use with trusted input.
    Permissive,
}

impl TrustMode {
    #[inline]
    #[must_use]
    pub const fn allows_pickle(&self) -> bool {
        matches!(self, TrustMode::Permissive)
    }
}

/// Text form chosen for byte strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BytesEncoding {
    /// Always base32 (`/32`). Safe on case-insensitive tooling.
    #[default]
    Base32,
    /// Shortest line-safe form among utf8 (`/b`), base32 (`/32`) and base64 (`/64`).
    Shortest,
}

/// Per-call options for reading and writing configurations.
///
/// There is no global state: every call receives its own options, and the
/// defaults come from [`DEFAULT_WIDTH`] and [`DEFAULT_GLYPHS`].
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigOptions {
    pub trust: TrustMode,
    pub rewrite_old: bool,
    pub width: usize,
    pub glyphs: Vec<char>,
    pub bytes: BytesEncoding,
}

impl Default for ConfigOptions {
    fn default() -> Self {
        ConfigOptions {
            trust: TrustMode::default(),
            rewrite_old: false,
            width: DEFAULT_WIDTH,
            glyphs: DEFAULT_GLYPHS.to_vec(),
            bytes: BytesEncoding::default(),
        }
    }
}

impl ConfigOptions {
    /// Creates default options (restrictive, 72 columns, default glyph pool).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use plain_config::{ConfigOptions, TrustMode};
    ///
    /// let options = ConfigOptions::new();
    /// assert_eq!(options.width, 72);
    /// assert_eq!(options.trust, TrustMode::Restrictive);
    /// assert!(!options.rewrite_old);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates default options with pickling allowed.
    #[must_use]
    pub fn permissive() -> Self {
        ConfigOptions {
            trust: TrustMode::Permissive,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_trust(mut self, trust: TrustMode) -> Self {
        self.trust = trust;
        self
    }

    /// Keeps lines of keys that are no longer in the mapping when rewriting.
    #[must_use]
    pub fn with_rewrite_old(mut self, rewrite_old: bool) -> Self {
        self.rewrite_old = rewrite_old;
        self
    }

    /// Sets the maximum physical line length, in characters.
    #[must_use]
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Replaces the continuation glyph pool. Glyphs are tried in order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use plain_config::ConfigOptions;
    ///
    /// let options = ConfigOptions::new().with_glyphs("~^");
    /// assert_eq!(options.glyphs, vec!['~', '^']);
    /// ```
    #[must_use]
    pub fn with_glyphs(mut self, glyphs: &str) -> Self {
        self.glyphs = glyphs.chars().collect();
        self
    }

    #[must_use]
    pub fn with_bytes_encoding(mut self, bytes: BytesEncoding) -> Self {
        self.bytes = bytes;
        self
    }

    /// Checks the width budget and the glyph pool.
    ///
    /// A glyph may not be `=` or `/` (they delimit the line grammar), nor
    /// whitespace or a control character (they do not survive editors and
    /// line splitting).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOptions`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.width < MIN_WIDTH {
            return Err(Error::invalid_options(format!(
                "width {} is below the minimum of {}",
                self.width, MIN_WIDTH
            )));
        }
        if self.glyphs.is_empty() {
            return Err(Error::invalid_options("continuation glyph pool is empty"));
        }
        for &glyph in &self.glyphs {
            if glyph == '=' || glyph == '/' || glyph.is_whitespace() || glyph.is_control() {
                return Err(Error::invalid_options(format!(
                    "{:?} cannot be a continuation glyph",
                    glyph
                )));
            }
        }
        Ok(())
    }
}
