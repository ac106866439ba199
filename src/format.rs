//! Plain Config Format Reference
//!
//! This module documents the text format read by [`decode`](crate::decode)
//! and written by [`encode`](crate::encode).
//!
//! # Overview
//!
//! A configuration file is UTF-8 text, one entry per line. The format is
//! meant to be edited by hand: plain strings are written as is, comments and
//! blank lines survive a load/store cycle, and entries keep their position
//! when a file is rewritten.
//!
//! ```text
//! # database settings
//! host=db.internal
//! port/i=5432
//! timeout/f=2.5
//! replicas/r=['db1', 'db2']
//!
//! token/32=MFRGGZDFMZTWQ2LK
//! motd/64s=V2VsY29tZQpIYXZlIGZ1bg==
//! ```
//!
//! # Lines
//!
//! | Line | Meaning |
//! |------|---------|
//! | empty or only whitespace | blank, kept verbatim |
//! | first non-blank character `#` | comment, kept verbatim |
//! | `key=payload` | plain string |
//! | `key/tags=payload` | value decoded by the tag chain |
//! | anything else | unreadable, kept verbatim |
//!
//! **Rules**:
//! - The line is split at the first `=`, the key part at the first `/`.
//! - Keys are non-empty, contain no `=`, `/` or control characters, and do
//!   not start with whitespace or `#`.
//! - The payload is everything after `=` up to the line terminator,
//!   including leading and trailing spaces.
//! - `\n` and `\r\n` terminators are both accepted; `\n` is written.
//!
//! # Tags
//!
//! | Tag | Payload |
//! |-----|---------|
//! | (none) | the string itself |
//! | `i` | decimal integer, any size, `_` separators allowed |
//! | `f` | float, including `inf` and `NaN` |
//! | `r` | literal: `None`, `True`, `False`, numbers, quoted strings, `b'..'` bytes, `[..]`, `(..)`, `{k: v}`, `{a, b}`, `set()` |
//! | `s` | UTF-8 bytes read as a string |
//! | `b` | string read as UTF-8 bytes |
//! | `32` | base32, RFC 4648 alphabet with padding |
//! | `64` | base64, standard alphabet with padding |
//! | `p` | pickled object (CBOR), only in permissive trust mode |
//! | `C<g>` | continuation with glyph `g`; must come first |
//!
//! Tags are applied left to right on read: `/64s` base64-decodes the payload
//! and reads the bytes as UTF-8, `/64p` base64-decodes and unpickles.
//!
//! The literal tag uses a parser that understands data only. Names other
//! than `None`, `True`, `False` and `set()`, calls, operators and attribute
//! access are all rejected, and nesting is limited to 64 levels.
//!
//! # Choosing Tags
//!
//! The writer picks the first rule that matches:
//!
//! 1. a string without control characters: no tag
//! 2. an integer: `i`
//! 3. a float: `f`
//! 4. `None`, a bool, or a container of literal values: `r`
//! 5. bytes: `32`
//! 6. any other string: `64s`
//! 7. anything else: `64p`, in permissive mode only
//!
//! [`BytesEncoding::Shortest`](crate::BytesEncoding::Shortest) replaces rule
//! 5 with the shortest of `b`, `32` and `64`.
//!
//! # Continuation Lines
//!
//! A line longer than the width budget (72 characters by default, counted
//! over the whole line) is wrapped:
//!
//! ```text
//! banner/C\=Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed \
//! do eiusmod tempor incididunt ut labore et dolore magna aliqua.
//! ```
//!
//! - `C` is followed by the glyph, the first of `\`, `|`, `~`, `^` that does
//!   not occur in the payload.
//! - Every physical line but the last ends with the glyph, which is removed
//!   on read. The first line that does not end with it is the last one.
//! - A file that ends while a continuation is open is an error.
//! - If every glyph occurs in the payload the value cannot be written.
//!
//! # Rewriting
//!
//! Loading returns the mapping and the structure (one record per logical
//! line). Storing with that structure:
//!
//! - writes comments and blank lines back unchanged
//! - rewrites each entry whose key is still in the mapping, in place
//! - drops entries whose key was removed, unless `rewrite_old` is set
//! - keeps unreadable lines unchanged, unless their key is in the mapping,
//!   in which case the fresh entry replaces them
//! - appends new keys at the end, in mapping order
//!
//! Loading and storing an unchanged file written by this crate gives back
//! the same bytes.
//!
//! # Trust
//!
//! In [`TrustMode::Restrictive`](crate::TrustMode::Restrictive), the default,
//! `p` entries are left out of the mapping and kept as unreadable lines, and
//! values that need pickling cannot be written. Only use
//! [`TrustMode::Permissive`](crate::TrustMode::Permissive) on files you
//! wrote yourself.
//!
//! # Limitations
//!
//! - Sets and dicts keep their order; two sets with the same members in a
//!   different order compare unequal.
//! - Non-finite floats inside containers have no literal spelling and need
//!   pickling.
//! - Line terminators are normalized to `\n` on write.
