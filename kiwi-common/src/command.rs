//! # Command Encoding
//!
//! Purpose: Render each store operation as exactly one line of wire text.
//!
//! ## Design Principles
//! 1. **Validated Construction**: Keys and values are checked when a
//!    [`Command`] is built, so encoding itself cannot fail.
//! 2. **Buffer Reuse**: [`Command::encode`] appends into a caller buffer.
//! 3. **No Framing Metadata**: A request is `VERB[ key[ value]]\n` and
//!    nothing else; no length prefix, no request id.
//!
//! ## Wire Lines
//!
//! ```text
//! GET <key>\n
//! SET <key> <value>\n
//! REMOVE <key>\n
//! PING\n
//! LIST\n
//! STATS\n
//! ```

use std::fmt;

use crate::error::{ArgResult, InvalidArgument};

/// Request terminator.
pub const LINE_END: u8 = b'\n';

/// Operation verbs understood by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Set,
    Remove,
    Ping,
    List,
    Stats,
}

impl Verb {
    /// Upper-case wire spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Set => "SET",
            Verb::Remove => "REMOVE",
            Verb::Ping => "PING",
            Verb::List => "LIST",
            Verb::Stats => "STATS",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request, borrowing its key and value from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command<'a> {
    verb: Verb,
    key: Option<&'a str>,
    value: Option<&'a str>,
}

impl<'a> Command<'a> {
    pub fn get(key: &'a str) -> ArgResult<Self> {
        Ok(Self::keyed(Verb::Get, validate_key(key)?))
    }

    pub fn set(key: &'a str, value: &'a str) -> ArgResult<Self> {
        Ok(Command {
            verb: Verb::Set,
            key: Some(validate_key(key)?),
            value: Some(validate_value(value)?),
        })
    }

    pub fn remove(key: &'a str) -> ArgResult<Self> {
        Ok(Self::keyed(Verb::Remove, validate_key(key)?))
    }

    pub const fn ping() -> Self {
        Self::bare(Verb::Ping)
    }

    pub const fn list() -> Self {
        Self::bare(Verb::List)
    }

    pub const fn stats() -> Self {
        Self::bare(Verb::Stats)
    }

    const fn bare(verb: Verb) -> Self {
        Command {
            verb,
            key: None,
            value: None,
        }
    }

    const fn keyed(verb: Verb, key: &'a str) -> Self {
        Command {
            verb,
            key: Some(key),
            value: None,
        }
    }

    #[inline]
    pub fn verb(&self) -> Verb {
        self.verb
    }

    #[inline]
    pub fn key(&self) -> Option<&'a str> {
        self.key
    }

    /// Appends the UTF-8 wire line, including the trailing `\n`, to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.verb.as_str().as_bytes());
        for arg in [self.key, self.value].into_iter().flatten() {
            out.push(b' ');
            out.extend_from_slice(arg.as_bytes());
        }
        out.push(LINE_END);
    }

    /// Encoded length in bytes, used to size write buffers.
    pub fn encoded_len(&self) -> usize {
        let args: usize = [self.key, self.value]
            .into_iter()
            .flatten()
            .map(|arg| arg.len() + 1)
            .sum();
        self.verb.as_str().len() + args + 1
    }
}

impl fmt::Display for Command<'_> {
    /// Renders the line without its terminator.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb.as_str())?;
        for arg in [self.key, self.value].into_iter().flatten() {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Checks that `key` is a single non-empty token.
pub fn validate_key(key: &str) -> ArgResult<&str> {
    if key.is_empty() {
        return Err(InvalidArgument::EmptyKey);
    }
    if key.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(InvalidArgument::KeyContainsWhitespace);
    }
    Ok(key)
}

/// Checks that `value` survives the store's whitespace tokenizer unchanged.
pub fn validate_value(value: &str) -> ArgResult<&str> {
    if value.is_empty() {
        return Err(InvalidArgument::EmptyValue);
    }
    if value.chars().any(|c| c.is_control() || (c.is_whitespace() && c != ' ')) {
        return Err(InvalidArgument::ValueNotCanonical);
    }
    if value.starts_with(' ') || value.ends_with(' ') || value.contains("  ") {
        return Err(InvalidArgument::ValueNotCanonical);
    }
    Ok(value)
}
