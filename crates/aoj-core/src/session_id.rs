//! The validated identifier of a stored session.

use std::fmt;
use std::str::FromStr;

use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::{Error, Result};

const MIN_LEN: usize = 32;
const MAX_LEN: usize = 128;

/// Number of random bytes behind a generated id (64 hex characters).
const GENERATED_BYTES: usize = 32;

/// Length from which an id is considered strong enough (32 bytes).
const SECURE_LEN: usize = 64;

/// Opaque handle of a persisted session.
///
/// Always a trimmed string of 32 to 128 hexadecimal characters. Once
/// constructed it cannot change, so any `SessionId` you hold is valid.
///
/// `Debug` prints the masked form; use `Display` or [`as_str`](Self::as_str)
/// when the full value is really needed (file names, the pointer record).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Validates and wraps `value`.
    ///
    /// Surrounding whitespace is trimmed before validation.
    ///
    /// # Errors
    /// [`ErrorKind::InvalidInput`](crate::ErrorKind::InvalidInput) if the
    /// value is empty or not 32–128 hex characters.
    pub fn new(value: &str) -> Result<Self> {
        let normalized = value.trim();
        if normalized.is_empty() {
            return Err(Error::invalid_input("session ID cannot be empty"));
        }
        if !is_valid_format(normalized) {
            return Err(Error::invalid_input(
                "invalid session ID format: expected hexadecimal string (32-128 characters)",
            ));
        }
        Ok(Self(normalized.to_string()))
    }

    /// Draws a fresh 64-character lowercase hex id from the OS random
    /// source.
    ///
    /// # Errors
    /// [`ErrorKind::InternalServer`](crate::ErrorKind::InternalServer)
    /// wrapping the OS error if no randomness is available.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; GENERATED_BYTES];
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
            Error::internal("failed to generate random session ID").with_source(e)
        })?;
        Ok(Self(bytes.iter().map(|b| format!("{b:02x}")).collect()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; a constructed id has at least 32 characters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `true` when the id carries at least 32 bytes of entropy.
    pub fn is_secure(&self) -> bool {
        self.len() >= SECURE_LEN
    }

    /// Decodes the hex value into raw bytes.
    ///
    /// # Errors
    /// [`ErrorKind::InvalidInput`](crate::ErrorKind::InvalidInput) for an
    /// odd-length id, which has no whole-byte decoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        hex::decode(&self.0)
            .map_err(|e| Error::invalid_input("session ID is not valid hex").with_source(e))
    }

    /// The first `length` characters followed by `...`.
    ///
    /// Returns an empty string for `length == 0` and the full value when
    /// `length` covers the whole id.
    pub fn truncated(&self, length: usize) -> String {
        if length == 0 {
            return String::new();
        }
        if length >= self.0.len() {
            return self.0.clone();
        }
        format!("{}...", &self.0[..length])
    }

    /// The form to use in logs: first 4 and last 4 characters, the rest
    /// replaced by `*`. Values of 8 characters or fewer are fully masked.
    pub fn masked(&self) -> String {
        mask(&self.0)
    }
}

/// Masks all but the first and last four characters of `value`.
///
/// Shared by [`SessionId::masked`] and the token redaction in
/// `Session`'s `Debug` output.
pub(crate) fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(chars.len() - 8))
}

fn is_valid_format(value: &str) -> bool {
    (MIN_LEN..=MAX_LEN).contains(&value.len())
        && value.bytes().all(|b| b.is_ascii_hexdigit())
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionId").field(&self.masked()).finish()
    }
}

impl FromStr for SessionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
