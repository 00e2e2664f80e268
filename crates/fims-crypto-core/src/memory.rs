//! Secure memory types for key material and wallet secrets.
//!
//! This module provides memory-safe wrappers that:
//! - Zero memory on drop via [`zeroize`] (through `secrecy`)
//! - Mask output in `Debug`/`Display` to prevent accidental leakage
//! - Compare contents in constant time

use crate::error::CryptoError;
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretSlice, SecretString};
use std::fmt;
use zeroize::Zeroize;

/// Constant-time byte comparison.
///
/// Returns `true` iff both slices have equal length and identical contents.
/// Uses bitwise OR accumulation to avoid short-circuit timing leaks. The
/// length check returns early: lengths of wallet secrets are not secret.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

// ---------------------------------------------------------------------------
// SecretBuffer — variable-length bytes
// ---------------------------------------------------------------------------

/// Variable-length buffer for sensitive bytes.
///
/// Wraps [`SecretSlice<u8>`] from the `secrecy` crate and adds masked
/// `Debug` output (`SecretBuffer(***)`). Zeroized on drop.
pub struct SecretBuffer {
    inner: SecretSlice<u8>,
}

impl SecretBuffer {
    /// Create a new `SecretBuffer` from the given data.
    ///
    /// The data is copied into a new allocation. The caller should zeroize
    /// the source data after calling this.
    #[must_use]
    pub fn new(data: &[u8]) -> Self {
        Self {
            inner: data.to_vec().into(),
        }
    }

    /// Create a `SecretBuffer` filled with cryptographically random bytes.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::SecureMemory` if the CSPRNG fails.
    pub fn random(len: usize) -> Result<Self, CryptoError> {
        let mut bytes = vec![0u8; len];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CryptoError::SecureMemory(format!("CSPRNG fill failed: {e}")))?;
        let result = Self::new(&bytes);
        bytes.zeroize();
        Ok(result)
    }

    /// Expose the underlying bytes. Keep exposure minimal.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        self.inner.expose_secret()
    }

    /// Returns the number of bytes in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.expose_secret().len()
    }

    /// Returns `true` if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer(***)")
    }
}

impl fmt::Display for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer(***)")
    }
}

// ---------------------------------------------------------------------------
// Secret — wallet key material as text
// ---------------------------------------------------------------------------

/// Wallet secret: the private key material held in the secret store.
///
/// Opaque UTF-8 text. Zeroized on drop, masked in `Debug`/`Display`,
/// compared in constant time.
pub struct Secret {
    inner: SecretString,
}

impl Secret {
    /// Wrap a secret string.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self {
            inner: SecretString::from(value),
        }
    }

    /// Build a secret from raw bytes, taking ownership of the buffer.
    ///
    /// The buffer is zeroized whether or not it is valid UTF-8.
    ///
    /// # Errors
    ///
    /// Returns the UTF-8 error if the bytes are not valid text.
    pub fn from_utf8(mut bytes: Vec<u8>) -> Result<Self, std::str::Utf8Error> {
        let result = std::str::from_utf8(&bytes).map(Self::new);
        bytes.zeroize();
        result
    }

    /// Expose the secret text. Keep exposure minimal.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.inner.expose_secret()
    }

    /// Returns `true` if the secret is the empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }
}

impl Clone for Secret {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq(self.expose().as_bytes(), other.expose().as_bytes())
    }
}

impl Eq for Secret {}

impl From<String> for Secret {
    fn from(mut value: String) -> Self {
        let secret = Self::new(&value);
        value.zeroize();
        secret
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_buffer_debug_is_masked() {
        let buf = SecretBuffer::new(b"super secret");
        assert_eq!(format!("{buf:?}"), "SecretBuffer(***)");
        assert_eq!(format!("{buf}"), "SecretBuffer(***)");
    }

    #[test]
    fn secret_buffer_random_has_requested_length() {
        let buf = SecretBuffer::random(32).expect("random should succeed");
        assert_eq!(buf.len(), 32);
        assert!(!buf.is_empty());
    }

    #[test]
    fn secret_debug_and_display_are_masked() {
        let secret = Secret::new("abcDEF123secret");
        assert_eq!(format!("{secret:?}"), "Secret(***)");
        assert_eq!(format!("{secret}"), "Secret(***)");
    }

    #[test]
    fn secret_equality_compares_contents() {
        assert_eq!(Secret::new("same"), Secret::new("same"));
        assert_ne!(Secret::new("same"), Secret::new("other"));
        assert_ne!(Secret::new("same"), Secret::new("same "));
    }

    #[test]
    fn secret_from_utf8_rejects_invalid_bytes() {
        assert!(Secret::from_utf8(vec![0xFF, 0xFE]).is_err());
        let ok = Secret::from_utf8(b"wallet".to_vec()).expect("valid utf-8");
        assert_eq!(ok.expose(), "wallet");
    }

    #[test]
    fn constant_time_eq_checks_length_and_content() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(constant_time_eq(b"", b""));
    }
}
