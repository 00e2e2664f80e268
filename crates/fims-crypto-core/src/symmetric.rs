//! Deterministic AES-256-GCM sealing with a synthetic nonce.
//!
//! This module provides:
//! - [`seal`] — encrypt plaintext under a nonce derived from key + plaintext
//! - [`open`] — decrypt and authenticate [`SealedData`], returning [`SecretBuffer`]
//! - [`SealedData`] — nonce + ciphertext + tag container
//!
//! # Synthetic nonce
//!
//! Magic phrases must be reproducible: hiding the same secret under the
//! same day key yields the same phrase. The nonce is therefore
//! `BLAKE3-keyed(nonce_subkey, aad || plaintext)[..12]`, where the subkey
//! is derived from the AES key with `blake3::derive_key`. A nonce repeats
//! only when the plaintext repeats, and then the ciphertext is identical.
//! [`open`] recomputes the nonce and rejects a mismatch.

use crate::error::CryptoError;
use crate::memory::{constant_time_eq, SecretBuffer};
use ring::aead;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// AES-256-GCM nonce length in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// AES-256-GCM authentication tag length in bytes (128 bits).
pub const TAG_LEN: usize = 16;

/// AES-256-GCM key length in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Minimum valid serialized length: nonce + empty ciphertext + tag.
pub const MIN_SEALED_LEN: usize = NONCE_LEN + TAG_LEN;

/// BLAKE3 context string for the nonce subkey.
const NONCE_CONTEXT: &str = "fims-crypto-core 2024 synthetic nonce";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Authenticated ciphertext container — nonce + ciphertext + tag.
///
/// Wire format: `nonce (12 bytes) || ciphertext (variable) || tag (16 bytes)`.
#[must_use = "sealed data must be stored or transmitted"]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedData {
    /// 96-bit synthetic nonce.
    pub nonce: [u8; NONCE_LEN],
    /// Encrypted data (same length as original plaintext).
    pub ciphertext: Vec<u8>,
    /// 128-bit authentication tag.
    pub tag: [u8; TAG_LEN],
}

impl SealedData {
    /// Serialize to wire format: `nonce || ciphertext || tag`.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let capacity = NONCE_LEN
            .saturating_add(self.ciphertext.len())
            .saturating_add(TAG_LEN);
        let mut out = Vec::with_capacity(capacity);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.tag);
        out
    }

    /// Deserialize from wire format: `nonce || ciphertext || tag`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Encryption` if the input is shorter than 28 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let ct_len = bytes.len().checked_sub(MIN_SEALED_LEN).ok_or_else(|| {
            CryptoError::Encryption(format!(
                "sealed data too short: {} bytes (minimum {MIN_SEALED_LEN})",
                bytes.len()
            ))
        })?;

        let ct_end = NONCE_LEN.saturating_add(ct_len);

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[..NONCE_LEN]);

        let ciphertext = bytes[NONCE_LEN..ct_end].to_vec();

        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&bytes[ct_end..]);

        Ok(Self {
            nonce,
            ciphertext,
            tag,
        })
    }
}

// ---------------------------------------------------------------------------
// Core sealing
// ---------------------------------------------------------------------------

fn aead_key(key: &[u8]) -> Result<aead::LessSafeKey, CryptoError> {
    if key.len() != KEY_LEN {
        return Err(CryptoError::Encryption(format!(
            "invalid key length: {} bytes (expected {KEY_LEN})",
            key.len()
        )));
    }
    let unbound = aead::UnboundKey::new(&aead::AES_256_GCM, key)
        .map_err(|_| CryptoError::Encryption("failed to create AES-256-GCM key".into()))?;
    Ok(aead::LessSafeKey::new(unbound))
}

fn synthetic_nonce(key: &[u8], plaintext: &[u8], aad: &[u8]) -> [u8; NONCE_LEN] {
    let mut subkey = blake3::derive_key(NONCE_CONTEXT, key);
    let mut hasher = blake3::Hasher::new_keyed(&subkey);
    hasher.update(aad);
    hasher.update(plaintext);
    let digest = hasher.finalize();
    subkey.zeroize();

    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&digest.as_bytes()[..NONCE_LEN]);
    nonce
}

/// Seal plaintext with AES-256-GCM under a synthetic nonce.
///
/// Deterministic: identical inputs produce identical [`SealedData`].
///
/// # Errors
///
/// Returns `CryptoError::Encryption` if the key is not exactly 32 bytes or
/// the underlying encryption fails.
pub fn seal(plaintext: &[u8], key: &[u8], aad: &[u8]) -> Result<SealedData, CryptoError> {
    let less_safe_key = aead_key(key)?;

    let nonce_bytes = synthetic_nonce(key, plaintext, aad);
    let nonce = aead::Nonce::assume_unique_for_key(nonce_bytes);

    let mut in_out = plaintext.to_vec();
    let Ok(tag) =
        less_safe_key.seal_in_place_separate_tag(nonce, aead::Aad::from(aad), &mut in_out)
    else {
        in_out.zeroize();
        return Err(CryptoError::Encryption(
            "AES-256-GCM encryption failed".into(),
        ));
    };

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(tag.as_ref());

    Ok(SealedData {
        nonce: nonce_bytes,
        ciphertext: in_out,
        tag: tag_bytes,
    })
}

/// Open sealed data and check its synthetic nonce.
///
/// # Errors
///
/// Returns `CryptoError::Encryption` if the key is not exactly 32 bytes.
/// Returns `CryptoError::Decryption` if authentication fails (tampered data,
/// wrong key, wrong AAD) or the nonce was not derived from this plaintext.
pub fn open(sealed: &SealedData, key: &[u8], aad: &[u8]) -> Result<SecretBuffer, CryptoError> {
    let less_safe_key = aead_key(key)?;
    let nonce = aead::Nonce::assume_unique_for_key(sealed.nonce);

    let mut ct_tag = Vec::with_capacity(sealed.ciphertext.len().saturating_add(TAG_LEN));
    ct_tag.extend_from_slice(&sealed.ciphertext);
    ct_tag.extend_from_slice(&sealed.tag);

    let result = match less_safe_key.open_in_place(nonce, aead::Aad::from(aad), &mut ct_tag) {
        Ok(plaintext) => {
            let expected = synthetic_nonce(key, plaintext, aad);
            if constant_time_eq(&expected, &sealed.nonce) {
                Ok(SecretBuffer::new(plaintext))
            } else {
                Err(CryptoError::Decryption)
            }
        }
        Err(_) => Err(CryptoError::Decryption),
    };
    ct_tag.zeroize();
    result
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
