//! Argon2id key derivation.
//!
//! This module provides:
//! - [`derive`] — derive a 256-bit key from a password + salt using Argon2id
//! - [`Argon2idParams`] — serializable parameter set (stored in wallet config)
//!
//! Day keys ([`crate::day_key`]) are built on top of [`derive`]: the
//! password is the day index and the salt is a fixed domain salt, so the
//! cost parameters are the only defence against guessing the date.

use crate::error::CryptoError;
use crate::memory::SecretBuffer;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Output length of the KDF in bytes (256 bits).
pub const OUTPUT_LEN: usize = 32;

/// Minimum salt length in bytes. We enforce 16 (stricter than argon2's 8).
pub const MIN_SALT_LEN: usize = 16;

/// 19 MiB in KiB — the OWASP baseline for interactive Argon2id.
const MEMORY_19MIB: u32 = 19_456;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Argon2id parameter set.
///
/// Fields use the `argon2` crate convention:
/// - `m_cost`: memory in KiB (NOT bytes, NOT MB)
/// - `t_cost`: number of iterations
/// - `p_cost`: degree of parallelism
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Argon2idParams {
    /// Memory cost in kibibytes (1 KiB = 1024 bytes).
    pub m_cost: u32,
    /// Number of iterations (time cost).
    pub t_cost: u32,
    /// Degree of parallelism (number of lanes).
    pub p_cost: u32,
}

impl Default for Argon2idParams {
    /// Interactive preset: derivation runs on every keystroke during
    /// phrase verification, so it must stay well under a second.
    fn default() -> Self {
        Self {
            m_cost: MEMORY_19MIB,
            t_cost: 2,
            p_cost: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Core KDF
// ---------------------------------------------------------------------------

/// Derive a 256-bit key from a password and salt using Argon2id.
///
/// Returns a [`SecretBuffer`] containing 32 bytes. The intermediate buffer
/// is zeroized after copying into the `SecretBuffer`.
///
/// # Errors
///
/// Returns `CryptoError::KeyDerivation` if:
/// - The salt is shorter than 16 bytes
/// - The argon2 parameters are invalid
/// - The derivation itself fails (e.g., memory allocation)
pub fn derive(
    password: &[u8],
    salt: &[u8],
    params: &Argon2idParams,
) -> Result<SecretBuffer, CryptoError> {
    if salt.len() < MIN_SALT_LEN {
        return Err(CryptoError::KeyDerivation(format!(
            "salt too short: {} bytes (minimum {MIN_SALT_LEN})",
            salt.len()
        )));
    }

    let argon2_params = argon2::Params::new(
        params.m_cost,
        params.t_cost,
        params.p_cost,
        Some(OUTPUT_LEN),
    )
    .map_err(|e| CryptoError::KeyDerivation(format!("invalid argon2 params: {e}")))?;

    let argon2 = argon2::Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2_params,
    );

    let mut output = [0u8; OUTPUT_LEN];
    argon2
        .hash_password_into(password, salt, &mut output)
        .map_err(|e| CryptoError::KeyDerivation(format!("argon2id derivation failed: {e}")))?;

    let result = SecretBuffer::new(&output);
    output.zeroize();
    Ok(result)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
