//! Date-derived keys for phrase steganography.
//!
//! A [`DerivedKey`] depends only on the UTC calendar day of a timestamp:
//! `day = timestamp_ms / 86_400_000`. A user who remembers the day a magic
//! phrase was created can rebuild the key on any device, since the salt
//! and Argon2id costs are fixed by configuration rather than stored per
//! wallet.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::kdf::{self, Argon2idParams};
use crate::memory::{constant_time_eq, SecretBuffer};

/// Milliseconds in one UTC day.
pub const MILLIS_PER_DAY: u64 = 86_400_000;

/// Domain prefix mixed into the Argon2id password.
const PASSWORD_PREFIX: &str = "fims-day-key:";

/// Default domain salt. Not secret; must be identical on every device.
pub const DEFAULT_DAY_KEY_SALT: &str = "fims-day-key-salt-v1";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Salt and cost parameters for day-key derivation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayKeyParams {
    /// Domain salt (UTF-8, at least 16 bytes).
    #[serde(default = "default_salt")]
    pub salt: String,
    /// Argon2id cost parameters.
    #[serde(default)]
    pub params: Argon2idParams,
}

impl Default for DayKeyParams {
    fn default() -> Self {
        Self {
            salt: default_salt(),
            params: Argon2idParams::default(),
        }
    }
}

fn default_salt() -> String {
    DEFAULT_DAY_KEY_SALT.into()
}

/// A 256-bit key derived from a UTC calendar day.
///
/// Never persisted. Debug output shows the day but masks the bytes.
pub struct DerivedKey {
    bytes: SecretBuffer,
    day: u64,
}

impl DerivedKey {
    /// Raw key bytes (32).
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        self.bytes.expose()
    }

    /// UTC day index this key was derived for.
    #[must_use]
    pub const fn day(&self) -> u64 {
        self.day
    }
}

impl PartialEq for DerivedKey {
    fn eq(&self, other: &Self) -> bool {
        self.day == other.day && constant_time_eq(self.expose(), other.expose())
    }
}

impl Eq for DerivedKey {}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DerivedKey(day={}, ***)", self.day)
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// UTC day index of a millisecond timestamp.
#[must_use]
pub const fn day_index(timestamp_ms: u64) -> u64 {
    timestamp_ms / MILLIS_PER_DAY
}

/// Milliseconds since the Unix epoch according to the system clock.
///
/// Clocks set before 1970 report `0`.
#[must_use]
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Derive the key for a timestamp, or for "now" when none is given.
///
/// `None` and `Some(0)` both mean the present moment. Any two timestamps
/// on the same UTC day produce the same key.
///
/// # Errors
///
/// Returns `CryptoError::KeyDerivation` if the salt is too short or the
/// Argon2id parameters are invalid.
pub fn derive_key(
    timestamp_ms: Option<u64>,
    params: &DayKeyParams,
) -> Result<DerivedKey, CryptoError> {
    let ts = match timestamp_ms {
        Some(ts) if ts != 0 => ts,
        _ => now_ms(),
    };
    derive_key_for_day(day_index(ts), params)
}

/// Derive the key for a UTC day index.
///
/// # Errors
///
/// Returns `CryptoError::KeyDerivation` if the salt is too short or the
/// Argon2id parameters are invalid.
pub fn derive_key_for_day(day: u64, params: &DayKeyParams) -> Result<DerivedKey, CryptoError> {
    let mut password = format!("{PASSWORD_PREFIX}{day}").into_bytes();
    let result = kdf::derive(&password, params.salt.as_bytes(), &params.params);
    password.zeroize();
    Ok(DerivedKey {
        bytes: result?,
        day,
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
