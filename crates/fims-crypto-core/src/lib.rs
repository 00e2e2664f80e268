//! `fims-crypto-core` — Pure cryptographic primitives for the FiMs wallet.
//!
//! Day-derived keys, deterministic sealing and zero-width phrase
//! steganography. Zero network, zero async, zero storage: the wallet
//! crate owns every side effect.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
pub mod memory;

pub mod kdf;
pub mod symmetric;

pub mod day_key;

pub mod stego;

pub use day_key::{
    day_index, derive_key, derive_key_for_day, now_ms, DayKeyParams, DerivedKey, MILLIS_PER_DAY,
};
pub use error::{CryptoError, ExtractionFailure};
pub use kdf::{derive, Argon2idParams};
pub use memory::{constant_time_eq, Secret, SecretBuffer};
pub use stego::{hide, insertion_point, reveal, strip_payload, MagicPhrase};
pub use symmetric::{open, seal, SealedData};
