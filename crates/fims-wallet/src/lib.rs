//! `fims-wallet` — Wallet onboarding for the `FiMs` point of sale.
//!
//! Drives the key-custody workflow: create a magic phrase that carries the
//! wallet secret invisibly, verify it, or recover the wallet from it with
//! the date it was created on.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod config;
pub mod error;
pub mod keygen;
pub mod onboarding;
pub mod platform;
pub mod store;
pub mod validation;

pub use config::{WalletConfig, DEFAULT_RECENCY_FLOOR_MS, DEFAULT_SLOT_NAME};
pub use error::WalletError;
pub use keygen::{create_wallet_secret, generate_secret, SECRET_ENTROPY_LEN};
pub use onboarding::{accept_revealed, InputGate, Onboarding, OnboardingState, Phase};
pub use platform::{
    Clipboard, Clock, FixedClock, RecoveredCredential, SystemClock, WalletConnector,
};
pub use store::{FileSecretStore, MemorySecretStore, SecretStore};
pub use validation::{
    date_within_bounds, matches_phrase_pattern, parse_recovery_date, utc_date, DATE_FORMAT,
};
