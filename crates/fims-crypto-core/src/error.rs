//! Cryptographic error types for `fims-crypto-core`.

use thiserror::Error;

/// Errors produced by cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key derivation failed (Argon2id parameter validation, short salt).
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Symmetric sealing failure (AES-256-GCM key setup, wrong key length).
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Authentication tag verification failed — ciphertext tampered or wrong key.
    #[error("decryption failed: authentication tag mismatch")]
    Decryption,

    /// Secure memory allocation or CSPRNG failure.
    #[error("secure memory error: {0}")]
    SecureMemory(String),

    /// The cover phrase cannot carry a hidden payload.
    #[error("steganography error: {0}")]
    Steganography(String),
}

/// Reasons a candidate phrase did not yield a secret.
///
/// These are recoverable: the onboarding flow turns them into an
/// "invalid" flag rather than surfacing them as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExtractionFailure {
    /// The candidate carries no hidden characters at all.
    #[error("no hidden payload in phrase")]
    NoPayload,

    /// Hidden characters are present but do not form a valid payload.
    #[error("hidden payload is malformed")]
    Malformed,

    /// The payload does not open under this key (wrong date or tampered phrase).
    #[error("hidden payload does not authenticate under this key")]
    Authentication,

    /// The payload opened but is not a UTF-8 secret.
    #[error("hidden payload is not valid UTF-8")]
    NotUtf8,
}
