//! Wallet error types for `fims-wallet`.

use fims_crypto_core::CryptoError;
use thiserror::Error;

use crate::onboarding::Phase;

/// Errors produced by wallet operations.
///
/// Only [`WalletError::WalletNotReady`] is an expected runtime failure of
/// the onboarding flow. Failed reveals never surface here; they become the
/// `invalid` flag and the input lockout instead.
#[derive(Debug, Error)]
pub enum WalletError {
    /// No wallet secret is stored on this device, but the flow needs one.
    #[error("wallet not ready: wallet key not found")]
    WalletNotReady,

    /// Cryptographic operation failed (delegated from crypto-core).
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Secret store contents could not be read or written.
    #[error("secret store error: {0}")]
    Storage(String),

    /// I/O error from the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Clipboard write failed.
    #[error("clipboard error: {0}")]
    Clipboard(String),

    /// The wallet connection collaborator rejected the handoff.
    #[error("wallet connection failed: {0}")]
    Connector(String),

    /// The requested action does not exist in the current phase.
    #[error("{action} is not available in the {phase:?} phase")]
    InvalidTransition {
        /// Phase the machine was in.
        phase: Phase,
        /// Name of the rejected action.
        action: &'static str,
    },

    /// A transition found `loading` set. Unreachable through `&mut self`
    /// callers because every transition clears the flag before returning.
    #[error("an operation is already in progress")]
    Busy,

    /// The action's guard is not satisfied (the button would be disabled).
    #[error("action not allowed: {0}")]
    GuardRejected(&'static str),

    /// A wallet secret already exists and overwriting was not requested.
    #[error("a wallet secret already exists")]
    AlreadyExists,
}
