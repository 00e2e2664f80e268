//! Host collaborators: clock, clipboard and wallet connection.
//!
//! The onboarding flow never touches the system directly. A desktop or web
//! host implements these traits; tests use in-memory fakes.

use fims_crypto_core::{now_ms, Secret};

use crate::error::WalletError;

// ── Clock ────────────────────────────────────────────────────────────

/// Source of the current time in ms since the Unix epoch.
pub trait Clock {
    /// Current time in milliseconds.
    fn now_ms(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        now_ms()
    }
}

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_ms(&self) -> u64 {
        self.0
    }
}

// ── Clipboard ────────────────────────────────────────────────────────

/// System clipboard.
pub trait Clipboard {
    /// Replace the clipboard contents with `text`.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::Clipboard`] if the platform refuses the write.
    fn write_text(&mut self, text: &str) -> Result<(), WalletError>;
}

// ── Wallet connection ────────────────────────────────────────────────

/// Secret recovered from a magic phrase and the date it was created on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredCredential {
    /// The revealed wallet secret.
    pub secret: Secret,
    /// UTC midnight of the recovery date, in ms.
    pub timestamp_ms: u64,
}

/// Wallet adapter that establishes the session once onboarding finishes.
pub trait WalletConnector {
    /// Complete the connection.
    ///
    /// `recovered` is `Some` on the date-based recovery path. It is `None`
    /// when the phrase was checked against the secret already stored on
    /// this device; the connector uses that stored secret.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::Connector`] if the session cannot be established.
    fn finish_connecting(
        &mut self,
        recovered: Option<RecoveredCredential>,
    ) -> Result<(), WalletError>;
}
