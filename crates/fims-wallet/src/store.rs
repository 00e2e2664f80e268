//! Secret store: the single named slot holding the wallet secret.
//!
//! This module provides:
//! - [`SecretStore`] — read/write contract used by the onboarding flow
//! - [`FileSecretStore`] — JSON slot file in the app data directory
//! - [`MemorySecretStore`] — in-memory store for tests and ephemeral sessions
//!
//! Single user, single writer: no locking, last write wins.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fims_crypto_core::Secret;
use zeroize::Zeroize;

use crate::error::WalletError;

/// Slot file name inside the data directory.
const SLOTS_FILE: &str = "wallet-slots.json";

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// Persistent storage for the wallet secret.
pub trait SecretStore {
    /// Read the wallet secret; `Ok(None)` when no wallet was ever created.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::Storage`] or [`WalletError::Io`] if the backing
    /// storage exists but cannot be read.
    fn read_secret(&self) -> Result<Option<Secret>, WalletError>;

    /// Store the wallet secret, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::Storage`] or [`WalletError::Io`] on write failure.
    fn write_secret(&mut self, value: &Secret) -> Result<(), WalletError>;

    /// Read the wallet secret, treating absence as a precondition failure.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::WalletNotReady`] when no secret is stored, or
    /// any error from [`SecretStore::read_secret`].
    fn require_secret(&self) -> Result<Secret, WalletError> {
        self.read_secret()?.ok_or(WalletError::WalletNotReady)
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Secret store kept in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySecretStore {
    secret: Option<Secret>,
}

impl MemorySecretStore {
    /// Empty store: no wallet created yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { secret: None }
    }

    /// Store pre-populated with a secret.
    #[must_use]
    pub fn with_secret(value: &str) -> Self {
        Self {
            secret: Some(Secret::new(value)),
        }
    }
}

impl SecretStore for MemorySecretStore {
    fn read_secret(&self) -> Result<Option<Secret>, WalletError> {
        Ok(self.secret.clone())
    }

    fn write_secret(&mut self, value: &Secret) -> Result<(), WalletError> {
        self.secret = Some(value.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File store
// ---------------------------------------------------------------------------

/// Secret store backed by `{data_dir}/wallet-slots.json`.
///
/// The file maps slot names to secret strings so other slots written by
/// the host application are preserved. Writes are atomic (`.tmp` then
/// rename) and owner-only on Unix.
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    data_dir: PathBuf,
    slot: String,
}

impl FileSecretStore {
    /// Store for `slot` inside `data_dir`.
    #[must_use]
    pub fn new(data_dir: &Path, slot: &str) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            slot: slot.to_string(),
        }
    }

    /// Path of the slot file.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.data_dir.join(SLOTS_FILE)
    }

    fn load_slots(&self) -> Result<BTreeMap<String, String>, WalletError> {
        let mut contents = match fs::read_to_string(self.path()) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        let slots = serde_json::from_str(&contents)
            .map_err(|e| WalletError::Storage(format!("corrupt slot file: {e}")));
        contents.zeroize();
        slots
    }

    fn save_slots(&self, slots: &BTreeMap<String, String>) -> Result<(), WalletError> {
        let tmp = self.data_dir.join(".wallet-slots.json.tmp");

        let mut json = serde_json::to_string(slots)
            .map_err(|e| WalletError::Storage(format!("slot serialization failed: {e}")))?;
        let written = fs::write(&tmp, &json);
        json.zeroize();
        written?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp, self.path())?;
        Ok(())
    }
}

fn zeroize_slots(slots: &mut BTreeMap<String, String>) {
    for value in slots.values_mut() {
        value.zeroize();
    }
}

impl SecretStore for FileSecretStore {
    fn read_secret(&self) -> Result<Option<Secret>, WalletError> {
        let mut slots = self.load_slots()?;
        let secret = slots.get(&self.slot).map(|v| Secret::new(v));
        zeroize_slots(&mut slots);
        Ok(secret)
    }

    fn write_secret(&mut self, value: &Secret) -> Result<(), WalletError> {
        let mut slots = self.load_slots()?;
        if let Some(mut old) = slots.insert(self.slot.clone(), value.expose().to_string()) {
            old.zeroize();
        }
        let result = self.save_slots(&slots);
        zeroize_slots(&mut slots);
        result
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
