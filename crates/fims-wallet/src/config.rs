//! Wallet configuration — plain JSON next to the secret store.
//!
//! Nothing here is secret: the day-key salt and costs must be identical on
//! every device that should be able to recover a magic phrase, so they are
//! deployment constants rather than per-wallet values.

use std::fs;
use std::path::Path;

use fims_crypto_core::DayKeyParams;
use serde::{Deserialize, Serialize};

/// Default secret store slot name.
pub const DEFAULT_SLOT_NAME: &str = "FiMs";

/// 2023-03-01T00:00:00Z — no magic phrase predates this.
pub const DEFAULT_RECENCY_FLOOR_MS: u64 = 1_677_628_800_000;

// ── Top-level config ───────────────────────────────────────────────

/// Wallet onboarding configuration.
///
/// Persisted to `{data_dir}/wallet-config.json`. All fields have defaults
/// via [`Default`], so a partial file is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WalletConfig {
    /// Name of the secret store slot holding the wallet secret.
    #[serde(default = "default_slot_name")]
    pub slot_name: String,

    /// Earliest recovery date accepted, in ms since the Unix epoch.
    #[serde(default = "default_recency_floor")]
    pub recency_floor_ms: u64,

    /// Salt and Argon2id costs for day-key derivation.
    #[serde(default)]
    pub day_key: DayKeyParams,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            slot_name: default_slot_name(),
            recency_floor_ms: default_recency_floor(),
            day_key: DayKeyParams::default(),
        }
    }
}

fn default_slot_name() -> String {
    DEFAULT_SLOT_NAME.into()
}
const fn default_recency_floor() -> u64 {
    DEFAULT_RECENCY_FLOOR_MS
}

// ── File I/O ───────────────────────────────────────────────────────

const CONFIG_FILE: &str = "wallet-config.json";

impl WalletConfig {
    /// Load configuration from `{data_dir}/wallet-config.json`.
    ///
    /// Returns [`Default::default()`] when the file is missing or contains
    /// invalid JSON.
    #[must_use]
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(CONFIG_FILE);
        let Ok(contents) = fs::read_to_string(&path) else {
            return Self::default();
        };
        serde_json::from_str(&contents).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), "Ignoring corrupt wallet config: {e}");
            Self::default()
        })
    }

    /// Persist configuration to `{data_dir}/wallet-config.json`.
    ///
    /// Writes to a `.tmp` file first, then renames over the target.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if the directory does not exist or the file
    /// system rejects the write/rename.
    pub fn save(&self, data_dir: &Path) -> std::io::Result<()> {
        let path = data_dir.join(CONFIG_FILE);
        let tmp = data_dir.join(".wallet-config.json.tmp");

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(&tmp, &json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp, &path)?;

        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────
