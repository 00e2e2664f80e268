//! Wallet secret generation.
//!
//! Used by the wallet-creation flow that runs before onboarding: it fills
//! the secret store slot that the Create and Verify phases later read.

use data_encoding::HEXLOWER;
use fims_crypto_core::{Secret, SecretBuffer};
use zeroize::Zeroize;

use crate::error::WalletError;
use crate::store::SecretStore;

/// Secret entropy in bytes (256 bits).
pub const SECRET_ENTROPY_LEN: usize = 32;

/// Generate a fresh wallet secret: 256 bits from the OS CSPRNG, hex-encoded.
///
/// # Errors
///
/// Returns [`WalletError::Crypto`] if the CSPRNG fails.
pub fn generate_secret() -> Result<Secret, WalletError> {
    let entropy = SecretBuffer::random(SECRET_ENTROPY_LEN)?;
    let mut encoded = HEXLOWER.encode(entropy.expose());
    let secret = Secret::new(&encoded);
    encoded.zeroize();
    Ok(secret)
}

/// Generate a wallet secret and store it.
///
/// Refuses to replace an existing secret unless `overwrite` is set.
///
/// # Errors
///
/// - [`WalletError::AlreadyExists`] if a secret is stored and `overwrite` is false
/// - [`WalletError::Crypto`] if the CSPRNG fails
/// - any error from the store
pub fn create_wallet_secret<S: SecretStore>(
    store: &mut S,
    overwrite: bool,
) -> Result<Secret, WalletError> {
    if !overwrite && store.read_secret()?.is_some() {
        return Err(WalletError::AlreadyExists);
    }
    let secret = generate_secret()?;
    store.write_secret(&secret)?;
    tracing::info!(overwrite, "Wallet secret created");
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySecretStore;

    #[test]
    fn generated_secret_is_64_hex_chars() {
        let secret = generate_secret().unwrap();
        assert_eq!(secret.expose().len(), 64);
        assert!(secret
            .expose()
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn generated_secrets_differ() {
        assert_ne!(generate_secret().unwrap(), generate_secret().unwrap());
    }

    #[test]
    fn create_wallet_secret_fills_empty_store() {
        let mut store = MemorySecretStore::new();
        let secret = create_wallet_secret(&mut store, false).unwrap();
        assert_eq!(store.require_secret().unwrap(), secret);
    }

    #[test]
    fn create_wallet_secret_refuses_overwrite() {
        let mut store = MemorySecretStore::with_secret("existing");
        assert!(matches!(
            create_wallet_secret(&mut store, false),
            Err(WalletError::AlreadyExists)
        ));
        assert_eq!(store.require_secret().unwrap().expose(), "existing");
    }

    #[test]
    fn create_wallet_secret_overwrites_when_asked() {
        let mut store = MemorySecretStore::with_secret("existing");
        let secret = create_wallet_secret(&mut store, true).unwrap();
        assert_eq!(store.require_secret().unwrap(), secret);
        assert_ne!(secret.expose(), "existing");
    }
}
