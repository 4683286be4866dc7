//! Credential loading
//!
//! Keypairs come either from a JSON byte-array file (solana-keygen format)
//! or from a base58-encoded secret in the `PRIVATE_KEY` environment variable.

use std::path::Path;

use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use tracing::info;

use crate::error::{Error, Result};

/// Load a keypair from a solana-keygen JSON file
///
/// Refuses world- or group-readable files on Unix.
pub fn load_keypair(path: &Path) -> Result<Keypair> {
    if !path.exists() {
        return Err(Error::Config(format!(
            "Keypair file not found: {}",
            path.display()
        )));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(path)?.permissions().mode();
        if mode & 0o077 != 0 {
            return Err(Error::InsecureKeypair(format!(
                "{} has permissions {:o}; run 'chmod 600 {}' to fix",
                path.display(),
                mode & 0o777,
                path.display()
            )));
        }
    }

    let data = std::fs::read_to_string(path)?;
    let secret_key: Vec<u8> = serde_json::from_str(&data)
        .map_err(|e| Error::InvalidKeypair(format!("{}: {}", path.display(), e)))?;
    let keypair = Keypair::from_bytes(&secret_key)
        .map_err(|e| Error::InvalidKeypair(format!("{}: {}", path.display(), e)))?;

    info!("Loaded keypair: {}", keypair.pubkey());
    Ok(keypair)
}

/// Parse a base58-encoded secret key (Phantom export format)
pub fn keypair_from_base58(encoded: &str) -> Result<Keypair> {
    let bytes = bs58::decode(encoded.trim())
        .into_vec()
        .map_err(|e| Error::InvalidKeypair(format!("base58 decode failed: {}", e)))?;
    Keypair::from_bytes(&bytes).map_err(|e| Error::InvalidKeypair(e.to_string()))
}
