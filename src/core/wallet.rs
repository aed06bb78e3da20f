//! Signing capability used to authenticate AutoValidator requests.
//!
//! Request code only sees the [`Wallet`] trait. [`Sr25519Hotkey`] is the
//! concrete implementation, reading a hotkey keyfile in the usual bittensor
//! JSON layout:
//!
//! ```json
//! { "secretSeed": "0x…", "publicKey": "0x…", "ss58Address": "5…" }
//! ```

use std::path::Path;

use schnorrkel::{ExpansionMode, Keypair, MiniSecretKey, PublicKey, SecretKey, Signature};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::utils::io;

/// Substrate signing context for sr25519 signatures.
pub const SIGNING_CONTEXT: &[u8] = b"substrate";

pub trait Wallet {
    /// Public identity sent alongside signatures (the `Hotkey` header).
    fn identity(&self) -> &str;

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HotkeyFile {
    #[serde(default)]
    secret_seed: Option<String>,
    #[serde(default)]
    private_key: Option<String>,
    #[serde(default)]
    ss58_address: Option<String>,
}

pub struct Sr25519Hotkey {
    keypair: Keypair,
    identity: String,
}

impl std::fmt::Debug for Sr25519Hotkey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sr25519Hotkey")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

fn decode_hex(value: &str) -> std::result::Result<Vec<u8>, hex::FromHexError> {
    let trimmed = value.trim();
    hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
}

impl Sr25519Hotkey {
    /// Build from a 32-byte mini secret seed, expanded the substrate way.
    pub fn from_seed(seed: &[u8], identity: Option<String>) -> Result<Self> {
        let mini = MiniSecretKey::from_bytes(seed)
            .map_err(|e| Error::wallet_key_invalid("<seed>", e.to_string()))?;
        Ok(Self::from_keypair(
            mini.expand_to_keypair(ExpansionMode::Ed25519),
            identity,
        ))
    }

    fn from_keypair(keypair: Keypair, identity: Option<String>) -> Self {
        let identity = identity
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("0x{}", hex::encode(keypair.public.to_bytes())));
        Self { keypair, identity }
    }

    /// Load a hotkey keyfile. `secretSeed` wins over `privateKey`.
    pub fn load(path: &Path) -> Result<Self> {
        let display = path.display().to_string();

        if !path.exists() {
            return Err(Error::wallet_key_invalid(&display, "hotkey file not found")
                .with_hint("Pass --wallet-name/--wallet-hotkey/--wallet-path or set BT_WALLET_*"));
        }

        let raw = io::read_file(path, "read hotkey")?;
        let file: HotkeyFile = serde_json::from_str(&raw).map_err(|e| {
            Error::wallet_key_invalid(&display, format!("not a JSON keyfile: {}", e))
                .with_hint("Encrypted hotkeys are not supported")
        })?;

        if let Some(seed) = file.secret_seed.as_deref() {
            let bytes = decode_hex(seed)
                .map_err(|e| Error::wallet_key_invalid(&display, format!("secretSeed: {}", e)))?;
            let mini = MiniSecretKey::from_bytes(&bytes)
                .map_err(|e| Error::wallet_key_invalid(&display, format!("secretSeed: {}", e)))?;
            return Ok(Self::from_keypair(
                mini.expand_to_keypair(ExpansionMode::Ed25519),
                file.ss58_address,
            ));
        }

        if let Some(private) = file.private_key.as_deref() {
            let bytes = decode_hex(private)
                .map_err(|e| Error::wallet_key_invalid(&display, format!("privateKey: {}", e)))?;
            let secret = SecretKey::from_ed25519_bytes(&bytes)
                .map_err(|e| Error::wallet_key_invalid(&display, format!("privateKey: {}", e)))?;
            return Ok(Self::from_keypair(secret.to_keypair(), file.ss58_address));
        }

        Err(Error::wallet_key_invalid(
            &display,
            "keyfile has neither secretSeed nor privateKey",
        ))
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public
    }

    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        Signature::from_bytes(signature)
            .and_then(|sig| {
                self.keypair
                    .public
                    .verify_simple(SIGNING_CONTEXT, message, &sig)
            })
            .is_ok()
    }
}

impl Wallet for Sr25519Hotkey {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        Ok(self
            .keypair
            .sign_simple(SIGNING_CONTEXT, message)
            .to_bytes()
            .to_vec())
    }
}
