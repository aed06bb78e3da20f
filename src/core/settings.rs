//! Process-level settings gathered once at startup.
//!
//! Everything the run needs from the environment is read here and passed
//! down explicitly. Nothing below this module calls `std::env`.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::paths;

pub const CONFIG_DIR_VAR: &str = "CONFIG_DIR";
pub const WALLET_NAME_VAR: &str = "BT_WALLET_NAME";
pub const WALLET_HOTKEY_VAR: &str = "BT_WALLET_HOTKEY";
pub const WALLET_PATH_VAR: &str = "BT_WALLET_PATH";

pub const DEFAULT_WALLET_NAME: &str = "validator";
pub const DEFAULT_WALLET_HOTKEY: &str = "validator-hotkey";
pub const DEFAULT_WALLET_PATH: &str = "~/.bittensor/wallets";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletSettings {
    pub name: String,
    pub hotkey: String,
    pub path: PathBuf,
}

impl WalletSettings {
    pub fn hotkey_file(&self) -> PathBuf {
        paths::hotkey_file(&self.path, &self.name, &self.hotkey)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub config_dir: PathBuf,
    pub wallet: WalletSettings,
}

impl Settings {
    pub fn config_file(&self) -> PathBuf {
        paths::config_file(&self.config_dir)
    }

    /// Build settings from the process environment.
    ///
    /// Call `dotenvy::dotenv()` before this if `.env` files should apply.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. `CONFIG_DIR` is required.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_dir = lookup(CONFIG_DIR_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::config_missing_env(CONFIG_DIR_VAR))?;

        let non_empty = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            config_dir: paths::expand_dir(&config_dir)?,
            wallet: WalletSettings {
                name: non_empty(WALLET_NAME_VAR, DEFAULT_WALLET_NAME),
                hotkey: non_empty(WALLET_HOTKEY_VAR, DEFAULT_WALLET_HOTKEY),
                path: paths::expand_dir(&non_empty(WALLET_PATH_VAR, DEFAULT_WALLET_PATH))?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_config_dir_is_fatal() {
        let err = Settings::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err.code.as_str(), "config.missing_env");
    }

    #[test]
    fn blank_config_dir_is_fatal() {
        assert!(Settings::from_lookup(lookup(&[(CONFIG_DIR_VAR, "  ")])).is_err());
    }

    #[test]
    fn wallet_defaults_apply() {
        let settings = Settings::from_lookup(lookup(&[(CONFIG_DIR_VAR, "/etc/dumper")])).unwrap();
        assert_eq!(settings.config_file(), PathBuf::from("/etc/dumper/config.ini"));
        assert_eq!(settings.wallet.name, "validator");
        assert_eq!(settings.wallet.hotkey, "validator-hotkey");
    }

    #[test]
    fn wallet_overrides_from_env() {
        let settings = Settings::from_lookup(lookup(&[
            (CONFIG_DIR_VAR, "/etc/dumper"),
            (WALLET_NAME_VAR, "miner"),
            (WALLET_HOTKEY_VAR, "default"),
            (WALLET_PATH_VAR, "/srv/wallets"),
        ]))
        .unwrap();
        assert_eq!(
            settings.wallet.hotkey_file(),
            PathBuf::from("/srv/wallets/miner/hotkeys/default")
        );
    }
}
