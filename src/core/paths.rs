use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Expand a user-supplied directory (`~` aware) into a path.
pub fn expand_dir(raw: &str) -> Result<PathBuf> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::validation_invalid_argument(
            "path",
            "Path cannot be empty",
            None,
        ));
    }
    Ok(PathBuf::from(shellexpand::tilde(trimmed).to_string()))
}

/// `config.ini` inside the configuration directory
pub fn config_file(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Hotkey keyfile: `{wallet_path}/{name}/hotkeys/{hotkey}`
pub fn hotkey_file(wallet_path: &Path, name: &str, hotkey: &str) -> PathBuf {
    wallet_path.join(name).join("hotkeys").join(hotkey)
}

/// Per-command output file: `{codename}_{index}.txt`
pub fn command_output_file(output_dir: &Path, codename: &str, index: usize) -> PathBuf {
    output_dir.join(format!("{}_{}.txt", codename, index))
}

/// Archive file: `{codename}-output.zip`
pub fn archive_file(output_dir: &Path, codename: &str) -> PathBuf {
    output_dir.join(format!("{}-output.zip", codename))
}
