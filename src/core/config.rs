//! INI configuration holding the AutoValidator address and subnet codename.
//!
//! ```ini
//! [autovalidator]
//! autovalidator_address = https://autovalidator.example.com
//! codename = computehorde
//! ```

use std::path::Path;

use ini::Ini;
use serde::Serialize;

use crate::command_source::CommandSourceKind;
use crate::error::{Error, Result};
use crate::utils::io;

pub const SECTION: &str = "autovalidator";
pub const KEY_ADDRESS: &str = "autovalidator_address";
pub const KEY_CODENAME: &str = "codename";
pub const KEY_COMMAND_SOURCE: &str = "command_source";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoValidatorConfig {
    pub autovalidator_address: String,
    pub codename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_source: Option<CommandSourceKind>,
}

/// Keys to set. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigUpdate {
    pub autovalidator_address: Option<String>,
    pub codename: Option<String>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self.autovalidator_address.is_none() && self.codename.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigUpdateResult {
    pub path: String,
    pub created: bool,
    pub updated_keys: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autovalidator_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codename: Option<String>,
}

fn read_ini(path: &Path) -> Result<Ini> {
    let raw = io::read_file(path, "read config")?;
    Ini::load_from_str(&raw)
        .map_err(|e| Error::config_invalid_ini(path.display().to_string(), e.to_string()))
}

fn required(ini: &Ini, key: &str, path: &Path) -> Result<String> {
    ini.get_from(Some(SECTION), key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::config_missing_key(SECTION, key, Some(path.display().to_string())))
}

/// Load both required values. Missing file, bad syntax or a missing key are errors.
pub fn load_config(path: &Path) -> Result<AutoValidatorConfig> {
    if !path.exists() {
        return Err(Error::config_file_not_found(path.display().to_string()));
    }

    let ini = read_ini(path)?;

    let command_source = match ini.get_from(Some(SECTION), KEY_COMMAND_SOURCE) {
        Some(raw) if !raw.trim().is_empty() => Some(raw.parse::<CommandSourceKind>()?),
        _ => None,
    };

    Ok(AutoValidatorConfig {
        autovalidator_address: required(&ini, KEY_ADDRESS, path)?,
        codename: required(&ini, KEY_CODENAME, path)?,
        command_source,
    })
}

/// Read only the optional `command_source` key. A missing file is `None`.
pub fn load_command_source(path: &Path) -> Result<Option<CommandSourceKind>> {
    if !path.exists() {
        return Ok(None);
    }

    let ini = read_ini(path)?;
    match ini.get_from(Some(SECTION), KEY_COMMAND_SOURCE) {
        Some(raw) if !raw.trim().is_empty() => Ok(Some(raw.parse::<CommandSourceKind>()?)),
        _ => Ok(None),
    }
}

/// Set the provided keys, creating the file when absent. Other keys and
/// sections are preserved.
pub fn update_config(path: &Path, update: &ConfigUpdate) -> Result<ConfigUpdateResult> {
    let created = !path.exists();
    let mut ini = if created { Ini::new() } else { read_ini(path)? };

    let mut updated_keys = Vec::new();

    if let Some(address) = update.autovalidator_address.as_deref() {
        ini.with_section(Some(SECTION)).set(KEY_ADDRESS, address.trim());
        updated_keys.push(KEY_ADDRESS.to_string());
    }

    if let Some(codename) = update.codename.as_deref() {
        ini.with_section(Some(SECTION)).set(KEY_CODENAME, codename.trim());
        updated_keys.push(KEY_CODENAME.to_string());
    }

    let mut buf = Vec::new();
    ini.write_to(&mut buf)
        .map_err(|e| Error::internal_io(e.to_string(), Some("serialize config".to_string())))?;
    let content = String::from_utf8(buf)
        .map_err(|e| Error::internal_unexpected(format!("config is not UTF-8: {}", e)))?;

    io::write_file_atomic(path, &content, "write config")?;

    Ok(ConfigUpdateResult {
        path: path.display().to_string(),
        created,
        updated_keys,
        autovalidator_address: ini.get_from(Some(SECTION), KEY_ADDRESS).map(str::to_string),
        codename: ini.get_from(Some(SECTION), KEY_CODENAME).map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("config.ini");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn load_returns_both_values() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "[autovalidator]\nautovalidator_address = http://localhost:8000\ncodename = computehorde\n",
        );

        let config = load_config(&path).unwrap();
        assert_eq!(config.autovalidator_address, "http://localhost:8000");
        assert_eq!(config.codename, "computehorde");
        assert_eq!(config.command_source, None);
    }

    #[test]
    fn load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_config(&dir.path().join("config.ini")).unwrap_err();
        assert_eq!(err.code.as_str(), "config.file_not_found");
    }

    #[test]
    fn load_missing_key() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "[autovalidator]\ncodename = computehorde\n");

        let err = load_config(&path).unwrap_err();
        assert_eq!(err.code.as_str(), "config.missing_key");
        assert_eq!(err.details["key"], KEY_ADDRESS);
    }

    #[test]
    fn load_missing_section() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "[other]\ncodename = computehorde\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn load_reads_command_source() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "[autovalidator]\nautovalidator_address=http://av\ncodename=sn12\ncommand_source=static\n",
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.command_source, Some(CommandSourceKind::Static));
    }

    #[test]
    fn command_source_alone_is_readable() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "[autovalidator]\ncommand_source = static\n");
        assert_eq!(
            load_command_source(&path).unwrap(),
            Some(CommandSourceKind::Static)
        );
    }

    #[test]
    fn command_source_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(load_command_source(&dir.path().join("config.ini")).unwrap(), None);
    }

    #[test]
    fn update_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let result = update_config(
            &path,
            &ConfigUpdate {
                autovalidator_address: Some("http://av".to_string()),
                codename: Some("computehorde".to_string()),
            },
        )
        .unwrap();

        assert!(result.created);
        let config = load_config(&path).unwrap();
        assert_eq!(config.autovalidator_address, "http://av");
        assert_eq!(config.codename, "computehorde");
    }

    #[test]
    fn update_one_key_preserves_the_other() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "[autovalidator]\nautovalidator_address = http://old\ncodename = computehorde\n",
        );

        let result = update_config(
            &path,
            &ConfigUpdate {
                autovalidator_address: Some("http://new".to_string()),
                codename: None,
            },
        )
        .unwrap();

        assert!(!result.created);
        assert_eq!(result.updated_keys, vec![KEY_ADDRESS.to_string()]);

        let config = load_config(&path).unwrap();
        assert_eq!(config.autovalidator_address, "http://new");
        assert_eq!(config.codename, "computehorde");
    }

    #[test]
    fn update_preserves_unrelated_sections() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "[autovalidator]\ncodename = sn12\n\n[extra]\nkeep = yes\n",
        );

        update_config(
            &path,
            &ConfigUpdate {
                autovalidator_address: None,
                codename: Some("computehorde".to_string()),
            },
        )
        .unwrap();

        let ini = Ini::load_from_file(&path).unwrap();
        assert_eq!(ini.get_from(Some("extra"), "keep"), Some("yes"));
        assert_eq!(ini.get_from(Some(SECTION), KEY_CODENAME), Some("computehorde"));
    }
}
