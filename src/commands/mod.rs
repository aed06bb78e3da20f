use autodumper::settings::{Settings, WalletSettings};
use serde::Serialize;

use crate::output;

pub type CmdResult<T> = autodumper::Result<(T, i32)>;

pub mod config;
pub mod dump;

#[derive(Debug, Serialize)]
pub struct RunOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<config::ConfigOutput>,
    #[serde(flatten)]
    dump: dump::DumpOutput,
}

/// Apply any `--set-*` updates, then dump with the resulting config.
pub(crate) fn run(
    dump_args: &dump::DumpArgs,
    config_args: &config::ConfigArgs,
    global: &GlobalArgs,
) -> CmdResult<RunOutput> {
    let config = if config_args.has_updates() {
        let (output, _) = config::run(config_args, global)?;
        Some(output)
    } else {
        None
    };

    let (dump, exit_code) = dump::run(dump_args, global)?;
    Ok((RunOutput { config, dump }, exit_code))
}

pub(crate) fn run_json(
    dump_args: &dump::DumpArgs,
    config_args: &config::ConfigArgs,
    global: &GlobalArgs,
) -> (autodumper::Result<serde_json::Value>, i32) {
    output::map_cmd_result_to_json(run(dump_args, config_args, global))
}

/// Process-wide inputs shared by every command handler.
pub struct GlobalArgs {
    pub settings: Settings,
}

impl GlobalArgs {
    /// Wallet settings with CLI flags layered over the environment.
    pub(crate) fn wallet(
        &self,
        name: Option<&str>,
        hotkey: Option<&str>,
        path: Option<&str>,
    ) -> autodumper::Result<WalletSettings> {
        let defaults = &self.settings.wallet;
        Ok(WalletSettings {
            name: name.map(str::to_string).unwrap_or_else(|| defaults.name.clone()),
            hotkey: hotkey
                .map(str::to_string)
                .unwrap_or_else(|| defaults.hotkey.clone()),
            path: match path {
                Some(raw) => autodumper::paths::expand_dir(raw)?,
                None => defaults.path.clone(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn global(dir: &TempDir) -> GlobalArgs {
        GlobalArgs {
            settings: Settings {
                config_dir: dir.path().join("config"),
                wallet: WalletSettings {
                    name: "validator".to_string(),
                    hotkey: "validator-hotkey".to_string(),
                    path: dir.path().join("wallets"),
                },
            },
        }
    }

    #[test]
    fn set_flags_are_followed_by_a_dump() {
        let dir = TempDir::new().unwrap();
        let global = global(&dir);
        let config_args = config::ConfigArgs {
            set_autovalidator_address: Some("http://127.0.0.1:9".to_string()),
            set_codename: Some("sn12".to_string()),
        };
        let dump_args = dump::DumpArgs {
            output_dir: dir.path().join("out").display().to_string(),
            ..Default::default()
        };

        let err = run(&dump_args, &config_args, &global).err().unwrap();

        // The freshly written config was loaded and the run got as far as
        // the wallet, which does not exist here.
        assert_eq!(err.code.as_str(), "wallet.key_invalid");
        let stored = autodumper::config::load_config(&global.settings.config_file()).unwrap();
        assert_eq!(stored.codename, "sn12");
    }

    #[test]
    fn dump_without_config_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let global = global(&dir);
        let dump_args = dump::DumpArgs {
            output_dir: dir.path().display().to_string(),
            ..Default::default()
        };

        let err = run(&dump_args, &config::ConfigArgs::default(), &global)
            .err()
            .unwrap();

        assert_eq!(err.code.as_str(), "config.file_not_found");
    }
}
