use clap::Args;
use serde::Serialize;

use autodumper::config::{self, ConfigUpdate, ConfigUpdateResult};
use autodumper::log_status;

use super::CmdResult;

#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Set a new autovalidator address
    #[arg(long = "set-autovalidator-address", value_name = "URL")]
    pub set_autovalidator_address: Option<String>,

    /// Set a new Subnet Identifier codename
    #[arg(long = "set-codename", value_name = "CODENAME")]
    pub set_codename: Option<String>,
}

impl ConfigArgs {
    fn non_empty(value: &Option<String>) -> Option<String> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn update(&self) -> ConfigUpdate {
        ConfigUpdate {
            autovalidator_address: Self::non_empty(&self.set_autovalidator_address),
            codename: Self::non_empty(&self.set_codename),
        }
    }

    pub fn has_updates(&self) -> bool {
        !self.update().is_empty()
    }
}

#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    command: String,
    #[serde(flatten)]
    result: ConfigUpdateResult,
}

pub fn run(args: &ConfigArgs, global: &crate::commands::GlobalArgs) -> CmdResult<ConfigOutput> {
    let path = global.settings.config_file();
    let result = config::update_config(&path, &args.update())?;

    log_status!("config", "Configuration updated successfully at {}", path.display());

    Ok((
        ConfigOutput {
            command: "config.set".to_string(),
            result,
        },
        0,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_not_updates() {
        let args = ConfigArgs {
            set_autovalidator_address: Some("  ".to_string()),
            set_codename: None,
        };
        assert!(!args.has_updates());
    }

    #[test]
    fn single_key_update() {
        let args = ConfigArgs {
            set_autovalidator_address: None,
            set_codename: Some(" sn12 ".to_string()),
        };
        let update = args.update();
        assert_eq!(update.codename.as_deref(), Some("sn12"));
        assert!(update.autovalidator_address.is_none());
    }
}
