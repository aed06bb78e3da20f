use clap::Args;
use serde::Serialize;

use autodumper::command_source::{
    CommandSource, CommandSourceKind, RemoteCommandSource, StaticCommandSource,
};
use autodumper::config::{self, AutoValidatorConfig};
use autodumper::dumper::{self, DumpReport, DumpRequest};
use autodumper::http::AutoValidatorClient;
use autodumper::paths;
use autodumper::realm::Realm;
use autodumper::wallet::{Sr25519Hotkey, Wallet};

use super::{CmdResult, GlobalArgs};

#[derive(Args, Debug, Default)]
pub struct DumpArgs {
    /// Note attached to the upload
    #[arg(long, default_value = "")]
    pub note: String,

    /// Subnet codename or alias (e.g. computehorde, sn12)
    #[arg(long = "subnet_identifier", visible_alias = "subnet-identifier")]
    pub subnet_identifier: Option<String>,

    /// AutoValidator base URL
    #[arg(long = "autovalidator_address", visible_alias = "autovalidator-address")]
    pub autovalidator_address: Option<String>,

    /// Network realm sent with the signed headers
    #[arg(long, value_enum, default_value_t = Realm::Mainnet)]
    pub chain: Realm,

    /// Where the command list comes from
    #[arg(long = "command-source", value_enum)]
    pub command_source: Option<CommandSourceKind>,

    /// Directory for per-command files and the archive
    #[arg(long = "output-dir", default_value = ".")]
    pub output_dir: String,

    #[arg(long = "wallet-name")]
    pub wallet_name: Option<String>,

    #[arg(long = "wallet-hotkey")]
    pub wallet_hotkey: Option<String>,

    #[arg(long = "wallet-path")]
    pub wallet_path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DumpOutput {
    command: String,
    autovalidator_address: String,
    command_source: CommandSourceKind,
    hotkey: String,
    #[serde(flatten)]
    report: DumpReport,
}

/// Resolved inputs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Target {
    pub(crate) autovalidator_address: String,
    pub(crate) subnet_identifier: String,
    pub(crate) command_source: CommandSourceKind,
}

fn cli_value(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// CLI flags win per field. The required keys are only loaded from the
/// config file when one of them is missing from the command line. Without
/// `--command-source` the stored `command_source` still applies, and an
/// absent or unreadable file is tolerated when both flags were given.
pub(crate) fn resolve_target<F, S>(
    args: &DumpArgs,
    load: F,
    load_source: S,
) -> autodumper::Result<Target>
where
    F: FnOnce() -> autodumper::Result<AutoValidatorConfig>,
    S: FnOnce() -> autodumper::Result<Option<CommandSourceKind>>,
{
    let address = cli_value(&args.autovalidator_address);
    let subnet = cli_value(&args.subnet_identifier);

    let (address, subnet, stored_source) = match (address, subnet) {
        (Some(address), Some(subnet)) => {
            let stored_source = match args.command_source {
                Some(_) => None,
                None => load_source().unwrap_or_else(|err| {
                    tracing::warn!("Ignoring stored command source: {}", err.message);
                    None
                }),
            };
            (address, subnet, stored_source)
        }
        (address, subnet) => {
            let stored = load()?;
            (
                address.unwrap_or(stored.autovalidator_address),
                subnet.unwrap_or(stored.codename),
                stored.command_source,
            )
        }
    };

    Ok(Target {
        autovalidator_address: address,
        subnet_identifier: subnet,
        command_source: args
            .command_source
            .or(stored_source)
            .unwrap_or_default(),
    })
}

pub fn run(args: &DumpArgs, global: &GlobalArgs) -> CmdResult<DumpOutput> {
    let config_path = global.settings.config_file();
    let target = resolve_target(
        args,
        || {
            tracing::debug!("Loading configuration from {}", config_path.display());
            config::load_config(&config_path)
        },
        || config::load_command_source(&config_path),
    )?;

    let output_dir = paths::expand_dir(&args.output_dir)?;

    let wallet_settings = global.wallet(
        args.wallet_name.as_deref(),
        args.wallet_hotkey.as_deref(),
        args.wallet_path.as_deref(),
    )?;
    let hotkey = Sr25519Hotkey::load(&wallet_settings.hotkey_file())?;

    let client = AutoValidatorClient::new(&target.autovalidator_address, args.chain, &hotkey)?;

    let source: Box<dyn CommandSource + '_> = match target.command_source {
        CommandSourceKind::Remote => Box::new(RemoteCommandSource::new(&client)),
        CommandSourceKind::Static => Box::new(StaticCommandSource::builtin()),
    };

    let request = DumpRequest {
        subnet_identifier: target.subnet_identifier.clone(),
        realm: args.chain,
        note: args.note.clone(),
        output_dir,
    };

    let report = dumper::dump_and_upload(&request, source.as_ref(), &client)?;

    Ok((
        DumpOutput {
            command: "dump".to_string(),
            autovalidator_address: client.base_url().to_string(),
            command_source: target.command_source,
            hotkey: hotkey.identity().to_string(),
            report,
        },
        0,
    ))
}
