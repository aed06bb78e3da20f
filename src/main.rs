use clap::Parser;
use tracing_subscriber::EnvFilter;

use commands::GlobalArgs;

mod commands;
mod output;

use commands::{config, dump};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "autodumper")]
#[command(version = VERSION)]
#[command(about = "Run subnet diagnostic commands and upload the output to an AutoValidator")]
struct Cli {
    #[command(flatten)]
    dump: dump::DumpArgs,

    #[command(flatten)]
    config: config::ConfigArgs,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries the JSON envelope only.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    init_tracing();

    let (json_result, exit_code) = match autodumper::settings::Settings::from_env() {
        Ok(settings) => {
            let global = GlobalArgs { settings };
            commands::run_json(&cli.dump, &cli.config, &global)
        }
        Err(err) => {
            let code = output::response::exit_code_for_error(err.code);
            (Err(err), code)
        }
    };

    if let Err(err) = output::print_json_result(json_result) {
        tracing::error!("Failed to print response: {}", err.message);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
