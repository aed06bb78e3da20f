//! Sequential execution of diagnostic commands.
//!
//! Each command gets its own output file holding a `Command: ...` line and
//! the captured stdout. A failing command never stops the run.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::paths;
use crate::utils::{command, io};

#[derive(Debug, Clone, Serialize)]
pub struct CommandRun {
    pub index: usize,
    pub command: String,
    pub output_file: PathBuf,
    pub success: bool,
    pub exit_code: i32,
}

/// File content for one command.
pub fn render_output(command: &str, stdout: &str) -> String {
    format!("Command: {}\n{}", command, stdout)
}

/// Run `commands` in order, writing `{codename}_{n}.txt` files into `output_dir`.
pub fn run_commands(commands: &[String], codename: &str, output_dir: &Path) -> Result<Vec<CommandRun>> {
    io::ensure_dir(output_dir, "create output dir")?;

    let mut runs = Vec::with_capacity(commands.len());

    for (i, cmd) in commands.iter().enumerate() {
        let index = i + 1;
        let output_file = paths::command_output_file(output_dir, codename, index);

        log_status!("run", "[{}/{}] {}", index, commands.len(), cmd);
        let output = command::execute_shell(cmd);

        if !output.success {
            tracing::warn!(
                command = %cmd,
                exit_code = output.exit_code,
                "command failed: {}",
                output.error_text()
            );
        }

        io::write_file(
            &output_file,
            render_output(cmd, &output.stdout).as_bytes(),
            "write command output",
        )?;

        runs.push(CommandRun {
            index,
            command: cmd.clone(),
            output_file,
            success: output.success,
            exit_code: output.exit_code,
        });
    }

    Ok(runs)
}
