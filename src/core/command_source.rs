//! Where the diagnostic command list comes from.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::http::AutoValidatorClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CommandSourceKind {
    /// Ask the AutoValidator for the command list
    #[default]
    Remote,
    /// Use the built-in table
    Static,
}

impl CommandSourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandSourceKind::Remote => "remote",
            CommandSourceKind::Static => "static",
        }
    }
}

impl fmt::Display for CommandSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandSourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(CommandSourceKind::Remote),
            "static" => Ok(CommandSourceKind::Static),
            other => Err(Error::validation_invalid_argument(
                "command_source",
                "Command source must be 'remote' or 'static'",
                Some(other.to_string()),
            )),
        }
    }
}

pub trait CommandSource {
    /// Ordered shell commands for a canonical codename. Empty when unknown.
    fn commands(&self, codename: &str) -> Result<Vec<String>>;
}

/// In-process table keyed by canonical codename.
#[derive(Debug, Clone)]
pub struct StaticCommandSource {
    table: BTreeMap<String, Vec<String>>,
}

impl StaticCommandSource {
    pub fn new(table: BTreeMap<String, Vec<String>>) -> Self {
        Self { table }
    }

    pub fn builtin() -> Self {
        let mut table = BTreeMap::new();
        table.insert(
            "computehorde".to_string(),
            ["ps awux", "docker ps", "uptime", "free -m"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        );
        Self::new(table)
    }

    pub fn codenames(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }
}

impl CommandSource for StaticCommandSource {
    fn commands(&self, codename: &str) -> Result<Vec<String>> {
        Ok(self.table.get(codename).cloned().unwrap_or_default())
    }
}

/// Signed `GET /api/v1/commands/` against the AutoValidator.
pub struct RemoteCommandSource<'a> {
    client: &'a AutoValidatorClient<'a>,
}

impl<'a> RemoteCommandSource<'a> {
    pub fn new(client: &'a AutoValidatorClient<'a>) -> Self {
        Self { client }
    }
}

impl CommandSource for RemoteCommandSource<'_> {
    fn commands(&self, codename: &str) -> Result<Vec<String>> {
        self.client.fetch_commands(codename)
    }
}
