use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Chain the signed request targets; sent in the `Realm` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Realm {
    #[default]
    Mainnet,
    Testnet,
    Devnet,
}

impl Realm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Realm::Mainnet => "mainnet",
            Realm::Testnet => "testnet",
            Realm::Devnet => "devnet",
        }
    }
}

impl fmt::Display for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Realm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Realm::Mainnet),
            "testnet" => Ok(Realm::Testnet),
            "devnet" => Ok(Realm::Devnet),
            other => Err(Error::validation_invalid_argument(
                "chain",
                "Chain must be one of: mainnet, testnet, devnet",
                Some(other.to_string()),
            )),
        }
    }
}
