//! Subnet identifier normalization and alias resolution.

use serde::Serialize;

use crate::error::{Error, Result};

/// Normalized alias → canonical codename.
const ALIASES: &[(&str, &str)] = &[
    ("computehorde", "computehorde"),
    ("sn12", "computehorde"),
    ("subnet12", "computehorde"),
    ("12", "computehorde"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSubnet {
    pub identifier: String,
    pub codename: String,
    pub known: bool,
}

/// Lowercase and keep only ASCII letters and digits.
///
/// The result is used as a file name prefix, so path separators and any
/// other punctuation never survive.
pub fn normalize_identifier(value: &str) -> Result<String> {
    let out: String = value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|ch| ch.to_ascii_lowercase())
        .collect();

    if out.is_empty() {
        return Err(Error::validation_invalid_argument(
            "subnet_identifier",
            "Subnet identifier must contain at least one letter or number",
            Some(value.to_string()),
        ));
    }

    Ok(out)
}

/// Canonical codename for a normalized identifier, if it is a known alias.
pub fn lookup_alias(normalized: &str) -> Option<&'static str> {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, codename)| *codename)
}

/// Normalize, then map through the alias table. Unknown identifiers pass
/// through in normalized form.
pub fn resolve_codename(identifier: &str) -> Result<ResolvedSubnet> {
    let normalized = normalize_identifier(identifier)?;

    Ok(match lookup_alias(&normalized) {
        Some(codename) => ResolvedSubnet {
            identifier: identifier.to_string(),
            codename: codename.to_string(),
            known: true,
        },
        None => ResolvedSubnet {
            identifier: identifier.to_string(),
            codename: normalized,
            known: false,
        },
    })
}
