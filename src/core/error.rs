use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigMissingEnv,
    ConfigFileNotFound,
    ConfigInvalidIni,
    ConfigMissingKey,

    ValidationInvalidArgument,

    WalletKeyInvalid,
    WalletSignFailed,

    CommandsNotFound,

    RemoteRequestFailed,
    UploadFailed,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigMissingEnv => "config.missing_env",
            ErrorCode::ConfigFileNotFound => "config.file_not_found",
            ErrorCode::ConfigInvalidIni => "config.invalid_ini",
            ErrorCode::ConfigMissingKey => "config.missing_key",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::WalletKeyInvalid => "wallet.key_invalid",
            ErrorCode::WalletSignFailed => "wallet.sign_failed",

            ErrorCode::CommandsNotFound => "commands.not_found",

            ErrorCode::RemoteRequestFailed => "remote.request_failed",
            ErrorCode::UploadFailed => "upload.failed",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMissingKeyDetails {
    pub section: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidIniDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteRequestFailedDetails {
    pub method: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFailedDetails {
    pub url: String,
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
    pub retryable: Option<bool>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
            retryable: None,
        }
    }

    pub fn config_missing_env(var: impl Into<String>) -> Self {
        let var = var.into();
        Self::new(
            ErrorCode::ConfigMissingEnv,
            format!("{} environment variable is not set", var),
            serde_json::json!({ "var": var }),
        )
        .with_hint(format!("Export {} or add it to a .env file", var))
    }

    pub fn config_file_not_found(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(
            ErrorCode::ConfigFileNotFound,
            format!("{} does not exist", path),
            serde_json::json!({ "path": path }),
        )
        .with_hint("Run with --set-autovalidator-address and --set-codename to create it")
    }

    pub fn config_invalid_ini(path: impl Into<String>, error: impl Into<String>) -> Self {
        let details = to_details(ConfigInvalidIniDetails {
            path: path.into(),
            error: error.into(),
        });

        Self::new(
            ErrorCode::ConfigInvalidIni,
            "Error reading configuration file",
            details,
        )
    }

    pub fn config_missing_key(
        section: impl Into<String>,
        key: impl Into<String>,
        path: Option<String>,
    ) -> Self {
        let key = key.into();
        let details = to_details(ConfigMissingKeyDetails {
            section: section.into(),
            key: key.clone(),
            path,
        });

        Self::new(
            ErrorCode::ConfigMissingKey,
            format!("Missing '{}' in the config file", key),
            details,
        )
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        let problem = problem.into();
        let details = to_details(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.clone(),
            value,
        });

        Self::new(ErrorCode::ValidationInvalidArgument, problem, details)
    }

    pub fn wallet_key_invalid(path: impl Into<String>, problem: impl Into<String>) -> Self {
        let problem = problem.into();
        Self::new(
            ErrorCode::WalletKeyInvalid,
            format!("Invalid hotkey file: {}", problem),
            serde_json::json!({ "path": path.into(), "problem": problem }),
        )
    }

    pub fn wallet_sign_failed(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::WalletSignFailed,
            "Failed to sign request",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn commands_not_found(codename: impl Into<String>) -> Self {
        let codename = codename.into();
        Self::new(
            ErrorCode::CommandsNotFound,
            format!("Subnet dumper commands of {} not found", codename),
            serde_json::json!({ "codename": codename }),
        )
    }

    pub fn remote_request_failed(details: RemoteRequestFailedDetails) -> Self {
        let message = format!("HTTP request failed: {}", details.error);
        Self::new(ErrorCode::RemoteRequestFailed, message, to_details(details))
    }

    pub fn upload_failed(details: UploadFailedDetails) -> Self {
        let message = format!("Failed to upload file. Status code: {}", details.status);
        Self::new(ErrorCode::UploadFailed, message, to_details(details))
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalIoErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalJsonErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn internal_unexpected(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalUnexpected,
            "Unexpected error",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }
}
