//! Signed HTTP client for the AutoValidator API.
//!
//! Every request goes through [`AutoValidatorClient::send_signed`], which
//! signs the exact body bytes it is about to send.

use std::path::Path;
use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;

use crate::error::{Error, RemoteRequestFailedDetails, Result, UploadFailedDetails};
use crate::realm::Realm;
use crate::signing::{self, Headers, HEADER_NOTE, HEADER_SUBNET_ID};
use crate::utils::io;
use crate::wallet::Wallet;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const COMMANDS_ENDPOINT: &str = "/api/v1/commands/";
pub const FILES_ENDPOINT: &str = "/api/v1/files/";

fn request_error(method: &Method, url: &str, status: Option<u16>, error: impl Into<String>) -> Error {
    Error::remote_request_failed(RemoteRequestFailedDetails {
        method: method.to_string(),
        url: url.to_string(),
        status,
        error: error.into(),
    })
}

/// How the AutoValidator answered an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadOutcome {
    /// 201: stored
    Created,
    /// 200: accepted without creating a resource
    Accepted,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    pub url: String,
    pub status: u16,
    pub outcome: UploadOutcome,
}

/// Body attached to a signed request.
enum Payload<'b> {
    Empty,
    File { name: String, bytes: &'b [u8] },
}

pub struct AutoValidatorClient<'a> {
    client: Client,
    base_url: String,
    realm: Realm,
    wallet: &'a dyn Wallet,
}

impl<'a> AutoValidatorClient<'a> {
    pub fn new(address: &str, realm: Realm, wallet: &'a dyn Wallet) -> Result<Self> {
        let base_url = address.trim().trim_end_matches('/').to_string();

        if base_url.is_empty() {
            return Err(Error::validation_invalid_argument(
                "autovalidator_address",
                "AutoValidator address is not configured",
                None,
            ));
        }

        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::validation_invalid_argument(
                "autovalidator_address",
                "AutoValidator address must start with http:// or https://",
                Some(base_url),
            ));
        }

        let client = Client::builder()
            .user_agent(format!("autodumper/{}", VERSION))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::internal_io(e.to_string(), Some("create HTTP client".to_string())))?;

        Ok(Self {
            client,
            base_url,
            realm,
            wallet,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn subnet_headers(note: &str, subnet_id: &str) -> Headers {
        let mut headers = Headers::new();
        headers.insert(HEADER_NOTE.to_string(), note.to_string());
        headers.insert(HEADER_SUBNET_ID.to_string(), subnet_id.to_string());
        headers
    }

    fn send_signed(
        &self,
        method: Method,
        url: &str,
        mut headers: Headers,
        payload: Payload<'_>,
    ) -> Result<Response> {
        let body: &[u8] = match &payload {
            Payload::Empty => &[],
            Payload::File { bytes, .. } => *bytes,
        };

        signing::sign_request(
            method.as_str(),
            url,
            &mut headers,
            body,
            self.wallet,
            self.realm,
            signing::make_nonce(),
        )?;

        let mut header_map = HeaderMap::new();
        for (name, value) in &headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| request_error(&method, url, None, format!("header {}: {}", name, e)))?;
            let value = HeaderValue::from_bytes(value.as_bytes())
                .map_err(|e| request_error(&method, url, None, format!("header {}: {}", name, e)))?;
            header_map.insert(name, value);
        }

        let mut request = self.client.request(method.clone(), url).headers(header_map);

        if let Payload::File { name, bytes } = payload {
            let part = Part::bytes(bytes.to_vec())
                .file_name(name)
                .mime_str("application/zip")
                .map_err(|e| request_error(&method, url, None, e.to_string()))?;
            request = request.multipart(Form::new().part("file", part));
        }

        tracing::debug!(%method, url, "sending signed request");

        request
            .send()
            .map_err(|e| request_error(&method, url, None, e.to_string()))
    }

    /// Fetch the command list for a subnet.
    ///
    /// Any status other than 200 is logged and yields an empty list.
    pub fn fetch_commands(&self, subnet_id: &str) -> Result<Vec<String>> {
        let url = self.url(COMMANDS_ENDPOINT);
        let headers = Self::subnet_headers("", subnet_id);
        let response = self.send_signed(Method::GET, &url, headers, Payload::Empty)?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().unwrap_or_default();
            tracing::error!(status = status.as_u16(), "Failed to get commands. Status code: {}", status.as_u16());
            tracing::error!("{}", body);
            return Ok(Vec::new());
        }

        let body = response
            .text()
            .map_err(|e| request_error(&Method::GET, &url, Some(status.as_u16()), e.to_string()))?;

        serde_json::from_str::<Vec<String>>(&body).map_err(|e| {
            Error::internal_json(e.to_string(), Some("parse command list".to_string()))
                .with_hint("The commands endpoint must return a JSON array of strings")
        })
    }

    /// Upload an archive. 201 and 200 succeed; anything else is an error.
    pub fn upload_archive(&self, archive: &Path, note: &str, subnet_id: &str) -> Result<UploadReport> {
        let url = self.url(FILES_ENDPOINT);
        let bytes = io::read_bytes(archive, "read archive")?;
        let name = archive
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("{}-output.zip", subnet_id));

        let headers = Self::subnet_headers(note, subnet_id);
        let response = self.send_signed(
            Method::POST,
            &url,
            headers,
            Payload::File {
                name,
                bytes: &bytes,
            },
        )?;

        let status = response.status();
        match status {
            StatusCode::CREATED => {
                tracing::info!("File successfully uploaded and resource created.");
                Ok(UploadReport {
                    url,
                    status: status.as_u16(),
                    outcome: UploadOutcome::Created,
                })
            }
            StatusCode::OK => {
                tracing::warn!("Request succeeded.");
                Ok(UploadReport {
                    url,
                    status: status.as_u16(),
                    outcome: UploadOutcome::Accepted,
                })
            }
            _ => {
                let body = response.text().unwrap_or_default();
                tracing::error!("Failed to upload file. Status code: {}", status.as_u16());
                tracing::error!("{}", body);
                Err(Error::upload_failed(UploadFailedDetails {
                    url,
                    status: status.as_u16(),
                    body,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::Sr25519Hotkey;

    fn hotkey() -> Sr25519Hotkey {
        Sr25519Hotkey::from_seed(&[1u8; 32], Some("5Test".to_string())).unwrap()
    }

    #[test]
    fn new_trims_trailing_slash() {
        let wallet = hotkey();
        let client = AutoValidatorClient::new("http://localhost:8000/", Realm::Mainnet, &wallet).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url(FILES_ENDPOINT), "http://localhost:8000/api/v1/files/");
    }

    #[test]
    fn new_rejects_empty_address() {
        let wallet = hotkey();
        let err = AutoValidatorClient::new("  ", Realm::Mainnet, &wallet).err().unwrap();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
    }

    #[test]
    fn new_rejects_address_without_scheme() {
        let wallet = hotkey();
        assert!(AutoValidatorClient::new("localhost:8000", Realm::Mainnet, &wallet).is_err());
    }
}
