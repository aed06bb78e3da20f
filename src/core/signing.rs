//! Request signing for the AutoValidator API.
//!
//! The signed payload is `method + url + headers_json + body_text` where
//! `headers_json` is the header map serialized with sorted keys in the
//! conventional `{"Key": "value", ...}` layout (ASCII only, `\uXXXX`
//! escapes) and `body_text` is the body decoded as UTF-8 with invalid
//! sequences dropped. The server rebuilds the same string to verify.

use std::collections::BTreeMap;
use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};

use crate::error::{Error, Result};
use crate::realm::Realm;
use crate::wallet::Wallet;

pub type Headers = BTreeMap<String, String>;

pub const HEADER_NOTE: &str = "Note";
pub const HEADER_SUBNET_ID: &str = "SubnetID";
pub const HEADER_NONCE: &str = "Nonce";
pub const HEADER_HOTKEY: &str = "Hotkey";
pub const HEADER_REALM: &str = "Realm";
pub const HEADER_SIGNATURE: &str = "Signature";

/// Wall-clock seconds with a microsecond fraction, e.g. `1729351234.123456`.
pub fn make_nonce() -> String {
    let now = chrono::Utc::now();
    format!("{}.{:06}", now.timestamp(), now.timestamp_subsec_micros())
}

/// Compact JSON with `", "` / `": "` separators and ASCII-only strings.
struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        for ch in fragment.chars() {
            if (' '..='~').contains(&ch) {
                writer.write_all(&[ch as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// Sorted-key JSON object with `", "` and `": "` separators.
pub fn canonical_headers(headers: &Headers) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, CanonicalFormatter);
    headers.serialize(&mut serializer).map_err(|e| {
        Error::internal_json(e.to_string(), Some("serialize signed headers".to_string()))
    })?;

    String::from_utf8(buf)
        .map_err(|e| Error::internal_unexpected(format!("signed headers are not UTF-8: {}", e)))
}

/// UTF-8 decode that silently drops invalid byte sequences.
pub fn decode_body(body: &[u8]) -> String {
    body.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

pub fn canonical_payload(method: &str, url: &str, headers: &Headers, body: &[u8]) -> Result<Vec<u8>> {
    Ok(format!(
        "{}{}{}{}",
        method,
        url,
        canonical_headers(headers)?,
        decode_body(body)
    )
    .into_bytes())
}

/// Add `Nonce`, `Hotkey`, `Realm` and finally `Signature` to `headers`.
///
/// The signature covers every header present before `Signature` is added,
/// so callers must not touch the map between signing and sending.
pub fn sign_request(
    method: &str,
    url: &str,
    headers: &mut Headers,
    body: &[u8],
    wallet: &dyn Wallet,
    realm: Realm,
    nonce: String,
) -> Result<()> {
    headers.remove(HEADER_SIGNATURE);
    headers.insert(HEADER_NONCE.to_string(), nonce);
    headers.insert(HEADER_HOTKEY.to_string(), wallet.identity().to_string());
    headers.insert(HEADER_REALM.to_string(), realm.as_str().to_string());

    let payload = canonical_payload(method, url, headers, body)?;
    let signature = wallet
        .sign(&payload)
        .map_err(|e| Error::wallet_sign_failed(e.message))?;

    headers.insert(HEADER_SIGNATURE.to_string(), hex::encode(signature));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic stand-in: the "signature" is the payload reversed.
    struct ReversingWallet;

    impl Wallet for ReversingWallet {
        fn identity(&self) -> &str {
            "5Reverse"
        }

        fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
            Ok(message.iter().rev().copied().collect())
        }
    }

    struct BrokenWallet;

    impl Wallet for BrokenWallet {
        fn identity(&self) -> &str {
            "5Broken"
        }

        fn sign(&self, _message: &[u8]) -> Result<Vec<u8>> {
            Err(Error::internal_unexpected("keystore locked"))
        }
    }

    fn headers(pairs: &[(&str, &str)]) -> Headers {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn canonical_headers_sorts_and_spaces() {
        let h = headers(&[("SubnetID", "computehorde"), ("Note", "")]);
        assert_eq!(
            canonical_headers(&h).unwrap(),
            r#"{"Note": "", "SubnetID": "computehorde"}"#
        );
    }

    #[test]
    fn canonical_headers_escapes_non_ascii() {
        let h = headers(&[("Note", "caf\u{e9} \"x\"\n\u{1f600}")]);
        assert_eq!(
            canonical_headers(&h).unwrap(),
            r#"{"Note": "caf\u00e9 \"x\"\n\ud83d\ude00"}"#
        );
    }

    #[test]
    fn canonical_headers_escapes_control_and_delete() {
        let h = headers(&[("Note", "a\u{1}b\u{7f}\tc\\")]);
        assert_eq!(
            canonical_headers(&h).unwrap(),
            r#"{"Note": "a\u0001b\u007f\tc\\"}"#
        );
    }

    #[test]
    fn canonical_headers_empty_map() {
        assert_eq!(canonical_headers(&Headers::new()).unwrap(), "{}");
    }

    #[test]
    fn decode_body_drops_invalid_bytes() {
        assert_eq!(decode_body(b"ab\xffcd\xc3"), "abcd");
        assert_eq!(decode_body("h\u{e9}".as_bytes()), "h\u{e9}");
        assert_eq!(decode_body(b""), "");
    }

    #[test]
    fn payload_concatenates_parts() {
        let h = headers(&[("Note", "n")]);
        let payload = canonical_payload("GET", "http://av/api/v1/commands/", &h, b"").unwrap();
        assert_eq!(
            String::from_utf8(payload).unwrap(),
            r#"GEThttp://av/api/v1/commands/{"Note": "n"}"#
        );
    }

    #[test]
    fn sign_request_is_reproducible_for_fixed_nonce() {
        let sign = || {
            let mut h = headers(&[("Note", "Test"), ("SubnetID", "computehorde")]);
            sign_request(
                "POST",
                "http://localhost:8000/api/v1/files/",
                &mut h,
                b"zip-bytes",
                &ReversingWallet,
                Realm::Mainnet,
                "1700000000.000001".to_string(),
            )
            .unwrap();
            h
        };

        let first = sign();
        let second = sign();
        assert_eq!(first, second);
        assert_eq!(first[HEADER_HOTKEY], "5Reverse");
        assert_eq!(first[HEADER_REALM], "mainnet");
        assert_eq!(first[HEADER_NONCE], "1700000000.000001");
    }

    #[test]
    fn signature_covers_headers_and_body() {
        let mut h = headers(&[("Note", "Test"), ("SubnetID", "computehorde")]);
        sign_request(
            "POST",
            "http://av/api/v1/files/",
            &mut h,
            b"BODY",
            &ReversingWallet,
            Realm::Testnet,
            "1.5".to_string(),
        )
        .unwrap();

        let signature = hex::decode(&h[HEADER_SIGNATURE]).unwrap();
        let payload: Vec<u8> = signature.into_iter().rev().collect();
        assert_eq!(
            String::from_utf8(payload).unwrap(),
            concat!(
                "POSThttp://av/api/v1/files/",
                r#"{"Hotkey": "5Reverse", "Nonce": "1.5", "Note": "Test", "#,
                r#""Realm": "testnet", "SubnetID": "computehorde"}"#,
                "BODY"
            )
        );
    }

    #[test]
    fn sign_request_replaces_stale_signature() {
        let mut h = headers(&[("Signature", "stale")]);
        sign_request("GET", "u", &mut h, b"", &ReversingWallet, Realm::Devnet, "1".to_string())
            .unwrap();

        let payload = String::from_utf8(
            hex::decode(&h[HEADER_SIGNATURE])
                .unwrap()
                .into_iter()
                .rev()
                .collect(),
        )
        .unwrap();
        assert!(!payload.contains("stale"));
    }

    #[test]
    fn signing_failure_is_fatal() {
        let mut h = Headers::new();
        let err = sign_request("GET", "u", &mut h, b"", &BrokenWallet, Realm::Mainnet, "1".into())
            .unwrap_err();
        assert_eq!(err.code.as_str(), "wallet.sign_failed");
        assert!(!h.contains_key(HEADER_SIGNATURE));
    }

    #[test]
    fn nonce_has_fraction() {
        let nonce = make_nonce();
        let (secs, micros) = nonce.split_once('.').unwrap();
        assert!(secs.parse::<i64>().unwrap() > 1_600_000_000);
        assert_eq!(micros.len(), 6);
    }
}
