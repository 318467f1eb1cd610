//! # Webhook signature format
//!
//! Webhook senders prove that they hold the shared webhook secret by signing every delivery. The signature travels in
//! the `X-Webhook-Signature` header:
//!
//! ```text
//!    t={timestamp},v1={signature}
//! ```
//!
//! where
//!   * `timestamp` is the time of signing, in whole seconds since the Unix epoch.
//!   * `signature` is the standard base64 encoding of `HMAC-SHA256(secret, "{timestamp}.{raw body}")`.
//!
//! The raw body is signed byte-for-byte, so the receiver must verify against the bytes it received, before any JSON
//! parsing.
//!
//! Deliveries whose timestamp is more than [`DEFAULT_SIGNATURE_TOLERANCE`] seconds away from the receiver's clock (in
//! either direction) are rejected, which bounds how long a captured request can be replayed.
//!
//! The scheme is versioned. A new algorithm gets a new `v{N}=` field alongside `v1=`, so receivers that only know `v1`
//! keep working. Unknown fields are ignored.

use std::str::FromStr;

use hmac::{Hmac, Mac};
use log::*;
use sha2::Sha256;
use thiserror::Error;

/// The HTTP header carrying the signature.
pub const SIGNATURE_HEADER: &str = "X-Webhook-Signature";
/// Maximum clock difference between sender and receiver, in seconds.
pub const DEFAULT_SIGNATURE_TOLERANCE: u64 = 300;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed signature header: {0}")]
pub struct SignatureHeaderError(String);

/// The parsed contents of a signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub v1: String,
}

impl FromStr for SignatureHeader {
    type Err = SignatureHeaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut timestamp = None;
        let mut v1 = None;
        for field in s.split(',') {
            let (key, value) =
                field.split_once('=').ok_or_else(|| SignatureHeaderError(format!("'{field}' is not a key=value pair")))?;
            match key {
                "t" => {
                    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
                        return Err(SignatureHeaderError("timestamp must be a non-negative integer".into()));
                    }
                    let t = value.parse::<i64>().map_err(|e| SignatureHeaderError(format!("timestamp: {e}")))?;
                    timestamp = Some(t);
                },
                "v1" if !value.is_empty() => v1 = Some(value.to_string()),
                "v1" => return Err(SignatureHeaderError("v1 signature is empty".into())),
                _ => trace!("🔐️ Ignoring unknown signature field '{key}'"),
            }
        }
        match (timestamp, v1) {
            (Some(timestamp), Some(v1)) => Ok(Self { timestamp, v1 }),
            (None, _) => Err(SignatureHeaderError("timestamp is missing".into())),
            (_, None) => Err(SignatureHeaderError("v1 signature is missing".into())),
        }
    }
}

fn mac_for(timestamp: i64, body: &[u8], secret: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    Some(mac)
}

/// Calculate the base64-encoded `v1` signature for `body` at `timestamp`.
pub fn sign_payload(timestamp: i64, body: &[u8], secret: &str) -> String {
    match mac_for(timestamp, body, secret) {
        Some(mac) => base64::encode(mac.finalize().into_bytes()),
        // HMAC accepts keys of any length, so this is unreachable in practice
        None => String::default(),
    }
}

/// Build a complete signature header value for `body`. Used by webhook senders and tests.
pub fn signature_header(timestamp: i64, body: &[u8], secret: &str) -> String {
    format!("t={timestamp},v1={}", sign_payload(timestamp, body, secret))
}

/// Check that `header` carries a fresh, valid signature of `body` under `secret`.
///
/// `now` is the receiver's clock in Unix seconds. The signature comparison is constant-time. This function never
/// panics or errors: every failure mode, including malformed input, is reported as `false`.
pub fn verify_webhook_signature(header: &str, body: &[u8], secret: &str, now: i64, tolerance: u64) -> bool {
    let header = match header.parse::<SignatureHeader>() {
        Ok(h) => h,
        Err(e) => {
            debug!("🔐️ {e}");
            return false;
        },
    };
    let skew = now.abs_diff(header.timestamp);
    if skew > tolerance {
        debug!("🔐️ Signature timestamp is {skew}s away from the current time. Rejecting.");
        return false;
    }
    let provided = match base64::decode(&header.v1) {
        Ok(sig) => sig,
        Err(e) => {
            debug!("🔐️ Signature is not valid base64. {e}");
            return false;
        },
    };
    match mac_for(header.timestamp, body, secret) {
        Some(mac) => mac.verify_slice(&provided).is_ok(),
        None => false,
    }
}
