//! Webhook signature verification.
//!
//! The provider signs each delivery with
//! `WorkOS-Signature: t=<unix-millis>, v1=<hex hmac-sha256("{t}.{body}")>`.
//! Verification recomputes the MAC over the raw body bytes and compares in
//! constant time, and bounds the timestamp to a configured tolerance so
//! captured deliveries cannot be replayed later.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the provider's delivery signature.
pub const SIGNATURE_HEADER: &str = "WorkOS-Signature";

/// Reasons a delivery signature is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// The header did not contain `t=` and `v1=` fields with a numeric
    /// timestamp and hex signature.
    #[error("signature header is malformed")]
    Malformed,
    /// The signed timestamp is outside the accepted tolerance window.
    #[error("signature timestamp is outside the accepted tolerance")]
    Expired,
    /// The recomputed MAC does not match the presented signature.
    #[error("signature does not match the payload")]
    Mismatch,
}

/// Verifies provider delivery signatures against the shared webhook secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: String,
    tolerance: TimeDelta,
}

impl SignatureVerifier {
    /// Create a verifier with the shared secret and replay tolerance.
    pub fn new(secret: impl Into<String>, tolerance: TimeDelta) -> Self {
        Self {
            secret: secret.into(),
            tolerance,
        }
    }

    /// Verify a signature header against the raw request body.
    ///
    /// `now` is injected so tests can pin the clock; the HTTP adapter passes
    /// `Utc::now()`.
    ///
    /// # Errors
    ///
    /// Returns a [`SignatureError`] describing why the delivery was rejected.
    pub fn verify(
        &self,
        header: &str,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<(), SignatureError> {
        let (timestamp_raw, signature_hex) = parse_header(header)?;

        let timestamp_millis: i64 = timestamp_raw
            .parse()
            .map_err(|_| SignatureError::Malformed)?;
        let issued_at = Utc
            .timestamp_millis_opt(timestamp_millis)
            .single()
            .ok_or(SignatureError::Malformed)?;
        let signature = hex::decode(signature_hex).map_err(|_| SignatureError::Malformed)?;

        if (now - issued_at).abs() > self.tolerance {
            return Err(SignatureError::Expired);
        }

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| SignatureError::Mismatch)?;
        mac.update(timestamp_raw.as_bytes());
        mac.update(b".");
        mac.update(body);
        mac.verify_slice(&signature)
            .map_err(|_| SignatureError::Mismatch)
    }
}

/// Split `t=<millis>, v1=<hex>` into its two fields, order-insensitively.
fn parse_header(header: &str) -> Result<(&str, &str), SignatureError> {
    let mut timestamp = None;
    let mut signature = None;

    for field in header.split(',') {
        let trimmed = field.trim();
        if let Some(value) = trimmed.strip_prefix("t=") {
            timestamp = Some(value.trim());
        } else if let Some(value) = trimmed.strip_prefix("v1=") {
            signature = Some(value.trim());
        }
    }

    match (timestamp, signature) {
        (Some(t), Some(v1)) if !t.is_empty() && !v1.is_empty() => Ok((t, v1)),
        _ => Err(SignatureError::Malformed),
    }
}

/// Produce a valid signature header for a payload; test-support only.
#[cfg(test)]
pub fn sign(secret: &str, issued_at: DateTime<Utc>, body: &[u8]) -> String {
    let timestamp = issued_at.timestamp_millis().to_string();
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key size");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);
    let signature = hex::encode(mac.finalize().into_bytes());
    format!("t={timestamp}, v1={signature}")
}
