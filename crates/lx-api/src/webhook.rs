//! Payment-processor webhook events and their signature scheme.
//!
//! The processor signs `"<timestamp>.<raw body>"` with HMAC-SHA256 under the
//! shared secret and sends `Stripe-Signature: t=<timestamp>,v1=<hex>`. The
//! timestamp is signed as the text sent, not as a re-rendered integer. More
//! than one `v1` entry may be present while the secret is being rolled.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Event types that mean the customer has paid.
pub const COMPLETION_EVENTS: &[&str] = &[
    "checkout.session.completed",
    "payment_intent.succeeded",
    "invoice.paid",
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature header missing")]
    Missing,
    #[error("signature header malformed")]
    Malformed,
    #[error("signature timestamp outside tolerance")]
    Stale,
    #[error("signature mismatch")]
    Mismatch,
    #[error("webhook secret unusable as HMAC key")]
    InvalidKey,
}

#[derive(Debug, PartialEq, Eq)]
pub struct SignatureHeader<'a> {
    /// The `t=` value exactly as sent; it is part of the signed payload.
    pub raw_timestamp: &'a str,
    pub timestamp: i64,
    pub signatures: Vec<Vec<u8>>,
}

pub fn parse_signature_header(value: &str) -> Result<SignatureHeader<'_>, SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in value.split(',') {
        let Some((name, val)) = part.trim().split_once('=') else {
            continue;
        };
        match name {
            "t" => timestamp = val.parse::<i64>().ok().map(|parsed| (val, parsed)),
            "v1" => {
                if let Ok(bytes) = hex::decode(val) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }
    match timestamp {
        Some((raw_timestamp, timestamp)) if !signatures.is_empty() => Ok(SignatureHeader {
            raw_timestamp,
            timestamp,
            signatures,
        }),
        _ => Err(SignatureError::Malformed),
    }
}

fn signed_payload_mac(
    secret: &str,
    raw_timestamp: &str,
    body: &[u8],
) -> Result<HmacSha256, SignatureError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::InvalidKey)?;
    mac.update(raw_timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);
    Ok(mac)
}

pub fn compute_signature(
    secret: &str,
    raw_timestamp: &str,
    body: &[u8],
) -> Result<Vec<u8>, SignatureError> {
    let mac = signed_payload_mac(secret, raw_timestamp, body)?;
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Produce a header value the way the processor does.
pub fn sign_header(secret: &str, timestamp: i64, body: &[u8]) -> Result<String, SignatureError> {
    let sig = compute_signature(secret, &timestamp.to_string(), body)?;
    Ok(format!("t={},v1={}", timestamp, hex::encode(sig)))
}

pub fn verify_signature(
    secret: &str,
    header: Option<&str>,
    body: &[u8],
    now: i64,
    tolerance_secs: u64,
) -> Result<(), SignatureError> {
    let parsed = parse_signature_header(header.ok_or(SignatureError::Missing)?)?;
    if now.abs_diff(parsed.timestamp) > tolerance_secs {
        return Err(SignatureError::Stale);
    }
    let mac = signed_payload_mac(secret, parsed.raw_timestamp, body)?;
    if parsed
        .signatures
        .iter()
        .any(|candidate| mac.clone().verify_slice(candidate).is_ok())
    {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

#[derive(Debug, Deserialize)]
pub struct PaymentEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: EventData,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventData {
    #[serde(default)]
    pub object: EventObject,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventObject {
    #[serde(default)]
    pub metadata: EventMetadata,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    #[serde(default, alias = "client_id")]
    pub client_id: Option<String>,
    #[serde(default, alias = "plan_id")]
    pub plan_id: Option<String>,
}

impl PaymentEvent {
    pub fn is_completion(&self) -> bool {
        COMPLETION_EVENTS.contains(&self.event_type.as_str())
    }

    /// `(client_id, plan_id)` carried in the event metadata, if both are set.
    pub fn activation(&self) -> Option<(&str, &str)> {
        let meta = &self.data.object.metadata;
        let client_id = meta.client_id.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let plan_id = meta.plan_id.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((client_id, plan_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const BODY: &[u8] = br#"{"type":"checkout.session.completed"}"#;

    #[test]
    fn hmac_known_vector() {
        // RFC 4231 test case 2
        let mut mac = HmacSha256::new_from_slice(b"Jefe").unwrap();
        mac.update(b"what do ya want for nothing?");
        assert_eq!(
            hex::encode(mac.finalize().into_bytes()),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn signed_header_verifies() {
        let header = sign_header(SECRET, 1_700_000_000, BODY).unwrap();
        assert_eq!(
            verify_signature(SECRET, Some(&header), BODY, 1_700_000_010, 300),
            Ok(())
        );
    }

    #[test]
    fn missing_header_rejected() {
        assert_eq!(
            verify_signature(SECRET, None, BODY, 0, 300),
            Err(SignatureError::Missing)
        );
    }

    #[test]
    fn wrong_secret_rejected() {
        let header = sign_header("whsec_other", 1_700_000_000, BODY).unwrap();
        assert_eq!(
            verify_signature(SECRET, Some(&header), BODY, 1_700_000_000, 300),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn tampered_body_rejected() {
        let header = sign_header(SECRET, 1_700_000_000, BODY).unwrap();
        assert_eq!(
            verify_signature(SECRET, Some(&header), b"{}", 1_700_000_000, 300),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn stale_timestamp_rejected() {
        let header = sign_header(SECRET, 1_700_000_000, BODY).unwrap();
        assert_eq!(
            verify_signature(SECRET, Some(&header), BODY, 1_700_000_301, 300),
            Err(SignatureError::Stale)
        );
    }

    #[test]
    fn any_matching_v1_is_accepted() {
        let good = hex::encode(compute_signature(SECRET, "42", BODY).unwrap());
        let header = format!("t=42,v1={},v1={}", "00".repeat(32), good);
        assert_eq!(verify_signature(SECRET, Some(&header), BODY, 42, 300), Ok(()));
    }

    #[test]
    fn parse_requires_timestamp_and_signature() {
        assert_eq!(
            parse_signature_header("v1=abcd"),
            Err(SignatureError::Malformed)
        );
        assert_eq!(parse_signature_header("t=12"), Err(SignatureError::Malformed));
        assert_eq!(
            parse_signature_header("garbage"),
            Err(SignatureError::Malformed)
        );
    }

    #[test]
    fn parse_ignores_unknown_schemes() {
        let parsed = parse_signature_header("t=5, v0=ffff, v1=0a0b").unwrap();
        assert_eq!(parsed.timestamp, 5);
        assert_eq!(parsed.raw_timestamp, "5");
        assert_eq!(parsed.signatures, vec![vec![0x0a, 0x0b]]);
    }

    #[test]
    fn timestamp_is_signed_as_sent() {
        for raw in ["01700000000", "+1700000000"] {
            let sig = hex::encode(compute_signature(SECRET, raw, BODY).unwrap());
            let header = format!("t={},v1={}", raw, sig);
            assert_eq!(
                verify_signature(SECRET, Some(&header), BODY, 1_700_000_000, 300),
                Ok(()),
                "{raw}"
            );
        }
    }

    #[test]
    fn truncated_signature_rejected() {
        let sig = compute_signature(SECRET, "42", BODY).unwrap();
        let header = format!("t=42,v1={}", hex::encode(&sig[..16]));
        assert_eq!(
            verify_signature(SECRET, Some(&header), BODY, 42, 300),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn event_activation_from_metadata() {
        let event: PaymentEvent = serde_json::from_str(
            r#"{"type":"checkout.session.completed","data":{"object":{"metadata":{"clientId":"abc123","planId":"plan-normal"}}}}"#,
        )
        .unwrap();
        assert!(event.is_completion());
        assert_eq!(event.activation(), Some(("abc123", "plan-normal")));
    }

    #[test]
    fn event_metadata_accepts_snake_case() {
        let event: PaymentEvent = serde_json::from_str(
            r#"{"type":"invoice.paid","data":{"object":{"metadata":{"client_id":"c","plan_id":"plan-premium"}}}}"#,
        )
        .unwrap();
        assert_eq!(event.activation(), Some(("c", "plan-premium")));
    }

    #[test]
    fn event_without_metadata() {
        let event: PaymentEvent =
            serde_json::from_str(r#"{"type":"customer.created"}"#).unwrap();
        assert!(!event.is_completion());
        assert_eq!(event.activation(), None);
    }
}
