//! Webhook signature verification.
//!
//! The gateway signs `"{timestamp}.{payload}"` with HMAC-SHA256 and sends
//! the result in a header of the form `t=1700000000,v1=<hex>[,v1=<hex>]`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::StripeError;
use crate::models::Event;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed event, in seconds
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<Vec<u8>>,
}

fn parse_header(header: &str) -> Result<SignatureHeader, StripeError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => {
                timestamp = Some(value.parse::<i64>().map_err(|_| StripeError::MalformedHeader)?);
            }
            "v1" => {
                // Undecodable candidates can never match; skip them
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(StripeError::MalformedHeader)?;
    if signatures.is_empty() {
        return Err(StripeError::MalformedHeader);
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn mac_for(secret: &str, timestamp: i64, payload: &str) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    mac
}

/// Hex signature for a payload, as the gateway would compute it
pub fn compute_signature(secret: &str, timestamp: i64, payload: &str) -> String {
    hex::encode(mac_for(secret, timestamp, payload).finalize().into_bytes())
}

/// Build a complete signature header (useful for tests and local replays)
pub fn signature_header(secret: &str, timestamp: i64, payload: &str) -> String {
    format!(
        "t={},v1={}",
        timestamp,
        compute_signature(secret, timestamp, payload)
    )
}

/// Verify the signature header against the raw payload
pub fn verify_signature(
    payload: &str,
    header: &str,
    secret: &str,
    now: i64,
    tolerance_secs: i64,
) -> Result<(), StripeError> {
    let parsed = parse_header(header)?;

    let matched = parsed.signatures.iter().any(|candidate| {
        mac_for(secret, parsed.timestamp, payload)
            .verify_slice(candidate)
            .is_ok()
    });
    if !matched {
        return Err(StripeError::InvalidSignature);
    }

    if now.abs_diff(parsed.timestamp) > tolerance_secs.unsigned_abs() {
        return Err(StripeError::TimestampOutsideTolerance);
    }

    Ok(())
}

/// Verify and decode a webhook event
pub fn construct_event(
    payload: &str,
    header: &str,
    secret: &str,
    now: i64,
) -> Result<Event, StripeError> {
    verify_signature(payload, header, secret, now, DEFAULT_TOLERANCE_SECS)?;
    Ok(serde_json::from_str(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";
    const PAYLOAD: &str = r#"{"id":"evt_1","type":"checkout.session.expired","created":1,"data":{"object":{"id":"cs_1","payment_status":"unpaid","status":"expired"}}}"#;

    #[test]
    fn test_valid_signature_constructs_event() {
        let header = signature_header(SECRET, 1_700_000_000, PAYLOAD);
        let event = construct_event(PAYLOAD, &header, SECRET, 1_700_000_010).unwrap();
        assert_eq!(event.event_type, "checkout.session.expired");
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let header = signature_header(SECRET, 1_700_000_000, PAYLOAD);
        let tampered = PAYLOAD.replace("expired", "completed");
        let result = construct_event(&tampered, &header, SECRET, 1_700_000_000);
        assert!(matches!(result, Err(StripeError::InvalidSignature)));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let header = signature_header("other_secret", 1_700_000_000, PAYLOAD);
        let result = verify_signature(PAYLOAD, &header, SECRET, 1_700_000_000, 300);
        assert!(matches!(result, Err(StripeError::InvalidSignature)));
    }

    #[test]
    fn test_stale_timestamp_is_rejected() {
        let header = signature_header(SECRET, 1_700_000_000, PAYLOAD);
        let result = verify_signature(PAYLOAD, &header, SECRET, 1_700_000_301, 300);
        assert!(matches!(result, Err(StripeError::TimestampOutsideTolerance)));
    }

    #[test]
    fn test_extreme_timestamp_is_rejected_without_overflow() {
        for timestamp in [i64::MIN, i64::MAX] {
            let header = signature_header(SECRET, timestamp, PAYLOAD);
            let result = verify_signature(PAYLOAD, &header, SECRET, 1_700_000_000, 300);
            assert!(matches!(result, Err(StripeError::TimestampOutsideTolerance)));
        }
    }

    #[test]
    fn test_any_matching_v1_is_accepted() {
        let good = compute_signature(SECRET, 42, PAYLOAD);
        let header = format!("t=42,v1={},v1={}", "00".repeat(32), good);
        assert!(verify_signature(PAYLOAD, &header, SECRET, 42, 300).is_ok());
    }

    #[test]
    fn test_malformed_headers() {
        for header in ["", "v1=abcd", "t=notanumber,v1=abcd", "t=42"] {
            let result = verify_signature(PAYLOAD, header, SECRET, 42, 300);
            assert!(
                matches!(result, Err(StripeError::MalformedHeader)),
                "header {:?} should be malformed",
                header
            );
        }
    }
}
