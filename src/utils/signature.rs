use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted skew between a signed timestamp and the server clock.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

fn hmac_sha256_hex(secret: &str, payload: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(payload);
    Some(hex::encode(mac.finalize().into_bytes()))
}

fn signature_matches(secret: &str, payload: &[u8], provided: &str) -> bool {
    let Some(expected) = hmac_sha256_hex(secret, payload) else {
        return false;
    };
    let provided = provided.trim().to_ascii_lowercase();
    ConstantTimeEq::ct_eq(expected.as_bytes(), provided.as_bytes()).into()
}

fn timestamped_payload(timestamp: i64, body: &[u8]) -> Vec<u8> {
    let mut signed = Vec::with_capacity(body.len() + 24);
    signed.extend_from_slice(timestamp.to_string().as_bytes());
    signed.push(b'.');
    signed.extend_from_slice(body);
    signed
}

/// Verifies a `t=<unix>,v1=<hex>` header where the signature covers
/// `"{t}.{raw body}"`. Timestamps older than [`SIGNATURE_TOLERANCE_SECS`]
/// are rejected to limit replay.
pub fn verify_timestamped_signature(secret: &str, header: &str, body: &[u8], now: i64) -> bool {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<&str> = Vec::new();
    for part in header.split(',') {
        let mut kv = part.trim().splitn(2, '=');
        match (kv.next(), kv.next()) {
            (Some("t"), Some(value)) => timestamp = value.parse().ok(),
            (Some("v1"), Some(value)) => candidates.push(value),
            _ => {}
        }
    }

    let Some(timestamp) = timestamp else {
        return false;
    };
    // The timestamp is attacker-controlled, so the skew math must not overflow.
    let skew = now.saturating_sub(timestamp).saturating_abs();
    if candidates.is_empty() || skew > SIGNATURE_TOLERANCE_SECS {
        return false;
    }

    let signed = timestamped_payload(timestamp, body);
    candidates
        .iter()
        .any(|candidate| signature_matches(secret, &signed, candidate))
}

/// Builds the header format checked by [`verify_timestamped_signature`].
pub fn timestamped_signature_header(secret: &str, timestamp: i64, body: &[u8]) -> String {
    let signed = timestamped_payload(timestamp, body);
    let digest = hmac_sha256_hex(secret, &signed).unwrap_or_default();
    format!("t={},v1={}", timestamp, digest)
}

/// Verifies a bare hex HMAC-SHA256 of the raw body, as sent in
/// `X-Signature` style headers.
pub fn verify_hex_signature(secret: &str, signature: &str, body: &[u8]) -> bool {
    signature_matches(secret, body, signature)
}

/// Hex HMAC-SHA256 of the raw body, the counterpart of
/// [`verify_hex_signature`].
pub fn hex_signature(secret: &str, body: &[u8]) -> String {
    hmac_sha256_hex(secret, body).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const BODY: &[u8] = br#"{"id":"evt_1","type":"checkout.session.completed"}"#;

    #[test]
    fn timestamped_signature_round_trips() {
        let now = 1_700_000_000;
        let header = timestamped_signature_header(SECRET, now, BODY);
        assert!(verify_timestamped_signature(SECRET, &header, BODY, now));
        assert!(verify_timestamped_signature(SECRET, &header, BODY, now + 200));
    }

    #[test]
    fn tampered_body_is_rejected() {
        let now = 1_700_000_000;
        let header = timestamped_signature_header(SECRET, now, BODY);
        assert!(!verify_timestamped_signature(
            SECRET,
            &header,
            br#"{"id":"evt_2"}"#,
            now
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let now = 1_700_000_000;
        let header = timestamped_signature_header(SECRET, now, BODY);
        assert!(!verify_timestamped_signature("other_secret", &header, BODY, now));
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let now = 1_700_000_000;
        let header = timestamped_signature_header(SECRET, now - 400, BODY);
        assert!(!verify_timestamped_signature(SECRET, &header, BODY, now));
    }

    #[test]
    fn extreme_timestamps_are_rejected_without_panicking() {
        let now = 1_700_000_000;
        assert!(!verify_timestamped_signature(
            SECRET,
            &format!("t={},v1=ab", i64::MIN),
            BODY,
            now
        ));
        assert!(!verify_timestamped_signature(
            SECRET,
            &format!("t={},v1=ab", i64::MAX),
            BODY,
            now
        ));
    }

    #[test]
    fn malformed_header_is_rejected() {
        let now = 1_700_000_000;
        assert!(!verify_timestamped_signature(SECRET, "", BODY, now));
        assert!(!verify_timestamped_signature(SECRET, "t=notanumber,v1=ab", BODY, now));
        assert!(!verify_timestamped_signature(
            SECRET,
            &format!("t={}", now),
            BODY,
            now
        ));
    }

    #[test]
    fn hex_signature_round_trips() {
        let signature = hex_signature(SECRET, BODY);
        assert!(verify_hex_signature(SECRET, &signature, BODY));
        assert!(verify_hex_signature(
            SECRET,
            &signature.to_ascii_uppercase(),
            BODY
        ));
        assert!(!verify_hex_signature(SECRET, &signature, b"other body"));
        assert!(!verify_hex_signature(SECRET, "deadbeef", BODY));
    }
}
