use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

pub const SIGNATURE_HEADER: &str = "stripe-signature";
const EXPECTED_SCHEME: &str = "v1";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("No stripe-signature header value was provided.")]
    MissingHeader,
    #[error("Unable to extract timestamp and signatures from header")]
    MalformedHeader,
    #[error("No signatures found with expected scheme")]
    NoExpectedScheme,
    #[error("No signatures found matching the expected signature for payload. Are you passing the raw request body you received from Stripe?")]
    Mismatch,
    #[error("Timestamp outside the tolerance zone")]
    TimestampOutsideTolerance,
}

/// Parsed `stripe-signature` header: `t=<unix>,v1=<hex>[,v1=<hex>...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub signatures: Vec<String>,
}

impl SignatureHeader {
    pub fn parse(header: &str) -> Result<Self, SignatureError> {
        let mut timestamp = None;
        let mut signatures = Vec::new();
        for item in header.split(',') {
            let Some((key, value)) = item.trim().split_once('=') else {
                continue;
            };
            match key {
                "t" => timestamp = value.parse::<i64>().ok(),
                EXPECTED_SCHEME => signatures.push(value.to_string()),
                _ => {}
            }
        }
        let timestamp = timestamp.ok_or(SignatureError::MalformedHeader)?;
        if signatures.is_empty() {
            return Err(SignatureError::NoExpectedScheme);
        }
        Ok(Self { timestamp, signatures })
    }
}

/// Hex HMAC-SHA256 over `"{timestamp}." ++ payload`.
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    // HMAC accepts keys of any length.
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac key of any size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a signature header against the raw request body.
///
/// `tolerance_secs` bounds how old the signed timestamp may be relative to
/// `now`; zero disables the check.
pub fn verify_header(
    payload: &[u8],
    header: Option<&str>,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<SignatureHeader, SignatureError> {
    let header = header
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or(SignatureError::MissingHeader)?;
    let parsed = SignatureHeader::parse(header)?;

    let expected = compute_signature(secret, parsed.timestamp, payload);
    let matched = parsed
        .signatures
        .iter()
        .any(|candidate| bool::from(expected.as_bytes().ct_eq(candidate.as_bytes())));
    if !matched {
        return Err(SignatureError::Mismatch);
    }

    if tolerance_secs > 0 && now - parsed.timestamp > tolerance_secs {
        return Err(SignatureError::TimestampOutsideTolerance);
    }
    Ok(parsed)
}

/// Build a header value as Stripe would send it. Used by tests and local tooling.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    format!("t={},{}={}", timestamp, EXPECTED_SCHEME, compute_signature(secret, timestamp, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const BODY: &[u8] = br#"{"id":"evt_1","type":"charge.succeeded"}"#;
    const NOW: i64 = 1_700_000_000;

    #[test]
    fn accepts_valid_signature() {
        let header = sign_payload(SECRET, NOW, BODY);
        let parsed = verify_header(BODY, Some(&header), SECRET, 300, NOW + 10).unwrap();
        assert_eq!(parsed.timestamp, NOW);
    }

    #[test]
    fn accepts_when_any_v1_matches() {
        let good = compute_signature(SECRET, NOW, BODY);
        let header = format!("t={NOW},v1=deadbeef,v0=ignored,v1={good}");
        assert!(verify_header(BODY, Some(&header), SECRET, 300, NOW).is_ok());
    }

    #[test]
    fn rejects_wrong_secret() {
        let header = sign_payload("whsec_other", NOW, BODY);
        assert_eq!(
            verify_header(BODY, Some(&header), SECRET, 300, NOW),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn rejects_modified_body() {
        let header = sign_payload(SECRET, NOW, BODY);
        let tampered = br#"{"id":"evt_1","type":"charge.succeeded","x":1}"#;
        assert_eq!(
            verify_header(tampered, Some(&header), SECRET, 300, NOW),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn rejects_stale_timestamp() {
        let header = sign_payload(SECRET, NOW, BODY);
        assert_eq!(
            verify_header(BODY, Some(&header), SECRET, 300, NOW + 301),
            Err(SignatureError::TimestampOutsideTolerance)
        );
        // Zero tolerance disables the age check.
        assert!(verify_header(BODY, Some(&header), SECRET, 0, NOW + 10_000).is_ok());
    }

    #[test]
    fn header_shape_errors() {
        assert_eq!(verify_header(BODY, None, SECRET, 300, NOW), Err(SignatureError::MissingHeader));
        assert_eq!(verify_header(BODY, Some("  "), SECRET, 300, NOW), Err(SignatureError::MissingHeader));
        assert_eq!(verify_header(BODY, Some("garbage"), SECRET, 300, NOW), Err(SignatureError::MalformedHeader));
        assert_eq!(verify_header(BODY, Some("t=abc,v1=00"), SECRET, 300, NOW), Err(SignatureError::MalformedHeader));
        assert_eq!(verify_header(BODY, Some("t=1700000000"), SECRET, 300, NOW), Err(SignatureError::NoExpectedScheme));
    }
}
