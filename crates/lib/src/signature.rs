//! Webhook signature verification (`X-Hub-Signature-256`).
//!
//! The platform signs every delivery with HMAC-SHA256 keyed by the app secret and sends
//! `sha256=<hex digest>` in the header. Verification runs over the raw body bytes exactly
//! as received; re-serializing the JSON would change the digest.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the delivery signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

const SIGNATURE_PREFIX: &str = "sha256=";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing x-hub-signature-256 header")]
    Missing,
    #[error("malformed x-hub-signature-256 header")]
    Malformed,
    #[error("signature mismatch")]
    Mismatch,
    #[error("app secret not configured")]
    NoSecret,
}

/// Sign a payload and return the header value (`sha256=<hex>`).
pub fn sign(secret: &str, payload: &[u8]) -> String {
    let mut mac = new_mac(secret);
    mac.update(payload);
    format!("{}{}", SIGNATURE_PREFIX, hex::encode(mac.finalize().into_bytes()))
}

/// Verify the header value against the raw body. The digest comparison is constant-time.
pub fn verify_signature(
    secret: Option<&str>,
    payload: &[u8],
    header: Option<&str>,
) -> Result<(), SignatureError> {
    let secret = secret
        .filter(|s| !s.is_empty())
        .ok_or(SignatureError::NoSecret)?;
    let header = header.ok_or(SignatureError::Missing)?;
    let digest_hex = header
        .trim()
        .strip_prefix(SIGNATURE_PREFIX)
        .ok_or(SignatureError::Malformed)?;
    let expected = hex::decode(digest_hex).map_err(|_| SignatureError::Malformed)?;

    let mut mac = new_mac(secret);
    mac.update(payload);
    mac.verify_slice(&expected).map_err(|_| SignatureError::Mismatch)
}

fn new_mac(secret: &str) -> HmacSha256 {
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "app-secret";
    const BODY: &[u8] = br#"{"object":"page","entry":[]}"#;

    #[test]
    fn accepts_own_signature() {
        let sig = sign(SECRET, BODY);
        assert!(sig.starts_with("sha256="));
        assert_eq!(sig.len(), "sha256=".len() + 64);
        assert_eq!(verify_signature(Some(SECRET), BODY, Some(&sig)), Ok(()));
    }

    #[test]
    fn known_vector() {
        // Well-known HMAC-SHA256 vector.
        let sig = sign("key", b"The quick brown fox jumps over the lazy dog");
        assert_eq!(
            sig,
            "sha256=f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn single_byte_change_is_rejected() {
        let sig = sign(SECRET, BODY);
        let mut tampered = BODY.to_vec();
        tampered[2] ^= 0x01;
        assert_eq!(
            verify_signature(Some(SECRET), &tampered, Some(&sig)),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let sig = sign("other", BODY);
        assert_eq!(
            verify_signature(Some(SECRET), BODY, Some(&sig)),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn missing_and_malformed_headers() {
        assert_eq!(
            verify_signature(Some(SECRET), BODY, None),
            Err(SignatureError::Missing)
        );
        assert_eq!(
            verify_signature(Some(SECRET), BODY, Some("sha1=abcd")),
            Err(SignatureError::Malformed)
        );
        assert_eq!(
            verify_signature(Some(SECRET), BODY, Some("sha256=zz")),
            Err(SignatureError::Malformed)
        );
    }

    #[test]
    fn no_secret_rejects_everything() {
        let sig = sign("", BODY);
        assert_eq!(
            verify_signature(None, BODY, Some(&sig)),
            Err(SignatureError::NoSecret)
        );
        assert_eq!(
            verify_signature(Some(""), BODY, Some(&sig)),
            Err(SignatureError::NoSecret)
        );
    }
}
