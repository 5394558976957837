//! Webhook signature verification
//!
//! PayMongo signs each delivery with header
//! `paymongo-signature: t=<ts>,te=<test_sig>,li=<live_sig>` where each
//! signature is hex HMAC-SHA256 over `"<ts>.<raw body>"`. Only one of
//! `te`/`li` is populated depending on the mode of the key that created the
//! webhook.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{PaymentError, Result};

/// Header carrying the signature
pub const SIGNATURE_HEADER: &str = "paymongo-signature";

type HmacSha256 = Hmac<Sha256>;

/// Parsed `paymongo-signature` header
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: String,
    pub test_signature: Option<String>,
    pub live_signature: Option<String>,
}

impl SignatureHeader {
    /// Parse `t=..,te=..,li=..`; unknown keys are ignored
    pub fn parse(header: &str) -> Result<Self> {
        let mut parsed = Self::default();

        for part in header.split(',') {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "t" => value.clone_into(&mut parsed.timestamp),
                "te" if !value.is_empty() => parsed.test_signature = Some(value.to_string()),
                "li" if !value.is_empty() => parsed.live_signature = Some(value.to_string()),
                _ => {}
            }
        }

        if parsed.timestamp.is_empty() {
            return Err(PaymentError::WebhookSignature("missing timestamp".into()));
        }
        if parsed.test_signature.is_none() && parsed.live_signature.is_none() {
            return Err(PaymentError::WebhookSignature("missing signature".into()));
        }

        Ok(parsed)
    }

    /// Check against the test signature, falling back to the live one
    pub fn verify(&self, payload: &[u8], secret: &str) -> Result<()> {
        let candidates = [&self.test_signature, &self.live_signature];
        let matched = candidates
            .into_iter()
            .flatten()
            .any(|sig| signature_matches(&self.timestamp, payload, secret, sig));

        if matched {
            Ok(())
        } else {
            Err(PaymentError::WebhookSignature("signature mismatch".into()))
        }
    }
}

/// Parse `header` and verify it against `payload`
pub fn verify_signature(header: &str, payload: &[u8], secret: &str) -> Result<SignatureHeader> {
    let parsed = SignatureHeader::parse(header)?;
    parsed.verify(payload, secret)?;
    Ok(parsed)
}

fn mac_for(timestamp: &str, payload: &[u8], secret: &str) -> HmacSha256 {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC-SHA256 accepts keys of any length"),
    };
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac
}

/// Constant-time comparison of a hex signature
fn signature_matches(timestamp: &str, payload: &[u8], secret: &str, signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature) else {
        return false;
    };
    mac_for(timestamp, payload, secret)
        .verify_slice(&expected)
        .is_ok()
}

/// Compute the hex signature PayMongo would send
pub fn compute_signature(timestamp: &str, payload: &[u8], secret: &str) -> String {
    hex::encode(mac_for(timestamp, payload, secret).finalize().into_bytes())
}
