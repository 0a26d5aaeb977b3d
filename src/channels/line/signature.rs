//! Webhook signature verification
//!
//! LINE signs each request body with HMAC-SHA256 keyed by the channel
//! secret and sends the base64 digest in `x-line-signature`.

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the request signature
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Compute the base64 signature of a request body
#[must_use]
pub fn sign(body: &[u8], channel_secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC accepts any key length"));
    mac.update(body);
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

/// Check a request body against its signature header
#[must_use]
pub fn verify_signature(body: &[u8], signature: &str, channel_secret: &str) -> bool {
    let Ok(expected) = base64::engine::general_purpose::STANDARD.decode(signature.trim()) else {
        tracing::warn!("signature header is not valid base64");
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(channel_secret.as_bytes()) else {
        tracing::warn!("failed to create HMAC");
        return false;
    };

    mac.update(body);
    // Constant-time comparison
    mac.verify_slice(&expected).is_ok()
}
