//! Webhook signature middleware

use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use secrecy::ExposeSecret;

use super::ApiState;
use crate::channels::line::{SIGNATURE_HEADER, verify_signature};

/// Largest webhook body accepted (LINE batches are small)
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Extract the signature header
fn extract_signature(req: &Request) -> Option<&str> {
    req.headers()
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
}

/// Middleware rejecting webhook requests whose body signature does not match
pub async fn require_line_signature(
    State(state): State<Arc<ApiState>>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(signature) = extract_signature(&req).map(ToString::to_string) else {
        tracing::debug!("no LINE signature provided");
        return Err(StatusCode::UNAUTHORIZED);
    };

    // The body must be read to verify it, then handed on unchanged
    let (parts, body) = req.into_parts();
    let bytes = to_bytes(body, MAX_BODY_BYTES).await.map_err(|e| {
        tracing::warn!(error = %e, "failed to read webhook body");
        StatusCode::PAYLOAD_TOO_LARGE
    })?;

    if !verify_signature(&bytes, &signature, state.channel_secret.expose_secret()) {
        tracing::warn!("LINE webhook signature mismatch");
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}
