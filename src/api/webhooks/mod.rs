//! Webhook endpoints for channel integrations

use std::sync::Arc;

use axum::{Router, middleware, routing::post};

use super::ApiState;
use super::auth::require_line_signature;

pub mod line;

/// Build webhooks router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/webhook", post(line::handle_webhook))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_line_signature,
        ))
        .with_state(state)
}
