//! LINE webhook handler

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::api::ApiState;
use crate::channels::line::WebhookBody;
use crate::relay::EventOutcome;

/// Handle a LINE webhook delivery
///
/// Runs every event to completion before responding. The response holds
/// one entry per event in delivery order, `null` for ignored events.
pub async fn handle_webhook(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<WebhookBody>,
) -> Json<Vec<Option<EventOutcome>>> {
    tracing::debug!(
        destination = body.destination.as_deref().unwrap_or_default(),
        events = body.events.len(),
        "received LINE webhook"
    );

    if body.events.is_empty() {
        tracing::info!("empty webhook delivery (endpoint verification)");
    }

    Json(state.relay.dispatch(&body.events).await)
}
