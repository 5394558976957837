//! PayMongo webhook endpoint

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use serde::Serialize;

use mailroom_payments::{PaymentStatus, SIGNATURE_HEADER, WebhookHandler, WebhookOutcome};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
}

/// Verify the delivery and relay the payment status.
///
/// The body is taken raw; the signature covers the exact bytes sent.
pub async fn paymongo_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let client = state
        .paymongo
        .as_ref()
        .ok_or(ApiError::Unavailable("Payments"))?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let handler = WebhookHandler::new(state.rpc.clone());
    let outcome = handler
        .handle(&body, signature, client.webhook_secret())
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Webhook rejected"))?;

    if let WebhookOutcome::Ignored { event_type } = &outcome {
        tracing::debug!(%event_type, "Webhook acknowledged without relay");
    }

    Ok(Json(WebhookAck {
        received: true,
        status: outcome.status(),
    }))
}
