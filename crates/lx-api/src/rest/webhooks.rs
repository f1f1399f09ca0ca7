use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use crate::error::{ApiError, ApiErrorResponse};
use crate::state::AppState;
use crate::webhook::{verify_signature, PaymentEvent, SIGNATURE_HEADER};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activation {
    pub client_id: String,
    pub plan_id: String,
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub received: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activated: Option<Activation>,
}

impl WebhookResponse {
    fn received() -> Json<Self> {
        Json(Self {
            received: true,
            activated: None,
        })
    }
}

/// Payment-processor callback. A store failure while activating returns
/// `500` so the processor redelivers; activation is idempotent.
pub async fn payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiErrorResponse> {
    match &state.config.webhook.secret {
        Some(secret) => {
            let header = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
            verify_signature(
                secret,
                header,
                &body,
                state.clock.now().timestamp(),
                state.config.webhook.tolerance_secs,
            )
            .map_err(|e| {
                tracing::warn!("Rejected webhook: {}", e);
                ApiErrorResponse::bad_request(ApiError::invalid_signature())
            })?;
        }
        None => {
            tracing::warn!("Webhook secret not configured; accepting unverified event");
        }
    }

    let event: PaymentEvent = serde_json::from_slice(&body).map_err(|e| {
        ApiErrorResponse::bad_request(ApiError::invalid_event(format!(
            "invalid event body: {}",
            e
        )))
    })?;

    if !event.is_completion() {
        tracing::debug!(event_type = %event.event_type, "Ignoring webhook event");
        return Ok(WebhookResponse::received());
    }

    let Some((client_id, plan_id)) = event.activation() else {
        tracing::warn!(
            event_type = %event.event_type,
            "Completion event without clientId/planId metadata"
        );
        return Ok(WebhookResponse::received());
    };

    state
        .quota_tracker
        .entitlements()
        .activate(client_id, plan_id)?;

    Ok(Json(WebhookResponse {
        received: true,
        activated: Some(Activation {
            client_id: client_id.to_string(),
            plan_id: plan_id.to_string(),
        }),
    }))
}
