use axum::body::Bytes;
use axum::extract::State;
use axum::{Extension, Json};
use lx_quota::EntitlementRecord;
use serde::{Deserialize, Serialize};

use crate::client_id::ClientId;
use crate::error::{ApiError, ApiErrorResponse};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateRequest {
    #[serde(default)]
    pub plan_id: Option<String>,
}

#[derive(Serialize)]
pub struct ActivateResponse {
    pub success: bool,
    pub entitlements: EntitlementRecord,
}

/// Browsers posting `JSON.stringify(..)` without headers send `text/plain`,
/// so the body is decoded regardless of its content type.
pub async fn activate(
    State(state): State<AppState>,
    Extension(ClientId(client_id)): Extension<ClientId>,
    body: Bytes,
) -> Result<Json<ActivateResponse>, ApiErrorResponse> {
    let plan_id = serde_json::from_slice::<ActivateRequest>(&body)
        .ok()
        .and_then(|req| req.plan_id)
        .ok_or_else(|| ApiErrorResponse::bad_request(ApiError::invalid_plan()))?;

    let entitlements = state
        .quota_tracker
        .entitlements()
        .activate(&client_id, &plan_id)?;

    Ok(Json(ActivateResponse {
        success: true,
        entitlements,
    }))
}
