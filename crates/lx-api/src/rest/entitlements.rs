use axum::extract::State;
use axum::{Extension, Json};
use lx_quota::EntitlementRecord;

use crate::client_id::ClientId;
use crate::error::ApiErrorResponse;
use crate::state::AppState;

pub async fn get_entitlements(
    State(state): State<AppState>,
    Extension(ClientId(client_id)): Extension<ClientId>,
) -> Result<Json<EntitlementRecord>, ApiErrorResponse> {
    let record = state.quota_tracker.entitlements().get(&client_id)?;
    Ok(Json(record))
}
