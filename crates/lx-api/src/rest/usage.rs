use axum::extract::State;
use axum::{Extension, Json};
use lx_quota::UsageRecord;

use crate::client_id::ClientId;
use crate::error::ApiErrorResponse;
use crate::state::AppState;

pub async fn get_usage(
    State(state): State<AppState>,
    Extension(ClientId(client_id)): Extension<ClientId>,
) -> Result<Json<UsageRecord>, ApiErrorResponse> {
    let record = state.quota_tracker.usage().get(&client_id)?;
    Ok(Json(record))
}
