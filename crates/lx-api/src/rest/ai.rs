use axum::extract::State;
use axum::{Extension, Json};
use lx_quota::ConsumeOutcome;

use crate::client_id::ClientId;
use crate::error::ApiErrorResponse;
use crate::state::AppState;

/// Spend one AI consultation from today's allowance. A denial is a normal
/// `200` answer with `allowed: false`, not an error.
pub async fn consume(
    State(state): State<AppState>,
    Extension(ClientId(client_id)): Extension<ClientId>,
) -> Result<Json<ConsumeOutcome>, ApiErrorResponse> {
    let outcome = state.quota_tracker.consume(&client_id)?;
    Ok(Json(outcome))
}
