use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::{ApiError, ApiErrorResponse};

pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Opaque per-browser identifier; the partition key for every stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(pub String);

pub fn extract_client_id(headers: &HeaderMap) -> Option<ClientId> {
    headers
        .get(CLIENT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| ClientId(s.to_string()))
}

/// Rejects requests without a usable `X-Client-ID` and hands the value to
/// handlers through request extensions.
pub async fn require_client_id(mut req: Request, next: Next) -> Result<Response, ApiErrorResponse> {
    let client_id = extract_client_id(req.headers())
        .ok_or_else(|| ApiErrorResponse::bad_request(ApiError::missing_client_id()))?;
    req.extensions_mut().insert(client_id);
    Ok(next.run(req).await)
}
