use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::client_id::require_client_id;
use crate::cors::{cors_layer, preflight};
use crate::rest::{ai, entitlements, health, subscriptions, usage, webhooks};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Public routes (no client identity required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health))
        .route("/api/webhooks/payment", post(webhooks::payment));

    // Client routes (X-Client-ID required)
    let client_routes = Router::new()
        .route("/api/entitlements", get(entitlements::get_entitlements))
        .route("/api/usage", get(usage::get_usage))
        .route("/api/subscriptions/activate", post(subscriptions::activate))
        .route("/api/ai/consume", post(ai::consume))
        .route_layer(middleware::from_fn(require_client_id));

    Router::new()
        .merge(public_routes)
        .merge(client_routes)
        .layer(cors_layer())
        .layer(middleware::from_fn(preflight))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
