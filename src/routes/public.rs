use crate::{AppState, models::MessageResponse};
use axum::{Json, Router, routing::get};

/// Public Router Module
///
/// Endpoints that need no token: the API root greeting and the health check
/// used by load balancers.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(|| async {
                Json(MessageResponse {
                    message: "Welcome to backend of cappa".to_string(),
                })
            }),
        )
        .route("/health", get(|| async { "ok" }))
}
