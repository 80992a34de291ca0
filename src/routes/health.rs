use axum::{response::IntoResponse, Json};
use serde_json::json;

#[axum::debug_handler]
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
