use axum::{response::IntoResponse, Json};
use serde_json::json;

// axum handler for `/`
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": concat!(env!("CARGO_PKG_NAME"), " backend is running!"),
    }))
}
