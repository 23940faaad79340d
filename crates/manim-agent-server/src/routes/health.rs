use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use super::not_found;

async fn handler() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

pub fn routes() -> Router {
    Router::new().route("/health", get(handler).fallback(not_found))
}
