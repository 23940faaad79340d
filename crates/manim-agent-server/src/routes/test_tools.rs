use super::not_found;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use manim_agent::diagnostics::{self, DEFAULT_TEST_MODEL};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct TestToolsQuery {
    model: Option<String>,
}

async fn handler(State(state): State<AppState>, Query(query): Query<TestToolsQuery>) -> Response {
    let model = query
        .model
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| DEFAULT_TEST_MODEL.to_string());

    match diagnostics::check_tools(&model, &state.scratch_dir(), state.shell.clone()).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            tracing::error!(model = %model, "🧪 Tool test failed: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "model": model,
                    "allOk": false,
                    "error": e.to_string(),
                    "results": {},
                })),
            )
                .into_response()
        }
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/test-tools", get(handler).fallback(not_found))
        .with_state(state)
}
