use super::not_found;
use crate::{error::ApiError, state::AppState};
use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use manim_agent::{
    generation::{GenerateRequest, GenerateResponse},
    providers::{configs::ProviderConfig, factory},
};

async fn handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(request) = payload.context("Invalid request body")?;
    tracing::info!(
        topic = %request.topic,
        model = ?request.model,
        mode = ?request.mode,
        "📥 Received generation request"
    );

    let gateway = &state.gateway;
    let response = state
        .generator
        .generate(request, |model| {
            factory::get_provider(ProviderConfig::for_model(gateway, model))
        })
        .await?;

    tracing::info!(
        request_id = %response.request_id,
        steps = response.steps,
        total_tokens = ?response.usage.total_tokens,
        "✅ Generation completed"
    );
    Ok(Json(response))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/generate", post(handler).fallback(not_found))
        .with_state(state)
}
