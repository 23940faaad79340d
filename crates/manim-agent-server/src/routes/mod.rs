// Export route modules
pub mod generate;
pub mod health;
pub mod test_tools;

use axum::{http::StatusCode, response::IntoResponse, Json, Router};
use serde_json::json;

use crate::state::AppState;

// Function to configure all routes
pub fn configure(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(generate::routes(state.clone()))
        .merge(test_tools::routes(state))
        .fallback(not_found)
}

/// Also the fallback of every method router, so a wrong method on a known path
/// answers the same way as an unknown path
pub(crate) async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({"error": "Not found"})))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::{body::Body, http::Request, response::Response, Router};
    use manim_agent::providers::configs::GatewayConfig;
    use manim_agent::tools::shell::HostShell;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::configuration::{GenerationSettings, ServerSettings, Settings};
    use crate::state::AppState;

    pub fn state(gateway_host: &str, output_dir: &std::path::Path) -> AppState {
        let settings = Settings {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            gateway: GatewayConfig {
                host: gateway_host.to_string(),
                api_key: "test-key".to_string(),
                temperature: None,
                max_tokens: None,
            },
            generation: GenerationSettings {
                output_dir: output_dir.to_path_buf(),
                default_model: "openai/gpt-4o".to_string(),
            },
        };
        AppState::new(&settings, Arc::new(HostShell))
    }

    pub async fn send(app: Router, request: Request<Body>) -> (Response, Value) {
        let response = app.oneshot(request).await.unwrap();
        let (parts, body) = response.into_parts();
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (Response::from_parts(parts, Body::empty()), json)
    }
}
