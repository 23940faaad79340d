use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub const ENV_PREFIX: &str = "MANIM_AGENT";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },
    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Environment variable that sets a dotted config key, e.g. `gateway.api_key`
/// is read from `MANIM_AGENT_GATEWAY__API_KEY`
pub fn to_env_var(field: &str) -> String {
    format!("{}_{}", ENV_PREFIX, field.replace('.', "__").to_uppercase())
}

/// Any failure while serving a request, rendered as a 500 with the error chain
#[derive(Debug)]
pub struct ApiError(anyhow::Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!("Request failed: {:?}", self.0);
        let body = json!({
            "error": self.0.to_string(),
            "details": format!("{:?}", self.0),
        });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_env_var() {
        assert_eq!(to_env_var("gateway.api_key"), "MANIM_AGENT_GATEWAY__API_KEY");
        assert_eq!(to_env_var("server.port"), "MANIM_AGENT_SERVER__PORT");
    }

    #[test]
    fn test_api_error_response() {
        let err = anyhow::anyhow!("connection refused").context("Gateway request failed");
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
