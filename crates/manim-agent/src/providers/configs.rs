use serde::Deserialize;

use crate::tools::ToolConvention;

/// Connection details for the LLM gateway that fronts every model
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub host: String,
    pub api_key: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<i32>,
}

// Unified enum to wrap different provider configurations
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    OpenAi(OpenAiProviderConfig),
    Anthropic(AnthropicProviderConfig),
}

impl ProviderConfig {
    /// Native models speak the anthropic messages api, everything else the openai one.
    /// The gateway routes on the full `<provider>/<model>` identifier in both cases.
    pub fn for_model(gateway: &GatewayConfig, model: &str) -> Self {
        match ToolConvention::for_model(model) {
            ToolConvention::Native => ProviderConfig::Anthropic(AnthropicProviderConfig {
                host: gateway.host.clone(),
                api_key: gateway.api_key.clone(),
                model: model.to_string(),
                temperature: gateway.temperature,
                max_tokens: gateway.max_tokens,
            }),
            ToolConvention::Generic => ProviderConfig::OpenAi(OpenAiProviderConfig {
                host: gateway.host.clone(),
                api_key: gateway.api_key.clone(),
                model: model.to_string(),
                temperature: gateway.temperature,
                max_tokens: gateway.max_tokens,
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct AnthropicProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> GatewayConfig {
        GatewayConfig {
            host: "https://gateway.test".to_string(),
            api_key: "key".to_string(),
            temperature: Some(0.2),
            max_tokens: None,
        }
    }

    #[test]
    fn test_for_model() {
        match ProviderConfig::for_model(&gateway(), "anthropic/claude-haiku-4.5") {
            ProviderConfig::Anthropic(config) => {
                assert_eq!(config.model, "anthropic/claude-haiku-4.5");
                assert_eq!(config.temperature, Some(0.2));
            }
            other => panic!("Expected anthropic config, got {:?}", other),
        }

        match ProviderConfig::for_model(&gateway(), "openai/gpt-4o") {
            ProviderConfig::OpenAi(config) => {
                assert_eq!(config.host, "https://gateway.test");
                assert_eq!(config.model, "openai/gpt-4o");
            }
            other => panic!("Expected openai config, got {:?}", other),
        }
    }
}
