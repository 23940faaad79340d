use crate::error::{to_env_var, ConfigError, ENV_PREFIX};
use config::{Config, Environment};
use manim_agent::generation::DEFAULT_MODEL;
use manim_agent::providers::configs::GatewayConfig;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Older deployments set these without the prefix
const LEGACY_PORT_VAR: &str = "PORT";
const LEGACY_API_KEY_VAR: &str = "AI_GATEWAY_API_KEY";

const REQUIRED_API_KEY: &str = "gateway.api_key";

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerationSettings {
    pub output_dir: PathBuf,
    pub default_model: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub gateway: GatewayConfig,
    pub generation: GenerationSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let port = env::var(LEGACY_PORT_VAR)
            .ok()
            .and_then(|port| port.parse::<u16>().ok())
            .unwrap_or_else(default_port);

        let mut builder = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", port)?
            .set_default("gateway.host", default_gateway_host())?
            .set_default("generation.output_dir", default_output_dir())?
            .set_default("generation.default_model", DEFAULT_MODEL)?;
        if let Ok(api_key) = env::var(LEGACY_API_KEY_VAR) {
            builder = builder.set_default("gateway.api_key", api_key)?;
        }

        let config = builder
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        match config.get_string(REQUIRED_API_KEY) {
            Ok(value) if !value.is_empty() => {}
            Ok(_) | Err(config::ConfigError::NotFound(_)) => {
                return Err(ConfigError::MissingEnvVar {
                    env_var: to_env_var(REQUIRED_API_KEY),
                })
            }
            Err(err) => return Err(ConfigError::Other(err)),
        }

        let result: Result<Self, config::ConfigError> = config.try_deserialize();
        match result {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                let error_str = err.to_string();
                if error_str.starts_with("missing field") {
                    let field = error_str
                        .trim_start_matches("missing field `")
                        .trim_end_matches('`');
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_gateway_host() -> String {
    "https://ai-gateway.vercel.sh".to_string()
}

fn default_output_dir() -> String {
    "generated".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("MANIM_AGENT_") {
                env::remove_var(&key);
            }
        }
        env::remove_var(LEGACY_PORT_VAR);
        env::remove_var(LEGACY_API_KEY_VAR);
    }

    #[test]
    #[serial]
    fn test_default_settings() {
        clean_env();
        env::set_var("MANIM_AGENT_GATEWAY__API_KEY", "test-key");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 3001);
        assert_eq!(settings.gateway.host, "https://ai-gateway.vercel.sh");
        assert_eq!(settings.gateway.api_key, "test-key");
        assert_eq!(settings.gateway.temperature, None);
        assert_eq!(settings.gateway.max_tokens, None);
        assert_eq!(settings.generation.output_dir, PathBuf::from("generated"));
        assert_eq!(settings.generation.default_model, "anthropic/claude-haiku-4.5");

        clean_env();
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        clean_env();
        env::set_var("MANIM_AGENT_SERVER__PORT", "8080");
        env::set_var("MANIM_AGENT_GATEWAY__API_KEY", "test-key");
        env::set_var("MANIM_AGENT_GATEWAY__HOST", "http://localhost:9999");
        env::set_var("MANIM_AGENT_GATEWAY__TEMPERATURE", "0.7");
        env::set_var("MANIM_AGENT_GATEWAY__MAX_TOKENS", "2000");
        env::set_var("MANIM_AGENT_GENERATION__OUTPUT_DIR", "/tmp/animations");
        env::set_var("MANIM_AGENT_GENERATION__DEFAULT_MODEL", "openai/gpt-4o");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.gateway.host, "http://localhost:9999");
        assert_eq!(settings.gateway.temperature, Some(0.7));
        assert_eq!(settings.gateway.max_tokens, Some(2000));
        assert_eq!(settings.generation.output_dir, PathBuf::from("/tmp/animations"));
        assert_eq!(settings.generation.default_model, "openai/gpt-4o");

        clean_env();
    }

    #[test]
    #[serial]
    fn test_legacy_variables() {
        clean_env();
        env::set_var("PORT", "4000");
        env::set_var("AI_GATEWAY_API_KEY", "legacy-key");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.port, 4000);
        assert_eq!(settings.gateway.api_key, "legacy-key");

        // prefixed variables win
        env::set_var("MANIM_AGENT_GATEWAY__API_KEY", "new-key");
        let settings = Settings::new().unwrap();
        assert_eq!(settings.gateway.api_key, "new-key");

        clean_env();
    }

    #[test]
    #[serial]
    fn test_missing_api_key() {
        clean_env();

        match Settings::new() {
            Err(ConfigError::MissingEnvVar { env_var }) => {
                assert_eq!(env_var, "MANIM_AGENT_GATEWAY__API_KEY");
            }
            other => panic!("Expected a missing variable error, got {:?}", other),
        }
    }

    #[test]
    fn test_bind_address() {
        let server_settings = ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 3001,
        };
        assert_eq!(server_settings.bind_address(), "127.0.0.1:3001");
    }
}
