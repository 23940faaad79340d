use std::path::PathBuf;
use std::sync::Arc;

use manim_agent::generation::Generator;
use manim_agent::providers::configs::GatewayConfig;
use manim_agent::tools::shell::ShellBackend;

use crate::configuration::Settings;

/// Scratch directory for tool self tests, below the output root
const TEST_TOOLS_DIR: &str = "_test-tools";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub gateway: GatewayConfig,
    pub generator: Arc<Generator>,
    pub shell: Arc<dyn ShellBackend>,
}

impl AppState {
    pub fn new(settings: &Settings, shell: Arc<dyn ShellBackend>) -> Self {
        let generator = Generator::new(&settings.generation.output_dir, shell.clone())
            .with_default_model(&settings.generation.default_model);
        Self {
            gateway: settings.gateway.clone(),
            generator: Arc::new(generator),
            shell,
        }
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.generator.output_root().join(TEST_TOOLS_DIR)
    }
}
