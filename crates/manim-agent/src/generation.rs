//! One end-to-end generation: allocate an output directory, pick tools and prompt for
//! the model, then run the agent until it is done.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::{Agent, AgentEvent, RunSummary, MAX_STEPS};
use crate::models::message::Message;
use crate::prompt::system_prompt;
use crate::prompt_template::{render_task, TaskContext};
use crate::providers::base::{Provider, Usage};
use crate::tools::shell::{ShellBackend, ShellSession};
use crate::tools::ToolSet;

pub const DEFAULT_MODEL: &str = "anthropic/claude-haiku-4.5";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Teaching,
    ProblemSolving,
}

impl Mode {
    /// Appended to the task right after the topic
    pub fn hint(&self) -> &'static str {
        match self {
            Mode::ProblemSolving => "\n\nMODE: Problem-Solving (JEE/NEET). Use solution tree, 70/30 solve-explain, color coding (GREEN=given, YELLOW=unknown, BLUE=focus, GOLD=answer), NCERT Class 10 baseline.",
            Mode::Teaching => "\n\nMODE: Teaching (concept explanation from first principles).",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub topic: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub mode: Option<Mode>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub request_id: String,
    pub text: String,
    pub usage: Usage,
    pub steps: usize,
}

pub fn task_prompt(topic: &str, mode: Option<Mode>, output_dir: &Path) -> Result<String> {
    let output_dir = output_dir.to_string_lossy();
    render_task(&TaskContext {
        topic,
        mode_hint: mode.map(|m| m.hint()).unwrap_or(""),
        output_dir: &output_dir,
    })
    .context("Failed to render task prompt")
}

/// Runs generation requests. Nothing is shared between requests except the
/// output root and the shell backend.
pub struct Generator {
    output_root: PathBuf,
    working_dir: PathBuf,
    default_model: String,
    shell: Arc<dyn ShellBackend>,
    max_steps: usize,
}

impl Generator {
    pub fn new<P: Into<PathBuf>>(output_root: P, shell: Arc<dyn ShellBackend>) -> Self {
        Self {
            output_root: output_root.into(),
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            default_model: DEFAULT_MODEL.to_string(),
            shell,
            max_steps: MAX_STEPS,
        }
    }

    pub fn with_default_model<S: Into<String>>(mut self, model: S) -> Self {
        self.default_model = model.into();
        self
    }

    /// Where each run's shell session starts, the process directory by default
    pub fn with_working_dir<P: Into<PathBuf>>(mut self, working_dir: P) -> Self {
        self.working_dir = working_dir.into();
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Run one request to completion.
    ///
    /// `provider_for` builds the provider for the resolved model. The output directory
    /// is left in place whatever happens.
    pub async fn generate<F>(
        &self,
        request: GenerateRequest,
        provider_for: F,
    ) -> Result<GenerateResponse>
    where
        F: FnOnce(&str) -> Result<Box<dyn Provider>>,
    {
        let request_id = Uuid::new_v4().to_string();
        let output_dir = self.output_root.join(&request_id);
        tokio::fs::create_dir_all(&output_dir)
            .await
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;

        let model = request
            .model
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.default_model.clone());

        let session = ShellSession::new(self.shell.clone(), &self.working_dir);
        let tools = ToolSet::resolve(&model, session);
        let system = system_prompt(tools.convention());
        let task = task_prompt(&request.topic, request.mode, &output_dir)?;

        tracing::info!(
            request_id = %request_id,
            model = %model,
            convention = %tools.convention(),
            output_dir = %output_dir.display(),
            working_dir = %self.working_dir.display(),
            "Starting generation"
        );

        let provider = provider_for(&model)?;
        let agent = Agent::new(provider, tools).with_max_steps(self.max_steps);

        let mut stream = agent.reply(system, &[Message::user().with_text(task)]);
        let mut summary = RunSummary::default();
        while let Some(event) = stream.try_next().await? {
            if let AgentEvent::Text(text) = &event {
                tracing::info!(request_id = %request_id, "{}", text);
            }
            summary.record(&event);
        }

        if summary.truncated() {
            tracing::warn!(request_id = %request_id, "Generation stopped at the step limit");
        }
        tracing::info!(
            request_id = %request_id,
            steps = summary.steps.len(),
            total_tokens = ?summary.usage.total_tokens,
            "Generation finished"
        );

        Ok(GenerateResponse {
            request_id,
            text: summary.text,
            usage: summary.usage,
            steps: summary.steps.len(),
        })
    }
}
