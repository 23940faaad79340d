//! Tools the agent can hand to a model.
//!
//! A [`ToolSet`] is resolved once per run from the model identifier and never mixes
//! conventions. Both conventions are thin wrappers over [`file_edit`] and a
//! [`shell::ShellSession`].
pub mod convention;
pub mod file_edit;
pub mod generic;
pub mod native;
pub mod shell;

use serde_json::Value;

use crate::errors::{AgentError, AgentResult};
use crate::models::content::Content;
use crate::models::tool::{Tool, ToolCall};
pub use convention::ToolConvention;
use generic::GenericTools;
use native::NativeTools;
use shell::ShellSession;

pub enum ToolSet {
    Native(NativeTools),
    Generic(GenericTools),
}

impl ToolSet {
    /// Build the tools matching the model's convention around a fresh shell session
    pub fn resolve(model: &str, session: ShellSession) -> Self {
        Self::for_convention(ToolConvention::for_model(model), session)
    }

    pub fn for_convention(convention: ToolConvention, session: ShellSession) -> Self {
        match convention {
            ToolConvention::Native => ToolSet::Native(NativeTools::new(session)),
            ToolConvention::Generic => ToolSet::Generic(GenericTools::new(session)),
        }
    }

    pub fn convention(&self) -> ToolConvention {
        match self {
            ToolSet::Native(_) => ToolConvention::Native,
            ToolSet::Generic(_) => ToolConvention::Generic,
        }
    }

    pub fn tools(&self) -> &[Tool] {
        match self {
            ToolSet::Native(tools) => tools.tools(),
            ToolSet::Generic(tools) => tools.tools(),
        }
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools().iter().map(|t| t.name.as_str()).collect()
    }

    /// Execute a tool call. Failures come back as errors for the model to read.
    pub async fn call(&self, call: &ToolCall) -> AgentResult<Vec<Content>> {
        tracing::info!(tool = %call.name, arguments = %call.arguments, "🧰 Tool call");

        let result = match self {
            ToolSet::Native(tools) => tools.call(&call.name, &call.arguments).await,
            ToolSet::Generic(tools) => tools.call(&call.name, &call.arguments).await,
        };

        if let Err(e) = &result {
            tracing::debug!(tool = %call.name, error = %e, "Tool call failed");
        }
        result
    }
}

pub(crate) fn required_str<'a>(params: &'a Value, key: &str) -> AgentResult<&'a str> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| AgentError::InvalidParameters(format!("Missing '{}' parameter", key)))
}

pub(crate) fn optional_str<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

pub(crate) fn required_u64(params: &Value, key: &str) -> AgentResult<u64> {
    params
        .get(key)
        .and_then(|v| v.as_u64())
        .ok_or_else(|| AgentError::InvalidParameters(format!("Missing '{}' parameter", key)))
}
