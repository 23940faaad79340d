use serde_json::{json, Value};

use super::file_edit;
use super::shell::ShellSession;
use super::{optional_str, required_str, required_u64};
use crate::errors::{AgentError, AgentResult};
use crate::models::content::Content;
use crate::models::tool::Tool;

pub const TEXT_EDITOR_TOOL: &str = "str_replace_based_edit_tool";
pub const TEXT_EDITOR_TYPE: &str = "text_editor_20250728";
pub const BASH_TOOL: &str = "bash";
pub const BASH_TYPE: &str = "bash_20250124";

/// Longest file view handed back to the model
pub const MAX_VIEW_CHARACTERS: usize = 50_000;

/// The provider defined text editor and bash tools
pub struct NativeTools {
    tools: Vec<Tool>,
    session: ShellSession,
}

impl NativeTools {
    pub fn new(session: ShellSession) -> Self {
        // The provider owns these schemas, ours are only used for logging and diagnostics
        let text_editor = Tool::new(
            TEXT_EDITOR_TOOL,
            "View, create and edit files. The `command` parameter selects the operation.",
            json!({
                "type": "object",
                "required": ["command", "path"],
                "properties": {
                    "command": {"enum": ["view", "create", "str_replace", "insert"]},
                    "path": {"type": "string"},
                    "view_range": {"type": "array", "items": {"type": "integer"}},
                    "file_text": {"type": "string"},
                    "old_str": {"type": "string"},
                    "new_str": {"type": "string"},
                    "insert_line": {"type": "integer"},
                    "insert_text": {"type": "string"}
                }
            }),
        )
        .with_builtin(
            TEXT_EDITOR_TYPE,
            json!({"max_characters": MAX_VIEW_CHARACTERS}),
        );

        let bash = Tool::new(
            BASH_TOOL,
            "Run commands in a persistent bash session.",
            json!({
                "type": "object",
                "properties": {
                    "command": {"type": "string"},
                    "restart": {"type": "boolean"}
                }
            }),
        )
        .with_builtin(BASH_TYPE, json!({}));

        Self {
            tools: vec![text_editor, bash],
            session,
        }
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub async fn call(&self, name: &str, params: &Value) -> AgentResult<Vec<Content>> {
        match name {
            TEXT_EDITOR_TOOL => self.text_editor(params).map(|text| vec![Content::text(text)]),
            BASH_TOOL => Ok(vec![Content::text(self.bash(params).await?)]),
            _ => Err(AgentError::ToolNotFound(name.to_string())),
        }
    }

    fn text_editor(&self, params: &Value) -> AgentResult<String> {
        let command = required_str(params, "command")?;
        let path = required_str(params, "path")?;

        match command {
            "view" => {
                let range = match params.get("view_range") {
                    Some(Value::Array(bounds)) => Some(parse_view_range(bounds)?),
                    Some(Value::Null) | None => None,
                    Some(_) => {
                        return Err(AgentError::InvalidParameters(
                            "'view_range' must be an array of two integers".into(),
                        ))
                    }
                };
                let content = file_edit::view(path, range)?;
                Ok(truncate_view(content))
            }
            "create" => {
                let file_text = required_str(params, "file_text")?;
                Ok(file_edit::create(path, file_text)?)
            }
            "str_replace" => {
                let old_str = required_str(params, "old_str")?;
                let new_str = optional_str(params, "new_str").unwrap_or("");
                Ok(file_edit::replace(path, old_str, new_str)?)
            }
            "insert" => {
                let insert_line = required_u64(params, "insert_line")?;
                // older editor versions send the text as new_str
                let text = optional_str(params, "insert_text")
                    .or_else(|| optional_str(params, "new_str"))
                    .ok_or_else(|| {
                        AgentError::InvalidParameters("Missing 'insert_text' parameter".into())
                    })?;
                Ok(file_edit::insert(path, insert_line as usize, text)?)
            }
            _ => Err(AgentError::InvalidParameters(format!(
                "Unknown command '{}'",
                command
            ))),
        }
    }

    async fn bash(&self, params: &Value) -> AgentResult<String> {
        if params.get("restart").and_then(|v| v.as_bool()) == Some(true) {
            self.session.restart().await;
            return Ok("Bash session restarted".to_string());
        }

        let command = required_str(params, "command")?;
        let output = self.session.run(command).await;

        if output.success() {
            if output.stdout.is_empty() {
                Ok("Command executed successfully (no output)".to_string())
            } else {
                Ok(output.stdout)
            }
        } else {
            Ok(format!(
                "Error: exit code {}\nStderr: {}\nStdout: {}",
                output.exit_code, output.stderr, output.stdout
            ))
        }
    }
}

fn parse_view_range(bounds: &[Value]) -> AgentResult<(usize, i64)> {
    let invalid = || AgentError::InvalidParameters("'view_range' must be [start, end]".into());
    match bounds {
        [start, end] => {
            let start = start.as_u64().ok_or_else(invalid)? as usize;
            let end = end.as_i64().ok_or_else(invalid)?;
            Ok((start, end))
        }
        _ => Err(invalid()),
    }
}

fn truncate_view(content: String) -> String {
    match content.char_indices().nth(MAX_VIEW_CHARACTERS) {
        Some((cut, _)) => format!(
            "{}\n[... truncated after {} characters]",
            &content[..cut],
            MAX_VIEW_CHARACTERS
        ),
        None => content,
    }
}
