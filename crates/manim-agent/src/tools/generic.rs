use serde_json::{json, Value};

use super::file_edit;
use super::shell::ShellSession;
use super::{required_str, required_u64};
use crate::errors::{AgentError, AgentResult};
use crate::models::content::Content;
use crate::models::tool::Tool;

pub const READ_FILE_TOOL: &str = "read_file";
pub const WRITE_FILE_TOOL: &str = "write_file";
pub const STRING_REPLACE_TOOL: &str = "string_replace";
pub const LINE_INSERT_TOOL: &str = "line_insert";
pub const BASH_TOOL: &str = "bash";

/// Plain function tools for models without provider defined editors
pub struct GenericTools {
    tools: Vec<Tool>,
    session: ShellSession,
}

impl GenericTools {
    pub fn new(session: ShellSession) -> Self {
        let read_file = Tool::new(
            READ_FILE_TOOL,
            "Read the full contents of a file.",
            json!({
                "type": "object",
                "required": ["path"],
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Absolute path of the file to read."
                    }
                }
            }),
        );

        let write_file = Tool::new(
            WRITE_FILE_TOOL,
            "Create or overwrite a file with the given content. Parent directories are created as needed.",
            json!({
                "type": "object",
                "required": ["path", "content"],
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Absolute path of the file to write."
                    },
                    "content": {
                        "type": "string",
                        "description": "The complete new content of the file."
                    }
                }
            }),
        );

        let string_replace = Tool::new(
            STRING_REPLACE_TOOL,
            "Replace the first exact occurrence of old_str in a file with new_str. \
            old_str must match byte for byte, including whitespace and indentation.",
            json!({
                "type": "object",
                "required": ["path", "old_str", "new_str"],
                "properties": {
                    "path": {"type": "string", "description": "Absolute path of the file to edit."},
                    "old_str": {"type": "string", "description": "The exact text to replace."},
                    "new_str": {"type": "string", "description": "The replacement text."}
                }
            }),
        );

        let line_insert = Tool::new(
            LINE_INSERT_TOOL,
            "Insert a new line of text before the given zero-indexed line. \
            Use the line count to append at the end of the file.",
            json!({
                "type": "object",
                "required": ["path", "insert_line", "insert_text"],
                "properties": {
                    "path": {"type": "string", "description": "Absolute path of the file to edit."},
                    "insert_line": {"type": "integer", "description": "Zero-indexed line to insert before."},
                    "insert_text": {"type": "string", "description": "The text to insert."}
                }
            }),
        );

        let bash = Tool::new(
            BASH_TOOL,
            "Run a bash command. Returns stdout, stderr and the exit code. \
            Commands time out after 30 seconds.",
            json!({
                "type": "object",
                "required": ["command"],
                "properties": {
                    "command": {"type": "string", "description": "The shell command to run."}
                }
            }),
        );

        Self {
            tools: vec![read_file, write_file, string_replace, line_insert, bash],
            session,
        }
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub async fn call(&self, name: &str, params: &Value) -> AgentResult<Vec<Content>> {
        let text = match name {
            READ_FILE_TOOL => file_edit::view(required_str(params, "path")?, None)?,
            WRITE_FILE_TOOL => file_edit::create(
                required_str(params, "path")?,
                required_str(params, "content")?,
            )?,
            STRING_REPLACE_TOOL => file_edit::replace(
                required_str(params, "path")?,
                required_str(params, "old_str")?,
                required_str(params, "new_str")?,
            )?,
            LINE_INSERT_TOOL => file_edit::insert(
                required_str(params, "path")?,
                required_u64(params, "insert_line")? as usize,
                required_str(params, "insert_text")?,
            )?,
            BASH_TOOL => {
                let output = self.session.run(required_str(params, "command")?).await;
                serde_json::to_string(&output)
                    .map_err(|e| AgentError::Internal(e.to_string()))?
            }
            _ => return Err(AgentError::ToolNotFound(name.to_string())),
        };
        Ok(vec![Content::text(text)])
    }
}
