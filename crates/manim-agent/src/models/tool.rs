use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool type the provider defines and documents itself, e.g. anthropic's text editor.
/// The provider only needs the versioned type and its options; the schema is fixed upstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuiltinTool {
    /// The versioned provider tool type, e.g. `bash_20250124`
    pub kind: String,
    /// Extra options sent alongside the type
    pub options: Value,
}

/// A tool that can be used by a model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    /// The name of the tool
    pub name: String,
    /// A description of what the tool does
    pub description: String,
    /// A JSON Schema object defining the expected parameters for the tool
    pub input_schema: Value,
    /// Set when the provider supplies the tool definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builtin: Option<BuiltinTool>,
}

impl Tool {
    /// Create a new tool with the given name and description
    pub fn new<N, D>(name: N, description: D, input_schema: Value) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Tool {
            name: name.into(),
            description: description.into(),
            input_schema,
            builtin: None,
        }
    }

    /// Mark this tool as a provider defined tool of the given type
    pub fn with_builtin<K: Into<String>>(mut self, kind: K, options: Value) -> Self {
        self.builtin = Some(BuiltinTool {
            kind: kind.into(),
            options,
        });
        self
    }
}

/// A tool call request that the tool set can execute
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// The name of the tool to execute
    pub name: String,
    /// The parameters for the execution
    pub arguments: Value,
}

impl ToolCall {
    /// Create a new ToolCall with the given name and arguments
    pub fn new<S: Into<String>>(name: S, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}
