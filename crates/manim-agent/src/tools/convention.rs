use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Models behind this prefix get the provider's own tool definitions
pub const NATIVE_PREFIX: &str = "anthropic/";

/// The two shapes of tool definitions a model can be offered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ToolConvention {
    /// Provider defined text editor and bash tools
    Native,
    /// Our own function tools, one per file operation
    Generic,
}

impl ToolConvention {
    pub fn for_model(model: &str) -> Self {
        if model.starts_with(NATIVE_PREFIX) {
            ToolConvention::Native
        } else {
            ToolConvention::Generic
        }
    }

    pub fn tool_names(&self) -> &'static [&'static str] {
        match self {
            ToolConvention::Native => &["str_replace_based_edit_tool", "bash"],
            ToolConvention::Generic => &[
                "read_file",
                "write_file",
                "string_replace",
                "line_insert",
                "bash",
            ],
        }
    }
}
