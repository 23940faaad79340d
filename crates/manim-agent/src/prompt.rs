//! System prompts, one per tool convention.
//!
//! The prompts name tools verbatim, so a prompt must only ever be paired with the
//! tool set of the same convention.
use crate::tools::ToolConvention;

const NATIVE_SYSTEM_PROMPT: &str = include_str!("prompts/native.md");
const GENERIC_SYSTEM_PROMPT: &str = include_str!("prompts/generic.md");

pub fn system_prompt(convention: ToolConvention) -> &'static str {
    match convention {
        ToolConvention::Native => NATIVE_SYSTEM_PROMPT,
        ToolConvention::Generic => GENERIC_SYSTEM_PROMPT,
    }
}

pub fn system_prompt_for_model(model: &str) -> &'static str {
    system_prompt(ToolConvention::for_model(model))
}
