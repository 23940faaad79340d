use serde::Serialize;
use tera::{Context, Error as TeraError, Tera};

/// The user message that starts every generation
pub const TASK_TEMPLATE: &str = include_str!("prompts/task.md");

/// Values available to [`TASK_TEMPLATE`]
#[derive(Debug, Clone, Serialize)]
pub struct TaskContext<'a> {
    pub topic: &'a str,
    pub mode_hint: &'a str,
    pub output_dir: &'a str,
}

pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    let rendered = tera.render("inline_template", &context)?;
    Ok(rendered)
}

pub fn render_task(context: &TaskContext<'_>) -> Result<String, TeraError> {
    load_prompt(TASK_TEMPLATE, context)
}
