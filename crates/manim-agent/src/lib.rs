pub mod agent;
pub mod diagnostics;
pub mod errors;
pub mod generation;
pub mod models;
pub mod prompt;
pub mod prompt_template;
pub mod providers;
pub mod tools;
