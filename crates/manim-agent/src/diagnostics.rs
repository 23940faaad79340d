//! Self test for the tool layer.
//!
//! Every tool of a model's convention is called through the same dispatch the agent
//! uses, against probe files in a scratch directory.
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Value};

use crate::models::content::contents_to_text;
use crate::models::tool::ToolCall;
use crate::prompt::system_prompt;
use crate::tools::generic::{
    LINE_INSERT_TOOL, READ_FILE_TOOL, STRING_REPLACE_TOOL, WRITE_FILE_TOOL,
};
use crate::tools::native::TEXT_EDITOR_TOOL;
use crate::tools::shell::{ShellBackend, ShellSession};
use crate::tools::{ToolConvention, ToolSet};

pub const DEFAULT_TEST_MODEL: &str = "openai/gpt-4o";

const WRITE_PROBE: &str = "_test_tools_probe.txt";
const REPLACE_PROBE: &str = "_test_replace_probe.txt";
const INSERT_PROBE: &str = "_test_insert_probe.txt";
const PROBE_TEXT: &str = "hello from test-tools";
const DETAIL_LIMIT: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub ok: bool,
    pub detail: String,
}

impl CheckResult {
    fn new<S: Into<String>>(ok: bool, detail: S) -> Self {
        Self {
            ok,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolReport {
    pub model: String,
    pub all_ok: bool,
    pub results: BTreeMap<String, CheckResult>,
}

/// Exercise every tool the model would get.
///
/// Only a scratch directory that cannot be prepared is an error, failing tools are
/// reported in the results.
pub async fn check_tools(
    model: &str,
    scratch_dir: &Path,
    backend: Arc<dyn ShellBackend>,
) -> Result<ToolReport> {
    tracing::info!(model = %model, "🧪 Testing tools");
    fs::create_dir_all(scratch_dir)
        .with_context(|| format!("Failed to prepare {}", scratch_dir.display()))?;

    let tools = ToolSet::resolve(model, ShellSession::new(backend, scratch_dir));
    let convention = tools.convention();
    let mut results = BTreeMap::new();

    let names = tools.tool_names();
    results.insert(
        "resolveTools".to_string(),
        CheckResult::new(
            names == convention.tool_names(),
            format!("{} tools: {}", convention, names.join(", ")),
        ),
    );

    let prompt = system_prompt(convention);
    let missing: Vec<_> = names.iter().filter(|n| !prompt.contains(*n)).collect();
    results.insert(
        "systemPrompt".to_string(),
        CheckResult::new(
            missing.is_empty(),
            if missing.is_empty() {
                format!("Prompt length: {} chars, mentions every tool", prompt.len())
            } else {
                format!("Prompt does not mention: {:?}", missing)
            },
        ),
    );

    match convention {
        ToolConvention::Native => exercise_native(&tools, scratch_dir, &mut results).await,
        ToolConvention::Generic => exercise_generic(&tools, scratch_dir, &mut results).await,
    }
    results.insert(
        "bash".to_string(),
        check(run(&tools, "bash", json!({"command": "echo hello"})).await, |out| {
            out.contains("hello")
        }),
    );

    for probe in [WRITE_PROBE, REPLACE_PROBE, INSERT_PROBE] {
        let _ = fs::remove_file(scratch_dir.join(probe));
    }

    let all_ok = results.values().all(|r| r.ok);
    if all_ok {
        tracing::info!(model = %model, "🧪 All tool checks passed");
    } else {
        tracing::warn!(model = %model, "🧪 Some tool checks failed");
    }

    Ok(ToolReport {
        model: model.to_string(),
        all_ok,
        results,
    })
}

async fn exercise_generic(
    tools: &ToolSet,
    scratch_dir: &Path,
    results: &mut BTreeMap<String, CheckResult>,
) {
    let write_path = scratch_dir.join(WRITE_PROBE);
    let outcome = run(
        tools,
        WRITE_FILE_TOOL,
        json!({"path": write_path, "content": PROBE_TEXT}),
    )
    .await;
    results.insert(
        WRITE_FILE_TOOL.to_string(),
        check(outcome, |_| file_is(&write_path, PROBE_TEXT)),
    );

    let outcome = run(tools, READ_FILE_TOOL, json!({"path": write_path})).await;
    results.insert(
        READ_FILE_TOOL.to_string(),
        check(outcome, |out| out == PROBE_TEXT),
    );

    let replace_path = scratch_dir.join(REPLACE_PROBE);
    let outcome = match fs::write(&replace_path, "AAA BBB CCC") {
        Ok(()) => {
            run(
                tools,
                STRING_REPLACE_TOOL,
                json!({"path": replace_path, "old_str": "BBB", "new_str": "XXX"}),
            )
            .await
        }
        Err(e) => Err(e.to_string()),
    };
    results.insert(
        STRING_REPLACE_TOOL.to_string(),
        check(outcome, |_| file_is(&replace_path, "AAA XXX CCC")),
    );

    let insert_path = scratch_dir.join(INSERT_PROBE);
    let outcome = match fs::write(&insert_path, "line0\nline1\nline2") {
        Ok(()) => {
            run(
                tools,
                LINE_INSERT_TOOL,
                json!({"path": insert_path, "insert_line": 1, "insert_text": "INSERTED"}),
            )
            .await
        }
        Err(e) => Err(e.to_string()),
    };
    results.insert(
        LINE_INSERT_TOOL.to_string(),
        check(outcome, |_| {
            file_is(&insert_path, "line0\nINSERTED\nline1\nline2")
        }),
    );
}

async fn exercise_native(
    tools: &ToolSet,
    scratch_dir: &Path,
    results: &mut BTreeMap<String, CheckResult>,
) {
    let key = |command: &str| format!("{}.{}", TEXT_EDITOR_TOOL, command);

    let write_path = scratch_dir.join(WRITE_PROBE);
    let outcome = run(
        tools,
        TEXT_EDITOR_TOOL,
        json!({"command": "create", "path": write_path, "file_text": PROBE_TEXT}),
    )
    .await;
    results.insert(
        key("create"),
        check(outcome, |_| file_is(&write_path, PROBE_TEXT)),
    );

    let outcome = run(
        tools,
        TEXT_EDITOR_TOOL,
        json!({"command": "view", "path": write_path}),
    )
    .await;
    results.insert(key("view"), check(outcome, |out| out == PROBE_TEXT));

    let replace_path = scratch_dir.join(REPLACE_PROBE);
    let outcome = match fs::write(&replace_path, "AAA BBB CCC") {
        Ok(()) => {
            run(
                tools,
                TEXT_EDITOR_TOOL,
                json!({"command": "str_replace", "path": replace_path, "old_str": "BBB", "new_str": "XXX"}),
            )
            .await
        }
        Err(e) => Err(e.to_string()),
    };
    results.insert(
        key("str_replace"),
        check(outcome, |_| file_is(&replace_path, "AAA XXX CCC")),
    );

    let insert_path = scratch_dir.join(INSERT_PROBE);
    let outcome = match fs::write(&insert_path, "line0\nline1\nline2") {
        Ok(()) => {
            run(
                tools,
                TEXT_EDITOR_TOOL,
                json!({"command": "insert", "path": insert_path, "insert_line": 1, "insert_text": "INSERTED"}),
            )
            .await
        }
        Err(e) => Err(e.to_string()),
    };
    results.insert(
        key("insert"),
        check(outcome, |_| {
            file_is(&insert_path, "line0\nINSERTED\nline1\nline2")
        }),
    );
}

async fn run(tools: &ToolSet, name: &str, arguments: Value) -> Result<String, String> {
    tools
        .call(&ToolCall::new(name, arguments))
        .await
        .map(|contents| contents_to_text(&contents))
        .map_err(|e| e.to_string())
}

fn check(outcome: Result<String, String>, passed: impl FnOnce(&str) -> bool) -> CheckResult {
    match outcome {
        Ok(output) => {
            let ok = passed(&output);
            CheckResult::new(ok, output.chars().take(DETAIL_LIMIT).collect::<String>())
        }
        Err(e) => CheckResult::new(false, e),
    }
}

fn file_is(path: &Path, expected: &str) -> bool {
    fs::read_to_string(path)
        .map(|content| content == expected)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::shell::HostShell;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_generic_report() -> Result<()> {
        let dir = TempDir::new()?;
        let report = check_tools(DEFAULT_TEST_MODEL, dir.path(), Arc::new(HostShell)).await?;

        assert!(report.all_ok, "{:?}", report.results);
        let keys: Vec<_> = report.results.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "bash",
                "line_insert",
                "read_file",
                "resolveTools",
                "string_replace",
                "systemPrompt",
                "write_file"
            ]
        );
        // probes are cleaned up
        assert_eq!(fs::read_dir(dir.path())?.count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_native_report() -> Result<()> {
        let dir = TempDir::new()?;
        let report =
            check_tools("anthropic/claude-haiku-4.5", dir.path(), Arc::new(HostShell)).await?;

        assert!(report.all_ok, "{:?}", report.results);
        assert!(report
            .results
            .contains_key("str_replace_based_edit_tool.insert"));
        assert!(!report.results.contains_key("read_file"));
        Ok(())
    }

    #[tokio::test]
    async fn test_unusable_scratch_dir() -> Result<()> {
        let dir = TempDir::new()?;
        let blocker = dir.path().join("file");
        fs::write(&blocker, "not a directory")?;

        let result = check_tools(DEFAULT_TEST_MODEL, &blocker.join("scratch"), Arc::new(HostShell)).await;
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn test_report_serialization() {
        let mut results = BTreeMap::new();
        results.insert("bash".to_string(), CheckResult::new(false, "boom"));
        let report = ToolReport {
            model: "openai/gpt-4o".to_string(),
            all_ok: false,
            results,
        };
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "model": "openai/gpt-4o",
                "allOk": false,
                "results": {"bash": {"ok": false, "detail": "boom"}}
            })
        );
    }
}
