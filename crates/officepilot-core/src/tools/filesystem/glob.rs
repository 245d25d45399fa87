//! Glob file pattern matching tool

use globset::{GlobBuilder, GlobMatcher};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

use crate::error::ToolError;
use crate::tools::{parse_args, BoxFuture, Tool, ToolExecutionContext, ToolResult};

use super::path_utils::{is_hidden, path_to_display, relative_display};

const LIMIT: usize = 100;

#[derive(Deserialize)]
struct FindArgs {
    pattern: String,
    path: Option<String>,
}

/// Compile a glob; patterns without a separator match file names at any depth
pub fn compile_glob(pattern: &str) -> Result<GlobMatcher, ToolError> {
    let pattern = if pattern.contains('/') || pattern.starts_with("**") {
        pattern.to_string()
    } else {
        format!("**/{}", pattern)
    };

    GlobBuilder::new(&pattern)
        .case_insensitive(cfg!(windows))
        .literal_separator(true)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|e| ToolError::InvalidParams(format!("Invalid glob pattern: {}", e)))
}

fn collect_matches(base: &Path, matcher: &GlobMatcher) -> Vec<(PathBuf, SystemTime)> {
    WalkDir::new(base)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(&e.file_name().to_string_lossy()))
        .flatten()
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .strip_prefix(base)
                .map(|rel| matcher.is_match(path_to_display(rel)))
                .unwrap_or(false)
        })
        .map(|e| {
            let mtime = e
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (e.into_path(), mtime)
        })
        .collect()
}

/// Tool for finding files by glob pattern
pub struct FindFiles;

impl Tool for FindFiles {
    fn name(&self) -> &str {
        "find_files"
    }

    fn description(&self) -> &str {
        "Find files by glob pattern (e.g. \"*.xlsx\", \"reports/**/*.docx\"). \
         Results are newest first, capped at 100."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "The glob pattern to match files against"
                },
                "path": {
                    "type": "string",
                    "description": "Directory to search in (default: working directory)"
                }
            },
            "required": ["pattern"]
        })
    }

    fn execute(
        &self,
        params: Value,
        ctx: ToolExecutionContext,
    ) -> BoxFuture<'_, Result<ToolResult, ToolError>> {
        Box::pin(async move {
            let args: FindArgs = parse_args(params)?;
            let matcher = compile_glob(&args.pattern)?;
            let base = match &args.path {
                Some(p) => ctx.session.resolve_path(p),
                None => ctx.session.working_dir(),
            };

            if !base.is_dir() {
                return Err(ToolError::ResourceNotFound(format!(
                    "Directory not found: {}",
                    path_to_display(&base)
                )));
            }

            let walk_base = base.clone();
            let mut entries = tokio::task::spawn_blocking(move || collect_matches(&walk_base, &matcher))
                .await
                .map_err(|e| ToolError::ExecutionFailed(format!("File search failed: {}", e)))?;

            entries.sort_by(|a, b| b.1.cmp(&a.1));
            let total = entries.len();

            let files: Vec<String> = entries
                .iter()
                .take(LIMIT)
                .map(|(path, _)| relative_display(path, &base))
                .collect();

            let mut out = if files.is_empty() {
                format!("No files matching '{}'", args.pattern)
            } else {
                files.join("\n")
            };
            if total > LIMIT {
                out.push_str(&format!("\n\n[Showing {} of {} matches]", LIMIT, total));
            }

            Ok(ToolResult::success(out).with_metadata("count", total))
        })
    }
}
