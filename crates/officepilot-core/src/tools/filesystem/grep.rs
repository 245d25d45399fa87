//! Content search tool built on regex

use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use walkdir::WalkDir;

use crate::error::ToolError;
use crate::tools::{parse_args, BoxFuture, Tool, ToolExecutionContext, ToolResult};

use super::glob::compile_glob;
use super::path_utils::{is_hidden, path_to_display, relative_display};

const DEFAULT_MAX_RESULTS: usize = 200;
const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Deserialize)]
struct SearchArgs {
    pattern: String,
    path: Option<String>,
    glob: Option<String>,
    #[serde(default)]
    case_insensitive: bool,
    max_results: Option<usize>,
}

fn search_file(path: &Path, base: &Path, regex: &Regex, limit: usize, out: &mut Vec<String>) {
    let Ok(meta) = std::fs::metadata(path) else {
        return;
    };
    if meta.len() > MAX_FILE_BYTES {
        return;
    }
    // Binary files fail UTF-8 decoding and are skipped
    let Ok(content) = std::fs::read_to_string(path) else {
        return;
    };

    let display = relative_display(path, base);
    for (idx, line) in content.lines().enumerate() {
        if out.len() >= limit {
            return;
        }
        if regex.is_match(line) {
            out.push(format!(
                "{}:{}: {}",
                display,
                idx + 1,
                crate::formatting::truncate_str(line.trim_end(), 300)
            ));
        }
    }
}

/// Tool for searching file contents with regex support
pub struct SearchContent;

impl Tool for SearchContent {
    fn name(&self) -> &str {
        "search_content"
    }

    fn description(&self) -> &str {
        "Search text files for a regular expression. Returns matches as 'file:line: text'. \
         Narrow the search with path and glob (e.g. \"*.csv\")."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "The regular expression pattern to search for"
                },
                "path": {
                    "type": "string",
                    "description": "File or directory to search in (default: working directory)"
                },
                "glob": {
                    "type": "string",
                    "description": "Glob pattern to filter files (e.g. '*.txt')"
                },
                "case_insensitive": {
                    "type": "boolean",
                    "default": false
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum matching lines to return (default 200)"
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
            let args: SearchArgs = parse_args(params)?;

            let regex = RegexBuilder::new(&args.pattern)
                .case_insensitive(args.case_insensitive)
                .build()
                .map_err(|e| ToolError::InvalidParams(format!("Invalid regex: {}", e)))?;
            let file_filter = args.glob.as_deref().map(compile_glob).transpose()?;

            let target = match &args.path {
                Some(p) => ctx.session.resolve_path(p),
                None => ctx.session.working_dir(),
            };
            if !target.exists() {
                return Err(ToolError::ResourceNotFound(format!(
                    "Path not found: {}",
                    path_to_display(&target)
                )));
            }

            let limit = args.max_results.unwrap_or(DEFAULT_MAX_RESULTS).max(1);
            let base = if target.is_dir() {
                target.clone()
            } else {
                target.parent().map(Path::to_path_buf).unwrap_or_default()
            };

            let matches = tokio::task::spawn_blocking(move || {
                let mut matches = Vec::new();
                let walker = WalkDir::new(&target)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_entry(|e| e.depth() == 0 || !is_hidden(&e.file_name().to_string_lossy()));

                for entry in walker.flatten() {
                    if matches.len() >= limit {
                        break;
                    }
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    if let Some(filter) = &file_filter {
                        let rel = relative_display(entry.path(), &base);
                        if !filter.is_match(&rel) {
                            continue;
                        }
                    }
                    search_file(entry.path(), &base, &regex, limit, &mut matches);
                }
                matches
            })
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("Search failed: {}", e)))?;

            let count = matches.len();
            let mut out = if matches.is_empty() {
                format!("No matches for '{}'", args.pattern)
            } else {
                matches.join("\n")
            };
            if count >= limit {
                out.push_str(&format!("\n\n[Stopped after {} matches]", limit));
            }

            Ok(ToolResult::success(out).with_metadata("count", count))
        })
    }
}
