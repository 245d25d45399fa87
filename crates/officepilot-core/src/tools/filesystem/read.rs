//! Read file tool

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ToolError;
use crate::tools::{parse_args, BoxFuture, Tool, ToolExecutionContext, ToolResult};

use super::path_to_display;

const DEFAULT_LIMIT: usize = 2000;
const MAX_LINE_CHARS: usize = 2000;

#[derive(Deserialize)]
struct ReadArgs {
    path: String,
    /// 1-based line to start from
    offset: Option<usize>,
    limit: Option<usize>,
}

/// Tool for reading text files with numbered lines
pub struct ReadFile;

impl Tool for ReadFile {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read a text file. Lines are returned with 1-based line numbers followed by a tab. \
         Use offset and limit to page through large files. \
         Office documents (.docx, .xlsx, .pptx) are binary: open them with the Office tools instead."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the file (absolute, or relative to the working directory)"
                },
                "offset": {
                    "type": "integer",
                    "description": "1-based line number to start reading from"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of lines to return (default 2000)"
                }
            },
            "required": ["path"]
        })
    }

    fn execute(
        &self,
        params: Value,
        ctx: ToolExecutionContext,
    ) -> BoxFuture<'_, Result<ToolResult, ToolError>> {
        Box::pin(async move {
            let args: ReadArgs = parse_args(params)?;
            let path = ctx.session.resolve_path(&args.path);

            if !path.is_file() {
                return Err(ToolError::ResourceNotFound(format!(
                    "File not found: {}",
                    path_to_display(&path)
                )));
            }

            let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
                ToolError::ExecutionFailed(format!(
                    "Failed to read {} as text: {}",
                    path_to_display(&path),
                    e
                ))
            })?;

            let total_lines = content.lines().count();
            let start = args.offset.unwrap_or(1).max(1);
            let limit = args.limit.unwrap_or(DEFAULT_LIMIT);

            let mut out = String::new();
            for (idx, line) in content.lines().enumerate().skip(start - 1).take(limit) {
                let line = if line.len() > MAX_LINE_CHARS {
                    crate::formatting::truncate_str(line, MAX_LINE_CHARS)
                } else {
                    line.to_string()
                };
                out.push_str(&format!("{:>6}\t{}\n", idx + 1, line));
            }

            let shown_end = (start - 1 + limit).min(total_lines);
            if shown_end < total_lines {
                out.push_str(&format!(
                    "\n[Showing lines {}-{} of {}. Use offset to read more.]",
                    start, shown_end, total_lines
                ));
            } else if out.is_empty() {
                out = if total_lines == 0 {
                    "(empty file)".to_string()
                } else {
                    format!("(offset {} is past the end: file has {} lines)", start, total_lines)
                };
            }

            Ok(ToolResult::success(out)
                .with_metadata("path", path_to_display(&path))
                .with_metadata("total_lines", total_lines))
        })
    }
}
