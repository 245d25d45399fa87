//! Create file tool

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ToolError;
use crate::events::FileEvent;
use crate::tools::{parse_args, BoxFuture, Tool, ToolExecutionContext, ToolResult};

use super::path_to_display;

#[derive(Deserialize)]
struct CreateArgs {
    path: String,
    content: String,
    #[serde(default)]
    overwrite: bool,
}

/// Tool for writing a new text file
pub struct CreateFile;

impl Tool for CreateFile {
    fn name(&self) -> &str {
        "create_file"
    }

    fn description(&self) -> &str {
        "Create a text file with the given content. Parent directories are created as needed. \
         Fails if the file exists unless overwrite is true. Prefer edit_file for changing existing files."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path of the file to create"
                },
                "content": {
                    "type": "string",
                    "description": "Full file content"
                },
                "overwrite": {
                    "type": "boolean",
                    "description": "Replace the file if it already exists (default false)",
                    "default": false
                }
            },
            "required": ["path", "content"]
        })
    }

    fn execute(
        &self,
        params: Value,
        ctx: ToolExecutionContext,
    ) -> BoxFuture<'_, Result<ToolResult, ToolError>> {
        Box::pin(async move {
            let args: CreateArgs = parse_args(params)?;
            let path = ctx.session.resolve_path(&args.path);

            if path.is_dir() {
                return Err(ToolError::InvalidParams(format!(
                    "{} is a directory",
                    path_to_display(&path)
                )));
            }

            let previous = if path.exists() {
                if !args.overwrite {
                    return Err(ToolError::Precondition(format!(
                        "{} already exists. Set overwrite=true to replace it, or use edit_file.",
                        path_to_display(&path)
                    )));
                }
                tokio::fs::read_to_string(&path).await.ok()
            } else {
                None
            };

            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, &args.content).await?;

            tracing::debug!(path = %path.display(), bytes = args.content.len(), "File written");

            let event = match previous {
                Some(old_content) => FileEvent::Edited {
                    path: path.clone(),
                    old_content,
                    new_content: args.content.clone(),
                },
                None => FileEvent::Created {
                    path: path.clone(),
                    content: args.content.clone(),
                },
            };
            ctx.session.emit_file_event(event);

            Ok(ToolResult::success(format!(
                "Wrote {} bytes ({} lines) to {}",
                args.content.len(),
                args.content.lines().count(),
                path_to_display(&path)
            ))
            .with_metadata("path", path_to_display(&path)))
        })
    }
}
