//! List directory tool

use serde::Deserialize;
use serde_json::{json, Value};
use walkdir::WalkDir;

use crate::error::ToolError;
use crate::tools::{parse_args, BoxFuture, Tool, ToolExecutionContext, ToolResult};

use super::path_utils::{is_hidden, path_to_display, relative_display};

const MAX_ENTRIES: usize = 500;
const MAX_DEPTH: usize = 8;

#[derive(Deserialize)]
struct ListArgs {
    path: Option<String>,
    #[serde(default)]
    recursive: bool,
    #[serde(default)]
    include_hidden: bool,
}

pub struct ListFiles;

impl Tool for ListFiles {
    fn name(&self) -> &str {
        "list_files"
    }

    fn description(&self) -> &str {
        "List the entries of a directory. Directories end with '/'. \
         Set recursive to walk subdirectories. Hidden entries are skipped unless include_hidden is set."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Directory to list (default: working directory)"
                },
                "recursive": {
                    "type": "boolean",
                    "default": false
                },
                "include_hidden": {
                    "type": "boolean",
                    "default": false
                }
            }
        })
    }

    fn execute(
        &self,
        params: Value,
        ctx: ToolExecutionContext,
    ) -> BoxFuture<'_, Result<ToolResult, ToolError>> {
        Box::pin(async move {
            let args: ListArgs = parse_args(params)?;
            let root = match &args.path {
                Some(p) => ctx.session.resolve_path(p),
                None => ctx.session.working_dir(),
            };

            if !root.is_dir() {
                return Err(ToolError::ResourceNotFound(format!(
                    "Directory not found: {}",
                    path_to_display(&root)
                )));
            }

            let max_depth = if args.recursive { MAX_DEPTH } else { 1 };
            let include_hidden = args.include_hidden;
            let walk_root = root.clone();

            // walkdir is blocking
            let (entries, truncated) = tokio::task::spawn_blocking(move || {
                let mut entries = Vec::new();
                let mut truncated = false;
                let walker = WalkDir::new(&walk_root)
                    .min_depth(1)
                    .max_depth(max_depth)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_entry(|e| {
                        include_hidden
                            || e.depth() == 0
                            || !is_hidden(&e.file_name().to_string_lossy())
                    });

                for entry in walker.flatten() {
                    if entries.len() >= MAX_ENTRIES {
                        truncated = true;
                        break;
                    }
                    let mut display = relative_display(entry.path(), &walk_root);
                    if entry.file_type().is_dir() {
                        display.push('/');
                    }
                    entries.push(display);
                }
                (entries, truncated)
            })
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("Directory walk failed: {}", e)))?;

            let mut out = if entries.is_empty() {
                format!("{} is empty", path_to_display(&root))
            } else {
                entries.join("\n")
            };
            if truncated {
                out.push_str(&format!("\n\n[Listing truncated at {} entries]", MAX_ENTRIES));
            }

            Ok(ToolResult::success(out).with_metadata("count", entries.len()))
        })
    }
}
