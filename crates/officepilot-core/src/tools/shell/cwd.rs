//! Working directory tools

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ToolError;
use crate::tools::filesystem::{canonical_or_normalized, path_to_display};
use crate::tools::{parse_args, BoxFuture, Tool, ToolExecutionContext, ToolResult};

#[derive(Deserialize)]
struct SetArgs {
    path: String,
}

pub struct SetWorkingDirectory;

impl Tool for SetWorkingDirectory {
    fn name(&self) -> &str {
        "set_working_directory"
    }

    fn description(&self) -> &str {
        "Change the working directory used by the file and shell tools for the rest of the session."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Directory to switch to (absolute, or relative to the current one)"
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
            let args: SetArgs = parse_args(params)?;
            let target = canonical_or_normalized(&ctx.session.resolve_path(&args.path));

            if !target.is_dir() {
                return Err(ToolError::ResourceNotFound(format!(
                    "Directory not found: {}",
                    path_to_display(&target)
                )));
            }

            ctx.session.set_working_dir(target.clone());
            tracing::debug!(session = %ctx.session.session_id, cwd = %target.display(), "Working directory changed");

            Ok(ToolResult::success(format!(
                "Working directory is now {}",
                path_to_display(&target)
            )))
        })
    }
}

pub struct GetWorkingDirectory;

impl Tool for GetWorkingDirectory {
    fn name(&self) -> &str {
        "get_working_directory"
    }

    fn description(&self) -> &str {
        "Return the current working directory."
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    fn execute(
        &self,
        _params: Value,
        ctx: ToolExecutionContext,
    ) -> BoxFuture<'_, Result<ToolResult, ToolError>> {
        Box::pin(async move {
            Ok(ToolResult::success(path_to_display(&ctx.session.working_dir())))
        })
    }
}
