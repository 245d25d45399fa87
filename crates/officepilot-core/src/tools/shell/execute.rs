//! powershell tool - single-shot command execution

use serde::Deserialize;
use serde_json::{json, Value};
use std::process::Stdio;
use std::time::Duration;

use crate::error::ToolError;
use crate::tools::filesystem::path_to_display;
use crate::tools::process_utils::{shell_command, shell_name};
use crate::tools::{parse_args, BoxFuture, Tool, ToolExecutionContext, ToolResult};

use super::safety::CommandPolicy;

pub const NAME: &str = "powershell";

#[derive(Deserialize)]
struct ExecuteArgs {
    command: String,
    timeout_ms: Option<u64>,
    cwd: Option<String>,
}

/// Join stdout and a labelled stderr section
pub fn combine_output(stdout: &str, stderr: &str) -> String {
    let stdout = stdout.trim_end();
    let stderr = stderr.trim_end();
    match (stdout.is_empty(), stderr.is_empty()) {
        (true, true) => String::new(),
        (false, true) => stdout.to_string(),
        (true, false) => format!("[stderr]\n{}", stderr),
        (false, false) => format!("{}\n[stderr]\n{}", stdout, stderr),
    }
}

/// Tool for executing a command and waiting for it to finish
pub struct ExecuteCommand {
    policy: CommandPolicy,
    default_timeout_ms: u64,
}

impl ExecuteCommand {
    pub fn new(default_timeout_ms: u64) -> Self {
        Self {
            policy: CommandPolicy::for_foreground(),
            default_timeout_ms,
        }
    }
}

impl Tool for ExecuteCommand {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Run a PowerShell command in the working directory and return its output. \
         Fails if the command exits with a non-zero code or exceeds timeout_ms. \
         Use powershell_background_start for servers, watchers, and other long-running commands."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The command to execute"
                },
                "timeout_ms": {
                    "type": "integer",
                    "description": "Timeout in milliseconds (default 30000)"
                },
                "cwd": {
                    "type": "string",
                    "description": "Directory to run in (default: working directory)"
                }
            },
            "required": ["command"]
        })
    }

    fn execute(
        &self,
        params: Value,
        ctx: ToolExecutionContext,
    ) -> BoxFuture<'_, Result<ToolResult, ToolError>> {
        Box::pin(async move {
            let args: ExecuteArgs = parse_args(params)?;

            self.policy
                .check(&args.command)
                .map_err(ToolError::PermissionDenied)?;

            let cwd = match &args.cwd {
                Some(dir) => ctx.session.resolve_path(dir),
                None => ctx.session.working_dir(),
            };
            if !cwd.is_dir() {
                return Err(ToolError::ResourceNotFound(format!(
                    "Directory not found: {}",
                    path_to_display(&cwd)
                )));
            }

            let timeout_ms = args.timeout_ms.unwrap_or(self.default_timeout_ms).max(1);
            tracing::debug!(shell = shell_name(), command = %args.command, cwd = %cwd.display(), timeout_ms, "Running command");

            let mut cmd = shell_command(&args.command);
            cmd.current_dir(&cwd)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);

            // Dropping the output future on timeout kills the child
            let output = match tokio::time::timeout(Duration::from_millis(timeout_ms), cmd.output()).await {
                Ok(result) => result?,
                Err(_) => {
                    tracing::warn!(command = %args.command, timeout_ms, "Command timed out");
                    return Ok(ToolResult::failure(format!(
                        "Command timed out after {} ms and was terminated",
                        timeout_ms
                    ))
                    .with_metadata("timed_out", true));
                }
            };

            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            let combined = combine_output(&stdout, &stderr);
            let exit_code = output.status.code();

            if output.status.success() {
                let text = if combined.is_empty() {
                    "(command completed with no output)".to_string()
                } else {
                    combined
                };
                Ok(ToolResult::success(text).with_metadata("exit_code", 0))
            } else {
                let code = exit_code.map(|c| c.to_string()).unwrap_or_else(|| "none (terminated by signal)".into());
                let mut message = format!("Command exited with code {}", code);
                if !combined.is_empty() {
                    message.push('\n');
                    message.push_str(&combined);
                }
                Ok(ToolResult::failure(message).with_metadata("exit_code", json!(exit_code)))
            }
        })
    }
}
