//! Background command tracking
//!
//! Each task owns a child process whose stdout and stderr are drained line
//! by line into capped in-memory buffers. A watcher task waits for the exit
//! (or a stop signal) and records the exit code at once; the readers then get
//! a short grace period to flush whatever is left in the pipes.
//!
//! Finished tasks stay in the registry for the lifetime of the session so
//! their output and exit code remain readable. `stop_all` is called on exit.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::oneshot;

use crate::config::ShellSettings;
use crate::error::ToolError;
use crate::formatting::truncate_tail;
use crate::tools::filesystem::path_to_display;
use crate::tools::process_utils::shell_command;
use crate::tools::{parse_args, BoxFuture, Tool, ToolExecutionContext, ToolResult};

use super::execute::combine_output;
use super::safety::CommandPolicy;

/// How long the watcher waits for output readers after the process exits
const READER_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Default)]
struct TaskState {
    stdout: String,
    stderr: String,
    exit_code: Option<i32>,
    is_running: bool,
}

/// A tracked background process
pub struct BackgroundTask {
    pub id: String,
    pub command: String,
    pub cwd: PathBuf,
    pub started_at: DateTime<Utc>,
    state: Mutex<TaskState>,
    kill_tx: Mutex<Option<oneshot::Sender<()>>>,
}

/// Point-in-time view of a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub id: String,
    pub command: String,
    pub is_running: bool,
    pub exit_code: Option<i32>,
    pub output: String,
}

/// Row of `list()`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSummary {
    pub id: String,
    pub command: String,
    pub cwd: String,
    pub is_running: bool,
    pub exit_code: Option<i32>,
    pub started_at: DateTime<Utc>,
}

/// Result of a stop request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    AlreadyCompleted { exit_code: Option<i32> },
}

/// Append to a buffer, dropping the oldest bytes beyond `cap`
fn push_capped(buf: &mut String, text: &str, cap: usize) {
    buf.push_str(text);
    if buf.len() > cap {
        let mut cut = buf.len() - cap;
        while !buf.is_char_boundary(cut) {
            cut += 1;
        }
        buf.drain(..cut);
    }
}

fn generate_task_id() -> String {
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("bg-{}-{}", Utc::now().timestamp_millis(), &random[..8])
}

/// Registry of background processes for one session
///
/// Tasks are never evicted; a finished task keeps its output until the
/// manager is dropped.
pub struct BackgroundTaskManager {
    tasks: RwLock<HashMap<String, Arc<BackgroundTask>>>,
    policy: CommandPolicy,
    buffer_bytes: usize,
    max_output_chars: usize,
}

impl Default for BackgroundTaskManager {
    fn default() -> Self {
        Self::new(&ShellSettings::default())
    }
}

impl BackgroundTaskManager {
    pub fn new(settings: &ShellSettings) -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            policy: CommandPolicy::for_background(),
            buffer_bytes: settings.background_buffer_bytes.max(1024),
            max_output_chars: settings.background_max_output_chars.max(256),
        }
    }

    fn get(&self, task_id: &str) -> Result<Arc<BackgroundTask>, ToolError> {
        self.tasks
            .read()
            .get(task_id)
            .cloned()
            .ok_or_else(|| ToolError::ResourceNotFound(format!("Background task not found: {}", task_id)))
    }

    /// Spawn `command` in `cwd` and start tracking it
    pub fn start(&self, command: &str, cwd: &Path) -> Result<String, ToolError> {
        self.policy.check(command).map_err(ToolError::PermissionDenied)?;

        if !cwd.is_dir() {
            return Err(ToolError::ResourceNotFound(format!(
                "Directory not found: {}",
                path_to_display(cwd)
            )));
        }

        let mut child = shell_command(command)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ToolError::ExecutionFailed(format!("Failed to start command: {}", e)))?;

        let id = generate_task_id();
        let (kill_tx, kill_rx) = oneshot::channel();
        let task = Arc::new(BackgroundTask {
            id: id.clone(),
            command: command.to_string(),
            cwd: cwd.to_path_buf(),
            started_at: Utc::now(),
            state: Mutex::new(TaskState {
                is_running: true,
                ..Default::default()
            }),
            kill_tx: Mutex::new(Some(kill_tx)),
        });

        let cap = self.buffer_bytes;
        let stdout_reader = child
            .stdout
            .take()
            .map(|out| tokio::spawn(drain(out, Arc::clone(&task), cap, Stream::Stdout)));
        let stderr_reader = child
            .stderr
            .take()
            .map(|err| tokio::spawn(drain(err, Arc::clone(&task), cap, Stream::Stderr)));

        let watched = Arc::clone(&task);
        tokio::spawn(async move {
            let exit_code = tokio::select! {
                status = child.wait() => status.ok().and_then(|s| s.code()),
                _ = kill_rx => {
                    let _ = child.kill().await;
                    None
                }
            };

            {
                let mut state = watched.state.lock();
                state.exit_code = exit_code;
                state.is_running = false;
            }
            tracing::debug!(task_id = %watched.id, ?exit_code, "Background task finished");

            // A grandchild holding the pipe open must not stall the watcher
            let _ = tokio::time::timeout(READER_GRACE, async {
                if let Some(handle) = stdout_reader {
                    let _ = handle.await;
                }
                if let Some(handle) = stderr_reader {
                    let _ = handle.await;
                }
            })
            .await;
        });

        tracing::info!(task_id = %id, command, cwd = %cwd.display(), "Background task started");
        self.tasks.write().insert(id.clone(), task);
        Ok(id)
    }

    /// Non-destructive read of the task's state and output
    pub fn read(&self, task_id: &str) -> Result<TaskSnapshot, ToolError> {
        let task = self.get(task_id)?;
        let state = task.state.lock();
        let output = truncate_tail(&combine_output(&state.stdout, &state.stderr), self.max_output_chars);

        Ok(TaskSnapshot {
            id: task.id.clone(),
            command: task.command.clone(),
            is_running: state.is_running,
            exit_code: state.exit_code,
            output,
        })
    }

    /// Signal the process to terminate and mark it not running
    pub fn stop(&self, task_id: &str) -> Result<StopOutcome, ToolError> {
        let task = self.get(task_id)?;
        let mut state = task.state.lock();

        if !state.is_running {
            return Ok(StopOutcome::AlreadyCompleted {
                exit_code: state.exit_code,
            });
        }

        if let Some(tx) = task.kill_tx.lock().take() {
            let _ = tx.send(());
        }
        state.is_running = false;
        tracing::info!(task_id, "Background task stopped");
        Ok(StopOutcome::Stopped)
    }

    /// All tracked tasks, oldest first
    pub fn list(&self) -> Vec<TaskSummary> {
        let mut rows: Vec<TaskSummary> = self
            .tasks
            .read()
            .values()
            .map(|task| {
                let state = task.state.lock();
                TaskSummary {
                    id: task.id.clone(),
                    command: task.command.clone(),
                    cwd: path_to_display(&task.cwd),
                    is_running: state.is_running,
                    exit_code: state.exit_code,
                    started_at: task.started_at,
                }
            })
            .collect();
        rows.sort_by(|a, b| a.started_at.cmp(&b.started_at).then_with(|| a.id.cmp(&b.id)));
        rows
    }

    /// Stop every running task; returns how many were signalled
    pub fn stop_all(&self) -> usize {
        let ids: Vec<String> = self.tasks.read().keys().cloned().collect();
        ids.iter()
            .filter(|id| matches!(self.stop(id), Ok(StopOutcome::Stopped)))
            .count()
    }
}

#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

async fn drain<R>(reader: R, task: Arc<BackgroundTask>, cap: usize, stream: Stream)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&line);
                let mut state = task.state.lock();
                let buf = match stream {
                    Stream::Stdout => &mut state.stdout,
                    Stream::Stderr => &mut state.stderr,
                };
                push_capped(buf, &text, cap);
            }
        }
    }
}

// ============================================================================
// Tools
// ============================================================================

#[derive(Deserialize)]
struct StartArgs {
    command: String,
    cwd: Option<String>,
}

#[derive(Deserialize)]
struct TaskIdArgs {
    task_id: String,
}

fn task_id_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "task_id": {
                "type": "string",
                "description": "Id returned by powershell_background_start"
            }
        },
        "required": ["task_id"]
    })
}

pub struct BackgroundStart {
    manager: Arc<BackgroundTaskManager>,
}

impl BackgroundStart {
    pub fn new(manager: Arc<BackgroundTaskManager>) -> Self {
        Self { manager }
    }
}

impl Tool for BackgroundStart {
    fn name(&self) -> &str {
        "powershell_background_start"
    }

    fn description(&self) -> &str {
        "Start a long-running command in the background and return its task id immediately. \
         Poll it with powershell_background_read and end it with powershell_background_stop."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The command to run"
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
            let args: StartArgs = parse_args(params)?;
            let cwd = match &args.cwd {
                Some(dir) => ctx.session.resolve_path(dir),
                None => ctx.session.working_dir(),
            };

            let task_id = self.manager.start(&args.command, &cwd)?;
            Ok(ToolResult::success(format!("Started background task {}", task_id))
                .with_metadata("task_id", task_id))
        })
    }
}

pub struct BackgroundRead {
    manager: Arc<BackgroundTaskManager>,
}

impl BackgroundRead {
    pub fn new(manager: Arc<BackgroundTaskManager>) -> Self {
        Self { manager }
    }
}

impl Tool for BackgroundRead {
    fn name(&self) -> &str {
        "powershell_background_read"
    }

    fn description(&self) -> &str {
        "Read the status and buffered output of a background task without consuming it."
    }

    fn parameters_schema(&self) -> Value {
        task_id_schema()
    }

    fn execute(
        &self,
        params: Value,
        _ctx: ToolExecutionContext,
    ) -> BoxFuture<'_, Result<ToolResult, ToolError>> {
        Box::pin(async move {
            let args: TaskIdArgs = parse_args(params)?;
            let snapshot = self.manager.read(&args.task_id)?;

            let status = if snapshot.is_running {
                "running".to_string()
            } else {
                match snapshot.exit_code {
                    Some(code) => format!("exited with code {}", code),
                    None => "stopped".to_string(),
                }
            };
            let body = if snapshot.output.is_empty() {
                "(no output yet)"
            } else {
                snapshot.output.as_str()
            };

            Ok(ToolResult::success(format!(
                "Task {}: {}\n{}",
                snapshot.id, status, body
            ))
            .with_metadata("is_running", snapshot.is_running)
            .with_metadata("exit_code", json!(snapshot.exit_code)))
        })
    }
}

pub struct BackgroundStop {
    manager: Arc<BackgroundTaskManager>,
}

impl BackgroundStop {
    pub fn new(manager: Arc<BackgroundTaskManager>) -> Self {
        Self { manager }
    }
}

impl Tool for BackgroundStop {
    fn name(&self) -> &str {
        "powershell_background_stop"
    }

    fn description(&self) -> &str {
        "Terminate a background task."
    }

    fn parameters_schema(&self) -> Value {
        task_id_schema()
    }

    fn execute(
        &self,
        params: Value,
        _ctx: ToolExecutionContext,
    ) -> BoxFuture<'_, Result<ToolResult, ToolError>> {
        Box::pin(async move {
            let args: TaskIdArgs = parse_args(params)?;
            let message = match self.manager.stop(&args.task_id)? {
                StopOutcome::Stopped => format!("Task {} stopped", args.task_id),
                StopOutcome::AlreadyCompleted { exit_code } => format!(
                    "Task {} already completed (exit code {})",
                    args.task_id,
                    exit_code.map(|c| c.to_string()).unwrap_or_else(|| "none".into())
                ),
            };
            Ok(ToolResult::success(message))
        })
    }
}

pub struct BackgroundList {
    manager: Arc<BackgroundTaskManager>,
}

impl BackgroundList {
    pub fn new(manager: Arc<BackgroundTaskManager>) -> Self {
        Self { manager }
    }
}

impl Tool for BackgroundList {
    fn name(&self) -> &str {
        "powershell_background_list"
    }

    fn description(&self) -> &str {
        "List background tasks started in this session."
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    fn execute(
        &self,
        _params: Value,
        _ctx: ToolExecutionContext,
    ) -> BoxFuture<'_, Result<ToolResult, ToolError>> {
        Box::pin(async move {
            let rows = self.manager.list();
            if rows.is_empty() {
                return Ok(ToolResult::success("No background tasks"));
            }

            let lines: Vec<String> = rows
                .iter()
                .map(|r| {
                    let status = if r.is_running { "running" } else { "finished" };
                    format!(
                        "{} [{}] started {} in {}: {}",
                        r.id,
                        status,
                        r.started_at.format("%H:%M:%S"),
                        r.cwd,
                        r.command
                    )
                })
                .collect();

            Ok(ToolResult::success(lines.join("\n")).with_metadata("count", rows.len()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capped_buffer_drops_head() {
        let mut buf = String::new();
        push_capped(&mut buf, "0123456789", 8);
        assert_eq!(buf, "23456789");
        push_capped(&mut buf, "é", 8);
        assert!(buf.ends_with('é'));
        assert!(buf.len() <= 8);
    }

    #[test]
    fn task_ids_have_expected_shape() {
        let id = generate_task_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "bg");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 8);
    }

    #[test]
    fn unknown_task_is_not_found() {
        let manager = BackgroundTaskManager::default();
        assert!(matches!(manager.read("bg-1-x"), Err(ToolError::ResourceNotFound(_))));
        assert!(matches!(manager.stop("bg-1-x"), Err(ToolError::ResourceNotFound(_))));
    }
}
