//! write_todos tool - the agent's plan for the current session

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::ToolError;
use crate::tools::{parse_args, BoxFuture, Tool, ToolExecutionContext, ToolResult};

pub const NAME: &str = "write_todos";

/// Status of a todo item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl TodoStatus {
    /// Completed and failed items no longer block `final_response`
    pub fn is_terminal(self) -> bool {
        matches!(self, TodoStatus::Completed | TodoStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TodoStatus::Pending => "pending",
            TodoStatus::InProgress => "in_progress",
            TodoStatus::Completed => "completed",
            TodoStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A todo item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoItem {
    pub id: String,
    pub title: String,
    pub status: TodoStatus,
}

impl TodoItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>, status: TodoStatus) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status,
        }
    }
}

/// Shared todo list state
pub type TodoList = Arc<RwLock<Vec<TodoItem>>>;

#[derive(Deserialize)]
struct WriteTodosArgs {
    todos: Vec<RawTodo>,
}

// Status stays a string here so an unknown value gets a readable error
#[derive(Deserialize)]
struct RawTodo {
    id: String,
    title: String,
    status: String,
}

fn parse_status(raw: &str) -> Option<TodoStatus> {
    match raw {
        "pending" => Some(TodoStatus::Pending),
        "in_progress" => Some(TodoStatus::InProgress),
        "completed" => Some(TodoStatus::Completed),
        "failed" => Some(TodoStatus::Failed),
        _ => None,
    }
}

/// Tool replacing the session's TODO list
pub struct WriteTodos;

impl Tool for WriteTodos {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Replace the TODO list for the current task. Send the complete list every time.\n\n\
         Use it for any request that takes more than a couple of steps: write the plan first, \
         mark an item in_progress when you start it, and completed (or failed) when done. \
         final_response is rejected while any item is still pending or in_progress."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "todos": {
                    "type": "array",
                    "description": "The full, updated TODO list",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": {
                                "type": "string",
                                "description": "Stable identifier, unique within the list"
                            },
                            "title": {
                                "type": "string",
                                "description": "What needs to be done"
                            },
                            "status": {
                                "type": "string",
                                "enum": ["pending", "in_progress", "completed", "failed"]
                            }
                        },
                        "required": ["id", "title", "status"]
                    }
                }
            },
            "required": ["todos"]
        })
    }

    fn execute(
        &self,
        params: Value,
        ctx: ToolExecutionContext,
    ) -> BoxFuture<'_, Result<ToolResult, ToolError>> {
        Box::pin(async move {
            let list = ctx.session.todos().cloned().ok_or_else(|| {
                ToolError::Precondition("No TODO list is attached to this session".into())
            })?;

            let args: WriteTodosArgs = parse_args(params)?;

            let mut seen = HashSet::new();
            let mut new_todos = Vec::with_capacity(args.todos.len());
            for raw in args.todos {
                let status = parse_status(&raw.status).ok_or_else(|| {
                    ToolError::InvalidParams(format!(
                        "Invalid status '{}' for todo '{}'. Must be pending, in_progress, completed, or failed",
                        raw.status, raw.id
                    ))
                })?;
                if !seen.insert(raw.id.clone()) {
                    return Err(ToolError::InvalidParams(format!(
                        "Duplicate todo id '{}'",
                        raw.id
                    )));
                }
                new_todos.push(TodoItem::new(raw.id, raw.title, status));
            }

            let count = |s: TodoStatus| new_todos.iter().filter(|t| t.status == s).count();
            let summary = format!(
                "TODO list updated: {} total, {} completed, {} failed, {} in progress, {} pending",
                new_todos.len(),
                count(TodoStatus::Completed),
                count(TodoStatus::Failed),
                count(TodoStatus::InProgress),
                count(TodoStatus::Pending),
            );

            tracing::debug!(session = %ctx.session.session_id, "{}", summary);

            let todos_json = serde_json::to_value(&new_todos).unwrap_or(Value::Null);
            *list.write().await = new_todos;

            Ok(ToolResult::success(summary).with_metadata("todos", todos_json))
        })
    }
}
