//! final_response tool - ends the session once the TODO list is settled

use serde::Deserialize;
use serde_json::{json, Value};

use crate::context::InteractionRequest;
use crate::error::ToolError;
use crate::tools::task::TodoItem;
use crate::tools::{parse_args, BoxFuture, Tool, ToolExecutionContext, ToolResult};

pub const NAME: &str = "final_response";

#[derive(Deserialize)]
struct FinalArgs {
    message: String,
}

/// Render the items that still block completion
pub fn describe_incomplete(items: &[TodoItem]) -> String {
    let mut out = format!(
        "Cannot finish: {} TODO item(s) are not completed or failed. \
         Finish them, or mark them failed with write_todos, then call final_response again.\n",
        items.len()
    );
    for item in items {
        out.push_str(&format!("- [{}] {}: {}\n", item.status, item.id, item.title));
    }
    out.trim_end().to_string()
}

pub struct FinalResponse;

impl Tool for FinalResponse {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Deliver the final answer to the user and end the task. \
         Rejected while any TODO item is pending or in_progress."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "The final answer shown to the user"
                }
            },
            "required": ["message"]
        })
    }

    fn execute(
        &self,
        params: Value,
        ctx: ToolExecutionContext,
    ) -> BoxFuture<'_, Result<ToolResult, ToolError>> {
        Box::pin(async move {
            let args: FinalArgs = parse_args(params)?;

            if let Some(todos) = ctx.session.todos() {
                let incomplete: Vec<TodoItem> = todos
                    .read()
                    .await
                    .iter()
                    .filter(|t| !t.status.is_terminal())
                    .cloned()
                    .collect();

                if !incomplete.is_empty() {
                    tracing::debug!(count = incomplete.len(), "final_response blocked by TODOs");
                    let listed = serde_json::to_value(&incomplete).unwrap_or(Value::Null);
                    return Ok(ToolResult::failure(describe_incomplete(&incomplete))
                        .with_metadata("incomplete_todos", listed));
                }
            }

            if let Some(tx) = ctx.session.interaction() {
                let _ = tx.send(InteractionRequest::FinalResponse {
                    message: args.message.clone(),
                });
            }

            Ok(ToolResult::success(args.message))
        })
    }
}
