//! tell_to_user tool - one-way progress message

use serde::Deserialize;
use serde_json::{json, Value};

use crate::context::InteractionRequest;
use crate::error::ToolError;
use crate::tools::{parse_args, BoxFuture, Tool, ToolExecutionContext, ToolResult};

pub const NAME: &str = "tell_to_user";

#[derive(Deserialize)]
struct TellArgs {
    message: String,
}

pub struct TellToUser;

impl Tool for TellToUser {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Show a short progress message to the user without waiting for a reply."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "Message to display"
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
            let args: TellArgs = parse_args(params)?;

            match ctx.session.interaction() {
                Some(tx) => {
                    if tx
                        .send(InteractionRequest::Tell {
                            message: args.message.clone(),
                        })
                        .is_err()
                    {
                        tracing::info!(message = %args.message, "tell_to_user (interface closed)");
                    }
                }
                None => tracing::info!(message = %args.message, "tell_to_user"),
            }

            Ok(ToolResult::success("Message delivered"))
        })
    }
}
