//! ask_to_user tool - multiple-choice question during execution

use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::context::InteractionRequest;
use crate::error::ToolError;
use crate::tools::{parse_args, BoxFuture, Tool, ToolExecutionContext, ToolResult};

pub const NAME: &str = "ask_to_user";

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 4;

#[derive(Debug, Deserialize)]
struct AskArgs {
    question: String,
    options: Vec<String>,
}

/// Check the option count before anything reaches the user
pub fn validate_options(options: &[String]) -> Result<(), ToolError> {
    if options.len() < MIN_OPTIONS || options.len() > MAX_OPTIONS {
        return Err(ToolError::InvalidParams(format!(
            "options must contain {}-{} choices, got {}",
            MIN_OPTIONS,
            MAX_OPTIONS,
            options.len()
        )));
    }
    if options.iter().any(|o| o.trim().is_empty()) {
        return Err(ToolError::InvalidParams("options must not be empty strings".into()));
    }
    Ok(())
}

/// Tool for asking the user to pick one of a few options
pub struct AskToUser;

impl Tool for AskToUser {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Ask the user a question with 2 to 4 answer options and wait for the choice.\n\n\
         Use it when a decision genuinely belongs to the user (which file, which layout, \
         whether to overwrite). Put the recommended option first."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "The complete question to ask"
                },
                "options": {
                    "type": "array",
                    "description": "Available choices (2-4 options)",
                    "minItems": MIN_OPTIONS,
                    "maxItems": MAX_OPTIONS,
                    "items": { "type": "string" }
                }
            },
            "required": ["question", "options"]
        })
    }

    fn execute(
        &self,
        params: Value,
        ctx: ToolExecutionContext,
    ) -> BoxFuture<'_, Result<ToolResult, ToolError>> {
        Box::pin(async move {
            let args: AskArgs = parse_args(params)?;
            validate_options(&args.options)?;

            let tx = ctx.session.interaction().cloned().ok_or_else(|| {
                ToolError::Precondition("No user is attached to this session".into())
            })?;

            let (response_tx, response_rx) = oneshot::channel();
            tx.send(InteractionRequest::Ask {
                request_id: ctx.tool_call_id.clone(),
                question: args.question.clone(),
                options: args.options,
                response_tx,
            })
            .map_err(|_| ToolError::ExecutionFailed("User interface is closed".into()))?;

            let answer = response_rx.await.map_err(|_| {
                ToolError::ExecutionFailed("Question was dismissed without an answer".into())
            })?;

            tracing::debug!(question = %args.question, answer = %answer, "User answered");

            Ok(ToolResult::success(answer))
        })
    }
}
