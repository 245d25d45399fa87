//! `<app>_work_request`: delegate a document task to an application sub-agent

use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::agent::{StopReason, SubAgent, SubAgentConfig};
use crate::error::ToolError;
use crate::orchestration::{SystemPrompt, ToolCatalog};
use crate::provider::LlmProvider;
use crate::tools::interaction::{FinalResponse, TellToUser};
use crate::tools::{parse_args, BoxFuture, Tool, ToolExecutionContext, ToolRegistry, ToolResult};

use super::catalog::specs_for;
use super::client::AutomationClient;
use super::tool::OfficeTool;
use super::OfficeApp;

/// Limits applied to the nested loop
#[derive(Debug, Clone, Copy)]
pub struct WorkRequestSettings {
    pub max_iterations: usize,
    pub max_tool_result_chars: usize,
}

impl Default for WorkRequestSettings {
    fn default() -> Self {
        let config = SubAgentConfig::default();
        Self {
            max_iterations: config.max_iterations,
            max_tool_result_chars: config.max_tool_result_chars,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WorkRequestArgs {
    instruction: String,
}

/// Runs a sub-agent with one application's tools and returns its answer
pub struct OfficeWorkRequest {
    app: OfficeApp,
    name: String,
    description: String,
    client: Arc<dyn AutomationClient>,
    provider: Arc<dyn LlmProvider>,
    settings: WorkRequestSettings,
}

impl OfficeWorkRequest {
    pub fn new(
        app: OfficeApp,
        client: Arc<dyn AutomationClient>,
        provider: Arc<dyn LlmProvider>,
        settings: WorkRequestSettings,
    ) -> Self {
        Self {
            app,
            name: format!("{}_work_request", app.id()),
            description: format!(
                "Delegate a self-contained task to a {} specialist. Describe the desired end \
                 state completely (file path, content, formatting); the specialist cannot ask \
                 follow-up questions. Returns the specialist's report.",
                app.display_name()
            ),
            client,
            provider,
            settings,
        }
    }

    /// The specialist's toolset: every endpoint of the app plus reporting tools
    fn sub_agent_tools(&self) -> ToolCatalog {
        let mut registry = ToolRegistry::new();
        for spec in specs_for(self.app) {
            registry.register(Arc::new(OfficeTool::new(spec, self.client.clone())));
        }
        registry.register(Arc::new(TellToUser));
        registry.register(Arc::new(FinalResponse));
        ToolCatalog::from(registry)
    }
}

impl Tool for OfficeWorkRequest {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "instruction": {
                    "type": "string",
                    "description": "What the specialist should accomplish"
                }
            },
            "required": ["instruction"]
        })
    }

    fn execute(
        &self,
        params: Value,
        ctx: ToolExecutionContext,
    ) -> BoxFuture<'_, Result<ToolResult, ToolError>> {
        Box::pin(async move {
            let args: WorkRequestArgs = parse_args(params)?;
            if args.instruction.trim().is_empty() {
                return Err(ToolError::InvalidParams("instruction must not be empty".into()));
            }

            let config = SubAgentConfig::default()
                .with_max_iterations(self.settings.max_iterations)
                .with_max_tool_result_chars(self.settings.max_tool_result_chars);

            let agent = SubAgent::new(
                self.provider.clone(),
                Arc::new(self.sub_agent_tools()),
                SystemPrompt::for_app(self.app).build(),
                ctx.session.for_sub_agent(),
            )
            .with_config(config);

            tracing::info!(app = %self.app, "Delegating work request");

            let outcome = agent
                .run(args.instruction)
                .await
                .map_err(|e| ToolError::ExecutionFailed(format!("{} work request failed: {}", self.app.display_name(), e)))?;

            let mut response = outcome.response;
            if outcome.stop_reason == StopReason::IterationLimit {
                response = format!(
                    "[{} specialist stopped after {} iterations without finishing]\n{}",
                    self.app.display_name(),
                    outcome.iterations,
                    response
                );
            }

            Ok(ToolResult::success(response)
                .with_metadata("stop_reason", outcome.stop_reason.as_str())
                .with_metadata("iterations", outcome.iterations)
                .with_metadata("tool_calls", outcome.tool_calls))
        })
    }
}
