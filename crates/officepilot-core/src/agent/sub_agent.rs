//! Bounded tool-calling loop
//!
//! A `SubAgent` sends the conversation to the LLM, runs whatever tool calls
//! come back (in order, one at a time), appends the results, and repeats.
//! It stops when the model answers in plain text, when a terminal tool such
//! as `final_response` succeeds, or when the iteration cap is reached. Tool
//! failures of any kind are fed back to the model; only provider errors
//! abort the run.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::context::AgentContext;
use crate::error::Result;
use crate::formatting::{format_tool_summary, truncate_str, truncate_tool_result};
use crate::orchestration::ToolCatalog;
use crate::provider::{LlmMessage, LlmProvider, LlmRequest, ToolCall};
use crate::tools::interaction::FINAL_RESPONSE_TOOL_NAME;
use crate::tools::{ToolExecutionContext, ToolResult};

/// Default maximum number of LLM turns
pub const DEFAULT_MAX_ITERATIONS: usize = 70;

/// Default cap on a single tool result before it enters the conversation
pub const DEFAULT_MAX_TOOL_RESULT_CHARS: usize = 30_000;

/// Loop limits and termination rules
#[derive(Debug, Clone)]
pub struct SubAgentConfig {
    pub max_iterations: usize,
    pub max_tool_result_chars: usize,
    /// Tools whose successful result ends the run
    pub terminal_tools: Vec<String>,
}

impl Default for SubAgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_tool_result_chars: DEFAULT_MAX_TOOL_RESULT_CHARS,
            terminal_tools: vec![FINAL_RESPONSE_TOOL_NAME.to_string()],
        }
    }
}

impl SubAgentConfig {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_max_tool_result_chars(mut self, max: usize) -> Self {
        self.max_tool_result_chars = max;
        self
    }

    pub fn with_terminal_tools(mut self, tools: Vec<String>) -> Self {
        self.terminal_tools = tools;
        self
    }
}

/// Where the loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    AwaitingLlmResponse,
    ExecutingTools,
    Done,
}

/// Why the loop stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "tool", rename_all = "snake_case")]
pub enum StopReason {
    /// The model replied without tool calls
    FinalAnswer,
    /// A terminal tool succeeded
    TerminalTool(String),
    /// The iteration cap was hit; the response is the last assistant text
    IterationLimit,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::FinalAnswer => "final_answer",
            StopReason::TerminalTool(_) => "terminal_tool",
            StopReason::IterationLimit => "iteration_limit",
        }
    }
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct SubAgentOutcome {
    pub response: String,
    pub stop_reason: StopReason,
    /// LLM turns taken
    pub iterations: usize,
    /// Tool calls executed across all turns
    pub tool_calls: usize,
}

/// An LLM loop over a fixed tool catalog
pub struct SubAgent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolCatalog>,
    system_prompt: String,
    context: AgentContext,
    config: SubAgentConfig,
}

impl SubAgent {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolCatalog>,
        system_prompt: impl Into<String>,
        context: AgentContext,
    ) -> Self {
        Self {
            provider,
            tools,
            system_prompt: system_prompt.into(),
            context,
            config: SubAgentConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SubAgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn context(&self) -> &AgentContext {
        &self.context
    }

    /// Run the loop for one instruction
    pub async fn run(&self, instruction: impl Into<String>) -> Result<SubAgentOutcome> {
        let instruction = instruction.into();
        let mut messages = vec![LlmMessage::user(instruction.clone())];
        let mut last_text: Option<String> = None;
        let mut tool_calls_executed = 0usize;
        let mut state = AgentState::AwaitingLlmResponse;

        info!(
            session = %self.context.session_id,
            provider = %self.provider.name(),
            model = %self.provider.model(),
            instruction = %truncate_str(&instruction, 120),
            "Agent run started"
        );

        for iteration in 1..=self.config.max_iterations {
            debug!(session = %self.context.session_id, iteration, ?state, "Requesting completion");

            // Definitions are re-read each turn so group toggles take effect mid-run
            let request = LlmRequest::new(messages.clone())
                .with_system_prompt(self.system_prompt.clone())
                .with_tools(self.tools.definitions());

            let completion = self.provider.complete(request).await?;

            let content = completion.content.filter(|c| !c.trim().is_empty());
            if let Some(text) = &content {
                last_text = Some(text.clone());
            }

            if completion.tool_calls.is_empty() {
                state = AgentState::Done;
                info!(session = %self.context.session_id, iteration, ?state, "Agent answered without tool calls");
                return Ok(SubAgentOutcome {
                    response: content.unwrap_or_default(),
                    stop_reason: StopReason::FinalAnswer,
                    iterations: iteration,
                    tool_calls: tool_calls_executed,
                });
            }

            state = AgentState::ExecutingTools;
            let calls = completion.tool_calls;
            messages.push(LlmMessage::assistant_with_tool_calls(content, calls.clone()));

            for call in calls {
                let result = self.execute_tool_call(&call).await;
                tool_calls_executed += 1;

                let text = truncate_tool_result(&result.to_llm_string(), self.config.max_tool_result_chars);
                messages.push(LlmMessage::tool_result(&call.call_id, text, !result.success));

                if result.success && self.config.terminal_tools.iter().any(|t| t == &call.name) {
                    state = AgentState::Done;
                    info!(
                        session = %self.context.session_id,
                        iteration,
                        tool = %call.name,
                        ?state,
                        "Terminal tool succeeded"
                    );
                    return Ok(SubAgentOutcome {
                        response: result.result.unwrap_or_default(),
                        stop_reason: StopReason::TerminalTool(call.name),
                        iterations: iteration,
                        tool_calls: tool_calls_executed,
                    });
                }
            }

            state = AgentState::AwaitingLlmResponse;
        }

        warn!(
            session = %self.context.session_id,
            max_iterations = self.config.max_iterations,
            "Agent hit the iteration limit"
        );

        Ok(SubAgentOutcome {
            response: last_text.unwrap_or_default(),
            stop_reason: StopReason::IterationLimit,
            iterations: self.config.max_iterations,
            tool_calls: tool_calls_executed,
        })
    }

    /// Execute one call; every failure mode comes back as a failed result
    async fn execute_tool_call(&self, call: &ToolCall) -> ToolResult {
        let Some(tool) = self.tools.get_tool(&call.name) else {
            warn!(tool = %call.name, "LLM requested an unknown tool");
            return ToolResult::failure(format!("Unknown tool: {}", call.name));
        };

        let arguments = normalize_arguments(call.arguments.clone());
        info!(session = %self.context.session_id, "{}", format_tool_summary(&call.name, &arguments));

        let ctx = ToolExecutionContext::new(call.call_id.clone(), call.name.clone(), self.context.clone());
        let result = match tool.execute(arguments, ctx).await {
            Ok(result) => result,
            Err(e) => ToolResult::from(e),
        };

        if result.success {
            debug!(tool = %call.name, "Tool succeeded");
        } else {
            warn!(tool = %call.name, error = %result.error.as_deref().unwrap_or(""), "Tool failed");
        }
        result
    }
}

/// Some providers send arguments as a JSON string rather than an object
fn normalize_arguments(arguments: Value) -> Value {
    match arguments {
        Value::String(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
        other => other,
    }
}
