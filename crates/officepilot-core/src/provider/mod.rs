//! LLM Provider abstraction using GenAI
//!
//! The agent loop talks to models through [`LlmProvider`]. The production
//! implementation is [`GenAIProvider`], which reaches OpenAI, Anthropic and
//! Gemini through the genai framework. Tests substitute scripted providers.

mod genai_provider;
mod logging;

pub use genai_provider::{create_provider, GenAIProvider, ProviderType};
pub use logging::{log_llm_interaction, LLM_LOG_ENV};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::tools::ToolDefinition;

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned id, echoed back with the result
    pub call_id: String,
    pub name: String,
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(call_id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            call_id: call_id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// One entry of the conversation history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum LlmMessage {
    User {
        content: String,
    },
    Assistant {
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    ToolResult {
        call_id: String,
        content: String,
        #[serde(default)]
        is_error: bool,
    },
}

impl LlmMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    /// Create a plain assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    /// Create an assistant message carrying tool calls
    pub fn assistant_with_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::Assistant {
            content,
            tool_calls,
        }
    }

    /// Create a tool result message
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>, is_error: bool) -> Self {
        Self::ToolResult {
            call_id: call_id.into(),
            content: content.into(),
            is_error,
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            Self::User { .. } => "user",
            Self::Assistant { .. } => "assistant",
            Self::ToolResult { .. } => "tool",
        }
    }

    /// Get text content as a string (for logging/display)
    pub fn content_as_text(&self) -> String {
        match self {
            Self::User { content } => content.clone(),
            Self::Assistant { content, .. } => content.clone().unwrap_or_default(),
            Self::ToolResult { content, .. } => content.clone(),
        }
    }
}

/// A single completion request
#[derive(Debug, Clone, Default)]
pub struct LlmRequest {
    pub system_prompt: Option<String>,
    pub messages: Vec<LlmMessage>,
    pub tools: Vec<ToolDefinition>,
}

impl LlmRequest {
    pub fn new(messages: Vec<LlmMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }
}

/// Response from completion that may contain both content and tool calls
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionResult {
    /// Text content from the assistant (may be present even with tool calls)
    pub content: Option<String>,
    /// Tool calls to execute before the next turn
    pub tool_calls: Vec<ToolCall>,
}

impl CompletionResult {
    /// Plain text answer with no tool calls
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn with_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: None,
            tool_calls,
        }
    }

    /// Check if this result has any tool calls
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Check if this result has text content
    pub fn has_content(&self) -> bool {
        self.content.as_ref().map(|c| !c.is_empty()).unwrap_or(false)
    }
}

/// Trait for LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., "openai", "anthropic")
    fn name(&self) -> &str;

    /// Model identifier requests are sent to
    fn model(&self) -> &str;

    /// Send one request and collect the full response
    async fn complete(&self, request: LlmRequest) -> Result<CompletionResult>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_roles() {
        assert_eq!(LlmMessage::user("hi").role(), "user");
        assert_eq!(LlmMessage::assistant("hello").role(), "assistant");
        assert_eq!(LlmMessage::tool_result("c1", "ok", false).role(), "tool");
    }

    #[test]
    fn test_message_serializes_with_role_tag() {
        let msg = LlmMessage::assistant_with_tool_calls(
            None,
            vec![ToolCall::new("c1", "read_file", json!({"path": "a.txt"}))],
        );
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], "assistant");
        assert_eq!(value["tool_calls"][0]["name"], "read_file");
        assert!(value.get("content").is_none());
    }

    #[test]
    fn test_completion_result_flags() {
        assert!(!CompletionResult::text("done").has_tool_calls());
        assert!(CompletionResult::text("done").has_content());
        let calls = CompletionResult::with_tool_calls(vec![ToolCall::new("c", "x", json!({}))]);
        assert!(calls.has_tool_calls());
        assert!(!calls.has_content());
    }
}
