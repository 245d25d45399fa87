//! Tool system for OfficePilot agents
//!
//! Tools are the actions that agents can take. Each tool has:
//! - A name and description for the LLM
//! - A JSON schema for parameters
//! - An execute method receiving the session context

pub mod filesystem;
pub mod interaction;
pub mod office;
pub mod process_utils;
pub mod schema;
pub mod shell;
pub mod task;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::AgentContext;
use crate::error::ToolError;

/// Boxed future type for object-safe async trait methods
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of a tool execution, as seen by the agent loop
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool succeeded
    pub success: bool,
    /// Text handed back to the LLM on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Failure description handed back to the LLM
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Structured side data (not shown to the LLM)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

impl ToolResult {
    pub fn success(result: impl Into<String>) -> Self {
        Self {
            success: true,
            result: Some(result.into()),
            ..Default::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Render for the tool-response message sent back to the model
    pub fn to_llm_string(&self) -> String {
        if self.success {
            self.result.clone().unwrap_or_default()
        } else {
            format!(
                "Error: {}",
                self.error.as_deref().unwrap_or("Tool execution failed")
            )
        }
    }
}

impl From<ToolError> for ToolResult {
    fn from(err: ToolError) -> Self {
        ToolResult::failure(err.to_string())
    }
}

/// Tool definition for LLM consumption
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Per-call context handed to every tool
#[derive(Clone)]
pub struct ToolExecutionContext {
    /// Provider-assigned id of the call being executed
    pub tool_call_id: String,
    /// Name the LLM used to invoke the tool
    pub tool_name: String,
    /// Session state shared with the agent loop
    pub session: AgentContext,
}

impl ToolExecutionContext {
    pub fn new(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        session: AgentContext,
    ) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            session,
        }
    }

    /// Context for invoking a tool outside of any agent loop (CLI, tests)
    pub fn standalone(tool_name: impl Into<String>, session: AgentContext) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), tool_name, session)
    }
}

/// Core trait for all tools
pub trait Tool: Send + Sync {
    /// Tool name (used by LLM to invoke)
    fn name(&self) -> &str;

    /// Description of what the tool does
    fn description(&self) -> &str;

    /// JSON schema for parameters
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with given parameters
    fn execute(
        &self,
        params: Value,
        ctx: ToolExecutionContext,
    ) -> BoxFuture<'_, Result<ToolResult, ToolError>>;

    /// Convert to tool definition for LLM
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Registry of available tools
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// List all available tools
    pub fn list(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    /// Get all tools
    pub fn all(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Deserialize tool arguments into a typed struct
pub fn parse_args<T: DeserializeOwned>(params: Value) -> Result<T, ToolError> {
    serde_json::from_value(params).map_err(|e| ToolError::InvalidParams(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_renders_with_error_prefix() {
        let ok = ToolResult::success("done");
        assert_eq!(ok.to_llm_string(), "done");

        let failed = ToolResult::failure("file missing");
        assert_eq!(failed.to_llm_string(), "Error: file missing");

        let from_err: ToolResult = ToolError::NotFound("nope".into()).into();
        assert!(!from_err.success);
        assert_eq!(from_err.to_llm_string(), "Error: Tool not found: nope");
    }

    #[test]
    fn parse_args_maps_to_invalid_params() {
        #[derive(Deserialize)]
        struct Args {
            #[allow(dead_code)]
            path: String,
        }

        let err = parse_args::<Args>(serde_json::json!({ "path": 3 }))
            .err()
            .unwrap();
        assert!(matches!(err, ToolError::InvalidParams(_)));
    }
}
