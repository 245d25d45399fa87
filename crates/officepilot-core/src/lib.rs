//! OfficePilot Core - tool-calling agent runtime for Office automation
//!
//! This crate provides the core functionality for the OfficePilot application:
//! - Tools for Word, Excel and PowerPoint (through the local automation server),
//!   the file system and PowerShell
//! - A tool catalog with switchable per-application groups
//! - The bounded sub-agent loop with its `final_response` TODO gate
//! - Background process tracking
//! - The genai-backed LLM provider and configuration

pub mod agent;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod formatting;
pub mod orchestration;
pub mod provider;
pub mod tools;

pub use agent::{StopReason, SubAgent, SubAgentConfig, SubAgentOutcome};
pub use config::{AgentConfig, Config, ConfigManager, GeneralConfig, OfficeConfig, ProviderConfig, ShellSettings};
pub use context::{interaction_channel, AgentContext, InteractionReceiver, InteractionRequest, InteractionSender};
pub use error::{Error, Result, ToolError};
pub use events::{file_event_channel, FileEvent, FileEventReceiver, FileEventSender};
pub use orchestration::{GroupInfo, GroupLifecycle, SystemPrompt, ToolCatalog, ToolGroup, ToolRegistryBuilder};
pub use provider::{create_provider, CompletionResult, GenAIProvider, LlmMessage, LlmProvider, LlmRequest, ProviderType};
pub use tools::office::{AutomationClient, AutomationResponse, HttpAutomationClient, OfficeApp};
pub use tools::shell::BackgroundTaskManager;
pub use tools::task::{TodoItem, TodoList, TodoStatus};
pub use tools::{Tool, ToolDefinition, ToolExecutionContext, ToolRegistry, ToolResult};
