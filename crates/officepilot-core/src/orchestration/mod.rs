//! Orchestration: the tool catalog and the prompts the agent loops run with

mod system_prompt;
mod tool_registry;

pub use system_prompt::{SystemPrompt, DEFAULT_SYSTEM_PROMPT};
pub use tool_registry::{
    GroupError, GroupInfo, GroupLifecycle, ToolCatalog, ToolGroup, ToolRegistryBuilder,
};
