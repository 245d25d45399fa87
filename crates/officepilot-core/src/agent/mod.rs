//! Agent loop
//!
//! The same loop drives the top-level agent and the per-application
//! sub-agents behind the `*_work_request` tools; they differ only in the
//! tool catalog, system prompt and context they are given.

mod sub_agent;

pub use sub_agent::{
    AgentState, StopReason, SubAgent, SubAgentConfig, SubAgentOutcome, DEFAULT_MAX_ITERATIONS,
    DEFAULT_MAX_TOOL_RESULT_CHARS,
};
