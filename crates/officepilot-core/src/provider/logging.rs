//! LLM request/response logging
//!
//! Set the `LLM_LOG_FILE` environment variable to append one JSON object per
//! LLM interaction to that file.
//!
//! Example: `LLM_LOG_FILE=/tmp/llm.log officepilot run "..."`

use serde_json::json;
use std::io::Write;
use tracing::{debug, warn};

use super::{CompletionResult, LlmRequest};

/// Environment variable naming the log file
pub const LLM_LOG_ENV: &str = "LLM_LOG_FILE";

/// Append an interaction to the log file if `LLM_LOG_FILE` is set
pub fn log_llm_interaction(
    provider: &str,
    model: &str,
    request: &LlmRequest,
    result: Option<&CompletionResult>,
    error: Option<&str>,
) {
    let log_file = match std::env::var(LLM_LOG_ENV) {
        Ok(path) if !path.is_empty() => path,
        _ => return,
    };

    let entry = build_entry(provider, model, request, result, error);

    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
    {
        Ok(mut file) => {
            if let Err(e) = writeln!(file, "{}", entry) {
                warn!("Failed to write to LLM log file: {}", e);
            }
        }
        Err(e) => {
            warn!("Failed to open LLM log file {}: {}", log_file, e);
        }
    }

    debug!("Logged LLM interaction to {}", log_file);
}

fn build_entry(
    provider: &str,
    model: &str,
    request: &LlmRequest,
    result: Option<&CompletionResult>,
    error: Option<&str>,
) -> serde_json::Value {
    json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "provider": provider,
        "model": model,
        "request": {
            "system_prompt": request.system_prompt,
            "messages": request.messages,
            "message_count": request.messages.len(),
            "tools": request.tools.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            "tool_count": request.tools.len(),
        },
        "response": result.map(|r| json!({
            "type": if r.has_tool_calls() { "tool_calls" } else { "message" },
            "content": r.content,
            "tool_calls": r.tool_calls,
        })),
        "error": error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::LlmMessage;

    #[test]
    fn test_entry_shape() {
        let request = LlmRequest::new(vec![LlmMessage::user("hi")]).with_system_prompt("sys");
        let result = CompletionResult::text("hello");
        let entry = build_entry("anthropic", "claude", &request, Some(&result), None);

        assert_eq!(entry["model"], "claude");
        assert_eq!(entry["request"]["message_count"], 1);
        assert_eq!(entry["response"]["type"], "message");
        assert!(entry["error"].is_null());
    }
}
