//! GenAI-based LLM provider implementation
//!
//! Uses the genai framework with manual tool control: the model only ever
//! proposes tool calls, the agent loop decides how they run. Responses are
//! streamed and accumulated so long generations don't hit request timeouts.

use async_trait::async_trait;
use futures::StreamExt;
use genai::chat::{ChatMessage, ChatRequest, ChatStreamEvent, Tool, ToolCall as GenaiToolCall, ToolResponse};
use genai::resolver::{AuthData, AuthResolver};
use genai::Client;
use genai::WebConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use super::logging::log_llm_interaction;
use super::{CompletionResult, LlmMessage, LlmProvider, LlmRequest, ToolCall};
use crate::config::ProviderConfig;
use crate::error::{Error, Result};

/// Supported LLM provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// OpenAI (GPT-4o, GPT-4.1, etc.)
    OpenAI,
    /// Anthropic (Claude)
    Anthropic,
    /// Google Gemini
    Gemini,
    /// Groq (fast inference)
    Groq,
    /// DeepSeek
    DeepSeek,
    /// Ollama (local)
    Ollama,
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ProviderType::OpenAI),
            "anthropic" | "claude" => Ok(ProviderType::Anthropic),
            "gemini" | "google" => Ok(ProviderType::Gemini),
            "groq" => Ok(ProviderType::Groq),
            "deepseek" => Ok(ProviderType::DeepSeek),
            "ollama" => Ok(ProviderType::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

impl ProviderType {
    /// Get the default model for this provider
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderType::OpenAI => "gpt-4o",
            ProviderType::Anthropic => "claude-sonnet-4-20250514",
            ProviderType::Gemini => "gemini-2.0-flash",
            ProviderType::Groq => "llama-3.3-70b-versatile",
            ProviderType::DeepSeek => "deepseek-chat",
            ProviderType::Ollama => "llama3.1",
        }
    }

    /// Get the environment variable name for API key
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            ProviderType::OpenAI => Some("OPENAI_API_KEY"),
            ProviderType::Anthropic => Some("ANTHROPIC_API_KEY"),
            ProviderType::Gemini => Some("GEMINI_API_KEY"),
            ProviderType::Groq => Some("GROQ_API_KEY"),
            ProviderType::DeepSeek => Some("DEEPSEEK_API_KEY"),
            ProviderType::Ollama => None,
        }
    }

    /// Get the provider type as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::OpenAI => "openai",
            ProviderType::Anthropic => "anthropic",
            ProviderType::Gemini => "gemini",
            ProviderType::Groq => "groq",
            ProviderType::DeepSeek => "deepseek",
            ProviderType::Ollama => "ollama",
        }
    }
}

/// A provider implementation using genai
pub struct GenAIProvider {
    client: Client,
    provider_type: ProviderType,
    model: String,
}

impl GenAIProvider {
    /// Default timeout for LLM API requests (5 minutes)
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

    /// Create WebConfig with appropriate timeouts for LLM requests
    fn default_web_config() -> WebConfig {
        WebConfig::default()
            .with_timeout(Self::DEFAULT_TIMEOUT)
            .with_connect_timeout(Duration::from_secs(30))
    }

    /// Create a new provider with default settings (uses environment variables for auth)
    pub fn new(provider_type: ProviderType, model: Option<&str>) -> Self {
        let client = Client::builder()
            .with_web_config(Self::default_web_config())
            .build();
        Self {
            client,
            provider_type,
            model: model.unwrap_or(provider_type.default_model()).to_string(),
        }
    }

    /// Create a provider with a specific API key
    pub fn with_api_key(provider_type: ProviderType, api_key: &str, model: Option<&str>) -> Self {
        let api_key = api_key.to_string();
        let auth_resolver = AuthResolver::from_resolver_fn(
            move |_model_iden| -> std::result::Result<Option<AuthData>, genai::resolver::Error> {
                Ok(Some(AuthData::from_single(api_key.clone())))
            },
        );

        let client = Client::builder()
            .with_web_config(Self::default_web_config())
            .with_auth_resolver(auth_resolver)
            .build();

        Self {
            client,
            provider_type,
            model: model.unwrap_or(provider_type.default_model()).to_string(),
        }
    }

    /// Create a provider from a config section
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let provider_type: ProviderType = config
            .provider_type
            .parse()
            .map_err(Error::Config)?;
        let model = (!config.model.is_empty()).then_some(config.model.as_str());

        let provider = match config.get_api_key() {
            Some(key) => Self::with_api_key(provider_type, &key, model),
            None if provider_type == ProviderType::Ollama => Self::new(provider_type, model),
            None => {
                return Err(Error::Config(format!(
                    "No API key configured for provider '{}' (set api_key or {})",
                    provider_type,
                    config
                        .api_key_env
                        .as_deref()
                        .or(provider_type.api_key_env())
                        .unwrap_or("an api_key_env variable"),
                )));
            }
        };
        Ok(provider)
    }

    /// Get the provider type
    pub fn provider_type(&self) -> ProviderType {
        self.provider_type
    }

    /// Build the genai request from our conversation model
    fn build_chat_request(request: &LlmRequest) -> ChatRequest {
        let mut chat_req = ChatRequest::default();

        if let Some(system) = &request.system_prompt {
            chat_req = chat_req.with_system(system.as_str());
        }

        for msg in &request.messages {
            chat_req = match msg {
                LlmMessage::User { content } => chat_req.append_message(ChatMessage::user(content.as_str())),
                LlmMessage::Assistant { content, tool_calls } if tool_calls.is_empty() => {
                    chat_req.append_message(ChatMessage::assistant(content.clone().unwrap_or_default()))
                }
                LlmMessage::Assistant { tool_calls, .. } => {
                    // OpenAI-style APIs want the tool calls as a single assistant message
                    let genai_calls: Vec<GenaiToolCall> = tool_calls
                        .iter()
                        .map(|tc| GenaiToolCall {
                            call_id: tc.call_id.clone(),
                            fn_name: tc.name.clone(),
                            fn_arguments: tc.arguments.clone(),
                            thought_signatures: None,
                        })
                        .collect();
                    chat_req.append_message(genai_calls)
                }
                LlmMessage::ToolResult { call_id, content, .. } => {
                    chat_req.append_message(ToolResponse::new(call_id.clone(), content.clone()))
                }
            };
        }

        if !request.tools.is_empty() {
            let genai_tools: Vec<Tool> = request
                .tools
                .iter()
                .map(|t| {
                    Tool::new(&t.name)
                        .with_description(&t.description)
                        .with_schema(t.parameters.clone())
                })
                .collect();
            chat_req = chat_req.with_tools(genai_tools);
        }

        chat_req
    }

    async fn stream_completion(&self, chat_req: ChatRequest) -> Result<CompletionResult> {
        let stream_response = self
            .client
            .exec_chat_stream(&self.model, chat_req, None)
            .await
            .map_err(|e| {
                error!(error = ?e, model = %self.model, "LLM request failed");
                Error::Provider(format!("GenAI error: {:?}", e))
            })?;

        let mut content = String::new();
        let mut tool_calls: Vec<ToolCall> = Vec::new();
        let mut stream = stream_response.stream;

        while let Some(event) = stream.next().await {
            match event {
                Ok(ChatStreamEvent::Chunk(chunk)) => {
                    content.push_str(&chunk.content);
                }
                Ok(ChatStreamEvent::ReasoningChunk(chunk)) => {
                    debug!(model = %self.model, len = chunk.content.len(), "Reasoning chunk");
                }
                Ok(ChatStreamEvent::ToolCallChunk(tc)) => {
                    // Each ToolCallChunk contains a complete ToolCall
                    let call = tc.tool_call;
                    tool_calls.push(ToolCall {
                        call_id: call.call_id,
                        name: call.fn_name,
                        arguments: call.fn_arguments,
                    });
                }
                Ok(ChatStreamEvent::End(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    error!(error = ?e, model = %self.model, "LLM stream error");
                    return Err(Error::Provider(format!("GenAI stream error: {:?}", e)));
                }
            }
        }

        Ok(CompletionResult {
            content: if content.is_empty() { None } else { Some(content) },
            tool_calls,
        })
    }
}

#[async_trait]
impl LlmProvider for GenAIProvider {
    fn name(&self) -> &str {
        self.provider_type.as_str()
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: LlmRequest) -> Result<CompletionResult> {
        let chat_req = Self::build_chat_request(&request);

        debug!(
            model = %self.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending LLM request"
        );

        let outcome = self.stream_completion(chat_req).await;

        match &outcome {
            Ok(result) => log_llm_interaction(self.name(), &self.model, &request, Some(result), None),
            Err(e) => log_llm_interaction(self.name(), &self.model, &request, None, Some(&e.to_string())),
        }

        outcome
    }
}

/// Create a provider from type, optional key and optional model
pub fn create_provider(
    provider_type: ProviderType,
    api_key: Option<&str>,
    model: Option<&str>,
) -> GenAIProvider {
    match api_key {
        Some(key) => GenAIProvider::with_api_key(provider_type, key, model),
        None => GenAIProvider::new(provider_type, model),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_type_parse() {
        assert_eq!("Anthropic".parse::<ProviderType>().unwrap(), ProviderType::Anthropic);
        assert_eq!("google".parse::<ProviderType>().unwrap(), ProviderType::Gemini);
        assert!("nope".parse::<ProviderType>().is_err());
    }

    #[test]
    fn test_default_model_used_when_none() {
        let provider = GenAIProvider::with_api_key(ProviderType::OpenAI, "sk-test", None);
        assert_eq!(provider.model(), "gpt-4o");
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = ProviderConfig {
            provider_type: "anthropic".to_string(),
            api_key: None,
            api_key_env: Some("OFFICEPILOT_TEST_KEY_THAT_IS_NOT_SET".to_string()),
            model: String::new(),
        };
        assert!(matches!(GenAIProvider::from_config(&config), Err(Error::Config(_))));

        let config = ProviderConfig {
            api_key: Some("sk-ant-test".to_string()),
            ..config
        };
        let provider = GenAIProvider::from_config(&config).unwrap();
        assert_eq!(provider.model(), "claude-sonnet-4-20250514");
    }
}
