//! Client for the Office automation server
//!
//! The server exposes `POST|GET /<app>/<method>` with JSON bodies and
//! answers `{success, error?, message?, ...}`. Error statuses still carry
//! that body, so the body is parsed before the status is looked at.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

use crate::error::{Error, Result};

use super::{HttpMethod, OfficeApp};

/// Response envelope of the automation server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutomationResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Endpoint-specific fields (cell values, slide shapes, sheet names, ...)
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl AutomationResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// The server's own description of a failure
    pub fn failure_text(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "Unknown automation error".to_string())
    }
}

/// Boundary to whatever drives the Office applications
#[async_trait]
pub trait AutomationClient: Send + Sync {
    /// Invoke `<app>/<method>` with JSON arguments
    async fn call(
        &self,
        app: OfficeApp,
        method: &str,
        http: HttpMethod,
        args: Value,
    ) -> Result<AutomationResponse>;

    /// Liveness probe
    async fn health(&self) -> Result<AutomationResponse>;
}

/// HTTP JSON client for the automation server
pub struct HttpAutomationClient {
    http: reqwest::Client,
    base_url: url::Url,
}

impl HttpAutomationClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        // A trailing slash makes Url::join append instead of replacing the last segment
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = url::Url::parse(&normalized)
            .map_err(|e| Error::Config(format!("Invalid automation server URL '{}': {}", base_url, e)))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("OfficePilot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Automation(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &url::Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<url::Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Automation(format!("Invalid endpoint '{}': {}", path, e)))
    }

    async fn send(&self, request: reqwest::RequestBuilder, path: &str) -> Result<AutomationResponse> {
        let response = request.send().await.map_err(|e| {
            Error::Automation(format!(
                "Automation server unreachable at {} ({}). Is office-server running?",
                self.base_url, e
            ))
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Automation(format!("Failed to read response from {}: {}", path, e)))?;

        match serde_json::from_str::<AutomationResponse>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(Error::Automation(format!(
                "{} returned HTTP {} {}",
                path,
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            ))),
            Err(e) => Err(Error::Automation(format!("Malformed response from {}: {}", path, e))),
        }
    }
}

#[async_trait]
impl AutomationClient for HttpAutomationClient {
    async fn call(
        &self,
        app: OfficeApp,
        method: &str,
        http: HttpMethod,
        args: Value,
    ) -> Result<AutomationResponse> {
        let path = format!("{}/{}", app.id(), method);
        let url = self.endpoint(&path)?;
        tracing::debug!(%url, ?http, "Automation request");

        let request = match http {
            HttpMethod::Get => self.http.get(url),
            HttpMethod::Post => self.http.post(url).json(&args),
        };
        self.send(request, &path).await
    }

    async fn health(&self) -> Result<AutomationResponse> {
        let url = self.endpoint("health")?;
        self.send(self.http.get(url), "health").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_keeps_domain_fields() {
        let parsed: AutomationResponse = serde_json::from_value(json!({
            "success": true,
            "message": "Read A1:B2",
            "values": [["a", 1], ["b", 2]]
        }))
        .unwrap();

        assert!(parsed.success);
        assert_eq!(parsed.message.as_deref(), Some("Read A1:B2"));
        assert_eq!(parsed.data["values"][1][1], json!(2));
    }

    #[test]
    fn failure_text_prefers_error_then_message() {
        let r = AutomationResponse {
            success: false,
            error: None,
            message: Some("No active document".into()),
            data: Map::new(),
        };
        assert_eq!(r.failure_text(), "No active document");
        assert_eq!(AutomationResponse::failed("boom").failure_text(), "boom");
        assert_eq!(AutomationResponse::default().failure_text(), "Unknown automation error");
    }

    #[test]
    fn endpoints_are_joined_under_base_path() {
        let client = HttpAutomationClient::new("http://127.0.0.1:8765/api", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.endpoint("excel/write_cell").unwrap().as_str(),
            "http://127.0.0.1:8765/api/excel/write_cell"
        );
    }

    #[tokio::test]
    async fn unreachable_server_is_an_automation_error() {
        // Port 9 (discard) is almost never listening on loopback
        let client = HttpAutomationClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = client.health().await.unwrap_err();
        assert!(matches!(err, Error::Automation(_)));
    }
}
