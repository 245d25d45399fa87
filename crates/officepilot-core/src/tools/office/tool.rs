//! The generic Office tool: validate, normalize, call, map

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::ToolError;
use crate::tools::schema;
use crate::tools::{BoxFuture, Tool, ToolExecutionContext, ToolResult};

use super::catalog::OfficeToolSpec;
use super::client::{AutomationClient, AutomationResponse};

/// A catalog entry bound to an automation client
pub struct OfficeTool {
    spec: OfficeToolSpec,
    client: Arc<dyn AutomationClient>,
}

impl OfficeTool {
    pub fn new(spec: OfficeToolSpec, client: Arc<dyn AutomationClient>) -> Self {
        Self { spec, client }
    }

    pub fn spec(&self) -> &OfficeToolSpec {
        &self.spec
    }

    /// Validate and normalize arguments into the request body
    pub fn prepare(&self, params: Value) -> Result<Value, ToolError> {
        let params = match params {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };

        schema::validate(&self.spec.parameters, &params).map_err(ToolError::InvalidParams)?;

        match self.spec.normalize {
            Some(normalize) => normalize(params).map_err(ToolError::InvalidParams),
            None => Ok(params),
        }
    }
}

/// Map an automation response onto a tool result
pub fn map_response(response: AutomationResponse) -> ToolResult {
    if !response.success {
        let mut result = ToolResult::failure(response.failure_text());
        for (k, v) in response.data {
            result.metadata.insert(k, v);
        }
        return result;
    }

    let mut text = response
        .message
        .clone()
        .unwrap_or_else(|| "Done".to_string());

    if !response.data.is_empty() {
        let data = Value::Object(response.data.clone());
        let rendered = serde_json::to_string_pretty(&data).unwrap_or_default();
        text.push('\n');
        text.push_str(&rendered);
    }

    let mut result = ToolResult::success(text);
    for (k, v) in response.data {
        result.metadata.insert(k, v);
    }
    result
}

impl Tool for OfficeTool {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn description(&self) -> &str {
        self.spec.description
    }

    fn parameters_schema(&self) -> Value {
        self.spec.parameters.clone()
    }

    fn execute(
        &self,
        params: Value,
        _ctx: ToolExecutionContext,
    ) -> BoxFuture<'_, Result<ToolResult, ToolError>> {
        Box::pin(async move {
            let body = self.prepare(params)?;

            tracing::debug!(tool = %self.spec.name, endpoint = %format!("{}/{}", self.spec.app, self.spec.method), "Office call");

            match self
                .client
                .call(self.spec.app, self.spec.method, self.spec.http, body)
                .await
            {
                Ok(response) => {
                    if !response.success {
                        tracing::warn!(tool = %self.spec.name, error = %response.failure_text(), "Office call failed");
                    }
                    Ok(map_response(response))
                }
                Err(e) => Err(ToolError::ExecutionFailed(e.to_string())),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_renders_message_and_data() {
        let result = map_response(
            AutomationResponse::ok("Read 1 cell").with_field("value", json!("Product")),
        );
        assert!(result.success);
        let text = result.result.unwrap();
        assert!(text.starts_with("Read 1 cell\n"));
        assert!(text.contains("\"value\": \"Product\""));
        assert_eq!(result.metadata["value"], json!("Product"));
    }

    #[test]
    fn failure_is_verbatim() {
        let result = map_response(AutomationResponse::failed("Sheet 'Q3' does not exist"));
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Sheet 'Q3' does not exist"));
    }
}
