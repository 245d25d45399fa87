//! Office tool tests
//!
//! Office tools, tool groups and work requests against a mock automation
//! client; no Office installation or server is needed.

use async_trait::async_trait;
use officepilot_core::provider::ToolCall;
use officepilot_core::tools::office::{
    excel_specs, office_tool_group, specs_for, HttpMethod, OfficeTool, OfficeWorkRequest,
    WorkRequestSettings,
};
use officepilot_core::{
    AgentContext, AutomationClient, AutomationResponse, CompletionResult, Error, LlmProvider,
    LlmRequest, OfficeApp, Result, Tool, ToolCatalog, ToolError, ToolExecutionContext,
    ToolRegistryBuilder,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tempfile::TempDir;

/// One recorded automation call
#[derive(Debug, Clone)]
struct RecordedCall {
    app: OfficeApp,
    method: String,
    http: HttpMethod,
    args: Value,
}

/// Automation client that records calls and replays canned responses
#[derive(Default)]
struct MockAutomationClient {
    calls: Mutex<Vec<RecordedCall>>,
    responses: Mutex<HashMap<String, AutomationResponse>>,
}

impl MockAutomationClient {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer `<app>/<method>` with `response` instead of a plain success
    fn respond(&self, endpoint: &str, response: AutomationResponse) {
        self.responses.lock().insert(endpoint.to_string(), response);
    }

    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    fn calls_to(&self, method: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.method == method).count()
    }
}

#[async_trait]
impl AutomationClient for MockAutomationClient {
    async fn call(
        &self,
        app: OfficeApp,
        method: &str,
        http: HttpMethod,
        args: Value,
    ) -> Result<AutomationResponse> {
        self.calls.lock().push(RecordedCall {
            app,
            method: method.to_string(),
            http,
            args,
        });
        let key = format!("{}/{}", app.id(), method);
        Ok(self
            .responses
            .lock()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| AutomationResponse::ok(format!("{} done", key))))
    }

    async fn health(&self) -> Result<AutomationResponse> {
        Ok(AutomationResponse::ok("healthy"))
    }
}

/// Provider that replays a fixed script
struct ScriptedProvider {
    script: Mutex<VecDeque<CompletionResult>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedProvider {
    fn new(script: Vec<CompletionResult>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: LlmRequest) -> Result<CompletionResult> {
        self.requests.lock().push(request);
        self.script
            .lock()
            .pop_front()
            .ok_or_else(|| Error::Provider("script exhausted".into()))
    }
}

fn office_tool(app: OfficeApp, name: &str, client: Arc<MockAutomationClient>) -> OfficeTool {
    let spec = specs_for(app)
        .into_iter()
        .find(|s| s.name == name)
        .unwrap_or_else(|| panic!("no spec named {}", name));
    OfficeTool::new(spec, client)
}

fn ctx(dir: &TempDir) -> ToolExecutionContext {
    ToolExecutionContext::standalone("test", AgentContext::new(dir.path()))
}

fn tool_call(id: &str, name: &str, args: Value) -> CompletionResult {
    CompletionResult::with_tool_calls(vec![ToolCall::new(id, name, args)])
}

mod catalog_tests {
    use super::*;

    #[test]
    fn test_names_are_prefixed_and_unique() {
        for app in OfficeApp::ALL {
            let specs = specs_for(app);
            assert!(!specs.is_empty());
            let mut names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
            assert!(names.iter().all(|n| n.starts_with(&format!("{}_", app.id()))));
            let total = names.len();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), total, "duplicate tool names for {}", app);
        }
    }

    #[test]
    fn test_every_app_has_lifecycle_endpoints() {
        for app in OfficeApp::ALL {
            let specs = specs_for(app);
            for method in ["launch", "open", "save", "close"] {
                assert!(
                    specs.iter().any(|s| s.method == method),
                    "{} is missing {}",
                    app,
                    method
                );
            }
        }
    }

    #[test]
    fn test_helper_tools_share_set_formula() {
        let specs = excel_specs();
        for name in ["excel_sumif", "excel_countif", "excel_average"] {
            let spec = specs.iter().find(|s| s.name == name).unwrap();
            assert_eq!(spec.method, "set_formula");
        }
    }
}

mod office_tool_tests {
    use super::*;

    #[tokio::test]
    async fn test_call_is_forwarded_with_arguments() {
        let dir = TempDir::new().unwrap();
        let client = MockAutomationClient::new();
        let tool = office_tool(OfficeApp::Word, "word_write", client.clone());

        let result = tool
            .execute(json!({ "text": "Quarterly summary" }), ctx(&dir))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.result.as_deref(), Some("word/write done"));

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].app, OfficeApp::Word);
        assert_eq!(calls[0].method, "write");
        assert_eq!(calls[0].http, HttpMethod::Post);
        assert_eq!(calls[0].args["text"], "Quarterly summary");
    }

    #[tokio::test]
    async fn test_schema_violation_never_reaches_server() {
        let dir = TempDir::new().unwrap();
        let client = MockAutomationClient::new();
        let tool = office_tool(OfficeApp::Excel, "excel_set_fill", client.clone());

        let missing = tool.execute(json!({ "range": "A1:B2" }), ctx(&dir)).await;
        assert!(matches!(missing, Err(ToolError::InvalidParams(_))));

        let wrong_type = tool
            .execute(json!({ "range": 12, "color": "red" }), ctx(&dir))
            .await;
        assert!(matches!(wrong_type, Err(ToolError::InvalidParams(_))));

        let bad_color = tool
            .execute(json!({ "range": "A1", "color": "not-a-color" }), ctx(&dir))
            .await;
        assert!(matches!(bad_color, Err(ToolError::InvalidParams(_))));

        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_colors_are_normalized() {
        let dir = TempDir::new().unwrap();
        let client = MockAutomationClient::new();
        let tool = office_tool(OfficeApp::Excel, "excel_set_fill", client.clone());

        tool.execute(json!({ "range": "A1:D1", "color": "ff0" }), ctx(&dir))
            .await
            .unwrap();

        assert_eq!(client.calls()[0].args["color"], "#FFFF00");
    }

    #[tokio::test]
    async fn test_sumif_is_sent_as_a_formula() {
        let dir = TempDir::new().unwrap();
        let client = MockAutomationClient::new();
        let tool = office_tool(OfficeApp::Excel, "excel_sumif", client.clone());

        tool.execute(
            json!({ "cell": "D10", "range": "A2:A9", "criteria": "North", "sum_range": "C2:C9" }),
            ctx(&dir),
        )
        .await
        .unwrap();

        let calls = client.calls();
        assert_eq!(calls[0].method, "set_formula");
        assert_eq!(
            calls[0].args,
            json!({ "cell": "D10", "formula": "=SUMIF(A2:A9,\"North\",C2:C9)" })
        );
    }

    #[tokio::test]
    async fn test_server_failure_is_returned_verbatim() {
        let dir = TempDir::new().unwrap();
        let client = MockAutomationClient::new();
        client.respond(
            "excel/set_fill",
            AutomationResponse::failed("Range 'ZZ0' is not valid"),
        );
        let tool = office_tool(OfficeApp::Excel, "excel_set_fill", client.clone());

        let result = tool
            .execute(json!({ "range": "ZZ0", "color": "#000000" }), ctx(&dir))
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Range 'ZZ0' is not valid"));
        assert_eq!(result.to_llm_string(), "Error: Range 'ZZ0' is not valid");
    }

    #[tokio::test]
    async fn test_response_fields_become_metadata() {
        let dir = TempDir::new().unwrap();
        let client = MockAutomationClient::new();
        client.respond(
            "word/read",
            AutomationResponse::ok("Read document").with_field("text", "Hello"),
        );
        let tool = office_tool(OfficeApp::Word, "word_read", client.clone());

        let result = tool.execute(json!({}), ctx(&dir)).await.unwrap();

        assert_eq!(result.metadata["text"], "Hello");
        assert!(result.result.unwrap().contains("\"text\": \"Hello\""));
        assert_eq!(client.calls()[0].http, HttpMethod::Get);
    }
}

mod group_tests {
    use super::*;

    fn catalog_with(client: Arc<MockAutomationClient>) -> ToolCatalog {
        ToolRegistryBuilder::new()
            .with_automation_client(client)
            .build()
    }

    #[tokio::test]
    async fn test_groups_start_disabled() {
        let catalog = catalog_with(MockAutomationClient::new());

        let groups = catalog.groups();
        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|g| !g.enabled));
        assert!(catalog.get_tool("word_write").is_none());
        assert!(!catalog.definitions().iter().any(|d| d.name.starts_with("excel_")));
    }

    #[tokio::test]
    async fn test_enable_launches_once() {
        let client = MockAutomationClient::new();
        let catalog = catalog_with(client.clone());

        catalog.enable_tool_group("excel").await.unwrap();
        catalog.enable_tool_group("excel").await.unwrap();

        assert_eq!(client.calls_to("launch"), 1);
        assert_eq!(client.calls()[0].app, OfficeApp::Excel);
        assert!(catalog.is_enabled("excel"));
        assert!(catalog.get_tool("excel_sumif").is_some());
        assert!(catalog.get_tool("word_write").is_none());
    }

    #[tokio::test]
    async fn test_failed_launch_leaves_group_disabled() {
        let client = MockAutomationClient::new();
        client.respond(
            "powerpoint/launch",
            AutomationResponse::failed("PowerPoint is not installed"),
        );
        let catalog = catalog_with(client.clone());

        let err = catalog.enable_tool_group("powerpoint").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("powerpoint"));
        assert!(message.contains("PowerPoint is not installed"));
        assert!(!catalog.is_enabled("powerpoint"));
        assert!(catalog.get_tool("powerpoint_add_slide").is_none());
    }

    #[tokio::test]
    async fn test_disable_hides_tools_and_reenable_launches_again() {
        let client = MockAutomationClient::new();
        let catalog = catalog_with(client.clone());

        catalog.enable_tool_group("word").await.unwrap();
        catalog.disable_tool_group("word").await;
        assert!(catalog.get_tool("word_write").is_none());

        catalog.enable_tool_group("word").await.unwrap();
        assert_eq!(client.calls_to("launch"), 2);
    }

    #[tokio::test]
    async fn test_unknown_group_is_rejected() {
        let catalog = catalog_with(MockAutomationClient::new());
        let err = catalog.enable_tool_group("outlook").await.unwrap_err();
        assert_eq!(err.to_string(), "Unknown tool group: outlook");
    }

    #[tokio::test]
    async fn test_work_request_needs_a_provider() {
        let client = MockAutomationClient::new();
        let without = office_tool_group(OfficeApp::Word, client.clone(), None);
        assert!(without.tools().get("word_work_request").is_none());

        let provider = ScriptedProvider::new(Vec::new());
        let with = office_tool_group(
            OfficeApp::Word,
            client,
            Some((provider, WorkRequestSettings::default())),
        );
        assert!(with.tools().get("word_work_request").is_some());
        assert_eq!(with.tools().len(), without.tools().len() + 1);
    }
}

mod work_request_tests {
    use super::*;

    #[tokio::test]
    async fn test_specialist_runs_with_app_tools() {
        let dir = TempDir::new().unwrap();
        let client = MockAutomationClient::new();
        let provider = ScriptedProvider::new(vec![
            tool_call("c1", "excel_write_range", json!({ "start_cell": "A1", "values": [["Total"]] })),
            tool_call("c2", "final_response", json!({ "message": "Header written to A1." })),
        ]);
        let tool = OfficeWorkRequest::new(
            OfficeApp::Excel,
            client.clone(),
            provider.clone(),
            WorkRequestSettings::default(),
        );

        let result = tool
            .execute(json!({ "instruction": "Write Total into A1" }), ctx(&dir))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.result.as_deref(), Some("Header written to A1."));
        assert_eq!(result.metadata["stop_reason"], "terminal_tool");
        assert_eq!(result.metadata["tool_calls"], 2);

        let requests = provider.requests.lock().clone();
        let tools: Vec<&str> = requests[0].tools.iter().map(|t| t.name.as_str()).collect();
        assert!(tools.contains(&"excel_write_range"));
        assert!(tools.contains(&"final_response"));
        assert!(!tools.iter().any(|t| t.starts_with("word_")));
        assert!(!tools.contains(&"excel_work_request"));
        assert!(requests[0].system_prompt.as_deref().unwrap_or("").contains("Excel"));
    }

    #[tokio::test]
    async fn test_iteration_limit_is_flagged() {
        let dir = TempDir::new().unwrap();
        let client = MockAutomationClient::new();
        let provider = ScriptedProvider::new(vec![
            tool_call("c1", "excel_get_sheets", json!({})),
            tool_call("c2", "excel_get_sheets", json!({})),
        ]);
        let tool = OfficeWorkRequest::new(
            OfficeApp::Excel,
            client,
            provider,
            WorkRequestSettings {
                max_iterations: 2,
                max_tool_result_chars: 1_000,
            },
        );

        let result = tool
            .execute(json!({ "instruction": "List sheets forever" }), ctx(&dir))
            .await
            .unwrap();

        assert!(result
            .result
            .unwrap()
            .starts_with("[Excel specialist stopped after 2 iterations without finishing]"));
        assert_eq!(result.metadata["stop_reason"], "iteration_limit");
    }

    #[tokio::test]
    async fn test_empty_instruction_is_rejected() {
        let dir = TempDir::new().unwrap();
        let tool = OfficeWorkRequest::new(
            OfficeApp::Word,
            MockAutomationClient::new(),
            ScriptedProvider::new(Vec::new()),
            WorkRequestSettings::default(),
        );

        let result = tool.execute(json!({ "instruction": "  " }), ctx(&dir)).await;
        assert!(matches!(result, Err(ToolError::InvalidParams(_))));
    }

    #[tokio::test]
    async fn test_provider_failure_becomes_tool_error() {
        let dir = TempDir::new().unwrap();
        let tool = OfficeWorkRequest::new(
            OfficeApp::PowerPoint,
            MockAutomationClient::new(),
            ScriptedProvider::new(Vec::new()),
            WorkRequestSettings::default(),
        );

        let result = tool
            .execute(json!({ "instruction": "Add a title slide" }), ctx(&dir))
            .await;

        match result {
            Err(ToolError::ExecutionFailed(msg)) => {
                assert!(msg.starts_with("PowerPoint work request failed"), "{}", msg)
            }
            other => panic!("expected ExecutionFailed, got {:?}", other.map(|r| r.result)),
        }
    }
}
