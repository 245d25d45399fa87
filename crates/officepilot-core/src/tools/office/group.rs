//! Office tool groups: one per application, launched on enable

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::orchestration::{GroupLifecycle, ToolGroup};
use crate::provider::LlmProvider;

use super::catalog::specs_for;
use super::client::AutomationClient;
use super::tool::OfficeTool;
use super::work_request::{OfficeWorkRequest, WorkRequestSettings};
use super::{HttpMethod, OfficeApp};

/// Launches the application when its group is enabled
pub struct OfficeGroupLifecycle {
    app: OfficeApp,
    client: Arc<dyn AutomationClient>,
}

impl OfficeGroupLifecycle {
    pub fn new(app: OfficeApp, client: Arc<dyn AutomationClient>) -> Self {
        Self { app, client }
    }
}

#[async_trait]
impl GroupLifecycle for OfficeGroupLifecycle {
    async fn on_enable(&self) -> Result<()> {
        tracing::info!(app = %self.app, "Launching {}", self.app.display_name());

        let response = self
            .client
            .call(self.app, "launch", HttpMethod::Post, json!({}))
            .await?;

        if response.success {
            Ok(())
        } else {
            Err(Error::Automation(format!(
                "Could not launch {}: {}",
                self.app.display_name(),
                response.failure_text()
            )))
        }
    }
}

/// Build the tool group for one application
///
/// With a provider, the group also carries `<app>_work_request`.
pub fn office_tool_group(
    app: OfficeApp,
    client: Arc<dyn AutomationClient>,
    delegation: Option<(Arc<dyn LlmProvider>, WorkRequestSettings)>,
) -> ToolGroup {
    let mut group = ToolGroup::new(
        app.id(),
        app.display_name(),
        format!("{} automation through the local Office server", app.display_name()),
    )
    .with_lifecycle(Arc::new(OfficeGroupLifecycle::new(app, client.clone())));

    for spec in specs_for(app) {
        group.register(Arc::new(OfficeTool::new(spec, client.clone())));
    }

    if let Some((provider, settings)) = delegation {
        group.register(Arc::new(OfficeWorkRequest::new(app, client, provider, settings)));
    }

    group
}
