//! Tool catalog and registry builder
//!
//! Core tools (filesystem, shell, interaction, task) are always visible.
//! Office tools live in groups that are enabled on demand; enabling a group
//! runs its lifecycle hook (for Office, launching the application) and only
//! then makes its tools visible to the LLM.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{AgentConfig, ShellSettings};
use crate::error::Result;
use crate::provider::LlmProvider;
use crate::tools::filesystem::{CreateFile, EditFile, FindFiles, ListFiles, ReadFile, SearchContent};
use crate::tools::interaction::{AskToUser, FinalResponse, TellToUser};
use crate::tools::office::{office_tool_group, AutomationClient, OfficeApp, WorkRequestSettings};
use crate::tools::shell::{
    BackgroundList, BackgroundRead, BackgroundStart, BackgroundStop, BackgroundTaskManager,
    ExecuteCommand, GetWorkingDirectory, SetWorkingDirectory,
};
use crate::tools::task::WriteTodos;
use crate::tools::{Tool, ToolDefinition, ToolRegistry};

/// Side effects tied to enabling or disabling a tool group
#[async_trait]
pub trait GroupLifecycle: Send + Sync {
    /// Runs before the group becomes visible; an error keeps it disabled
    async fn on_enable(&self) -> Result<()>;

    /// Runs after the group has been hidden
    async fn on_disable(&self) -> Result<()> {
        Ok(())
    }
}

/// A named set of tools that can be switched on and off together
pub struct ToolGroup {
    pub id: String,
    pub name: String,
    pub description: String,
    tools: ToolRegistry,
    lifecycle: Option<Arc<dyn GroupLifecycle>>,
}

impl ToolGroup {
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            tools: ToolRegistry::new(),
            lifecycle: None,
        }
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.register(tool);
        self
    }

    pub fn with_lifecycle(mut self, lifecycle: Arc<dyn GroupLifecycle>) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.register(tool);
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }
}

/// Summary of a group for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub tool_count: usize,
}

/// Why a group could not be enabled
#[derive(Debug, Error)]
pub enum GroupError {
    #[error("Unknown tool group: {0}")]
    Unknown(String),

    #[error("Failed to enable tool group '{id}': {reason}")]
    EnableFailed { id: String, reason: String },
}

/// Core tools plus switchable groups
pub struct ToolCatalog {
    core: ToolRegistry,
    groups: HashMap<String, ToolGroup>,
    enabled: RwLock<HashSet<String>>,
    // Serializes enable/disable so a lifecycle hook never runs twice concurrently
    toggle_lock: tokio::sync::Mutex<()>,
}

impl From<ToolRegistry> for ToolCatalog {
    fn from(core: ToolRegistry) -> Self {
        Self {
            core,
            groups: HashMap::new(),
            enabled: RwLock::new(HashSet::new()),
            toggle_lock: tokio::sync::Mutex::new(()),
        }
    }
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::from(ToolRegistry::new())
    }

    /// Add a group (initially disabled); replaces any group with the same id
    pub fn add_group(&mut self, group: ToolGroup) {
        self.enabled.get_mut().remove(&group.id);
        self.groups.insert(group.id.clone(), group);
    }

    pub fn core(&self) -> &ToolRegistry {
        &self.core
    }

    /// Enable a group, running its `on_enable` hook the first time
    pub async fn enable_tool_group(&self, id: &str) -> std::result::Result<(), GroupError> {
        let group = self
            .groups
            .get(id)
            .ok_or_else(|| GroupError::Unknown(id.to_string()))?;

        let _guard = self.toggle_lock.lock().await;

        if self.enabled.read().contains(id) {
            tracing::debug!(group = %id, "Tool group already enabled");
            return Ok(());
        }

        if let Some(lifecycle) = &group.lifecycle {
            if let Err(e) = lifecycle.on_enable().await {
                tracing::warn!(group = %id, error = %e, "Tool group failed to enable");
                return Err(GroupError::EnableFailed {
                    id: id.to_string(),
                    reason: e.to_string(),
                });
            }
        }

        self.enabled.write().insert(id.to_string());
        tracing::info!(group = %id, tools = group.tools.len(), "Tool group enabled");
        Ok(())
    }

    /// Disable a group; unknown or already disabled groups are ignored
    pub async fn disable_tool_group(&self, id: &str) {
        let Some(group) = self.groups.get(id) else {
            return;
        };

        let _guard = self.toggle_lock.lock().await;

        if !self.enabled.write().remove(id) {
            return;
        }

        if let Some(lifecycle) = &group.lifecycle {
            if let Err(e) = lifecycle.on_disable().await {
                tracing::warn!(group = %id, error = %e, "Tool group disable hook failed");
            }
        }
        tracing::info!(group = %id, "Tool group disabled");
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        self.enabled.read().contains(id)
    }

    /// Look up a tool among core tools and enabled groups
    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        if let Some(tool) = self.core.get(name) {
            return Some(tool);
        }

        let enabled = self.enabled.read();
        let found = enabled
            .iter()
            .filter_map(|id| self.groups.get(id))
            .find_map(|group| group.tools.get(name));
        found
    }

    /// Definitions visible to the LLM, sorted by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs = self.core.list();
        {
            let enabled = self.enabled.read();
            for group in enabled.iter().filter_map(|id| self.groups.get(id)) {
                defs.extend(group.tools.list());
            }
        }
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs.dedup_by(|a, b| a.name == b.name);
        defs
    }

    /// Definitions of one group's tools, whether or not it is enabled
    pub fn group_definitions(&self, id: &str) -> Option<Vec<ToolDefinition>> {
        self.groups.get(id).map(|g| {
            let mut defs = g.tools.list();
            defs.sort_by(|a, b| a.name.cmp(&b.name));
            defs
        })
    }

    /// Every group with its current state, sorted by id
    pub fn groups(&self) -> Vec<GroupInfo> {
        let enabled = self.enabled.read();
        let mut infos: Vec<GroupInfo> = self
            .groups
            .values()
            .map(|g| GroupInfo {
                id: g.id.clone(),
                name: g.name.clone(),
                description: g.description.clone(),
                enabled: enabled.contains(&g.id),
                tool_count: g.tools.len(),
            })
            .collect();
        infos.sort_by(|a, b| a.id.cmp(&b.id));
        infos
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating a tool catalog with customizable options
pub struct ToolRegistryBuilder {
    include_filesystem: bool,
    include_shell: bool,
    include_interaction: bool,
    include_task: bool,
    shell_settings: ShellSettings,
    agent_config: AgentConfig,
    background: Option<Arc<BackgroundTaskManager>>,
    automation: Option<Arc<dyn AutomationClient>>,
    provider: Option<Arc<dyn LlmProvider>>,
}

impl Default for ToolRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistryBuilder {
    /// Create a builder with every core category enabled
    pub fn new() -> Self {
        Self {
            include_filesystem: true,
            include_shell: true,
            include_interaction: true,
            include_task: true,
            shell_settings: ShellSettings::default(),
            agent_config: AgentConfig::default(),
            background: None,
            automation: None,
            provider: None,
        }
    }

    /// Enable/disable filesystem tools
    pub fn with_filesystem(mut self, enabled: bool) -> Self {
        self.include_filesystem = enabled;
        self
    }

    /// Enable/disable shell tools
    pub fn with_shell(mut self, enabled: bool) -> Self {
        self.include_shell = enabled;
        self
    }

    /// Enable/disable interaction tools (ask/tell/final_response)
    pub fn with_interaction(mut self, enabled: bool) -> Self {
        self.include_interaction = enabled;
        self
    }

    /// Enable/disable the TODO tool
    pub fn with_task(mut self, enabled: bool) -> Self {
        self.include_task = enabled;
        self
    }

    pub fn with_shell_settings(mut self, settings: ShellSettings) -> Self {
        self.shell_settings = settings;
        self
    }

    pub fn with_agent_config(mut self, config: AgentConfig) -> Self {
        self.agent_config = config;
        self
    }

    /// Share an existing background task manager (so the caller can stop tasks on exit)
    pub fn with_background_manager(mut self, manager: Arc<BackgroundTaskManager>) -> Self {
        self.background = Some(manager);
        self
    }

    /// Add the Word, Excel and PowerPoint groups backed by this client
    pub fn with_automation_client(mut self, client: Arc<dyn AutomationClient>) -> Self {
        self.automation = Some(client);
        self
    }

    /// Add `<app>_work_request` delegators to each Office group
    pub fn with_provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Build the catalog with the configured options
    pub fn build(self) -> ToolCatalog {
        let mut registry = ToolRegistry::new();

        if self.include_filesystem {
            registry.register(Arc::new(ReadFile));
            registry.register(Arc::new(CreateFile));
            registry.register(Arc::new(EditFile));
            registry.register(Arc::new(ListFiles));
            registry.register(Arc::new(FindFiles));
            registry.register(Arc::new(SearchContent));
        }

        if self.include_shell {
            let manager = self
                .background
                .clone()
                .unwrap_or_else(|| Arc::new(BackgroundTaskManager::new(&self.shell_settings)));
            registry.register(Arc::new(ExecuteCommand::new(self.shell_settings.timeout_ms)));
            registry.register(Arc::new(BackgroundStart::new(manager.clone())));
            registry.register(Arc::new(BackgroundRead::new(manager.clone())));
            registry.register(Arc::new(BackgroundStop::new(manager.clone())));
            registry.register(Arc::new(BackgroundList::new(manager)));
            registry.register(Arc::new(SetWorkingDirectory));
            registry.register(Arc::new(GetWorkingDirectory));
        }

        if self.include_interaction {
            registry.register(Arc::new(AskToUser));
            registry.register(Arc::new(TellToUser));
            registry.register(Arc::new(FinalResponse));
        }

        if self.include_task {
            registry.register(Arc::new(WriteTodos));
        }

        let mut catalog = ToolCatalog::from(registry);

        if let Some(client) = self.automation {
            let delegation = self.provider.map(|provider| {
                (
                    provider,
                    WorkRequestSettings {
                        max_iterations: self.agent_config.sub_agent_max_iterations,
                        max_tool_result_chars: self.agent_config.max_tool_result_chars,
                    },
                )
            });

            for app in OfficeApp::ALL {
                catalog.add_group(office_tool_group(app, client.clone(), delegation.clone()));
            }
        }

        tracing::debug!(
            core_tools = catalog.core.len(),
            groups = catalog.groups.len(),
            "Tool catalog built"
        );
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLifecycle {
        enables: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl GroupLifecycle for CountingLifecycle {
        async fn on_enable(&self) -> Result<()> {
            self.enables.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(Error::Automation("launch refused".into()))
            } else {
                Ok(())
            }
        }
    }

    fn catalog_with(fail: bool) -> (ToolCatalog, Arc<CountingLifecycle>) {
        let lifecycle = Arc::new(CountingLifecycle {
            enables: AtomicUsize::new(0),
            fail,
        });
        let mut catalog = ToolCatalog::new();
        catalog.add_group(
            ToolGroup::new("demo", "Demo", "Test group")
                .with_tool(Arc::new(TellToUser))
                .with_lifecycle(lifecycle.clone()),
        );
        (catalog, lifecycle)
    }

    #[test]
    fn test_builder_registers_core_tools() {
        let catalog = ToolRegistryBuilder::new().build();
        for name in [
            "read_file", "create_file", "edit_file", "list_files", "find_files", "search_content",
            "powershell", "powershell_background_start", "powershell_background_read",
            "powershell_background_stop", "powershell_background_list", "set_working_directory",
            "get_working_directory", "ask_to_user", "tell_to_user", "final_response", "write_todos",
        ] {
            assert!(catalog.get_tool(name).is_some(), "missing {}", name);
        }
        assert!(catalog.groups().is_empty());
    }

    #[test]
    fn test_builder_can_disable_categories() {
        let catalog = ToolRegistryBuilder::new()
            .with_filesystem(false)
            .with_shell(false)
            .build();
        assert!(catalog.get_tool("read_file").is_none());
        assert!(catalog.get_tool("powershell").is_none());
        assert!(catalog.get_tool("final_response").is_some());
    }

    #[tokio::test]
    async fn test_enable_is_idempotent() {
        let (catalog, lifecycle) = catalog_with(false);
        assert!(catalog.get_tool("tell_to_user").is_none());

        catalog.enable_tool_group("demo").await.unwrap();
        catalog.enable_tool_group("demo").await.unwrap();

        assert_eq!(lifecycle.enables.load(Ordering::SeqCst), 1);
        assert!(catalog.get_tool("tell_to_user").is_some());
        assert!(catalog.groups()[0].enabled);
    }

    #[tokio::test]
    async fn test_failed_enable_leaves_group_disabled() {
        let (catalog, _) = catalog_with(true);
        let err = catalog.enable_tool_group("demo").await.unwrap_err();
        assert!(err.to_string().contains("launch refused"));
        assert!(!catalog.is_enabled("demo"));
        assert!(catalog.get_tool("tell_to_user").is_none());
    }

    #[tokio::test]
    async fn test_unknown_group() {
        let catalog = ToolCatalog::new();
        let err = catalog.enable_tool_group("outlook").await.unwrap_err();
        assert_eq!(err.to_string(), "Unknown tool group: outlook");
        catalog.disable_tool_group("outlook").await;
    }

    #[tokio::test]
    async fn test_disable_hides_tools() {
        let (catalog, _) = catalog_with(false);
        catalog.enable_tool_group("demo").await.unwrap();
        catalog.disable_tool_group("demo").await;
        catalog.disable_tool_group("demo").await;
        assert!(catalog.get_tool("tell_to_user").is_none());
        assert!(catalog.definitions().is_empty());
    }
}
