//! OfficePilot CLI - drive Word, Excel and PowerPoint with an LLM
//!
//! The CLI wires the core pieces together: configuration, the genai
//! provider, the HTTP automation client, the tool catalog and the agent
//! loop. Questions from the agent are answered on the terminal.

mod interaction;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use officepilot_core::agent::{StopReason, SubAgent, SubAgentConfig};
use officepilot_core::config::{Config, ConfigManager, ProviderConfig};
use officepilot_core::provider::{GenAIProvider, LlmProvider};
use officepilot_core::tools::office::{AutomationClient, HttpAutomationClient, OfficeApp};
use officepilot_core::tools::shell::BackgroundTaskManager;
use officepilot_core::{
    file_event_channel, interaction_channel, AgentContext, SystemPrompt, ToolCatalog,
    ToolExecutionContext, ToolRegistryBuilder, TodoList,
};

use interaction::{spawn_console_interaction, spawn_file_event_printer};

#[derive(Parser)]
#[command(name = "officepilot")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "LLM agent for Word, Excel, PowerPoint and PowerShell", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Working directory (defaults to config, then the current directory)
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// LLM provider (anthropic, openai, gemini, ...) - defaults to config setting
    #[arg(short, long, global = true)]
    provider: Option<String>,

    /// Model to use (defaults to the provider's configured model)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Office groups to enable at start (word, excel, powerpoint)
    #[arg(short, long, global = true, value_delimiter = ',')]
    enable: Vec<String>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the agent on one instruction
    Run {
        /// What the agent should do
        instruction: String,
    },

    /// Send an instruction straight to one application's specialist
    Office {
        /// word, excel or powerpoint
        app: OfficeApp,
        /// What the specialist should do
        instruction: String,
    },

    /// Show available tools
    Tools,

    /// Show the effective configuration
    Config,

    /// Check that the Office automation server is reachable
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new().context("Failed to load configuration")?;
    let _log_guard = init_logging(cli.verbose, &config_manager.config().general.log_level, cli.log_file.as_deref())?;

    let workspace = resolve_workspace(cli.workspace.as_deref(), config_manager.config())?;

    match &cli.command {
        Commands::Run { instruction } => run_agent(&cli, &config_manager, &workspace, instruction).await,
        Commands::Office { app, instruction } => {
            run_office(&cli, &config_manager, &workspace, *app, instruction).await
        }
        Commands::Tools => show_tools(&cli, &config_manager),
        Commands::Config => show_config(&config_manager, &workspace),
        Commands::Health => check_health(config_manager.config()).await,
    }
}

/// Set up tracing; the returned guard flushes the file writer on drop
fn init_logging(
    verbose: bool,
    configured_level: &str,
    log_file: Option<&Path>,
) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    // Use warn level by default to avoid interfering with the terminal prompts
    let default_filter = if verbose {
        "info,officepilot_core=debug".to_string()
    } else {
        configured_level.to_string()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("Invalid log file path: {}", path.display()))?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}

fn resolve_workspace(cli_workspace: Option<&Path>, config: &Config) -> anyhow::Result<PathBuf> {
    let requested = match cli_workspace.or(config.general.working_dir.as_deref()) {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };

    // Use dunce::canonicalize to avoid UNC path prefix on Windows (\\?\)
    dunce::canonicalize(&requested)
        .with_context(|| format!("Working directory does not exist: {}", requested.display()))
}

fn build_provider(cli: &Cli, config_manager: &ConfigManager) -> anyhow::Result<Arc<dyn LlmProvider>> {
    let config = config_manager.config();
    let name = cli
        .provider
        .clone()
        .unwrap_or_else(|| config_manager.default_provider().to_string());

    let mut provider_config = config.get_provider(&name).cloned().unwrap_or_else(|| ProviderConfig {
        provider_type: name.clone(),
        api_key: None,
        api_key_env: name
            .parse::<officepilot_core::ProviderType>()
            .ok()
            .and_then(|t| t.api_key_env())
            .map(str::to_string),
        model: String::new(),
    });
    if let Some(model) = &cli.model {
        provider_config.model = model.clone();
    }

    let provider = GenAIProvider::from_config(&provider_config)
        .with_context(|| format!("Cannot create provider '{}'", name))?;
    tracing::info!(provider = %provider.provider_type(), model = %provider.model(), "Provider ready");
    Ok(Arc::new(provider))
}

fn build_automation_client(config: &Config) -> anyhow::Result<Arc<dyn AutomationClient>> {
    let client = HttpAutomationClient::new(
        &config.office.server_url,
        Duration::from_secs(config.office.timeout_secs),
    )
    .context("Invalid Office server URL")?;
    Ok(Arc::new(client))
}

fn build_catalog(
    config: &Config,
    client: Arc<dyn AutomationClient>,
    provider: Option<Arc<dyn LlmProvider>>,
    background: Arc<BackgroundTaskManager>,
) -> ToolCatalog {
    let mut builder = ToolRegistryBuilder::new()
        .with_shell_settings(config.shell.clone())
        .with_agent_config(config.agent.clone())
        .with_background_manager(background)
        .with_automation_client(client);
    if let Some(provider) = provider {
        builder = builder.with_provider(provider);
    }
    builder.build()
}

/// Enable the requested groups; failures are reported and skipped
async fn enable_groups(catalog: &ToolCatalog, cli: &Cli, config: &Config) -> Vec<OfficeApp> {
    let mut requested: Vec<String> = config.office.enabled_groups.clone();
    requested.extend(cli.enable.iter().map(|g| g.to_lowercase()));
    requested.sort();
    requested.dedup();

    let mut enabled = Vec::new();
    for id in requested {
        match catalog.enable_tool_group(&id).await {
            Ok(()) => {
                if let Ok(app) = id.parse::<OfficeApp>() {
                    enabled.push(app);
                }
            }
            Err(e) => eprintln!("{}", style(format!("Warning: {}", e)).yellow()),
        }
    }
    enabled
}

async fn run_agent(
    cli: &Cli,
    config_manager: &ConfigManager,
    workspace: &Path,
    instruction: &str,
) -> anyhow::Result<()> {
    let config = config_manager.config();
    let provider = build_provider(cli, config_manager)?;
    let background = Arc::new(BackgroundTaskManager::new(&config.shell));
    let catalog = Arc::new(build_catalog(
        config,
        build_automation_client(config)?,
        Some(provider.clone()),
        background.clone(),
    ));
    let enabled_apps = enable_groups(&catalog, cli, config).await;

    let (interaction_tx, interaction_rx) = interaction_channel();
    let (file_tx, file_rx) = file_event_channel();
    let context = AgentContext::new(workspace)
        .with_todos(TodoList::default())
        .with_interaction(interaction_tx)
        .with_file_events(file_tx);

    let console = spawn_console_interaction(interaction_rx);
    let printer = spawn_file_event_printer(file_rx);

    let system_prompt = SystemPrompt::new()
        .with_workspace_context(workspace)
        .with_enabled_apps(&enabled_apps)
        .build();

    let agent = SubAgent::new(provider, catalog, system_prompt, context).with_config(
        SubAgentConfig::default()
            .with_max_iterations(config.agent.max_iterations)
            .with_max_tool_result_chars(config.agent.max_tool_result_chars),
    );

    let outcome = agent.run(instruction).await;

    // Dropping the agent closes the channels so the printers finish
    drop(agent);
    let delivered = console.await.unwrap_or(None);
    let _ = printer.await;

    let stopped = background.stop_all();
    if stopped > 0 {
        tracing::info!(count = stopped, "Stopped background tasks on exit");
    }

    let outcome = outcome.context("Agent run failed")?;
    match &outcome.stop_reason {
        StopReason::TerminalTool(_) if delivered.is_some() => {}
        StopReason::IterationLimit => {
            println!(
                "{}",
                style(format!("Stopped after {} iterations without a final answer", outcome.iterations)).yellow()
            );
            if !outcome.response.is_empty() {
                println!("{}", outcome.response);
            }
        }
        _ => println!("{}", outcome.response),
    }
    println!(
        "{}",
        style(format!("{} iterations, {} tool calls", outcome.iterations, outcome.tool_calls)).dim()
    );
    Ok(())
}

async fn run_office(
    cli: &Cli,
    config_manager: &ConfigManager,
    workspace: &Path,
    app: OfficeApp,
    instruction: &str,
) -> anyhow::Result<()> {
    let config = config_manager.config();
    let provider = build_provider(cli, config_manager)?;
    let background = Arc::new(BackgroundTaskManager::new(&config.shell));
    let catalog = build_catalog(config, build_automation_client(config)?, Some(provider), background);

    catalog
        .enable_tool_group(app.id())
        .await
        .with_context(|| format!("Cannot start {}", app.display_name()))?;

    let tool_name = format!("{}_work_request", app.id());
    let Some(tool) = catalog.get_tool(&tool_name) else {
        bail!("Tool {} is not available", tool_name);
    };

    let (file_tx, file_rx) = file_event_channel();
    let printer = spawn_file_event_printer(file_rx);
    let context = AgentContext::new(workspace).with_file_events(file_tx);

    let result = tool
        .execute(
            serde_json::json!({ "instruction": instruction }),
            ToolExecutionContext::standalone(&tool_name, context),
        )
        .await;
    let _ = printer.await;

    let result = result.context("Work request failed")?;
    if result.success {
        println!("{}", result.result.unwrap_or_default());
        Ok(())
    } else {
        bail!(result.error.unwrap_or_else(|| "Work request failed".to_string()))
    }
}

fn show_tools(cli: &Cli, config_manager: &ConfigManager) -> anyhow::Result<()> {
    let config = config_manager.config();
    // Work-request tools are listed only when a provider can be built
    let provider = build_provider(cli, config_manager).ok();
    let catalog = build_catalog(
        config,
        build_automation_client(config)?,
        provider,
        Arc::new(BackgroundTaskManager::new(&config.shell)),
    );

    println!("{}", style("Core Tools:").bold());
    for def in catalog.definitions() {
        println!("  {} - {}", style(&def.name).cyan(), first_line(&def.description));
    }

    for group in catalog.groups() {
        println!();
        println!(
            "{} {}",
            style(format!("{} ({} tools)", group.name, group.tool_count)).bold(),
            style(format!("--enable {}", group.id)).dim()
        );
        for def in catalog.group_definitions(&group.id).unwrap_or_default() {
            println!("  {} - {}", style(&def.name).cyan(), first_line(&def.description));
        }
    }
    Ok(())
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

fn show_config(config_manager: &ConfigManager, workspace: &Path) -> anyhow::Result<()> {
    println!("{}", style("Configuration:").bold());
    println!("  Config file: {}", style(config_manager.path().display()).dim());
    println!("  Working directory: {}", style(workspace.display()).green());
    println!();

    let mut config = config_manager.config().clone();
    for provider in config.providers.values_mut() {
        if provider.api_key.is_some() {
            provider.api_key = Some("********".to_string());
        }
    }
    let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
    println!("{}", rendered);
    Ok(())
}

async fn check_health(config: &Config) -> anyhow::Result<()> {
    let client = build_automation_client(config)?;
    match client.health().await {
        Ok(response) if response.success => {
            println!(
                "{} Office server at {} is up",
                style("✓").green(),
                config.office.server_url
            );
            Ok(())
        }
        Ok(response) => bail!("Office server reported a problem: {}", response.failure_text()),
        Err(e) => bail!("{}", e),
    }
}
