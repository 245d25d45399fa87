//! System prompt management
//!
//! Single source of truth for the main agent prompt and the per-application
//! prompts used by the `*_work_request` sub-agents.

use crate::tools::office::OfficeApp;

/// System prompt configuration and generation
#[derive(Debug, Clone)]
pub struct SystemPrompt {
    /// Base system prompt
    base: String,
    /// Additional context (e.g., workspace info, enabled groups)
    context: Vec<String>,
}

impl Default for SystemPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemPrompt {
    /// Create a new system prompt with the default content
    pub fn new() -> Self {
        Self::with_base(DEFAULT_SYSTEM_PROMPT)
    }

    /// Create with custom base prompt
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            context: Vec::new(),
        }
    }

    /// Prompt for an application sub-agent
    pub fn for_app(app: OfficeApp) -> Self {
        let specific = match app {
            OfficeApp::Word => WORD_GUIDELINES,
            OfficeApp::Excel => EXCEL_GUIDELINES,
            OfficeApp::PowerPoint => POWERPOINT_GUIDELINES,
        };
        Self::with_base(format!(
            "You are an automation specialist for {}. You receive one instruction from a \
             coordinating agent and carry it out with the {}_* tools.\n\n{}\n\n{}",
            app.display_name(),
            app.id(),
            specific,
            SUB_AGENT_RULES
        ))
    }

    /// Add workspace context to the prompt
    pub fn with_workspace_context(mut self, workspace_path: &std::path::Path) -> Self {
        self.context.push(format!(
            "## Current Working Directory\nRelative paths resolve against: {}",
            workspace_path.display()
        ));
        self
    }

    /// List the Office applications whose tools are currently enabled
    pub fn with_enabled_apps(mut self, apps: &[OfficeApp]) -> Self {
        if !apps.is_empty() {
            let names: Vec<&str> = apps.iter().map(|a| a.display_name()).collect();
            self.context.push(format!(
                "## Office Applications\nTools are enabled for: {}. Prefer the <app>_work_request \
                 tool for multi-step document work.",
                names.join(", ")
            ));
        }
        self
    }

    /// Add custom context
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Build the final system prompt
    pub fn build(&self) -> String {
        if self.context.is_empty() {
            return self.base.clone();
        }
        format!("{}\n\n{}", self.base, self.context.join("\n\n"))
    }

    /// Get the base prompt without context
    pub fn base(&self) -> &str {
        &self.base
    }
}

/// Main agent prompt
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are OfficePilot, a desktop assistant that works with Microsoft Word, Excel and PowerPoint, the file system, and a PowerShell terminal on the user's machine.

## Available Tools

### Planning
- write_todos: Record the steps of a multi-step task and update their status as you go

### User Interaction
- ask_to_user: Ask a multiple-choice question (2 to 4 options) when a decision is genuinely the user's
- tell_to_user: Send a short progress update
- final_response: Deliver your final answer. Fails while any TODO item is still pending or in progress

### Files
- read_file, create_file, edit_file: Read, create, and make exact-match edits to text files
- list_files, find_files, search_content: Explore directories, glob for files, regex-search contents

### Shell
- powershell: Run a command and wait for it (with a timeout)
- powershell_background_start / _read / _stop / _list: Long-running commands such as servers or builds
- set_working_directory / get_working_directory: Change or show where relative paths resolve

### Office
- <app>_work_request: Hand a self-contained document task to a Word, Excel or PowerPoint specialist
- <app>_<action>: Direct automation calls for quick single-step operations

## Workflow

1. For anything with more than two steps, call write_todos first and keep it current.
2. Mark each item completed or failed as soon as you know the outcome.
3. Prefer one well-specified work request over many direct Office calls.
4. When everything is done, call final_response with a concise summary of what changed."#;

const SUB_AGENT_RULES: &str = r#"## Rules
- Work only with the tools you have been given.
- Call <app>_launch only if a call reports that the application is not running.
- If a call fails, read the error, fix the arguments, and retry once before giving up.
- Finish by calling final_response with a short report of what you did, including file paths and cell/slide references."#;

const WORD_GUIDELINES: &str = r#"## Word
- Text is inserted at the cursor; use word_select_all or word_find_replace to target existing text.
- Apply formatting (word_set_font, word_set_paragraph, word_set_style) to the current selection.
- Use word_insert_break with type "page" between major sections."#;

const EXCEL_GUIDELINES: &str = r#"## Excel
- Address cells in A1 notation. Write tabular data with excel_write_range in one call.
- Use excel_sumif, excel_countif and excel_average for those formulas; excel_set_formula for anything else.
- Colors accept #RRGGBB or basic color names."#;

const POWERPOINT_GUIDELINES: &str = r#"## PowerPoint
- Slides and shapes are 1-based. Call powerpoint_read_slide to discover shape indexes before editing text.
- Layout 1 is a title slide, 2 is title and content, 12 is blank.
- Positions and sizes are in points (a standard slide is 960 x 540)."#;
