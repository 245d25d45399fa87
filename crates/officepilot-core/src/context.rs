//! Per-session state passed explicitly into every tool call
//!
//! `AgentContext` owns everything a tool may need beyond its arguments:
//! the working directory, the TODO list checked by `final_response`,
//! the channel to whatever surface is talking to the user, and the
//! channel to a diff viewer.
//!
//! Interaction requests travel over an unbounded mpsc channel. Requests
//! that need an answer carry a oneshot sender; the tool awaits its own
//! receiver, so the front-end can serve requests one at a time.

use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use crate::events::{FileEvent, FileEventSender};
use crate::tools::task::TodoList;

/// Request sent from interaction tools to the user surface
#[derive(Debug)]
pub enum InteractionRequest {
    /// Ask a multiple-choice question and wait for the chosen option
    Ask {
        request_id: String,
        question: String,
        options: Vec<String>,
        response_tx: oneshot::Sender<String>,
    },
    /// One-way progress message
    Tell { message: String },
    /// The agent's final answer for this session
    FinalResponse { message: String },
}

/// Sender half of the interaction channel
pub type InteractionSender = mpsc::UnboundedSender<InteractionRequest>;

/// Receiver half of the interaction channel
pub type InteractionReceiver = mpsc::UnboundedReceiver<InteractionRequest>;

/// Create a new interaction channel
pub fn interaction_channel() -> (InteractionSender, InteractionReceiver) {
    mpsc::unbounded_channel()
}

/// Session state shared by the agent loop and its tools
#[derive(Clone)]
pub struct AgentContext {
    pub session_id: String,
    working_dir: Arc<RwLock<PathBuf>>,
    todos: Option<TodoList>,
    interaction: Option<InteractionSender>,
    file_events: Option<FileEventSender>,
}

impl AgentContext {
    /// Create a context rooted at `working_dir` with no channels attached
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            working_dir: Arc::new(RwLock::new(working_dir.into())),
            todos: None,
            interaction: None,
            file_events: None,
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn with_todos(mut self, todos: TodoList) -> Self {
        self.todos = Some(todos);
        self
    }

    pub fn with_interaction(mut self, tx: InteractionSender) -> Self {
        self.interaction = Some(tx);
        self
    }

    pub fn with_file_events(mut self, tx: FileEventSender) -> Self {
        self.file_events = Some(tx);
        self
    }

    /// Current working directory
    pub fn working_dir(&self) -> PathBuf {
        self.working_dir.read().clone()
    }

    /// Replace the working directory for every clone of this context
    pub fn set_working_dir(&self, dir: PathBuf) {
        *self.working_dir.write() = dir;
    }

    /// Resolve a user-supplied path against the working directory
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir().join(path)
        }
    }

    pub fn todos(&self) -> Option<&TodoList> {
        self.todos.as_ref()
    }

    pub fn interaction(&self) -> Option<&InteractionSender> {
        self.interaction.as_ref()
    }

    /// Emit a file event; dropped silently if no viewer is listening
    pub fn emit_file_event(&self, event: FileEvent) {
        if let Some(tx) = &self.file_events {
            let _ = tx.send(event);
        }
    }

    /// Context for a nested sub-agent
    ///
    /// Shares the working directory and file events. The sub-agent gets
    /// neither the parent's TODO list nor its interaction channel, so its
    /// `final_response` is never gated on the parent's plan.
    pub fn for_sub_agent(&self) -> Self {
        Self {
            session_id: format!("{}-sub-{}", self.session_id, short_id()),
            working_dir: Arc::clone(&self.working_dir),
            todos: None,
            interaction: None,
            file_events: self.file_events.clone(),
        }
    }
}

fn short_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}
