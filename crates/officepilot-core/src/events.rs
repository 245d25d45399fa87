//! File change notifications for a diff viewer

use serde::Serialize;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// A file written by a tool
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileEvent {
    Created {
        path: PathBuf,
        content: String,
    },
    Edited {
        path: PathBuf,
        old_content: String,
        new_content: String,
    },
}

impl FileEvent {
    pub fn path(&self) -> &PathBuf {
        match self {
            FileEvent::Created { path, .. } | FileEvent::Edited { path, .. } => path,
        }
    }
}

pub type FileEventSender = mpsc::UnboundedSender<FileEvent>;
pub type FileEventReceiver = mpsc::UnboundedReceiver<FileEvent>;

pub fn file_event_channel() -> (FileEventSender, FileEventReceiver) {
    mpsc::unbounded_channel()
}
