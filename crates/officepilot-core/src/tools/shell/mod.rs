//! Shell tools for command execution

mod background;
mod cwd;
mod execute;
mod safety;

pub use background::{
    BackgroundList, BackgroundRead, BackgroundStart, BackgroundStop, BackgroundTask,
    BackgroundTaskManager, StopOutcome, TaskSnapshot, TaskSummary,
};
pub use cwd::{GetWorkingDirectory, SetWorkingDirectory};
pub use execute::{combine_output, ExecuteCommand, NAME as POWERSHELL_TOOL_NAME};
pub use safety::CommandPolicy;
