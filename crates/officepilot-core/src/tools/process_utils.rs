//! Process utility functions for cross-platform command execution
//!
//! Commands run through PowerShell on Windows with the console window
//! hidden, and through `sh -c` everywhere else.

use tokio::process::Command;

/// Windows creation flag to hide the console window
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x08000000;

/// Configure a Command to hide the console window on Windows
#[cfg(windows)]
pub fn hide_console_window(cmd: &mut Command) {
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
pub fn hide_console_window(_cmd: &mut Command) {}

/// Name of the shell commands are handed to on this platform
pub fn shell_name() -> &'static str {
    if cfg!(windows) { "powershell" } else { "sh" }
}

/// Create a shell command configured for the current platform
///
/// The environment is inherited; callers set the working directory and pipes.
pub fn shell_command(command: &str) -> Command {
    #[cfg(windows)]
    {
        let mut cmd = Command::new("powershell.exe");
        cmd.args([
            "-NoProfile",
            "-NonInteractive",
            "-ExecutionPolicy",
            "Bypass",
            "-Command",
            command,
        ]);
        hide_console_window(&mut cmd);
        cmd
    }

    #[cfg(not(windows))]
    {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shell_command_runs_in_given_directory() {
        let dir = tempfile::tempdir().unwrap();
        let probe = if cfg!(windows) { "Get-Location" } else { "pwd" };
        let output = shell_command(probe)
            .current_dir(dir.path())
            .output()
            .await
            .unwrap();

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        let name = dir.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(stdout.contains(&name));
    }
}
