//! Command deny-list shared by the shell tools
//!
//! A match rejects the command before any process is spawned. The
//! background path carries a few extra patterns on top of the shared
//! base set: a detached process cannot be watched, so elevation prompts
//! and download-and-execute one-liners are refused there outright.

use regex::Regex;

/// Patterns rejected by both `powershell` and `powershell_background_start`
const BASE_PATTERNS: &[(&str, &str)] = &[
    (
        r"(?i)(?:^|[;&|(]|\bcmd(?:\.exe)?\s+/[ck])\s*format(?:\.com)?\s+[a-z]:(?:\s|$|/)",
        "formatting a drive",
    ),
    (r"(?i)\bformat-volume\b", "formatting a volume"),
    (
        r#"(?i)\b(?:remove-item|rm|ri|del|erase|rd|rmdir)\b.*\s["']?[a-z]:[\\/]?(?:(?:windows|program files(?: \(x86\))?|programdata)(?:[\\/][^\s"']*)?)?[\\/]?\*?["']?(?:\s|$)"#,
        "deleting a drive root or system directory",
    ),
    (
        r#"(?i)\b(?:remove-item|rm|ri|del|erase|rd|rmdir)\b.*(?:\$env:(?:systemroot|windir|systemdrive|programfiles(?:\(x86\))?|programdata)|%(?:systemroot|windir|systemdrive|programfiles|programdata)%)"#,
        "deleting a system directory",
    ),
    (r"(?i)\brm\s+(?:-[a-z]+\s+)*/\*?(?:\s|$)", "deleting the filesystem root"),
    (r"(?i)\b(?:stop-computer|restart-computer)\b", "shutting down the machine"),
    (r"(?i)\bshutdown(?:\.exe)?\s+[/-][srph]", "shutting down the machine"),
    (
        r"(?i)\b(?:clear-disk|initialize-disk|remove-partition)\b",
        "modifying disk partitions",
    ),
    (r"(?i)\bdiskpart\b", "modifying disk partitions"),
    (r"(?i)\bmkfs(?:\.\w+)?\b", "creating a filesystem"),
    (r"(?i)\bbcdedit\b", "editing boot configuration"),
    (
        r"(?i)\breg(?:\.exe)?\s+delete\s+[\x22']?(?:hklm|hkey_local_machine)",
        "deleting machine registry keys",
    ),
    (r"(?i)\bremove-item\b.*\bhklm:", "deleting machine registry keys"),
    (r"(?i)\bcipher(?:\.exe)?\s+/w", "wiping free disk space"),
    (r"(?i)\bvssadmin(?:\.exe)?\s+delete\s+shadows", "deleting volume shadow copies"),
    (r":\(\)\s*\{\s*:\s*\|\s*:\s*&\s*\}\s*;\s*:", "fork bomb"),
];

/// Extra patterns rejected only for detached background processes
const BACKGROUND_ONLY_PATTERNS: &[(&str, &str)] = &[
    (
        r"(?i)\bstart-process\b.*-verb\s+[\x22']?runas",
        "elevating privileges in a detached process",
    ),
    (
        r"(?i)\b(?:iwr|irm|invoke-webrequest|invoke-restmethod|curl|wget)\b.*\|\s*(?:iex|invoke-expression)\b",
        "piping a download into Invoke-Expression",
    ),
];

/// Compiled deny-list
#[derive(Debug, Clone)]
pub struct CommandPolicy {
    rules: Vec<(Regex, &'static str)>,
}

impl CommandPolicy {
    fn compile(sets: &[&[(&'static str, &'static str)]]) -> Self {
        let rules = sets
            .iter()
            .flat_map(|set| set.iter())
            .filter_map(|(pattern, reason)| match Regex::new(pattern) {
                Ok(re) => Some((re, *reason)),
                Err(e) => {
                    tracing::error!(pattern, error = %e, "Invalid deny-list pattern");
                    None
                }
            })
            .collect();
        Self { rules }
    }

    /// Policy for single-shot commands
    pub fn for_foreground() -> Self {
        Self::compile(&[BASE_PATTERNS])
    }

    /// Policy for background commands
    pub fn for_background() -> Self {
        Self::compile(&[BASE_PATTERNS, BACKGROUND_ONLY_PATTERNS])
    }

    /// Err carries the human-readable reason for the rejection
    pub fn check(&self, command: &str) -> Result<(), String> {
        match self.rules.iter().find(|(re, _)| re.is_match(command)) {
            Some((_, reason)) => Err(format!(
                "Command blocked by safety policy ({}): {}",
                reason,
                command.trim()
            )),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
