//! Edit file tool - surgical string replacement

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ToolError;
use crate::events::FileEvent;
use crate::tools::{parse_args, BoxFuture, Tool, ToolExecutionContext, ToolResult};

use super::path_to_display;

#[derive(Deserialize)]
struct EditArgs {
    path: String,
    old_string: String,
    new_string: String,
    #[serde(default)]
    replace_all: bool,
}

/// Result of applying a replacement to file content
#[derive(Debug, PartialEq, Eq)]
pub struct Replacement {
    pub content: String,
    pub replaced: usize,
}

/// Replace `old` with `new` in `content`, requiring a unique match unless `replace_all`
pub fn apply_replacement(
    content: &str,
    old: &str,
    new: &str,
    replace_all: bool,
) -> Result<Replacement, ToolError> {
    if old == new {
        return Err(ToolError::InvalidParams(
            "old_string and new_string must be different".into(),
        ));
    }
    if old.is_empty() {
        return Err(ToolError::InvalidParams("old_string must not be empty".into()));
    }

    let occurrences = content.matches(old).count();

    if occurrences == 0 {
        return Err(ToolError::Precondition(
            "old_string not found in file. Make sure to match the exact content including whitespace and indentation.".into(),
        ));
    }

    if !replace_all && occurrences > 1 {
        return Err(ToolError::Precondition(format!(
            "old_string appears {} times in the file. Either provide more context to make it unique, \
             or set replace_all=true to replace all occurrences.",
            occurrences
        )));
    }

    let (content, replaced) = if replace_all {
        (content.replace(old, new), occurrences)
    } else {
        (content.replacen(old, new, 1), 1)
    };

    Ok(Replacement { content, replaced })
}

/// Tool for performing exact string replacements in files
pub struct EditFile;

impl Tool for EditFile {
    fn name(&self) -> &str {
        "edit_file"
    }

    fn description(&self) -> &str {
        "Performs exact string replacements in a text file.\n\n\
         - Read the file first and copy old_string exactly, without the line-number prefix.\n\
         - The edit FAILS if old_string is not unique. Add surrounding context to make it unique, \
         or set replace_all to change every instance.\n\
         - old_string and new_string must differ."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the file to modify"
                },
                "old_string": {
                    "type": "string",
                    "description": "The text to replace"
                },
                "new_string": {
                    "type": "string",
                    "description": "The text to replace it with (must be different from old_string)"
                },
                "replace_all": {
                    "type": "boolean",
                    "description": "Replace all occurrences of old_string (default false)",
                    "default": false
                }
            },
            "required": ["path", "old_string", "new_string"]
        })
    }

    fn execute(
        &self,
        params: Value,
        ctx: ToolExecutionContext,
    ) -> BoxFuture<'_, Result<ToolResult, ToolError>> {
        Box::pin(async move {
            let args: EditArgs = parse_args(params)?;
            let path = ctx.session.resolve_path(&args.path);

            if !path.is_file() {
                return Err(ToolError::ResourceNotFound(format!(
                    "File not found: {}",
                    path_to_display(&path)
                )));
            }

            let content = tokio::fs::read_to_string(&path).await?;
            let replacement =
                apply_replacement(&content, &args.old_string, &args.new_string, args.replace_all)?;

            tokio::fs::write(&path, &replacement.content).await?;

            let old_lines = content.lines().count();
            let new_lines = replacement.content.lines().count();

            ctx.session.emit_file_event(FileEvent::Edited {
                path: path.clone(),
                old_content: content,
                new_content: replacement.content,
            });

            Ok(ToolResult::success(format!(
                "Replaced {} occurrence(s) in {} ({} -> {} lines)",
                replacement.replaced,
                path_to_display(&path),
                old_lines,
                new_lines
            ))
            .with_metadata("occurrences_replaced", replacement.replaced))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_match_is_replaced() {
        let r = apply_replacement("a b c", "b", "x", false).unwrap();
        assert_eq!(r.content, "a x c");
        assert_eq!(r.replaced, 1);
    }

    #[test]
    fn ambiguous_match_reports_count() {
        let err = apply_replacement("b b b", "b", "x", false).unwrap_err();
        assert!(err.to_string().contains("appears 3 times"));

        let r = apply_replacement("b b b", "b", "x", true).unwrap();
        assert_eq!(r.content, "x x x");
        assert_eq!(r.replaced, 3);
    }

    #[test]
    fn identical_strings_are_rejected() {
        let err = apply_replacement("abc", "b", "b", false).unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));
    }
}
