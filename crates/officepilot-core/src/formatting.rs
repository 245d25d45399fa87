//! Text truncation and one-line summaries of tool calls
//!
//! All cuts land on `char` boundaries; lengths are counted in bytes so the
//! caps line up with what ends up in the request body.

use serde_json::Value;

/// Truncate a string to max length, adding "..." if truncated
pub fn truncate_str(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let cut = floor_char_boundary(s, max.saturating_sub(3));
    format!("{}...", &s[..cut])
}

/// Keep the head of a tool result, preferring to cut at a newline
///
/// Used before a tool result enters the conversation.
pub fn truncate_tool_result(result: &str, max_size: usize) -> String {
    if result.len() <= max_size {
        return result.to_string();
    }

    let hard_cut = floor_char_boundary(result, max_size);
    let cut_point = match result[..hard_cut].rfind('\n') {
        Some(nl) if nl > max_size / 2 => nl,
        _ => hard_cut,
    };

    format!(
        "{}\n\n[Result truncated - {} chars total, showing first {}]",
        &result[..cut_point],
        result.len(),
        cut_point
    )
}

/// Keep the tail of process output, prefixing a note when bytes were dropped
pub fn truncate_tail(output: &str, max_size: usize) -> String {
    if output.len() <= max_size {
        return output.to_string();
    }

    let start = ceil_char_boundary(output, output.len() - max_size);
    format!(
        "[Output truncated - showing last {} of {} chars]\n{}",
        output.len() - start,
        output.len(),
        &output[start..]
    )
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(s: &str, mut index: usize) -> usize {
    while index < s.len() && !s.is_char_boundary(index) {
        index += 1;
    }
    index
}

/// Format tool arguments into a concise single-line summary
pub fn format_tool_summary(tool_name: &str, args: &Value) -> String {
    let field = |key: &str| args[key].as_str().unwrap_or("?").to_string();

    match tool_name {
        "read_file" | "create_file" | "edit_file" => field("path"),
        "list_files" => args["path"].as_str().unwrap_or(".").to_string(),
        "find_files" => field("pattern"),
        "search_content" => {
            let path = args["path"].as_str().unwrap_or(".");
            format!("{} in {}", field("pattern"), path)
        }
        "powershell" | "powershell_background_start" => truncate_str(&field("command"), 100),
        "powershell_background_read" | "powershell_background_stop" => field("task_id"),
        "set_working_directory" => field("path"),
        "ask_to_user" => truncate_str(&field("question"), 100),
        "tell_to_user" | "final_response" => truncate_str(&field("message"), 100),
        "write_todos" => {
            let count = args["todos"].as_array().map(|t| t.len()).unwrap_or(0);
            format!("{} items", count)
        }
        name if name.ends_with("_work_request") => truncate_str(&field("instruction"), 100),
        _ => {
            let compact = serde_json::to_string(args).unwrap_or_default();
            truncate_str(&compact, 100)
        }
    }
}
