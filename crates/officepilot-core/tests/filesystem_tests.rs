//! Filesystem tool tests
//!
//! Tests for ReadFile, CreateFile, EditFile, ListFiles, FindFiles and SearchContent.

use officepilot_core::tools::filesystem::{CreateFile, EditFile, FindFiles, ListFiles, ReadFile, SearchContent};
use officepilot_core::{file_event_channel, AgentContext, FileEvent, Tool, ToolError, ToolExecutionContext};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

/// Create a test workspace with a few files
fn setup_workspace() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(dir.path().join("notes.txt"), "alpha\nbeta\ngamma\n").unwrap();
    fs::create_dir(dir.path().join("reports")).unwrap();
    fs::write(dir.path().join("reports/q3.csv"), "region,total\nnorth,10\nsouth,20\n").unwrap();
    fs::write(dir.path().join("reports/q4.csv"), "region,total\nnorth,15\n").unwrap();
    fs::write(dir.path().join(".hidden"), "secret").unwrap();
    dir
}

fn ctx(dir: &TempDir) -> ToolExecutionContext {
    ToolExecutionContext::standalone("test", AgentContext::new(dir.path()))
}

mod read_tests {
    use super::*;

    #[tokio::test]
    async fn test_read_numbers_lines() {
        let dir = setup_workspace();
        let result = ReadFile
            .execute(json!({ "path": "notes.txt" }), ctx(&dir))
            .await
            .unwrap();

        let text = result.result.unwrap();
        assert!(text.contains("     1\talpha"));
        assert!(text.contains("     3\tgamma"));
        assert_eq!(result.metadata["total_lines"], 3);
    }

    #[tokio::test]
    async fn test_read_with_offset_and_limit() {
        let dir = setup_workspace();
        let result = ReadFile
            .execute(json!({ "path": "notes.txt", "offset": 2, "limit": 1 }), ctx(&dir))
            .await
            .unwrap();

        let text = result.result.unwrap();
        assert!(text.contains("     2\tbeta"));
        assert!(!text.contains("alpha"));
        assert!(text.contains("[Showing lines 2-2 of 3"));
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = setup_workspace();
        let result = ReadFile.execute(json!({ "path": "nope.txt" }), ctx(&dir)).await;
        assert!(matches!(result, Err(ToolError::ResourceNotFound(_))));
    }
}

mod create_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_new_file_emits_event() {
        let dir = setup_workspace();
        let (tx, mut rx) = file_event_channel();
        let session = AgentContext::new(dir.path()).with_file_events(tx);

        let result = CreateFile
            .execute(
                json!({ "path": "out/summary.md", "content": "# Summary\n" }),
                ToolExecutionContext::standalone("create_file", session),
            )
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(fs::read_to_string(dir.path().join("out/summary.md")).unwrap(), "# Summary\n");
        match rx.try_recv() {
            Ok(FileEvent::Created { path, content }) => {
                assert!(path.ends_with("out/summary.md"));
                assert_eq!(content, "# Summary\n");
            }
            other => panic!("expected created event, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_refuses_existing_file_without_overwrite() {
        let dir = setup_workspace();
        let result = CreateFile
            .execute(json!({ "path": "notes.txt", "content": "replaced" }), ctx(&dir))
            .await;

        assert!(matches!(result, Err(ToolError::Precondition(_))));
        assert_eq!(
            fs::read_to_string(dir.path().join("notes.txt")).unwrap(),
            "alpha\nbeta\ngamma\n"
        );
    }

    #[tokio::test]
    async fn test_overwrite_reports_an_edit() {
        let dir = setup_workspace();
        let (tx, mut rx) = file_event_channel();
        let session = AgentContext::new(dir.path()).with_file_events(tx);

        CreateFile
            .execute(
                json!({ "path": "notes.txt", "content": "replaced", "overwrite": true }),
                ToolExecutionContext::standalone("create_file", session),
            )
            .await
            .unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("notes.txt")).unwrap(), "replaced");
        match rx.try_recv() {
            Ok(FileEvent::Edited { old_content, new_content, .. }) => {
                assert_eq!(old_content, "alpha\nbeta\ngamma\n");
                assert_eq!(new_content, "replaced");
            }
            other => panic!("expected edited event, got {:?}", other),
        }
    }
}

mod edit_tests {
    use super::*;

    #[tokio::test]
    async fn test_unique_replacement() {
        let dir = setup_workspace();
        let (tx, mut rx) = file_event_channel();
        let session = AgentContext::new(dir.path()).with_file_events(tx);

        let result = EditFile
            .execute(
                json!({ "path": "notes.txt", "old_string": "beta", "new_string": "BETA" }),
                ToolExecutionContext::standalone("edit_file", session),
            )
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.metadata["occurrences_replaced"], 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("notes.txt")).unwrap(),
            "alpha\nBETA\ngamma\n"
        );
        assert!(matches!(rx.try_recv(), Ok(FileEvent::Edited { .. })));
    }

    #[tokio::test]
    async fn test_ambiguous_match_is_rejected() {
        let dir = setup_workspace();
        let result = EditFile
            .execute(
                json!({ "path": "reports/q3.csv", "old_string": "0\n", "new_string": "1\n" }),
                ctx(&dir),
            )
            .await;

        match result {
            Err(ToolError::Precondition(msg)) => assert!(msg.contains("appears 2 times"), "{}", msg),
            other => panic!("expected precondition failure, got {:?}", other.map(|r| r.result)),
        }
        assert!(fs::read_to_string(dir.path().join("reports/q3.csv"))
            .unwrap()
            .contains("north,10"));
    }

    #[tokio::test]
    async fn test_replace_all() {
        let dir = setup_workspace();
        let result = EditFile
            .execute(
                json!({
                    "path": "reports/q3.csv",
                    "old_string": "0\n",
                    "new_string": "00\n",
                    "replace_all": true
                }),
                ctx(&dir),
            )
            .await
            .unwrap();

        assert_eq!(result.metadata["occurrences_replaced"], 2);
        assert_eq!(
            fs::read_to_string(dir.path().join("reports/q3.csv")).unwrap(),
            "region,total\nnorth,100\nsouth,200\n"
        );
    }

    #[tokio::test]
    async fn test_missing_text_is_rejected() {
        let dir = setup_workspace();
        let result = EditFile
            .execute(
                json!({ "path": "notes.txt", "old_string": "delta", "new_string": "epsilon" }),
                ctx(&dir),
            )
            .await;
        assert!(matches!(result, Err(ToolError::Precondition(_))));
    }
}

mod listing_tests {
    use super::*;

    #[tokio::test]
    async fn test_list_skips_hidden_entries() {
        let dir = setup_workspace();
        let result = ListFiles.execute(json!({}), ctx(&dir)).await.unwrap();
        let text = result.result.unwrap();

        assert!(text.contains("notes.txt"));
        assert!(text.contains("reports/"));
        assert!(!text.contains("q3.csv"));
        assert!(!text.contains(".hidden"));
    }

    #[tokio::test]
    async fn test_list_recursive_with_hidden() {
        let dir = setup_workspace();
        let result = ListFiles
            .execute(json!({ "recursive": true, "include_hidden": true }), ctx(&dir))
            .await
            .unwrap();
        let text = result.result.unwrap();

        assert!(text.contains("reports/q3.csv"));
        assert!(text.contains(".hidden"));
    }

    #[tokio::test]
    async fn test_find_files_by_glob() {
        let dir = setup_workspace();
        let result = FindFiles
            .execute(json!({ "pattern": "*.csv" }), ctx(&dir))
            .await
            .unwrap();

        assert_eq!(result.metadata["count"], 2);
        let text = result.result.unwrap();
        assert!(text.contains("reports/q3.csv"));
        assert!(text.contains("reports/q4.csv"));
    }

    #[tokio::test]
    async fn test_search_content() {
        let dir = setup_workspace();
        let result = SearchContent
            .execute(json!({ "pattern": "^north", "glob": "*.csv" }), ctx(&dir))
            .await
            .unwrap();

        assert_eq!(result.metadata["count"], 2);
        let text = result.result.unwrap();
        assert!(text.contains("reports/q3.csv:2: north,10"));
        assert!(text.contains("reports/q4.csv:2: north,15"));
    }

    #[tokio::test]
    async fn test_search_rejects_bad_regex() {
        let dir = setup_workspace();
        let result = SearchContent.execute(json!({ "pattern": "(" }), ctx(&dir)).await;
        assert!(matches!(result, Err(ToolError::InvalidParams(_))));
    }
}
