//! Terminal front-end for interaction requests and file events

use console::style;
use dialoguer::{theme::ColorfulTheme, Select};
use tokio::task::JoinHandle;

use officepilot_core::{FileEvent, FileEventReceiver, InteractionReceiver, InteractionRequest};

/// Serve interaction requests until every sender is dropped
///
/// Resolves to the last `final_response` message, if one was delivered.
pub fn spawn_console_interaction(mut rx: InteractionReceiver) -> JoinHandle<Option<String>> {
    tokio::spawn(async move {
        let mut final_message = None;

        while let Some(request) = rx.recv().await {
            match request {
                InteractionRequest::Ask {
                    request_id,
                    question,
                    options,
                    response_tx,
                } => {
                    let choices = options.clone();
                    let selection = tokio::task::spawn_blocking(move || {
                        Select::with_theme(&ColorfulTheme::default())
                            .with_prompt(question)
                            .items(&choices)
                            .default(0)
                            .interact()
                    })
                    .await;

                    match selection {
                        Ok(Ok(index)) => {
                            if let Some(answer) = options.get(index) {
                                let _ = response_tx.send(answer.clone());
                            }
                        }
                        Ok(Err(e)) => {
                            tracing::warn!(request = %request_id, error = %e, "Question prompt failed");
                        }
                        Err(e) => {
                            tracing::error!(request = %request_id, error = %e, "Question prompt task panicked");
                        }
                    }
                }
                InteractionRequest::Tell { message } => {
                    println!("{} {}", style("›").cyan(), message);
                }
                InteractionRequest::FinalResponse { message } => {
                    println!();
                    println!("{}", style("Result").bold().green());
                    println!("{}", message);
                    final_message = Some(message);
                }
            }
        }

        final_message
    })
}

/// Print a one-line notice for every file the agent touches
pub fn spawn_file_event_printer(mut rx: FileEventReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let (verb, path) = match &event {
                FileEvent::Created { path, .. } => ("created", path),
                FileEvent::Edited { path, .. } => ("edited", path),
            };
            println!("  {} {}", style(verb).dim(), style(path.display()).yellow());
        }
    })
}
