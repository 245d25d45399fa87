//! User interaction tools

mod ask_question;
mod final_response;
mod tell;

pub use ask_question::{validate_options, AskToUser, NAME as ASK_TO_USER_TOOL_NAME};
pub use final_response::{describe_incomplete, FinalResponse, NAME as FINAL_RESPONSE_TOOL_NAME};
pub use tell::{TellToUser, NAME as TELL_TO_USER_TOOL_NAME};
