//! Task tracking tools

mod todo;

pub use todo::{TodoItem, TodoList, TodoStatus, WriteTodos, NAME as WRITE_TODOS_TOOL_NAME};
