//! Serial console for link configuration and diagnostics
//!
//! Byte-driven from the console task, lazy: nothing runs between keystrokes.
//! Zero heap allocation - all fixed-capacity buffers.

pub mod commands;
pub mod completion;
#[allow(clippy::module_inception)]
pub mod console;
pub mod error;
pub mod history;
pub mod line_buffer;
pub mod parser;
pub mod shell;

pub use commands::{command_names, execute, COMMANDS};
pub use completion::Completer;
pub use console::Console;
pub use error::ConsoleError;
pub use history::History;
pub use line_buffer::LineBuffer;
pub use parser::{parse_line, ParsedCommand};
pub use shell::Shell;
