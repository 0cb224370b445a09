//! Byte-driven line editor tying the console pieces together

use core::fmt::Write;

use super::commands::{command_names, execute};
use super::completion::{argument_candidates, Completer};
use super::history::History;
use super::line_buffer::LineBuffer;
use super::parser::parse_line;
use super::shell::Shell;
use super::ConsoleError;

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");

const ERASE_CHAR: &str = "\x08 \x08";

/// Console state machine
pub struct Console {
    line: LineBuffer,
    history: History,
    completer: Completer,
    escape_state: EscapeState,
}

#[derive(Clone, Copy, PartialEq)]
enum EscapeState {
    Normal,
    Escape,  // Got ESC
    Bracket, // Got ESC [
}

impl Console {
    pub const fn new() -> Self {
        Self {
            line: LineBuffer::new(),
            history: History::new(),
            completer: Completer::new(),
            escape_state: EscapeState::Normal,
        }
    }

    /// Process a single input byte
    ///
    /// Returns `Some(result)` when a command ran, `None` while a line is being edited.
    /// Errors have already been printed when returned.
    pub fn process_byte(
        &mut self,
        byte: u8,
        shell: &mut Shell<'_>,
        out: &mut dyn Write,
    ) -> Option<Result<(), ConsoleError>> {
        match self.escape_state {
            EscapeState::Normal => self.process_normal(byte, shell, out),
            EscapeState::Escape => {
                self.escape_state = if byte == b'[' {
                    EscapeState::Bracket
                } else {
                    EscapeState::Normal
                };
                None
            }
            EscapeState::Bracket => {
                self.escape_state = EscapeState::Normal;
                match byte {
                    b'A' => self.handle_up(out),
                    b'B' => self.handle_down(out),
                    _ => {}
                }
                None
            }
        }
    }

    fn process_normal(
        &mut self,
        byte: u8,
        shell: &mut Shell<'_>,
        out: &mut dyn Write,
    ) -> Option<Result<(), ConsoleError>> {
        match byte {
            // Enter
            b'\r' | b'\n' => {
                let _ = writeln!(out);
                if self.line.is_empty() {
                    self.print_prompt(out);
                    return None;
                }

                let line = self.line.as_str();
                self.history.push(line);
                let result = execute(&parse_line(line), shell, out);
                if let Err(e) = result {
                    let _ = writeln!(out, "{}", e);
                }
                self.line.clear();
                self.completer.reset();
                self.print_prompt(out);
                Some(result)
            }

            // Backspace
            0x7F | 0x08 => {
                if self.line.backspace() {
                    let _ = out.write_str(ERASE_CHAR);
                }
                self.completer.reset();
                self.history.reset_nav();
                None
            }

            b'\t' => {
                self.handle_tab(out);
                None
            }

            0x1B => {
                self.escape_state = EscapeState::Escape;
                None
            }

            // Ctrl+C
            0x03 => {
                let _ = writeln!(out, "^C");
                self.line.clear();
                self.print_prompt(out);
                None
            }

            // Ctrl+U (clear line)
            0x15 => {
                erase(out, self.line.len());
                self.line.clear();
                None
            }

            0x20..=0x7E => {
                if self.line.push(byte) {
                    let _ = out.write_char(byte as char);
                }
                self.completer.reset();
                self.history.reset_nav();
                None
            }

            _ => None,
        }
    }

    fn handle_tab(&mut self, out: &mut dyn Write) {
        let input = self.line.as_str();
        let prefix_start = input.rfind(' ').map(|i| i + 1).unwrap_or(0);
        let prefix = &input[prefix_start..];
        let completed_words = input[..prefix_start].split_whitespace().count();

        let completion = if completed_words == 0 {
            self.completer.complete(prefix, command_names())
        } else {
            let command = input.split_whitespace().next().unwrap_or("");
            let arg_idx = completed_words - 1;
            if arg_idx == 0 && command == "help" {
                self.completer.complete(prefix, command_names())
            } else {
                self.completer
                    .complete(prefix, argument_candidates(command, arg_idx).iter().copied())
            }
        };

        if let Some(completed) = completion {
            for _ in 0..prefix.len() {
                self.line.backspace();
                let _ = out.write_str(ERASE_CHAR);
            }
            for c in completed.bytes() {
                if self.line.push(c) {
                    let _ = out.write_char(c as char);
                }
            }
        }
    }

    fn handle_up(&mut self, out: &mut dyn Write) {
        let shown = self.line.len();
        if let Some(prev) = self.history.get_prev() {
            erase(out, shown);
            self.line.set(prev);
            let _ = out.write_str(self.line.as_str());
        }
    }

    fn handle_down(&mut self, out: &mut dyn Write) {
        erase(out, self.line.len());
        match self.history.get_next() {
            Some(next) => self.line.set(next),
            None => self.line.clear(),
        }
        let _ = out.write_str(self.line.as_str());
    }

    /// Current (unsubmitted) line contents
    pub fn line(&self) -> &str {
        self.line.as_str()
    }

    pub fn print_prompt(&self, out: &mut dyn Write) {
        let _ = write!(out, "vlc> ");
    }

    /// Print welcome banner
    pub fn print_banner(&self, out: &mut dyn Write) {
        let _ = writeln!(out, "\r\n{}", VERSION);
        let _ = writeln!(out, "Type 'help' for commands.\r");
        self.print_prompt(out);
    }
}

fn erase(out: &mut dyn Write, chars: usize) {
    for _ in 0..chars {
        let _ = out.write_str(ERASE_CHAR);
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}
