//! Command line parser
//!
//! Split on whitespace, max 8 arguments. The raw text after the command word is kept
//! too, so `transmit` can send its payload with inner spacing intact.

/// Maximum number of positional arguments
pub const MAX_ARGS: usize = 8;

/// Parsed command with up to 8 arguments
#[derive(Debug, Clone)]
pub struct ParsedCommand<'a> {
    /// The command name (first token)
    pub command: &'a str,
    /// Up to 8 arguments
    pub args: [Option<&'a str>; MAX_ARGS],
    /// Everything after the command word, leading whitespace removed
    pub rest: &'a str,
}

impl<'a> ParsedCommand<'a> {
    pub const fn empty() -> Self {
        Self {
            command: "",
            args: [None; MAX_ARGS],
            rest: "",
        }
    }

    /// Get argument by index (0-based)
    pub fn arg(&self, idx: usize) -> Option<&'a str> {
        self.args.get(idx).copied().flatten()
    }

    /// Number of arguments present
    pub fn arg_count(&self) -> usize {
        self.args.iter().take_while(|a| a.is_some()).count()
    }
}

/// Parse a command line into command and arguments
pub fn parse_line(line: &str) -> ParsedCommand<'_> {
    let line = line.trim_start();
    let (command, rest) = match line.find(char::is_whitespace) {
        Some(end) => (&line[..end], line[end..].trim_start()),
        None => (line, ""),
    };

    let mut args = [None; MAX_ARGS];
    for (slot, arg) in args.iter_mut().zip(rest.split_whitespace()) {
        *slot = Some(arg);
    }

    ParsedCommand {
        command,
        args,
        rest,
    }
}
