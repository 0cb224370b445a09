//! Tab completion with cycling
//!
//! First word completes against command names; later words against the fixed
//! argument vocabulary of the command being typed (direction flags, map names).

use super::commands::{self, DIRECTION_FLAGS, MAP_NAMES};

const PREFIX_CAP: usize = 32;
const MAX_MATCHES: usize = 16;

/// Tab completion state
pub struct Completer {
    /// Prefix being completed (stored for cycle detection)
    prefix: [u8; PREFIX_CAP],
    prefix_len: usize,
    /// Current match index for cycling
    match_idx: usize,
    /// Whether we're actively cycling
    cycling: bool,
}

impl Completer {
    pub const fn new() -> Self {
        Self {
            prefix: [0u8; PREFIX_CAP],
            prefix_len: 0,
            match_idx: 0,
            cycling: false,
        }
    }

    /// Complete prefix, cycling through matches on repeated calls
    ///
    /// Returns the completed string, or None if no match.
    pub fn complete<'a, I>(&mut self, prefix: &str, candidates: I) -> Option<&'a str>
    where
        I: Iterator<Item = &'a str>,
    {
        let prefix_bytes = prefix.as_bytes();
        let same_prefix = prefix_bytes.len() == self.prefix_len
            && prefix_bytes == &self.prefix[..self.prefix_len];

        if !same_prefix {
            self.prefix_len = prefix_bytes.len().min(PREFIX_CAP);
            self.prefix[..self.prefix_len].copy_from_slice(&prefix_bytes[..self.prefix_len]);
            self.match_idx = 0;
            self.cycling = false;
        } else if self.cycling {
            self.match_idx += 1;
        }

        let mut matches: [&str; MAX_MATCHES] = [""; MAX_MATCHES];
        let mut match_count = 0;
        for c in candidates.filter(|c| c.starts_with(prefix)).take(MAX_MATCHES) {
            matches[match_count] = c;
            match_count += 1;
        }

        if match_count == 0 {
            self.cycling = false;
            return None;
        }

        // Wrap around
        if self.match_idx >= match_count {
            self.match_idx = 0;
        }

        self.cycling = true;
        Some(matches[self.match_idx])
    }

    /// Reset completion state (call when user types non-tab)
    pub fn reset(&mut self) {
        self.cycling = false;
        self.match_idx = 0;
    }
}

impl Default for Completer {
    fn default() -> Self {
        Self::new()
    }
}

/// Candidate words for argument `arg_idx` (0-based) of `command`.
pub fn argument_candidates(command: &str, arg_idx: usize) -> &'static [&'static str] {
    let Some(descriptor) = commands::find(command) else {
        return &[];
    };
    match (descriptor.name, arg_idx) {
        ("set_encryption" | "get_encryption", 0) => DIRECTION_FLAGS,
        ("set_encryption", 1) => MAP_NAMES,
        _ => &[],
    }
}
