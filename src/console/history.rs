//! Command history
//!
//! Fixed capacity, no heap: the last 4 distinct lines of up to 256 bytes.

use heapless::{Deque, String};

/// Maximum line length (fits a full `set_encryption` line and a long `transmit`)
pub const LINE_SIZE: usize = 256;

/// Number of history entries
pub const HISTORY_SIZE: usize = 4;

/// Command history, newest at the back
pub struct History {
    entries: Deque<String<LINE_SIZE>, HISTORY_SIZE>,
    /// Current navigation position (0 = newest)
    nav_pos: Option<usize>,
}

impl History {
    pub const fn new() -> Self {
        Self {
            entries: Deque::new(),
            nav_pos: None,
        }
    }

    /// Record a submitted line. Repeating the newest entry is not recorded twice.
    pub fn push(&mut self, line: &str) {
        self.nav_pos = None;
        if line.is_empty() || self.entries.back().map(|s| s.as_str()) == Some(line) {
            return;
        }

        let mut entry = String::new();
        // Lines never exceed LINE_SIZE; the line buffer enforces it.
        let _ = entry.push_str(line);

        if self.entries.is_full() {
            self.entries.pop_front();
        }
        let _ = self.entries.push_back(entry);
    }

    /// Step to the previous (older) command
    pub fn get_prev(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }

        let pos = match self.nav_pos {
            None => 0,
            Some(p) if p + 1 < self.entries.len() => p + 1,
            Some(p) => p, // Already at oldest
        };

        self.nav_pos = Some(pos);
        self.get_at(pos)
    }

    /// Step to the next (newer) command; `None` means back to an empty line
    pub fn get_next(&mut self) -> Option<&str> {
        match self.nav_pos {
            None | Some(0) => {
                self.nav_pos = None;
                None
            }
            Some(p) => {
                self.nav_pos = Some(p - 1);
                self.get_at(p - 1)
            }
        }
    }

    /// Reset navigation (call when user types)
    pub fn reset_nav(&mut self) {
        self.nav_pos = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get_at(&self, nav_pos: usize) -> Option<&str> {
        let len = self.entries.len();
        if nav_pos >= len {
            return None;
        }
        self.entries.iter().nth(len - 1 - nav_pos).map(|s| s.as_str())
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
