//! Line buffer for console input

use heapless::String;

use super::history::LINE_SIZE;

/// Line being edited. Printable ASCII only, so every prefix is valid UTF-8.
pub struct LineBuffer {
    buf: String<LINE_SIZE>,
}

impl LineBuffer {
    pub const fn new() -> Self {
        Self { buf: String::new() }
    }

    /// Append a character. Returns `false` (and ignores it) when full or not printable.
    pub fn push(&mut self, c: u8) -> bool {
        if !(0x20..=0x7E).contains(&c) {
            return false;
        }
        self.buf.push(c as char).is_ok()
    }

    /// Remove last character
    pub fn backspace(&mut self) -> bool {
        self.buf.pop().is_some()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Replace contents, keeping as much of `s` as fits
    pub fn set(&mut self, s: &str) {
        self.buf.clear();
        for b in s.bytes() {
            if !self.push(b) {
                break;
            }
        }
    }

    pub fn as_str(&self) -> &str {
        self.buf.as_str()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buf.len() == LINE_SIZE
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}
