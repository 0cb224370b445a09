//! Word framing and byte packing shared by both link directions.
//!
//! # Line format
//!
//! ```text
//! idle ─┐ start ┌─b0─┬─b1─┬ ... ┬─b31─┐ stop ┌─ idle (high)
//!       └───────┘    │    │     │     └──────┘
//!        1 period    1 period per data bit, LSB first
//! ```
//!
//! Bytes travel as little-endian 4-byte groups; a trailing partial group is zero-padded.

use core::fmt;

/// Data bits per framed word.
pub const WORD_BITS: u8 = 32;

/// Bytes per framed word.
pub const WORD_BYTES: usize = 4;

/// Bit periods the TX timer runs for one word: 32 data bits, the stop level, and the
/// tick that disarms the timer.
pub const TX_TICKS_PER_WORD: u32 = WORD_BITS as u32 + 2;

/// Bit periods the RX timer runs for one word: 32 samples plus the hand-off tick.
pub const RX_TICKS_PER_WORD: u32 = WORD_BITS as u32 + 1;

/// Pack up to four bytes into a word, little-endian, zero-padding missing bytes.
#[inline]
pub fn pack_word(chunk: &[u8]) -> u32 {
    let mut bytes = [0u8; WORD_BYTES];
    let len = chunk.len().min(WORD_BYTES);
    bytes[..len].copy_from_slice(&chunk[..len]);
    u32::from_le_bytes(bytes)
}

/// Split a word into its four bytes (byte 0 = bits 0–7).
#[inline]
pub fn unpack_word(word: u32) -> [u8; WORD_BYTES] {
    word.to_le_bytes()
}

/// Iterate the words a message packs into.
pub fn words(message: &[u8]) -> impl Iterator<Item = u32> + '_ {
    message.chunks(WORD_BYTES).map(pack_word)
}

/// Number of words a message of `len` bytes occupies.
#[inline]
pub const fn word_count(len: usize) -> usize {
    (len + WORD_BYTES - 1) / WORD_BYTES
}

/// Value of data bit `index` of `word` (LSB first).
#[inline]
pub const fn bit(word: u32, index: u8) -> bool {
    (word >> index) & 1 != 0
}

/// True if every byte is printable ASCII (space through tilde).
pub fn is_printable(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| (0x20..=0x7E).contains(b))
}

/// Hex rendering of received bytes, grouped per word: `48656C6C 6F20576F`.
pub struct HexWords<'a>(pub &'a [u8]);

impl fmt::Display for HexWords<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chunk) in self.0.chunks(WORD_BYTES).enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            for b in chunk {
                write!(f, "{:02X}", b)?;
            }
        }
        Ok(())
    }
}
