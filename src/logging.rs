//! Non-blocking logging for the coordinator tasks.
//!
//! # Architecture
//!
//! ```text
//! TX coordinator (core 0) ──rt_*!──▶ TX_LOG_STREAM ─┐
//!                                                   ├──▶ log_drain ──▶ log facade
//! RX coordinator (core 1) ──rt_*!──▶ RX_LOG_STREAM ─┘    (EspLogger on target)
//! ```
//!
//! # Rules
//!
//! - Coordinator loops never call the `log` facade directly; they use `rt_*!`
//! - Interrupt callbacks never log at all
//! - One producer per stream; a full stream drops the entry and counts it
//! - Console, configuration and storage code log through `log::{info, warn, error}`

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

/// Maximum message length.
pub const MAX_MSG_LEN: usize = 96;

/// Log buffer size (number of entries).
pub const LOG_BUFFER_SIZE: usize = 64;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }

    /// Matching `log` facade level.
    pub fn to_log(self) -> log::Level {
        match self {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

/// A single log entry.
#[derive(Clone, Copy)]
pub struct LogEntry {
    /// Timestamp in microseconds.
    pub timestamp_us: i64,
    pub level: LogLevel,
    /// Message length.
    pub len: u8,
    /// Message bytes (not null-terminated).
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    pub const EMPTY: Self = Self {
        timestamp_us: 0,
        level: LogLevel::Info,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Message text. Truncation may have split a UTF-8 sequence; the valid prefix is kept.
    pub fn message(&self) -> &str {
        let bytes = &self.msg[..self.len as usize];
        match core::str::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or(""),
        }
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Lock-free single-producer log stream.
///
/// An entry is written in full before the write index is published, so the drain side
/// never sees a half-written slot. A push on a full stream is dropped and counted.
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    entries: UnsafeCell<[LogEntry; N]>,
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: One producer task and one drain task, coordinated through the two indices.
unsafe impl<const N: usize> Sync for LogStream<N> {}
unsafe impl<const N: usize> Send for LogStream<N> {}

impl<const N: usize> LogStream<N> {
    const MASK: usize = N - 1;

    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Log buffer size must be power of 2");

        Self {
            entries: UnsafeCell::new([LogEntry::EMPTY; N]),
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Queue a log entry. Never blocks.
    ///
    /// Returns `false` if the stream was full and the entry was dropped.
    #[inline]
    pub fn push(&self, timestamp_us: i64, level: LogLevel, msg: &[u8]) -> bool {
        let write = self.write_idx.load(Ordering::Relaxed);
        let read = self.read_idx.load(Ordering::Acquire);

        if write.wrapping_sub(read) >= N as u32 {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        let idx = (write as usize) & Self::MASK;
        let len = msg.len().min(MAX_MSG_LEN);

        // SAFETY: Single producer; slot `write` is outside the drain window until published.
        unsafe {
            let entry = &mut (*self.entries.get())[idx];
            entry.timestamp_us = timestamp_us;
            entry.level = level;
            entry.len = len as u8;
            entry.msg[..len].copy_from_slice(&msg[..len]);
        }

        self.write_idx.store(write.wrapping_add(1), Ordering::Release);
        true
    }

    /// Take the oldest entry, if any.
    #[inline]
    pub fn drain(&self) -> Option<LogEntry> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        // SAFETY: Single consumer; slot was published by the Release store of write_idx.
        let entry = unsafe { (*self.entries.get())[(read as usize) & Self::MASK] };

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(entry)
    }

    /// Entries dropped since the last [`LogStream::take_dropped`].
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Read and reset the dropped counter.
    #[inline]
    pub fn take_dropped(&self) -> u32 {
        self.dropped.swap(0, Ordering::Relaxed)
    }

    /// Number of entries waiting to be drained.
    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Acquire);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Format into a fixed buffer, truncating silently. Returns bytes written.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    struct BufWriter<'a> {
        buf: &'a mut [u8],
        pos: usize,
    }

    impl core::fmt::Write for BufWriter<'_> {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            let bytes = s.as_bytes();
            let n = bytes.len().min(self.buf.len() - self.pos);
            self.buf[self.pos..self.pos + n].copy_from_slice(&bytes[..n]);
            self.pos += n;
            Ok(())
        }
    }

    let mut writer = BufWriter { buf, pos: 0 };
    let _ = core::fmt::write(&mut writer, args);
    writer.pos
}

/// Non-blocking log macro.
///
/// ```ignore
/// rt_log!(LogLevel::Info, TX_LOG_STREAM, now_us, "armed {:08X}", word);
/// ```
#[macro_export]
macro_rules! rt_log {
    ($level:expr, $stream:expr, $timestamp:expr, $($arg:tt)*) => {{
        let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
        let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
        $stream.push($timestamp, $level, &buf[..len]);
    }};
}

#[macro_export]
macro_rules! rt_info {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Info, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_warn {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Warn, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_error {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Error, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_debug {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Debug, $stream, $timestamp, $($arg)*)
    };
}

/// Per-word chatter; compiled in but usually filtered at the drain.
#[macro_export]
macro_rules! rt_trace {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Trace, $stream, $timestamp, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_stream_basic() {
        let stream = LogStream::<16>::new();

        assert!(stream.push(1000, LogLevel::Info, b"armed"));
        assert_eq!(stream.pending(), 1);

        let entry = stream.drain().unwrap();
        assert_eq!(entry.timestamp_us, 1000);
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.message(), "armed");
        assert!(stream.drain().is_none());
    }

    #[test]
    fn test_log_stream_full_drops_and_recovers() {
        let stream = LogStream::<4>::new();
        for i in 0..4 {
            assert!(stream.push(i, LogLevel::Info, b"x"));
        }
        assert!(!stream.push(5, LogLevel::Info, b"5"));
        assert_eq!(stream.dropped(), 1);

        assert_eq!(stream.drain().map(|e| e.timestamp_us), Some(0));
        assert!(stream.push(6, LogLevel::Info, b"6"));
        assert_eq!(stream.pending(), 4);
        assert_eq!(stream.take_dropped(), 1);
        assert_eq!(stream.dropped(), 0);
    }

    #[test]
    fn test_message_truncated() {
        let stream = LogStream::<4>::new();
        let long = [b'a'; MAX_MSG_LEN + 10];
        stream.push(0, LogLevel::Warn, &long);
        assert_eq!(stream.drain().unwrap().message().len(), MAX_MSG_LEN);
    }

    #[test]
    fn test_message_keeps_valid_utf8_prefix() {
        let mut entry = LogEntry::EMPTY;
        entry.msg[..3].copy_from_slice(&[b'o', b'k', 0xC3]);
        entry.len = 3;
        assert_eq!(entry.message(), "ok");
    }

    #[test]
    fn test_rt_macro_formats() {
        let stream = LogStream::<4>::new();
        crate::rt_info!(stream, 7, "word {:08X}", 0xBEEFu32);
        let entry = stream.drain().unwrap();
        assert_eq!(entry.message(), "word 0000BEEF");
        assert_eq!(entry.level.to_log(), log::Level::Info);
    }

    #[test]
    fn test_producer_and_drain_threads() {
        use std::sync::Arc;
        use std::thread;

        let stream = Arc::new(LogStream::<8>::new());
        let producer = {
            let stream = Arc::clone(&stream);
            thread::spawn(move || {
                for i in 0..200i64 {
                    while !stream.push(i, LogLevel::Debug, b"tick") {
                        thread::yield_now();
                    }
                }
            })
        };

        let mut expected = 0i64;
        while expected < 200 {
            if let Some(entry) = stream.drain() {
                assert_eq!(entry.timestamp_us, expected);
                assert_eq!(entry.message(), "tick");
                expected += 1;
            }
        }
        producer.join().unwrap();
    }
}
