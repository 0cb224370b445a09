//! Drains the coordinator log streams into the `log` facade.
//!
//! Runs in task context at leisure (the console task calls [`LogDrain::poll`] between
//! keystrokes). Blocking in the logger backend is fine here.

use core::fmt::{self, Write};

use heapless::String;

use crate::logging::{LogEntry, LogStream, LOG_BUFFER_SIZE, MAX_MSG_LEN};

/// Interval between "dropped entries" reports.
pub const DROPPED_REPORT_INTERVAL_US: i64 = 10_000_000;

/// `log` target used for forwarded entries.
pub const RT_LOG_TARGET: &str = "vlc_link::rt";

const LINE_LEN: usize = MAX_MSG_LEN + 24;

/// Format: `[timestamp_us] LEVEL: message`
pub fn format_log_entry(entry: &LogEntry, out: &mut dyn Write) -> fmt::Result {
    write!(
        out,
        "[{:10}] {}: {}",
        entry.timestamp_us,
        entry.level.as_str(),
        entry.message()
    )
}

/// Forwarder for a fixed set of streams.
pub struct LogDrain<'a, const N: usize = LOG_BUFFER_SIZE> {
    streams: &'a [(&'static str, &'a LogStream<N>)],
    last_report_us: i64,
}

impl<'a, const N: usize> LogDrain<'a, N> {
    /// `streams` pairs a short label (`"TX"`, `"RX"`) with each stream, in drain priority order.
    pub fn new(streams: &'a [(&'static str, &'a LogStream<N>)]) -> Self {
        Self {
            streams,
            last_report_us: 0,
        }
    }

    /// Forward every pending entry. Returns the number forwarded.
    pub fn poll(&mut self, now_us: i64) -> usize {
        let mut forwarded = 0;
        for (label, stream) in self.streams {
            while let Some(entry) = stream.drain() {
                let mut line: String<LINE_LEN> = String::new();
                // Overlong lines are cut short by the fixed buffer.
                let _ = format_log_entry(&entry, &mut line);
                log::log!(target: RT_LOG_TARGET, entry.level.to_log(), "{} {}", label, line);
                forwarded += 1;
            }
        }

        if now_us - self.last_report_us > DROPPED_REPORT_INTERVAL_US {
            for (label, stream) in self.streams {
                let dropped = stream.take_dropped();
                if dropped > 0 {
                    log::warn!(target: RT_LOG_TARGET, "{}: dropped {} log entries", label, dropped);
                }
            }
            self.last_report_us = now_us;
        }

        forwarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;

    struct TestOutput(std::string::String);

    impl Write for TestOutput {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            self.0.push_str(s);
            Ok(())
        }
    }

    #[test]
    fn test_format_log_entry() {
        let stream = LogStream::<4>::new();
        stream.push(1234567, LogLevel::Info, b"Hello world");
        let entry = stream.drain().unwrap();

        let mut out = TestOutput(std::string::String::new());
        format_log_entry(&entry, &mut out).unwrap();
        assert_eq!(out.0, "[   1234567] INFO: Hello world");
    }

    #[test]
    fn test_poll_empties_streams_in_order() {
        let tx = LogStream::<4>::new();
        let rx = LogStream::<4>::new();
        tx.push(1, LogLevel::Debug, b"a");
        tx.push(2, LogLevel::Debug, b"b");
        rx.push(3, LogLevel::Warn, b"c");

        let streams = [("TX", &tx), ("RX", &rx)];
        let mut drain = LogDrain::new(&streams);
        assert_eq!(drain.poll(0), 3);
        assert_eq!(tx.pending(), 0);
        assert_eq!(rx.pending(), 0);
        assert_eq!(drain.poll(0), 0);
    }

    #[test]
    fn test_poll_reports_and_resets_dropped() {
        let tx = LogStream::<2>::new();
        for i in 0..3 {
            tx.push(i, LogLevel::Info, b"x");
        }
        assert_eq!(tx.dropped(), 1);

        let streams = [("TX", &tx)];
        let mut drain = LogDrain::new(&streams);
        drain.poll(DROPPED_REPORT_INTERVAL_US + 1);
        assert_eq!(tx.dropped(), 0);
    }
}
