//! Global log stream instances, one per coordinator task.

use crate::logging::LogStream;

/// Written only by the TX coordinator (core 0).
pub static TX_LOG_STREAM: LogStream = LogStream::new();

/// Written only by the RX coordinator (core 1).
pub static RX_LOG_STREAM: LogStream = LogStream::new();
