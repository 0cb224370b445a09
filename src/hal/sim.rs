//! Host-side doubles for the hardware capabilities.
//!
//! Used by the loopback bench, the integration tests and the host build of the binary.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use super::{EdgeTrigger, InputLine, OutputLine, PeriodicTimer};

/// A single wire: the TX side drives it, the RX side reads it.
///
/// Idles high. Every high-to-low transition is counted and latched as a pending edge
/// until [`SimWire::take_falling_edge`] collects it.
pub struct SimWire {
    level: AtomicBool,
    edge_pending: AtomicBool,
    falling_edges: AtomicU32,
}

impl SimWire {
    pub const fn new() -> Self {
        Self {
            level: AtomicBool::new(true),
            edge_pending: AtomicBool::new(false),
            falling_edges: AtomicU32::new(0),
        }
    }

    /// Current line level.
    pub fn level(&self) -> bool {
        self.level.load(Ordering::Acquire)
    }

    /// Falling edges seen since creation.
    pub fn falling_edges(&self) -> u32 {
        self.falling_edges.load(Ordering::Relaxed)
    }

    /// Collect the latched falling edge, if any.
    pub fn take_falling_edge(&self) -> bool {
        self.edge_pending.swap(false, Ordering::AcqRel)
    }

    fn drive(&self, level: bool) {
        let was = self.level.swap(level, Ordering::AcqRel);
        if was && !level {
            self.falling_edges.fetch_add(1, Ordering::Relaxed);
            self.edge_pending.store(true, Ordering::Release);
        }
    }
}

impl Default for SimWire {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputLine for SimWire {
    fn set_high(&self) {
        self.drive(true);
    }

    fn set_low(&self) {
        self.drive(false);
    }
}

impl InputLine for SimWire {
    fn is_high(&self) -> bool {
        self.level()
    }
}

/// Timer double: records whether it is running and how it was started.
pub struct SimTimer {
    running: AtomicBool,
    period_us: AtomicU32,
    starts: AtomicU32,
}

impl SimTimer {
    pub const fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            period_us: AtomicU32::new(0),
            starts: AtomicU32::new(0),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Period passed to the most recent `start`.
    pub fn period_us(&self) -> u32 {
        self.period_us.load(Ordering::Relaxed)
    }

    /// Number of `start` calls.
    pub fn starts(&self) -> u32 {
        self.starts.load(Ordering::Relaxed)
    }
}

impl Default for SimTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl PeriodicTimer for SimTimer {
    fn start(&self, period_us: u32) {
        self.period_us.store(period_us, Ordering::Relaxed);
        self.starts.fetch_add(1, Ordering::Relaxed);
        self.running.store(true, Ordering::Release);
    }

    fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Edge-interrupt double.
pub struct SimEdgeTrigger {
    armed: AtomicBool,
}

impl SimEdgeTrigger {
    pub const fn new() -> Self {
        Self {
            armed: AtomicBool::new(false),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }
}

impl Default for SimEdgeTrigger {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeTrigger for SimEdgeTrigger {
    fn arm(&self) {
        self.armed.store(true, Ordering::Release);
    }

    fn disarm(&self) {
        self.armed.store(false, Ordering::Release);
    }
}
