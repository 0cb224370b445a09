//! Periodic bit-clock timer capability.

/// Auto-reloading hardware timer that fires one callback per bit period.
pub trait PeriodicTimer {
    /// Start firing every `period_us`. The first callback comes one period after the call.
    fn start(&self, period_us: u32);
    /// Stop firing. Must be callable from the timer's own callback.
    fn stop(&self);
}

/// Bit-clock timer configuration.
#[derive(Clone, Copy, Debug)]
pub struct TimerConfig {
    pub resolution_hz: u32,
    pub intr_priority: i32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            resolution_hz: crate::config::TIMER_RESOLUTION_HZ,
            intr_priority: crate::config::TIMER_INTR_PRIORITY,
        }
    }
}
