//! GPIO capabilities for the link lines.
//!
//! All methods take `&self`: the same handle is touched from interrupt callbacks and
//! from task context, so implementations must be plain register pokes.

/// Transmit line.
pub trait OutputLine {
    fn set_high(&self);
    fn set_low(&self);

    /// Drive the line to `level`.
    #[inline]
    fn set_level(&self, level: bool) {
        if level {
            self.set_high()
        } else {
            self.set_low()
        }
    }
}

/// Receive line.
pub trait InputLine {
    fn is_high(&self) -> bool;
}

/// Falling-edge interrupt on the receive line.
pub trait EdgeTrigger {
    /// Enable the interrupt. Must be callable from interrupt context.
    fn arm(&self);
    /// Disable the interrupt. Must be callable from interrupt context.
    fn disarm(&self);
}

/// TX output pin configuration.
#[derive(Clone, Copy, Debug)]
pub struct TxPinConfig {
    pub pin: i32,
}

/// RX input pin configuration.
#[derive(Clone, Copy, Debug)]
pub struct RxPinConfig {
    pub pin: i32,
    pub pull_down: bool,
}
