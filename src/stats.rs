//! Link statistics.
//!
//! Every counter is already kept lock-free by its owner (rings count rejected pushes,
//! framers count completed words). This module only gathers them into one snapshot
//! for the console.

use core::fmt;

use crate::ring::WordRing;
use crate::rx::RxFramer;
use crate::tx::TxFramer;

/// Point-in-time copy of the link counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Encrypted words waiting to go out.
    pub tx_pending: usize,
    /// Words that finished framing.
    pub tx_words_sent: u32,
    /// Words lost to a full TX ring.
    pub tx_dropped: u32,
    /// Raw words waiting for decryption.
    pub rx_pending: usize,
    /// Words assembled by the RX framer.
    pub rx_words_received: u32,
    /// Words lost to a full RX ring.
    pub rx_dropped: u32,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TX: sent={} pending={} dropped={}\r\nRX: received={} pending={} dropped={}",
            self.tx_words_sent,
            self.tx_pending,
            self.tx_dropped,
            self.rx_words_received,
            self.rx_pending,
            self.rx_dropped
        )
    }
}

/// References to every counter source on the link.
pub struct LinkStats<'a, const N: usize> {
    pub tx_framer: &'a TxFramer,
    pub tx_ring: &'a WordRing<N>,
    pub rx_framer: &'a RxFramer,
    pub rx_ring: &'a WordRing<N>,
}

impl<const N: usize> LinkStats<'_, N> {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            tx_pending: self.tx_ring.len(),
            tx_words_sent: self.tx_framer.words_sent(),
            tx_dropped: self.tx_ring.dropped(),
            rx_pending: self.rx_ring.len(),
            rx_words_received: self.rx_framer.words_received(),
            rx_dropped: self.rx_ring.dropped(),
        }
    }
}
