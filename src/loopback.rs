//! Deterministic single-wire loopback of the whole link.
//!
//! # Architecture
//!
//! ```text
//! TxCoordinator ──▶ TxFramer ──▶ SimWire ──▶ RxFramer ──▶ rx ring ──▶ RxCoordinator
//!                      ▲             │            ▲
//!                   tx_timer     falling edge  rx_timer
//! ```
//!
//! Time advances one bit period per [`Loopback::tick`]: the TX timer callback runs
//! first, then the RX timer callback, then a latched falling edge is dispatched if the
//! edge trigger is armed. Both timers share the bit period, so RX tick `i + 1` after the
//! start edge samples the level TX tick `i + 1` just drove (data bit `i`).

use crate::cipher::EncryptionContext;
use crate::config::RING_CAPACITY;
use crate::framing::TX_TICKS_PER_WORD;
use crate::hal::sim::{SimEdgeTrigger, SimTimer, SimWire};
use crate::ring::WordRing;
use crate::rx::{ReceivedBytes, RxCoordinator, RxFramer};
use crate::tx::{self, TxCoordinator, TxFramer, TxPoll};

/// TX coordinator type over the simulated peripherals.
pub type SimTxCoordinator<'a> = TxCoordinator<'a, SimWire, SimTimer, RING_CAPACITY>;

/// Both halves of the link on one simulated wire.
pub struct Loopback {
    pub wire: SimWire,
    pub tx_timer: SimTimer,
    pub rx_timer: SimTimer,
    pub edge: SimEdgeTrigger,
    pub tx_framer: TxFramer,
    pub rx_framer: RxFramer,
    pub tx_ring: WordRing<RING_CAPACITY>,
    pub rx_ring: WordRing<RING_CAPACITY>,
    period_us: u32,
}

impl Loopback {
    pub const fn new(period_us: u32) -> Self {
        Self {
            wire: SimWire::new(),
            tx_timer: SimTimer::new(),
            rx_timer: SimTimer::new(),
            edge: SimEdgeTrigger::new(),
            tx_framer: TxFramer::new(),
            rx_framer: RxFramer::new(),
            tx_ring: WordRing::new(),
            rx_ring: WordRing::new(),
            period_us,
        }
    }

    pub fn tx_coordinator(&self) -> SimTxCoordinator<'_> {
        TxCoordinator::new(
            &self.tx_framer,
            &self.tx_ring,
            &self.wire,
            &self.tx_timer,
            self.period_us,
        )
    }

    /// RX coordinator with its edge trigger already armed.
    pub fn rx_coordinator(&self) -> RxCoordinator<'_, RING_CAPACITY> {
        let coordinator = RxCoordinator::new(&self.rx_ring, &self.rx_framer);
        coordinator.start_listening(&self.edge);
        coordinator
    }

    /// One bit period.
    pub fn tick(&self) {
        if self.tx_timer.is_running() {
            self.tx_framer.on_timer_tick(&self.wire, &self.tx_timer);
        }
        if self.rx_timer.is_running() {
            self.rx_framer
                .on_timer_tick(&self.wire, &self.rx_timer, &self.edge, &self.rx_ring);
        }
        self.dispatch_edge();
    }

    /// Deliver a latched falling edge to the RX framer if the trigger is armed.
    ///
    /// An edge seen while disarmed is discarded, as the hardware would.
    pub fn dispatch_edge(&self) -> bool {
        if !self.wire.take_falling_edge() || !self.edge.is_armed() {
            return false;
        }
        self.rx_framer
            .on_falling_edge(&self.rx_timer, &self.edge, self.period_us);
        true
    }

    /// Run bit periods until both timers are idle.
    ///
    /// Returns the ticks taken, capped at `max_ticks`.
    pub fn run_until_idle(&self, max_ticks: u32) -> u32 {
        let mut ticks = 0;
        while (self.tx_timer.is_running() || self.rx_timer.is_running()) && ticks < max_ticks {
            self.tick();
            ticks += 1;
        }
        ticks
    }

    /// Poll the TX coordinator, delivering any start edge it produced.
    pub fn poll_tx(&self, tx: &mut SimTxCoordinator<'_>) -> TxPoll {
        let poll = tx.poll();
        self.dispatch_edge();
        poll
    }

    /// Encrypt, send and receive `message`, returning what the RX side decrypted.
    ///
    /// Drives the coordinators the way the tasks do: one poll claims the line, the next
    /// arms the word, then the bit clock runs to completion.
    pub fn transfer(
        &self,
        tx_ctx: &mut EncryptionContext,
        rx: &mut RxCoordinator<'_, RING_CAPACITY>,
        message: &[u8],
    ) -> ReceivedBytes {
        tx::enqueue_message(tx_ctx, &self.tx_ring, message);

        let mut tx = self.tx_coordinator();
        tx.idle_line();
        let max_ticks = TX_TICKS_PER_WORD + 2;
        while !self.tx_ring.is_empty() || self.tx_framer.is_busy() {
            if let TxPoll::Armed(_) = self.poll_tx(&mut tx) {
                self.run_until_idle(max_ticks);
            }
        }
        rx.drain_received()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::{ChaoticMap, ChaoticMapState, MapVariant};
    use crate::config::BIT_PERIOD_US;
    use crate::hal::OutputLine;

    fn ctx() -> EncryptionContext {
        EncryptionContext::new(
            MapVariant::Logistic,
            ChaoticMap::new(ChaoticMapState::new(0.31, 0.72), 300),
            ChaoticMap::new(ChaoticMapState::new(0.44, 0.12), 400),
        )
    }

    #[test]
    fn test_single_word_passes_unmodified_bits() {
        let bench = Loopback::new(BIT_PERIOD_US);
        let rx = bench.rx_coordinator();
        let mut tx = bench.tx_coordinator();

        bench.tx_ring.push(0x1234_5678);
        assert_eq!(bench.poll_tx(&mut tx), TxPoll::Settling);
        assert_eq!(bench.poll_tx(&mut tx), TxPoll::Armed(0x1234_5678));
        assert!(bench.rx_timer.is_running());

        bench.run_until_idle(64);
        assert_eq!(bench.rx_ring.pop(), Some(0x1234_5678));
        assert!(bench.wire.level());
        assert!(bench.edge.is_armed());
        assert_eq!(rx.pending(), 0);
    }

    #[test]
    fn test_transfer_round_trip() {
        let bench = Loopback::new(BIT_PERIOD_US);
        let mut rx = bench.rx_coordinator();
        rx.install(ctx());
        let mut tx_ctx = ctx();

        let got = bench.transfer(&mut tx_ctx, &mut rx, b"Hello World!");
        assert_eq!(got.as_slice(), b"Hello World!");
        assert_eq!(bench.tx_framer.words_sent(), 3);
        assert_eq!(bench.rx_framer.words_received(), 3);
    }

    #[test]
    fn test_edge_dropped_while_disarmed() {
        let bench = Loopback::new(BIT_PERIOD_US);
        bench.wire.set_low();
        assert!(!bench.dispatch_edge());
        assert!(!bench.rx_timer.is_running());
    }
}
