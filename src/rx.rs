//! Receive side of the link: edge-triggered sampling and task-side decryption.
//!
//! # State machine
//!
//! ```text
//!                 falling edge: disarm edge, acc = 0, start timer
//!  ArmedForEdge ─────────────────────────────────────────────▶ Sampling(0)
//!       ▲                                                          │ tick: acc |= pin << i
//!       │ tick: stop timer, push acc, re-arm edge                  ▼
//!       └───────────────────────────────────────────────── Sampling(32)
//! ```
//!
//! The interrupt side only assembles raw (still encrypted) words. Decryption happens in
//! [`RxCoordinator::drain_received`], in task context, where the keystream lives.
//!
//! There is no mid-word resynchronisation: a missed tick garbles the rest of that word,
//! and the next falling edge after re-arming starts a fresh one.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use heapless::Vec;

use crate::cipher::{ContextSlot, EncryptionContext};
use crate::config::MAX_MESSAGE_BYTES;
use crate::framing::{self, HexWords, WORD_BITS, WORD_BYTES};
use crate::hal::{EdgeTrigger, InputLine, PeriodicTimer};
use crate::logging::LogStream;
use crate::ring::WordRing;

/// Decrypted bytes handed to the console per drain.
pub type ReceivedBytes = Vec<u8, MAX_MESSAGE_BYTES>;

/// RX framer state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RxState {
    /// Waiting for the start edge.
    ArmedForEdge,
    /// Next tick samples data bit `i` (or hands the word off when `i == 32`).
    Sampling(u8),
}

const RAW_ARMED: u8 = 0xFF;

impl RxState {
    #[inline]
    const fn into_raw(self) -> u8 {
        match self {
            RxState::ArmedForEdge => RAW_ARMED,
            RxState::Sampling(i) => i,
        }
    }

    #[inline]
    const fn from_raw(raw: u8) -> Self {
        if raw <= WORD_BITS {
            RxState::Sampling(raw)
        } else {
            RxState::ArmedForEdge
        }
    }
}

/// Sampling state machine for the RX line.
///
/// Lives in a `static`; both entry points run in interrupt context.
pub struct RxFramer {
    state: AtomicU8,
    accumulator: AtomicU32,
    words_received: AtomicU32,
    word_complete: AtomicBool,
}

impl RxFramer {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(RAW_ARMED),
            accumulator: AtomicU32::new(0),
            words_received: AtomicU32::new(0),
            word_complete: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn state(&self) -> RxState {
        RxState::from_raw(self.state.load(Ordering::Acquire))
    }

    #[inline]
    fn set_state(&self, state: RxState) {
        self.state.store(state.into_raw(), Ordering::Release);
    }

    /// Words assembled since boot, including ones the ring had to drop.
    #[inline]
    pub fn words_received(&self) -> u32 {
        self.words_received.load(Ordering::Relaxed)
    }

    /// Consume the "a word just landed" flag.
    #[inline]
    pub fn take_word_complete(&self) -> bool {
        self.word_complete.swap(false, Ordering::AcqRel)
    }

    /// Edge callback body. Ignored unless waiting for a start edge.
    #[inline]
    pub fn on_falling_edge<T: PeriodicTimer, E: EdgeTrigger>(
        &self,
        timer: &T,
        trigger: &E,
        period_us: u32,
    ) {
        if self.state() != RxState::ArmedForEdge {
            return;
        }
        trigger.disarm();
        self.accumulator.store(0, Ordering::Relaxed);
        self.set_state(RxState::Sampling(0));
        timer.start(period_us);
    }

    /// Timer callback body. O(1), no allocation, no locks.
    #[inline]
    pub fn on_timer_tick<P: InputLine, T: PeriodicTimer, E: EdgeTrigger, const N: usize>(
        &self,
        pin: &P,
        timer: &T,
        trigger: &E,
        ring: &WordRing<N>,
    ) {
        match self.state() {
            RxState::Sampling(i) if i < WORD_BITS => {
                if pin.is_high() {
                    self.accumulator.fetch_or(1 << i, Ordering::Relaxed);
                }
                self.set_state(RxState::Sampling(i + 1));
            }
            RxState::Sampling(_) => {
                timer.stop();
                // A full ring counts the drop itself.
                ring.push(self.accumulator.load(Ordering::Relaxed));
                self.words_received.fetch_add(1, Ordering::Relaxed);
                self.word_complete.store(true, Ordering::Release);
                self.set_state(RxState::ArmedForEdge);
                trigger.arm();
            }
            RxState::ArmedForEdge => timer.stop(),
        }
    }
}

impl Default for RxFramer {
    fn default() -> Self {
        Self::new()
    }
}

/// Task-side consumer of the RX ring.
pub struct RxCoordinator<'a, const N: usize> {
    ring: &'a WordRing<N>,
    framer: &'a RxFramer,
    ctx: Option<EncryptionContext>,
}

impl<'a, const N: usize> RxCoordinator<'a, N> {
    pub fn new(ring: &'a WordRing<N>, framer: &'a RxFramer) -> Self {
        Self {
            ring,
            framer,
            ctx: None,
        }
    }

    /// Replace the decryption context.
    pub fn install(&mut self, ctx: EncryptionContext) {
        self.ctx = Some(ctx);
    }

    /// Pick up a freshly seeded context, if one is waiting. Returns `true` on pickup.
    pub fn take_from(&mut self, slot: &ContextSlot) -> bool {
        match slot.take() {
            Some(ctx) => {
                self.install(ctx);
                true
            }
            None => false,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.ctx.is_some()
    }

    /// Arm the start-edge interrupt. Call once the RX context is in place.
    pub fn start_listening<E: EdgeTrigger>(&self, trigger: &E) {
        trigger.arm();
    }

    /// Raw words waiting in the RX ring.
    pub fn pending(&self) -> usize {
        self.ring.len()
    }

    pub fn framer(&self) -> &RxFramer {
        self.framer
    }

    /// Decrypt every available word into bytes.
    ///
    /// Non-blocking. Returns nothing while unconfigured (words stay queued). Stops early
    /// once the buffer cannot take another whole word; the rest waits for the next call.
    pub fn drain_received(&mut self) -> ReceivedBytes {
        let mut out = ReceivedBytes::new();
        let Some(ctx) = self.ctx.as_mut() else {
            return out;
        };

        while out.capacity() - out.len() >= WORD_BYTES {
            let Some(word) = self.ring.pop() else {
                break;
            };
            let plain = ctx.apply(word);
            // Capacity was checked above.
            let _ = out.extend_from_slice(&framing::unpack_word(plain));
        }
        out
    }
}

/// Bytes per received-data log line.
pub const REPORT_CHUNK: usize = 16;

/// Log received bytes as grouped hex, with the text alongside when printable.
///
/// Split into lines of [`REPORT_CHUNK`] bytes so each fits one log entry.
pub fn log_received<const L: usize>(stream: &LogStream<L>, now_us: i64, bytes: &[u8]) {
    for chunk in bytes.chunks(REPORT_CHUNK) {
        match core::str::from_utf8(chunk) {
            Ok(text) if framing::is_printable(chunk) => {
                crate::rt_info!(stream, now_us, "rx {} | {}", HexWords(chunk), text)
            }
            _ => crate::rt_info!(stream, now_us, "rx {}", HexWords(chunk)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::{ChaoticMap, ChaoticMapState, MapVariant};
    use crate::hal::sim::{SimEdgeTrigger, SimTimer, SimWire};

    fn ctx() -> EncryptionContext {
        EncryptionContext::new(
            MapVariant::Duffing,
            ChaoticMap::new(ChaoticMapState::new(0.1, 0.1), 200),
            ChaoticMap::new(ChaoticMapState::new(0.2, 0.2), 200),
        )
    }

    #[test]
    fn test_state_raw_roundtrip() {
        for state in [
            RxState::ArmedForEdge,
            RxState::Sampling(0),
            RxState::Sampling(32),
        ] {
            assert_eq!(RxState::from_raw(state.into_raw()), state);
        }
    }

    #[test]
    fn test_samples_constant_high_line() {
        let framer = RxFramer::new();
        let wire = SimWire::new();
        let timer = SimTimer::new();
        let edge = SimEdgeTrigger::new();
        let ring: WordRing<4> = WordRing::new();
        edge.arm();

        framer.on_falling_edge(&timer, &edge, 20);
        assert!(!edge.is_armed());
        assert!(timer.is_running());

        let mut ticks = 0;
        while timer.is_running() {
            framer.on_timer_tick(&wire, &timer, &edge, &ring);
            ticks += 1;
        }
        assert_eq!(ticks, framing::RX_TICKS_PER_WORD);
        assert_eq!(ring.pop(), Some(u32::MAX));
        assert!(edge.is_armed());
        assert!(framer.take_word_complete());
        assert!(!framer.take_word_complete());
        assert_eq!(framer.words_received(), 1);
    }

    #[test]
    fn test_edge_ignored_while_sampling() {
        let framer = RxFramer::new();
        let timer = SimTimer::new();
        let edge = SimEdgeTrigger::new();

        framer.on_falling_edge(&timer, &edge, 20);
        framer.on_falling_edge(&timer, &edge, 20);
        assert_eq!(timer.starts(), 1);
        assert_eq!(framer.state(), RxState::Sampling(0));
    }

    #[test]
    fn test_full_ring_drops_word() {
        let framer = RxFramer::new();
        let wire = SimWire::new();
        let timer = SimTimer::new();
        let edge = SimEdgeTrigger::new();
        let ring: WordRing<2> = WordRing::new();
        ring.push(1);
        ring.push(2);

        framer.on_falling_edge(&timer, &edge, 20);
        while timer.is_running() {
            framer.on_timer_tick(&wire, &timer, &edge, &ring);
        }
        assert_eq!(ring.dropped(), 1);
        assert_eq!(ring.pop(), Some(1));
        assert_eq!(framer.state(), RxState::ArmedForEdge);
    }

    #[test]
    fn test_log_received_chunks() {
        let stream = LogStream::<8>::new();
        log_received(&stream, 5, b"Hello World! 0123456789");
        log_received(&stream, 6, &[0x00, 0xFF]);

        assert_eq!(
            stream.drain().unwrap().message(),
            "rx 48656C6C 6F20576F 726C6421 20303132 | Hello World! 012"
        );
        assert_eq!(stream.drain().unwrap().message(), "rx 33343536 373839 | 3456789");
        assert_eq!(stream.drain().unwrap().message(), "rx 00FF");
        assert!(stream.drain().is_none());
    }

    #[test]
    fn test_drain_requires_context() {
        let ring: WordRing<4> = WordRing::new();
        let framer = RxFramer::new();
        ring.push(0xDEAD_BEEF);

        let mut coordinator = RxCoordinator::new(&ring, &framer);
        assert!(coordinator.drain_received().is_empty());
        assert_eq!(coordinator.pending(), 1);

        let slot = ContextSlot::new();
        slot.offer(ctx());
        assert!(coordinator.take_from(&slot));
        assert!(coordinator.is_configured());

        let mut reference = ctx();
        let bytes = coordinator.drain_received();
        assert_eq!(
            bytes.as_slice(),
            &framing::unpack_word(reference.apply(0xDEAD_BEEF))
        );
        assert_eq!(coordinator.pending(), 0);
    }
}
