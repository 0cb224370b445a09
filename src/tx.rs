//! Transmit side of the link: word production and the bit-clock state machine.
//!
//! # State machine
//!
//! ```text
//!          poll: ring non-empty        poll: pop, line low, arm timer
//!   Idle ───────────────────────▶ Settling ─────────────────────────▶ Framing(0)
//!    ▲                                                                    │ tick: drive bit i
//!    │ tick: stop timer                    tick: line high                ▼
//!   Stop ◀──────────────────────────────────────────────────────── Framing(32)
//! ```
//!
//! Ticks come from the periodic timer callback (interrupt context); polls come from the
//! TX coordinator task. The two only share atomics, never a lock.
//!
//! Settling holds the line for one poll interval between claiming it and driving the
//! start level. Stop always returns to `Idle` with the bit index reset, so the next
//! arm starts at bit 0.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use crate::cipher::EncryptionContext;
use crate::framing::{self, WORD_BITS};
use crate::hal::{OutputLine, PeriodicTimer};
use crate::ring::WordRing;

/// TX framer state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxState {
    /// Line idle high, nothing claimed.
    Idle,
    /// Line claimed by the coordinator, start level not yet driven.
    Settling,
    /// Next tick drives data bit `i` (or the stop level when `i == 32`).
    Framing(u8),
    /// Stop level on the line; next tick disarms the timer.
    Stop,
}

const RAW_IDLE: u8 = 0xFF;
const RAW_SETTLING: u8 = 0xFE;
const RAW_STOP: u8 = 0xFD;

impl TxState {
    #[inline]
    const fn into_raw(self) -> u8 {
        match self {
            TxState::Idle => RAW_IDLE,
            TxState::Settling => RAW_SETTLING,
            TxState::Stop => RAW_STOP,
            TxState::Framing(i) => i,
        }
    }

    #[inline]
    const fn from_raw(raw: u8) -> Self {
        match raw {
            RAW_SETTLING => TxState::Settling,
            RAW_STOP => TxState::Stop,
            i if i <= WORD_BITS => TxState::Framing(i),
            _ => TxState::Idle,
        }
    }
}

/// Bit-clock state machine for the TX line.
///
/// Lives in a `static`; [`TxFramer::on_timer_tick`] is called from the timer interrupt
/// and the arm path from the TX coordinator.
pub struct TxFramer {
    state: AtomicU8,
    current_word: AtomicU32,
    in_progress: AtomicBool,
    words_sent: AtomicU32,
}

impl TxFramer {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(RAW_IDLE),
            current_word: AtomicU32::new(0),
            in_progress: AtomicBool::new(false),
            words_sent: AtomicU32::new(0),
        }
    }

    #[inline]
    pub fn state(&self) -> TxState {
        TxState::from_raw(self.state.load(Ordering::Acquire))
    }

    #[inline]
    fn set_state(&self, state: TxState) {
        self.state.store(state.into_raw(), Ordering::Release);
    }

    /// True from the moment the line is claimed until the stop tick.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Word currently (or most recently) on the line.
    #[inline]
    pub fn current_word(&self) -> u32 {
        self.current_word.load(Ordering::Relaxed)
    }

    /// Words that ran to completion since boot.
    #[inline]
    pub fn words_sent(&self) -> u32 {
        self.words_sent.load(Ordering::Relaxed)
    }

    /// Claim an idle line. Returns `false` if a word is already in flight.
    pub fn claim(&self) -> bool {
        let claimed = self
            .state
            .compare_exchange(
                RAW_IDLE,
                RAW_SETTLING,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if claimed {
            self.in_progress.store(true, Ordering::Release);
        }
        claimed
    }

    /// Give back a claimed line without sending anything.
    pub fn release(&self) {
        if self.state() == TxState::Settling {
            self.in_progress.store(false, Ordering::Release);
            self.set_state(TxState::Idle);
        }
    }

    /// Drive the start level and start the bit clock for `word`.
    ///
    /// The line must have been claimed; state is published before the timer starts so
    /// the first tick sees `Framing(0)`.
    pub fn arm<P: OutputLine, T: PeriodicTimer>(
        &self,
        word: u32,
        pin: &P,
        timer: &T,
        period_us: u32,
    ) {
        self.current_word.store(word, Ordering::Relaxed);
        self.in_progress.store(true, Ordering::Release);
        self.set_state(TxState::Framing(0));
        pin.set_low();
        timer.start(period_us);
    }

    /// Timer callback body. O(1), no allocation, no locks.
    #[inline]
    pub fn on_timer_tick<P: OutputLine, T: PeriodicTimer>(&self, pin: &P, timer: &T) {
        match self.state() {
            TxState::Framing(i) if i < WORD_BITS => {
                pin.set_level(framing::bit(self.current_word(), i));
                self.set_state(TxState::Framing(i + 1));
            }
            TxState::Framing(_) => {
                pin.set_high();
                self.set_state(TxState::Stop);
            }
            TxState::Stop => {
                timer.stop();
                self.words_sent.fetch_add(1, Ordering::Relaxed);
                self.in_progress.store(false, Ordering::Release);
                self.set_state(TxState::Idle);
            }
            // Stray tick after a stop: nothing is framing.
            TxState::Idle | TxState::Settling => timer.stop(),
        }
    }
}

impl Default for TxFramer {
    fn default() -> Self {
        Self::new()
    }
}

/// Encrypt `message` and queue it for transmission.
///
/// Bytes are packed into little-endian words (last one zero-padded), each XORed with
/// the next keystream word. A full ring silently drops the word; the keystream still
/// advances, so RX decryption of later words desynchronises.
pub fn enqueue_message<const N: usize>(
    ctx: &mut EncryptionContext,
    ring: &WordRing<N>,
    message: &[u8],
) {
    for word in framing::words(message) {
        ring.push(ctx.apply(word));
    }
}

/// What a coordinator poll did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxPoll {
    /// Nothing queued.
    Idle,
    /// Line claimed; the word goes out on the next poll.
    Settling,
    /// Word popped and framing started.
    Armed(u32),
    /// A word is still on the line.
    Busy,
}

/// Task-side driver of the TX framer.
pub struct TxCoordinator<'a, P, T, const N: usize> {
    framer: &'a TxFramer,
    ring: &'a WordRing<N>,
    pin: &'a P,
    timer: &'a T,
    period_us: u32,
}

impl<'a, P: OutputLine, T: PeriodicTimer, const N: usize> TxCoordinator<'a, P, T, N> {
    pub fn new(
        framer: &'a TxFramer,
        ring: &'a WordRing<N>,
        pin: &'a P,
        timer: &'a T,
        period_us: u32,
    ) -> Self {
        Self {
            framer,
            ring,
            pin,
            timer,
            period_us,
        }
    }

    /// Drive the line to its idle level. Call once before the first poll.
    pub fn idle_line(&self) {
        self.pin.set_high();
    }

    /// One coordinator step; call every poll interval.
    pub fn poll(&mut self) -> TxPoll {
        match self.framer.state() {
            TxState::Idle => {
                if !self.ring.is_empty() && self.framer.claim() {
                    TxPoll::Settling
                } else {
                    TxPoll::Idle
                }
            }
            TxState::Settling => match self.ring.pop() {
                Some(word) => {
                    self.framer.arm(word, self.pin, self.timer, self.period_us);
                    TxPoll::Armed(word)
                }
                None => {
                    self.framer.release();
                    TxPoll::Idle
                }
            },
            TxState::Framing(_) | TxState::Stop => TxPoll::Busy,
        }
    }

    /// Words waiting in the TX ring.
    pub fn pending(&self) -> usize {
        self.ring.len()
    }
}
