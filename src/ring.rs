//! Lock-free SPSC word ring shared between interrupt and task context.
//!
//! # Architecture
//!
//! ```text
//! TX:  console task ──push──▶ WordRing ──pop──▶ TX coordinator
//! RX:  RX timer ISR ──push──▶ WordRing ──pop──▶ RX coordinator
//! ```
//!
//! # Rules
//!
//! - Exactly one producer and one consumer per ring
//! - Occupancy is derived from the two indices; there is no shared count field,
//!   so the producer only ever writes `tail` and the consumer only ever writes `head`
//! - Never blocks, never allocates, O(1)
//! - A push on a full ring is rejected and counted, never retried

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// Fixed-capacity ring of 32-bit words.
///
/// `head` and `tail` are free-running (wrapping) counters; the slot index is the
/// counter masked to the capacity. `tail - head` is the occupancy and never exceeds `N`.
///
/// # Safety
///
/// `push` must only be called from one execution context and `pop` from one (possibly
/// different) execution context. This is a usage contract, not enforced by the type system.
///
/// # Memory Ordering
///
/// - Producer publishes a slot with a `Release` store of `tail`
/// - Consumer frees a slot with a `Release` store of `head`
/// - Each side reads the other's index with `Acquire`
pub struct WordRing<const N: usize> {
    slots: UnsafeCell<[u32; N]>,
    head: AtomicUsize,
    tail: AtomicUsize,
    dropped: AtomicU32,
}

// SAFETY: Single producer, single consumer, coordinated through atomic indices.
// The producer writes only slots outside [head, tail); the consumer reads only inside.
unsafe impl<const N: usize> Sync for WordRing<N> {}
unsafe impl<const N: usize> Send for WordRing<N> {}

impl<const N: usize> WordRing<N> {
    /// Mask for wrapping a counter to a slot index.
    /// N must be a power of 2.
    const MASK: usize = N - 1;

    /// Create a new empty ring.
    ///
    /// # Panics
    ///
    /// Panics at compile time if N is not a power of 2.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Ring size must be power of 2");

        Self {
            slots: UnsafeCell::new([0; N]),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Append a word.
    ///
    /// Returns `false` (word discarded, drop counter bumped) iff the ring is full.
    #[inline]
    pub fn push(&self, word: u32) -> bool {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);

        if tail.wrapping_sub(head) >= N {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        // SAFETY: Single producer; slot `tail` is outside the consumer's window.
        unsafe {
            (*self.slots.get())[tail & Self::MASK] = word;
        }
        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        true
    }

    /// Remove the oldest word, or `None` if the ring is empty.
    #[inline]
    pub fn pop(&self) -> Option<u32> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);

        if head == tail {
            return None;
        }

        // SAFETY: Single consumer; slot `head` was published by the Release store of `tail`.
        let word = unsafe { (*self.slots.get())[head & Self::MASK] };
        self.head.store(head.wrapping_add(1), Ordering::Release);
        Some(word)
    }

    /// Number of words waiting.
    #[inline]
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        tail.wrapping_sub(head).min(N)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    /// Free slots.
    #[inline]
    pub fn available(&self) -> usize {
        N - self.len()
    }

    /// Words rejected because the ring was full, since boot.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for WordRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_basic_push_pop() {
        let ring = WordRing::<8>::new();
        assert!(ring.is_empty());
        assert!(ring.push(42));
        assert_eq!(ring.len(), 1);
        assert_eq!(ring.pop(), Some(42));
        assert_eq!(ring.pop(), None);
    }

    #[test]
    fn test_ring_full_rejects_and_counts() {
        let ring = WordRing::<4>::new();
        for i in 0..4 {
            assert!(ring.push(i));
        }
        assert!(ring.is_full());
        assert!(!ring.push(99));
        assert_eq!(ring.dropped(), 1);
        assert_eq!(ring.len(), 4);
        assert_eq!(ring.pop(), Some(0));
    }

    #[test]
    fn test_ring_counters_wrap() {
        let ring = WordRing::<4>::new();
        ring.head.store(usize::MAX - 1, Ordering::Relaxed);
        ring.tail.store(usize::MAX - 1, Ordering::Relaxed);

        for i in 0..4 {
            assert!(ring.push(i));
        }
        assert!(!ring.push(4));
        for i in 0..4 {
            assert_eq!(ring.pop(), Some(i));
        }
        assert!(ring.is_empty());
    }

    #[test]
    fn test_ring_spsc_threads_preserve_order() {
        use std::sync::Arc;
        use std::thread;

        let ring = Arc::new(WordRing::<16>::new());
        let producer = {
            let ring = Arc::clone(&ring);
            thread::spawn(move || {
                for i in 0..10_000u32 {
                    while !ring.push(i) {
                        thread::yield_now();
                    }
                }
            })
        };

        let mut expected = 0u32;
        while expected < 10_000 {
            if let Some(word) = ring.pop() {
                assert_eq!(word, expected);
                expected += 1;
            }
        }
        producer.join().unwrap();
        assert!(ring.is_empty());
    }
}
