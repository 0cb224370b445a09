//! End-to-end link tests on the simulated wire

use rust_secure_vlc_link::config::{MapSeed, BIT_PERIOD_US, RING_CAPACITY};
use rust_secure_vlc_link::framing::{self, TX_TICKS_PER_WORD};
use rust_secure_vlc_link::hal::sim::{SimTimer, SimWire};
use rust_secure_vlc_link::tx::{self, TxPoll, TxState};
use rust_secure_vlc_link::{
    ContextSlot, EncryptionContext, EncryptionParams, Loopback, MapVariant, TxFramer,
};

fn params() -> EncryptionParams {
    EncryptionParams::new(
        MapVariant::Duffing,
        MapSeed::new(0.1, 0.2, 1000),
        MapSeed::new(0.3, 0.4, 1000),
    )
}

/// Line level after the arm and after each tick, until the timer stops.
fn trace(word: u32) -> (Vec<bool>, u32) {
    let framer = TxFramer::new();
    let wire = SimWire::new();
    let timer = SimTimer::new();

    assert!(framer.claim());
    framer.arm(word, &wire, &timer, BIT_PERIOD_US);
    let mut levels = vec![wire.level()];
    while timer.is_running() {
        framer.on_timer_tick(&wire, &timer);
        levels.push(wire.level());
    }
    (levels, wire.falling_edges())
}

#[test]
fn test_frame_trace_all_ones() {
    let (levels, edges) = trace(0xFFFF_FFFF);

    // Start level, 32 data bits, stop level, then held high by the disarm tick
    assert_eq!(levels.len() as u32, TX_TICKS_PER_WORD + 1);
    assert!(!levels[0]);
    assert!(levels[1..].iter().all(|&l| l));
    assert_eq!(edges, 1);
}

#[test]
fn test_frame_trace_is_lsb_first() {
    let word = 0x8000_0001;
    let (levels, _) = trace(word);

    for i in 0..32u8 {
        assert_eq!(levels[i as usize + 1], framing::bit(word, i), "bit {}", i);
    }
    assert!(levels[1]);
    assert!(!levels[2]);
    assert!(levels[32]);
    // Stop and idle
    assert!(levels[33]);
    assert!(levels[34]);
}

#[test]
fn test_hello_world_round_trip() {
    let bench = Loopback::new(BIT_PERIOD_US);
    let mut rx = bench.rx_coordinator();
    rx.install(EncryptionContext::from_params(&params()));
    let mut tx_ctx = EncryptionContext::from_params(&params());

    let received = bench.transfer(&mut tx_ctx, &mut rx, b"Hello World!");

    assert_eq!(received.as_slice(), b"Hello World!");
    assert_eq!(bench.tx_framer.words_sent(), 3);
    assert_eq!(bench.rx_framer.words_received(), 3);
    assert!(bench.wire.level());
    assert_eq!(bench.tx_framer.state(), TxState::Idle);
}

#[test]
fn test_partial_word_is_zero_padded() {
    let bench = Loopback::new(BIT_PERIOD_US);
    let mut rx = bench.rx_coordinator();
    rx.install(EncryptionContext::from_params(&params()));
    let mut tx_ctx = EncryptionContext::from_params(&params());

    let received = bench.transfer(&mut tx_ctx, &mut rx, b"Hello");
    assert_eq!(received.as_slice(), b"Hello\0\0\0");
}

#[test]
fn test_consecutive_messages_stay_in_step() {
    let bench = Loopback::new(BIT_PERIOD_US);
    let mut rx = bench.rx_coordinator();
    rx.install(EncryptionContext::from_params(&params()));
    let mut tx_ctx = EncryptionContext::from_params(&params());

    for msg in [&b"abcd"[..], b"efgh1234", b"zzzz"] {
        let received = bench.transfer(&mut tx_ctx, &mut rx, msg);
        assert_eq!(received.as_slice(), msg);
    }
}

#[test]
fn test_mismatched_keys_garble() {
    let bench = Loopback::new(BIT_PERIOD_US);
    let mut rx = bench.rx_coordinator();
    let mut other = params();
    other.map2.y = 0.41;
    rx.install(EncryptionContext::from_params(&other));
    let mut tx_ctx = EncryptionContext::from_params(&params());

    let received = bench.transfer(&mut tx_ctx, &mut rx, b"Hello World!");
    assert_eq!(received.len(), 12);
    assert_ne!(received.as_slice(), b"Hello World!");
}

#[test]
fn test_rx_waits_for_context_from_slot() {
    let bench = Loopback::new(BIT_PERIOD_US);
    let mut rx = bench.rx_coordinator();
    let mut tx_ctx = EncryptionContext::from_params(&params());

    let nothing = bench.transfer(&mut tx_ctx, &mut rx, b"ping");
    assert!(nothing.is_empty());
    assert_eq!(rx.pending(), 1);

    let slot = ContextSlot::new();
    slot.offer(EncryptionContext::from_params(&params()));
    assert!(rx.take_from(&slot));
    assert_eq!(rx.drain_received().as_slice(), b"ping");
}

#[test]
fn test_coordinator_settles_before_arming() {
    let bench = Loopback::new(BIT_PERIOD_US);
    let _rx = bench.rx_coordinator();
    let mut tx_coord = bench.tx_coordinator();
    tx_coord.idle_line();

    assert_eq!(bench.poll_tx(&mut tx_coord), TxPoll::Idle);

    let mut ctx = EncryptionContext::from_params(&params());
    tx::enqueue_message(&mut ctx, &bench.tx_ring, b"abcdefgh");
    assert_eq!(tx_coord.pending(), 2);

    assert_eq!(bench.poll_tx(&mut tx_coord), TxPoll::Settling);
    assert!(bench.wire.level());
    assert!(matches!(bench.poll_tx(&mut tx_coord), TxPoll::Armed(_)));
    assert_eq!(bench.poll_tx(&mut tx_coord), TxPoll::Busy);

    bench.run_until_idle(2 * TX_TICKS_PER_WORD);
    assert_eq!(bench.rx_ring.len(), 1);
    assert_eq!(tx_coord.pending(), 1);
}

#[test]
fn test_full_tx_ring_drops_extra_words() {
    let bench = Loopback::new(BIT_PERIOD_US);
    let mut ctx = EncryptionContext::from_params(&params());
    let message = vec![b'x'; (RING_CAPACITY + 2) * framing::WORD_BYTES];

    tx::enqueue_message(&mut ctx, &bench.tx_ring, &message);
    assert!(bench.tx_ring.is_full());
    assert_eq!(bench.tx_ring.dropped(), 2);
}
