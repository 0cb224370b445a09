//! # RustSecureVlcLink
//!
//! Encrypted one-wire link between two GPIO pins, bit-banged from hardware timers.
//!
//! ## Architecture
//!
//! ```text
//! console ──enqueue──▶ TX ring ──▶ TX coordinator ──▶ TX framer (timer ISR) ──▶ pin
//!   │                                                                          │
//!   └─ContextSlot──▶ RX coordinator ◀── RX ring ◀── RX framer (edge + timer ISR) ◀┘
//! ```
//!
//! - Words are XORed with a keystream from two chaotic maps feeding an MSWS generator
//! - Rings are lock-free SPSC; interrupt callbacks never block, allocate or lock
//! - Each direction's encryption context has exactly one owner
//!
//! Everything except `hal::esp` and the NVS backend builds and tests on the host.

#![cfg_attr(not(test), no_std)]

pub mod cipher;
pub mod config;
pub mod console;
pub mod framing;
pub mod hal;
pub mod log_drain;
pub mod log_globals;
pub mod logging;
pub mod loopback;
pub mod ring;
pub mod rx;
pub mod stats;
pub mod tx;

pub use cipher::{ContextSlot, EncryptionContext, MapVariant};
pub use config::{Direction, EncryptionParams, MapSeed};
pub use log_globals::{RX_LOG_STREAM, TX_LOG_STREAM};
pub use loopback::Loopback;
pub use ring::WordRing;
pub use rx::{RxCoordinator, RxFramer};
pub use stats::{LinkStats, StatsSnapshot};
pub use tx::{TxCoordinator, TxFramer};

/// Ring type used for both directions.
pub type LinkRing = WordRing<{ config::RING_CAPACITY }>;
