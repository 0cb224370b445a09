//! Module: config
//!
//! Purpose: Link configuration for the secure VLC link.
//!
//! Architecture:
//! - Build-time constants: pins, bit period, ring sizes, task layout
//! - `EncryptionParams`: per-direction seed set entered on the console
//! - `nvs`: versioned persistence of the seed sets
//!
//! Safety: Constants only on the RT path. Params are validated in task context and
//! never touched by interrupt callbacks.

use core::fmt;

use crate::cipher::MapVariant;

pub mod nvs;

// ============================================================================
// LINK CONSTANTS
// ============================================================================

/// GPIO driving the TX line.
pub const TX_GPIO_PIN: i32 = 6;

/// GPIO sampling the RX line.
pub const RX_GPIO_PIN: i32 = 7;

/// Bit period, identical on both ends of the link.
pub const BIT_PERIOD_US: u32 = 20;

/// Bit-clock timer resolution (1 tick = 1 µs).
pub const TIMER_RESOLUTION_HZ: u32 = 1_000_000;

/// Interrupt priority of both bit-clock timers.
pub const TIMER_INTR_PRIORITY: i32 = 3;

/// Words per direction ring. Must be a power of two.
pub const RING_CAPACITY: usize = 128;

/// Largest message the console accepts, and the RX drain buffer size.
pub const MAX_MESSAGE_BYTES: usize = RING_CAPACITY * crate::framing::WORD_BYTES;

/// Coordinator poll interval. One interval is also the settle time before each word.
pub const POLL_INTERVAL_MS: u32 = 10;

/// Core each task is pinned to.
pub const CONSOLE_CORE: i32 = 0;
pub const TX_CORE: i32 = 0;
pub const RX_CORE: i32 = 1;

/// Stack size for each task.
pub const TASK_STACK_BYTES: u32 = 16 * 1024;

/// Warm-up bounds enforced by the configuration layer.
pub const MIN_ITERATIONS: u32 = 200;
pub const MAX_ITERATIONS: u32 = 1_000_000;

/// Bit rate of the link.
pub const fn link_frequency_hz() -> u32 {
    TIMER_RESOLUTION_HZ / BIT_PERIOD_US
}

// ============================================================================
// DIRECTION
// ============================================================================

/// Link direction a parameter set applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Tx,
    Rx,
}

impl Direction {
    /// Parse a console flag: `-TX` / `-RX` (case-insensitive).
    pub fn parse(flag: &str) -> Option<Self> {
        if flag.eq_ignore_ascii_case("-tx") {
            Some(Direction::Tx)
        } else if flag.eq_ignore_ascii_case("-rx") {
            Some(Direction::Rx)
        } else {
            None
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Direction::Tx => "TX",
            Direction::Rx => "RX",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// ENCRYPTION PARAMETERS
// ============================================================================

/// Seed of one chaotic map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapSeed {
    pub x: f64,
    pub y: f64,
    pub iterations: u32,
}

impl MapSeed {
    pub const fn new(x: f64, y: f64, iterations: u32) -> Self {
        Self { x, y, iterations }
    }
}

/// Size of the persisted parameter blob.
pub const PARAMS_BLOB_LEN: usize = 1 + 4 * 8 + 2 * 4;

/// Everything needed to seed one direction's keystream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EncryptionParams {
    pub variant: MapVariant,
    pub map1: MapSeed,
    pub map2: MapSeed,
}

/// Parameter validation errors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    /// Seed coordinate outside the variant's domain.
    OutOfDomain {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::OutOfDomain {
                field,
                value,
                min,
                max,
            } => write!(f, "{} = {} outside [{}, {}]", field, value, min, max),
        }
    }
}

impl EncryptionParams {
    pub const fn new(variant: MapVariant, map1: MapSeed, map2: MapSeed) -> Self {
        Self {
            variant,
            map1,
            map2,
        }
    }

    /// Check seeds against the variant's domain and clamp iteration counts.
    ///
    /// Clamping is not an error; it is logged and the adjusted params are returned.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        let (min, max) = self.variant.domain();
        for (field, value) in [
            ("x1", self.map1.x),
            ("y1", self.map1.y),
            ("x2", self.map2.x),
            ("y2", self.map2.y),
        ] {
            // Written so NaN fails too.
            if !(value >= min && value <= max) {
                return Err(ConfigError::OutOfDomain {
                    field,
                    value,
                    min,
                    max,
                });
            }
        }

        self.map1.iterations = clamp_iterations("it1", self.map1.iterations);
        self.map2.iterations = clamp_iterations("it2", self.map2.iterations);
        Ok(self)
    }

    /// Encode as the fixed little-endian NVS blob.
    ///
    /// Layout: variant tag, x1, y1, x2, y2 (f64), it1, it2 (u32).
    pub fn to_bytes(&self) -> [u8; PARAMS_BLOB_LEN] {
        let mut out = [0u8; PARAMS_BLOB_LEN];
        out[0] = self.variant as u8;
        let mut at = 1;
        for v in [self.map1.x, self.map1.y, self.map2.x, self.map2.y] {
            out[at..at + 8].copy_from_slice(&v.to_le_bytes());
            at += 8;
        }
        for it in [self.map1.iterations, self.map2.iterations] {
            out[at..at + 4].copy_from_slice(&it.to_le_bytes());
            at += 4;
        }
        out
    }

    /// Decode a blob written by [`EncryptionParams::to_bytes`].
    ///
    /// Returns `None` on wrong length or unknown variant tag.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != PARAMS_BLOB_LEN {
            return None;
        }
        let variant = MapVariant::from_u8(bytes[0])?;
        let f = |at: usize| {
            let mut b = [0u8; 8];
            b.copy_from_slice(&bytes[at..at + 8]);
            f64::from_le_bytes(b)
        };
        let u = |at: usize| {
            let mut b = [0u8; 4];
            b.copy_from_slice(&bytes[at..at + 4]);
            u32::from_le_bytes(b)
        };
        Some(Self {
            variant,
            map1: MapSeed::new(f(1), f(9), u(33)),
            map2: MapSeed::new(f(17), f(25), u(37)),
        })
    }
}

fn clamp_iterations(field: &str, iterations: u32) -> u32 {
    let clamped = iterations.clamp(MIN_ITERATIONS, MAX_ITERATIONS);
    if clamped != iterations {
        log::warn!("{} = {} clamped to {}", field, iterations, clamped);
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> EncryptionParams {
        EncryptionParams::new(
            MapVariant::Duffing,
            MapSeed::new(0.1, -0.2, 500),
            MapSeed::new(0.3, 0.4, 700),
        )
    }

    #[test]
    fn test_link_frequency() {
        assert_eq!(link_frequency_hz(), 50_000);
    }

    #[test]
    fn test_ring_capacity_power_of_two() {
        assert!(RING_CAPACITY.is_power_of_two());
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(Direction::parse("-TX"), Some(Direction::Tx));
        assert_eq!(Direction::parse("-rx"), Some(Direction::Rx));
        assert_eq!(Direction::parse("TX"), None);
    }

    #[test]
    fn test_validate_accepts_in_domain() {
        assert_eq!(params().validate(), Ok(params()));
    }

    #[test]
    fn test_validate_rejects_out_of_domain() {
        let mut p = params();
        p.variant = MapVariant::Logistic;
        match p.validate() {
            Err(ConfigError::OutOfDomain { field, .. }) => assert_eq!(field, "y1"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_nan() {
        let mut p = params();
        p.map2.x = f64::NAN;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_validate_clamps_iterations() {
        let mut p = params();
        p.map1.iterations = 5;
        p.map2.iterations = 2_000_000;
        let v = p.validate().unwrap();
        assert_eq!(v.map1.iterations, MIN_ITERATIONS);
        assert_eq!(v.map2.iterations, MAX_ITERATIONS);
    }

    #[test]
    fn test_blob_layout() {
        let blob = params().to_bytes();
        assert_eq!(blob.len(), 41);
        assert_eq!(blob[0], MapVariant::Duffing as u8);
        assert_eq!(&blob[1..9], &0.1f64.to_le_bytes());
        assert_eq!(&blob[33..37], &500u32.to_le_bytes());
        assert_eq!(EncryptionParams::from_bytes(&blob), Some(params()));
    }

    #[test]
    fn test_blob_rejects_bad_input() {
        let mut blob = params().to_bytes();
        assert_eq!(EncryptionParams::from_bytes(&blob[..40]), None);
        blob[0] = 9;
        assert_eq!(EncryptionParams::from_bytes(&blob), None);
    }
}
