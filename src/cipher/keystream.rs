//! Keystream generator: chaotic maps feeding an MSWS generator.
//!
//! # Setup
//!
//! Both maps are warmed up for their configured iteration counts. The IEEE-754 bits of
//! `map2.y` then seed the generator: the same value goes into `x` *and* `s`, and `w`
//! starts at zero.
//!
//! # Per call
//!
//! ```text
//! map1 ──iterate──▶ bits(y) [^ bits(x) for Logistic] ──▶ w
//!                                                        │
//!                           x = x² + (w += s); x = rot32(x) ──▶ low 32 bits
//! ```
//!
//! Two contexts built from identical parameters produce identical keystreams, which is
//! what lets the RX side undo the TX side's XOR.

use super::chaos::{ChaoticMapState, MapVariant};
use super::msws::MswsState;
use crate::config::{EncryptionParams, MapSeed};

/// One map instance and the warm-up length it was configured with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChaoticMap {
    pub state: ChaoticMapState,
    pub iterations: u32,
}

impl ChaoticMap {
    pub const fn new(state: ChaoticMapState, iterations: u32) -> Self {
        Self { state, iterations }
    }
}

impl From<MapSeed> for ChaoticMap {
    fn from(seed: MapSeed) -> Self {
        Self::new(ChaoticMapState::new(seed.x, seed.y), seed.iterations)
    }
}

/// Per-direction encryption state.
///
/// Exactly one instance per direction, owned and mutated by a single task.
#[derive(Clone, Debug, PartialEq)]
pub struct EncryptionContext {
    variant: MapVariant,
    map1: ChaoticMap,
    map2: ChaoticMap,
    generator: MswsState,
}

impl EncryptionContext {
    /// Build and seed a context.
    ///
    /// Performs no range validation: out-of-domain seeds simply produce a garbled
    /// keystream. Cost grows linearly with the iteration counts.
    pub fn new(variant: MapVariant, map1: ChaoticMap, map2: ChaoticMap) -> Self {
        let mut ctx = Self {
            variant,
            map1,
            map2,
            generator: MswsState::default(),
        };
        ctx.setup();
        ctx
    }

    /// Build a context from configuration-layer parameters.
    pub fn from_params(params: &EncryptionParams) -> Self {
        Self::new(params.variant, params.map1.into(), params.map2.into())
    }

    fn setup(&mut self) {
        self.map1.state = self.variant.warm_up(self.map1.state, self.map1.iterations);
        self.map2.state = self.variant.warm_up(self.map2.state, self.map2.iterations);

        // x and s share the seed; preserved as observed on the wire.
        let seed = self.map2.state.y.to_bits();
        self.generator = MswsState::new(seed, 0, seed);
    }

    /// Produce the next 32-bit keystream word.
    #[inline]
    pub fn next_key(&mut self) -> u32 {
        self.map1.state = self.variant.iterate(self.map1.state);

        let mut contribution = self.map1.state.y.to_bits();
        if self.variant == MapVariant::Logistic {
            // Logistic x and y evolve independently; fold x in as well.
            contribution ^= self.map1.state.x.to_bits();
        }
        self.generator.w = contribution;
        self.generator.step()
    }

    /// XOR `word` with the next keystream word (encrypts and decrypts alike).
    #[inline]
    pub fn apply(&mut self, word: u32) -> u32 {
        word ^ self.next_key()
    }

    pub fn variant(&self) -> MapVariant {
        self.variant
    }

    pub fn map1(&self) -> &ChaoticMap {
        &self.map1
    }

    pub fn map2(&self) -> &ChaoticMap {
        &self.map2
    }

    pub fn generator(&self) -> &MswsState {
        &self.generator
    }
}
