//! Middle-Square Weyl Sequence generator state (32-bit output variant).

/// MSWS generator state.
///
/// - `x`: running state, squared and rotated every step
/// - `w`: Weyl accumulator
/// - `s`: Weyl increment, fixed once seeded
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct MswsState {
    pub x: u64,
    pub w: u64,
    pub s: u64,
}

impl MswsState {
    pub const fn new(x: u64, w: u64, s: u64) -> Self {
        Self { x, w, s }
    }

    /// One MSWS step: `x = x²; x += (w += s); x = rotate(x, 32)`.
    ///
    /// Returns the low 32 bits of the rotated state. All arithmetic wraps.
    #[inline]
    pub fn step(&mut self) -> u32 {
        self.x = self.x.wrapping_mul(self.x);
        self.w = self.w.wrapping_add(self.s);
        self.x = self.x.wrapping_add(self.w);
        self.x = self.x.rotate_left(32);
        self.x as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_fixture_from_zero() {
        let mut g = MswsState::new(0, 0, 1);
        assert_eq!(g.step(), 0);
        assert_eq!(g, MswsState::new(1 << 32, 1, 1));
    }

    #[test]
    fn test_step_matches_reference_expression() {
        let mut g = MswsState::new(0x0123_4567_89AB_CDEF, 7, 0xB5AD_4ECE_DA1C_E2A9);
        let (mut x, mut w, s) = (g.x, g.w, g.s);
        for _ in 0..16 {
            x = x.wrapping_mul(x);
            w = w.wrapping_add(s);
            x = x.wrapping_add(w);
            x = (x >> 32) | (x << 32);
            assert_eq!(g.step(), x as u32);
        }
        assert_eq!(g.x, x);
        assert_eq!(g.w, w);
        assert_eq!(g.s, s);
    }
}
