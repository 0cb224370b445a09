//! Chaotic map iterators.
//!
//! Three two-variable recurrences drive the keystream. Each is a pure function of the
//! current point; the variant is matched on every step so the rule stays inlinable.
//!
//! | Variant      | Rule                                                        | Domain      |
//! |--------------|-------------------------------------------------------------|-------------|
//! | Duffing      | `x' = y`, `y' = -β·x + α·y - y³`                            | [-1.2, 1.2] |
//! | Logistic     | `x' = r·x·(1-x)`, `y' = r·y·(1-y)` (uncoupled)              | [0, 1]      |
//! | TwoDLogistic | `x' = r·(3y+1)·x·(1-x)`, `y' = r·(3x'+1)·y·(1-y)`           | [-1, 1]     |

/// Duffing map α.
pub const DUFFING_ALPHA: f64 = 2.75;
/// Duffing map β.
pub const DUFFING_BETA: f64 = 0.2;
/// Logistic map growth rate.
pub const LOGISTIC_R: f64 = 3.99;
/// Coupled 2D logistic map growth rate.
pub const LOGISTIC_2D_R: f64 = 1.19;

/// One point of a 2D dynamical system.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ChaoticMapState {
    pub x: f64,
    pub y: f64,
}

impl ChaoticMapState {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for ChaoticMapState {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Which recurrence a context iterates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum MapVariant {
    Duffing = 0,
    Logistic = 1,
    /// Coupled two-dimensional logistic map (console name: `mccm`).
    TwoDLogistic = 2,
}

impl MapVariant {
    /// All variants, in tag order.
    pub const ALL: [MapVariant; 3] = [Self::Duffing, Self::Logistic, Self::TwoDLogistic];

    /// Advance `state` by one step of this variant's rule.
    #[inline]
    pub fn iterate(self, state: ChaoticMapState) -> ChaoticMapState {
        let ChaoticMapState { x, y } = state;
        match self {
            MapVariant::Duffing => ChaoticMapState {
                x: y,
                y: -DUFFING_BETA * x + DUFFING_ALPHA * y - y * y * y,
            },
            MapVariant::Logistic => ChaoticMapState {
                x: LOGISTIC_R * x * (1.0 - x),
                y: LOGISTIC_R * y * (1.0 - y),
            },
            MapVariant::TwoDLogistic => {
                // Sequential update: the fresh x feeds the y coupling term.
                let x = LOGISTIC_2D_R * (3.0 * y + 1.0) * x * (1.0 - x);
                let y = LOGISTIC_2D_R * (3.0 * x + 1.0) * y * (1.0 - y);
                ChaoticMapState { x, y }
            }
        }
    }

    /// Iterate `iterations` times without reading any output.
    ///
    /// Used at setup to move a trajectory past its transient onto the attractor.
    pub fn warm_up(self, mut state: ChaoticMapState, iterations: u32) -> ChaoticMapState {
        for _ in 0..iterations {
            state = self.iterate(state);
        }
        state
    }

    /// Valid seed domain `(min, max)` for both coordinates.
    ///
    /// Enforced by the configuration layer only.
    pub const fn domain(self) -> (f64, f64) {
        match self {
            MapVariant::Duffing => (-1.2, 1.2),
            MapVariant::Logistic => (0.0, 1.0),
            MapVariant::TwoDLogistic => (-1.0, 1.0),
        }
    }

    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            MapVariant::Duffing => "Duffing",
            MapVariant::Logistic => "Logistic",
            MapVariant::TwoDLogistic => "2D-Logistic",
        }
    }

    /// Parse a console map name (`duffing`/`d`, `logistic`/`l`, `mccm`/`m`).
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "duffing" | "d" => Some(MapVariant::Duffing),
            "logistic" | "l" => Some(MapVariant::Logistic),
            "mccm" | "m" => Some(MapVariant::TwoDLogistic),
            _ => None,
        }
    }

    /// Convert from the raw tag stored in NVS.
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(MapVariant::Duffing),
            1 => Some(MapVariant::Logistic),
            2 => Some(MapVariant::TwoDLogistic),
            _ => None,
        }
    }
}

impl core::fmt::Display for MapVariant {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
