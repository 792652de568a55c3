//! Discrete simulation time.
//!
//! The engine never touches wall-clock time: one [`Tick`] is one step of the
//! motion simulator (1 simulated second by default), and every timestamp in
//! the system is a tick count.  Integer ticks keep dwell arithmetic exact.

use std::fmt;
use std::ops;

/// An absolute tick count since simulation start.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// The tick `n` steps later.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }
}

impl ops::Add<u64> for Tick {
    type Output = Tick;
    fn add(self, n: u64) -> Tick {
        self.offset(n)
    }
}

/// Tick difference; debug-panics when `rhs` is later than `self`.
impl ops::Sub for Tick {
    type Output = u64;
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// The tick counter plus its mapping to simulated seconds.
///
/// Owned by the motion simulator and advanced exactly once per
/// `advance_tick`.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Simulated seconds per tick.
    pub tick_duration_secs: u32,
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(tick_duration_secs: u32) -> Self {
        Self { tick_duration_secs, current_tick: Tick::ZERO }
    }

    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = self.current_tick.offset(1);
    }

    /// Simulated seconds elapsed since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> u64 {
        self.current_tick.0 * u64::from(self.tick_duration_secs)
    }
}

/// One simulated second per tick.
impl Default for SimClock {
    fn default() -> Self {
        Self::new(1)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}s)", self.current_tick, self.elapsed_secs())
    }
}
