//! Planar coordinate type and polyline utilities.
//!
//! The traffic network lives in a local Cartesian frame (metres), matching
//! the coordinate space the motion simulator reports positions in.  `f32`
//! gives centimetre precision across any realistic terminal footprint.

/// A planar point in network coordinates (metres).
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in metres.
    #[inline]
    pub fn distance(self, other: Point2) -> f32 {
        self.distance_sq(other).sqrt()
    }

    /// Squared distance — cheaper than `distance` for radius checks.
    #[inline]
    pub fn distance_sq(self, other: Point2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Linear interpolation from `self` towards `other` by fraction `t`.
    #[inline]
    pub fn lerp(self, other: Point2, t: f32) -> Point2 {
        Point2 {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

impl std::fmt::Display for Point2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

// ── Polyline helpers ──────────────────────────────────────────────────────────

/// Total length of a polyline in metres.  Zero for fewer than two vertices.
pub fn polyline_length(shape: &[Point2]) -> f32 {
    shape.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// The point at arc-length `s` along `shape`, clamped to the endpoints.
///
/// Returns `None` for an empty polyline.
pub fn point_along(shape: &[Point2], s: f32) -> Option<Point2> {
    let (&first, rest) = shape.split_first()?;
    if s <= 0.0 || rest.is_empty() {
        return Some(first);
    }
    let mut remaining = s;
    let mut prev = first;
    for &next in rest {
        let seg = prev.distance(next);
        if remaining <= seg && seg > 0.0 {
            return Some(prev.lerp(next, remaining / seg));
        }
        remaining -= seg;
        prev = next;
    }
    // Past the end — clamp to the final vertex.
    Some(prev)
}

/// `k` evenly spaced points along `shape`, excluding both endpoints.
///
/// Service points are interpolated at fractions `1/(k+1) .. k/(k+1)` of the
/// polyline length, so berths never sit on the junction at either end of an
/// edge.  Returns an empty vec if the polyline has no extent.
pub fn sample_evenly(shape: &[Point2], k: usize) -> Vec<Point2> {
    let total = polyline_length(shape);
    if total <= 0.0 || k == 0 {
        return Vec::new();
    }
    (1..=k)
        .filter_map(|i| point_along(shape, total * i as f32 / (k + 1) as f32))
        .collect()
}
