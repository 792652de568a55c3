//! The precomputed movement conflict table.
//!
//! A junction has 8 arms indexed 0..8 clockwise; even indices are inbound,
//! odd indices outbound.  A movement is the (inbound, outbound) arm pair an
//! agent traverses.  Two movements conflict when their paths cross inside
//! the junction; the table stores every conflicting ordered 4-tuple
//! `(a.from, a.to, b.from, b.to)` explicitly.
//!
//! The geometry is rotation symmetric: the full table is 24 base tuples
//! (straight, near-turn, and the two far-turn patterns from arm 0) rotated
//! by 2, 4 and 6 — 96 tuples in all, closed under rotation-by-2 and
//! symmetric in the movement pair.

use rustc_hash::FxHashSet;

// ── Movement ──────────────────────────────────────────────────────────────────

/// One agent's path through the junction, as arm indices.
///
/// `to = None` means the route terminates on the inbound arm: the agent
/// never enters the crossing area and conflicts with nothing.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Movement {
    /// Inbound arm index, always even.
    pub from: u8,
    /// Outbound arm index (odd), or `None` when terminating inside.
    pub to: Option<u8>,
}

impl Movement {
    pub fn new(from: u8, to: Option<u8>) -> Self {
        Self { from, to }
    }
}

// ── ConflictTable ─────────────────────────────────────────────────────────────

/// Conflicting movement pairs for one standard 8-arm junction, generated at
/// construction from the arm-0 base patterns.
pub struct ConflictTable {
    tuples: FxHashSet<(u8, u8, u8, u8)>,
}

/// Per base movement from arm 0, every movement it conflicts with.
///
/// `(0,7)` is the U-ish near exit, `(0,1)` the far exit, `(0,3)` and
/// `(0,5)` the two crossings; the partner lists come from the terminal's
/// junction geometry.
const BASE_PATTERNS: [(u8, u8, &[(u8, u8)]); 4] = [
    (0, 7, &[(0, 7), (2, 7), (4, 7), (6, 7)]),
    (0, 1, &[(0, 1), (2, 1), (4, 1), (6, 1)]),
    (0, 3, &[(0, 3), (2, 3), (2, 5), (2, 7), (4, 1), (4, 3), (6, 1), (6, 3)]),
    (0, 5, &[(0, 5), (2, 5), (2, 7), (4, 5), (4, 7), (6, 1), (6, 3), (6, 5)]),
];

impl ConflictTable {
    pub fn new() -> Self {
        let mut tuples = FxHashSet::default();
        for offset in [0u8, 2, 4, 6] {
            let rot = |arm: u8| (arm + offset) % 8;
            for &(from, to, partners) in &BASE_PATTERNS {
                for &(pfrom, pto) in partners {
                    tuples.insert((rot(from), rot(to), rot(pfrom), rot(pto)));
                }
            }
        }
        Self { tuples }
    }

    /// Whether movements `a` and `b` may not cross the junction together.
    ///
    /// Terminating movements (`to = None`) conflict with nothing.
    pub fn conflicts(&self, a: Movement, b: Movement) -> bool {
        match (a.to, b.to) {
            (Some(at), Some(bt)) => self.tuples.contains(&(a.from, at, b.from, bt)),
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// All conflicting 4-tuples, in arbitrary order.
    pub fn tuples(&self) -> impl Iterator<Item = (u8, u8, u8, u8)> + '_ {
        self.tuples.iter().copied()
    }
}

impl Default for ConflictTable {
    fn default() -> Self {
        Self::new()
    }
}
