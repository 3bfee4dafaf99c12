#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that picks the tower's target from a snapshot of live enemies.
//!
//! The policy is nearest-enemy-first. Candidates outside the attack range are
//! ignored and equidistant candidates are resolved by the smaller handle so
//! the same snapshot always yields the same target.

use idle_defence_core::{EnemyHandle, Position};

/// Live enemy offered to the targeting system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetCandidate {
    /// Handle of the enemy inside the battle arena.
    pub handle: EnemyHandle,
    /// Current position of the enemy.
    pub position: Position,
}

impl TargetCandidate {
    /// Creates a new candidate descriptor.
    #[must_use]
    pub const fn new(handle: EnemyHandle, position: Position) -> Self {
        Self { handle, position }
    }
}

/// Tower targeting system that reuses a scratch buffer between acquisitions.
#[derive(Clone, Debug, Default)]
pub struct TowerTargeting {
    in_range: Vec<BestCandidate>,
}

impl TowerTargeting {
    /// Creates a new targeting system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the nearest candidate within `range` of `origin`.
    ///
    /// Returns `None` when no candidate is in range.
    pub fn acquire<I>(&mut self, origin: Position, range: f32, candidates: I) -> Option<EnemyHandle>
    where
        I: IntoIterator<Item = TargetCandidate>,
    {
        self.in_range.clear();
        if range < 0.0 {
            return None;
        }

        let max_distance_sq = range * range;
        for candidate in candidates {
            let distance_sq = origin.distance_squared(candidate.position);
            if distance_sq > max_distance_sq {
                continue;
            }
            self.in_range.push(BestCandidate {
                distance_sq,
                handle: candidate.handle,
            });
        }

        let mut best: Option<BestCandidate> = None;
        for current in &self.in_range {
            match &mut best {
                Some(existing) => {
                    if current.precedes(existing) {
                        *existing = *current;
                    }
                }
                None => best = Some(*current),
            }
        }

        best.map(|candidate| candidate.handle)
    }
}

/// Reports whether `position` lies within `range` of `origin`.
#[must_use]
pub fn in_range(origin: Position, range: f32, position: Position) -> bool {
    range >= 0.0 && origin.distance_squared(position) <= range * range
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance_sq: f32,
    handle: EnemyHandle,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance_sq != other.distance_sq {
            return self.distance_sq < other.distance_sq;
        }

        self.handle < other.handle
    }
}
