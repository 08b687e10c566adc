//! Frame-to-frame collision state tracking
//!
//! The resolver remembers which pairs collided last frame and turns each
//! frame's broad-phase pairs into ENTER / STAY / LEAVE events.

use std::collections::{BTreeMap, HashSet};

use log::trace;

use super::hit::{CollisionHit, CollisionState};
use super::narrow_phase::NarrowPhase;
use super::pair_filter::{PairFilter, PairKind};
use crate::entity::EntityKey;
use crate::spatial::{PairKey, SpatialPair};

/// A pair that was colliding at the end of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TrackedPair {
    first: EntityKey,
    second: EntityKey,
    kind: PairKind,
}

impl TrackedPair {
    fn leave(self) -> CollisionHit {
        CollisionHit::minimal(self.kind, self.first, self.second, CollisionState::Leave)
    }
}

/// Collision state machine over canonical pair keys
#[derive(Debug, Default)]
pub struct CollisionResolver {
    /// Pairs colliding at the end of the last `solve()`
    previous: BTreeMap<PairKey, TrackedPair>,
}

impl CollisionResolver {
    /// Create a resolver with no collision history
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve one frame of broad-phase pairs into collision events.
    ///
    /// Pairs colliding last frame that are absent from `pairs`, or whose
    /// narrow-phase result is missing, get a LEAVE event. The colliding set
    /// built here replaces the previous one once every pair is processed.
    pub fn solve<N: NarrowPhase + ?Sized>(
        &mut self,
        pairs: &[SpatialPair],
        narrow: &mut N,
    ) -> Vec<CollisionHit> {
        let mut hits = Vec::new();
        let mut current = BTreeMap::new();
        let mut processed: HashSet<&PairKey> = HashSet::new();

        for pair in pairs {
            let Some(kind) = PairFilter::classify(pair.a.profile, pair.b.profile) else {
                continue;
            };
            let tracked = TrackedPair { first: pair.a.key, second: pair.b.key, kind };
            let was_colliding = self.previous.contains_key(&pair.key);

            if !pair.a.bounds.overlaps(&pair.b.bounds) {
                if processed.insert(&pair.key) && was_colliding {
                    hits.push(tracked.leave());
                }
                continue;
            }

            if processed.contains(&pair.key) {
                continue;
            }
            let Some(outcome) = narrow.test(pair, kind) else {
                continue;
            };
            processed.insert(&pair.key);

            let state = CollisionState::from_transition(was_colliding, outcome.colliding);
            match state {
                CollisionState::None => {}
                CollisionState::Leave if outcome.hits.is_empty() => hits.push(tracked.leave()),
                _ => hits.extend(outcome.hits.into_iter().map(|hit| hit.with_state(state))),
            }

            if outcome.colliding {
                current.insert(pair.key.clone(), tracked);
            }
        }

        for (key, tracked) in &self.previous {
            if !current.contains_key(key) && !processed.contains(key) {
                hits.push(tracked.leave());
            }
        }

        trace!(
            "Resolved {} pairs into {} hits, {} colliding",
            pairs.len(),
            hits.len(),
            current.len()
        );

        self.previous = current;
        hits
    }

    /// Whether the pair was colliding at the end of the last frame
    pub fn is_colliding(&self, key: &PairKey) -> bool {
        self.previous.contains_key(key)
    }

    /// Keys of all pairs colliding at the end of the last frame, in key order
    pub fn colliding_pairs(&self) -> impl Iterator<Item = &PairKey> {
        self.previous.keys()
    }

    /// Number of colliding pairs
    pub fn len(&self) -> usize {
        self.previous.len()
    }

    /// True when nothing is colliding
    pub fn is_empty(&self) -> bool {
        self.previous.is_empty()
    }

    /// Forget all collision history without emitting LEAVE events
    pub fn reset(&mut self) {
        self.previous.clear();
    }
}
