//! Broad-phase candidate pairs and per-call deduplication

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::entity::{Collidable, CollisionProfile, EntityKey};
use crate::foundation::math::Rect;
use crate::physics::PairFilter;

/// Frame snapshot of an indexed entity
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedEntity {
    /// Reference back into the entity store
    pub key: EntityKey,
    /// Identity used for canonical ordering
    pub id: Arc<str>,
    /// World-space bounds at insertion time
    pub bounds: Rect,
    /// Active collision-relevant components at insertion time
    pub profile: CollisionProfile,
}

impl IndexedEntity {
    /// Snapshot an entity. Inactive entities, and entities without finite
    /// bounds, yield `None`.
    pub fn capture<E: Collidable + ?Sized>(key: EntityKey, entity: &E) -> Option<Self> {
        if !entity.is_active() {
            return None;
        }
        let bounds = entity.world_bounds().filter(Rect::is_finite)?;
        Some(Self {
            key,
            id: Arc::clone(entity.identity()),
            bounds,
            profile: CollisionProfile::from_tags(entity.components()),
        })
    }
}

/// Order-independent identity of an entity pair.
///
/// `{A, B}` and `{B, A}` produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    first: Arc<str>,
    second: Arc<str>,
}

impl PairKey {
    /// Canonical key for two identities, `None` if they are equal
    pub fn new(a: &Arc<str>, b: &Arc<str>) -> Option<Self> {
        match a.cmp(b) {
            Ordering::Less => Some(Self { first: Arc::clone(a), second: Arc::clone(b) }),
            Ordering::Greater => Some(Self { first: Arc::clone(b), second: Arc::clone(a) }),
            Ordering::Equal => None,
        }
    }

    /// Lexicographically smaller identity
    pub fn first(&self) -> &str {
        &self.first
    }

    /// Lexicographically greater identity
    pub fn second(&self) -> &str {
        &self.second
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.first, self.second)
    }
}

/// Unordered pair of entities whose bounds overlap, in canonical order
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialPair {
    /// Canonical key
    pub key: PairKey,
    /// Entity with the smaller identity
    pub a: IndexedEntity,
    /// Entity with the greater identity
    pub b: IndexedEntity,
}

impl SpatialPair {
    /// Build a canonical pair, `None` if both sides share an identity
    pub fn new(x: IndexedEntity, y: IndexedEntity) -> Option<Self> {
        let key = PairKey::new(&x.id, &y.id)?;
        let (a, b) = if x.id < y.id { (x, y) } else { (y, x) };
        Some(Self { key, a, b })
    }
}

/// Accumulates the pairs of one `get_pairs()` call.
///
/// Every candidate runs through identity inequality, component filtering,
/// bounds overlap and the seen set, in that order.
pub(crate) struct PairCollector<'a> {
    entities: &'a [IndexedEntity],
    seen: HashSet<PairKey>,
    pairs: Vec<SpatialPair>,
}

impl<'a> PairCollector<'a> {
    pub(crate) fn new(entities: &'a [IndexedEntity]) -> Self {
        Self {
            entities,
            seen: HashSet::new(),
            pairs: Vec::new(),
        }
    }

    pub(crate) fn entity(&self, slot: usize) -> &'a IndexedEntity {
        &self.entities[slot]
    }

    /// Offer two slots as a candidate pair. Returns true if a new pair was emitted.
    pub(crate) fn offer(&mut self, first: usize, second: usize) -> bool {
        if first == second {
            return false;
        }
        let (a, b) = (&self.entities[first], &self.entities[second]);
        if a.id == b.id {
            return false;
        }
        if !PairFilter::is_potential_collision(a.profile, b.profile) {
            return false;
        }
        if !a.bounds.overlaps(&b.bounds) {
            return false;
        }
        let Some(key) = PairKey::new(&a.id, &b.id) else {
            return false;
        };
        if !self.seen.insert(key.clone()) {
            return false;
        }

        let (a, b) = if a.id < b.id { (a, b) } else { (b, a) };
        self.pairs.push(SpatialPair { key, a: a.clone(), b: b.clone() });
        true
    }

    pub(crate) fn finish(self) -> Vec<SpatialPair> {
        self.pairs
    }
}
