//! Component-based pair filtering
//!
//! Runs before any bounding-box math. Only two combinations can collide:
//! collider against collider, and a map against a map-aware collider.

use crate::entity::CollisionProfile;

/// Which side of a pair carries the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapSide {
    /// The first entity of the pair is the map
    First,
    /// The second entity of the pair is the map
    Second,
}

/// How a compatible pair collides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairKind {
    /// Both entities carry an active collider
    Collider,
    /// One entity is a map, the other a map-aware collider
    Map(MapSide),
}

/// Collision compatibility predicate
pub struct PairFilter;

impl PairFilter {
    /// Classify a pair, `None` if the two entities can never collide
    ///
    /// # Example
    /// ```
    /// use collision_pipeline::entity::CollisionProfile;
    /// use collision_pipeline::physics::{MapSide, PairFilter, PairKind};
    ///
    /// let map = CollisionProfile::MAP;
    /// let walker = CollisionProfile::COLLIDER | CollisionProfile::MAP_INTERACTION;
    ///
    /// assert_eq!(PairFilter::classify(walker, map), Some(PairKind::Map(MapSide::Second)));
    /// assert_eq!(PairFilter::classify(map, map), None);
    /// ```
    pub const fn classify(a: CollisionProfile, b: CollisionProfile) -> Option<PairKind> {
        if a.has_collider() && b.has_collider() {
            Some(PairKind::Collider)
        } else if a.is_map() && b.interacts_with_maps() {
            Some(PairKind::Map(MapSide::First))
        } else if b.is_map() && a.interacts_with_maps() {
            Some(PairKind::Map(MapSide::Second))
        } else {
            None
        }
    }

    /// Check if two entities could collide at all
    pub const fn is_potential_collision(a: CollisionProfile, b: CollisionProfile) -> bool {
        Self::classify(a, b).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: CollisionProfile = CollisionProfile::COLLIDER;
    const WALKER: CollisionProfile =
        CollisionProfile::COLLIDER.union(CollisionProfile::MAP_INTERACTION);
    const MAP: CollisionProfile = CollisionProfile::MAP;
    const NOTHING: CollisionProfile = CollisionProfile::empty();

    #[test]
    fn test_colliders_collide() {
        assert_eq!(PairFilter::classify(PLAIN, PLAIN), Some(PairKind::Collider));
        assert_eq!(PairFilter::classify(PLAIN, WALKER), Some(PairKind::Collider));
    }

    #[test]
    fn test_map_needs_map_interaction() {
        assert_eq!(PairFilter::classify(MAP, WALKER), Some(PairKind::Map(MapSide::First)));
        assert_eq!(PairFilter::classify(WALKER, MAP), Some(PairKind::Map(MapSide::Second)));
        assert!(!PairFilter::is_potential_collision(MAP, PLAIN));
        assert!(!PairFilter::is_potential_collision(PLAIN, MAP));
    }

    #[test]
    fn test_excluded_combinations() {
        assert!(!PairFilter::is_potential_collision(MAP, MAP));
        assert!(!PairFilter::is_potential_collision(NOTHING, PLAIN));
        assert!(!PairFilter::is_potential_collision(NOTHING, NOTHING));
    }
}
