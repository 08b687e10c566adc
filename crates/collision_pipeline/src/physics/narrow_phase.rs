//! Narrow-phase seam
//!
//! The resolver calls a [`NarrowPhase`] only for pairs whose bounds overlap
//! and whose components are compatible. Exact shape math lives behind this
//! trait, outside the pipeline.

use std::sync::Arc;

use super::hit::CollisionHit;
use super::pair_filter::{MapSide, PairKind};
use crate::spatial::SpatialPair;

/// Result of one narrow-phase test
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NarrowOutcome {
    /// Whether the pair is colliding this frame
    pub colliding: bool,
    /// Detailed hits; their state is overwritten by the resolver
    pub hits: Vec<CollisionHit>,
}

impl NarrowOutcome {
    /// Colliding, with the given hits
    pub const fn hit(hits: Vec<CollisionHit>) -> Self {
        Self { colliding: true, hits }
    }

    /// Not colliding, no hits
    pub const fn miss() -> Self {
        Self { colliding: false, hits: Vec::new() }
    }
}

/// Precise per-pair collision test
pub trait NarrowPhase {
    /// Test a broad-phase pair. `None` means no result is available, and the
    /// pair is skipped for this frame.
    fn test(&mut self, pair: &SpatialPair, kind: PairKind) -> Option<NarrowOutcome>;
}

impl<F> NarrowPhase for F
where
    F: FnMut(&SpatialPair, PairKind) -> Option<NarrowOutcome>,
{
    fn test(&mut self, pair: &SpatialPair, kind: PairKind) -> Option<NarrowOutcome> {
        self(pair, kind)
    }
}

/// Narrow phase that trusts the bounding boxes.
///
/// Collider pairs get one hit carrying the overlap rectangle. Map pairs get
/// one hit carrying the map tile under the overlap center when `tile_size`
/// is set.
#[derive(Debug, Clone, Default)]
pub struct BoundsNarrowPhase {
    /// Edge length of map tiles in world units
    pub tile_size: Option<f32>,
}

impl BoundsNarrowPhase {
    /// Narrow phase that reports map tiles of the given size
    pub const fn with_tile_size(tile_size: f32) -> Self {
        Self { tile_size: Some(tile_size) }
    }
}

impl NarrowPhase for BoundsNarrowPhase {
    fn test(&mut self, pair: &SpatialPair, kind: PairKind) -> Option<NarrowOutcome> {
        let Some(contact) = pair.a.bounds.intersection(&pair.b.bounds) else {
            return Some(NarrowOutcome::miss());
        };

        let hit = match kind {
            PairKind::Collider => {
                CollisionHit::collider(pair.a.key, pair.b.key, Some(Arc::new(contact)))
            }
            PairKind::Map(side) => {
                let (map, collider) = match side {
                    MapSide::First => (&pair.a, &pair.b),
                    MapSide::Second => (&pair.b, &pair.a),
                };
                let cell = self.tile_size.filter(|size| *size > 0.0).map(|size| {
                    let center = contact.center();
                    #[allow(clippy::cast_possible_truncation)]
                    let tile = (
                        ((center.x - map.bounds.x) / size).floor() as i32,
                        ((center.y - map.bounds.y) / size).floor() as i32,
                    );
                    tile
                });
                CollisionHit::map(collider.key, map.key, cell)
            }
        };

        Some(NarrowOutcome::hit(vec![hit]))
    }
}
