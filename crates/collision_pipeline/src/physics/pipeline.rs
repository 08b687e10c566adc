//! Per-frame driver tying the broad phase to the resolver

use super::hit::CollisionHit;
use super::narrow_phase::NarrowPhase;
use super::resolver::CollisionResolver;
use crate::config::PipelineConfig;
use crate::entity::{Collidable, EntityKey, EntityStore};
use crate::spatial::SpatialIndex;

/// Spatial index plus collision resolver, stepped once per simulation tick
#[derive(Debug, Default)]
pub struct CollisionPipeline {
    index: SpatialIndex,
    resolver: CollisionResolver,
}

impl CollisionPipeline {
    /// Create a pipeline with no collision history
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            index: SpatialIndex::new(config.spatial),
            resolver: CollisionResolver::new(),
        }
    }

    /// Run one frame over every entity in the store
    pub fn step<N: NarrowPhase + ?Sized>(
        &mut self,
        store: &EntityStore,
        narrow: &mut N,
    ) -> Vec<CollisionHit> {
        self.step_entities(store.iter(), narrow)
    }

    /// Run one frame over an arbitrary set of collidables.
    ///
    /// The index is cleared and rebuilt from `entities`, then its pairs are
    /// resolved against the previous frame.
    pub fn step_entities<'a, E, I, N>(&mut self, entities: I, narrow: &mut N) -> Vec<CollisionHit>
    where
        E: Collidable + ?Sized + 'a,
        I: IntoIterator<Item = (EntityKey, &'a E)>,
        N: NarrowPhase + ?Sized,
    {
        self.index.clear();
        for (key, entity) in entities {
            self.index.insert(key, entity);
        }

        let pairs = self.index.get_pairs();
        self.resolver.solve(&pairs, narrow)
    }

    /// The broad phase
    pub const fn index(&self) -> &SpatialIndex {
        &self.index
    }

    /// The collision state machine
    pub const fn resolver(&self) -> &CollisionResolver {
        &self.resolver
    }

    /// Forget collision history and indexed entities
    pub fn reset(&mut self) {
        self.index.clear();
        self.resolver.reset();
    }
}
