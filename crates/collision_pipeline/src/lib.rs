//! # Collision Pipeline
//!
//! Broad-phase and collision-event pipeline for real-time 2D entity simulations.
//!
//! ## Features
//!
//! - **Adaptive Broad Phase**: Uniform hash grid that converts dense 3x3 blocks
//!   of cells into AVL-balanced bounding-volume trees on the fly
//! - **Auto-Tuning**: Cell size follows the average entity size when the grid
//!   gets crowded
//! - **Component Filtering**: Collider/Map compatibility is checked before any
//!   bounding-box math
//! - **Stateful Events**: ENTER / STAY / LEAVE hits tracked across frames
//!
//! ## Quick Start
//!
//! ```rust
//! use collision_pipeline::prelude::*;
//!
//! let mut store = EntityStore::with_key();
//! let a = Entity::new("a").with_bounds(Rect::new(0.0, 0.0, 10.0, 10.0));
//! let b = Entity::new("b").with_bounds(Rect::new(5.0, 5.0, 10.0, 10.0));
//! store.insert(a.with_collider(false));
//! store.insert(b.with_collider(false));
//!
//! let mut pipeline = CollisionPipeline::new(PipelineConfig::default());
//! let hits = pipeline.step(&store, &mut BoundsNarrowPhase::default());
//!
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].state, CollisionState::Enter);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod entity;
pub mod spatial;
pub mod physics;

#[cfg(test)]
mod tests;

/// Common imports for pipeline users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, PipelineConfig, SpatialIndexConfig},
        entity::{Collidable, ComponentKind, ComponentTag, Entity, EntityKey, EntityStore},
        foundation::math::{Rect, Vec2},
        physics::{
            BoundsNarrowPhase, CollisionHit, CollisionPipeline, CollisionResolver,
            CollisionState, HitKind, NarrowOutcome, NarrowPhase, PairFilter, PairKind,
        },
        spatial::{CellKey, PairKey, SpatialIndex, SpatialPair},
    };
}
