//! Spatial partitioning data structures
//!
//! Provides the broad phase: a uniform hash grid for sparse areas and
//! DBVH regions for locally dense clusters, producing deduplicated
//! candidate pairs once per frame.

mod cell;
mod dbvh;
mod grid;
mod index;
mod pair;

pub use cell::{CellKey, CellRange};
pub use dbvh::{DbvhNode, DbvhRegion, DbvhTree};
pub use grid::{GridCell, GridIndex};
pub use index::{SpatialIndex, SpatialStats};
pub use pair::{IndexedEntity, PairKey, SpatialPair};
