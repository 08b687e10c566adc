//! Collision filtering, narrow-phase seam and event resolution
//!
//! The broad phase in [`crate::spatial`] hands its pairs to a
//! [`CollisionResolver`], which asks a [`NarrowPhase`] about each one and
//! emits ENTER / STAY / LEAVE [`CollisionHit`]s. [`CollisionPipeline`] wires
//! both together for one simulation tick.

mod hit;
mod narrow_phase;
mod pair_filter;
mod pipeline;
mod resolver;

pub use hit::{CollisionHit, CollisionState, HitKind};
pub use narrow_phase::{BoundsNarrowPhase, NarrowOutcome, NarrowPhase};
pub use pair_filter::{MapSide, PairFilter, PairKind};
pub use pipeline::CollisionPipeline;
pub use resolver::CollisionResolver;
