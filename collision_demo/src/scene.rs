//! Synthetic scene of bouncing movers over a tile map

use collision_pipeline::entity::{Entity, EntityKey, EntityStore};
use collision_pipeline::foundation::math::{Rect, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// One moving entity and its velocity in world units per second
struct Mover {
    key: EntityKey,
    velocity: Vec2,
}

/// Square arena holding one map and a crowd of movers
pub struct DemoScene {
    store: EntityStore,
    movers: Vec<Mover>,
    arena: Rect,
}

impl DemoScene {
    /// Generate a reproducible scene.
    ///
    /// A fifth of the movers start packed around the arena center so the
    /// broad phase has a dense cluster to convert.
    pub fn generate(seed: u64, count: usize, size: f32) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut store = EntityStore::with_key();
        let arena = Rect::new(0.0, 0.0, size, size);

        let level = Rect::new(0.0, 0.0, size * 0.5, size * 0.5);
        store.insert(Entity::new("level").with_bounds(level).with_map());

        let center = arena.center();
        let movers = (0..count)
            .map(|i| {
                let extent = rng.gen_range(6.0..24.0);
                let position = if i % 5 == 0 {
                    center + Vec2::new(rng.gen_range(-48.0..48.0), rng.gen_range(-48.0..48.0))
                } else {
                    Vec2::new(rng.gen_range(0.0..size - extent), rng.gen_range(0.0..size - extent))
                };
                let entity = Entity::new(format!("mover_{i:04}"))
                    .with_bounds(Rect::new(position.x, position.y, extent, extent))
                    .with_collider(i % 3 == 0);
                Mover {
                    key: store.insert(entity),
                    velocity: Vec2::new(rng.gen_range(-80.0..80.0), rng.gen_range(-80.0..80.0)),
                }
            })
            .collect();

        Self { store, movers, arena }
    }

    /// Advance every mover, bouncing off the arena walls
    pub fn update(&mut self, delta_time: f32) {
        let (min, max) = (self.arena.min(), self.arena.max());
        for mover in &mut self.movers {
            let Some(bounds) = self.store.get(mover.key).and_then(|entity| entity.bounds) else {
                continue;
            };
            let mut position = Vec2::new(bounds.x, bounds.y) + mover.velocity * delta_time;

            if position.x < min.x || position.x + bounds.width > max.x {
                mover.velocity.x = -mover.velocity.x;
                position.x = position.x.clamp(min.x, max.x - bounds.width);
            }
            if position.y < min.y || position.y + bounds.height > max.y {
                mover.velocity.y = -mover.velocity.y;
                position.y = position.y.clamp(min.y, max.y - bounds.height);
            }

            if let Some(entity) = self.store.get_mut(mover.key) {
                entity.move_to(position.x, position.y);
            }
        }
    }

    /// Entities to hand to the pipeline
    pub const fn store(&self) -> &EntityStore {
        &self.store
    }
}
