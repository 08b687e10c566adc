//! Entity model consumed by the collision pipeline
//!
//! The pipeline reads entities through the [`Collidable`] trait and refers to
//! them by [`EntityKey`]. It never owns or mutates them.

mod component;

pub use component::{CollisionProfile, ComponentKind, ComponentTag};

use std::sync::Arc;

use slotmap::{new_key_type, SlotMap};

use crate::foundation::math::Rect;

new_key_type! {
    /// Stable, non-owning reference to an entity in an [`EntityStore`]
    pub struct EntityKey;
}

/// Entity storage keyed by [`EntityKey`]
pub type EntityStore = SlotMap<EntityKey, Entity>;

/// Read access the pipeline needs from an entity
pub trait Collidable {
    /// Stable identity, compared by value when building canonical pair keys
    fn identity(&self) -> &Arc<str>;

    /// Inactive entities are not indexed
    fn is_active(&self) -> bool;

    /// World-space bounds, or `None` if the entity is not collidable
    fn world_bounds(&self) -> Option<Rect>;

    /// Ordered component tags
    fn components(&self) -> &[ComponentTag];
}

/// Simulation entity as seen by the collision pipeline
#[derive(Debug, Clone)]
pub struct Entity {
    id: Arc<str>,
    /// Whether the entity takes part in the simulation
    pub active: bool,
    /// World-space bounds
    pub bounds: Option<Rect>,
    /// Attached component tags, in attachment order
    pub components: Vec<ComponentTag>,
}

impl Entity {
    /// Create an active entity with no bounds and no components
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self {
            id: id.into(),
            active: true,
            bounds: None,
            components: Vec::new(),
        }
    }

    /// Set world-space bounds
    #[must_use]
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Attach an active collider
    #[must_use]
    pub fn with_collider(self, map_interaction: bool) -> Self {
        self.with_component(ComponentTag::active(ComponentKind::Collider { map_interaction }))
    }

    /// Attach an active map
    #[must_use]
    pub fn with_map(self) -> Self {
        self.with_component(ComponentTag::active(ComponentKind::Map))
    }

    /// Attach an arbitrary component tag
    #[must_use]
    pub fn with_component(mut self, tag: ComponentTag) -> Self {
        self.components.push(tag);
        self
    }

    /// Mark the entity inactive
    #[must_use]
    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    /// Entity identity
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Move the entity so its bounds start at `(x, y)`
    pub fn move_to(&mut self, x: f32, y: f32) {
        if let Some(bounds) = &mut self.bounds {
            bounds.x = x;
            bounds.y = y;
        }
    }
}

impl Collidable for Entity {
    fn identity(&self) -> &Arc<str> {
        &self.id
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn world_bounds(&self) -> Option<Rect> {
        self.bounds
    }

    fn components(&self) -> &[ComponentTag] {
        &self.components
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let entity = Entity::new("crate")
            .with_bounds(Rect::new(1.0, 2.0, 3.0, 4.0))
            .with_collider(true)
            .with_map();

        assert_eq!(entity.id(), "crate");
        assert!(entity.is_active());
        assert_eq!(entity.components().len(), 2);
        assert!(CollisionProfile::from_tags(entity.components()).is_map());
    }

    #[test]
    fn test_move_to_keeps_size() {
        let mut entity = Entity::new("a").with_bounds(Rect::new(0.0, 0.0, 3.0, 4.0));
        entity.move_to(10.0, 20.0);
        assert_eq!(entity.world_bounds(), Some(Rect::new(10.0, 20.0, 3.0, 4.0)));

        let mut unbounded = Entity::new("b");
        unbounded.move_to(1.0, 1.0);
        assert_eq!(unbounded.world_bounds(), None);
    }

    #[test]
    fn test_store_keys_are_stable() {
        let mut store = EntityStore::with_key();
        let a = store.insert(Entity::new("a"));
        let b = store.insert(Entity::new("b"));
        store.remove(a);

        assert!(store.get(a).is_none());
        assert_eq!(store[b].id(), "b");
    }
}
