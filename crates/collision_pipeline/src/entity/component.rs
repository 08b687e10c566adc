//! Component tags carried by collidable entities
//!
//! The pipeline never looks inside components. It only needs to know which
//! kinds an entity carries and whether each one is currently active.

use bitflags::bitflags;

/// Kind of component attached to an entity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Physical collider
    Collider {
        /// Whether this collider also collides with tile maps
        map_interaction: bool,
    },
    /// Tile map
    Map,
    /// Any other component; ignored by collision filtering
    Other(String),
}

/// A component kind together with its enabled state
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentTag {
    /// What the component is
    pub kind: ComponentKind,
    /// Inactive components are skipped by collision filtering
    pub active: bool,
}

impl ComponentTag {
    /// Create an active tag
    pub const fn active(kind: ComponentKind) -> Self {
        Self { kind, active: true }
    }

    /// Create an inactive tag
    pub const fn inactive(kind: ComponentKind) -> Self {
        Self { kind, active: false }
    }
}

bitflags! {
    /// Snapshot of the collision-relevant active components of an entity
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CollisionProfile: u8 {
        /// Carries an active collider
        const COLLIDER = 1 << 0;
        /// The active collider interacts with maps
        const MAP_INTERACTION = 1 << 1;
        /// Carries an active map
        const MAP = 1 << 2;
    }
}

impl CollisionProfile {
    /// Build a profile from an ordered tag list. Inactive tags are ignored.
    pub fn from_tags<'a>(tags: impl IntoIterator<Item = &'a ComponentTag>) -> Self {
        tags.into_iter()
            .filter(|tag| tag.active)
            .fold(Self::empty(), |profile, tag| match tag.kind {
                ComponentKind::Collider { map_interaction: true } => {
                    profile | Self::COLLIDER | Self::MAP_INTERACTION
                }
                ComponentKind::Collider { map_interaction: false } => profile | Self::COLLIDER,
                ComponentKind::Map => profile | Self::MAP,
                ComponentKind::Other(_) => profile,
            })
    }

    /// Has an active collider
    pub const fn has_collider(self) -> bool {
        self.contains(Self::COLLIDER)
    }

    /// Has an active collider that interacts with maps
    pub const fn interacts_with_maps(self) -> bool {
        self.contains(Self::COLLIDER.union(Self::MAP_INTERACTION))
    }

    /// Has an active map
    pub const fn is_map(self) -> bool {
        self.contains(Self::MAP)
    }
}
