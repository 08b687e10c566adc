//! Collision events handed to game logic

use std::fmt;
use std::sync::Arc;

use super::pair_filter::{MapSide, PairKind};
use crate::entity::EntityKey;
use crate::foundation::math::Rect;

/// Lifecycle stage of a colliding pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CollisionState {
    /// Not colliding now or last frame
    #[default]
    None,
    /// Started colliding this frame
    Enter,
    /// Colliding this frame and last frame
    Stay,
    /// Stopped colliding this frame
    Leave,
}

impl CollisionState {
    /// State for a pair given whether it collided last frame and whether it collides now
    pub const fn from_transition(was_colliding: bool, is_colliding: bool) -> Self {
        match (was_colliding, is_colliding) {
            (false, false) => Self::None,
            (true, false) => Self::Leave,
            (false, true) => Self::Enter,
            (true, true) => Self::Stay,
        }
    }
}

impl fmt::Display for CollisionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "NONE",
            Self::Enter => "ENTER",
            Self::Stay => "STAY",
            Self::Leave => "LEAVE",
        };
        f.write_str(name)
    }
}

/// Kind-specific payload of a hit
#[derive(Debug, Clone, PartialEq)]
pub enum HitKind {
    /// Collider against collider
    Collider {
        /// Contact area, shared between hits describing the same contact
        rect: Option<Arc<Rect>>,
    },
    /// Collider against a tile map
    Map {
        /// The map entity
        map: EntityKey,
        /// Tile touched, when the narrow phase reports one
        cell: Option<(i32, i32)>,
    },
}

/// One collision event
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionHit {
    /// Payload
    pub kind: HitKind,
    /// Lifecycle stage, assigned by the resolver
    pub state: CollisionState,
    /// Entity the event is reported for; the collider for map hits
    pub entity: EntityKey,
    /// The other entity; the map for map hits
    pub target: EntityKey,
}

impl CollisionHit {
    /// Collider-vs-collider hit
    pub fn collider(entity: EntityKey, target: EntityKey, rect: Option<Arc<Rect>>) -> Self {
        Self {
            kind: HitKind::Collider { rect },
            state: CollisionState::None,
            entity,
            target,
        }
    }

    /// Collider-vs-map hit
    pub fn map(collider: EntityKey, map: EntityKey, cell: Option<(i32, i32)>) -> Self {
        Self {
            kind: HitKind::Map { map, cell },
            state: CollisionState::None,
            entity: collider,
            target: map,
        }
    }

    /// Payload-free hit for a pair `(first, second)` of the given kind
    pub fn minimal(
        kind: PairKind,
        first: EntityKey,
        second: EntityKey,
        state: CollisionState,
    ) -> Self {
        let hit = match kind {
            PairKind::Collider => Self::collider(first, second, None),
            PairKind::Map(MapSide::First) => Self::map(second, first, None),
            PairKind::Map(MapSide::Second) => Self::map(first, second, None),
        };
        hit.with_state(state)
    }

    /// Same hit with a different state
    #[must_use]
    pub fn with_state(mut self, state: CollisionState) -> Self {
        self.state = state;
        self
    }

    /// True for map hits
    pub const fn is_map(&self) -> bool {
        matches!(self.kind, HitKind::Map { .. })
    }
}

impl fmt::Display for CollisionHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            HitKind::Collider { .. } => {
                write!(f, "{} collider {:?} -> {:?}", self.state, self.entity, self.target)
            }
            HitKind::Map { cell: Some((x, y)), .. } => {
                write!(f, "{} map {:?} -> {:?} @ ({x}, {y})", self.state, self.entity, self.target)
            }
            HitKind::Map { cell: None, .. } => {
                write!(f, "{} map {:?} -> {:?}", self.state, self.entity, self.target)
            }
        }
    }
}
