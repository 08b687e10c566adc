//! Math utilities and types
//!
//! Provides the 2D math types used by the broad phase and the resolver.

use serde::{Deserialize, Serialize};

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Axis-aligned rectangle in world space (origin at the top-left corner)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Horizontal extent
    pub width: f32,
    /// Vertical extent
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from position and size
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Create the rectangle spanning two corners
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self {
            x: min.x,
            y: min.y,
            width: max.x - min.x,
            height: max.y - min.y,
        }
    }

    /// Minimum corner
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Maximum corner
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    /// Center point
    pub fn center(&self) -> Vec2 {
        (self.min() + self.max()) * 0.5
    }

    /// Length of the diagonal
    pub fn diagonal(&self) -> f32 {
        Vec2::new(self.width, self.height).norm()
    }

    /// True if both corners are finite
    pub fn is_finite(&self) -> bool {
        let (min, max) = (self.min(), self.max());
        min.x.is_finite() && min.y.is_finite() && max.x.is_finite() && max.y.is_finite()
    }

    /// Check if this rectangle overlaps another.
    ///
    /// Edges that merely touch do not count as overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Smallest rectangle enclosing both rectangles
    pub fn union(&self, other: &Self) -> Self {
        let min = self.min().inf(&other.min());
        let max = self.max().sup(&other.max());
        Self::from_min_max(min, max)
    }

    /// Overlapping area of both rectangles, if any
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        let min = self.min().sup(&other.min());
        let max = self.max().inf(&other.max());
        Some(Self::from_min_max(min, max))
    }
}
