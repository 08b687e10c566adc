//! AVL-balanced dynamic bounding volume hierarchy
//!
//! A tree is built from scratch whenever a dense block of grid cells is
//! converted into a region, and dropped with the region. There is no
//! incremental refit: each internal node exclusively owns its two children,
//! so the tree is a plain `Box` hierarchy without parent links.

use super::cell::CellKey;
use super::grid::GridIndex;
use super::pair::PairCollector;
use crate::foundation::math::Rect;

/// Single node of the hierarchy
#[derive(Debug, Clone)]
pub enum DbvhNode {
    /// One indexed entity
    Leaf {
        /// Slot in the owning index's entity table
        slot: usize,
        /// Entity bounds
        bounds: Rect,
    },
    /// Union of two subtrees
    Branch {
        /// Left subtree
        left: Box<DbvhNode>,
        /// Right subtree
        right: Box<DbvhNode>,
        /// Union of both children's bounds
        bounds: Rect,
        /// Cached height; leaves have height 1
        height: usize,
    },
}

impl DbvhNode {
    fn leaf(slot: usize, bounds: Rect) -> Box<Self> {
        Box::new(Self::Leaf { slot, bounds })
    }

    /// Join two subtrees, recomputing the union bounds and the height
    fn branch(left: Box<Self>, right: Box<Self>) -> Box<Self> {
        let bounds = left.bounds().union(&right.bounds());
        let height = 1 + left.height().max(right.height());
        Box::new(Self::Branch { left, right, bounds, height })
    }

    /// Bounds covering this subtree
    pub const fn bounds(&self) -> Rect {
        match self {
            Self::Leaf { bounds, .. } | Self::Branch { bounds, .. } => *bounds,
        }
    }

    /// Height of this subtree
    pub const fn height(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Branch { height, .. } => *height,
        }
    }

    /// `height(left) - height(right)`, zero for leaves
    #[allow(clippy::cast_possible_wrap)]
    pub const fn balance(&self) -> isize {
        match self {
            Self::Leaf { .. } => 0,
            Self::Branch { left, right, .. } => left.height() as isize - right.height() as isize,
        }
    }

    /// True for leaf nodes
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    fn collect_leaves(&self, out: &mut Vec<usize>) {
        match self {
            Self::Leaf { slot, .. } => out.push(*slot),
            Self::Branch { left, right, .. } => {
                left.collect_leaves(out);
                right.collect_leaves(out);
            }
        }
    }

    fn query(&self, area: &Rect, out: &mut Vec<usize>) {
        if !self.bounds().overlaps(area) {
            return;
        }
        match self {
            Self::Leaf { slot, .. } => out.push(*slot),
            Self::Branch { left, right, .. } => {
                left.query(area, out);
                right.query(area, out);
            }
        }
    }
}

/// Bounding volume hierarchy over a small cluster of entities
#[derive(Debug, Clone, Default)]
pub struct DbvhTree {
    root: Option<Box<DbvhNode>>,
    len: usize,
}

impl DbvhTree {
    /// Create an empty tree
    pub const fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Build a tree by inserting every `(slot, bounds)` entry in order
    pub fn build(entities: impl IntoIterator<Item = (usize, Rect)>) -> Self {
        let mut tree = Self::new();
        for (slot, bounds) in entities {
            tree.insert(slot, bounds);
        }
        tree
    }

    /// Insert one entity as a new leaf.
    ///
    /// An empty tree becomes the leaf. Otherwise the current root and the leaf
    /// are joined under a new internal node, leaf on the right, and the result
    /// is rebalanced.
    pub fn insert(&mut self, slot: usize, bounds: Rect) {
        let leaf = DbvhNode::leaf(slot, bounds);
        self.root = Some(match self.root.take() {
            None => leaf,
            Some(root) => Self::rebalance(DbvhNode::branch(root, leaf)),
        });
        self.len += 1;
    }

    /// Root node, if any
    pub fn root(&self) -> Option<&DbvhNode> {
        self.root.as_deref()
    }

    /// Number of leaves
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True if the tree has no leaves
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the tree, zero when empty
    pub fn height(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.height())
    }

    /// Bounds covering every leaf
    pub fn bounds(&self) -> Option<Rect> {
        self.root.as_ref().map(|root| root.bounds())
    }

    /// All leaf slots, left to right
    pub fn leaves(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.len);
        if let Some(root) = &self.root {
            root.collect_leaves(&mut out);
        }
        out
    }

    /// Leaf slots whose bounds overlap `area`
    pub fn query(&self, area: &Rect, out: &mut Vec<usize>) {
        if let Some(root) = &self.root {
            root.query(area, out);
        }
    }

    /// Release every node. Indexed entities are not touched.
    pub fn destroy(&mut self) {
        // Post-order: children are freed before their parent
        fn free(node: Box<DbvhNode>) {
            if let DbvhNode::Branch { left, right, .. } = *node {
                free(left);
                free(right);
            }
        }
        if let Some(root) = self.root.take() {
            free(root);
        }
        self.len = 0;
    }

    /// Restore the AVL property of a subtree whose children are balanced.
    ///
    /// When one side is taller by more than two levels (a fresh leaf joined
    /// with a large root), the rotation demotes the old root, which is then
    /// rebalanced recursively before the final single or double rotation.
    fn rebalance(node: Box<DbvhNode>) -> Box<DbvhNode> {
        let balance = node.balance();
        if balance > 2 {
            let DbvhNode::Branch { left, right, .. } = *node else {
                unreachable!("leaves are always balanced");
            };
            let DbvhNode::Branch { left: outer, right: inner, .. } = *left else {
                unreachable!("a subtree taller than its sibling by two is a branch");
            };
            let demoted = Self::rebalance(DbvhNode::branch(inner, right));
            return Self::rotate_once(DbvhNode::branch(outer, demoted));
        }
        if balance < -2 {
            let DbvhNode::Branch { left, right, .. } = *node else {
                unreachable!("leaves are always balanced");
            };
            let DbvhNode::Branch { left: inner, right: outer, .. } = *right else {
                unreachable!("a subtree taller than its sibling by two is a branch");
            };
            let demoted = Self::rebalance(DbvhNode::branch(left, inner));
            return Self::rotate_once(DbvhNode::branch(demoted, outer));
        }
        Self::rotate_once(node)
    }

    /// Standard AVL fix-up for a node with `|balance| <= 2`
    fn rotate_once(node: Box<DbvhNode>) -> Box<DbvhNode> {
        let balance = node.balance();
        if balance > 1 {
            let DbvhNode::Branch { left, right, .. } = *node else {
                unreachable!("leaves are always balanced");
            };
            // Left-right case: straighten the left child first
            let left = if left.balance() < 0 { Self::rotate_left(left) } else { left };
            Self::rotate_right(DbvhNode::branch(left, right))
        } else if balance < -1 {
            let DbvhNode::Branch { left, right, .. } = *node else {
                unreachable!("leaves are always balanced");
            };
            let right = if right.balance() > 0 { Self::rotate_right(right) } else { right };
            Self::rotate_left(DbvhNode::branch(left, right))
        } else {
            node
        }
    }

    fn rotate_right(node: Box<DbvhNode>) -> Box<DbvhNode> {
        match *node {
            DbvhNode::Branch { left, right, bounds, height } => match *left {
                DbvhNode::Branch { left: pivot_left, right: pivot_right, .. } => {
                    DbvhNode::branch(pivot_left, DbvhNode::branch(pivot_right, right))
                }
                leaf @ DbvhNode::Leaf { .. } => {
                    Box::new(DbvhNode::Branch { left: Box::new(leaf), right, bounds, height })
                }
            },
            leaf @ DbvhNode::Leaf { .. } => Box::new(leaf),
        }
    }

    fn rotate_left(node: Box<DbvhNode>) -> Box<DbvhNode> {
        match *node {
            DbvhNode::Branch { left, right, bounds, height } => match *right {
                DbvhNode::Branch { left: pivot_left, right: pivot_right, .. } => {
                    DbvhNode::branch(DbvhNode::branch(left, pivot_left), pivot_right)
                }
                leaf @ DbvhNode::Leaf { .. } => {
                    Box::new(DbvhNode::Branch { left, right: Box::new(leaf), bounds, height })
                }
            },
            leaf @ DbvhNode::Leaf { .. } => Box::new(leaf),
        }
    }
}

impl Drop for DbvhTree {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// A DBVH tree that replaces the 3x3 block of grid cells around `center`
#[derive(Debug, Clone)]
pub struct DbvhRegion {
    center: CellKey,
    tree: DbvhTree,
}

impl DbvhRegion {
    /// Wrap a tree built from the block around `center`
    pub const fn new(center: CellKey, tree: DbvhTree) -> Self {
        Self { center, tree }
    }

    /// Center cell of the owned block
    pub const fn center(&self) -> CellKey {
        self.center
    }

    /// The region's tree
    pub const fn tree(&self) -> &DbvhTree {
        &self.tree
    }

    /// Whether `key` lies in the owned 3x3 block
    pub fn owns(&self, key: CellKey) -> bool {
        self.center.ring_distance(key) <= 1
    }

    /// Emit every overlapping pair this region is responsible for.
    ///
    /// First an all-pairs scan over the region's own entities, then pairs
    /// that straddle the region border: every entity in the ring of cells at
    /// distance 2 from the center is matched against the tree, unless that
    /// cell belongs to some region (`is_region_owned`).
    pub(crate) fn query_pairs(
        &self,
        grid: &GridIndex,
        is_region_owned: impl Fn(CellKey) -> bool,
        collector: &mut PairCollector<'_>,
    ) {
        let members = self.tree.leaves();
        for (i, &a) in members.iter().enumerate() {
            for &b in &members[i + 1..] {
                collector.offer(a, b);
            }
        }

        let mut candidates = Vec::new();
        for key in self.center.block(2) {
            if self.owns(key) || is_region_owned(key) {
                continue;
            }
            let Some(cell) = grid.get(key) else {
                continue;
            };
            for &outside in cell.entities() {
                candidates.clear();
                self.tree.query(&collector.entity(outside).bounds, &mut candidates);
                for &inside in &candidates {
                    collector.offer(inside, outside);
                }
            }
        }
    }
}
