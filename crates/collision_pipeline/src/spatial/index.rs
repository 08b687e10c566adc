//! Two-tier broad phase: uniform grid plus DBVH regions for dense clusters
//!
//! Usage per frame: `clear()`, `insert()` every entity, then `get_pairs()`.
//! `get_pairs()` first converts crowded 3x3 blocks of cells into DBVH
//! regions, then emits pairs from the regions and from the remaining grid.

use std::collections::BTreeMap;

use log::{debug, trace, warn};

use super::cell::CellKey;
use super::dbvh::{DbvhRegion, DbvhTree};
use super::grid::GridIndex;
use super::pair::{IndexedEntity, PairCollector, SpatialPair};
use crate::config::SpatialIndexConfig;
use crate::entity::{Collidable, EntityKey};
use crate::foundation::time::Stopwatch;

/// Snapshot of the index layout, for debugging and overlays
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialStats {
    /// Current cell size
    pub cell_size: f32,
    /// Non-empty grid cells
    pub cells: usize,
    /// DBVH regions
    pub regions: usize,
    /// Entities held by DBVH regions
    pub region_entities: usize,
    /// Entities inserted since the last `clear()`
    pub indexed: usize,
}

/// Broad-phase spatial index
#[derive(Debug)]
pub struct SpatialIndex {
    config: SpatialIndexConfig,
    grid: GridIndex,
    regions: BTreeMap<CellKey, DbvhRegion>,
    entities: Vec<IndexedEntity>,
    tune_timer: Stopwatch,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(SpatialIndexConfig::default())
    }
}

impl SpatialIndex {
    /// Create an empty index.
    ///
    /// A non-positive or non-finite default cell size is replaced by the
    /// minimum cell size.
    pub fn new(mut config: SpatialIndexConfig) -> Self {
        if !(config.min_cell_size.is_finite() && config.min_cell_size > 0.0) {
            warn!("SpatialIndex: invalid min_cell_size {}, using 32", config.min_cell_size);
            config.min_cell_size = 32.0;
        }
        if !(config.default_cell_size.is_finite() && config.default_cell_size > 0.0) {
            warn!(
                "SpatialIndex: invalid default_cell_size {}, using {}",
                config.default_cell_size, config.min_cell_size
            );
            config.default_cell_size = config.min_cell_size;
        }

        Self {
            grid: GridIndex::new(config.default_cell_size),
            config,
            regions: BTreeMap::new(),
            entities: Vec::new(),
            tune_timer: Stopwatch::start_new(),
        }
    }

    /// Active configuration
    pub const fn config(&self) -> &SpatialIndexConfig {
        &self.config
    }

    /// Current cell size
    pub const fn cell_size(&self) -> f32 {
        self.grid.cell_size()
    }

    /// The uniform grid tier
    pub const fn grid(&self) -> &GridIndex {
        &self.grid
    }

    /// DBVH regions in center order
    pub fn regions(&self) -> impl Iterator<Item = &DbvhRegion> {
        self.regions.values()
    }

    /// Snapshot of an indexed entity by slot
    pub fn entity(&self, slot: usize) -> Option<&IndexedEntity> {
        self.entities.get(slot)
    }

    /// Whether `key` belongs to the 3x3 block of some DBVH region
    pub fn is_region_owned(&self, key: CellKey) -> bool {
        Self::region_owner(&self.regions, key).is_some()
    }

    fn region_owner(regions: &BTreeMap<CellKey, DbvhRegion>, key: CellKey) -> Option<CellKey> {
        if regions.is_empty() {
            return None;
        }
        key.block(1).find(|center| regions.contains_key(center))
    }

    /// Index an entity for this frame.
    ///
    /// Inactive and bounds-less entities are ignored and `false` is returned.
    /// Cells owned by a DBVH region are skipped. After inserting, density is
    /// re-checked once the tuning cooldown has elapsed.
    pub fn insert<E: Collidable + ?Sized>(&mut self, key: EntityKey, entity: &E) -> bool {
        let Some(indexed) = IndexedEntity::capture(key, entity) else {
            return false;
        };

        let slot = self.entities.len();
        let bounds = indexed.bounds;
        self.entities.push(indexed);

        let regions = &self.regions;
        self.grid.insert(slot, &bounds, |cell| Self::region_owner(regions, cell).is_some());

        self.maybe_auto_tune();
        true
    }

    /// Entities indexed this frame per non-empty cell.
    ///
    /// An entity spanning several cells counts once.
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_occupancy(&self) -> f32 {
        if self.grid.is_empty() {
            return 0.0;
        }
        self.entities.len() as f32 / self.grid.len() as f32
    }

    fn maybe_auto_tune(&mut self) {
        if !self.config.auto_tune || !self.tune_timer.has_elapsed(self.config.tune_cooldown_secs) {
            return;
        }
        self.tune_timer.restart();

        let occupancy = self.mean_occupancy();
        if occupancy > self.config.density_threshold {
            debug!(
                "SpatialIndex: mean occupancy {:.2} exceeds {:.2}, auto-tuning",
                occupancy, self.config.density_threshold
            );
            self.auto_tune();
        }
    }

    /// Re-derive the cell size from the entities currently in the grid.
    ///
    /// One entity is sampled per non-empty cell; the new size is twice the
    /// average bounds diagonal, but never below the configured minimum. With
    /// nothing to sample the size resets to the default. Entities already
    /// indexed are re-bucketed under the new size, dissolving any regions.
    pub fn auto_tune(&mut self) {
        let (sum, samples) = self
            .grid
            .iter()
            .filter_map(|(_, cell)| cell.entities().first())
            .fold((0.0_f32, 0_u32), |(sum, count), &slot| {
                (sum + self.entities[slot].bounds.diagonal(), count + 1)
            });

        #[allow(clippy::cast_precision_loss)]
        let new_size = if samples == 0 {
            self.config.default_cell_size
        } else {
            (2.0 * sum / samples as f32).max(self.config.min_cell_size)
        };

        if (new_size - self.grid.cell_size()).abs() <= f32::EPSILON {
            return;
        }
        debug!(
            "SpatialIndex: cell size {} -> {} ({} samples)",
            self.grid.cell_size(),
            new_size,
            samples
        );
        self.rebucket(new_size);
    }

    fn rebucket(&mut self, cell_size: f32) {
        self.regions.clear();
        self.grid.resize(cell_size);
        for (slot, entity) in self.entities.iter().enumerate() {
            self.grid.insert(slot, &entity.bounds, |_| false);
        }
    }

    /// Produce every overlapping, component-compatible pair exactly once.
    ///
    /// Crowded cells are converted into DBVH regions first. Calling this twice
    /// without re-inserting yields the same pair set.
    pub fn get_pairs(&mut self) -> Vec<SpatialPair> {
        self.densify();

        let mut collector = PairCollector::new(&self.entities);
        let regions = &self.regions;

        for region in regions.values() {
            region.query_pairs(
                &self.grid,
                |cell| Self::region_owner(regions, cell).is_some(),
                &mut collector,
            );
        }

        for (key, cell) in self.grid.iter() {
            let slots = cell.entities();
            for (i, &a) in slots.iter().enumerate() {
                for &b in &slots[i + 1..] {
                    collector.offer(a, b);
                }
            }

            for neighbor in key.neighbors() {
                // Each unordered cell pair is visited once, from its smaller key
                if neighbor <= key || Self::region_owner(regions, neighbor).is_some() {
                    continue;
                }
                let Some(other) = self.grid.get(neighbor) else {
                    continue;
                };
                for &a in slots {
                    for &b in other.entities() {
                        collector.offer(a, b);
                    }
                }
            }
        }

        let pairs = collector.finish();
        trace!(
            "SpatialIndex: {} pairs from {} cells and {} regions",
            pairs.len(),
            self.grid.len(),
            self.regions.len()
        );
        pairs
    }

    /// Convert every crowded cell's 3x3 block into a DBVH region
    fn densify(&mut self) {
        let threshold = self.config.conversion_threshold;
        let crowded: Vec<CellKey> = self
            .grid
            .iter()
            .filter(|(_, cell)| cell.len() > threshold)
            .map(|(key, _)| key)
            .collect();

        for center in crowded {
            self.convert_block(center);
        }
    }

    /// Replace the 3x3 block around `center` with a DBVH region.
    ///
    /// Skipped when the center already is a region or any cell of the block
    /// is missing from the grid.
    fn convert_block(&mut self, center: CellKey) -> bool {
        if self.regions.contains_key(&center) {
            return false;
        }
        if !center.block(1).all(|key| self.grid.contains(key)) {
            return false;
        }

        let mut members: Vec<usize> = center
            .block(1)
            .filter_map(|key| self.grid.remove(key))
            .flat_map(|cell| cell.entities().to_vec())
            .collect();
        members.sort_unstable();
        members.dedup();

        let tree = DbvhTree::build(members.iter().map(|&slot| (slot, self.entities[slot].bounds)));
        debug!(
            "SpatialIndex: converted block around {} into a DBVH region ({} entities, height {})",
            center,
            tree.len(),
            tree.height()
        );
        self.regions.insert(center, DbvhRegion::new(center, tree));
        true
    }

    /// Drop every grid cell, region and frame snapshot
    pub fn clear(&mut self) {
        self.grid.clear();
        self.regions.clear();
        self.entities.clear();
    }

    /// Current layout summary
    pub fn stats(&self) -> SpatialStats {
        SpatialStats {
            cell_size: self.grid.cell_size(),
            cells: self.grid.len(),
            regions: self.regions.len(),
            region_entities: self.regions.values().map(|region| region.tree().len()).sum(),
            indexed: self.entities.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Entity, EntityStore};
    use crate::foundation::math::Rect;

    fn config() -> SpatialIndexConfig {
        SpatialIndexConfig {
            default_cell_size: 32.0,
            min_cell_size: 32.0,
            conversion_threshold: 4,
            density_threshold: 3.0,
            tune_cooldown_secs: 0.0,
            auto_tune: false,
        }
    }

    fn collider(id: &str, x: f32, y: f32, size: f32) -> Entity {
        Entity::new(id).with_bounds(Rect::new(x, y, size, size)).with_collider(false)
    }

    fn index_all(index: &mut SpatialIndex, store: &EntityStore) {
        index.clear();
        for (key, entity) in store {
            index.insert(key, entity);
        }
    }

    fn pair_names(pairs: &[SpatialPair]) -> Vec<String> {
        let mut names: Vec<String> = pairs.iter().map(|pair| pair.key.to_string()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_two_overlapping_colliders() {
        let mut store = EntityStore::with_key();
        store.insert(collider("A", 0.0, 0.0, 10.0));
        store.insert(collider("B", 5.0, 5.0, 10.0));

        let mut index = SpatialIndex::new(config());
        index_all(&mut index, &store);

        assert_eq!(pair_names(&index.get_pairs()), vec!["A|B"]);
    }

    #[test]
    fn test_inactive_and_unbounded_are_ignored() {
        let mut store = EntityStore::with_key();
        let a = store.insert(collider("A", 0.0, 0.0, 10.0));
        let b = store.insert(collider("B", 5.0, 5.0, 10.0).deactivated());
        let c = store.insert(Entity::new("C").with_collider(false));

        let mut index = SpatialIndex::new(config());
        assert!(index.insert(a, &store[a]));
        assert!(!index.insert(b, &store[b]));
        assert!(!index.insert(c, &store[c]));

        assert!(index.get_pairs().is_empty());
        assert_eq!(index.stats().indexed, 1);
    }

    #[test]
    fn test_cross_cell_pair_reported_once() {
        let mut store = EntityStore::with_key();
        // Both span the same four cells around the (32, 32) corner
        store.insert(collider("A", 20.0, 20.0, 20.0));
        store.insert(collider("B", 25.0, 25.0, 20.0));

        let mut index = SpatialIndex::new(config());
        index_all(&mut index, &store);
        let pairs = index.get_pairs();

        assert_eq!(pairs.len(), 1);
        assert_eq!(index.grid().len(), 4);
    }

    #[test]
    fn test_dense_block_converts_to_region() {
        let mut store = EntityStore::with_key();
        // A crowded center cell plus one entity in each neighbour so the block is complete
        for i in 0..6 {
            #[allow(clippy::cast_precision_loss)]
            let offset = i as f32 * 4.0;
            store.insert(collider(&format!("c{i}"), 34.0 + offset, 40.0, 3.0));
        }
        for (n, key) in CellKey::new(1, 1).neighbors().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let (x, y) = (key.x as f32 * 32.0 + 10.0, key.y as f32 * 32.0 + 10.0);
            store.insert(collider(&format!("n{n}"), x, y, 4.0));
        }

        let mut index = SpatialIndex::new(config());
        index_all(&mut index, &store);
        let pairs = index.get_pairs();
        let stats = index.stats();

        assert_eq!(stats.regions, 1);
        assert_eq!(stats.region_entities, 14);
        assert!(index.is_region_owned(CellKey::new(0, 0)));
        assert!(!index.grid().contains(CellKey::new(1, 1)));

        // c0..c5 are 3 wide and 4 apart: nothing overlaps
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_insert_after_get_pairs_skips_region_cells() {
        let mut store = EntityStore::with_key();
        for i in 0..6 {
            #[allow(clippy::cast_precision_loss)]
            let offset = i as f32 * 4.0;
            store.insert(collider(&format!("c{i}"), 34.0 + offset, 40.0, 3.0));
        }
        for (n, key) in CellKey::new(1, 1).neighbors().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let (x, y) = (key.x as f32 * 32.0 + 10.0, key.y as f32 * 32.0 + 10.0);
            store.insert(collider(&format!("n{n}"), x, y, 4.0));
        }
        let mut index = SpatialIndex::new(config());
        index_all(&mut index, &store);
        index.get_pairs();
        let before = index.stats();

        let inside = store.insert(collider("late", 40.0, 40.0, 3.0));
        assert!(index.insert(inside, &store[inside]));

        assert!(!index.grid().contains(CellKey::new(1, 1)));
        assert_eq!(index.stats().cells, before.cells);
        assert_eq!(index.stats().indexed, before.indexed + 1);

        // Straddles owned (2, 2) and free (3, 3): only the free cells are filled
        let straddling = store.insert(collider("edge", 90.0, 90.0, 10.0));
        assert!(index.insert(straddling, &store[straddling]));

        assert!(!index.grid().contains(CellKey::new(2, 2)));
        assert!(index.grid().contains(CellKey::new(3, 3)));
        assert_eq!(index.stats().cells, before.cells + 3);
    }

    #[test]
    fn test_mean_occupancy_counts_entities_once() {
        let mut store = EntityStore::with_key();
        // Spans cells (0, 0) to (1, 1)
        store.insert(collider("wide", 20.0, 20.0, 20.0));
        let mut index = SpatialIndex::new(config());
        index_all(&mut index, &store);

        assert_eq!(index.stats().cells, 4);
        assert!((index.mean_occupancy() - 0.25).abs() < 1e-6);

        store.insert(collider("a", 100.0, 100.0, 4.0));
        store.insert(collider("b", 104.0, 100.0, 4.0));
        index_all(&mut index, &store);

        assert!((index.mean_occupancy() - 3.0 / 5.0).abs() < 1e-6);
        index.clear();
        assert!(index.mean_occupancy().abs() < f32::EPSILON);
    }

    #[test]
    fn test_non_finite_bounds_are_not_indexed() {
        let mut store = EntityStore::with_key();
        let key = store.insert(
            Entity::new("runaway")
                .with_bounds(Rect::new(0.0, 0.0, f32::INFINITY, 10.0))
                .with_collider(false),
        );
        let mut index = SpatialIndex::default();

        assert!(!index.insert(key, &store[key]));
        assert!(index.grid().is_empty());
        assert!(index.get_pairs().is_empty());
    }

    #[test]
    fn test_incomplete_block_is_not_converted() {
        let mut store = EntityStore::with_key();
        for i in 0..8 {
            store.insert(collider(&format!("e{i}"), 40.0, 40.0, 4.0));
        }

        let mut index = SpatialIndex::new(config());
        index_all(&mut index, &store);
        let pairs = index.get_pairs();

        assert_eq!(index.stats().regions, 0);
        assert_eq!(pairs.len(), 8 * 7 / 2);
    }

    #[test]
    fn test_get_pairs_is_idempotent() {
        let mut store = EntityStore::with_key();
        for y in 0..6 {
            for x in 0..6 {
                #[allow(clippy::cast_precision_loss)]
                let (px, py) = (x as f32 * 9.0, y as f32 * 9.0);
                store.insert(collider(&format!("e{x}_{y}"), px, py, 12.0));
            }
        }

        let mut index = SpatialIndex::new(config());
        index_all(&mut index, &store);
        let first = pair_names(&index.get_pairs());
        let second = pair_names(&index.get_pairs());

        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_auto_tune_from_samples_and_reset() {
        let mut store = EntityStore::with_key();
        for i in 0..4 {
            #[allow(clippy::cast_precision_loss)]
            let x = i as f32 * 200.0;
            let bounds = Rect::new(x, 0.0, 30.0, 40.0);
            store.insert(Entity::new(format!("big{i}")).with_bounds(bounds).with_collider(false));
        }

        let mut index =
            SpatialIndex::new(SpatialIndexConfig { default_cell_size: 40.0, ..config() });
        index_all(&mut index, &store);
        index.auto_tune();

        // Diagonal 50 -> cell size 100
        assert!((index.cell_size() - 100.0).abs() < 1e-3);
        assert_eq!(index.stats().indexed, 4);
        assert!(index.grid().reference_count() >= 4);

        index.clear();
        index.auto_tune();
        assert!((index.cell_size() - 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_auto_tune_respects_minimum() {
        let mut store = EntityStore::with_key();
        store.insert(collider("tiny", 0.0, 0.0, 1.0));

        let mut index =
            SpatialIndex::new(SpatialIndexConfig { default_cell_size: 64.0, ..config() });
        index_all(&mut index, &store);
        index.auto_tune();

        assert!((index.cell_size() - 32.0).abs() < 1e-3);
    }

    #[test]
    fn test_insert_triggers_auto_tune_when_dense() {
        let mut store = EntityStore::with_key();
        for i in 0..10 {
            store.insert(collider(&format!("e{i}"), 1.0, 1.0, 20.0));
        }

        let mut index = SpatialIndex::new(SpatialIndexConfig { auto_tune: true, ..config() });
        index_all(&mut index, &store);

        // Diagonal of a 20x20 box is ~28.3, so twice that exceeds the 32 minimum
        assert!(index.cell_size() >= 2.0 * 20.0 * std::f32::consts::SQRT_2 - 1e-3);
    }

    #[test]
    fn test_invalid_cell_size_is_clamped() {
        let index = SpatialIndex::new(SpatialIndexConfig {
            default_cell_size: -5.0,
            ..config()
        });
        assert!((index.cell_size() - 32.0).abs() < 1e-3);
    }
}
