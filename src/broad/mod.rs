//! Broadphase data and logic module.

use crate::{collider::ColliderId, error::Error, narrow::Aabb, Fp, Result};
use fnv::FnvHashMap;
use std::ops::RangeInclusive;

type Cell = (i32, i32);
type Buckets = FnvHashMap<Cell, Vec<ColliderId>>;

/// Bucket occupancy, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridStats {
    pub static_cells: usize,
    pub static_entries: usize,
    pub dynamic_cells: usize,
    pub dynamic_entries: usize,
}

/// Uniform hash grid bucketing collider ids by every cell their box covers.
///
/// Static and dynamic colliders live in separate maps: static buckets are filled once
/// when the collider is added, dynamic buckets are emptied and refilled every frame.
/// An id spanning several cells appears once per cell; `query` deduplicates by
/// stamping each id with the current query epoch.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: Fp,
    static_cells: Buckets,
    dynamic_cells: Buckets,
    query_id: u32,
    stamps: FnvHashMap<ColliderId, u32>,
}

impl SpatialGrid {
    pub fn new(cell_size: Fp) -> Result<SpatialGrid> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(Error::InvalidCellSize(cell_size));
        }
        Ok(SpatialGrid {
            cell_size,
            static_cells: Buckets::default(),
            dynamic_cells: Buckets::default(),
            query_id: 0,
            stamps: FnvHashMap::default(),
        })
    }

    #[inline]
    pub fn cell_size(&self) -> Fp {
        self.cell_size
    }

    #[inline]
    pub fn cell_range(&self, area: &Aabb) -> (RangeInclusive<i32>, RangeInclusive<i32>) {
        //! Returns the inclusive x and y cell coordinates `area` covers.
        let min_x = (area.min.x / self.cell_size).floor() as i32;
        let min_y = (area.min.y / self.cell_size).floor() as i32;
        let max_x = (area.max.x / self.cell_size).floor() as i32;
        let max_y = (area.max.y / self.cell_size).floor() as i32;
        (min_x..=max_x, min_y..=max_y)
    }

    pub fn insert(&mut self, id: ColliderId, rect: &Aabb, is_static: bool) {
        //! Appends `id` to the bucket of every cell `rect` covers, creating buckets as needed.
        let (xs, ys) = self.cell_range(rect);
        let cells = if is_static { &mut self.static_cells } else { &mut self.dynamic_cells };
        for x in xs {
            for y in ys.clone() {
                cells.entry((x, y)).or_default().push(id);
            }
        }
    }

    pub fn remove_static(&mut self, id: ColliderId, rect: &Aabb) {
        //! Purges a static collider registered with `rect`. Static buckets are never
        //! rebuilt, so without this they would reference the id forever.
        let (xs, ys) = self.cell_range(rect);
        for x in xs {
            for y in ys.clone() {
                if let Some(bucket) = self.static_cells.get_mut(&(x, y)) {
                    bucket.retain(|&e| e != id);
                }
            }
        }
        self.forget(id);
    }

    #[inline]
    pub fn forget(&mut self, id: ColliderId) {
        //! Drops the deduplication stamp kept for `id`.
        self.stamps.remove(&id);
    }

    pub fn clear_dynamic(&mut self) {
        //! Empties every dynamic bucket. Buckets filled since the last clear keep their
        //! allocation for the next rebuild, buckets that stayed empty are dropped.
        self.dynamic_cells.retain(|_, bucket| !bucket.is_empty());
        for bucket in self.dynamic_cells.values_mut() {
            bucket.clear();
        }
    }

    pub fn query(&mut self, area: &Aabb) -> Vec<ColliderId> {
        //! Returns every id registered in a cell `area` covers, each exactly once, in no
        //! particular order. The result is meant to be consumed by the caller immediately.
        self.query_id = self.query_id.wrapping_add(1);
        if self.query_id == 0 {
            // epoch 0 is what fresh stamps start at
            self.stamps.clear();
            self.query_id = 1;
        }
        let epoch = self.query_id;
        let (xs, ys) = self.cell_range(area);
        let covered = span(&xs).saturating_mul(span(&ys));

        let mut result = Vec::new();
        for cells in [&self.static_cells, &self.dynamic_cells].iter() {
            if covered > cells.len() as u64 {
                // fewer buckets than covered cells: scan the buckets instead
                for (&(x, y), bucket) in cells.iter() {
                    if xs.contains(&x) && ys.contains(&y) {
                        gather(bucket, &mut self.stamps, epoch, &mut result);
                    }
                }
            } else {
                for x in xs.clone() {
                    for y in ys.clone() {
                        if let Some(bucket) = cells.get(&(x, y)) {
                            gather(bucket, &mut self.stamps, epoch, &mut result);
                        }
                    }
                }
            }
        }
        result
    }

    pub fn stats(&self) -> GridStats {
        GridStats {
            static_cells: self.static_cells.len(),
            static_entries: self.static_cells.values().map(Vec::len).sum(),
            dynamic_cells: self.dynamic_cells.len(),
            dynamic_entries: self.dynamic_cells.values().map(Vec::len).sum(),
        }
    }
}

#[inline]
fn span(range: &RangeInclusive<i32>) -> u64 {
    (*range.end() as i64 - *range.start() as i64 + 1).max(0) as u64
}

#[inline]
fn gather(bucket: &[ColliderId], stamps: &mut FnvHashMap<ColliderId, u32>, epoch: u32, result: &mut Vec<ColliderId>) {
    for &id in bucket {
        let stamp = stamps.entry(id).or_insert(0);
        if *stamp != epoch {
            *stamp = epoch;
            result.push(id);
        }
    }
}
