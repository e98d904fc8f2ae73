//! Uniform grid spatial hash

use std::collections::{BTreeSet, HashMap};

use crate::ecs::EntityId;
use crate::foundation::math::Vec3;

use super::{Aabb, SpatialError, SpatialIndex};

const PRIME_X: i64 = 73_856_093;
const PRIME_Y: i64 = 19_349_663;
const PRIME_Z: i64 = 83_492_791;

/// Integer coordinate of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    /// Cell index along X
    pub x: i64,
    /// Cell index along Y
    pub y: i64,
    /// Cell index along Z
    pub z: i64,
}

impl CellCoord {
    /// Bucket key for this cell. Distinct cells may share a key.
    pub fn hash_key(self) -> u64 {
        let hx = self.x.wrapping_mul(PRIME_X);
        let hy = self.y.wrapping_mul(PRIME_Y);
        let hz = self.z.wrapping_mul(PRIME_Z);
        (hx ^ hy ^ hz) as u64
    }

    fn within(self, min: Self, max: Self) -> bool {
        (min.x..=max.x).contains(&self.x)
            && (min.y..=max.y).contains(&self.y)
            && (min.z..=max.z).contains(&self.z)
    }
}

/// Spatial hash over a uniform grid of cubic cells.
///
/// Buckets are created lazily and kept once empty. Each entry remembers its
/// exact cell so that hash collisions never leak into query results.
#[derive(Debug, Clone)]
pub struct GridHash {
    cell_size: f32,
    buckets: HashMap<u64, Vec<(EntityId, CellCoord)>>,
    entry_count: usize,
}

impl Default for GridHash {
    fn default() -> Self {
        Self {
            cell_size: 50.0,
            buckets: HashMap::new(),
            entry_count: 0,
        }
    }
}

impl GridHash {
    /// Create a grid with cubic cells of edge `cell_size`
    pub fn new(cell_size: f32) -> Result<Self, SpatialError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(SpatialError::InvalidCellSize(cell_size));
        }
        Ok(Self {
            cell_size,
            ..Self::default()
        })
    }

    /// Cell edge length
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Cell containing `position`
    pub fn cell_of(&self, position: &Vec3) -> CellCoord {
        let quantize = |v: f32| (v / self.cell_size).floor() as i64;
        CellCoord {
            x: quantize(position.x),
            y: quantize(position.y),
            z: quantize(position.z),
        }
    }

    /// Number of allocated buckets, including empty ones
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn insert_at(&mut self, entity: EntityId, cell: CellCoord) {
        let bucket = self.buckets.entry(cell.hash_key()).or_default();
        if !bucket.contains(&(entity, cell)) {
            bucket.push((entity, cell));
            self.entry_count += 1;
        }
    }

    fn remove_at(&mut self, entity: EntityId, cell: CellCoord) {
        if let Some(bucket) = self.buckets.get_mut(&cell.hash_key()) {
            let before = bucket.len();
            bucket.retain(|entry| *entry != (entity, cell));
            self.entry_count -= before - bucket.len();
        }
    }

    fn query_cells(&self, min: CellCoord, max: CellCoord) -> Vec<EntityId> {
        let span = |lo: i64, hi: i64| (i128::from(hi) - i128::from(lo) + 1).max(0);
        let cells = span(min.x, max.x)
            .saturating_mul(span(min.y, max.y))
            .saturating_mul(span(min.z, max.z));

        let mut found = BTreeSet::new();
        if cells > self.buckets.len() as i128 {
            // Range is wider than the populated grid; walk the buckets instead
            for bucket in self.buckets.values() {
                found.extend(
                    bucket
                        .iter()
                        .filter(|(_, cell)| cell.within(min, max))
                        .map(|(entity, _)| *entity),
                );
            }
        } else {
            for x in min.x..=max.x {
                for y in min.y..=max.y {
                    for z in min.z..=max.z {
                        let cell = CellCoord { x, y, z };
                        if let Some(bucket) = self.buckets.get(&cell.hash_key()) {
                            found.extend(
                                bucket
                                    .iter()
                                    .filter(|(_, c)| *c == cell)
                                    .map(|(entity, _)| *entity),
                            );
                        }
                    }
                }
            }
        }
        found.into_iter().collect()
    }
}

impl SpatialIndex for GridHash {
    fn insert(&mut self, entity: EntityId, position: Vec3) {
        let cell = self.cell_of(&position);
        self.insert_at(entity, cell);
    }

    fn remove(&mut self, entity: EntityId, position: Vec3) {
        let cell = self.cell_of(&position);
        self.remove_at(entity, cell);
    }

    fn update(&mut self, entity: EntityId, old_position: Vec3, new_position: Vec3) {
        let old_cell = self.cell_of(&old_position);
        let new_cell = self.cell_of(&new_position);
        if old_cell != new_cell {
            self.remove_at(entity, old_cell);
            self.insert_at(entity, new_cell);
        }
    }

    fn query_sphere(&self, center: Vec3, radius: f32) -> Vec<EntityId> {
        let reach = Vec3::repeat(radius.max(0.0));
        self.query_cells(self.cell_of(&(center - reach)), self.cell_of(&(center + reach)))
    }

    fn query_aabb(&self, aabb: &Aabb) -> Vec<EntityId> {
        self.query_cells(self.cell_of(&aabb.min), self.cell_of(&aabb.max))
    }

    fn clear(&mut self) {
        self.buckets.clear();
        self.entry_count = 0;
    }

    fn len(&self) -> usize {
        self.entry_count
    }
}
