use crate::{
    broad::SpatialGrid,
    collider::{Collider, ColliderDesc, ColliderId},
    narrow::{
        swept::{aabb_sweep, penetration, Hit},
        Aabb, Color,
    },
    Fp, Result, Vec2,
};
use fnv::FnvBuildHasher;
use indexmap::IndexMap;
use tracing::{debug, trace};

/// Slide sub-steps per collider per frame, i.e. how many surfaces one move can
/// deflect off before the remainder is dropped.
pub const MAX_SLIDE_ITERATIONS: usize = 3;

/// Renderer seam used by `World::draw`.
pub trait DebugDraw {
    fn draw_rect(&mut self, rect: Aabb, color: Color);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldConfig {
    /// Edge length of a grid cell in world units.
    pub cell_size: Fp,
    /// Number of colliders to reserve room for.
    pub capacity: usize,
}
impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig { cell_size: 32.0, capacity: 0 }
    }
}

/// Owns every collider and the broadphase grid, and steps them once per frame.
pub struct World {
    colliders: IndexMap<ColliderId, Collider, FnvBuildHasher>,
    grid: SpatialGrid,
    cursor: u64,
}

impl World {
    pub fn new(cell_size: Fp, capacity: usize) -> Result<World> {
        World::with_config(WorldConfig { cell_size, capacity })
    }
    pub fn with_config(config: WorldConfig) -> Result<World> {
        let grid = SpatialGrid::new(config.cell_size)?;
        debug!(cell_size = config.cell_size, capacity = config.capacity, "world created");
        Ok(World {
            colliders: IndexMap::with_capacity_and_hasher(config.capacity, FnvBuildHasher::default()),
            grid,
            cursor: 0,
        })
    }

    // ---------- Colliders ---------- //

    pub fn add_collider(&mut self, desc: ColliderDesc) -> ColliderId {
        //! Registers a collider and inserts it into the grid.
        let id = ColliderId(self.cursor);
        self.cursor += 1;

        let collider = desc.build(id);
        debug!(id = id.0, is_static = collider.is_static, tag = %collider.tag, "collider added");
        self.grid.insert(id, &collider.rect, collider.is_static);
        self.colliders.insert(id, collider);
        id
    }

    pub fn remove_collider(&mut self, id: ColliderId) -> Option<Collider> {
        //! Unregisters a collider, returning it. The last collider takes its place in
        //! iteration order.
        let collider = self.colliders.swap_remove(&id)?;
        if collider.is_static {
            self.grid.remove_static(id, &collider.rect);
        } else {
            // dynamic buckets still name the id until the next rebuild; lookups skip it
            self.grid.forget(id);
        }
        debug!(id = id.0, is_static = collider.is_static, tag = %collider.tag, "collider removed");
        Some(collider)
    }

    #[inline]
    pub fn get(&self, id: ColliderId) -> Option<&Collider> {
        self.colliders.get(&id)
    }
    #[inline]
    pub fn get_mut(&mut self, id: ColliderId) -> Option<&mut Collider> {
        self.colliders.get_mut(&id)
    }
    #[inline]
    pub fn contains(&self, id: ColliderId) -> bool {
        self.colliders.contains_key(&id)
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.colliders.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &Collider> {
        //! Colliders in processing order.
        self.colliders.values()
    }
    #[inline]
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    // ---------- Frame ---------- //

    pub fn update(&mut self, dt: Fp) {
        //! Rebuilds the dynamic grid from this frame's starting boxes, then resolves every
        //! dynamic collider in order. Later colliders see earlier ones' moved boxes, but
        //! find them through the cells they started the frame in.
        self.grid.clear_dynamic();
        for collider in self.colliders.values_mut() {
            if !collider.is_static {
                collider.refresh_rect();
                self.grid.insert(collider.id, &collider.rect, false);
            }
        }

        for index in 0..self.colliders.len() {
            self.resolve(index, dt);
        }
    }

    pub fn update_collider(&mut self, id: ColliderId, dt: Fp) {
        //! Steps a single collider outside of `update`.
        match self.colliders.get_full(&id).map(|(index, _, _)| index) {
            Some(index) => self.resolve(index, dt),
            None => trace!(id = id.0, "update of unknown collider ignored"),
        }
    }

    pub fn draw<D: DebugDraw>(&self, renderer: &mut D) {
        for collider in self.colliders.values() {
            renderer.draw_rect(collider.rect, collider.debug_color);
        }
    }

    // ---------- Resolution ---------- //

    fn resolve(&mut self, index: usize, dt: Fp) {
        //! A zero `dt` leaves the collider untouched, starting overlaps included.
        if dt == 0.0 {
            return;
        }
        let vel = match self.colliders.get_index_mut(index) {
            Some((_, c)) if !c.is_static => match (c.position.get(), c.velocity.get()) {
                (Some(_), Some(vel)) => {
                    c.refresh_rect();
                    vel
                }
                _ => {
                    trace!(id = c.id.0, "collider without position or velocity skipped");
                    return;
                }
            },
            _ => return,
        };

        self.separate(index);
        self.sweep(index, vel * dt);
    }

    fn separate(&mut self, index: usize) {
        //! Pushes the collider out of anything it starts the frame inside of, one minimum
        //! translation per overlapping candidate.
        let rect = match self.colliders.get_index(index) {
            Some((_, c)) => c.rect,
            None => return,
        };

        for other in self.grid.query(&rect) {
            let push = match (self.colliders.get_index(index), self.colliders.get(&other)) {
                (Some((_, me)), Some(them)) if me.blocks(them) => penetration(&me.rect, &them.rect),
                _ => None,
            };
            if let (Some(push), Some((_, me))) = (push, self.colliders.get_index_mut(index)) {
                trace!(id = me.id.0, other = other.0, x = push.x, y = push.y, "overlap resolved");
                me.translate(push);
            }
        }
    }

    fn sweep(&mut self, index: usize, mut displacement: Vec2) {
        //! Moves the collider by `displacement`, stopping at the earliest contact and
        //! sliding the remainder along the struck face.
        let mut remaining: Fp = 1.0;

        for _ in 0..MAX_SLIDE_ITERATIONS {
            let me = match self.colliders.get_index(index) {
                Some((_, c)) => c,
                None => return,
            };
            let rect = me.rect;

            let mut earliest: Option<Hit> = None;
            let mut earliest_time: Fp = 1.0;
            for other in self.grid.query(&rect.broaden(displacement)) {
                let them = match self.colliders.get(&other) {
                    Some(c) => c,
                    None => continue,
                };
                if !me.blocks(them) {
                    continue;
                }
                if let Some(hit) = aabb_sweep(&rect, &them.rect, displacement) {
                    if hit.time < earliest_time {
                        trace!(
                            id = me.id.0,
                            other = other.0,
                            time = hit.time,
                            nx = hit.normal.x,
                            ny = hit.normal.y,
                            "swept contact"
                        );
                        earliest_time = hit.time;
                        earliest = Some(hit);
                        me.notify(them);
                        them.notify(me);
                    }
                }
            }

            let me = match self.colliders.get_index_mut(index) {
                Some((_, c)) => c,
                None => return,
            };
            me.translate(displacement * earliest_time);

            let hit = match earliest {
                Some(hit) => hit,
                None => return,
            };

            // velocity into the struck face is discarded
            if let Some(mut vel) = me.velocity.get() {
                if hit.normal.x != 0.0 {
                    vel.x = 0.0;
                }
                if hit.normal.y != 0.0 {
                    vel.y = 0.0;
                }
                me.velocity.set(vel);
            }

            remaining -= hit.time;
            if remaining <= 0.0 {
                return;
            }
            displacement = (displacement - hit.normal * displacement.dot(hit.normal)) * remaining;
        }
    }
}

impl Drop for World {
    fn drop(&mut self) {
        debug!(colliders = self.colliders.len(), "world destroyed");
    }
}
