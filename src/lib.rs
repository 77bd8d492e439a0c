//! Frame-driven 2D continuous collision.
//!
//! A uniform spatial hash grid feeds candidate pairs to a swept AABB test, and a
//! bounded slide loop moves each dynamic collider the full requested distance
//! without tunneling. Colliders that begin a frame interpenetrating are first
//! pushed apart along the axis of least penetration.
//!
//! ```
//! use gridsweep::{ColliderDesc, Pivot, Vec2, World};
//!
//! let mut world = World::new(16.0, 8).unwrap();
//! world.add_collider(ColliderDesc::new()
//!     .position(Vec2::new(0.0, 0.0))
//!     .size(Vec2::new(10.0, 10.0))
//!     .pivot(Pivot::BottomLeft)
//!     .fixed(true));
//! let player = world.add_collider(ColliderDesc::new()
//!     .position(Vec2::new(-5.0, 4.0))
//!     .velocity(Vec2::new(100.0, 0.0))
//!     .size(Vec2::new(2.0, 2.0))
//!     .pivot(Pivot::BottomLeft));
//!
//! world.update(0.1);
//! // stopped flush against the wall's left face instead of tunneling into it
//! assert!(world.get(player).unwrap().rect().max.x.abs() < 1e-4);
//! ```

pub mod broad;
pub mod collider;
pub mod error;
pub mod narrow;
pub mod world;

#[cfg(not(feature = "f64"))]
pub type Fp = f32;
#[cfg(not(feature = "f64"))]
pub use glam::Vec2;

#[cfg(feature = "f64")]
pub type Fp = f64;
#[cfg(feature = "f64")]
pub use glam::DVec2 as Vec2;

pub use broad::SpatialGrid;
pub use collider::{Binding, Collider, ColliderDesc, ColliderId, Layers};
pub use error::{Error, Result};
pub use narrow::{swept::Hit, Aabb, Color, Pivot};
pub use world::{DebugDraw, World, WorldConfig, MAX_SLIDE_ITERATIONS};
