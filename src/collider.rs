use crate::{
    narrow::{Aabb, Color, Pivot},
    Vec2,
};
use std::{
    cell::Cell,
    fmt::{Debug, Formatter},
    ops::{BitAnd, BitOr, BitOrAssign},
    rc::{Rc, Weak},
};

/// Unique collider handle. Ids are handed out in creation order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColliderId(pub u64);

/// Opaque caller key echoed back through `Collider::user_key`.
pub type UserKey = u64;

/// Invoked on both participants, `(self, other)`, when a swept contact becomes the
/// earliest one found in a sub-step.
pub type CollisionCallback = Box<dyn Fn(&Collider, &Collider)>;

// ---------- Layers ---------- //

/// Fixed-capacity collision layer bitset, one bit per layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layers(pub u32);
impl Layers {
    pub const NONE: Layers = Layers(0);
    pub const DEFAULT: Layers = Layers(1);
    pub const ALL: Layers = Layers(u32::MAX);

    #[inline]
    pub fn layer(index: u32) -> Layers {
        //! Returns the set holding only layer `index`, or the empty set if `index >= 32`.
        Layers(1u32.checked_shl(index).unwrap_or(0))
    }
    #[inline]
    pub fn intersects(self, other: Layers) -> bool {
        self.0 & other.0 != 0
    }
    #[inline]
    pub fn contains(self, other: Layers) -> bool {
        self.0 & other.0 == other.0
    }
}
impl Default for Layers {
    fn default() -> Self {
        Layers::DEFAULT
    }
}
impl BitOr for Layers {
    type Output = Layers;
    fn bitor(self, rhs: Layers) -> Layers {
        Layers(self.0 | rhs.0)
    }
}
impl BitOrAssign for Layers {
    fn bitor_assign(&mut self, rhs: Layers) {
        self.0 |= rhs.0;
    }
}
impl BitAnd for Layers {
    type Output = Layers;
    fn bitand(self, rhs: Layers) -> Layers {
        Layers(self.0 & rhs.0)
    }
}

// ---------- Binding ---------- //

/// Storage for a collider's position or velocity.
///
/// `Owned` values live in the collider. `Shared` values alias a caller's cell so the
/// engine writes straight into game state; once the caller drops every strong
/// reference the binding reads as missing and the collider stops moving.
#[derive(Debug, Clone)]
pub enum Binding {
    Owned(Vec2),
    Shared(Weak<Cell<Vec2>>),
}
impl Binding {
    #[inline]
    pub fn shared(cell: &Rc<Cell<Vec2>>) -> Binding {
        Binding::Shared(Rc::downgrade(cell))
    }

    #[inline]
    pub fn get(&self) -> Option<Vec2> {
        match self {
            Binding::Owned(v) => Some(*v),
            Binding::Shared(w) => w.upgrade().map(|c| c.get()),
        }
    }
    #[inline]
    pub fn set(&mut self, value: Vec2) -> bool {
        //! Returns `false` if the binding is a shared cell that no longer exists.
        match self {
            Binding::Owned(v) => {
                *v = value;
                true
            }
            Binding::Shared(w) => match w.upgrade() {
                Some(c) => {
                    c.set(value);
                    true
                }
                None => false,
            },
        }
    }

    #[inline]
    pub fn is_bound(&self) -> bool {
        match self {
            Binding::Owned(_) => true,
            Binding::Shared(w) => w.strong_count() > 0,
        }
    }
}
impl Default for Binding {
    fn default() -> Self {
        Binding::Owned(Vec2::ZERO)
    }
}

// ---------- Collider ---------- //

pub struct Collider {
    pub(crate) id: ColliderId,
    pub(crate) rect: Aabb,
    pub(crate) size: Vec2,
    pub(crate) offset: Vec2,
    pub(crate) pivot: Pivot,
    pub(crate) tag: String,
    pub(crate) layer: Layers,
    pub(crate) mask: Layers,
    pub(crate) is_static: bool,
    pub(crate) is_trigger: bool,
    pub(crate) user_key: Option<UserKey>,
    pub(crate) debug_color: Color,
    pub(crate) position: Binding,
    pub(crate) velocity: Binding,
    pub(crate) on_collision_enter: Option<CollisionCallback>,
}

impl Collider {
    #[inline]
    pub fn id(&self) -> ColliderId {
        self.id
    }
    /// World-space box, kept in step with the position.
    #[inline]
    pub fn rect(&self) -> Aabb {
        self.rect
    }
    #[inline]
    pub fn size(&self) -> Vec2 {
        self.size
    }
    #[inline]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }
    #[inline]
    pub fn pivot(&self) -> Pivot {
        self.pivot
    }
    #[inline]
    pub fn tag(&self) -> &str {
        &self.tag
    }
    #[inline]
    pub fn layer(&self) -> Layers {
        self.layer
    }
    #[inline]
    pub fn mask(&self) -> Layers {
        self.mask
    }
    #[inline]
    pub fn is_static(&self) -> bool {
        self.is_static
    }
    #[inline]
    pub fn is_trigger(&self) -> bool {
        self.is_trigger
    }
    #[inline]
    pub fn user_key(&self) -> Option<UserKey> {
        self.user_key
    }
    #[inline]
    pub fn debug_color(&self) -> Color {
        self.debug_color
    }
    #[inline]
    pub fn position(&self) -> Option<Vec2> {
        self.position.get()
    }
    #[inline]
    pub fn velocity(&self) -> Option<Vec2> {
        self.velocity.get()
    }

    pub fn set_layer(&mut self, layer: Layers) {
        self.layer = layer;
    }
    pub fn set_mask(&mut self, mask: Layers) {
        self.mask = mask;
    }
    pub fn set_trigger(&mut self, is_trigger: bool) {
        self.is_trigger = is_trigger;
    }
    pub fn set_debug_color(&mut self, color: Color) {
        self.debug_color = color;
    }
    pub fn set_velocity(&mut self, vel: Vec2) -> bool {
        self.velocity.set(vel)
    }
    pub fn set_position(&mut self, pos: Vec2) -> bool {
        //! Teleports a dynamic collider. Static colliders are fixed in the grid and refuse.
        if self.is_static || !self.position.set(pos) {
            return false;
        }
        self.refresh_rect();
        true
    }

    #[inline]
    pub fn accepts(&self, other: &Collider) -> bool {
        //! Whether the pair passes layer filtering in both directions.
        self.mask.intersects(other.layer) && other.mask.intersects(self.layer)
    }
    #[inline]
    pub(crate) fn blocks(&self, other: &Collider) -> bool {
        //! Whether `other` takes part in resolving `self`'s motion.
        other.id != self.id && !other.is_trigger && self.accepts(other)
    }

    pub(crate) fn refresh_rect(&mut self) {
        //! Rebuilds the cached box from the position binding, if it is still bound.
        if let Some(pos) = self.position.get() {
            self.rect = Aabb::from_pivot(pos + self.offset, self.size, self.pivot);
        }
    }
    pub(crate) fn translate(&mut self, offset: Vec2) {
        //! Moves the position and the cached box together.
        if let Some(pos) = self.position.get() {
            self.position.set(pos + offset);
        }
        self.rect = self.rect.translate(offset);
    }

    #[inline]
    pub(crate) fn notify(&self, other: &Collider) {
        if let Some(cb) = &self.on_collision_enter {
            cb(self, other);
        }
    }
}

impl Debug for Collider {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_struct("Collider")
            .field("id", &self.id)
            .field("tag", &self.tag)
            .field("rect", &self.rect)
            .field("layer", &self.layer)
            .field("mask", &self.mask)
            .field("is_static", &self.is_static)
            .field("is_trigger", &self.is_trigger)
            .field("position", &self.position)
            .field("velocity", &self.velocity)
            .field("user_key", &self.user_key)
            .field("on_collision_enter", &self.on_collision_enter.is_some())
            .finish()
    }
}

// ---------- ColliderDesc ---------- //

/// Builder for `World::add_collider`.
///
/// Position and velocity are each either an owned value (`position`, `velocity`) or
/// a caller cell the engine writes through (`shared_position`, `shared_velocity`),
/// giving the four creation variants.
pub struct ColliderDesc {
    position: Binding,
    velocity: Binding,
    size: Vec2,
    offset: Vec2,
    pivot: Pivot,
    tag: String,
    layer: Layers,
    mask: Layers,
    is_trigger: bool,
    is_static: bool,
    user_key: Option<UserKey>,
    debug_color: Color,
    on_collision_enter: Option<CollisionCallback>,
}

impl ColliderDesc {
    pub fn new() -> ColliderDesc {
        ColliderDesc {
            position: Binding::default(),
            velocity: Binding::default(),
            size: Vec2::ZERO,
            offset: Vec2::ZERO,
            pivot: Pivot::default(),
            tag: String::from("Default"),
            layer: Layers::DEFAULT,
            mask: Layers::DEFAULT,
            is_trigger: false,
            is_static: false,
            user_key: None,
            debug_color: Color::WHITE,
            on_collision_enter: None,
        }
    }

    pub fn position(mut self, position: Vec2) -> Self {
        self.position = Binding::Owned(position);
        self
    }
    pub fn shared_position(mut self, position: &Rc<Cell<Vec2>>) -> Self {
        self.position = Binding::shared(position);
        self
    }
    pub fn velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = Binding::Owned(velocity);
        self
    }
    pub fn shared_velocity(mut self, velocity: &Rc<Cell<Vec2>>) -> Self {
        self.velocity = Binding::shared(velocity);
        self
    }
    pub fn size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }
    pub fn offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }
    pub fn pivot(mut self, pivot: Pivot) -> Self {
        self.pivot = pivot;
        self
    }
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }
    pub fn layer(mut self, layer: Layers) -> Self {
        self.layer = layer;
        self
    }
    pub fn mask(mut self, mask: Layers) -> Self {
        self.mask = mask;
        self
    }
    pub fn trigger(mut self, is_trigger: bool) -> Self {
        self.is_trigger = is_trigger;
        self
    }
    /// Static colliders never move and are registered in the grid once.
    pub fn fixed(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }
    pub fn user_key(mut self, key: UserKey) -> Self {
        self.user_key = Some(key);
        self
    }
    pub fn debug_color(mut self, color: Color) -> Self {
        self.debug_color = color;
        self
    }
    pub fn on_collision_enter<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Collider, &Collider) + 'static,
    {
        self.on_collision_enter = Some(Box::new(callback));
        self
    }

    pub(crate) fn build(self, id: ColliderId) -> Collider {
        let mut collider = Collider {
            id,
            rect: Aabb::from_pivot(self.offset, self.size, self.pivot),
            size: self.size,
            offset: self.offset,
            pivot: self.pivot,
            tag: self.tag,
            layer: self.layer,
            mask: self.mask,
            is_static: self.is_static,
            is_trigger: self.is_trigger,
            user_key: self.user_key,
            debug_color: self.debug_color,
            position: self.position,
            velocity: self.velocity,
            on_collision_enter: self.on_collision_enter,
        };
        collider.refresh_rect();
        collider
    }
}
impl Default for ColliderDesc {
    fn default() -> Self {
        ColliderDesc::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn layer_filtering() {
        let a = ColliderDesc::new().layer(Layers::layer(1)).mask(Layers::layer(2)).build(ColliderId(0));
        let b = ColliderDesc::new().layer(Layers::layer(2)).mask(Layers::layer(1)).build(ColliderId(1));
        let c = ColliderDesc::new().layer(Layers::layer(2)).mask(Layers::layer(3)).build(ColliderId(2));

        assert_eq!(a.accepts(&b), true);
        assert_eq!(b.accepts(&a), true);
        // a wants c, c does not want a
        assert_eq!(a.accepts(&c), false);
        assert_eq!(c.accepts(&a), false);

        assert_eq!(Layers::layer(40), Layers::NONE);
        assert_eq!(Layers::layer(0), Layers::DEFAULT);
        assert!((Layers::layer(3) | Layers::layer(5)).contains(Layers::layer(5)));
        assert!(!(Layers::layer(3) & Layers::layer(5)).intersects(Layers::ALL));
    }

    #[test]
    fn triggers_and_self_do_not_block() {
        let a = ColliderDesc::new().build(ColliderId(0));
        let t = ColliderDesc::new().trigger(true).build(ColliderId(1));
        let b = ColliderDesc::new().build(ColliderId(2));

        assert_eq!(a.blocks(&a), false);
        assert_eq!(a.blocks(&t), false);
        assert_eq!(a.blocks(&b), true);
    }

    #[test]
    fn defaults() {
        let c = ColliderDesc::new().build(ColliderId(9));
        assert_eq!(c.tag(), "Default");
        assert_eq!(c.layer(), Layers::DEFAULT);
        assert_eq!(c.mask(), Layers::DEFAULT);
        assert_eq!(c.debug_color(), Color::WHITE);
        assert_eq!(c.is_static(), false);
        assert_eq!(c.is_trigger(), false);
        assert_eq!(c.position(), Some(Vec2::ZERO));
        assert_eq!(c.velocity(), Some(Vec2::ZERO));
        assert_eq!(c.rect(), Aabb::new(0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn rect_follows_offset_and_pivot() {
        let c = ColliderDesc::new()
            .position(Vec2::new(4.0, 4.0))
            .offset(Vec2::new(1.0, -1.0))
            .size(Vec2::new(2.0, 2.0))
            .pivot(Pivot::Center)
            .build(ColliderId(0));
        assert_eq!(c.rect(), Aabb::new(4.0, 2.0, 6.0, 4.0));
    }

    #[test]
    fn shared_bindings_write_through() {
        let pos = Rc::new(Cell::new(Vec2::new(1.0, 2.0)));
        let vel = Rc::new(Cell::new(Vec2::new(3.0, 0.0)));
        let mut c = ColliderDesc::new()
            .shared_position(&pos)
            .shared_velocity(&vel)
            .size(Vec2::new(1.0, 1.0))
            .pivot(Pivot::BottomLeft)
            .build(ColliderId(0));

        c.translate(Vec2::new(0.5, 0.0));
        assert_eq!(pos.get(), Vec2::new(1.5, 2.0));
        assert_eq!(c.rect(), Aabb::new(1.5, 2.0, 2.5, 3.0));

        assert!(c.set_velocity(Vec2::ZERO));
        assert_eq!(vel.get(), Vec2::ZERO);

        // caller teleports its own state; the rect catches up on refresh
        pos.set(Vec2::new(10.0, 10.0));
        c.refresh_rect();
        assert_eq!(c.rect(), Aabb::new(10.0, 10.0, 11.0, 11.0));

        drop(vel);
        assert_eq!(c.velocity(), None);
        assert_eq!(c.velocity.is_bound(), false);
        assert_eq!(c.set_velocity(Vec2::new(1.0, 1.0)), false);
    }

    #[test]
    fn static_colliders_refuse_teleport() {
        let mut c = ColliderDesc::new().fixed(true).build(ColliderId(0));
        assert_eq!(c.set_position(Vec2::new(5.0, 5.0)), false);
        assert_eq!(c.position(), Some(Vec2::ZERO));

        let mut d = ColliderDesc::new().size(Vec2::new(2.0, 2.0)).build(ColliderId(1));
        assert_eq!(d.set_position(Vec2::new(5.0, 5.0)), true);
        assert_eq!(d.rect(), Aabb::new(4.0, 4.0, 6.0, 6.0));
    }

    #[test]
    fn callback_sees_both_participants() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let a = ColliderDesc::new()
            .tag("player")
            .on_collision_enter(move |me, other| sink.borrow_mut().push((me.id(), other.tag().to_string())))
            .build(ColliderId(0));
        let b = ColliderDesc::new().tag("wall").build(ColliderId(1));

        a.notify(&b);
        b.notify(&a);
        assert_eq!(*log.borrow(), vec![(ColliderId(0), String::from("wall"))]);
    }
}
