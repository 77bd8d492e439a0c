use crate::{narrow::Aabb, Fp, Vec2};

/// Time of impact of a swept box against a fixed one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Fraction of the displacement travelled before contact, in `[0, 1]`.
    pub time: Fp,
    /// Axis-aligned unit normal of the struck face, pointing back toward the moving box.
    pub normal: Vec2,
    /// Center of the moving box at the moment of contact.
    pub position: Vec2,
}

// ---------- Sweep ---------- //

pub fn aabb_sweep(moving: &Aabb, fixed: &Aabb, vel: Vec2) -> Option<Hit> {
    //! Returns the earliest contact of `moving` displaced by `vel` against `fixed`.
    //!
    //! Boxes that already overlap at the start are rejected; penetration is resolved
    //! separately. Non-finite velocity components are not guarded and propagate
    //! through the division step.

    // distances between near and far edges, reversed by the sign of travel,
    // equivalent to sweeping a point against `fixed` inflated by `moving`
    let (dx_entry, dx_exit) = if vel.x > 0.0 {
        (fixed.min.x - moving.max.x, fixed.max.x - moving.min.x)
    } else {
        (fixed.max.x - moving.min.x, fixed.min.x - moving.max.x)
    };
    let (dy_entry, dy_exit) = if vel.y > 0.0 {
        (fixed.min.y - moving.max.y, fixed.max.y - moving.min.y)
    } else {
        (fixed.max.y - moving.min.y, fixed.min.y - moving.max.y)
    };

    let (tx_entry, tx_exit): (Fp, Fp);
    if vel.x == 0.0 {
        // no travel along x: either the boxes already share the x span or they never meet
        if !moving.overlaps_x(fixed) {
            return None;
        }
        tx_entry = Fp::NEG_INFINITY;
        tx_exit = Fp::INFINITY;
    } else {
        tx_entry = dx_entry / vel.x;
        tx_exit = dx_exit / vel.x;
    }
    let (ty_entry, ty_exit): (Fp, Fp);
    if vel.y == 0.0 {
        if !moving.overlaps_y(fixed) {
            return None;
        }
        ty_entry = Fp::NEG_INFINITY;
        ty_exit = Fp::INFINITY;
    } else {
        ty_entry = dy_entry / vel.y;
        ty_exit = dy_exit / vel.y;
    }

    let entry = Fp::max(tx_entry, ty_entry);
    let exit = Fp::min(tx_exit, ty_exit);

    if entry > exit || (tx_entry < 0.0 && ty_entry < 0.0) || entry > 1.0 {
        return None;
    }

    // the normal opposes travel on the contact axis, which is the axis entered last.
    // a negative entry distance only ever pairs with positive travel and vice versa,
    // using the velocity sign also settles exact touches where the distance is zero
    let normal = if tx_entry > ty_entry {
        if vel.x > 0.0 { Vec2::new(-1.0, 0.0) } else { Vec2::new(1.0, 0.0) }
    } else {
        if vel.y > 0.0 { Vec2::new(0.0, -1.0) } else { Vec2::new(0.0, 1.0) }
    };

    Some(Hit {
        time: entry,
        normal,
        position: moving.center() + vel * entry,
    })
}

// ---------- Penetration ---------- //

pub fn penetration(a: &Aabb, b: &Aabb) -> Option<Vec2> {
    //! Returns the minimum translation that pushes `a` out of `b` along a single axis,
    //! or `None` if the interiors do not overlap.
    //!
    //! The push follows the axis of least overlap, favouring x on ties, and is signed
    //! toward `a`'s side of `b`, positive when the centers coincide on that axis.
    let delta = a.center() - b.center();
    let span = a.half_extents() + b.half_extents();
    let ox = span.x - delta.x.abs();
    let oy = span.y - delta.y.abs();

    if ox <= 0.0 || oy <= 0.0 {
        return None;
    }

    #[inline]
    fn side(d: Fp) -> Fp {
        if d < 0.0 { -1.0 } else { 1.0 }
    }

    if ox <= oy {
        Some(Vec2::new(ox * side(delta.x), 0.0))
    } else {
        Some(Vec2::new(0.0, oy * side(delta.y)))
    }
}
