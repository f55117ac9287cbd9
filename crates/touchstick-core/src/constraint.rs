//! Constraint engine: clamps raw handle displacement to the joystick's track.

use kurbo::Vec2;
use serde::{Deserialize, Serialize};

/// Tolerance used when checking circular membership after a projection.
const RADIUS_EPSILON: f64 = 1e-9;

/// The shape of the track the handle moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoystickShape {
    /// Free movement inside a circle.
    Circular,
    /// Movement along the y axis only.
    Vertical,
    /// Movement along the x axis only.
    Horizontal,
}

impl JoystickShape {
    /// Derive the constraint for this shape with the given length.
    pub fn constraint(self, length: f64) -> ShapeConstraint {
        match self {
            JoystickShape::Circular => ShapeConstraint::Circular { radius: length },
            JoystickShape::Vertical => ShapeConstraint::Vertical { length },
            JoystickShape::Horizontal => ShapeConstraint::Horizontal { length },
        }
    }
}

/// Admissible region for the handle displacement, relative to the neutral point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapeConstraint {
    /// Displacement magnitude is at most `radius`.
    Circular { radius: f64 },
    /// `dx` is locked to 0, `dy` lies in `[-length, length]`.
    Vertical { length: f64 },
    /// `dy` is locked to 0, `dx` lies in `[-length, length]`.
    Horizontal { length: f64 },
}

impl ShapeConstraint {
    /// The shape this constraint was derived from.
    pub fn shape(&self) -> JoystickShape {
        match self {
            ShapeConstraint::Circular { .. } => JoystickShape::Circular,
            ShapeConstraint::Vertical { .. } => JoystickShape::Vertical,
            ShapeConstraint::Horizontal { .. } => JoystickShape::Horizontal,
        }
    }

    /// The radius or axis half-range.
    pub fn length(&self) -> f64 {
        match *self {
            ShapeConstraint::Circular { radius } => radius,
            ShapeConstraint::Vertical { length } | ShapeConstraint::Horizontal { length } => length,
        }
    }

    /// Admissible `dx` range. The circle reports its bounding range.
    pub fn x_range(&self) -> (f64, f64) {
        match *self {
            ShapeConstraint::Circular { radius } => (-radius, radius),
            ShapeConstraint::Vertical { .. } => (0.0, 0.0),
            ShapeConstraint::Horizontal { length } => (-length, length),
        }
    }

    /// Admissible `dy` range. The circle reports its bounding range.
    pub fn y_range(&self) -> (f64, f64) {
        match *self {
            ShapeConstraint::Circular { radius } => (-radius, radius),
            ShapeConstraint::Vertical { length } => (-length, length),
            ShapeConstraint::Horizontal { .. } => (0.0, 0.0),
        }
    }

    /// Check whether a displacement already lies inside the admissible region.
    pub fn admits(&self, v: Vec2) -> bool {
        match *self {
            ShapeConstraint::Circular { radius } => v.hypot() <= radius + RADIUS_EPSILON,
            ShapeConstraint::Vertical { length } => v.x == 0.0 && v.y.abs() <= length,
            ShapeConstraint::Horizontal { length } => v.y == 0.0 && v.x.abs() <= length,
        }
    }

    /// Clamp a raw displacement into the admissible region.
    pub fn clamp(&self, raw: Vec2) -> Vec2 {
        clamp(raw, *self)
    }
}

/// Clamp a raw displacement from the neutral point to the given constraint.
///
/// Circular constraints project out-of-range points back onto the circle
/// along the same direction. Linear constraints zero the locked axis and
/// truncate the free one. The function is total: non-finite input on the
/// circle collapses to the origin rather than propagating NaN.
pub fn clamp(raw: Vec2, constraint: ShapeConstraint) -> Vec2 {
    match constraint {
        ShapeConstraint::Circular { radius } => {
            let magnitude = raw.hypot();
            if magnitude == 0.0 || !magnitude.is_finite() {
                return Vec2::ZERO;
            }
            if magnitude > radius {
                raw * (radius / magnitude)
            } else {
                raw
            }
        }
        ShapeConstraint::Vertical { length } => Vec2::new(0.0, clamp_axis(raw.y, length)),
        ShapeConstraint::Horizontal { length } => Vec2::new(clamp_axis(raw.x, length), 0.0),
    }
}

fn clamp_axis(value: f64, length: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-length, length)
    }
}

/// Scale a displacement so the track boundary maps to magnitude 1.
pub fn normalize(v: Vec2, length: f64) -> Vec2 {
    Vec2::new(v.x / length, v.y / length)
}
