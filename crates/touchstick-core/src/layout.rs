//! Geometry the presentation layer needs to lay out the track and handle.

use kurbo::{Point, Rect, Size};

use crate::config::JoystickConfig;
use crate::constraint::ShapeConstraint;

/// Top-left corner of a box of `size` centered on `center`.
pub fn top_left_from_center(center: Point, size: Size) -> Point {
    Point::new(center.x - size.width / 2.0, center.y - size.height / 2.0)
}

/// Bounds of the background track, padded so the handle never overhangs it.
///
/// Circular tracks are the square around a circle of radius
/// `length + max(handle) / 2`. Linear tracks are a bar spanning
/// `2 * length` along the free axis plus one handle extent.
pub fn background_bounds(config: &JoystickConfig) -> Rect {
    let handle = config.handle_size();
    let center = config.neutral_point();
    let size = match config.constraint() {
        ShapeConstraint::Circular { radius } => {
            let diameter = 2.0 * radius + handle.width.max(handle.height);
            Size::new(diameter, diameter)
        }
        ShapeConstraint::Vertical { length } => {
            Size::new(handle.width, 2.0 * length + handle.height)
        }
        ShapeConstraint::Horizontal { length } => {
            Size::new(2.0 * length + handle.width, handle.height)
        }
    };
    Rect::from_origin_size(top_left_from_center(center, size), size)
}
