//! Geometry aliases over `euclid`.
//!
//! World space and layout space share these types; which space a value lives in is a property of
//! the field holding it (`left`/`top` versus `layout_x`/`layout_y`), not of the type.

pub type Point = euclid::default::Point2D<f64>;
pub type Vector = euclid::default::Vector2D<f64>;
pub type Size = euclid::default::Size2D<f64>;
pub type Rect = euclid::default::Rect<f64>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn size(width: f64, height: f64) -> Size {
    euclid::size2(width, height)
}

/// Rectangle from a top-left corner and a size.
pub fn rect(left: f64, top: f64, width: f64, height: f64) -> Rect {
    euclid::rect(left, top, width, height)
}
