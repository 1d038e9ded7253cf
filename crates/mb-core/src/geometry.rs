//! Scene-space geometry helpers shared by the overlay and the selection group.

use kurbo::{Point, Rect, Vec2};
use std::fmt;
use std::str::FromStr;

use crate::error::CanvasError;

/// Which selection handle a scale gesture is driven by.
///
/// The four literal corners pivot around the opposite corner. `Center` and
/// `LeftCenter` are the symmetric pseudo-corners produced by a shift-drag on
/// a right or left handle; both pivot around the group's center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
    LeftCenter,
}

impl Corner {
    /// The four physical handles, in paint order.
    pub const HANDLES: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Corner::TopLeft => "topLeft",
            Corner::TopRight => "topRight",
            Corner::BottomLeft => "bottomLeft",
            Corner::BottomRight => "bottomRight",
            Corner::Center => "center",
            Corner::LeftCenter => "leftCenter",
        }
    }

    /// Where this handle sits on `rect`. Pseudo-corners sit at the center.
    pub fn point_on(&self, rect: Rect) -> Point {
        match self {
            Corner::TopLeft => Point::new(rect.x0, rect.y0),
            Corner::TopRight => Point::new(rect.x1, rect.y0),
            Corner::BottomLeft => Point::new(rect.x0, rect.y1),
            Corner::BottomRight => Point::new(rect.x1, rect.y1),
            Corner::Center | Corner::LeftCenter => rect.center(),
        }
    }

    /// The point that stays fixed while this handle is dragged.
    pub fn pivot_on(&self, rect: Rect) -> Point {
        match self {
            Corner::TopLeft => Corner::BottomRight.point_on(rect),
            Corner::TopRight => Corner::BottomLeft.point_on(rect),
            Corner::BottomLeft => Corner::TopRight.point_on(rect),
            Corner::BottomRight => Corner::TopLeft.point_on(rect),
            Corner::Center | Corner::LeftCenter => rect.center(),
        }
    }

    /// Pointer delta as seen by the width computation: negated for handles on
    /// the left edge, doubled for the symmetric pseudo-corners.
    pub fn signed_delta(&self, delta: Vec2) -> Vec2 {
        match self {
            Corner::TopLeft | Corner::BottomLeft => -delta,
            Corner::LeftCenter => -delta * 2.0,
            Corner::Center => delta * 2.0,
            Corner::TopRight | Corner::BottomRight => delta,
        }
    }

    /// Shift-modified hits map the left handles to `LeftCenter` and the right
    /// handles to `Center`.
    pub fn symmetric(&self) -> Corner {
        match self {
            Corner::TopLeft | Corner::BottomLeft | Corner::LeftCenter => Corner::LeftCenter,
            Corner::TopRight | Corner::BottomRight | Corner::Center => Corner::Center,
        }
    }
}

impl FromStr for Corner {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "topLeft" => Ok(Corner::TopLeft),
            "topRight" => Ok(Corner::TopRight),
            "bottomLeft" => Ok(Corner::BottomLeft),
            "bottomRight" => Ok(Corner::BottomRight),
            "center" => Ok(Corner::Center),
            "leftCenter" => Ok(Corner::LeftCenter),
            other => Err(CanvasError::NotFound {
                what: "corner",
                id: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rectangle spanned by two drag points, in either order.
pub fn normalized_rect(a: Point, b: Point) -> Rect {
    Rect::from_points(a, b).abs()
}

/// AABB overlap, edges inclusive so a degenerate band touching an item
/// still counts.
pub fn rects_intersect(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Union of a sequence of rects, `None` when empty.
pub fn union_all(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    rects.into_iter().reduce(|acc, r| acc.union(r))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pivots_are_opposite_corners() {
        let r = Rect::new(0.0, 0.0, 200.0, 100.0);
        assert_eq!(Corner::BottomRight.pivot_on(r), Point::new(0.0, 0.0));
        assert_eq!(Corner::TopLeft.pivot_on(r), Point::new(200.0, 100.0));
        assert_eq!(Corner::TopRight.pivot_on(r), Point::new(0.0, 100.0));
        assert_eq!(Corner::BottomLeft.pivot_on(r), Point::new(200.0, 0.0));
        assert_eq!(Corner::Center.pivot_on(r), Point::new(100.0, 50.0));
    }

    #[test]
    fn signed_delta_per_corner() {
        let d = Vec2::new(10.0, 4.0);
        assert_eq!(Corner::BottomRight.signed_delta(d), d);
        assert_eq!(Corner::BottomLeft.signed_delta(d), -d);
        assert_eq!(Corner::Center.signed_delta(d), Vec2::new(20.0, 8.0));
        assert_eq!(Corner::LeftCenter.signed_delta(d), Vec2::new(-20.0, -8.0));
    }

    #[test]
    fn names_roundtrip() {
        for corner in [
            Corner::TopLeft,
            Corner::TopRight,
            Corner::BottomLeft,
            Corner::BottomRight,
            Corner::Center,
            Corner::LeftCenter,
        ] {
            assert_eq!(corner.as_str().parse::<Corner>().unwrap(), corner);
        }
        assert!("middle".parse::<Corner>().is_err());
    }

    #[test]
    fn normalized_rect_any_direction() {
        let r = normalized_rect(Point::new(50.0, 10.0), Point::new(10.0, 40.0));
        assert_eq!(r, Rect::new(10.0, 10.0, 50.0, 40.0));
    }

    #[test]
    fn touching_rects_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rects_intersect(a, Rect::new(10.0, 10.0, 10.0, 10.0)));
        assert!(!rects_intersect(a, Rect::new(11.0, 0.0, 20.0, 10.0)));
    }
}
