//! Selection overlay: the accent border around the selection group and its
//! four corner handles.
//!
//! Handle sizes are given in screen pixels and divided by the current zoom,
//! so the touch targets stay the same size on screen at any zoom level.
//! The overlay never owns the selection; the canvas surface pushes new
//! bounds through [`SelectionOverlay::update_bounds`] after every change.

use kurbo::{Circle, Point, Rect};
use mb_core::config::CanvasSettings;
use mb_core::geometry::Corner;

/// Pointer shape to show while hovering a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeCursor {
    /// `↘` for top-left / bottom-right.
    ForwardDiagonal,
    /// `↗` for top-right / bottom-left.
    BackwardDiagonal,
}

#[derive(Debug, Clone)]
pub struct SelectionOverlay {
    bounds: Option<Rect>,
    zoom: f64,
    handle_radius: f64,
    border_width: f64,
}

impl SelectionOverlay {
    pub fn new(settings: &CanvasSettings) -> Self {
        Self {
            bounds: None,
            zoom: 1.0,
            handle_radius: settings.handle_radius,
            border_width: settings.overlay_border_width,
        }
    }

    /// Set the group bounds (scene space) and the zoom they are shown at.
    /// `None` hides the overlay.
    pub fn update_bounds(&mut self, bounds: Option<Rect>, zoom: f64) {
        self.bounds = bounds;
        if zoom > 0.0 {
            self.zoom = zoom;
        }
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom > 0.0 {
            self.zoom = zoom;
        }
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn is_visible(&self) -> bool {
        self.bounds.is_some()
    }

    /// Handle radius in scene units at the current zoom.
    pub fn handle_radius(&self) -> f64 {
        self.handle_radius / self.zoom
    }

    pub fn border_width(&self) -> f64 {
        self.border_width / self.zoom
    }

    /// Hit rectangle of one handle: a square of side `2r` centred on the
    /// corner.
    pub fn handle_rect(&self, corner: Corner) -> Option<Rect> {
        let bounds = self.bounds?;
        let r = self.handle_radius();
        Some(Rect::from_center_size(
            corner.point_on(bounds),
            (r * 2.0, r * 2.0),
        ))
    }

    /// The painted corner dots.
    pub fn handle_dots(&self) -> Vec<Circle> {
        let Some(bounds) = self.bounds else {
            return Vec::new();
        };
        let r = self.handle_radius();
        Corner::HANDLES
            .iter()
            .map(|c| Circle::new(c.point_on(bounds), r))
            .collect()
    }

    /// Which handle, if any, a press at `pt` grabs.
    ///
    /// With shift held the left handles become `LeftCenter` and the right
    /// handles become `Center`, so the drag scales about the group centre.
    pub fn hit_test(&self, pt: Point, shift: bool) -> Option<Corner> {
        let corner = Corner::HANDLES
            .into_iter()
            .find(|c| self.handle_rect(*c).is_some_and(|r| r.contains(pt)))?;
        Some(if shift { corner.symmetric() } else { corner })
    }

    pub fn cursor_at(&self, pt: Point) -> Option<ResizeCursor> {
        match self.hit_test(pt, false)? {
            Corner::TopLeft | Corner::BottomRight => Some(ResizeCursor::ForwardDiagonal),
            _ => Some(ResizeCursor::BackwardDiagonal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn overlay(zoom: f64) -> SelectionOverlay {
        let mut o = SelectionOverlay::new(&CanvasSettings::default());
        o.update_bounds(Some(Rect::new(0.0, 0.0, 200.0, 100.0)), zoom);
        o
    }

    #[test]
    fn hidden_without_bounds() {
        let mut o = overlay(1.0);
        o.update_bounds(None, 1.0);
        assert!(!o.is_visible());
        assert_eq!(o.hit_test(Point::new(0.0, 0.0), false), None);
        assert!(o.handle_dots().is_empty());
    }

    #[test]
    fn corners_hit_literally() {
        let o = overlay(1.0);
        assert_eq!(o.hit_test(Point::new(1.0, 1.0), false), Some(Corner::TopLeft));
        assert_eq!(o.hit_test(Point::new(199.0, -2.0), false), Some(Corner::TopRight));
        assert_eq!(o.hit_test(Point::new(3.0, 103.0), false), Some(Corner::BottomLeft));
        assert_eq!(o.hit_test(Point::new(200.0, 100.0), false), Some(Corner::BottomRight));
        assert_eq!(o.hit_test(Point::new(100.0, 50.0), false), None);
    }

    #[test]
    fn shift_maps_to_symmetric_corners() {
        let o = overlay(1.0);
        assert_eq!(o.hit_test(Point::new(0.0, 0.0), true), Some(Corner::LeftCenter));
        assert_eq!(o.hit_test(Point::new(0.0, 100.0), true), Some(Corner::LeftCenter));
        assert_eq!(o.hit_test(Point::new(200.0, 0.0), true), Some(Corner::Center));
        assert_eq!(o.hit_test(Point::new(200.0, 100.0), true), Some(Corner::Center));
    }

    #[test]
    fn handles_keep_screen_size() {
        // At 4x zoom a handle is 1 scene unit in radius.
        let o = overlay(4.0);
        assert_eq!(o.handle_radius(), 1.0);
        assert_eq!(o.border_width(), 0.5);
        assert_eq!(o.hit_test(Point::new(2.0, 2.0), false), None);
        assert_eq!(o.hit_test(Point::new(0.5, 0.5), false), Some(Corner::TopLeft));

        // Zoomed out, the same screen distance reaches further.
        let far = overlay(0.5);
        assert_eq!(far.hit_test(Point::new(7.0, 7.0), false), Some(Corner::TopLeft));
    }

    #[test]
    fn hover_cursor_by_diagonal() {
        let o = overlay(1.0);
        assert_eq!(o.cursor_at(Point::new(0.0, 0.0)), Some(ResizeCursor::ForwardDiagonal));
        assert_eq!(o.cursor_at(Point::new(0.0, 100.0)), Some(ResizeCursor::BackwardDiagonal));
        assert_eq!(o.cursor_at(Point::new(50.0, 50.0)), None);
    }
}
