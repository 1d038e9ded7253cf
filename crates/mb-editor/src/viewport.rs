//! Pan and zoom for the active tab.
//!
//! A scene point `p` appears in the view at `p * zoom - scroll`. Scroll
//! offsets are kept inside the scrollable range of the scene, like a pair of
//! scroll bars would.

use kurbo::{Point, Rect, Size, Vec2};
use mb_core::config::CanvasSettings;
use mb_core::model::ViewportState;

#[derive(Debug, Clone)]
pub struct Viewport {
    state: ViewportState,
    view_size: Size,
    scene_size: Size,
    zoom_min: f64,
    zoom_max: f64,
    zoom_step: f64,
}

impl Viewport {
    pub fn new(settings: &CanvasSettings, scene_size: Size) -> Self {
        Self {
            state: settings.default_viewport(),
            view_size: settings.view_size(),
            scene_size,
            zoom_min: settings.zoom_min,
            zoom_max: settings.zoom_max,
            zoom_step: settings.zoom_step,
        }
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    /// Restore a saved state. Zoom is clamped into range.
    pub fn restore(&mut self, state: ViewportState) {
        self.state = ViewportState {
            scroll: state.scroll,
            zoom: state.zoom.clamp(self.zoom_min, self.zoom_max),
        };
        self.clamp_scroll();
    }

    pub fn zoom(&self) -> f64 {
        self.state.zoom
    }

    pub fn scroll(&self) -> Vec2 {
        self.state.scroll
    }

    pub fn view_size(&self) -> Size {
        self.view_size
    }

    pub fn set_view_size(&mut self, size: Size) {
        self.view_size = size;
        self.clamp_scroll();
    }

    pub fn scene_to_screen(&self, scene: Point) -> Point {
        (scene.to_vec2() * self.state.zoom - self.state.scroll).to_point()
    }

    pub fn screen_to_scene(&self, screen: Point) -> Point {
        ((screen.to_vec2() + self.state.scroll) / self.state.zoom).to_point()
    }

    /// The part of the scene currently visible in the view.
    pub fn visible_scene_rect(&self) -> Rect {
        Rect::from_points(
            self.screen_to_scene(Point::ZERO),
            self.screen_to_scene(Point::new(self.view_size.width, self.view_size.height)),
        )
    }

    /// Move the view with the pointer: dragging right by `screen_delta`
    /// reveals content to the left.
    pub fn pan(&mut self, screen_delta: Vec2) {
        self.state.scroll -= screen_delta;
        self.clamp_scroll();
    }

    /// Zoom so the scene point under `anchor` (view pixels) stays under it.
    ///
    /// Out-of-range zooms are rejected and leave the view untouched.
    pub fn set_zoom(&mut self, zoom: f64, anchor: Point) -> bool {
        if !(zoom >= self.zoom_min && zoom <= self.zoom_max) {
            log::trace!("zoom {zoom} rejected, range [{}, {}]", self.zoom_min, self.zoom_max);
            return false;
        }
        let anchor_scene = self.screen_to_scene(anchor);
        self.state.zoom = zoom;
        self.state.scroll = anchor_scene.to_vec2() * zoom - anchor.to_vec2();
        self.clamp_scroll();
        true
    }

    /// One wheel notch or `+`/`-` press: scale by `1 ± step`.
    pub fn zoom_step(&mut self, zoom_in: bool, anchor: Point) -> bool {
        let factor = if zoom_in {
            1.0 + self.zoom_step
        } else {
            1.0 - self.zoom_step
        };
        self.set_zoom(self.state.zoom * factor, anchor)
    }

    /// Set an absolute zoom, clamped into range, anchored at the view
    /// centre. Returns the zoom actually applied.
    pub fn set_zoom_scale(&mut self, zoom: f64) -> f64 {
        let zoom = zoom.clamp(self.zoom_min, self.zoom_max);
        let centre = Point::new(self.view_size.width / 2.0, self.view_size.height / 2.0);
        self.set_zoom(zoom, centre);
        self.state.zoom
    }

    fn clamp_scroll(&mut self) {
        let max_x = (self.scene_size.width * self.state.zoom - self.view_size.width).max(0.0);
        let max_y = (self.scene_size.height * self.state.zoom - self.view_size.height).max(0.0);
        self.state.scroll = Vec2::new(
            self.state.scroll.x.clamp(0.0, max_x),
            self.state.scroll.y.clamp(0.0, max_y),
        );
    }
}
