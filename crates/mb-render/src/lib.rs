pub mod hit;
pub mod overlay;
pub mod paint;

pub use hit::{hit_test, hit_test_rect};
pub use overlay::SelectionOverlay;
pub use paint::{paint_canvas, view_transform};
