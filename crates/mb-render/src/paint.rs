//! Canvas → Vello drawing commands.
//!
//! Items are painted back to front as placeholder frames; decoding images
//! and shaping text are left to the host. The selection overlay and the
//! rubber band are painted last, above every item.

use kurbo::{Affine, Rect, RoundedRect, Stroke};
use mb_core::item::{CanvasItem, ItemBody, ItemShape};
use mb_core::model::{Color as CanvasColor, ViewportState};
use peniko::{Color, Fill};
use vello::Scene;

use crate::overlay::SelectionOverlay;

const IMAGE_FILL: Color = Color::from_rgba8(0xE6, 0xE6, 0xE6, 0xFF);
const IMAGE_FRAME: Color = Color::from_rgba8(0x9A, 0x9A, 0x9A, 0xFF);
const TEXT_FILL: Color = Color::from_rgba8(0x1E, 0x1E, 0x1E, 0xFF);
const FILE_FILL: Color = Color::from_rgba8(0x00, 0x00, 0x00, 0xFF);
const FILE_CORNER_RADIUS: f64 = 10.0;
const TEXT_CORNER_RADIUS: f64 = 4.0;

/// Scene → screen transform for a viewport: `p * zoom - scroll`.
pub fn view_transform(viewport: &ViewportState) -> Affine {
    Affine::translate(-viewport.scroll) * Affine::scale(viewport.zoom)
}

/// Local item space → scene space.
pub fn item_transform(item: &CanvasItem) -> Affine {
    Affine::translate(item.pos.to_vec2()) * Affine::scale(item.scale)
}

/// Paint a whole frame. Call once per frame with a freshly-cleared `Scene`;
/// the caller presents it.
pub fn paint_canvas<'a>(
    scene: &mut Scene,
    items: impl IntoIterator<Item = &'a CanvasItem>,
    overlay: &SelectionOverlay,
    rubber_band: Option<Rect>,
    accent: CanvasColor,
    viewport: &ViewportState,
) {
    let view = view_transform(viewport);
    let accent = to_peniko(accent);

    for item in items {
        paint_item(scene, item, view, accent);
    }
    paint_overlay(scene, overlay, view, accent);
    if let Some(band) = rubber_band {
        paint_rubber_band(scene, band, overlay.border_width() / 2.0, view, accent);
    }
}

// ─── Items ───────────────────────────────────────────────────────────────

fn paint_item(scene: &mut Scene, item: &CanvasItem, view: Affine, accent: Color) {
    let transform = view * item_transform(item);
    let local = Rect::from_origin_size((0.0, 0.0), item.body.local_size());

    match &item.body {
        ItemBody::Image(image) => {
            log::trace!("IMAGE {} {:?}", item.id, image.path);
            scene.fill(Fill::NonZero, transform, IMAGE_FILL, None, &local);
            scene.stroke(&Stroke::new(1.0), transform, IMAGE_FRAME, None, &local);
        }
        ItemBody::Text(text) => {
            let shape = RoundedRect::from_rect(local, TEXT_CORNER_RADIUS);
            scene.fill(Fill::NonZero, transform, TEXT_FILL, None, &shape);
            if text.editing {
                scene.stroke(&Stroke::new(1.5), transform, accent, None, &shape);
            }
            // Glyphs need a font context from the host.
        }
        ItemBody::File(file) => {
            log::trace!("FILE {} {}", item.id, file.file_name);
            let shape = RoundedRect::from_rect(local, FILE_CORNER_RADIUS);
            scene.fill(Fill::NonZero, transform, FILE_FILL, None, &shape);
            // Icon slot on the left of the card.
            let pad = local.height() * 0.2;
            let side = local.height() - pad * 2.0;
            let icon = Rect::from_origin_size((pad, pad), (side, side));
            scene.fill(Fill::NonZero, transform, accent, None, &icon);
        }
    }
}

// ─── Overlay ─────────────────────────────────────────────────────────────

fn paint_overlay(scene: &mut Scene, overlay: &SelectionOverlay, view: Affine, accent: Color) {
    let Some(bounds) = overlay.bounds() else {
        return;
    };
    scene.stroke(&Stroke::new(overlay.border_width()), view, accent, None, &bounds);
    for dot in overlay.handle_dots() {
        scene.fill(Fill::NonZero, view, accent, None, &dot);
    }
}

fn paint_rubber_band(scene: &mut Scene, band: Rect, width: f64, view: Affine, accent: Color) {
    scene.fill(Fill::NonZero, view, accent.with_alpha(0.15), None, &band);
    scene.stroke(&Stroke::new(width), view, accent, None, &band);
}

fn to_peniko(color: CanvasColor) -> Color {
    let [r, g, b, a] = color.to_rgba8();
    Color::from_rgba8(r, g, b, a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Size, Vec2};
    use mb_core::config::CanvasSettings;
    use mb_core::measure::FixedSizer;
    use mb_core::model::{CanvasItemRecord, Node};

    fn viewport() -> ViewportState {
        ViewportState {
            scroll: Vec2::new(100.0, 50.0),
            zoom: 2.0,
        }
    }

    #[test]
    fn view_transform_matches_scroll_and_zoom() {
        let view = view_transform(&viewport());
        assert_eq!(view * Point::new(100.0, 100.0), Point::new(100.0, 150.0));
        assert_eq!(view.inverse() * Point::new(100.0, 150.0), Point::new(100.0, 100.0));
    }

    #[test]
    fn item_transform_places_local_origin() {
        let settings = CanvasSettings::default();
        let node = Node::image("/tmp/p.png");
        let record = CanvasItemRecord::new(node.id, Point::new(10.0, 20.0), 0.5);
        let sizer = FixedSizer::new(Size::new(40.0, 40.0), &settings);
        let item = CanvasItem::from_record(&record, &node, &sizer).unwrap();

        let t = item_transform(&item);
        assert_eq!(t * Point::ZERO, Point::new(10.0, 20.0));
        assert_eq!(t * Point::new(40.0, 40.0), Point::new(30.0, 40.0));
    }

    #[test]
    fn accent_converts_exactly() {
        let accent = CanvasSettings::default().accent();
        assert_eq!(
            to_peniko(accent).components,
            Color::from_rgba8(0x23, 0xA0, 0xFF, 0xFF).components
        );
    }
}
