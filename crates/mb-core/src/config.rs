//! Tunables for the canvas engine.
//!
//! Every field has a default matching the stock editor; embedders can load
//! partial overrides from JSON with [`CanvasSettings::from_json_str`].

use crate::model::{Color, ViewportState};
use kurbo::{Size, Vec2};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasSettings {
    /// Allowed zoom range, inclusive.
    pub zoom_min: f64,
    pub zoom_max: f64,
    /// Relative zoom change per wheel notch / `+` / `-`.
    pub zoom_step: f64,

    /// Corner handle radius in screen pixels.
    pub handle_radius: f64,
    /// Overlay border width in screen pixels.
    pub overlay_border_width: f64,
    /// Smallest group scale a corner drag may produce.
    pub min_group_scale: f64,

    /// Scene extent for new projects.
    pub canvas_size: [f64; 2],
    /// Viewport of newly created tabs.
    pub default_viewport_pos: [f64; 2],
    pub default_viewport_zoom: f64,
    pub accent_color: String,
    /// Size of the host view in pixels until the first resize.
    pub view_size: [f64; 2],

    /// New images are scaled down to fit this edge length.
    pub default_image_size: f64,
    /// Offset between consecutive items of one drop / multi-insert.
    pub drop_stagger: f64,
    pub file_item_size: [f64; 2],
    pub text_char_width: f64,
    pub text_line_height: f64,
    pub text_padding: f64,
    pub text_min_size: [f64; 2],
    /// Lower-case extensions (with the dot) treated as images on drop.
    pub image_extensions: Vec<String>,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            zoom_min: 0.05,
            zoom_max: 5.0,
            zoom_step: 0.1,
            handle_radius: 4.0,
            overlay_border_width: 2.0,
            min_group_scale: 0.1,
            canvas_size: [10000.0, 10000.0],
            default_viewport_pos: [2500.0, 2500.0],
            default_viewport_zoom: 1.0,
            accent_color: "#23A0FF".into(),
            view_size: [1200.0, 800.0],
            default_image_size: 600.0,
            drop_stagger: 10.0,
            file_item_size: [300.0, 75.0],
            text_char_width: 7.0,
            text_line_height: 18.0,
            text_padding: 8.0,
            text_min_size: [80.0, 40.0],
            image_extensions: [".jpg", ".png", ".jpeg", ".bmp", ".gif", ".webp"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl CanvasSettings {
    /// Parse overrides; absent fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.zoom_min, self.zoom_max)
    }

    pub fn accent(&self) -> Color {
        Color::from_hex(&self.accent_color).unwrap_or(Color::rgba(0.137, 0.627, 1.0, 1.0))
    }

    pub fn default_viewport(&self) -> ViewportState {
        ViewportState {
            scroll: Vec2::new(self.default_viewport_pos[0], self.default_viewport_pos[1]),
            zoom: self.clamp_zoom(self.default_viewport_zoom),
        }
    }

    pub fn view_size(&self) -> Size {
        Size::new(self.view_size[0], self.view_size[1])
    }

    /// Whether a dropped path should become an Image item.
    pub fn is_image_path(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let dotted = format!(".{}", ext.to_ascii_lowercase());
        self.image_extensions.iter().any(|e| *e == dotted)
    }
}
