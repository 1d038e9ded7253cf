//! Intrinsic content sizes.
//!
//! Items need an unscaled size before they can be hit-tested or grouped.
//! Images are measured from their file header, file cards have a fixed size,
//! and text boxes grow with their content.

use crate::config::CanvasSettings;
use crate::error::{CanvasError, Result};
use crate::model::NodeContent;
use kurbo::Size;
use std::path::Path;

/// Measures the unscaled size of a node's content.
pub trait ContentSizer {
    fn measure(&self, content: &NodeContent) -> Result<Size>;
}

/// Layout metrics for text and file items, taken from [`CanvasSettings`].
#[derive(Debug, Clone, Copy)]
pub struct BoxMetrics {
    pub file_item: Size,
    pub char_width: f64,
    pub line_height: f64,
    pub padding: f64,
    pub text_min: Size,
}

impl BoxMetrics {
    pub fn from_settings(settings: &CanvasSettings) -> Self {
        Self {
            file_item: Size::new(settings.file_item_size[0], settings.file_item_size[1]),
            char_width: settings.text_char_width,
            line_height: settings.text_line_height,
            padding: settings.text_padding,
            text_min: Size::new(settings.text_min_size[0], settings.text_min_size[1]),
        }
    }

    /// Monospace-ish estimate; real shaping happens in the host.
    pub fn text_size(&self, text: &str) -> Size {
        let lines = text.lines().count().max(1);
        let widest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        Size::new(
            (widest as f64 * self.char_width + self.padding * 2.0).max(self.text_min.width),
            (lines as f64 * self.line_height + self.padding * 2.0).max(self.text_min.height),
        )
    }
}

/// Reads image dimensions from disk.
#[derive(Debug, Clone, Copy)]
pub struct FsContentSizer {
    metrics: BoxMetrics,
}

impl FsContentSizer {
    pub fn new(settings: &CanvasSettings) -> Self {
        Self {
            metrics: BoxMetrics::from_settings(settings),
        }
    }
}

impl ContentSizer for FsContentSizer {
    fn measure(&self, content: &NodeContent) -> Result<Size> {
        match content {
            NodeContent::Image { path } => image_size(path),
            NodeContent::Text { text } => Ok(self.metrics.text_size(text)),
            NodeContent::File { .. } => Ok(self.metrics.file_item),
        }
    }
}

fn image_size(path: &Path) -> Result<Size> {
    match image::image_dimensions(path) {
        Ok((w, h)) => Ok(Size::new(w as f64, h as f64)),
        Err(image::ImageError::IoError(err)) => Err(CanvasError::io(path, err)),
        Err(err) => Err(CanvasError::io(path, std::io::Error::other(err.to_string()))),
    }
}

/// Gives every image the same size without touching the filesystem.
/// Useful for headless hosts and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedSizer {
    image: Size,
    metrics: BoxMetrics,
}

impl FixedSizer {
    pub fn new(image: Size, settings: &CanvasSettings) -> Self {
        Self {
            image,
            metrics: BoxMetrics::from_settings(settings),
        }
    }
}

impl ContentSizer for FixedSizer {
    fn measure(&self, content: &NodeContent) -> Result<Size> {
        match content {
            NodeContent::Image { .. } => Ok(self.image),
            NodeContent::Text { text } => Ok(self.metrics.text_size(text)),
            NodeContent::File { .. } => Ok(self.metrics.file_item),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn text_grows_with_content() {
        let metrics = BoxMetrics::from_settings(&CanvasSettings::default());
        let short = metrics.text_size("hi");
        assert_eq!(short, Size::new(80.0, 40.0));

        let long = metrics.text_size(&"x".repeat(40));
        assert_eq!(long.width, 40.0 * 7.0 + 16.0);

        let tall = metrics.text_size("a\nb\nc");
        assert_eq!(tall.height, 3.0 * 18.0 + 16.0);
    }

    #[test]
    fn missing_image_is_io_error() {
        let sizer = FsContentSizer::new(&CanvasSettings::default());
        let content = NodeContent::Image {
            path: PathBuf::from("/definitely/not/here.png"),
        };
        assert!(matches!(sizer.measure(&content), Err(CanvasError::Io { .. })));
    }

    #[test]
    fn files_are_fixed_cards() {
        let sizer = FsContentSizer::new(&CanvasSettings::default());
        let content = NodeContent::File {
            path: PathBuf::from("/nowhere/report.pdf"),
        };
        assert_eq!(sizer.measure(&content).unwrap(), Size::new(300.0, 75.0));
    }
}
