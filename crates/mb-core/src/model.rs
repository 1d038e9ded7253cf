//! Core data model for mood-board projects.
//!
//! Content lives in [`Node`]s, keyed by ID and shared. A Node is *placed* on a
//! tab by one or more [`CanvasItemRecord`]s; the record owns nothing but a
//! position, a uniform scale, and the ID of the node it shows. Each node keeps
//! the set of records currently placing it, and is collected when that set
//! becomes empty.

use crate::error::CanvasError;
use crate::id::{CanvasItemId, NodeId, TabId};
use kurbo::{Point, Vec2};
use smallvec::SmallVec;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RRGGBB`, or `#RRGGBBAA`. The `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let byte = |i: usize| -> Option<f32> {
            Some((hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?) as f32 / 255.0)
        };

        match bytes.len() {
            3 => {
                let r = hex_val(bytes[0])?;
                let g = hex_val(bytes[1])?;
                let b = hex_val(bytes[2])?;
                Some(Self::rgba(
                    (r * 17) as f32 / 255.0,
                    (g * 17) as f32 / 255.0,
                    (b * 17) as f32 / 255.0,
                    1.0,
                ))
            }
            6 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, 1.0)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// Channels as bytes, rounded.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [c(self.r), c(self.g), c(self.b), c(self.a)]
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// The three kinds of content a node can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Image,
    Text,
    File,
}

impl NodeKind {
    /// The on-disk type tag (`"Image_Node"` etc.).
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Image => "Image_Node",
            NodeKind::Text => "Text_Node",
            NodeKind::File => "File_Node",
        }
    }
}

impl FromStr for NodeKind {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Image_Node" => Ok(NodeKind::Image),
            "Text_Node" => Ok(NodeKind::Text),
            "File_Node" => Ok(NodeKind::File),
            other => Err(CanvasError::InvalidType(other.to_string())),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type payload of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent {
    Image { path: PathBuf },
    Text { text: String },
    File { path: PathBuf },
}

impl NodeContent {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeContent::Image { .. } => NodeKind::Image,
            NodeContent::Text { .. } => NodeKind::Text,
            NodeContent::File { .. } => NodeKind::File,
        }
    }

    /// The local file backing this content, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            NodeContent::Image { path } | NodeContent::File { path } => Some(path),
            NodeContent::Text { .. } => None,
        }
    }
}

/// Canonical content record, shared by every placement that shows it.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    /// Seconds since the Unix epoch.
    pub creation_time: u64,
    pub content: NodeContent,
    /// Canvas items currently placing this node. Insertion-ordered set.
    pub references: SmallVec<[CanvasItemId; 2]>,
}

impl Node {
    pub fn new(name: impl Into<String>, content: NodeContent) -> Self {
        Self {
            id: NodeId::generate(),
            name: name.into(),
            creation_time: now_epoch_secs(),
            content,
            references: SmallVec::new(),
        }
    }

    pub fn image(path: impl Into<PathBuf>) -> Self {
        Self::new(NodeKind::Image.as_str(), NodeContent::Image { path: path.into() })
    }

    pub fn text(text: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(name, NodeContent::Text { text: text.into() })
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(NodeKind::File.as_str(), NodeContent::File { path: path.into() })
    }

    pub fn kind(&self) -> NodeKind {
        self.content.kind()
    }

    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    /// Text payload, for Text nodes.
    pub fn text_content(&self) -> Option<&str> {
        match &self.content {
            NodeContent::Text { text } => Some(text),
            _ => None,
        }
    }
}

pub fn now_epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ─── Placements ──────────────────────────────────────────────────────────

/// Persisted placement of a node within a tab.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasItemRecord {
    pub id: CanvasItemId,
    /// Relation only; the record never owns the node.
    pub node_id: NodeId,
    /// Scene-space top-left corner.
    pub pos: Point,
    /// Uniform, strictly positive.
    pub scale: f64,
}

impl CanvasItemRecord {
    pub fn new(node_id: NodeId, pos: Point, scale: f64) -> Self {
        Self {
            id: CanvasItemId::generate(),
            node_id,
            pos,
            scale,
        }
    }

    /// Scale must be finite and positive.
    pub fn validate(&self) -> Result<(), CanvasError> {
        if self.scale.is_finite() && self.scale > 0.0 {
            Ok(())
        } else {
            Err(CanvasError::Validation(format!(
                "canvas item [{}] has scale {}",
                self.id, self.scale
            )))
        }
    }
}

// ─── Tabs ────────────────────────────────────────────────────────────────

/// Scroll offsets and zoom factor for one tab.
///
/// `scroll` is in view pixels: a scene point `p` appears on screen at
/// `p * zoom - scroll`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub scroll: Vec2,
    pub zoom: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            scroll: Vec2::new(2500.0, 2500.0),
            zoom: 1.0,
        }
    }
}

/// A named, independently scrollable view over an ordered list of
/// placements. List order is z-order, back to front.
#[derive(Debug, Clone, PartialEq)]
pub struct Tab {
    pub id: TabId,
    pub name: String,
    pub color: Color,
    pub viewport: ViewportState,
    pub items: Vec<CanvasItemRecord>,
}

impl Tab {
    pub fn new(name: impl Into<String>, color: Color, viewport: ViewportState) -> Self {
        Self {
            id: TabId::generate(),
            name: name.into(),
            color,
            viewport,
            items: Vec::new(),
        }
    }

    pub fn record(&self, id: CanvasItemId) -> Option<&CanvasItemRecord> {
        self.items.iter().find(|r| r.id == id)
    }

    pub fn record_mut(&mut self, id: CanvasItemId) -> Option<&mut CanvasItemRecord> {
        self.items.iter_mut().find(|r| r.id == id)
    }

    pub fn remove_record(&mut self, id: CanvasItemId) -> Option<CanvasItemRecord> {
        let pos = self.items.iter().position(|r| r.id == id)?;
        Some(self.items.remove(pos))
    }

    /// Move a record to the end of the list (front of the z-order).
    /// Returns false when the record is absent or already last.
    pub fn move_to_end(&mut self, id: CanvasItemId) -> bool {
        match self.items.iter().position(|r| r.id == id) {
            Some(pos) if pos + 1 < self.items.len() => {
                let record = self.items.remove(pos);
                self.items.push(record);
                true
            }
            _ => false,
        }
    }
}
