//! Live canvas items: one typed placement per record on the active tab.
//!
//! The node's kind is dispatched exactly once, when the item is built from
//! its record; afterwards the item only answers geometry questions through
//! [`ItemShape`].

use crate::error::Result;
use crate::geometry::rects_intersect;
use crate::id::{CanvasItemId, NodeId};
use crate::measure::ContentSizer;
use crate::model::{CanvasItemRecord, Node, NodeContent, NodeKind};
use kurbo::{Point, Rect, Size};
use std::path::PathBuf;

/// Geometry capability shared by every item body.
pub trait ItemShape {
    /// Unscaled content size; local coordinates start at the origin.
    fn local_size(&self) -> Size;

    /// Whether a point in local (unscaled) coordinates hits the item.
    fn contains_local(&self, p: Point) -> bool {
        Rect::from_origin_size(Point::ZERO, self.local_size()).contains(p)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageBody {
    pub path: PathBuf,
    pub size: Size,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBody {
    pub size: Size,
    /// In edit mode the item swallows drags and the Delete key.
    pub editing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileBody {
    pub path: PathBuf,
    /// Base name shown on the card.
    pub file_name: String,
    pub size: Size,
}

/// Kind-specific state of a live item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemBody {
    Image(ImageBody),
    Text(TextBody),
    File(FileBody),
}

impl ItemBody {
    fn build(content: &NodeContent, size: Size) -> Self {
        match content {
            NodeContent::Image { path } => ItemBody::Image(ImageBody {
                path: path.clone(),
                size,
            }),
            NodeContent::Text { .. } => ItemBody::Text(TextBody {
                size,
                editing: false,
            }),
            NodeContent::File { path } => ItemBody::File(FileBody {
                path: path.clone(),
                file_name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.to_string_lossy().into_owned()),
                size,
            }),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            ItemBody::Image(_) => NodeKind::Image,
            ItemBody::Text(_) => NodeKind::Text,
            ItemBody::File(_) => NodeKind::File,
        }
    }

    fn size_mut(&mut self) -> &mut Size {
        match self {
            ItemBody::Image(b) => &mut b.size,
            ItemBody::Text(b) => &mut b.size,
            ItemBody::File(b) => &mut b.size,
        }
    }
}

impl ItemShape for ItemBody {
    fn local_size(&self) -> Size {
        match self {
            ItemBody::Image(b) => b.size,
            ItemBody::Text(b) => b.size,
            ItemBody::File(b) => b.size,
        }
    }
}

/// A placement on the active tab, with its live pose.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasItem {
    pub id: CanvasItemId,
    pub node_id: NodeId,
    pub body: ItemBody,
    /// Scene-space top-left.
    pub pos: Point,
    pub scale: f64,
    /// Index in the z-order list (0 = back).
    pub z: usize,
}

impl CanvasItem {
    /// Build the typed item for `record`. `node` must be the record's node.
    pub fn from_record(
        record: &CanvasItemRecord,
        node: &Node,
        sizer: &dyn ContentSizer,
    ) -> Result<Self> {
        debug_assert_eq!(record.node_id, node.id);
        let size = sizer.measure(&node.content)?;
        Ok(Self {
            id: record.id,
            node_id: record.node_id,
            body: ItemBody::build(&node.content, size),
            pos: record.pos,
            scale: record.scale,
            z: 0,
        })
    }

    pub fn kind(&self) -> NodeKind {
        self.body.kind()
    }

    pub fn scaled_size(&self) -> Size {
        self.body.local_size() * self.scale
    }

    pub fn scene_bounds(&self) -> Rect {
        Rect::from_origin_size(self.pos, self.scaled_size())
    }

    /// Whether a scene point hits this item.
    pub fn contains(&self, scene: Point) -> bool {
        if self.scale <= 0.0 {
            return false;
        }
        let local = Point::ZERO + (scene - self.pos) / self.scale;
        self.body.contains_local(local)
    }

    pub fn intersects(&self, rect: Rect) -> bool {
        rects_intersect(self.scene_bounds(), rect)
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.body, ItemBody::Text(TextBody { editing: true, .. }))
    }

    pub fn set_editing(&mut self, editing: bool) -> bool {
        match &mut self.body {
            ItemBody::Text(text) => {
                text.editing = editing;
                true
            }
            _ => false,
        }
    }

    /// Replace the unscaled size after the content changed.
    pub fn resize(&mut self, size: Size) {
        *self.body.size_mut() = size;
    }
}
