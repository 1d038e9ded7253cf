//! Per-surface copy buffer.

use kurbo::{Point, Vec2};
use mb_core::model::{Node, NodeKind};

/// One copied placement.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipEntry {
    /// The node as it was at copy time. Pasting re-creates it if a cut
    /// removed it from the store meanwhile.
    pub node: Node,
    /// Offset of the item's top-left from the copied group's top-left.
    pub offset: Vec2,
    pub scale: f64,
}

impl ClipEntry {
    pub fn is_text(&self) -> bool {
        self.node.kind() == NodeKind::Text
    }
}

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    entries: Vec<ClipEntry>,
    /// Scene top-left of the group the entries were copied from.
    origin: Point,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, origin: Point, entries: Vec<ClipEntry>) {
        self.origin = origin;
        self.entries = entries;
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ClipEntry] {
        &self.entries
    }

    pub fn origin(&self) -> Point {
        self.origin
    }
}
