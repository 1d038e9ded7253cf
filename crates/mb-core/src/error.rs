//! Error taxonomy shared by the store, the canvas surface, and persistence.

use std::fmt;
use std::path::PathBuf;

use crate::id::NodeId;

/// Everything that can go wrong outside of a continuous gesture.
///
/// Gesture-level problems (degenerate scale, out-of-bounds move, zoom out of
/// range) never show up here; those are clamped or rejected in place.
#[derive(Debug)]
pub enum CanvasError {
    /// A node, canvas item, or tab is missing.
    NotFound { what: &'static str, id: String },
    /// Unrecognized node type (e.g. `"Video_Node"`).
    InvalidType(String),
    /// Hard delete attempted on a node that still has placements.
    InUse { node: NodeId, references: usize },
    /// File, image, or project read/write failure.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Malformed project JSON.
    Validation(String),
}

impl CanvasError {
    pub fn node_not_found(id: impl fmt::Display) -> Self {
        Self::NotFound {
            what: "node",
            id: id.to_string(),
        }
    }

    pub fn item_not_found(id: impl fmt::Display) -> Self {
        Self::NotFound {
            what: "canvas item",
            id: id.to_string(),
        }
    }

    pub fn tab_not_found(id: impl fmt::Display) -> Self {
        Self::NotFound {
            what: "tab",
            id: id.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for CanvasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { what, id } => write!(f, "{what} [{id}] not found"),
            Self::InvalidType(t) => write!(f, "[{t}] is not a valid node type"),
            Self::InUse { node, references } => write!(
                f,
                "node [{node}] is still placed by {references} canvas item(s)"
            ),
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Validation(msg) => write!(f, "invalid project: {msg}"),
        }
    }
}

impl std::error::Error for CanvasError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CanvasError {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CanvasError>;
