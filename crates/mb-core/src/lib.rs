pub mod config;
pub mod error;
pub mod geometry;
pub mod id;
pub mod item;
pub mod measure;
pub mod model;
pub mod persist;
pub mod project;
pub mod store;
pub mod tabs;

pub use config::CanvasSettings;
pub use error::{CanvasError, Result};
pub use geometry::Corner;
pub use id::{CanvasItemId, NodeId, TabId};
pub use item::{CanvasItem, ItemBody, ItemShape};
pub use measure::{ContentSizer, FixedSizer, FsContentSizer};
pub use model::*;
pub use project::{Project, Reconciliation};
pub use store::NodeStore;
pub use tabs::TabRegistry;

// Geometry types appear throughout the public API.
pub use kurbo;
