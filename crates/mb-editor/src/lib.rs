pub mod clipboard;
pub mod input;
pub mod selection;
pub mod shortcuts;
pub mod surface;
pub mod viewport;

pub use clipboard::{ClipEntry, Clipboard};
pub use input::{DropPayload, InputEvent, Modifiers, PointerButton};
pub use selection::{GesturePhase, SelectionGroup};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use surface::{CanvasEffect, CanvasSurface};
pub use viewport::Viewport;
