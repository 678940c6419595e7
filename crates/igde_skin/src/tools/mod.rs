//! Interactive tools of the constructed view.
//!
//! Tools turn mouse gestures on the view into undoable node edits.

mod drag_node;
mod markers;
mod tool;
mod view;

pub use drag_node::NodeDragTool;
pub use markers::{MarkerAction, MarkerKind, MarkerLayout, SelectionFrame};
pub use tool::{Modifiers, ViewInteraction};
pub use view::CanvasView;
