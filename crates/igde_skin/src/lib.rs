//! # igde_skin - Constructed Skin Property Editing
//!
//! The editing core of constructed skin properties: images composed from a
//! tree of image, shape, text and group nodes.
//!
//! ## Features
//!
//! - **Node tree**: arena stored nodes with masks, layers and nested groups
//! - **Selection**: selected nodes with an active node inside the active group
//! - **Undo/Redo**: command history with transactions
//! - **Drag tool**: move, resize, rotate and shear gestures with markers
//! - **Clipboard**: deep copies of node subtrees
//!
//! ## Architecture
//!
//! ```text
//! Mouse gesture → NodeDragTool → Command → Property → PropertyEvent → SkinListener
//! ```
//!
//! All modifications of a [`Skin`] go through the command system for
//! undo/redo support.

pub mod clipboard;
pub mod commands;
pub mod config;
pub mod error;
pub mod node;
pub mod notify;
pub mod property;
pub mod selection;
pub mod skin;
pub mod tools;

// Re-export commonly used types
pub use clipboard::{Clipboard, NodeTemplate};
pub use commands::{Command, CommandResult, UndoHistory};
pub use config::SkinEditorConfig;
pub use error::{Result, SkinError};
pub use node::{Color, GroupNode, ImageNode, NodeId, NodeKind, PropertyNode, ShapeNode, ShapeType, TextNode};
pub use notify::{PropertyEvent, SkinListener};
pub use property::Property;
pub use selection::{NodeSelection, SelectionMode};
pub use skin::Skin;
pub use tools::{CanvasView, MarkerKind, MarkerLayout, Modifiers, NodeDragTool, ViewInteraction};

pub mod prelude {
    pub use crate::commands::*;
    pub use crate::node::{NodeId, NodeKind, PropertyNode, ShapeType};
    pub use crate::property::Property;
    pub use crate::selection::SelectionMode;
    pub use crate::skin::Skin;
    pub use crate::tools::{Modifiers, NodeDragTool, ViewInteraction};
    pub use crate::{Result, SkinError};
}
