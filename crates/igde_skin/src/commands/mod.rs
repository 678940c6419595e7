//! Command pattern implementation for undo/redo support.
//!
//! All node edits that should be undoable must go through the command
//! system.

mod capture;
mod command;
mod group_commands;
mod history;
mod mask_commands;
mod transform_commands;

pub use capture::{pivot_transform, CapturedNodes, NodeState};
pub use command::{Command, CommandResult};
pub use group_commands::{
    AddNode,
    GroupNodes,
    PasteNodes,
    RemoveNodes,
    ReorderKind,
    ReorderNodes,
    UngroupNodes,
};
pub use history::{DiscardedCommand, Transaction, UndoHistory};
pub use mask_commands::{RemoveMask, SetMask};
pub use transform_commands::{
    DragNodes, ResizeNodes, RotateNodes, SetTransparency, ShearAxis, ShearNodes, SizeFromImage,
};

