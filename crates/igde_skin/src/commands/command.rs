//! Command trait and result types.

use crate::error::Result;
use crate::property::Property;

/// Result type for command execution.
pub type CommandResult = Result<()>;

/// A command that can be executed, undone, and redone.
///
/// Commands are the only way node edits enter the undo history. They capture
/// both the edit and its inverse. `execute` is called for the first
/// application and for every redo, so it must always produce the same state
/// from the state `undo` left behind.
///
/// # Example
///
/// ```ignore
/// struct HideNode {
///     node: NodeId,
///     old_transparency: f32,
/// }
///
/// impl Command for HideNode {
///     fn description(&self) -> &str { "Hide Node" }
///
///     fn execute(&mut self, property: &mut Property) -> CommandResult {
///         property.set_transparency(self.node, 0.0)
///     }
///
///     fn undo(&mut self, property: &mut Property) -> CommandResult {
///         property.set_transparency(self.node, self.old_transparency)
///     }
/// }
/// ```
pub trait Command: Send + Sync {
    /// Human-readable description for the undo/redo menu.
    fn description(&self) -> &str;

    /// Apply the command, modifying the property.
    fn execute(&mut self, property: &mut Property) -> CommandResult;

    /// Undo the command, restoring the previous state.
    fn undo(&mut self, property: &mut Property) -> CommandResult;

    /// Called once when the history drops the command for good.
    ///
    /// `applied` tells whether the command's effect is part of the property
    /// (dropped from the undo stack) or not (dropped from the redo stack).
    /// Commands holding detached nodes free them here.
    fn release(&mut self, _property: &mut Property, _applied: bool) {}
}
