//! Undo/Redo history with command pattern and transaction support.
//!
//! All node edits go through the history system to enable undo/redo.
//! Commands can be grouped into transactions for atomic multi-step
//! operations. Commands leaving the history for good are collected so the
//! owner can [`Command::release`] them against the property.

use super::{Command, CommandResult};
use crate::property::Property;

/// A group of commands executed as a single undoable unit.
pub struct Transaction {
    pub name: String,
    pub commands: Vec<Box<dyn Command>>,
}

impl Transaction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, cmd: Box<dyn Command>) {
        self.commands.push(cmd);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// A command dropped from the history.
pub struct DiscardedCommand {
    pub command: Box<dyn Command>,
    /// Whether the command's effect is part of the property
    pub applied: bool,
}

/// Undo/redo history stack.
pub struct UndoHistory {
    /// Commands that can be undone
    undo_stack: Vec<Box<dyn Command>>,
    /// Commands that can be redone
    redo_stack: Vec<Box<dyn Command>>,
    /// Maximum history size
    max_size: usize,
    /// Current open transaction
    current_transaction: Option<Transaction>,
    /// Dropped commands waiting for release
    discarded: Vec<DiscardedCommand>,
    /// Whether history has been modified since last save
    dirty: bool,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoHistory {
    /// Default maximum history size.
    pub const DEFAULT_MAX_SIZE: usize = 100;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_MAX_SIZE)
    }

    pub fn with_capacity(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
            current_transaction: None,
            discarded: Vec::new(),
            dirty: false,
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Change the bound, dropping the oldest commands if necessary.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size.max(1);
        self.trim();
    }

    /// Check if there are commands to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if there are commands to redo.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the description of the next undo command.
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|c| c.description())
    }

    /// Get the description of the next redo command.
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|c| c.description())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark as saved (clears dirty flag).
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Begin a new transaction.
    /// Commands added during a transaction are grouped as one undo unit.
    pub fn begin_transaction(&mut self, name: impl Into<String>) {
        if let Some(open) = self.current_transaction.take() {
            log::warn!("Beginning transaction while one is already open");
            self.commit(open);
        }
        self.current_transaction = Some(Transaction::new(name));
    }

    /// Commit the current transaction.
    pub fn commit_transaction(&mut self) {
        if let Some(transaction) = self.current_transaction.take() {
            self.commit(transaction);
        }
    }

    fn commit(&mut self, transaction: Transaction) {
        if !transaction.is_empty() {
            self.push_command(Box::new(TransactionCommand(transaction)));
        }
    }

    /// Close the current transaction without recording it.
    ///
    /// Returns its commands in execution order; they are still applied.
    pub fn rollback_transaction(&mut self) -> Vec<Box<dyn Command>> {
        self.current_transaction
            .take()
            .map(|t| t.commands)
            .unwrap_or_default()
    }

    /// Check if a transaction is currently open.
    pub fn in_transaction(&self) -> bool {
        self.current_transaction.is_some()
    }

    /// Push a command that has already been executed.
    pub fn push(&mut self, cmd: Box<dyn Command>) {
        if let Some(ref mut transaction) = self.current_transaction {
            transaction.push(cmd);
        } else {
            self.push_command(cmd);
        }
    }

    fn push_command(&mut self, cmd: Box<dyn Command>) {
        self.undo_stack.push(cmd);
        // Clear redo on new action
        let redo = std::mem::take(&mut self.redo_stack);
        for old in redo.into_iter().rev() {
            self.discard(old, false);
        }
        self.dirty = true;
        self.trim();
    }

    fn trim(&mut self) {
        while self.undo_stack.len() > self.max_size {
            let old = self.undo_stack.remove(0);
            self.discard(old, true);
        }
    }

    fn discard(&mut self, command: Box<dyn Command>, applied: bool) {
        log::debug!("Discarding command '{}'", command.description());
        self.discarded.push(DiscardedCommand { command, applied });
    }

    /// Take the commands dropped since the last call.
    pub fn take_discarded(&mut self) -> Vec<DiscardedCommand> {
        std::mem::take(&mut self.discarded)
    }

    /// Pop a command from the undo stack.
    pub fn pop_undo(&mut self) -> Option<Box<dyn Command>> {
        let cmd = self.undo_stack.pop();
        if cmd.is_some() {
            self.dirty = true;
        }
        cmd
    }

    /// Pop a command from the redo stack.
    pub fn pop_redo(&mut self) -> Option<Box<dyn Command>> {
        let cmd = self.redo_stack.pop();
        if cmd.is_some() {
            self.dirty = true;
        }
        cmd
    }

    /// Push a command to the undo stack (for redo completion).
    pub fn push_to_undo(&mut self, cmd: Box<dyn Command>) {
        self.undo_stack.push(cmd);
        self.dirty = true;
    }

    /// Push a command to the redo stack (for undo completion).
    pub fn push_to_redo(&mut self, cmd: Box<dyn Command>) {
        self.redo_stack.push(cmd);
        self.dirty = true;
    }

    /// Clear all history.
    pub fn clear(&mut self) {
        let undo = std::mem::take(&mut self.undo_stack);
        let redo = std::mem::take(&mut self.redo_stack);
        for old in undo.into_iter().rev() {
            self.discard(old, true);
        }
        for old in redo.into_iter().rev() {
            self.discard(old, false);
        }
        if let Some(transaction) = self.current_transaction.take() {
            for old in transaction.commands.into_iter().rev() {
                self.discard(old, true);
            }
        }
        self.dirty = false;
    }

    /// Get the number of commands in the undo stack.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of commands in the redo stack.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

/// A command that wraps a transaction.
struct TransactionCommand(Transaction);

impl Command for TransactionCommand {
    fn description(&self) -> &str {
        &self.0.name
    }

    fn execute(&mut self, property: &mut Property) -> CommandResult {
        for cmd in &mut self.0.commands {
            cmd.execute(property)?;
        }
        Ok(())
    }

    fn undo(&mut self, property: &mut Property) -> CommandResult {
        // Undo in reverse order
        for cmd in self.0.commands.iter_mut().rev() {
            cmd.undo(property)?;
        }
        Ok(())
    }

    fn release(&mut self, property: &mut Property, applied: bool) {
        for cmd in self.0.commands.iter_mut().rev() {
            cmd.release(property, applied);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct TestCommand {
        name: &'static str,
        released: Arc<AtomicUsize>,
    }

    impl TestCommand {
        fn boxed(name: &'static str, released: &Arc<AtomicUsize>) -> Box<dyn Command> {
            Box::new(Self {
                name,
                released: Arc::clone(released),
            })
        }
    }

    impl Command for TestCommand {
        fn description(&self) -> &str {
            self.name
        }

        fn execute(&mut self, _property: &mut Property) -> CommandResult {
            Ok(())
        }

        fn undo(&mut self, _property: &mut Property) -> CommandResult {
            Ok(())
        }

        fn release(&mut self, _property: &mut Property, _applied: bool) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_history_basic() {
        let released = Arc::new(AtomicUsize::new(0));
        let mut history = UndoHistory::new();

        assert!(!history.can_undo());
        assert!(!history.can_redo());

        history.push(TestCommand::boxed("Move", &released));

        assert!(history.can_undo());
        assert!(!history.can_redo());
        assert!(history.is_dirty());
        assert_eq!(history.undo_description(), Some("Move"));
        history.mark_saved();
        assert!(!history.is_dirty());
    }

    #[test]
    fn test_history_undo_redo() {
        let released = Arc::new(AtomicUsize::new(0));
        let mut history = UndoHistory::new();

        history.push(TestCommand::boxed("One", &released));
        history.push(TestCommand::boxed("Two", &released));

        assert_eq!(history.undo_count(), 2);

        // Pop from undo stack (simulating undo)
        if let Some(cmd) = history.pop_undo() {
            history.push_to_redo(cmd);
        }
        assert_eq!(history.undo_count(), 1);
        assert_eq!(history.redo_count(), 1);
        assert_eq!(history.redo_description(), Some("Two"));

        // Pop from redo stack (simulating redo)
        if let Some(cmd) = history.pop_redo() {
            history.push_to_undo(cmd);
        }
        assert_eq!(history.undo_count(), 2);
        assert_eq!(history.redo_count(), 0);
    }

    #[test]
    fn test_push_discards_redo_as_unapplied() {
        let released = Arc::new(AtomicUsize::new(0));
        let mut history = UndoHistory::new();
        history.push(TestCommand::boxed("One", &released));
        if let Some(cmd) = history.pop_undo() {
            history.push_to_redo(cmd);
        }
        history.push(TestCommand::boxed("Two", &released));

        let discarded = history.take_discarded();
        assert_eq!(discarded.len(), 1);
        assert!(!discarded[0].applied);
        assert_eq!(discarded[0].command.description(), "One");
        assert!(!history.can_redo());
    }

    #[test]
    fn test_bounded_stack_drops_oldest() {
        let released = Arc::new(AtomicUsize::new(0));
        let mut history = UndoHistory::with_capacity(2);
        history.push(TestCommand::boxed("One", &released));
        history.push(TestCommand::boxed("Two", &released));
        history.push(TestCommand::boxed("Three", &released));

        assert_eq!(history.undo_count(), 2);
        let discarded = history.take_discarded();
        assert_eq!(discarded.len(), 1);
        assert!(discarded[0].applied);
        assert_eq!(discarded[0].command.description(), "One");
    }

    #[test]
    fn test_consecutive_commands_stay_separate() {
        let released = Arc::new(AtomicUsize::new(0));
        let mut history = UndoHistory::new();
        history.push(TestCommand::boxed("Fade", &released));
        history.push(TestCommand::boxed("Fade", &released));

        assert_eq!(history.undo_count(), 2);
        assert!(history.take_discarded().is_empty());
    }

    #[test]
    fn test_transaction_is_one_entry() {
        let released = Arc::new(AtomicUsize::new(0));
        let mut history = UndoHistory::new();
        history.begin_transaction("Align");
        history.push(TestCommand::boxed("One", &released));
        history.push(TestCommand::boxed("Two", &released));
        assert!(history.in_transaction());
        assert_eq!(history.undo_count(), 0);
        history.commit_transaction();

        assert_eq!(history.undo_count(), 1);
        assert_eq!(history.undo_description(), Some("Align"));

        history.begin_transaction("Empty");
        history.commit_transaction();
        assert_eq!(history.undo_count(), 1);
    }

    #[test]
    fn test_transaction_release_reaches_members() {
        let released = Arc::new(AtomicUsize::new(0));
        let mut history = UndoHistory::new();
        history.begin_transaction("Align");
        history.push(TestCommand::boxed("One", &released));
        history.push(TestCommand::boxed("Two", &released));
        history.commit_transaction();
        history.clear();

        let mut property = Property::new("color", igde_math::Point3::new(8, 8, 1));
        for mut discarded in history.take_discarded() {
            discarded.command.release(&mut property, discarded.applied);
        }
        assert_eq!(released.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_rollback_returns_commands() {
        let released = Arc::new(AtomicUsize::new(0));
        let mut history = UndoHistory::new();
        history.begin_transaction("Align");
        history.push(TestCommand::boxed("One", &released));
        let commands = history.rollback_transaction();
        assert_eq!(commands.len(), 1);
        assert!(!history.in_transaction());
        assert!(!history.can_undo());
    }
}
