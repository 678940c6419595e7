//! The skin document being edited.
//!
//! `Skin` owns the constructed property, its undo history, the node
//! clipboard and the editor settings. Every undoable edit goes through
//! [`Skin::execute`] or [`Skin::push`]; views register a [`SkinListener`]
//! and receive the queued change notifications on
//! [`Skin::dispatch_events`].

use crate::clipboard::Clipboard;
use crate::commands::{
    AddNode, Command, GroupNodes, PasteNodes, RemoveMask, RemoveNodes, ReorderKind, ReorderNodes, SetMask,
    SetTransparency, SizeFromImage, UndoHistory, UngroupNodes,
};
use crate::config::SkinEditorConfig;
use crate::error::{Result, SkinError};
use crate::node::{NodeId, PropertyNode};
use crate::notify::{PropertyEvent, SkinListener};
use crate::property::Property;

pub struct Skin {
    property: Property,
    history: UndoHistory,
    clipboard: Clipboard,
    config: SkinEditorConfig,
    listeners: Vec<Box<dyn SkinListener>>,
}

impl Skin {
    pub fn new(property: Property) -> Self {
        Self::with_config(property, SkinEditorConfig::default())
    }

    pub fn with_config(property: Property, config: SkinEditorConfig) -> Self {
        Self {
            property,
            history: UndoHistory::with_capacity(config.history_size),
            clipboard: Clipboard::new(),
            config,
            listeners: Vec::new(),
        }
    }

    pub fn property(&self) -> &Property {
        &self.property
    }

    pub fn property_mut(&mut self) -> &mut Property {
        &mut self.property
    }

    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn clipboard_mut(&mut self) -> &mut Clipboard {
        &mut self.clipboard
    }

    pub fn config(&self) -> &SkinEditorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SkinEditorConfig) {
        self.history.set_max_size(config.history_size);
        self.config = config;
        self.release_discarded();
    }

    pub fn add_listener(&mut self, listener: Box<dyn SkinListener>) {
        self.listeners.push(listener);
    }

    /// Send queued change notifications to all listeners.
    pub fn dispatch_events(&mut self) -> usize {
        let events = self.property.take_events();
        for event in &events {
            for listener in &mut self.listeners {
                listener.on_event(event);
            }
        }
        events.len()
    }

    // ========================================================================
    // Undo/Redo
    // ========================================================================

    /// Apply a command and record it.
    pub fn execute(&mut self, mut cmd: Box<dyn Command>) -> Result<()> {
        log::debug!("Execute: {}", cmd.description());
        cmd.execute(&mut self.property)?;
        self.push(cmd);
        Ok(())
    }

    /// Record a command whose effect is already applied.
    pub fn push(&mut self, cmd: Box<dyn Command>) {
        self.history.push(cmd);
        self.release_discarded();
        self.property.notify(PropertyEvent::UndoChanged);
    }

    /// Undo the last command.
    pub fn undo(&mut self) -> bool {
        let Some(mut cmd) = self.history.pop_undo() else {
            log::warn!("Nothing to undo");
            return false;
        };
        match cmd.undo(&mut self.property) {
            Ok(()) => {
                log::debug!("Undo: {}", cmd.description());
                self.history.push_to_redo(cmd);
                self.property.notify(PropertyEvent::UndoChanged);
                true
            }
            Err(e) => {
                // Put command back on undo stack
                log::error!("Undo of '{}' failed: {}", cmd.description(), e);
                self.history.push_to_undo(cmd);
                false
            }
        }
    }

    /// Redo the last undone command.
    pub fn redo(&mut self) -> bool {
        let Some(mut cmd) = self.history.pop_redo() else {
            log::warn!("Nothing to redo");
            return false;
        };
        match cmd.execute(&mut self.property) {
            Ok(()) => {
                log::debug!("Redo: {}", cmd.description());
                self.history.push_to_undo(cmd);
                self.property.notify(PropertyEvent::UndoChanged);
                true
            }
            Err(e) => {
                // Put command back on redo stack
                log::error!("Redo of '{}' failed: {}", cmd.description(), e);
                self.history.push_to_redo(cmd);
                false
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn begin_transaction(&mut self, name: impl Into<String>) {
        self.history.begin_transaction(name);
        self.release_discarded();
    }

    pub fn commit_transaction(&mut self) {
        self.history.commit_transaction();
        self.release_discarded();
        self.property.notify(PropertyEvent::UndoChanged);
    }

    /// Revert and drop the commands of the open transaction.
    pub fn rollback_transaction(&mut self) {
        for mut cmd in self.history.rollback_transaction().into_iter().rev() {
            if let Err(e) = cmd.undo(&mut self.property) {
                log::error!("Rollback of '{}' failed: {}", cmd.description(), e);
                cmd.release(&mut self.property, true);
                continue;
            }
            cmd.release(&mut self.property, false);
        }
    }

    /// Drop all undo steps.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.release_discarded();
        self.property.notify(PropertyEvent::UndoChanged);
    }

    fn release_discarded(&mut self) {
        for mut discarded in self.history.take_discarded() {
            discarded.command.release(&mut self.property, discarded.applied);
        }
    }

    // ========================================================================
    // Node editing
    // ========================================================================

    fn selected_nodes(&self) -> Vec<NodeId> {
        self.property.selection().selected().to_vec()
    }

    /// Add a node to the active group and select it.
    pub fn add_node(&mut self, node: PropertyNode) -> Result<NodeId> {
        let group = self.property.scope_group();
        let cmd = AddNode::new(&mut self.property, group, node)?;
        let id = cmd.node();
        self.execute(Box::new(cmd))?;
        Ok(id)
    }

    /// Remove the selected nodes. Returns `false` if nothing is selected.
    pub fn remove_selection(&mut self) -> Result<bool> {
        let nodes = self.selected_nodes();
        if nodes.is_empty() {
            return Ok(false);
        }
        let cmd = RemoveNodes::new(&self.property, &nodes)?;
        self.execute(Box::new(cmd))?;
        Ok(true)
    }

    /// Copy the selected nodes to the clipboard.
    pub fn copy_selection(&mut self) -> Result<bool> {
        let nodes = self.selected_nodes();
        if nodes.is_empty() {
            return Ok(false);
        }
        self.clipboard.copy(&self.property, &nodes)?;
        Ok(true)
    }

    /// Copy the selected nodes, then remove them.
    pub fn cut_selection(&mut self) -> Result<bool> {
        if !self.copy_selection()? {
            return Ok(false);
        }
        self.remove_selection()
    }

    /// Paste the clipboard into the active group on the active layer.
    pub fn paste(&mut self) -> Result<bool> {
        if self.clipboard.is_empty() {
            return Ok(false);
        }
        let group = self.property.scope_group();
        let layer = self.property.active_layer();
        let cmd = PasteNodes::new(&mut self.property, group, self.clipboard.templates(), layer)?;
        log::info!("Pasting {} nodes", cmd.nodes().len());
        self.execute(Box::new(cmd))?;
        Ok(true)
    }

    /// Wrap the selected nodes into a new group.
    pub fn group_selection(&mut self) -> Result<bool> {
        let nodes = self.selected_nodes();
        if nodes.is_empty() {
            return Ok(false);
        }
        let cmd = GroupNodes::new(&self.property, &nodes)?;
        self.execute(Box::new(cmd))?;
        Ok(true)
    }

    /// Dissolve the active node if it is a group.
    pub fn ungroup_active(&mut self) -> Result<bool> {
        let Some(group) = self.property.active_node() else {
            return Ok(false);
        };
        if !self.property.node(group)?.is_group() {
            return Ok(false);
        }
        let cmd = UngroupNodes::new(&self.property, group)?;
        log::info!("Ungrouping {:?}", group);
        self.execute(Box::new(cmd))?;
        Ok(true)
    }

    /// Change the paint order of the selected nodes.
    ///
    /// Nothing is recorded if the order would not change.
    pub fn reorder_selection(&mut self, kind: ReorderKind) -> Result<bool> {
        let nodes = self.selected_nodes();
        if nodes.is_empty() {
            return Ok(false);
        }
        let cmd = ReorderNodes::new(&self.property, &nodes, kind)?;
        if !cmd.has_any_effect() {
            return Ok(false);
        }
        self.execute(Box::new(cmd))?;
        Ok(true)
    }

    /// Use the other selected node as mask of the active node.
    ///
    /// Requires exactly two selected nodes and an active node without mask.
    pub fn set_mask_from_selection(&mut self) -> Result<bool> {
        let nodes = self.selected_nodes();
        let Some(node) = self.property.active_node() else {
            return Ok(false);
        };
        if nodes.len() != 2 || self.property.node(node)?.mask().is_some() {
            return Ok(false);
        }
        let Some(&mask) = nodes.iter().find(|&&n| n != node) else {
            return Ok(false);
        };
        let cmd = SetMask::new(&self.property, node, mask)?;
        self.execute(Box::new(cmd))?;
        Ok(true)
    }

    /// Turn the mask of the active node back into a sibling.
    pub fn remove_mask_active(&mut self) -> Result<bool> {
        let Some(node) = self.property.active_node() else {
            return Ok(false);
        };
        if self.property.node(node)?.mask().is_none() {
            return Ok(false);
        }
        let cmd = RemoveMask::new(&self.property, node)?;
        self.execute(Box::new(cmd))?;
        Ok(true)
    }

    /// Set the transparency of the selected nodes.
    pub fn set_selection_transparency(&mut self, transparency: f32) -> Result<bool> {
        let nodes = self.selected_nodes();
        if nodes.is_empty() {
            return Ok(false);
        }
        let cmd = SetTransparency::new(&self.property, &nodes, transparency)?;
        self.execute(Box::new(cmd))?;
        Ok(true)
    }

    /// Size the active image node to its image. Returns `false` if the active
    /// node is no loaded image or already has that size.
    pub fn size_active_from_image(&mut self) -> Result<bool> {
        let Some(node) = self.property.active_node() else {
            return Ok(false);
        };
        let cmd = match SizeFromImage::new(&self.property, node) {
            Ok(cmd) => cmd,
            Err(SkinError::NoImageSize(_)) => return Ok(false),
            Err(e) => return Err(e),
        };
        if !cmd.has_any_effect() {
            return Ok(false);
        }
        self.execute(Box::new(cmd))?;
        Ok(true)
    }

    /// Drill into the active node if it is a group.
    pub fn enter_active_group(&mut self) -> Result<bool> {
        let Some(group) = self.property.active_node() else {
            return Ok(false);
        };
        match self.property.enter_group(group) {
            Ok(()) => Ok(true),
            Err(SkinError::NotAGroup(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
