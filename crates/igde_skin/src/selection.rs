//! Node selection with an active node.
//!
//! Modifier handling follows the usual editor conventions:
//! - Click: Replace selection
//! - Shift+Click: Toggle selection

use crate::error::{Result, SkinError};
use crate::node::NodeId;

/// Selection mode based on modifier keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Replace current selection (normal click)
    #[default]
    Replace,
    /// Add to current selection
    Add,
    /// Remove from current selection
    Remove,
    /// Toggle selection state (Shift+click)
    Toggle,
}

impl SelectionMode {
    /// Determine selection mode from modifier keys.
    pub fn from_modifiers(shift: bool) -> Self {
        if shift {
            Self::Toggle
        } else {
            Self::Replace
        }
    }
}

/// Set of selected nodes plus the active node.
///
/// The active node is always a member of the selection or `None`. Adding to
/// an empty selection activates the added node; removing the active node
/// activates the first remaining one.
#[derive(Clone, Debug, Default)]
pub struct NodeSelection {
    /// Selected nodes in selection order
    selected: Vec<NodeId>,
    active: Option<NodeId>,
    /// Whether selection has changed since last check
    dirty: bool,
}

impl NodeSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &[NodeId] {
        &self.selected
    }

    pub fn active(&self) -> Option<NodeId> {
        self.active
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.selected.contains(&id)
    }

    /// Check and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Add a node; adding a member again does nothing.
    pub fn add(&mut self, id: NodeId) -> Result<()> {
        if id.is_null() {
            return Err(SkinError::NullNode);
        }
        if self.selected.contains(&id) {
            return Ok(());
        }
        self.selected.push(id);
        if self.active.is_none() {
            self.active = Some(id);
        }
        self.dirty = true;
        Ok(())
    }

    /// Remove a node; removing a non-member does nothing.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        if id.is_null() {
            return Err(SkinError::NullNode);
        }
        let count = self.selected.len();
        self.selected.retain(|&n| n != id);
        if self.selected.len() == count {
            return Ok(());
        }
        if self.active == Some(id) {
            self.active = self.selected.first().copied();
        }
        self.dirty = true;
        Ok(())
    }

    pub fn remove_all(&mut self) {
        if !self.selected.is_empty() {
            self.selected.clear();
            self.active = None;
            self.dirty = true;
        }
    }

    /// Make a member the active node, or clear the active node.
    pub fn set_active(&mut self, id: Option<NodeId>) -> Result<()> {
        match id {
            Some(id) if id.is_null() => return Err(SkinError::NullNode),
            Some(id) if !self.selected.contains(&id) => return Err(SkinError::NotSelected(id)),
            _ => {}
        }
        if self.active != id {
            self.active = id;
            self.dirty = true;
        }
        Ok(())
    }

    /// Select a node with the given mode; the node becomes active unless removed.
    pub fn select(&mut self, id: NodeId, mode: SelectionMode) -> Result<()> {
        match mode {
            SelectionMode::Replace => {
                if id.is_null() {
                    return Err(SkinError::NullNode);
                }
                self.remove_all();
                self.add(id)
            }
            SelectionMode::Add => {
                self.add(id)?;
                self.set_active(Some(id))
            }
            SelectionMode::Remove => self.remove(id),
            SelectionMode::Toggle => {
                if self.contains(id) {
                    self.remove(id)
                } else {
                    self.add(id)?;
                    self.set_active(Some(id))
                }
            }
        }
    }

    /// Replace the selection with the given nodes; the first becomes active.
    pub fn set(&mut self, ids: &[NodeId]) -> Result<()> {
        self.remove_all();
        for &id in ids {
            self.add(id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(index: u32) -> NodeId {
        NodeId::new(index, 0)
    }

    #[test]
    fn test_first_add_activates() {
        let mut sel = NodeSelection::new();
        sel.add(id(1)).unwrap();
        sel.add(id(2)).unwrap();
        assert_eq!(sel.active(), Some(id(1)));
        assert_eq!(sel.len(), 2);
        assert!(sel.take_dirty());
        assert!(!sel.take_dirty());
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut sel = NodeSelection::new();
        sel.add(id(1)).unwrap();
        sel.take_dirty();
        sel.add(id(1)).unwrap();
        assert_eq!(sel.len(), 1);
        assert!(!sel.take_dirty());
    }

    #[test]
    fn test_remove_active_reassigns() {
        let mut sel = NodeSelection::new();
        sel.set(&[id(1), id(2), id(3)]).unwrap();
        sel.remove(id(1)).unwrap();
        assert_eq!(sel.active(), Some(id(2)));
        sel.remove(id(2)).unwrap();
        sel.remove(id(3)).unwrap();
        assert_eq!(sel.active(), None);
        assert!(sel.is_empty());
    }

    #[test]
    fn test_set_active_requires_membership() {
        let mut sel = NodeSelection::new();
        sel.add(id(1)).unwrap();
        assert!(matches!(sel.set_active(Some(id(9))), Err(SkinError::NotSelected(_))));
        assert!(matches!(sel.set_active(Some(NodeId::null())), Err(SkinError::NullNode)));
        assert!(matches!(sel.add(NodeId::null()), Err(SkinError::NullNode)));
        sel.set_active(None).unwrap();
        assert_eq!(sel.active(), None);
    }

    #[test]
    fn test_toggle() {
        let mut sel = NodeSelection::new();
        sel.select(id(1), SelectionMode::Replace).unwrap();
        sel.select(id(2), SelectionMode::Toggle).unwrap();
        assert_eq!(sel.active(), Some(id(2)));
        sel.select(id(2), SelectionMode::Toggle).unwrap();
        assert_eq!(sel.selected(), &[id(1)]);
        assert_eq!(sel.active(), Some(id(1)));
    }
}
