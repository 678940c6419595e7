//! Mask commands.
//!
//! A mask is placed relative to the node it masks instead of the group. Both
//! commands convert the mask's geometry so it stays where it is on screen.

use super::capture::NodeState;
use super::group_commands::shared_parent;
use super::{Command, CommandResult};
use crate::error::{Result, SkinError};
use crate::node::NodeId;
use crate::property::Property;

/// Command to turn a sibling node into the mask of a node.
pub struct SetMask {
    node: NodeId,
    parent: NodeId,
    /// Mask geometry and index in `parent` before masking
    mask: NodeState,
    index: usize,
}

impl SetMask {
    pub fn new(property: &Property, node: NodeId, mask: NodeId) -> Result<Self> {
        if property.node(node)?.mask().is_some() {
            return Err(SkinError::HasMask(node));
        }
        if node == mask {
            return Err(SkinError::Cycle { node: mask, group: node });
        }
        let (parent, entries) = shared_parent(property, &[node, mask])?;
        let index = entries
            .iter()
            .find(|&&(n, _)| n == mask)
            .map(|&(_, index)| index)
            .ok_or(SkinError::Detached(mask))?;
        Ok(Self {
            node,
            parent,
            mask: NodeState::capture(property, mask)?,
            index,
        })
    }
}

impl Command for SetMask {
    fn description(&self) -> &str {
        "Set Node Mask"
    }

    fn execute(&mut self, property: &mut Property) -> CommandResult {
        let mask = self.mask.node;
        self.mask.restore(property)?;
        let matrix = property.parent_transform(mask)? * property.parent_transform(self.node)?.inverse();
        property.remove_node(self.parent, mask)?;
        property.attach_mask(self.node, mask)?;
        property.set_from_matrix(mask, &matrix, self.mask.size, self.mask.rotation)
    }

    fn undo(&mut self, property: &mut Property) -> CommandResult {
        let mask = property.detach_mask(self.node)?;
        self.mask.restore(property)?;
        property.insert_node(self.parent, self.index, mask)
    }
}

/// Command to turn the mask of a node back into a sibling above it.
pub struct RemoveMask {
    node: NodeId,
    parent: NodeId,
    mask: NodeState,
}

impl RemoveMask {
    pub fn new(property: &Property, node: NodeId) -> Result<Self> {
        let data = property.node(node)?;
        let mask = data.mask().ok_or(SkinError::NoMask(node))?;
        let parent = data.parent().ok_or(SkinError::Detached(node))?;
        Ok(Self {
            node,
            parent,
            mask: NodeState::capture(property, mask)?,
        })
    }
}

impl Command for RemoveMask {
    fn description(&self) -> &str {
        "Remove Node Mask"
    }

    fn execute(&mut self, property: &mut Property) -> CommandResult {
        let mask = self.mask.node;
        self.mask.restore(property)?;
        let matrix = property.parent_transform(mask)? * property.parent_transform(self.node)?;
        property.detach_mask(self.node)?;
        property.set_from_matrix(mask, &matrix, self.mask.size, self.mask.rotation)?;
        let index = property
            .index_of(self.parent, self.node)?
            .ok_or(SkinError::Detached(self.node))?;
        property.insert_node(self.parent, index + 1, mask)
    }

    fn undo(&mut self, property: &mut Property) -> CommandResult {
        let mask = self.mask.node;
        property.remove_node(self.parent, mask)?;
        self.mask.restore(property)?;
        property.attach_mask(self.node, mask)
    }
}
