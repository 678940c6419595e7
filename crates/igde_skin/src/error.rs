//! Error types for the skin editor core

use igde_core::HandleError;
use thiserror::Error;

use crate::node::NodeId;

/// Skin editor errors
#[derive(Debug, Error)]
pub enum SkinError {
    /// Null handle passed where a node is required
    #[error("Null node handle")]
    NullNode,

    /// Handle does not resolve to a live node
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Child index outside the group's child list
    #[error("Index {index} out of bounds for group with {count} nodes")]
    IndexOutOfBounds { index: usize, count: usize },

    /// Node is not a member of the selection
    #[error("Node is not selected: {0:?}")]
    NotSelected(NodeId),

    /// Node is not a child of the active node group
    #[error("Node is outside the active node group: {0:?}")]
    OutsideActiveGroup(NodeId),

    /// Operation requires a group node
    #[error("Node is not a group: {0:?}")]
    NotAGroup(NodeId),

    /// Node already has a parent or is used as mask
    #[error("Node is already attached: {0:?}")]
    AlreadyAttached(NodeId),

    /// Node is not attached to a group
    #[error("Node has no parent group: {0:?}")]
    Detached(NodeId),

    /// Nodes passed to a structural command do not share one parent group
    #[error("Nodes do not share a parent group")]
    NoSharedParent,

    /// Node already carries a mask
    #[error("Node already has a mask: {0:?}")]
    HasMask(NodeId),

    /// Node has no mask to remove
    #[error("Node has no mask: {0:?}")]
    NoMask(NodeId),

    /// Inserting would make a node its own ancestor
    #[error("Node {node:?} cannot be placed inside its descendant {group:?}")]
    Cycle { node: NodeId, group: NodeId },

    /// Operation requires an image node whose image is loaded
    #[error("Node is not an image with a known size: {0:?}")]
    NoImageSize(NodeId),

    /// The node arena has no free slot left
    #[error("Node storage exhausted")]
    Exhausted,

    /// Command needs at least one node
    #[error("No nodes given")]
    Empty,

    /// Config file I/O failure
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file parse failure
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Config serialization failure
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Clipboard payload could not be (de)serialized
    #[error("Clipboard format error: {0}")]
    Clipboard(#[from] serde_json::Error),
}

impl SkinError {
    /// Programmer errors: the caller passed an argument violating a precondition.
    pub fn is_invalid_argument(&self) -> bool {
        !matches!(
            self,
            SkinError::Exhausted
                | SkinError::Io(_)
                | SkinError::ConfigParse(_)
                | SkinError::ConfigSerialize(_)
                | SkinError::Clipboard(_)
        )
    }

    pub(crate) fn from_handle(error: HandleError, id: NodeId) -> Self {
        match error {
            HandleError::Null => SkinError::NullNode,
            HandleError::Stale | HandleError::OutOfBounds => SkinError::NodeNotFound(id),
            HandleError::Exhausted => SkinError::Exhausted,
        }
    }
}

/// Result type for skin operations
pub type Result<T> = std::result::Result<T, SkinError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_errors_map_to_node_errors() {
        let id = NodeId::new(4, 1);
        assert!(matches!(SkinError::from_handle(HandleError::Null, id), SkinError::NullNode));
        assert!(matches!(
            SkinError::from_handle(HandleError::Stale, id),
            SkinError::NodeNotFound(n) if n == id
        ));

        let exhausted = SkinError::from_handle(HandleError::Exhausted, id);
        assert!(matches!(exhausted, SkinError::Exhausted));
        assert!(!exhausted.is_invalid_argument());
        assert!(SkinError::NodeNotFound(id).is_invalid_argument());
    }
}
