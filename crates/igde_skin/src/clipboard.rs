//! Node clipboard.
//!
//! Copying deep-clones node subtrees, masks included, into templates that
//! do not reference the property. Pasting instantiates fresh nodes from
//! them, so the same clip can be pasted any number of times.

use igde_math::Point3;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::node::{NodeId, NodeKind, PropertyNode};
use crate::property::Property;

/// Detached copy of a node subtree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeTemplate {
    pub kind: NodeKind,
    pub position: Point3,
    pub size: Point3,
    pub rotation: f32,
    pub shearing: f32,
    pub transparency: f32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeTemplate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<Box<NodeTemplate>>,
}

impl NodeTemplate {
    /// Copy a node with its children and mask.
    pub fn copy(property: &Property, node: NodeId) -> Result<Self> {
        let data = property.node(node)?;
        let children = data
            .children()
            .iter()
            .map(|&child| Self::copy(property, child))
            .collect::<Result<Vec<_>>>()?;
        let mask = data
            .mask()
            .map(|mask| Self::copy(property, mask).map(Box::new))
            .transpose()?;

        let mut kind = data.kind().clone();
        if let NodeKind::Group(group) = &mut kind {
            group.children.clear();
        }
        Ok(Self {
            kind,
            position: data.position(),
            size: data.size(),
            rotation: data.rotation(),
            shearing: data.shearing(),
            transparency: data.transparency(),
            children,
            mask,
        })
    }

    /// Create detached nodes for this template, returning the top node.
    pub fn instantiate(&self, property: &mut Property) -> Result<NodeId> {
        let mut node = PropertyNode::new(self.kind.clone())
            .with_position(self.position)
            .with_size(self.size)
            .with_rotation(self.rotation)
            .with_shearing(self.shearing);
        node.set_transparency(self.transparency);
        let id = property.create_node(node)?;

        for child in &self.children {
            let child = child.instantiate(property)?;
            property.add_node(id, child)?;
        }
        if let Some(mask) = &self.mask {
            let mask = mask.instantiate(property)?;
            property.attach_mask(id, mask)?;
        }
        Ok(id)
    }
}

/// Copied nodes waiting to be pasted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Clipboard {
    templates: Vec<NodeTemplate>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the clip with copies of `nodes`.
    pub fn copy(&mut self, property: &Property, nodes: &[NodeId]) -> Result<()> {
        self.templates = nodes
            .iter()
            .map(|&node| NodeTemplate::copy(property, node))
            .collect::<Result<Vec<_>>>()?;
        log::debug!("Copied {} nodes", self.templates.len());
        Ok(())
    }

    pub fn templates(&self) -> &[NodeTemplate] {
        &self.templates
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn clear(&mut self) {
        self.templates.clear();
    }

    /// Serialize the clip for the system clipboard.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
