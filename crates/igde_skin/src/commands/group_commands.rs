//! Structural commands: add, remove, paste, group, ungroup and z-order.

use igde_math::{Point3, Vec2};

use super::capture::NodeState;
use super::{Command, CommandResult};
use crate::clipboard::NodeTemplate;
use crate::error::{Result, SkinError};
use crate::node::{NodeId, PropertyNode};
use crate::property::Property;

/// The common parent of `nodes` and each node's index in it, by index.
pub(crate) fn shared_parent(property: &Property, nodes: &[NodeId]) -> Result<(NodeId, Vec<(NodeId, usize)>)> {
    let first = *nodes.first().ok_or(SkinError::Empty)?;
    let parent = property.node(first)?.parent().ok_or(SkinError::Detached(first))?;

    let mut entries = Vec::with_capacity(nodes.len());
    for &node in nodes {
        if property.node(node)?.parent() != Some(parent) {
            return Err(SkinError::NoSharedParent);
        }
        let index = property.index_of(parent, node)?.ok_or(SkinError::Detached(node))?;
        if !entries.iter().any(|&(n, _)| n == node) {
            entries.push((node, index));
        }
    }
    entries.sort_by_key(|&(_, index)| index);
    Ok((parent, entries))
}

fn destroy_detached(property: &mut Property, node: NodeId) {
    if let Err(e) = property.destroy_node(node) {
        log::warn!("Failed to free node {:?}: {}", node, e);
    }
}

/// Command to add a new node to a group.
pub struct AddNode {
    group: NodeId,
    node: NodeId,
    index: usize,
}

impl AddNode {
    /// Store `node` in the property; it is appended to `group` on execute.
    pub fn new(property: &mut Property, group: NodeId, node: PropertyNode) -> Result<Self> {
        let index = property.children(group)?.len();
        let node = property.create_node(node)?;
        Ok(Self { group, node, index })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }
}

impl Command for AddNode {
    fn description(&self) -> &str {
        "Add Node"
    }

    fn execute(&mut self, property: &mut Property) -> CommandResult {
        property.insert_node(self.group, self.index, self.node)?;
        property.set_selection(&[self.node])
    }

    fn undo(&mut self, property: &mut Property) -> CommandResult {
        property.remove_node(self.group, self.node)?;
        Ok(())
    }

    fn release(&mut self, property: &mut Property, applied: bool) {
        if !applied {
            destroy_detached(property, self.node);
        }
    }
}

/// Command to remove sibling nodes.
pub struct RemoveNodes {
    parent: NodeId,
    /// Nodes with their former index, ascending
    entries: Vec<(NodeId, usize)>,
}

impl RemoveNodes {
    pub fn new(property: &Property, nodes: &[NodeId]) -> Result<Self> {
        let (parent, entries) = shared_parent(property, nodes)?;
        Ok(Self { parent, entries })
    }
}

impl Command for RemoveNodes {
    fn description(&self) -> &str {
        "Remove Nodes"
    }

    fn execute(&mut self, property: &mut Property) -> CommandResult {
        for &(node, _) in self.entries.iter().rev() {
            property.remove_node(self.parent, node)?;
        }
        Ok(())
    }

    fn undo(&mut self, property: &mut Property) -> CommandResult {
        for &(node, index) in &self.entries {
            property.insert_node(self.parent, index, node)?;
        }
        let nodes: Vec<NodeId> = self.entries.iter().map(|&(n, _)| n).collect();
        property.set_selection(&nodes)
    }

    fn release(&mut self, property: &mut Property, applied: bool) {
        if applied {
            for &(node, _) in &self.entries {
                destroy_detached(property, node);
            }
        }
    }
}

/// Command to paste clipboard templates into a group.
///
/// Pasted nodes keep their relative layers; the lowest one lands on the
/// layer given at construction.
pub struct PasteNodes {
    group: NodeId,
    nodes: Vec<NodeId>,
    index: usize,
}

impl PasteNodes {
    pub fn new(property: &mut Property, group: NodeId, templates: &[NodeTemplate], layer: i32) -> Result<Self> {
        if templates.is_empty() {
            return Err(SkinError::Empty);
        }
        let index = property.children(group)?.len();
        let min_layer = templates
            .iter()
            .map(|t| t.position.z)
            .min()
            .unwrap_or(layer);
        let shift = layer - min_layer;

        let mut nodes = Vec::with_capacity(templates.len());
        for template in templates {
            let node = template.instantiate(property)?;
            // layers are absolute, so children and masks shift along
            for id in property.subtree(node)? {
                let position = property.node(id)?.position();
                property.set_position(id, position + Point3::new(0, 0, shift))?;
            }
            nodes.push(node);
        }
        Ok(Self { group, nodes, index })
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }
}

impl Command for PasteNodes {
    fn description(&self) -> &str {
        "Paste Nodes"
    }

    fn execute(&mut self, property: &mut Property) -> CommandResult {
        for (offset, &node) in self.nodes.iter().enumerate() {
            property.insert_node(self.group, self.index + offset, node)?;
        }
        property.set_selection(&self.nodes)
    }

    fn undo(&mut self, property: &mut Property) -> CommandResult {
        for &node in self.nodes.iter().rev() {
            property.remove_node(self.group, node)?;
        }
        Ok(())
    }

    fn release(&mut self, property: &mut Property, applied: bool) {
        if !applied {
            for &node in &self.nodes {
                destroy_detached(property, node);
            }
        }
    }
}

/// Command to wrap sibling nodes into a new group.
///
/// The group covers the bounding box of the nodes in their parent's space
/// and sits where the lowest of them was. The nodes keep their screen
/// placement.
pub struct GroupNodes {
    parent: NodeId,
    /// Nodes with their index in `parent`, ascending
    entries: Vec<(NodeId, usize)>,
    positions: Vec<Point3>,
    /// Created on first execute, reused on redo
    group: Option<NodeId>,
}

impl GroupNodes {
    pub fn new(property: &Property, nodes: &[NodeId]) -> Result<Self> {
        let (parent, entries) = shared_parent(property, nodes)?;
        let positions = entries
            .iter()
            .map(|&(node, _)| Ok(property.node(node)?.position()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            parent,
            entries,
            positions,
            group: None,
        })
    }

    pub fn group(&self) -> Option<NodeId> {
        self.group
    }

    fn create_group(&self, property: &mut Property) -> Result<NodeId> {
        let mut min = Vec2::new(f32::MAX, f32::MAX);
        let mut max = Vec2::new(f32::MIN, f32::MIN);
        let mut min_layer = i32::MAX;
        let mut max_layer = i32::MIN;

        for &(node, _) in &self.entries {
            let data = property.node(node)?;
            let matrix = data.parent_transform();
            let extent = data.size().abs().xy();
            for corner in [
                Vec2::ZERO,
                Vec2::new(extent.x, 0.0),
                Vec2::new(0.0, extent.y),
                extent,
            ] {
                let p = matrix * corner;
                min = min.min(p);
                max = max.max(p);
            }
            min_layer = min_layer.min(data.position().z);
            max_layer = max_layer.max(data.position().z + data.size().z.max(1));
        }

        let origin = min.floor();
        let end = max.ceil();
        let group = PropertyNode::group()
            .with_position(Point3::new(origin.x, origin.y, min_layer))
            .with_size(Point3::new(end.x - origin.x, end.y - origin.y, max_layer - min_layer));
        log::info!(
            "Grouping {} nodes at ({}, {}) size {}x{}",
            self.entries.len(),
            origin.x,
            origin.y,
            end.x - origin.x,
            end.y - origin.y
        );
        property.create_node(group)
    }
}

impl Command for GroupNodes {
    fn description(&self) -> &str {
        "Group Nodes"
    }

    fn execute(&mut self, property: &mut Property) -> CommandResult {
        let group = match self.group {
            Some(group) => group,
            None => {
                let group = self.create_group(property)?;
                self.group = Some(group);
                group
            }
        };
        let offset = property.node(group)?.position();
        let offset = Point3::new(offset.x, offset.y, 0);

        for &(node, _) in self.entries.iter().rev() {
            property.remove_node(self.parent, node)?;
        }
        let index = self.entries.first().map_or(0, |&(_, index)| index);
        property.insert_node(self.parent, index, group)?;

        for (&(node, _), &position) in self.entries.iter().zip(&self.positions) {
            property.set_position(node, position - offset)?;
            property.add_node(group, node)?;
        }
        property.set_selection(&[group])
    }

    fn undo(&mut self, property: &mut Property) -> CommandResult {
        let group = self.group.ok_or(SkinError::Empty)?;
        for &(node, _) in self.entries.iter().rev() {
            property.remove_node(group, node)?;
        }
        property.remove_node(self.parent, group)?;

        for (&(node, index), &position) in self.entries.iter().zip(&self.positions) {
            property.set_position(node, position)?;
            property.insert_node(self.parent, index, node)?;
        }
        let nodes: Vec<NodeId> = self.entries.iter().map(|&(n, _)| n).collect();
        property.set_selection(&nodes)
    }

    fn release(&mut self, property: &mut Property, applied: bool) {
        if let (Some(group), false) = (self.group, applied) {
            destroy_detached(property, group);
        }
    }
}

/// Command to dissolve a group into its parent.
///
/// Children keep their screen placement and take the group's place in the
/// parent's child order.
pub struct UngroupNodes {
    parent: NodeId,
    group: NodeId,
    index: usize,
    children: Vec<NodeState>,
}

impl UngroupNodes {
    pub fn new(property: &Property, group: NodeId) -> Result<Self> {
        let (parent, entries) = shared_parent(property, &[group])?;
        let children = property
            .children(group)?
            .iter()
            .map(|&child| NodeState::capture(property, child))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            parent,
            group,
            index: entries[0].1,
            children,
        })
    }
}

impl Command for UngroupNodes {
    fn description(&self) -> &str {
        "Ungroup Nodes"
    }

    fn execute(&mut self, property: &mut Property) -> CommandResult {
        let group_transform = property.parent_transform(self.group)?;
        property.remove_node(self.parent, self.group)?;

        let mut nodes = Vec::with_capacity(self.children.len());
        for (offset, state) in self.children.iter().enumerate() {
            state.restore(property)?;
            let matrix = property.parent_transform(state.node)? * group_transform;
            property.remove_node(self.group, state.node)?;
            property.set_from_matrix(state.node, &matrix, state.size, state.rotation)?;
            property.insert_node(self.parent, self.index + offset, state.node)?;
            nodes.push(state.node);
        }
        property.set_selection(&nodes)
    }

    fn undo(&mut self, property: &mut Property) -> CommandResult {
        for state in self.children.iter().rev() {
            property.remove_node(self.parent, state.node)?;
        }
        for state in &self.children {
            state.restore(property)?;
            property.add_node(self.group, state.node)?;
        }
        property.insert_node(self.parent, self.index, self.group)?;
        property.set_selection(&[self.group])
    }

    fn release(&mut self, property: &mut Property, applied: bool) {
        if applied {
            destroy_detached(property, self.group);
        }
    }
}

/// Direction of a z-order change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReorderKind {
    /// Paint above all siblings
    Top,
    /// One step towards the top
    Up,
    /// One step towards the bottom
    Down,
    /// Paint below all siblings
    Bottom,
}

/// Command to change the paint order of sibling nodes.
pub struct ReorderNodes {
    parent: NodeId,
    kind: ReorderKind,
    old_order: Vec<NodeId>,
    new_order: Vec<NodeId>,
}

impl ReorderNodes {
    pub fn new(property: &Property, nodes: &[NodeId], kind: ReorderKind) -> Result<Self> {
        let (parent, entries) = shared_parent(property, nodes)?;
        let old_order = property.children(parent)?.to_vec();
        let moved = |n: &NodeId| entries.iter().any(|(m, _)| m == n);

        let new_order = match kind {
            ReorderKind::Top => {
                let (mut order, top): (Vec<_>, Vec<_>) = old_order.iter().copied().partition(|n| !moved(n));
                order.extend(top);
                order
            }
            ReorderKind::Bottom => {
                let (mut order, rest): (Vec<_>, Vec<_>) = old_order.iter().copied().partition(|n| moved(n));
                order.extend(rest);
                order
            }
            ReorderKind::Up => {
                let mut order = old_order.clone();
                for i in (0..order.len().saturating_sub(1)).rev() {
                    if moved(&order[i]) && !moved(&order[i + 1]) {
                        order.swap(i, i + 1);
                    }
                }
                order
            }
            ReorderKind::Down => {
                let mut order = old_order.clone();
                for i in 1..order.len() {
                    if moved(&order[i]) && !moved(&order[i - 1]) {
                        order.swap(i, i - 1);
                    }
                }
                order
            }
        };

        Ok(Self {
            parent,
            kind,
            old_order,
            new_order,
        })
    }

    /// Whether executing changes the child order at all.
    pub fn has_any_effect(&self) -> bool {
        self.old_order != self.new_order
    }
}

impl Command for ReorderNodes {
    fn description(&self) -> &str {
        match self.kind {
            ReorderKind::Top => "Move Nodes To Top",
            ReorderKind::Up => "Move Nodes Up",
            ReorderKind::Down => "Move Nodes Down",
            ReorderKind::Bottom => "Move Nodes To Bottom",
        }
    }

    fn execute(&mut self, property: &mut Property) -> CommandResult {
        property.set_child_order(self.parent, &self.new_order)
    }

    fn undo(&mut self, property: &mut Property) -> CommandResult {
        property.set_child_order(self.parent, &self.old_order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ShapeType;

    fn shape(x: i32, y: i32) -> PropertyNode {
        PropertyNode::shape(ShapeType::Rectangle)
            .with_position(Point3::new(x, y, 0))
            .with_size(Point3::new(10, 10, 1))
    }

    fn setup(count: usize) -> (Property, Vec<NodeId>) {
        let mut property = Property::new("color", Point3::new(256, 256, 1));
        let root = property.root();
        let nodes = (0..count)
            .map(|i| {
                let id = property.create_node(shape(i as i32 * 20, 5)).unwrap();
                property.add_node(root, id).unwrap();
                id
            })
            .collect();
        (property, nodes)
    }

    #[test]
    fn test_reorder_orders() {
        let (property, n) = setup(4);
        let order = |kind, nodes: &[NodeId]| ReorderNodes::new(&property, nodes, kind).unwrap().new_order;

        assert_eq!(order(ReorderKind::Top, &[n[0], n[2]]), vec![n[1], n[3], n[0], n[2]]);
        assert_eq!(order(ReorderKind::Bottom, &[n[3], n[1]]), vec![n[1], n[3], n[0], n[2]]);
        assert_eq!(order(ReorderKind::Up, &[n[0], n[1]]), vec![n[2], n[0], n[1], n[3]]);
        assert_eq!(order(ReorderKind::Down, &[n[2]]), vec![n[0], n[2], n[1], n[3]]);
    }

    #[test]
    fn test_reorder_without_effect() {
        let (property, n) = setup(3);
        assert!(!ReorderNodes::new(&property, &[n[0]], ReorderKind::Bottom).unwrap().has_any_effect());
        assert!(!ReorderNodes::new(&property, &[n[0]], ReorderKind::Down).unwrap().has_any_effect());
        assert!(!ReorderNodes::new(&property, &[n[2]], ReorderKind::Top).unwrap().has_any_effect());
        assert!(!ReorderNodes::new(&property, &[n[1], n[2]], ReorderKind::Up).unwrap().has_any_effect());
        assert!(ReorderNodes::new(&property, &[n[1]], ReorderKind::Up).unwrap().has_any_effect());
    }

    #[test]
    fn test_nodes_must_share_parent() {
        let (mut property, n) = setup(2);
        let group = property.create_node(PropertyNode::group()).unwrap();
        let root = property.root();
        property.add_node(root, group).unwrap();
        let inner = property.create_node(shape(0, 0)).unwrap();
        property.add_node(group, inner).unwrap();

        assert!(matches!(GroupNodes::new(&property, &[n[0], inner]), Err(SkinError::NoSharedParent)));
        assert!(matches!(RemoveNodes::new(&property, &[]), Err(SkinError::Empty)));
    }

    #[test]
    fn test_group_bounds_and_rebase() {
        let (mut property, n) = setup(3);
        let root = property.root();
        let mut cmd = GroupNodes::new(&property, &[n[2], n[0]]).unwrap();
        cmd.execute(&mut property).unwrap();

        let group = cmd.group().unwrap();
        assert_eq!(property.children(root).unwrap(), &[group, n[1]]);
        assert_eq!(property.children(group).unwrap(), &[n[0], n[2]]);

        let data = property.node(group).unwrap();
        assert_eq!(data.position(), Point3::new(0, 5, 0));
        assert_eq!(data.size(), Point3::new(50, 10, 1));
        assert_eq!(property.node(n[2]).unwrap().position(), Point3::new(40, 0, 0));
        assert_eq!(property.selection().selected(), &[group]);

        let screen = property.screen_transform(n[2]).unwrap().position();
        assert_eq!((screen.x, screen.y), (40.0, 5.0));
    }

    #[test]
    fn test_remove_and_release() {
        let (mut property, n) = setup(3);
        let root = property.root();
        let mut cmd = RemoveNodes::new(&property, &[n[1], n[0]]).unwrap();
        cmd.execute(&mut property).unwrap();
        assert_eq!(property.children(root).unwrap(), &[n[2]]);

        cmd.undo(&mut property).unwrap();
        assert_eq!(property.children(root).unwrap(), &[n[0], n[1], n[2]]);

        cmd.execute(&mut property).unwrap();
        cmd.release(&mut property, true);
        assert!(!property.contains(n[0]));
        assert!(!property.contains(n[1]));
    }

    #[test]
    fn test_add_node_selects_and_releases_unapplied() {
        let (mut property, _) = setup(1);
        let root = property.root();
        let mut cmd = AddNode::new(&mut property, root, PropertyNode::text("Title")).unwrap();
        cmd.execute(&mut property).unwrap();
        assert_eq!(property.selection().selected(), &[cmd.node()]);
        assert_eq!(property.children(root).unwrap().len(), 2);

        cmd.undo(&mut property).unwrap();
        assert!(property.selection().is_empty());
        cmd.release(&mut property, false);
        assert!(!property.contains(cmd.node()));
    }
}
