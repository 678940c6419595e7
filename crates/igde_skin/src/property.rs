//! A constructed skin property: node tree, editing scope and selection.
//!
//! All nodes live in one arena owned by the property. Groups reference
//! their children by [`NodeId`], every node references its owning group (or
//! the node it masks), so the tree can be walked both ways without shared
//! pointers. Nodes removed from the tree stay in the arena, detached, until
//! [`Property::destroy_node`] frees them; undo commands rely on this to
//! re-insert removed nodes.

use igde_core::HandleMap;
use igde_math::{Point3, TexMatrix2, Vec2};

use crate::error::{Result, SkinError};
use crate::node::{NodeId, PropertyNode};
use crate::notify::{EventQueue, PropertyEvent};
use crate::selection::{NodeSelection, SelectionMode};

/// One constructed property of a skin texture.
pub struct Property {
    name: String,
    nodes: HandleMap<PropertyNode>,
    root: NodeId,
    active_layer: i32,
    /// Group the user drilled into, `None` edits the root group
    active_group: Option<NodeId>,
    selection: NodeSelection,
    events: EventQueue,
}

impl Property {
    /// Create a property whose root group covers `size` (`z` is the layer count).
    pub fn new(name: impl Into<String>, size: Point3) -> Self {
        let (nodes, root) = HandleMap::with_first(PropertyNode::group().with_size(size));
        Self {
            name: name.into(),
            nodes,
            root,
            active_layer: 0,
            active_group: None,
            selection: NodeSelection::new(),
            events: EventQueue::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The root node group spanning the whole constructed image
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Result<&PropertyNode> {
        self.nodes.get(id).map_err(|e| SkinError::from_handle(e, id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut PropertyNode> {
        self.nodes.get_mut(id).map_err(|e| SkinError::from_handle(e, id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id)
    }

    /// Number of nodes in the arena, attached or not
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn notify(&mut self, event: PropertyEvent) {
        self.events.push(event);
    }

    /// Drain pending change notifications.
    pub fn take_events(&mut self) -> Vec<PropertyEvent> {
        if self.selection.take_dirty() {
            self.events.push(PropertyEvent::SelectionChanged);
        }
        self.events.drain()
    }

    // ========================================================================
    // Arena
    // ========================================================================

    /// Store a node without attaching it to the tree.
    pub fn create_node(&mut self, node: PropertyNode) -> Result<NodeId> {
        self.nodes
            .insert(node.detached_copy())
            .map_err(|e| SkinError::from_handle(e, NodeId::null()))
    }

    /// Free a detached node together with its children and masks.
    pub fn destroy_node(&mut self, id: NodeId) -> Result<()> {
        if id == self.root || self.node(id)?.is_attached() {
            return Err(SkinError::AlreadyAttached(id));
        }
        let doomed = self.subtree(id)?;
        for &node in &doomed {
            self.forget(node);
        }
        for node in doomed {
            self.nodes.remove(node).map_err(|e| SkinError::from_handle(e, node))?;
        }
        log::debug!("Destroyed node {:?}", id);
        Ok(())
    }

    /// The node followed by its mask and children, recursively, owners first.
    pub fn subtree(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        self.collect_subtree(id, &mut out)?;
        Ok(out)
    }

    fn collect_subtree(&self, id: NodeId, out: &mut Vec<NodeId>) -> Result<()> {
        let node = self.node(id)?;
        out.push(id);
        if let Some(mask) = node.mask() {
            self.collect_subtree(mask, out)?;
        }
        for &child in node.children() {
            self.collect_subtree(child, out)?;
        }
        Ok(())
    }

    /// Whether `ancestor` is found walking up the owner chain of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.node(id).ok().and_then(PropertyNode::owner);
        for _ in 0..self.nodes.len() {
            match current {
                Some(owner) if owner == ancestor => return true,
                Some(owner) => current = self.node(owner).ok().and_then(PropertyNode::owner),
                None => return false,
            }
        }
        false
    }

    /// Drop a node from selection and editing scope after it left the tree.
    fn forget(&mut self, id: NodeId) {
        if self.selection.contains(id) {
            let _ = self.selection.remove(id);
        }
        if self.active_group == Some(id) {
            self.active_group = None;
            self.events.push(PropertyEvent::ActiveGroupChanged);
        }
    }

    fn forget_subtree(&mut self, id: NodeId) -> Result<()> {
        for node in self.subtree(id)? {
            self.forget(node);
        }
        Ok(())
    }

    // ========================================================================
    // Groups
    // ========================================================================

    pub fn children(&self, group: NodeId) -> Result<&[NodeId]> {
        let node = self.node(group)?;
        if !node.is_group() {
            return Err(SkinError::NotAGroup(group));
        }
        Ok(node.children())
    }

    pub fn node_at(&self, group: NodeId, index: usize) -> Result<NodeId> {
        let children = self.children(group)?;
        children.get(index).copied().ok_or(SkinError::IndexOutOfBounds {
            index,
            count: children.len(),
        })
    }

    pub fn index_of(&self, group: NodeId, node: NodeId) -> Result<Option<usize>> {
        Ok(self.children(group)?.iter().position(|&n| n == node))
    }

    fn children_mut(&mut self, group: NodeId) -> Result<&mut Vec<NodeId>> {
        self.node_mut(group)?
            .children_mut()
            .ok_or(SkinError::NotAGroup(group))
    }

    /// Insert a detached node into a group at `index` (`index == len` appends).
    pub fn insert_node(&mut self, group: NodeId, index: usize, node: NodeId) -> Result<()> {
        let count = self.children(group)?.len();
        if index > count {
            return Err(SkinError::IndexOutOfBounds { index, count });
        }
        if node == self.root || self.node(node)?.is_attached() {
            return Err(SkinError::AlreadyAttached(node));
        }
        if node == group || self.is_ancestor(node, group) {
            return Err(SkinError::Cycle { node, group });
        }

        self.node_mut(node)?.set_parent(Some(group));
        self.children_mut(group)?.insert(index, node);
        self.events.push(PropertyEvent::StructureChanged(group));
        Ok(())
    }

    /// Append a detached node to a group.
    pub fn add_node(&mut self, group: NodeId, node: NodeId) -> Result<()> {
        let count = self.children(group)?.len();
        self.insert_node(group, count, node)
    }

    /// Detach a node from its group, returning the index it had.
    pub fn remove_node(&mut self, group: NodeId, node: NodeId) -> Result<usize> {
        let index = self
            .index_of(group, node)?
            .ok_or(SkinError::Detached(node))?;
        self.children_mut(group)?.remove(index);
        self.node_mut(node)?.set_parent(None);
        self.forget_subtree(node)?;
        self.events.push(PropertyEvent::StructureChanged(group));
        Ok(index)
    }

    /// Move a child to `new_index`, keeping the order of all other children.
    pub fn move_node(&mut self, group: NodeId, node: NodeId, new_index: usize) -> Result<()> {
        let count = self.children(group)?.len();
        if new_index >= count {
            return Err(SkinError::IndexOutOfBounds { index: new_index, count });
        }
        let index = self
            .index_of(group, node)?
            .ok_or(SkinError::Detached(node))?;
        if index == new_index {
            return Ok(());
        }
        let children = self.children_mut(group)?;
        children.remove(index);
        children.insert(new_index, node);
        self.events.push(PropertyEvent::StructureChanged(group));
        Ok(())
    }

    /// Replace the child order of a group with a permutation of its children.
    pub(crate) fn set_child_order(&mut self, group: NodeId, order: &[NodeId]) -> Result<()> {
        let children = self.children(group)?;
        if children.len() != order.len() {
            return Err(SkinError::NoSharedParent);
        }
        if let Some(&stranger) = order.iter().find(|n| !children.contains(n)) {
            return Err(SkinError::Detached(stranger));
        }
        if children == order {
            return Ok(());
        }
        *self.children_mut(group)? = order.to_vec();
        self.events.push(PropertyEvent::StructureChanged(group));
        Ok(())
    }

    // ========================================================================
    // Masks
    // ========================================================================

    /// Use a detached node as mask of `node`.
    pub fn attach_mask(&mut self, node: NodeId, mask: NodeId) -> Result<()> {
        if self.node(node)?.mask().is_some() {
            return Err(SkinError::HasMask(node));
        }
        if mask == self.root || self.node(mask)?.is_attached() {
            return Err(SkinError::AlreadyAttached(mask));
        }
        if mask == node || self.is_ancestor(mask, node) {
            return Err(SkinError::Cycle { node: mask, group: node });
        }
        self.node_mut(node)?.set_mask_link(Some(mask));
        self.node_mut(mask)?.set_mask_owner(Some(node));
        self.events.push(PropertyEvent::MaskChanged(node));
        Ok(())
    }

    /// Unlink the mask of `node`, leaving it detached.
    pub fn detach_mask(&mut self, node: NodeId) -> Result<NodeId> {
        let mask = self.node(node)?.mask().ok_or(SkinError::NoMask(node))?;
        self.node_mut(node)?.set_mask_link(None);
        self.node_mut(mask)?.set_mask_owner(None);
        self.forget_subtree(mask)?;
        self.events.push(PropertyEvent::MaskChanged(node));
        Ok(mask)
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    fn changed(&mut self, id: NodeId, changed: bool) {
        if changed {
            self.events.push(PropertyEvent::NodeChanged(id));
        }
    }

    pub fn set_position(&mut self, id: NodeId, position: Point3) -> Result<()> {
        let changed = self.node_mut(id)?.set_position(position);
        self.changed(id, changed);
        Ok(())
    }

    pub fn set_size(&mut self, id: NodeId, size: Point3) -> Result<()> {
        let changed = self.node_mut(id)?.set_size(size);
        self.changed(id, changed);
        Ok(())
    }

    pub fn set_rotation(&mut self, id: NodeId, rotation: f32) -> Result<()> {
        let changed = self.node_mut(id)?.set_rotation(rotation);
        self.changed(id, changed);
        Ok(())
    }

    pub fn set_shearing(&mut self, id: NodeId, shearing: f32) -> Result<()> {
        let changed = self.node_mut(id)?.set_shearing(shearing);
        self.changed(id, changed);
        Ok(())
    }

    pub fn set_transparency(&mut self, id: NodeId, transparency: f32) -> Result<()> {
        let changed = self.node_mut(id)?.set_transparency(transparency);
        self.changed(id, changed);
        Ok(())
    }

    /// See [`PropertyNode::set_from_matrix`].
    pub fn set_from_matrix(
        &mut self,
        id: NodeId,
        matrix: &TexMatrix2,
        reference_size: Point3,
        reference_rotation: f32,
    ) -> Result<()> {
        let changed = self
            .node_mut(id)?
            .set_from_matrix(matrix, reference_size, reference_rotation);
        self.changed(id, changed);
        Ok(())
    }

    pub(crate) fn restore_geometry(
        &mut self,
        id: NodeId,
        position: Point3,
        size: Point3,
        rotation: f32,
        shearing: f32,
    ) -> Result<()> {
        self.node_mut(id)?.restore_geometry(position, size, rotation, shearing);
        self.events.push(PropertyEvent::NodeChanged(id));
        Ok(())
    }

    pub fn canvas_transform(&self, id: NodeId) -> Result<TexMatrix2> {
        Ok(self.node(id)?.canvas_transform())
    }

    pub fn parent_transform(&self, id: NodeId) -> Result<TexMatrix2> {
        Ok(self.node(id)?.parent_transform())
    }

    /// Map node-local pixels to constructed image pixels.
    ///
    /// Composes the node's parent transform with those of every owner up to
    /// the root; a mask is placed relative to the node it masks.
    pub fn screen_transform(&self, id: NodeId) -> Result<TexMatrix2> {
        let node = self.node(id)?;
        let mut matrix = node.parent_transform();
        let mut owner = node.owner();
        let mut depth = 0;
        while let Some(current) = owner {
            depth += 1;
            if depth > self.nodes.len() {
                log::error!("Owner chain of {:?} does not terminate", id);
                break;
            }
            let node = self.node(current)?;
            matrix *= node.parent_transform();
            owner = node.owner();
        }
        Ok(matrix)
    }

    /// Screen transform of the node's owner, identity for unowned nodes.
    pub fn owner_screen_transform(&self, id: NodeId) -> Result<TexMatrix2> {
        match self.node(id)?.owner() {
            Some(owner) => self.screen_transform(owner),
            None => Ok(TexMatrix2::IDENTITY),
        }
    }

    // ========================================================================
    // Editing scope
    // ========================================================================

    pub fn active_layer(&self) -> i32 {
        self.active_layer
    }

    pub fn set_active_layer(&mut self, layer: i32) {
        if self.active_layer != layer {
            self.active_layer = layer;
            self.events.push(PropertyEvent::ActiveLayerChanged);
        }
    }

    pub fn active_group(&self) -> Option<NodeId> {
        self.active_group
    }

    /// The group new nodes go to and hit tests run in.
    pub fn scope_group(&self) -> NodeId {
        self.active_group.unwrap_or(self.root)
    }

    /// Set the group being edited; `None` or the root edits the root group.
    pub fn set_active_group(&mut self, group: Option<NodeId>) -> Result<()> {
        let group = group.filter(|&g| g != self.root);
        if let Some(group) = group {
            if !self.node(group)?.is_group() {
                return Err(SkinError::NotAGroup(group));
            }
            if !self.is_ancestor(self.root, group) {
                return Err(SkinError::Detached(group));
            }
        }
        if self.active_group != group {
            self.active_group = group;
            self.events.push(PropertyEvent::ActiveGroupChanged);
        }
        Ok(())
    }

    /// Drill into a group of the current scope, clearing the selection.
    pub fn enter_group(&mut self, group: NodeId) -> Result<()> {
        if self.node(group)?.parent() != Some(self.scope_group()) {
            return Err(SkinError::OutsideActiveGroup(group));
        }
        if !self.node(group)?.is_group() {
            return Err(SkinError::NotAGroup(group));
        }
        self.selection.remove_all();
        self.set_active_group(Some(group))
    }

    /// Leave the active group, selecting it in the enclosing scope.
    ///
    /// Returns `false` if already editing the root group.
    pub fn exit_group(&mut self) -> Result<bool> {
        let Some(group) = self.active_group else {
            return Ok(false);
        };
        let parent = self.node(group)?.parent();
        self.selection.remove_all();
        self.set_active_group(parent)?;
        self.selection.add(group)?;
        Ok(true)
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn selection(&self) -> &NodeSelection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut NodeSelection {
        &mut self.selection
    }

    /// Select a child of the active group.
    pub fn select(&mut self, id: NodeId, mode: SelectionMode) -> Result<()> {
        if self.node(id)?.parent() != Some(self.scope_group()) {
            return Err(SkinError::OutsideActiveGroup(id));
        }
        self.selection.select(id, mode)
    }

    /// Replace the selection; the first node becomes active.
    pub fn set_selection(&mut self, ids: &[NodeId]) -> Result<()> {
        for &id in ids {
            self.node(id)?;
        }
        self.selection.set(ids)
    }

    pub fn clear_selection(&mut self) {
        self.selection.remove_all();
    }

    /// The active node if it is visible on the active layer.
    pub fn active_node(&self) -> Option<NodeId> {
        let id = self.selection.active()?;
        let node = self.node(id).ok()?;
        node.covers_layer(self.active_layer).then_some(id)
    }

    /// Topmost node of the active group on the active layer under `position`
    /// (constructed image pixels).
    pub fn node_at_position(&self, position: Vec2) -> Result<Option<NodeId>> {
        let group = self.scope_group();
        let local = self.screen_transform(group)?.inverse() * position;

        for &child in self.children(group)?.iter().rev() {
            let node = self.node(child)?;
            if !node.covers_layer(self.active_layer) {
                continue;
            }
            let p = node.parent_transform().inverse() * local;
            let extent = node.size().abs().xy();
            if p.x >= 0.0 && p.y >= 0.0 && p.x < extent.x && p.y < extent.y {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    /// Screen-space bounding box of the nodes' transformed boxes.
    pub fn selection_boundary(&self, ids: &[NodeId]) -> Result<Option<(Vec2, Vec2)>> {
        let mut bounds: Option<(Vec2, Vec2)> = None;
        for &id in ids {
            let matrix = self.screen_transform(id)?;
            let extent = self.node(id)?.size().abs().xy();
            let corners = [
                matrix.position(),
                matrix * Vec2::new(extent.x, 0.0),
                matrix * Vec2::new(0.0, extent.y),
                matrix * extent,
            ];
            for corner in corners {
                bounds = Some(match bounds {
                    Some((min, max)) => (min.min(corner), max.max(corner)),
                    None => (corner, corner),
                });
            }
        }
        Ok(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ShapeType;
    use approx::assert_relative_eq;

    fn shape(position: Point3, size: Point3) -> PropertyNode {
        PropertyNode::shape(ShapeType::Rectangle)
            .with_position(position)
            .with_size(size)
    }

    fn property() -> Property {
        Property::new("color", Point3::new(256, 256, 1))
    }

    #[test]
    fn test_insert_remove_move() {
        let mut prop = property();
        let root = prop.root();
        let a = prop.create_node(shape(Point3::ZERO, Point3::new(1, 1, 1))).unwrap();
        let b = prop.create_node(shape(Point3::ZERO, Point3::new(1, 1, 1))).unwrap();
        let c = prop.create_node(shape(Point3::ZERO, Point3::new(1, 1, 1))).unwrap();

        prop.add_node(root, a).unwrap();
        prop.add_node(root, c).unwrap();
        prop.insert_node(root, 1, b).unwrap();
        assert_eq!(prop.children(root).unwrap(), &[a, b, c]);
        assert_eq!(prop.node(b).unwrap().parent(), Some(root));

        prop.move_node(root, a, 2).unwrap();
        assert_eq!(prop.children(root).unwrap(), &[b, c, a]);

        assert_eq!(prop.remove_node(root, c).unwrap(), 1);
        assert_eq!(prop.children(root).unwrap(), &[b, a]);
        assert!(prop.node(c).unwrap().parent().is_none());
    }

    #[test]
    fn test_index_bounds_are_invalid_arguments() {
        let mut prop = property();
        let root = prop.root();
        let a = prop.create_node(shape(Point3::ZERO, Point3::new(1, 1, 1))).unwrap();

        let err = prop.insert_node(root, 1, a).unwrap_err();
        assert!(matches!(err, SkinError::IndexOutOfBounds { index: 1, count: 0 }));
        assert!(err.is_invalid_argument());

        prop.add_node(root, a).unwrap();
        assert!(matches!(prop.move_node(root, a, 1), Err(SkinError::IndexOutOfBounds { .. })));
        assert!(matches!(prop.node_at(root, 3), Err(SkinError::IndexOutOfBounds { .. })));
        assert!(matches!(prop.add_node(root, a), Err(SkinError::AlreadyAttached(_))));
    }

    #[test]
    fn test_group_cannot_contain_itself() {
        let mut prop = property();
        let root = prop.root();
        let outer = prop.create_node(PropertyNode::group()).unwrap();
        let inner = prop.create_node(PropertyNode::group()).unwrap();
        prop.add_node(root, outer).unwrap();
        prop.add_node(outer, inner).unwrap();

        prop.remove_node(root, outer).unwrap();
        assert!(matches!(prop.add_node(inner, outer), Err(SkinError::Cycle { .. })));
        assert!(matches!(prop.add_node(outer, outer), Err(SkinError::Cycle { .. })));
    }

    #[test]
    fn test_screen_transform_composes_owner_chain() {
        let mut prop = property();
        let root = prop.root();
        let group = prop.create_node(
            PropertyNode::group()
                .with_position(Point3::new(20, 30, 0))
                .with_size(Point3::new(100, 80, 1))
                .with_rotation(0.4)
                .with_shearing(10.0),
        ).unwrap();
        let child = prop.create_node(
            shape(Point3::new(5, 6, 0), Point3::new(10, 12, 1)).with_rotation(-0.9),
        ).unwrap();
        prop.add_node(root, group).unwrap();
        prop.add_node(group, child).unwrap();

        let expected = prop.parent_transform(child).unwrap()
            * prop.parent_transform(group).unwrap()
            * prop.parent_transform(root).unwrap();
        assert!(prop.screen_transform(child).unwrap().approx_eq(&expected, 1e-4));
    }

    #[test]
    fn test_mask_is_placed_relative_to_masked_node() {
        let mut prop = property();
        let root = prop.root();
        let node = prop.create_node(shape(Point3::new(50, 50, 0), Point3::new(10, 10, 1))).unwrap();
        let mask = prop.create_node(shape(Point3::new(2, 3, 0), Point3::new(4, 4, 1))).unwrap();
        prop.add_node(root, node).unwrap();
        prop.attach_mask(node, mask).unwrap();

        assert!(prop.children(root).unwrap().iter().all(|&n| n != mask));
        let origin = prop.screen_transform(mask).unwrap().position();
        assert_relative_eq!(origin.x, 52.0, epsilon = 1e-4);
        assert_relative_eq!(origin.y, 53.0, epsilon = 1e-4);
        assert_eq!(prop.subtree(node).unwrap(), vec![node, mask]);

        assert_eq!(prop.detach_mask(node).unwrap(), mask);
        assert!(matches!(prop.detach_mask(node), Err(SkinError::NoMask(_))));
    }

    #[test]
    fn test_active_node_respects_layer() {
        let mut prop = property();
        let root = prop.root();
        let a = prop.create_node(shape(Point3::new(0, 0, 1), Point3::new(10, 10, 2))).unwrap();
        prop.add_node(root, a).unwrap();
        prop.select(a, SelectionMode::Replace).unwrap();

        assert_eq!(prop.active_node(), None);
        prop.set_active_layer(2);
        assert_eq!(prop.active_node(), Some(a));
        prop.set_active_layer(3);
        assert_eq!(prop.active_node(), None);
        assert_eq!(prop.selection().active(), Some(a));
    }

    #[test]
    fn test_node_at_position_prefers_topmost() {
        let mut prop = property();
        let root = prop.root();
        let bottom = prop.create_node(shape(Point3::new(0, 0, 0), Point3::new(50, 50, 1))).unwrap();
        let top = prop.create_node(shape(Point3::new(25, 25, 0), Point3::new(50, 50, 1))).unwrap();
        prop.add_node(root, bottom).unwrap();
        prop.add_node(root, top).unwrap();

        assert_eq!(prop.node_at_position(Vec2::new(30.0, 30.0)).unwrap(), Some(top));
        assert_eq!(prop.node_at_position(Vec2::new(10.0, 10.0)).unwrap(), Some(bottom));
        assert_eq!(prop.node_at_position(Vec2::new(200.0, 10.0)).unwrap(), None);
    }

    #[test]
    fn test_selection_outside_scope_is_rejected() {
        let mut prop = property();
        let root = prop.root();
        let group = prop.create_node(PropertyNode::group()).unwrap();
        let child = prop.create_node(shape(Point3::ZERO, Point3::new(1, 1, 1))).unwrap();
        prop.add_node(root, group).unwrap();
        prop.add_node(group, child).unwrap();

        assert!(matches!(
            prop.select(child, SelectionMode::Replace),
            Err(SkinError::OutsideActiveGroup(_))
        ));
        prop.enter_group(group).unwrap();
        prop.select(child, SelectionMode::Replace).unwrap();

        assert!(prop.exit_group().unwrap());
        assert_eq!(prop.active_group(), None);
        assert_eq!(prop.selection().selected(), &[group]);
        assert!(!prop.exit_group().unwrap());
    }

    #[test]
    fn test_remove_and_destroy_clean_up_selection() {
        let mut prop = property();
        let root = prop.root();
        let a = prop.create_node(shape(Point3::ZERO, Point3::new(1, 1, 1))).unwrap();
        prop.add_node(root, a).unwrap();
        prop.select(a, SelectionMode::Replace).unwrap();

        assert!(matches!(prop.destroy_node(a), Err(SkinError::AlreadyAttached(_))));
        prop.remove_node(root, a).unwrap();
        assert!(prop.selection().is_empty());
        prop.destroy_node(a).unwrap();
        assert!(matches!(prop.node(a), Err(SkinError::NodeNotFound(_))));
        assert_eq!(prop.node_count(), 1);
    }

    #[test]
    fn test_events_are_queued() {
        let mut prop = property();
        let root = prop.root();
        let a = prop.create_node(shape(Point3::ZERO, Point3::new(1, 1, 1))).unwrap();
        prop.add_node(root, a).unwrap();
        prop.set_position(a, Point3::new(1, 0, 0)).unwrap();
        prop.set_position(a, Point3::new(1, 0, 0)).unwrap();
        prop.select(a, SelectionMode::Replace).unwrap();

        assert_eq!(
            prop.take_events(),
            vec![
                PropertyEvent::StructureChanged(root),
                PropertyEvent::NodeChanged(a),
                PropertyEvent::SelectionChanged,
            ]
        );
    }
}
