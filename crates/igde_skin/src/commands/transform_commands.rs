//! Node manipulation commands (drag, resize, rotate, shear, transparency).
//!
//! Resize, rotate and shear act on screen space: every captured node keeps
//! its captured screen transform followed by one pending transformation
//! around a pivot. Interactive tools update the command parameters while
//! the gesture runs and re-execute it after each undo.

use igde_math::{Point, Point3, TexMatrix2, Vec2};

use super::capture::{pivot_transform, CapturedNodes};
use super::{Command, CommandResult};
use crate::error::{Result, SkinError};
use crate::node::{NodeId, NodeKind};
use crate::property::Property;

/// Command to move nodes by a pixel distance.
///
/// Only the position of the given nodes changes; children and masks move
/// along because they are placed relative to them.
pub struct DragNodes {
    nodes: Vec<(NodeId, Point3)>,
    distance: Point,
}

impl DragNodes {
    pub fn new(property: &Property, nodes: &[NodeId]) -> Result<Self> {
        if nodes.is_empty() {
            return Err(SkinError::Empty);
        }
        let nodes = nodes
            .iter()
            .map(|&id| Ok((id, property.node(id)?.position())))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            nodes,
            distance: Point::ZERO,
        })
    }

    pub fn distance(&self) -> Point {
        self.distance
    }

    pub fn set_distance(&mut self, distance: Point) {
        self.distance = distance;
    }
}

impl Command for DragNodes {
    fn description(&self) -> &str {
        "Move Nodes"
    }

    fn execute(&mut self, property: &mut Property) -> CommandResult {
        let offset = Point3::new(self.distance.x, self.distance.y, 0);
        for &(id, position) in &self.nodes {
            property.set_position(id, position + offset)?;
        }
        Ok(())
    }

    fn undo(&mut self, property: &mut Property) -> CommandResult {
        for &(id, position) in &self.nodes {
            property.set_position(id, position)?;
        }
        Ok(())
    }
}

/// Command to scale nodes away from a pivot.
pub struct ResizeNodes {
    captured: CapturedNodes,
    pivot: Vec2,
    basis: TexMatrix2,
    /// Dragged handle minus pivot, in basis units
    extent: Vec2,
    min_axis_length: f32,
    distance: Vec2,
}

impl ResizeNodes {
    /// `basis` spans the frame the handles sit on, `extent` is the dragged
    /// handle relative to `pivot` measured along that frame. Extent
    /// components shorter than `min_axis_length` are not scaled.
    pub fn new(
        property: &Property,
        nodes: &[NodeId],
        pivot: Vec2,
        basis: TexMatrix2,
        extent: Vec2,
        min_axis_length: f32,
    ) -> Result<Self> {
        Ok(Self {
            captured: CapturedNodes::capture(property, nodes)?,
            pivot,
            basis,
            extent,
            min_axis_length,
            distance: Vec2::ZERO,
        })
    }

    pub fn distance(&self) -> Vec2 {
        self.distance
    }

    /// Set the handle displacement in screen pixels.
    pub fn set_distance(&mut self, distance: Vec2) {
        self.distance = distance;
    }

    pub fn scaling(&self) -> Vec2 {
        let local = self.basis.linear().inverse().transform_vector(self.distance);
        let factor = |extent: f32, delta: f32| {
            if extent.abs() < self.min_axis_length {
                1.0
            } else {
                (extent + delta) / extent
            }
        };
        Vec2::new(factor(self.extent.x, local.x), factor(self.extent.y, local.y))
    }

    fn pending(&self) -> TexMatrix2 {
        let scaling = self.scaling();
        pivot_transform(self.pivot, &self.basis, &TexMatrix2::scale(scaling.x, scaling.y))
    }
}

impl Command for ResizeNodes {
    fn description(&self) -> &str {
        "Resize Nodes"
    }

    fn execute(&mut self, property: &mut Property) -> CommandResult {
        let pending = self.pending();
        self.captured.apply(property, &pending)
    }

    fn undo(&mut self, property: &mut Property) -> CommandResult {
        self.captured.restore(property)
    }
}

/// Command to rotate nodes around a pivot.
pub struct RotateNodes {
    captured: CapturedNodes,
    pivot: Vec2,
    origin: Vec2,
    target: Vec2,
    min_axis_length: f32,
}

impl RotateNodes {
    /// `origin` is the grabbed point; the rotation turns it towards the target.
    pub fn new(
        property: &Property,
        nodes: &[NodeId],
        pivot: Vec2,
        origin: Vec2,
        min_axis_length: f32,
    ) -> Result<Self> {
        Ok(Self {
            captured: CapturedNodes::capture(property, nodes)?,
            pivot,
            origin,
            target: origin,
            min_axis_length,
        })
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn set_target(&mut self, target: Vec2) {
        self.target = target;
    }

    /// Rotation angle in radians between the origin and the target direction.
    pub fn angle(&self) -> f32 {
        let from = self.origin - self.pivot;
        let to = self.target - self.pivot;
        if from.length() < self.min_axis_length || to.length() < self.min_axis_length {
            return 0.0;
        }
        to.angle() - from.angle()
    }
}

impl Command for RotateNodes {
    fn description(&self) -> &str {
        "Rotate Nodes"
    }

    fn execute(&mut self, property: &mut Property) -> CommandResult {
        let pending = pivot_transform(self.pivot, &TexMatrix2::IDENTITY, &TexMatrix2::rotation(self.angle()));
        self.captured.apply(property, &pending)
    }

    fn undo(&mut self, property: &mut Property) -> CommandResult {
        self.captured.restore(property)
    }
}

/// Axis a shear displaces along.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShearAxis {
    /// Top or bottom edge dragged sideways
    X,
    /// Left or right edge dragged up or down
    Y,
}

/// Command to shear nodes around a pivot.
pub struct ShearNodes {
    captured: CapturedNodes,
    pivot: Vec2,
    basis: TexMatrix2,
    /// Dragged edge minus pivot, in basis units
    extent: Vec2,
    axis: ShearAxis,
    min_axis_length: f32,
    distance: Vec2,
}

impl ShearNodes {
    pub fn new(
        property: &Property,
        nodes: &[NodeId],
        pivot: Vec2,
        basis: TexMatrix2,
        extent: Vec2,
        axis: ShearAxis,
        min_axis_length: f32,
    ) -> Result<Self> {
        Ok(Self {
            captured: CapturedNodes::capture(property, nodes)?,
            pivot,
            basis,
            extent,
            axis,
            min_axis_length,
            distance: Vec2::ZERO,
        })
    }

    pub fn distance(&self) -> Vec2 {
        self.distance
    }

    /// Set the edge displacement in screen pixels.
    pub fn set_distance(&mut self, distance: Vec2) {
        self.distance = distance;
    }

    /// Shear factor along the command's axis.
    pub fn factor(&self) -> f32 {
        let local = self.basis.linear().inverse().transform_vector(self.distance);
        let (delta, extent) = match self.axis {
            ShearAxis::X => (local.x, self.extent.y),
            ShearAxis::Y => (local.y, self.extent.x),
        };
        if extent.abs() < self.min_axis_length {
            0.0
        } else {
            delta / extent
        }
    }

    fn pending(&self) -> TexMatrix2 {
        let factor = self.factor();
        let delta = match self.axis {
            ShearAxis::X => TexMatrix2::shear(factor, 0.0),
            ShearAxis::Y => TexMatrix2::shear(0.0, factor),
        };
        pivot_transform(self.pivot, &self.basis, &delta)
    }
}

impl Command for ShearNodes {
    fn description(&self) -> &str {
        "Shear Nodes"
    }

    fn execute(&mut self, property: &mut Property) -> CommandResult {
        let pending = self.pending();
        self.captured.apply(property, &pending)
    }

    fn undo(&mut self, property: &mut Property) -> CommandResult {
        self.captured.restore(property)
    }
}

/// Command to set the transparency of nodes.
pub struct SetTransparency {
    nodes: Vec<(NodeId, f32)>,
    transparency: f32,
}

impl SetTransparency {
    pub fn new(property: &Property, nodes: &[NodeId], transparency: f32) -> Result<Self> {
        if nodes.is_empty() {
            return Err(SkinError::Empty);
        }
        let nodes = nodes
            .iter()
            .map(|&id| Ok((id, property.node(id)?.transparency())))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { nodes, transparency })
    }
}

impl Command for SetTransparency {
    fn description(&self) -> &str {
        "Set Node Transparency"
    }

    fn execute(&mut self, property: &mut Property) -> CommandResult {
        for &(id, _) in &self.nodes {
            property.set_transparency(id, self.transparency)?;
        }
        Ok(())
    }

    fn undo(&mut self, property: &mut Property) -> CommandResult {
        for &(id, old) in &self.nodes {
            property.set_transparency(id, old)?;
        }
        Ok(())
    }
}

/// Command to size an image node to the pixel size of its image.
pub struct SizeFromImage {
    node: NodeId,
    old_size: Point3,
    new_size: Point3,
}

impl SizeFromImage {
    pub fn new(property: &Property, node: NodeId) -> Result<Self> {
        let data = property.node(node)?;
        let image_size = match data.kind() {
            NodeKind::Image(image) => image.image_size,
            _ => None,
        }
        .ok_or(SkinError::NoImageSize(node))?;
        let old_size = data.size();
        Ok(Self {
            node,
            old_size,
            new_size: Point3::new(image_size.x, image_size.y, old_size.z),
        })
    }

    /// Whether executing changes the node.
    pub fn has_any_effect(&self) -> bool {
        self.old_size != self.new_size
    }
}

impl Command for SizeFromImage {
    fn description(&self) -> &str {
        "Size From Image"
    }

    fn execute(&mut self, property: &mut Property) -> CommandResult {
        property.set_size(self.node, self.new_size)
    }

    fn undo(&mut self, property: &mut Property) -> CommandResult {
        property.set_size(self.node, self.old_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{PropertyNode, ShapeType};
    use approx::assert_relative_eq;

    fn setup(node: PropertyNode) -> (Property, NodeId) {
        let mut property = Property::new("color", Point3::new(256, 256, 1));
        let root = property.root();
        let id = property.create_node(node).unwrap();
        property.add_node(root, id).unwrap();
        (property, id)
    }

    fn square() -> PropertyNode {
        PropertyNode::shape(ShapeType::Rectangle).with_size(Point3::new(100, 100, 1))
    }

    #[test]
    fn test_drag_moves_and_restores() {
        let (mut property, id) = setup(square().with_position(Point3::new(10, 10, 0)));
        let mut cmd = DragNodes::new(&property, &[id]).unwrap();
        cmd.set_distance(Point::new(5, -3));
        cmd.execute(&mut property).unwrap();
        assert_eq!(property.node(id).unwrap().position(), Point3::new(15, 7, 0));
        cmd.undo(&mut property).unwrap();
        assert_eq!(property.node(id).unwrap().position(), Point3::new(10, 10, 0));
    }

    #[test]
    fn test_resize_corner_keeps_pivot() {
        let (mut property, id) = setup(square());
        let mut cmd = ResizeNodes::new(
            &property,
            &[id],
            Vec2::ZERO,
            TexMatrix2::IDENTITY,
            Vec2::new(100.0, 100.0),
            0.5,
        )
        .unwrap();
        cmd.set_distance(Vec2::new(20.0, 0.0));
        cmd.execute(&mut property).unwrap();

        let node = property.node(id).unwrap();
        assert_eq!(node.size(), Point3::new(120, 100, 1));
        assert_eq!(node.position(), Point3::ZERO);
    }

    #[test]
    fn test_resize_degenerate_extent_is_guarded() {
        let (mut property, id) = setup(square());
        let mut cmd = ResizeNodes::new(
            &property,
            &[id],
            Vec2::new(0.0, 50.0),
            TexMatrix2::IDENTITY,
            Vec2::new(100.0, 0.0),
            0.5,
        )
        .unwrap();
        cmd.set_distance(Vec2::new(0.0, 40.0));
        assert_eq!(cmd.scaling(), Vec2::new(1.0, 1.0));
        cmd.execute(&mut property).unwrap();
        assert_eq!(property.node(id).unwrap().size(), Point3::new(100, 100, 1));
    }

    #[test]
    fn test_rotate_quarter_turn_around_center() {
        let (mut property, id) = setup(square());
        let center = Vec2::new(50.0, 50.0);
        let mut cmd = RotateNodes::new(&property, &[id], center, Vec2::new(100.0, 50.0), 0.5).unwrap();
        cmd.set_target(Vec2::new(50.0, 100.0));
        cmd.execute(&mut property).unwrap();

        let node = property.node(id).unwrap();
        assert_relative_eq!(node.rotation(), core::f32::consts::FRAC_PI_2, epsilon = 1e-4);
        assert_eq!(node.position(), Point3::ZERO);
        assert_eq!(node.size(), Point3::new(100, 100, 1));
    }

    #[test]
    fn test_shear_bottom_edge() {
        let (mut property, id) = setup(square());
        // bottom edge dragged right, pivot on the top edge
        let mut cmd = ShearNodes::new(
            &property,
            &[id],
            Vec2::new(50.0, 0.0),
            TexMatrix2::IDENTITY,
            Vec2::new(0.0, 100.0),
            ShearAxis::X,
            0.5,
        )
        .unwrap();
        cmd.set_distance(Vec2::new(100.0, 0.0));
        assert_relative_eq!(cmd.factor(), 1.0);
        cmd.execute(&mut property).unwrap();

        let node = property.node(id).unwrap();
        assert_relative_eq!(node.shearing(), 45.0, epsilon = 1e-3);
        assert_relative_eq!(node.rotation(), 0.0, epsilon = 1e-5);
        assert_eq!(node.size(), Point3::new(100, 100, 1));
    }

    #[test]
    fn test_redo_after_undo_is_stable() {
        let (mut property, id) = setup(
            square()
                .with_position(Point3::new(7, 3, 0))
                .with_rotation(0.3)
                .with_shearing(12.0),
        );
        let before = property.node(id).unwrap().clone();
        let frame = property.screen_transform(id).unwrap();
        let mut cmd = ResizeNodes::new(
            &property,
            &[id],
            frame.position(),
            frame,
            Vec2::new(100.0, 100.0),
            0.5,
        )
        .unwrap();
        cmd.set_distance(Vec2::new(13.0, -9.0));
        cmd.execute(&mut property).unwrap();
        let after = property.node(id).unwrap().clone();

        cmd.undo(&mut property).unwrap();
        let restored = property.node(id).unwrap();
        assert_eq!(restored.position(), before.position());
        assert_eq!(restored.size(), before.size());
        assert_eq!(restored.rotation(), before.rotation());
        assert_eq!(restored.shearing(), before.shearing());

        cmd.execute(&mut property).unwrap();
        let again = property.node(id).unwrap();
        assert_eq!(again.position(), after.position());
        assert_eq!(again.size(), after.size());
        assert_eq!(again.rotation(), after.rotation());
        assert_eq!(again.shearing(), after.shearing());
    }

    #[test]
    fn test_resize_group_moves_children() {
        let mut property = Property::new("color", Point3::new(256, 256, 1));
        let root = property.root();
        let group = property.create_node(PropertyNode::group().with_size(Point3::new(100, 100, 1))).unwrap();
        let child = property.create_node(
            PropertyNode::shape(ShapeType::Ellipse)
                .with_position(Point3::new(50, 0, 0))
                .with_size(Point3::new(50, 50, 1)),
        ).unwrap();
        property.add_node(root, group).unwrap();
        property.add_node(group, child).unwrap();

        let mut cmd = ResizeNodes::new(
            &property,
            &[group],
            Vec2::ZERO,
            TexMatrix2::IDENTITY,
            Vec2::new(100.0, 100.0),
            0.5,
        )
        .unwrap();
        cmd.set_distance(Vec2::new(100.0, 0.0));
        cmd.execute(&mut property).unwrap();

        assert_eq!(property.node(group).unwrap().size(), Point3::new(200, 100, 1));
        let child_node = property.node(child).unwrap();
        assert_eq!(child_node.position(), Point3::new(100, 0, 0));
        assert_eq!(child_node.size(), Point3::new(100, 50, 1));
    }

    #[test]
    fn test_transparency_round_trip() {
        let (mut property, id) = setup(square());
        let mut cmd = SetTransparency::new(&property, &[id], 0.25).unwrap();
        cmd.execute(&mut property).unwrap();
        assert_eq!(property.node(id).unwrap().transparency(), 0.25);
        cmd.undo(&mut property).unwrap();
        assert_eq!(property.node(id).unwrap().transparency(), 1.0);
    }

    #[test]
    fn test_size_from_image_keeps_layers() {
        let image = PropertyNode::image("/textures/brick.png")
            .with_image_size(Point::new(64, 32))
            .with_size(Point3::new(-100, 100, 2));
        let (mut property, id) = setup(image);

        let mut cmd = SizeFromImage::new(&property, id).unwrap();
        assert!(cmd.has_any_effect());
        cmd.execute(&mut property).unwrap();
        assert_eq!(property.node(id).unwrap().size(), Point3::new(64, 32, 2));
        cmd.undo(&mut property).unwrap();
        assert_eq!(property.node(id).unwrap().size(), Point3::new(-100, 100, 2));
    }

    #[test]
    fn test_size_from_image_needs_loaded_image() {
        let (property, id) = setup(PropertyNode::image("/textures/missing.png"));
        assert!(matches!(SizeFromImage::new(&property, id), Err(SkinError::NoImageSize(_))));

        let (property, id) = setup(square().with_image_size(Point::new(8, 8)));
        assert!(matches!(SizeFromImage::new(&property, id), Err(SkinError::NoImageSize(_))));
    }
}
