//! Constructed property nodes.
//!
//! A node places image, shape, text or group content inside its parent
//! group. Geometry is kept in editor-friendly integer form:
//!
//! - `position`: top-left corner in parent pixels, `z` is the first layer
//! - `size`: extent in pixels, a negative `x`/`y` mirrors the content, `z` is the layer span
//! - `rotation`: radians, counter-clockwise around the node center
//! - `shearing`: degrees, X-axis shear around the node center
//!
//! The size never enters the placement matrices; scaling a node changes its
//! size instead. [`PropertyNode::set_from_matrix`] performs the reverse step
//! and turns an arbitrary affine matrix back into these fields.

use igde_core::Handle;
use igde_math::consts::FLOAT_SAFE_EPSILON;
use igde_math::{approx_equal, degrees, radians, wrap_angle, Point, Point3, TexMatrix2, Vec2};
use serde::{Deserialize, Serialize};

/// Handle to a node stored in a [`crate::Property`]
pub type NodeId = Handle<PropertyNode>;

/// Rotations closer than this (radians) to the reference are snapped to it
const ROTATION_SNAP: f32 = 1e-4;

/// Shearings closer than this (degrees) to the current value are snapped to it
const SHEARING_SNAP: f32 = 1e-3;

/// RGBA color with components in [0, 1]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeType {
    #[default]
    Rectangle,
    Ellipse,
}

/// Image content
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageNode {
    pub path: String,
    /// Repeat count along x and y
    pub repeat: Point,
    /// Pixel size of the loaded image, `None` until the image is loaded
    #[serde(default)]
    pub image_size: Option<Point>,
}

/// Painted shape content
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeNode {
    pub shape_type: ShapeType,
    pub fill_color: Color,
    pub line_color: Color,
    pub thickness: f32,
}

impl Default for ShapeNode {
    fn default() -> Self {
        Self {
            shape_type: ShapeType::Rectangle,
            fill_color: Color::WHITE,
            line_color: Color::BLACK,
            thickness: 1.0,
        }
    }
}

/// Text content
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub font_path: String,
    pub text: String,
    pub text_size: f32,
    pub color: Color,
}

impl Default for TextNode {
    fn default() -> Self {
        Self {
            font_path: "/igde/fonts/regular_67px.defont".to_string(),
            text: "Text".to_string(),
            text_size: 67.0,
            color: Color::BLACK,
        }
    }
}

/// Ordered children of a group; index order is paint order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupNode {
    #[serde(skip)]
    pub(crate) children: Vec<NodeId>,
}

/// Node variant with its payload
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Group(GroupNode),
    Image(ImageNode),
    Shape(ShapeNode),
    Text(TextNode),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Group(_) => "group",
            NodeKind::Image(_) => "image",
            NodeKind::Shape(_) => "shape",
            NodeKind::Text(_) => "text",
        }
    }
}

/// A node of a constructed property
#[derive(Clone, Debug)]
pub struct PropertyNode {
    kind: NodeKind,
    position: Point3,
    size: Point3,
    rotation: f32,
    shearing: f32,
    transparency: f32,
    mask: Option<NodeId>,
    parent: Option<NodeId>,
    mask_owner: Option<NodeId>,
}

impl PropertyNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            position: Point3::ZERO,
            size: Point3::new(256, 256, 1),
            rotation: 0.0,
            shearing: 0.0,
            transparency: 1.0,
            mask: None,
            parent: None,
            mask_owner: None,
        }
    }

    pub fn group() -> Self {
        Self::new(NodeKind::Group(GroupNode::default()))
    }

    pub fn image(path: impl Into<String>) -> Self {
        Self::new(NodeKind::Image(ImageNode {
            path: path.into(),
            repeat: Point::new(1, 1),
            image_size: None,
        }))
    }

    pub fn shape(shape_type: ShapeType) -> Self {
        Self::new(NodeKind::Shape(ShapeNode {
            shape_type,
            ..ShapeNode::default()
        }))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Text(TextNode {
            text: text.into(),
            ..TextNode::default()
        }))
        .with_size(Point3::new(256, 67, 1))
    }

    /// Record the loaded image size of an image node; other nodes ignore it.
    pub fn with_image_size(mut self, size: Point) -> Self {
        if let NodeKind::Image(image) = &mut self.kind {
            image.image_size = Some(size);
        }
        self
    }

    pub fn with_position(mut self, position: Point3) -> Self {
        self.position = position;
        self
    }

    pub fn with_size(mut self, size: Point3) -> Self {
        self.size = size;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_shearing(mut self, shearing: f32) -> Self {
        self.shearing = shearing;
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group(_))
    }

    pub fn position(&self) -> Point3 {
        self.position
    }

    pub fn size(&self) -> Point3 {
        self.size
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn shearing(&self) -> f32 {
        self.shearing
    }

    pub fn transparency(&self) -> f32 {
        self.transparency
    }

    pub fn mask(&self) -> Option<NodeId> {
        self.mask
    }

    /// Owning group, `None` for the root group, masks and detached nodes
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The node this node masks, if it is a mask
    pub fn mask_owner(&self) -> Option<NodeId> {
        self.mask_owner
    }

    /// Node whose screen transform this node is placed in
    pub fn owner(&self) -> Option<NodeId> {
        self.mask_owner.or(self.parent)
    }

    pub fn is_attached(&self) -> bool {
        self.owner().is_some()
    }

    /// Children of a group, empty for other kinds
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Group(group) => &group.children,
            _ => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match &mut self.kind {
            NodeKind::Group(group) => Some(&mut group.children),
            _ => None,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn set_mask_link(&mut self, mask: Option<NodeId>) {
        self.mask = mask;
    }

    pub(crate) fn set_mask_owner(&mut self, owner: Option<NodeId>) {
        self.mask_owner = owner;
    }

    /// Copy of this node without tree links or children
    pub fn detached_copy(&self) -> Self {
        let mut copy = self.clone();
        copy.mask = None;
        copy.parent = None;
        copy.mask_owner = None;
        if let Some(children) = copy.children_mut() {
            children.clear();
        }
        copy
    }

    /// Whether the node's layer range contains `layer`
    pub fn covers_layer(&self, layer: i32) -> bool {
        layer >= self.position.z && layer < self.position.z + self.size.z
    }

    // ------------------------------------------------------------------
    // Mutation; each setter reports whether the value changed
    // ------------------------------------------------------------------

    pub fn set_position(&mut self, position: Point3) -> bool {
        if self.position == position {
            return false;
        }
        self.position = position;
        true
    }

    pub fn set_size(&mut self, size: Point3) -> bool {
        if self.size == size {
            return false;
        }
        self.size = size;
        true
    }

    pub fn set_rotation(&mut self, rotation: f32) -> bool {
        if approx_equal(self.rotation, rotation, FLOAT_SAFE_EPSILON) {
            return false;
        }
        self.rotation = rotation;
        true
    }

    pub fn set_shearing(&mut self, shearing: f32) -> bool {
        if approx_equal(self.shearing, shearing, FLOAT_SAFE_EPSILON) {
            return false;
        }
        self.shearing = shearing;
        true
    }

    pub fn set_transparency(&mut self, transparency: f32) -> bool {
        let transparency = transparency.clamp(0.0, 1.0);
        if approx_equal(self.transparency, transparency, FLOAT_SAFE_EPSILON) {
            return false;
        }
        self.transparency = transparency;
        true
    }

    /// Assign geometry verbatim, bypassing the epsilon comparison
    pub(crate) fn restore_geometry(&mut self, position: Point3, size: Point3, rotation: f32, shearing: f32) {
        self.position = position;
        self.size = size;
        self.rotation = rotation;
        self.shearing = shearing;
    }

    // ------------------------------------------------------------------
    // Transformations
    // ------------------------------------------------------------------

    /// Half of the absolute size
    pub fn half_size(&self) -> Vec2 {
        self.size.abs().xy() * 0.5
    }

    /// Shearing and rotation around the node center, without position.
    pub fn canvas_transform(&self) -> TexMatrix2 {
        let half = self.half_size();
        TexMatrix2::translation(-half)
            * TexMatrix2::shear(radians(self.shearing).tan(), 0.0)
            * TexMatrix2::rotation(self.rotation)
            * TexMatrix2::translation(half)
    }

    /// Maps node-local pixels into the owner's coordinate space.
    pub fn parent_transform(&self) -> TexMatrix2 {
        self.canvas_transform() * TexMatrix2::translation(self.position.xy())
    }

    /// Mirror matrix applied before the placement of a flipped node
    pub fn flip_transform(&self) -> TexMatrix2 {
        if self.size.x >= 0 && self.size.y >= 0 {
            return TexMatrix2::IDENTITY;
        }
        let half = self.half_size();
        TexMatrix2::translation(-half)
            * TexMatrix2::scale(
                if self.size.x < 0 { -1.0 } else { 1.0 },
                if self.size.y < 0 { -1.0 } else { 1.0 },
            )
            * TexMatrix2::translation(half)
    }

    /// Set position, size, rotation and shearing from a matrix mapping the
    /// `reference_size` box into the owner's coordinate space.
    ///
    /// The linear part is decomposed into rotation, X shear and axis
    /// scaling; scaling is folded into the new size. A mirrored matrix toggles
    /// the sign of the size component whose flip keeps the rotation closest
    /// to `reference_rotation`. The layer (`z`) components stay unchanged.
    ///
    /// Returns `true` if any field changed.
    pub fn set_from_matrix(&mut self, matrix: &TexMatrix2, reference_size: Point3, reference_rotation: f32) -> bool {
        let extent = reference_size.abs().xy();
        let mut size = reference_size;
        let mut linear = matrix.linear();
        let mut origin = matrix.position();

        if linear.determinant() < 0.0 {
            let rotation_flip_x = (-matrix.axis_x()).angle();
            let rotation_flip_y = matrix.axis_x().angle();
            let distance_x = wrap_angle(rotation_flip_x - reference_rotation).abs();
            let distance_y = wrap_angle(rotation_flip_y - reference_rotation).abs();

            if distance_x < distance_y {
                linear = TexMatrix2::scale(-1.0, 1.0) * linear;
                origin = *matrix * Vec2::new(extent.x, 0.0);
                size.x = -size.x;
            } else {
                linear = TexMatrix2::scale(1.0, -1.0) * linear;
                origin = *matrix * Vec2::new(0.0, extent.y);
                size.y = -size.y;
            }
        }

        let axis_x = linear.axis_x();
        let scale_x = axis_x.length();
        let mut rotation = reference_rotation;
        if scale_x > FLOAT_SAFE_EPSILON {
            let delta = wrap_angle(axis_x.angle() - reference_rotation);
            if delta.abs() > ROTATION_SNAP {
                rotation = reference_rotation + delta;
            }
        }

        let unrotated = TexMatrix2::rotation(-rotation).transform_vector(linear.axis_y());
        let scale_y = unrotated.y;
        let mut shearing = self.shearing;
        if scale_y.abs() > FLOAT_SAFE_EPSILON {
            let candidate = degrees((unrotated.x / scale_y).atan());
            if (candidate - self.shearing).abs() > SHEARING_SNAP {
                shearing = candidate;
            }
        }

        let new_extent = Vec2::new(extent.x * scale_x, extent.y * scale_y.abs()).round();
        size.x = if size.x < 0 { -new_extent.x } else { new_extent.x };
        size.y = if size.y < 0 { -new_extent.y } else { new_extent.y };
        size.z = self.size.z;

        let half = Vec2::from(new_extent) * 0.5;
        let frame = TexMatrix2::shear(radians(shearing).tan(), 0.0) * TexMatrix2::rotation(rotation);
        let corner = (origin - half + frame.transform_vector(half)).round();
        let position = Point3::new(corner.x, corner.y, self.position.z);

        let mut changed = self.set_position(position);
        changed |= self.set_size(size);
        changed |= self.set_rotation(rotation);
        changed |= self.set_shearing(shearing);
        changed
    }
}
