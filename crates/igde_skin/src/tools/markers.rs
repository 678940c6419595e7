//! Selection frame and manipulation markers.
//!
//! The frame is the box the markers sit on: the active node's own box when a
//! single node is selected, otherwise the axis aligned bounds of all
//! selected nodes. Resize markers form the inner ring just outside the
//! frame, rotate and shear markers the outer ring.

use igde_math::{Point, TexMatrix2, Vec2};

use super::view::CanvasView;
use crate::error::Result;
use crate::property::Property;

/// One of the sixteen manipulation markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    ResizeTopLeft,
    ResizeTop,
    ResizeTopRight,
    ResizeLeft,
    ResizeRight,
    ResizeBottomLeft,
    ResizeBottom,
    ResizeBottomRight,
    RotateTopLeft,
    RotateTopRight,
    RotateBottomLeft,
    RotateBottomRight,
    ShearTop,
    ShearBottom,
    ShearLeft,
    ShearRight,
}

/// What dragging a marker does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerAction {
    Resize,
    Rotate,
    Shear,
}

impl MarkerKind {
    /// All markers in hit test priority order.
    pub const ALL: [Self; 16] = [
        Self::ResizeTopLeft,
        Self::ResizeTop,
        Self::ResizeTopRight,
        Self::ResizeLeft,
        Self::ResizeRight,
        Self::ResizeBottomLeft,
        Self::ResizeBottom,
        Self::ResizeBottomRight,
        Self::RotateTopLeft,
        Self::RotateTopRight,
        Self::RotateBottomLeft,
        Self::RotateBottomRight,
        Self::ShearTop,
        Self::ShearBottom,
        Self::ShearLeft,
        Self::ShearRight,
    ];

    pub fn action(self) -> MarkerAction {
        match self {
            Self::ResizeTopLeft
            | Self::ResizeTop
            | Self::ResizeTopRight
            | Self::ResizeLeft
            | Self::ResizeRight
            | Self::ResizeBottomLeft
            | Self::ResizeBottom
            | Self::ResizeBottomRight => MarkerAction::Resize,
            Self::RotateTopLeft | Self::RotateTopRight | Self::RotateBottomLeft | Self::RotateBottomRight => {
                MarkerAction::Rotate
            }
            Self::ShearTop | Self::ShearBottom | Self::ShearLeft | Self::ShearRight => MarkerAction::Shear,
        }
    }

    /// Handle position on the frame in fractions of the frame size.
    pub fn anchor(self) -> Vec2 {
        let (u, v) = match self {
            Self::ResizeTopLeft | Self::RotateTopLeft => (0.0, 0.0),
            Self::ResizeTop | Self::ShearTop => (0.5, 0.0),
            Self::ResizeTopRight | Self::RotateTopRight => (1.0, 0.0),
            Self::ResizeLeft | Self::ShearLeft => (0.0, 0.5),
            Self::ResizeRight | Self::ShearRight => (1.0, 0.5),
            Self::ResizeBottomLeft | Self::RotateBottomLeft => (0.0, 1.0),
            Self::ResizeBottom | Self::ShearBottom => (0.5, 1.0),
            Self::ResizeBottomRight | Self::RotateBottomRight => (1.0, 1.0),
        };
        Vec2::new(u, v)
    }

    /// Anchor of the opposite corner or edge center.
    pub fn pivot_anchor(self) -> Vec2 {
        Vec2::ONE - self.anchor()
    }

    /// Whether the marker sits on an edge center.
    pub fn is_edge(self) -> bool {
        let anchor = self.anchor();
        anchor.x == 0.5 || anchor.y == 0.5
    }

    /// Whether an edge marker sits on the top or bottom edge.
    pub fn is_horizontal_edge(self) -> bool {
        self.anchor().x == 0.5
    }
}

/// Box the markers are placed on, in constructed image pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionFrame {
    /// Maps frame pixels to image pixels
    transform: TexMatrix2,
    size: Vec2,
}

impl SelectionFrame {
    pub fn new(transform: TexMatrix2, size: Vec2) -> Self {
        Self { transform, size }
    }

    /// Frame of the current selection, `None` without a visible active node.
    pub fn from_selection(property: &Property) -> Result<Option<Self>> {
        let Some(active) = property.active_node() else {
            return Ok(None);
        };
        let selected = property.selection().selected();

        if selected.len() > 1 {
            let Some((min, max)) = property.selection_boundary(selected)? else {
                return Ok(None);
            };
            return Ok(Some(Self::new(
                TexMatrix2::translation(min),
                (max - min).round().to_vec2(),
            )));
        }

        let node = property.node(active)?;
        let transform = node.flip_transform() * property.screen_transform(active)?;
        Ok(Some(Self::new(transform, node.size().abs().xy())))
    }

    pub fn transform(&self) -> &TexMatrix2 {
        &self.transform
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Frame pixels of an anchor.
    pub fn local_point(&self, anchor: Vec2) -> Vec2 {
        Vec2::new(anchor.x * self.size.x, anchor.y * self.size.y)
    }

    /// Image pixels of an anchor.
    pub fn point(&self, anchor: Vec2) -> Vec2 {
        self.transform * self.local_point(anchor)
    }

    /// Frame axis direction in image pixels, or the unit axis if the frame
    /// axis is shorter than `min_length`.
    pub fn axis_direction(&self, horizontal: bool, min_length: f32) -> Vec2 {
        let (axis, fallback) = if horizontal {
            (self.transform.axis_x(), Vec2::X)
        } else {
            (self.transform.axis_y(), Vec2::Y)
        };
        if axis.length() < min_length {
            fallback
        } else {
            axis.normalize()
        }
    }
}

/// Marker placement in view pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerLayout {
    border_position: Point,
    border_size: Point,
    rotation: f32,
    marker_size: i32,
    centers: [(MarkerKind, Point); 16],
}

impl MarkerLayout {
    /// Markers sit outside the frame along the frame's own axes, so a
    /// mirrored frame keeps its rings outside the box. Axes shorter than
    /// `min_axis` fall back to the unit axes.
    pub fn new(frame: &SelectionFrame, view: &CanvasView, marker_size: i32, min_axis: f32) -> Self {
        let transform = *frame.transform() * view.transform();
        let size = frame.size();

        let top_left = transform.position().round();
        let top_right = (transform * Vec2::new(size.x, 0.0)).round();
        let bottom_left = (transform * Vec2::new(0.0, size.y)).round();
        let bottom_right = (transform * size).round();

        let top = (top_left + top_right) / 2;
        let bottom = (bottom_left + bottom_right) / 2;
        let left = (top_left + bottom_left) / 2;
        let right = (top_right + bottom_right) / 2;

        let rotation = transform.rotation_angle();
        let direction_x = frame.axis_direction(true, min_axis);
        let direction_y = frame.axis_direction(false, min_axis);
        let extent = marker_size as f32;
        let inner_x = (direction_x * (extent * 0.5)).round();
        let outer_x = (direction_x * (extent * 1.5)).round();
        let inner_y = (direction_y * (extent * 0.5)).round();
        let outer_y = (direction_y * (extent * 1.5)).round();

        let centers = [
            (MarkerKind::ResizeTopLeft, top_left - inner_x - inner_y),
            (MarkerKind::ResizeTop, top - inner_y),
            (MarkerKind::ResizeTopRight, top_right + inner_x - inner_y),
            (MarkerKind::ResizeLeft, left - inner_x),
            (MarkerKind::ResizeRight, right + inner_x),
            (MarkerKind::ResizeBottomLeft, bottom_left - inner_x + inner_y),
            (MarkerKind::ResizeBottom, bottom + inner_y),
            (MarkerKind::ResizeBottomRight, bottom_right + inner_x + inner_y),
            (MarkerKind::RotateTopLeft, top_left - outer_x - outer_y),
            (MarkerKind::RotateTopRight, top_right + outer_x - outer_y),
            (MarkerKind::RotateBottomLeft, bottom_left - outer_x + outer_y),
            (MarkerKind::RotateBottomRight, bottom_right + outer_x + outer_y),
            (MarkerKind::ShearTop, top - outer_y),
            (MarkerKind::ShearBottom, bottom + outer_y),
            (MarkerKind::ShearLeft, left - outer_x),
            (MarkerKind::ShearRight, right + outer_x),
        ];

        let scaling = transform.scaling();
        Self {
            border_position: top_left,
            border_size: Vec2::new(scaling.x * size.x, scaling.y * size.y).round(),
            rotation,
            marker_size,
            centers,
        }
    }

    pub fn border_position(&self) -> Point {
        self.border_position
    }

    pub fn border_size(&self) -> Point {
        self.border_size
    }

    /// Rotation of the border and every marker in radians
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn marker_size(&self) -> i32 {
        self.marker_size
    }

    pub fn center(&self, kind: MarkerKind) -> Point {
        self.centers
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(Point::ZERO, |&(_, center)| center)
    }

    pub fn centers(&self) -> &[(MarkerKind, Point)] {
        &self.centers
    }

    /// Marker under a view position; resize markers win over rotate
    /// markers, rotate over shear.
    pub fn hit_test(&self, position: Vec2) -> Option<MarkerKind> {
        let half = self.marker_size as f32 * 0.5;
        let unrotate = TexMatrix2::rotation(-self.rotation);
        self.centers.iter().find_map(|&(kind, center)| {
            let local = unrotate.transform_vector(position - center.to_vec2());
            (local.x.abs() <= half && local.y.abs() <= half).then_some(kind)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{PropertyNode, ShapeType};
    use crate::selection::SelectionMode;
    use igde_math::Point3;

    fn layout_for(size: Point3) -> MarkerLayout {
        let mut property = Property::new("color", Point3::new(256, 256, 1));
        let root = property.root();
        let node = property.create_node(
            PropertyNode::shape(ShapeType::Rectangle)
                .with_position(Point3::new(20, 30, 0))
                .with_size(size),
        ).unwrap();
        property.add_node(root, node).unwrap();
        property.select(node, SelectionMode::Replace).unwrap();
        let frame = SelectionFrame::from_selection(&property).unwrap().unwrap();
        MarkerLayout::new(&frame, &CanvasView::default(), 9, 0.5)
    }

    #[test]
    fn test_marker_rings() {
        let layout = layout_for(Point3::new(100, 50, 1));
        assert_eq!(layout.border_position(), Point::new(20, 30));
        assert_eq!(layout.border_size(), Point::new(100, 50));
        assert_eq!(layout.center(MarkerKind::ResizeTopLeft), Point::new(15, 25));
        assert_eq!(layout.center(MarkerKind::ResizeBottomRight), Point::new(125, 85));
        assert_eq!(layout.center(MarkerKind::ResizeTop), Point::new(70, 25));
        assert_eq!(layout.center(MarkerKind::RotateTopRight), Point::new(134, 16));
        assert_eq!(layout.center(MarkerKind::ShearLeft), Point::new(6, 55));
    }

    #[test]
    fn test_hit_test_priority() {
        let layout = layout_for(Point3::new(100, 50, 1));
        assert_eq!(layout.hit_test(Vec2::new(126.0, 86.0)), Some(MarkerKind::ResizeBottomRight));
        assert_eq!(layout.hit_test(Vec2::new(134.0, 16.0)), Some(MarkerKind::RotateTopRight));
        assert_eq!(layout.hit_test(Vec2::new(70.0, 93.0)), Some(MarkerKind::ShearBottom));
        assert_eq!(layout.hit_test(Vec2::new(70.0, 55.0)), None);
    }

    #[test]
    fn test_flipped_node_mirrors_frame() {
        let layout = layout_for(Point3::new(-100, 50, 1));
        assert_eq!(layout.border_position(), Point::new(120, 30));
        assert_eq!(layout.border_size(), Point::new(100, 50));
        assert!((layout.rotation().abs() - std::f32::consts::PI).abs() < 1e-4);
    }

    #[test]
    fn test_flipped_width_keeps_markers_outside() {
        // box spans x 20..120, y 30..80
        let layout = layout_for(Point3::new(-100, 50, 1));
        assert_eq!(layout.center(MarkerKind::ResizeTop), Point::new(70, 25));
        assert_eq!(layout.center(MarkerKind::ResizeTopLeft), Point::new(125, 25));
        assert_eq!(layout.center(MarkerKind::ResizeRight), Point::new(15, 55));
        assert_eq!(layout.center(MarkerKind::ShearTop), Point::new(70, 16));
        assert_eq!(layout.center(MarkerKind::ShearBottom), Point::new(70, 94));
        assert_eq!(layout.hit_test(Vec2::new(70.0, 35.0)), None);
    }

    #[test]
    fn test_flipped_height_keeps_markers_outside() {
        // frame top is the lower edge of the box at y 80
        let layout = layout_for(Point3::new(100, -50, 1));
        assert_eq!(layout.border_position(), Point::new(20, 80));
        assert_eq!(layout.center(MarkerKind::ResizeTop), Point::new(70, 85));
        assert_eq!(layout.center(MarkerKind::ShearTop), Point::new(70, 94));
        assert_eq!(layout.center(MarkerKind::ResizeBottom), Point::new(70, 25));
        assert_eq!(layout.center(MarkerKind::ShearBottom), Point::new(70, 16));
        assert_eq!(layout.hit_test(Vec2::new(70.0, 75.0)), None);
    }

    #[test]
    fn test_anchors() {
        assert!(MarkerKind::ResizeTop.is_edge());
        assert!(MarkerKind::ShearTop.is_horizontal_edge());
        assert!(!MarkerKind::ShearLeft.is_horizontal_edge());
        assert!(!MarkerKind::RotateTopLeft.is_edge());
        assert_eq!(MarkerKind::ResizeTopLeft.pivot_anchor(), Vec2::ONE);
        assert_eq!(MarkerKind::ShearLeft.pivot_anchor(), Vec2::new(1.0, 0.5));
        assert_eq!(MarkerKind::ALL.iter().filter(|k| k.action() == MarkerAction::Rotate).count(), 4);
    }
}
