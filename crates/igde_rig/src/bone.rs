//! Rig bones

use igde_math::{radians, Mat4, Vec3};

use crate::elements::RigElement;
use crate::rig::BoneId;

/// A bone of the rig skeleton.
///
/// `orientation` is stored in degrees. `matrix` is the rest pose in rig
/// space and is only valid while `is_dirty()` is false.
#[derive(Debug, Clone)]
pub struct RigBone {
    pub name: String,
    parent: Option<BoneId>,
    pub position: Vec3,
    pub orientation: Vec3,
    pub central_mass_point: Vec3,
    pub mass: f32,
    pub dynamic: bool,
    order: Option<usize>,
    dirty_matrix: bool,
    matrix: Mat4,
    pose_matrix: Mat4,
}

impl RigElement for RigBone {
    const KIND: &'static str = "bone";
}

impl RigBone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            position: Vec3::ZERO,
            orientation: Vec3::ZERO,
            central_mass_point: Vec3::ZERO,
            mass: 1.0,
            dynamic: false,
            order: None,
            dirty_matrix: true,
            matrix: Mat4::IDENTITY,
            pose_matrix: Mat4::IDENTITY,
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Orientation in degrees
    pub fn with_orientation(mut self, orientation: Vec3) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_parent(mut self, parent: BoneId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn parent(&self) -> Option<BoneId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<BoneId>) {
        self.parent = parent;
    }

    /// Position in the parent-first bone order, `None` until ordered.
    pub fn order(&self) -> Option<usize> {
        self.order
    }

    pub(crate) fn set_order(&mut self, order: Option<usize>) {
        self.order = order;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_matrix
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty_matrix = true;
    }

    /// Bone placement relative to its parent.
    pub fn local_matrix(&self) -> Mat4 {
        let rotation = Vec3::new(
            radians(self.orientation.x),
            radians(self.orientation.y),
            radians(self.orientation.z),
        );
        Mat4::from_rotation_translation(rotation, self.position)
    }

    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    pub(crate) fn set_matrix(&mut self, matrix: Mat4) {
        self.matrix = matrix;
        self.dirty_matrix = false;
    }

    pub fn pose_matrix(&self) -> Mat4 {
        self.pose_matrix
    }

    pub fn set_pose_from_rest(&mut self) {
        self.pose_matrix = Mat4::IDENTITY;
    }
}
