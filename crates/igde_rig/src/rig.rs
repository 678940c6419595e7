//! The rig document: element arenas, bone ordering and bone matrix
//! propagation

use igde_core::Handle;
use igde_math::Mat4;

use crate::bone::RigBone;
use crate::elements::{ElementStore, RigConstraint, RigElement, RigPush, RigShape};
use crate::error::{Result, RigError};
use crate::selection::ElementSelection;

pub type BoneId = Handle<RigBone>;
pub type ShapeId = Handle<RigShape>;
pub type ConstraintId = Handle<RigConstraint>;
pub type PushId = Handle<RigPush>;

pub type BoneSelection = ElementSelection<RigBone>;
pub type ShapeSelection = ElementSelection<RigShape>;
pub type ConstraintSelection = ElementSelection<RigConstraint>;
pub type PushSelection = ElementSelection<RigPush>;

/// Outcome of [`Rig::update_bone_matrices`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoneUpdateReport {
    /// Bones whose matrix was recomputed
    pub updated: usize,
    /// Sweeps over the bone list, including the final one that found a loop
    pub passes: usize,
    /// Bones left with stale matrices because they sit on or below a loop
    pub stale: Vec<BoneId>,
}

impl BoneUpdateReport {
    pub fn has_loop(&self) -> bool {
        !self.stale.is_empty()
    }
}

/// A rig: bones, collision shapes, constraints and pushes.
///
/// Structural changes mark the rig dirty; [`Rig::rebuild`] refreshes the
/// bone order and matrices once per batch of changes.
#[derive(Default)]
pub struct Rig {
    bones: ElementStore<RigBone>,
    shapes: ElementStore<RigShape>,
    constraints: ElementStore<RigConstraint>,
    pushes: ElementStore<RigPush>,
    root_bone: Option<BoneId>,
    dirty: bool,
}

impl Rig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Refresh bone order, matrices and pose if the rig is dirty.
    ///
    /// Returns `false` when there was nothing to do.
    pub fn rebuild(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.reorder_bones();
        self.update_bone_matrices();
        self.set_pose_from_rest();
        self.dirty = false;
        log::debug!("Rebuilt rig with {} bones", self.bones.len());
        true
    }

    pub fn set_pose_from_rest(&mut self) {
        for (_, bone) in self.bones.iter_mut() {
            bone.set_pose_from_rest();
        }
    }

    // Bones

    pub fn bones(&self) -> &ElementStore<RigBone> {
        &self.bones
    }

    pub fn bone(&self, id: BoneId) -> Result<&RigBone> {
        self.bones.get(id)
    }

    /// Mutable bone access; marks the rig dirty.
    pub fn bone_mut(&mut self, id: BoneId) -> Result<&mut RigBone> {
        let bone = self.bones.get_mut(id)?;
        bone.mark_dirty();
        self.dirty = true;
        Ok(bone)
    }

    pub fn bone_selection(&self) -> &BoneSelection {
        self.bones.selection()
    }

    pub fn bone_selection_mut(&mut self) -> &mut BoneSelection {
        self.bones.selection_mut()
    }

    pub fn add_bone(&mut self, bone: RigBone) -> Result<BoneId> {
        if let Some(parent) = bone.parent() {
            self.bones.get(parent)?;
        }
        let id = self.bones.insert(bone)?;
        self.reorder_bones();
        self.update_bone_matrices();
        self.invalidate();
        log::debug!("Added bone {:?}", id);
        Ok(id)
    }

    /// Remove a bone, detaching its children and every element referring
    /// to it.
    pub fn remove_bone(&mut self, id: BoneId) -> Result<()> {
        self.bones.get(id)?;
        for (_, bone) in self.bones.iter_mut() {
            if bone.parent() == Some(id) {
                bone.set_parent(None);
                bone.mark_dirty();
            }
        }
        for (_, shape) in self.shapes.iter_mut() {
            if shape.bone() == Some(id) {
                shape.clear_bone();
            }
        }
        for (_, constraint) in self.constraints.iter_mut() {
            constraint.forget_bone(id);
        }
        if self.root_bone == Some(id) {
            self.root_bone = None;
        }
        self.bones.remove(id)?;
        self.reorder_bones();
        self.invalidate();
        log::debug!("Removed bone {:?}", id);
        Ok(())
    }

    pub fn remove_all_bones(&mut self) {
        for (_, shape) in self.shapes.iter_mut() {
            shape.clear_bone();
        }
        let ids: Vec<BoneId> = self.bones.ids().to_vec();
        for (_, constraint) in self.constraints.iter_mut() {
            for &id in &ids {
                constraint.forget_bone(id);
            }
        }
        self.root_bone = None;
        self.bones.clear();
        self.invalidate();
    }

    /// Re-parent a bone. Loops are accepted here and reported by
    /// [`Rig::update_bone_matrices`].
    pub fn set_bone_parent(&mut self, id: BoneId, parent: Option<BoneId>) -> Result<()> {
        if let Some(parent) = parent {
            self.bones.get(parent)?;
        }
        self.bones.get_mut(id)?.set_parent(parent);
        self.reorder_bones();
        self.update_bone_matrices();
        self.invalidate();
        Ok(())
    }

    pub fn root_bone(&self) -> Option<BoneId> {
        self.root_bone
    }

    pub fn set_root_bone(&mut self, bone: Option<BoneId>) -> Result<()> {
        if let Some(bone) = bone {
            self.bones.get(bone)?;
        }
        self.root_bone = bone;
        self.invalidate();
        Ok(())
    }

    /// Assign every bone a position with parents before children.
    ///
    /// Bones on or below a parent loop keep `None`. Returns the number of
    /// ordered bones.
    pub fn reorder_bones(&mut self) -> usize {
        for (_, bone) in self.bones.iter_mut() {
            bone.set_order(None);
        }

        let ids: Vec<BoneId> = self.bones.ids().to_vec();
        let mut next = 0;
        while next < ids.len() {
            let mut progressed = false;
            for &id in &ids {
                let ready = match self.bones.get(id) {
                    Ok(bone) if bone.order().is_none() => match bone.parent() {
                        Some(parent) => self
                            .bones
                            .get(parent)
                            .map_or(true, |parent| parent.order().is_some()),
                        None => true,
                    },
                    _ => false,
                };
                if !ready {
                    continue;
                }
                if let Ok(bone) = self.bones.get_mut(id) {
                    bone.set_order(Some(next));
                    next += 1;
                    progressed = true;
                }
            }
            if !progressed {
                log::warn!("Bone loop detected while ordering bones");
                break;
            }
        }
        next
    }

    /// Recompute every bone's rest matrix from its parent chain.
    ///
    /// Each sweep computes the dirty bones whose parent is already clean.
    /// A sweep that computes nothing means the remaining bones hang off a
    /// parent loop: the error is logged once and those bones stay stale.
    pub fn update_bone_matrices(&mut self) -> BoneUpdateReport {
        for (_, bone) in self.bones.iter_mut() {
            bone.mark_dirty();
        }

        let ids: Vec<BoneId> = self.bones.ids().to_vec();
        let mut report = BoneUpdateReport::default();
        let mut remaining = ids.len();

        while remaining > 0 {
            report.passes += 1;
            let mut cleared = 0;

            for &id in &ids {
                let matrix = match self.bones.get(id) {
                    Ok(bone) if bone.is_dirty() => match bone.parent() {
                        Some(parent) => match self.bones.get(parent) {
                            Ok(parent) if parent.is_dirty() => None,
                            Ok(parent) => Some(parent.matrix() * bone.local_matrix()),
                            Err(_) => Some(bone.local_matrix()),
                        },
                        None => Some(bone.local_matrix()),
                    },
                    _ => None,
                };
                if let (Some(matrix), Ok(bone)) = (matrix, self.bones.get_mut(id)) {
                    bone.set_matrix(matrix);
                    cleared += 1;
                }
            }

            if cleared == 0 {
                log::error!("Bone loop detected while updating bone matrices");
                break;
            }
            remaining -= cleared;
            report.updated += cleared;
        }

        report.stale = ids
            .into_iter()
            .filter(|&id| self.bones.get(id).map_or(false, RigBone::is_dirty))
            .collect();
        report
    }

    // Shapes

    pub fn shapes(&self) -> &ElementStore<RigShape> {
        &self.shapes
    }

    pub fn shape(&self, id: ShapeId) -> Result<&RigShape> {
        self.shapes.get(id)
    }

    pub fn shape_mut(&mut self, id: ShapeId) -> Result<&mut RigShape> {
        self.dirty = true;
        self.shapes.get_mut(id)
    }

    pub fn shape_selection(&self) -> &ShapeSelection {
        self.shapes.selection()
    }

    pub fn shape_selection_mut(&mut self) -> &mut ShapeSelection {
        self.shapes.selection_mut()
    }

    pub fn add_shape(&mut self, shape: RigShape) -> Result<ShapeId> {
        self.check_bone_ref(shape.bone())?;
        let id = self.shapes.insert(shape)?;
        self.invalidate();
        Ok(id)
    }

    pub fn remove_shape(&mut self, id: ShapeId) -> Result<()> {
        self.shapes.remove(id)?;
        self.invalidate();
        Ok(())
    }

    pub fn remove_all_shapes(&mut self) {
        self.shapes.clear();
        self.invalidate();
    }

    // Constraints

    pub fn constraints(&self) -> &ElementStore<RigConstraint> {
        &self.constraints
    }

    pub fn constraint(&self, id: ConstraintId) -> Result<&RigConstraint> {
        self.constraints.get(id)
    }

    pub fn constraint_mut(&mut self, id: ConstraintId) -> Result<&mut RigConstraint> {
        self.dirty = true;
        self.constraints.get_mut(id)
    }

    pub fn constraint_selection(&self) -> &ConstraintSelection {
        self.constraints.selection()
    }

    pub fn constraint_selection_mut(&mut self) -> &mut ConstraintSelection {
        self.constraints.selection_mut()
    }

    pub fn add_constraint(&mut self, constraint: RigConstraint) -> Result<ConstraintId> {
        self.check_bone_ref(constraint.bone())?;
        self.check_bone_ref(constraint.constraint_bone())?;
        let id = self.constraints.insert(constraint)?;
        self.invalidate();
        Ok(id)
    }

    pub fn remove_constraint(&mut self, id: ConstraintId) -> Result<()> {
        self.constraints.remove(id)?;
        self.invalidate();
        Ok(())
    }

    pub fn remove_all_constraints(&mut self) {
        self.constraints.clear();
        self.invalidate();
    }

    // Pushes

    pub fn pushes(&self) -> &ElementStore<RigPush> {
        &self.pushes
    }

    pub fn push(&self, id: PushId) -> Result<&RigPush> {
        self.pushes.get(id)
    }

    pub fn push_mut(&mut self, id: PushId) -> Result<&mut RigPush> {
        self.pushes.get_mut(id)
    }

    pub fn push_selection(&self) -> &PushSelection {
        self.pushes.selection()
    }

    pub fn push_selection_mut(&mut self) -> &mut PushSelection {
        self.pushes.selection_mut()
    }

    pub fn add_push(&mut self, push: RigPush) -> Result<PushId> {
        self.pushes.insert(push)
    }

    pub fn remove_push(&mut self, id: PushId) -> Result<()> {
        self.pushes.remove(id).map(|_| ())
    }

    pub fn remove_all_pushes(&mut self) {
        self.pushes.clear();
    }

    fn check_bone_ref(&self, bone: Option<BoneId>) -> Result<()> {
        match bone {
            Some(bone) if !self.bones.contains(bone) => Err(RigError::NotFound {
                kind: RigBone::KIND,
                bits: bone.to_bits(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ShapeKind;
    use igde_math::Vec3;

    #[test]
    fn test_add_bone_with_unknown_parent_fails() {
        let mut rig = Rig::new();
        let a = rig.add_bone(RigBone::new("a")).unwrap();
        rig.remove_bone(a).unwrap();

        let err = rig.add_bone(RigBone::new("b").with_parent(a)).unwrap_err();
        assert!(matches!(err, RigError::NotFound { kind: "bone", .. }));
        assert!(rig.bones().is_empty());
    }

    #[test]
    fn test_reorder_puts_parents_first() {
        let mut rig = Rig::new();
        let root = rig.add_bone(RigBone::new("root")).unwrap();
        let child = rig.add_bone(RigBone::new("child")).unwrap();
        let grandchild = rig.add_bone(RigBone::new("grandchild")).unwrap();
        rig.set_bone_parent(root, Some(child)).unwrap();
        rig.set_bone_parent(child, Some(grandchild)).unwrap();

        assert_eq!(rig.reorder_bones(), 3);
        assert_eq!(rig.bone(grandchild).unwrap().order(), Some(0));
        assert_eq!(rig.bone(child).unwrap().order(), Some(1));
        assert_eq!(rig.bone(root).unwrap().order(), Some(2));
    }

    #[test]
    fn test_reorder_stops_on_loop() {
        let mut rig = Rig::new();
        let free = rig.add_bone(RigBone::new("free")).unwrap();
        let a = rig.add_bone(RigBone::new("a")).unwrap();
        let b = rig.add_bone(RigBone::new("b").with_parent(a)).unwrap();
        rig.set_bone_parent(a, Some(b)).unwrap();

        assert_eq!(rig.reorder_bones(), 1);
        assert_eq!(rig.bone(free).unwrap().order(), Some(0));
        assert_eq!(rig.bone(a).unwrap().order(), None);
        assert_eq!(rig.bone(b).unwrap().order(), None);
    }

    #[test]
    fn test_remove_bone_detaches_references() {
        let mut rig = Rig::new();
        let parent = rig.add_bone(RigBone::new("parent")).unwrap();
        let child = rig.add_bone(RigBone::new("child").with_parent(parent)).unwrap();
        let shape = rig
            .add_shape(RigShape::new(ShapeKind::Sphere { radius: 1.0 }).with_bone(parent))
            .unwrap();
        let constraint = rig
            .add_constraint(RigConstraint::new().with_bone(child).with_constraint_bone(parent))
            .unwrap();
        rig.set_root_bone(Some(parent)).unwrap();
        rig.bone_selection_mut().add(parent).unwrap();

        rig.remove_bone(parent).unwrap();

        assert_eq!(rig.bone(child).unwrap().parent(), None);
        assert_eq!(rig.shape(shape).unwrap().bone(), None);
        assert_eq!(rig.constraint(constraint).unwrap().bone(), Some(child));
        assert_eq!(rig.constraint(constraint).unwrap().constraint_bone(), None);
        assert_eq!(rig.root_bone(), None);
        assert!(rig.bone_selection().is_empty());
        assert!(matches!(rig.remove_bone(parent), Err(RigError::NotFound { .. })));
    }

    #[test]
    fn test_rebuild_only_when_dirty() {
        let mut rig = Rig::new();
        let bone = rig
            .add_bone(RigBone::new("bone").with_position(Vec3::new(0.0, 1.0, 0.0)))
            .unwrap();
        assert!(rig.is_dirty());
        assert!(rig.rebuild());
        assert!(!rig.rebuild());

        rig.bone_mut(bone).unwrap().position = Vec3::new(0.0, 2.0, 0.0);
        assert!(rig.rebuild());
        let translation = rig.bone(bone).unwrap().matrix().translation();
        assert!((translation - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-6);
        assert_eq!(rig.bone(bone).unwrap().pose_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_remove_all_bones_invalidates_old_handles() {
        let mut rig = Rig::new();
        let old = rig.add_bone(RigBone::new("old")).unwrap();
        rig.remove_all_bones();
        let new = rig.add_bone(RigBone::new("new")).unwrap();

        assert_ne!(old, new);
        assert!(matches!(rig.bone(old), Err(RigError::NotFound { kind: "bone", .. })));
        assert_eq!(rig.bone(new).unwrap().name, "new");
        assert!(rig.set_root_bone(Some(old)).is_err());
    }

    #[test]
    fn test_elements_with_unknown_bone_are_rejected() {
        let mut rig = Rig::new();
        let gone = rig.add_bone(RigBone::new("gone")).unwrap();
        rig.remove_all_bones();

        assert!(rig.add_shape(RigShape::new(ShapeKind::Hull).with_bone(gone)).is_err());
        assert!(rig.add_constraint(RigConstraint::new().with_bone(gone)).is_err());
        assert!(rig.shapes().is_empty());
        assert!(rig.constraints().is_empty());
    }
}
