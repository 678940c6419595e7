//! Rig shapes, constraints and pushes plus the arena shared by all
//! element kinds

use igde_core::{Handle, HandleMap};
use igde_math::Vec3;

use crate::error::{Result, RigError};
use crate::rig::BoneId;
use crate::selection::ElementSelection;

/// An element kind stored in a [`Rig`](crate::Rig).
pub trait RigElement {
    /// Name used in error messages
    const KIND: &'static str;
}

/// Collision shape geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeKind {
    Sphere { radius: f32 },
    Box { half_extends: Vec3 },
    Cylinder { half_height: f32, radius: f32 },
    Capsule { half_height: f32, radius: f32 },
    Hull,
}

/// Collision shape attached to a bone or to the rig itself.
#[derive(Debug, Clone)]
pub struct RigShape {
    pub kind: ShapeKind,
    bone: Option<BoneId>,
    pub position: Vec3,
    /// Degrees
    pub orientation: Vec3,
}

impl RigElement for RigShape {
    const KIND: &'static str = "shape";
}

impl RigShape {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            bone: None,
            position: Vec3::ZERO,
            orientation: Vec3::ZERO,
        }
    }

    pub fn with_bone(mut self, bone: BoneId) -> Self {
        self.bone = Some(bone);
        self
    }

    pub fn bone(&self) -> Option<BoneId> {
        self.bone
    }

    pub(crate) fn clear_bone(&mut self) {
        self.bone = None;
    }
}

/// Physics constraint between a bone and an optional second bone.
#[derive(Debug, Clone)]
pub struct RigConstraint {
    bone: Option<BoneId>,
    constraint_bone: Option<BoneId>,
    pub position: Vec3,
    pub orientation: Vec3,
    pub damping_linear: f32,
    pub damping_angular: f32,
    pub damping_spring: f32,
    pub is_rope: bool,
    pub breaking_threshold: f32,
}

impl RigElement for RigConstraint {
    const KIND: &'static str = "constraint";
}

impl Default for RigConstraint {
    fn default() -> Self {
        Self {
            bone: None,
            constraint_bone: None,
            position: Vec3::ZERO,
            orientation: Vec3::ZERO,
            damping_linear: 1.0,
            damping_angular: 1.0,
            damping_spring: 1.0,
            is_rope: false,
            breaking_threshold: 0.0,
        }
    }
}

impl RigConstraint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bone(mut self, bone: BoneId) -> Self {
        self.bone = Some(bone);
        self
    }

    pub fn with_constraint_bone(mut self, bone: BoneId) -> Self {
        self.constraint_bone = Some(bone);
        self
    }

    pub fn bone(&self) -> Option<BoneId> {
        self.bone
    }

    pub fn constraint_bone(&self) -> Option<BoneId> {
        self.constraint_bone
    }

    /// Drop every reference to `bone`.
    pub(crate) fn forget_bone(&mut self, bone: BoneId) {
        if self.bone == Some(bone) {
            self.bone = None;
        }
        if self.constraint_bone == Some(bone) {
            self.constraint_bone = None;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PushType {
    #[default]
    Simple,
    Explosion,
    Implosion,
}

/// Simulation push applied to the rig's collision shapes.
#[derive(Debug, Clone)]
pub struct RigPush {
    pub push_type: PushType,
    pub position: Vec3,
    pub orientation: Vec3,
    pub impuls: f32,
    pub ray_count: u32,
    /// Cone angle in degrees
    pub cone: f32,
}

impl RigElement for RigPush {
    const KIND: &'static str = "push";
}

impl Default for RigPush {
    fn default() -> Self {
        Self {
            push_type: PushType::Simple,
            position: Vec3::ZERO,
            orientation: Vec3::ZERO,
            impuls: 1.0,
            ray_count: 1,
            cone: 180.0,
        }
    }
}

impl RigPush {
    pub fn new(push_type: PushType) -> Self {
        Self {
            push_type,
            ..Self::default()
        }
    }
}

/// Arena of one element kind with insertion order and selection.
pub struct ElementStore<T> {
    elements: HandleMap<T>,
    order: Vec<Handle<T>>,
    selection: ElementSelection<T>,
}

impl<T> Default for ElementStore<T> {
    fn default() -> Self {
        Self {
            elements: HandleMap::new(),
            order: Vec::new(),
            selection: ElementSelection::default(),
        }
    }
}

impl<T: RigElement> ElementStore<T> {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: Handle<T>) -> bool {
        self.elements.contains(id)
    }

    pub fn get(&self, id: Handle<T>) -> Result<&T> {
        self.elements
            .get(id)
            .map_err(|err| RigError::from_handle(err, T::KIND, id.to_bits()))
    }

    pub fn get_mut(&mut self, id: Handle<T>) -> Result<&mut T> {
        self.elements
            .get_mut(id)
            .map_err(|err| RigError::from_handle(err, T::KIND, id.to_bits()))
    }

    /// Handles in insertion order.
    pub fn ids(&self) -> &[Handle<T>] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> + '_ {
        self.order
            .iter()
            .filter_map(move |&id| self.elements.get(id).ok().map(|element| (id, element)))
    }

    pub fn selection(&self) -> &ElementSelection<T> {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut ElementSelection<T> {
        &mut self.selection
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> {
        self.elements.iter_mut()
    }

    pub(crate) fn insert(&mut self, element: T) -> Result<Handle<T>> {
        let id = self
            .elements
            .insert(element)
            .map_err(|err| RigError::from_handle(err, T::KIND, u32::MAX))?;
        self.order.push(id);
        Ok(id)
    }

    pub(crate) fn remove(&mut self, id: Handle<T>) -> Result<T> {
        let element = self
            .elements
            .remove(id)
            .map_err(|err| RigError::from_handle(err, T::KIND, id.to_bits()))?;
        self.order.retain(|&other| other != id);
        if self.selection.contains(id) {
            self.selection.remove(id)?;
        }
        Ok(element)
    }

    /// Remove every element. Slots are freed one by one so handles held
    /// from before stay stale once their slot is reused.
    pub(crate) fn clear(&mut self) {
        for id in self.order.drain(..) {
            if let Err(err) = self.elements.remove(id) {
                log::warn!("Failed to remove {} {:?}: {}", T::KIND, id, err);
            }
        }
        self.selection.remove_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_keeps_insertion_order() {
        let mut store = ElementStore::<RigPush>::default();
        let a = store.insert(RigPush::new(PushType::Explosion)).unwrap();
        let b = store.insert(RigPush::default()).unwrap();
        let c = store.insert(RigPush::new(PushType::Implosion)).unwrap();
        store.remove(b).unwrap();
        assert_eq!(store.ids(), &[a, c]);
        assert_eq!(store.get(c).unwrap().push_type, PushType::Implosion);
    }

    #[test]
    fn test_remove_deselects() {
        let mut store = ElementStore::<RigShape>::default();
        let a = store.insert(RigShape::new(ShapeKind::Sphere { radius: 0.5 })).unwrap();
        let b = store.insert(RigShape::new(ShapeKind::Hull)).unwrap();
        store.selection_mut().add(a).unwrap();
        store.selection_mut().add(b).unwrap();

        store.remove(a).unwrap();
        assert!(!store.selection().contains(a));
        assert_eq!(store.selection().active(), Some(b));
    }

    #[test]
    fn test_clear_keeps_old_handles_stale() {
        let mut store = ElementStore::<RigPush>::default();
        let old = store.insert(RigPush::new(PushType::Explosion)).unwrap();
        store.clear();
        assert!(store.is_empty());

        let new = store.insert(RigPush::new(PushType::Implosion)).unwrap();
        assert_ne!(old, new);
        assert_eq!(old.index(), new.index());
        assert!(matches!(store.get(old), Err(RigError::NotFound { kind: "push", .. })));
        assert_eq!(store.ids(), &[new]);
    }

    #[test]
    fn test_stale_handle_is_not_found() {
        let mut store = ElementStore::<RigConstraint>::default();
        let a = store.insert(RigConstraint::new()).unwrap();
        store.remove(a).unwrap();
        assert!(matches!(store.get(a), Err(RigError::NotFound { kind: "constraint", .. })));
        assert!(matches!(store.remove(a), Err(RigError::NotFound { .. })));
    }
}
