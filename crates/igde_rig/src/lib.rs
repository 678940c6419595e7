//! # igde_rig - Rig Editing Core
//!
//! Bones, collision shapes, constraints and pushes of a rig, each stored in
//! a handle arena with an ordered selection.
//!
//! ## Features
//!
//! - **Elements**: [`RigBone`], [`RigShape`], [`RigConstraint`], [`RigPush`]
//! - **Selections**: [`ElementSelection`] with an active element per kind
//! - **Bone order**: parents before children, loops left unordered
//! - **Bone matrices**: sweep-based propagation that reports parent loops
//!   instead of hanging
//!
//! ```text
//! edit → Rig::invalidate → Rig::rebuild → reorder_bones → update_bone_matrices
//! ```

pub mod bone;
pub mod elements;
pub mod error;
pub mod rig;
pub mod selection;

pub use bone::RigBone;
pub use elements::{ElementStore, PushType, RigConstraint, RigElement, RigPush, RigShape, ShapeKind};
pub use error::{Result, RigError};
pub use rig::{
    BoneId, BoneSelection, BoneUpdateReport, ConstraintId, ConstraintSelection, PushId, PushSelection, Rig,
    ShapeId, ShapeSelection,
};
pub use selection::ElementSelection;

pub mod prelude {
    pub use crate::bone::RigBone;
    pub use crate::elements::{RigConstraint, RigPush, RigShape, ShapeKind};
    pub use crate::rig::{BoneId, Rig};
    pub use crate::{Result, RigError};
}
