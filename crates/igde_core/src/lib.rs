//! # igde_core - Editor Core Primitives
//!
//! Zero-dependency building blocks shared by the editor crates:
//! - **Handles**: generation-checked references into element arenas
//! - **Errors**: the handle error reported when an arena lookup fails
//!
//! Editor documents (skin properties, rigs) store their elements in a
//! [`HandleMap`] and hand out [`Handle`]s instead of pointers, so a stale
//! reference held by an undo command is detected instead of dereferenced.

pub mod error;
pub mod handle;

pub use error::*;
pub use handle::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::HandleError;
    pub use crate::handle::{Handle, HandleAllocator, HandleMap};
}
