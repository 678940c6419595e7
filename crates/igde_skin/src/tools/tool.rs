//! Canvas interaction trait.

use igde_math::Vec2;

use crate::error::Result;
use crate::skin::Skin;

/// Keyboard modifiers held during a mouse gesture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
    };
}

/// A mouse interaction on the constructed view.
///
/// Positions are view pixels. A gesture spans from a `true` returned by
/// [`on_drag_begin`](Self::on_drag_begin) to the matching
/// [`on_drag_finish`](Self::on_drag_finish).
pub trait ViewInteraction {
    /// Display name.
    fn name(&self) -> &str;

    /// Mouse button pressed. Returns whether a gesture starts.
    fn on_drag_begin(&mut self, skin: &mut Skin, position: Vec2, modifiers: Modifiers) -> Result<bool>;

    /// Mouse moved while the gesture runs.
    fn on_drag_update(&mut self, _skin: &mut Skin, _position: Vec2) -> Result<()> {
        Ok(())
    }

    /// Mouse button released or the gesture was aborted.
    fn on_drag_finish(&mut self, _skin: &mut Skin, _cancelled: bool) {}

    /// Whether a gesture is running.
    fn is_dragging(&self) -> bool {
        false
    }
}
