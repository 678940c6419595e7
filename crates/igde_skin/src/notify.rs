//! Change notifications for views observing a skin.

use crate::node::NodeId;

/// A change made to a property's node tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyEvent {
    /// Geometry or content of a node changed
    NodeChanged(NodeId),
    /// Children of a group were added, removed or reordered
    StructureChanged(NodeId),
    /// A node's mask was set or removed
    MaskChanged(NodeId),
    /// Selected nodes or the active node changed
    SelectionChanged,
    /// The active node group changed
    ActiveGroupChanged,
    /// The active layer changed
    ActiveLayerChanged,
    /// The undo history changed
    UndoChanged,
}

/// Receives change notifications dispatched by [`crate::Skin::dispatch_events`].
pub trait SkinListener {
    fn on_event(&mut self, event: &PropertyEvent);
}

/// Collects events in order and drops immediate repeats.
#[derive(Debug, Default)]
pub(crate) struct EventQueue {
    events: Vec<PropertyEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: PropertyEvent) {
        if self.events.last() != Some(&event) {
            self.events.push(event);
        }
    }

    pub fn drain(&mut self) -> Vec<PropertyEvent> {
        std::mem::take(&mut self.events)
    }
}
