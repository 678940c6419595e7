//! Node drag tool.
//!
//! Pressing the mouse on a marker starts a resize, rotate or shear gesture,
//! pressing it on a node selects the node and starts a move. The command of
//! a gesture is created once the mouse left the drag threshold. Every later
//! update undoes the command, changes its parameters and executes it again,
//! so the whole gesture ends up as a single undo step.

use igde_math::{Point, TexMatrix2, Vec2};

use super::markers::{MarkerAction, MarkerKind, MarkerLayout, SelectionFrame};
use super::tool::{Modifiers, ViewInteraction};
use super::view::CanvasView;
use crate::commands::{Command, DragNodes, ResizeNodes, RotateNodes, ShearAxis, ShearNodes};
use crate::config::SkinEditorConfig;
use crate::error::Result;
use crate::node::NodeId;
use crate::property::Property;
use crate::selection::SelectionMode;
use crate::skin::Skin;

/// Gesture state; each variant keeps what its command needs.
enum DragState {
    Idle,
    Move {
        origin: Vec2,
        command: Option<DragNodes>,
    },
    Resize {
        origin: Vec2,
        pivot: Vec2,
        basis: TexMatrix2,
        extent: Vec2,
        /// Edge markers only move along this image space direction
        constraint: Option<Vec2>,
        command: Option<ResizeNodes>,
    },
    Rotate {
        origin: Vec2,
        pivot: Vec2,
        command: Option<RotateNodes>,
    },
    Shear {
        origin: Vec2,
        pivot: Vec2,
        basis: TexMatrix2,
        extent: Vec2,
        axis: ShearAxis,
        constraint: Vec2,
        command: Option<ShearNodes>,
    },
}

impl DragState {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Move { .. } => "move",
            Self::Resize { .. } => "resize",
            Self::Rotate { .. } => "rotate",
            Self::Shear { .. } => "shear",
        }
    }

    /// The gesture's command if it passed the threshold.
    fn into_command(self) -> Option<Box<dyn Command>> {
        match self {
            Self::Idle => None,
            Self::Move { command, .. } => command.map(|c| Box::new(c) as Box<dyn Command>),
            Self::Resize { command, .. } => command.map(|c| Box::new(c) as Box<dyn Command>),
            Self::Rotate { command, .. } => command.map(|c| Box::new(c) as Box<dyn Command>),
            Self::Shear { command, .. } => command.map(|c| Box::new(c) as Box<dyn Command>),
        }
    }
}

/// Drags, resizes, rotates and shears the selected nodes.
pub struct NodeDragTool {
    view: CanvasView,
    state: DragState,
}

impl Default for NodeDragTool {
    fn default() -> Self {
        Self::new(CanvasView::default())
    }
}

impl NodeDragTool {
    pub fn new(view: CanvasView) -> Self {
        Self {
            view,
            state: DragState::Idle,
        }
    }

    pub fn from_config(config: &SkinEditorConfig) -> Self {
        Self::new(CanvasView::new(config.zoom))
    }

    pub fn view(&self) -> &CanvasView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut CanvasView {
        &mut self.view
    }

    /// Marker layout for the current selection.
    pub fn markers(&self, skin: &Skin) -> Result<Option<MarkerLayout>> {
        let frame = SelectionFrame::from_selection(skin.property())?;
        let config = skin.config();
        Ok(frame.map(|frame| MarkerLayout::new(&frame, &self.view, config.marker_size, config.min_axis_length)))
    }

    /// End a running gesture, keeping what it applied so far.
    pub fn cancel(&mut self, skin: &mut Skin) {
        if self.is_dragging() {
            self.on_drag_finish(skin, true);
        }
    }

    fn begin_marker(&mut self, skin: &Skin, origin: Vec2, marker: MarkerKind) -> Result<bool> {
        let Some(frame) = SelectionFrame::from_selection(skin.property())? else {
            return Ok(false);
        };
        let min_axis = skin.config().min_axis_length;
        let pivot = frame.point(marker.pivot_anchor());
        let extent = frame.local_point(marker.anchor()) - frame.local_point(marker.pivot_anchor());
        let basis = *frame.transform();

        self.state = match marker.action() {
            MarkerAction::Resize => DragState::Resize {
                origin,
                pivot,
                basis,
                extent,
                constraint: marker
                    .is_edge()
                    .then(|| frame.axis_direction(!marker.is_horizontal_edge(), min_axis)),
                command: None,
            },
            MarkerAction::Rotate => DragState::Rotate {
                origin,
                pivot,
                command: None,
            },
            MarkerAction::Shear => {
                let horizontal = marker.is_horizontal_edge();
                DragState::Shear {
                    origin,
                    pivot,
                    basis,
                    extent,
                    axis: if horizontal { ShearAxis::X } else { ShearAxis::Y },
                    constraint: frame.axis_direction(horizontal, min_axis),
                    command: None,
                }
            }
        };
        log::debug!("Begin {} gesture on {:?}", self.state.name(), marker);
        Ok(true)
    }

    fn begin_node(&mut self, property: &mut Property, origin: Vec2, modifiers: Modifiers) -> Result<bool> {
        let Some(node) = property.node_at_position(self.view.to_canvas(origin))? else {
            if !modifiers.shift {
                property.clear_selection();
            }
            return Ok(false);
        };

        if modifiers.shift {
            property.select(node, SelectionMode::Toggle)?;
            if !property.selection().contains(node) {
                return Ok(false);
            }
        } else if property.selection().contains(node) {
            property.selection_mut().set_active(Some(node))?;
        } else {
            property.select(node, SelectionMode::Replace)?;
        }

        self.state = DragState::Move { origin, command: None };
        log::debug!("Begin move gesture on {:?}", node);
        Ok(true)
    }

    /// Image space distance converted into the active group's space.
    fn group_distance(&self, property: &Property, distance: Vec2) -> Result<Point> {
        let group = property.screen_transform(property.scope_group())?;
        let local = group.linear().inverse().transform_vector(self.view.to_canvas_distance(distance));
        Ok(local.round())
    }
}

/// Restrict a distance to a direction.
fn project(distance: Vec2, direction: Vec2) -> Vec2 {
    direction * distance.dot(direction)
}

fn selected_nodes(property: &Property) -> Vec<NodeId> {
    property.selection().selected().to_vec()
}

impl ViewInteraction for NodeDragTool {
    fn name(&self) -> &str {
        "Drag Node"
    }

    fn on_drag_begin(&mut self, skin: &mut Skin, position: Vec2, modifiers: Modifiers) -> Result<bool> {
        self.cancel(skin);

        if let Some(layout) = self.markers(skin)? {
            if let Some(marker) = layout.hit_test(position) {
                return self.begin_marker(skin, position, marker);
            }
        }
        self.begin_node(skin.property_mut(), position, modifiers)
    }

    fn on_drag_update(&mut self, skin: &mut Skin, position: Vec2) -> Result<()> {
        let threshold = skin.config().drag_threshold as f32;
        let min_axis = skin.config().min_axis_length;
        let scale = self.view.scale();
        let group_distance = match &self.state {
            DragState::Move { origin, .. } => Some(self.group_distance(skin.property(), position - *origin)?),
            _ => None,
        };
        let property = skin.property_mut();

        let outside_threshold = |origin: Vec2| {
            let delta = position - origin;
            delta.x.abs() >= threshold || delta.y.abs() >= threshold
        };
        let canvas_distance = |origin: Vec2| (position - origin) / scale;
        let canvas_position = self.view.to_canvas(position);

        match &mut self.state {
            DragState::Idle => {}

            DragState::Move { origin, command } => {
                if let Some(command) = command {
                    command.undo(property)?;
                } else if outside_threshold(*origin) {
                    *command = Some(DragNodes::new(property, &selected_nodes(property))?);
                } else {
                    return Ok(());
                }
                if let (Some(command), Some(distance)) = (command, group_distance) {
                    command.set_distance(distance);
                    command.execute(property)?;
                }
            }

            DragState::Resize {
                origin,
                pivot,
                basis,
                extent,
                constraint,
                command,
            } => {
                if let Some(command) = command {
                    command.undo(property)?;
                } else if outside_threshold(*origin) {
                    *command = Some(ResizeNodes::new(
                        property,
                        &selected_nodes(property),
                        *pivot,
                        *basis,
                        *extent,
                        min_axis,
                    )?);
                } else {
                    return Ok(());
                }
                if let Some(command) = command {
                    let distance = canvas_distance(*origin);
                    command.set_distance(match constraint {
                        Some(direction) => project(distance, *direction),
                        None => distance,
                    });
                    command.execute(property)?;
                }
            }

            DragState::Rotate { origin, pivot, command } => {
                if let Some(command) = command {
                    command.undo(property)?;
                } else if outside_threshold(*origin) {
                    *command = Some(RotateNodes::new(
                        property,
                        &selected_nodes(property),
                        *pivot,
                        self.view.to_canvas(*origin),
                        min_axis,
                    )?);
                } else {
                    return Ok(());
                }
                if let Some(command) = command {
                    command.set_target(canvas_position);
                    command.execute(property)?;
                }
            }

            DragState::Shear {
                origin,
                pivot,
                basis,
                extent,
                axis,
                constraint,
                command,
            } => {
                if let Some(command) = command {
                    command.undo(property)?;
                } else if outside_threshold(*origin) {
                    *command = Some(ShearNodes::new(
                        property,
                        &selected_nodes(property),
                        *pivot,
                        *basis,
                        *extent,
                        *axis,
                        min_axis,
                    )?);
                } else {
                    return Ok(());
                }
                if let Some(command) = command {
                    command.set_distance(project(canvas_distance(*origin), *constraint));
                    command.execute(property)?;
                }
            }
        }
        Ok(())
    }

    fn on_drag_finish(&mut self, skin: &mut Skin, cancelled: bool) {
        let state = std::mem::replace(&mut self.state, DragState::Idle);
        let name = state.name();
        if cancelled {
            log::warn!("Drag gesture {} cancelled, keeping its last state", name);
        }
        match state.into_command() {
            Some(command) => {
                log::debug!("Finish {} gesture: {}", name, command.description());
                skin.push(command);
            }
            None => log::debug!("Finish {} gesture without changes", name),
        }
    }

    fn is_dragging(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }
}
