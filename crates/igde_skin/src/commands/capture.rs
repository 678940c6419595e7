//! Node geometry snapshots shared by the transform commands.

use igde_math::{Point3, TexMatrix2, Vec2};

use crate::error::{Result, SkinError};
use crate::node::NodeId;
use crate::property::Property;

/// Geometry of one node at capture time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeState {
    pub node: NodeId,
    pub position: Point3,
    pub size: Point3,
    pub rotation: f32,
    pub shearing: f32,
    /// Screen transform at capture time
    pub screen: TexMatrix2,
}

impl NodeState {
    pub fn capture(property: &Property, node: NodeId) -> Result<Self> {
        let data = property.node(node)?;
        Ok(Self {
            node,
            position: data.position(),
            size: data.size(),
            rotation: data.rotation(),
            shearing: data.shearing(),
            screen: property.screen_transform(node)?,
        })
    }

    /// Write the captured fields back verbatim.
    pub fn restore(&self, property: &mut Property) -> Result<()> {
        property.restore_geometry(self.node, self.position, self.size, self.rotation, self.shearing)
    }
}

/// Snapshots of a set of nodes together with their masks and descendants,
/// owners always before the nodes they own.
#[derive(Clone, Debug, Default)]
pub struct CapturedNodes {
    states: Vec<NodeState>,
}

impl CapturedNodes {
    pub fn capture(property: &Property, nodes: &[NodeId]) -> Result<Self> {
        if nodes.is_empty() {
            return Err(SkinError::Empty);
        }
        let mut states = Vec::new();
        for &node in nodes {
            for id in property.subtree(node)? {
                states.push(NodeState::capture(property, id)?);
            }
        }
        Ok(Self { states })
    }

    pub fn states(&self) -> &[NodeState] {
        &self.states
    }

    /// Place every captured node at `captured_screen * pending`, expressed
    /// in its owner's current screen space.
    pub fn apply(&self, property: &mut Property, pending: &TexMatrix2) -> Result<()> {
        for state in &self.states {
            state.restore(property)?;
            let owner = property.owner_screen_transform(state.node)?;
            let matrix = state.screen * *pending * owner.inverse();
            property.set_from_matrix(state.node, &matrix, state.size, state.rotation)?;
        }
        Ok(())
    }

    pub fn restore(&self, property: &mut Property) -> Result<()> {
        for state in &self.states {
            state.restore(property)?;
        }
        Ok(())
    }
}

/// Apply `delta` around `pivot` inside the frame spanned by the linear part
/// of `basis`.
pub fn pivot_transform(pivot: Vec2, basis: &TexMatrix2, delta: &TexMatrix2) -> TexMatrix2 {
    let basis = basis.linear();
    TexMatrix2::translation(-pivot) * basis.inverse() * *delta * basis * TexMatrix2::translation(pivot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pivot_transform_keeps_pivot() {
        let pivot = Vec2::new(30.0, -4.0);
        let basis = TexMatrix2::shear(0.3, 0.0) * TexMatrix2::rotation(0.7);
        let m = pivot_transform(pivot, &basis, &TexMatrix2::scale(2.0, 0.5));
        let p = m * pivot;
        assert_relative_eq!(p.x, pivot.x, epsilon = 1e-4);
        assert_relative_eq!(p.y, pivot.y, epsilon = 1e-4);
    }

    #[test]
    fn test_pivot_transform_scales_along_basis_axis() {
        let basis = TexMatrix2::rotation(core::f32::consts::FRAC_PI_2);
        let m = pivot_transform(Vec2::ZERO, &basis, &TexMatrix2::scale(2.0, 1.0));
        // the basis x axis points along screen y
        let p = m * Vec2::new(0.0, 10.0);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(p.y, 20.0, epsilon = 1e-4);
    }
}
