//! Scene node definition.

use std::sync::atomic::{AtomicU64, Ordering};

use glam::{Mat4, Quat, Vec3};

use super::light::{AmbientLight, DirectionalLight, HemisphereLight};
use super::mesh::Mesh;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique node identifier, assigned when the node is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Translation, rotation and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, position) = matrix.to_scale_rotation_translation();
        Self {
            position,
            rotation,
            scale,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// What a node is
#[derive(Debug, Clone)]
pub enum NodeKind {
    Mesh(Mesh),
    AmbientLight(AmbientLight),
    HemisphereLight(HemisphereLight),
    DirectionalLight(DirectionalLight),
    /// Marks where the host camera is attached, never drawn
    Camera,
}

impl NodeKind {
    pub fn is_light(&self) -> bool {
        matches!(
            self,
            NodeKind::AmbientLight(_) | NodeKind::HemisphereLight(_) | NodeKind::DirectionalLight(_)
        )
    }
}

/// An entry in the scene
///
/// Not `Clone`: the id stays unique to one node.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    pub name: Option<String>,
    pub kind: NodeKind,
    pub transform: Transform,
    pub visible: bool,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId::next(),
            name: None,
            kind,
            transform: Transform::IDENTITY,
            visible: true,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.transform.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.transform.scale = scale;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut Mesh> {
        match &mut self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }
}

impl From<NodeKind> for Node {
    fn from(kind: NodeKind) -> Self {
        Node::new(kind)
    }
}

impl From<Mesh> for Node {
    fn from(mesh: Mesh) -> Self {
        Node::new(NodeKind::Mesh(mesh))
    }
}

impl From<AmbientLight> for Node {
    fn from(light: AmbientLight) -> Self {
        Node::new(NodeKind::AmbientLight(light))
    }
}

impl From<HemisphereLight> for Node {
    fn from(light: HemisphereLight) -> Self {
        Node::new(NodeKind::HemisphereLight(light))
    }
}

impl From<DirectionalLight> for Node {
    fn from(light: DirectionalLight) -> Self {
        Node::new(NodeKind::DirectionalLight(light))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Color;
    use crate::scene::{Geometry, Material};

    #[test]
    fn test_ids_unique() {
        let a = Node::new(NodeKind::Camera);
        let b = Node::new(NodeKind::Camera);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_builder() {
        let node: Node = AmbientLight::new(Color::WHITE).into();
        let node = node
            .with_name("fill")
            .with_position(Vec3::new(1.0, 2.0, 3.0))
            .with_visible(false);

        assert_eq!(node.name.as_deref(), Some("fill"));
        assert_eq!(node.transform.position, Vec3::new(1.0, 2.0, 3.0));
        assert!(!node.visible);
        assert!(node.kind.is_light());
        assert!(node.as_mesh().is_none());
    }

    #[test]
    fn test_transform_matrix_round_trip() {
        let transform = Transform {
            position: Vec3::new(1.0, -2.0, 3.0),
            rotation: Quat::from_rotation_y(0.5),
            scale: Vec3::splat(2.0),
        };
        let back = Transform::from_matrix(transform.matrix());
        assert!((back.position - transform.position).length() < 1e-5);
        assert!((back.scale - transform.scale).length() < 1e-5);
        assert!(back.rotation.angle_between(transform.rotation) < 1e-4);
    }

    #[test]
    fn test_mesh_into_node() {
        let node: Node = Mesh::new(Geometry::cuboid(1.0, 1.0, 1.0), Material::default()).into();
        assert!(node.as_mesh().is_some());
        assert!(!node.kind.is_light());
    }
}
