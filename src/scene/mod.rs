//! Scene graph: an ordered list of nodes plus background and fog.
//!
//! The scene host owns its scene outright. Outside code appends through the
//! host and edits existing nodes through a [`SceneView`], which has no way
//! to swap out the scene, its background or its fog.

mod light;
mod mesh;
mod node;

pub use light::*;
pub use mesh::*;
pub use node::*;

use crate::math::Color;

/// Distance fog, blending towards `color` between `near` and `far`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

impl Fog {
    pub fn new(color: Color, near: f32, far: f32) -> Self {
        Self { color, near, far }
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<Node>,
    background: Option<Color>,
    fog: Option<Fog>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node, after every existing one
    pub fn add(&mut self, node: impl Into<Node>) {
        self.nodes.push(node.into());
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|node| node.id() == id)
    }

    /// First node with the given name
    pub fn find(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.name.as_deref() == Some(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.nodes
            .iter_mut()
            .find(|node| node.name.as_deref() == Some(name))
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn fog(&self) -> Option<Fog> {
        self.fog
    }

    pub(crate) fn set_background(&mut self, color: Color) {
        self.background = Some(color);
    }

    pub(crate) fn set_fog(&mut self, fog: Fog) {
        self.fog = Some(fog);
    }

    pub(crate) fn view(&mut self) -> SceneView<'_> {
        SceneView { scene: self }
    }
}

/// Mutable access to the nodes of a scene the caller does not own
pub struct SceneView<'a> {
    scene: &'a mut Scene,
}

impl SceneView<'_> {
    pub fn add(&mut self, node: impl Into<Node>) {
        self.scene.add(node);
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.scene.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.scene.get_mut(id)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.scene.find_mut(name)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.scene.nodes.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.scene.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scene.is_empty()
    }
}
