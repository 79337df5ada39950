//! Reusable builders for populating a scene host
//!
//! # Examples
//!
//! ```
//! use atmos_renderer::demo::*;
//! use atmos_renderer::math::Color;
//!
//! let nodes = DemoBuilder::new()
//!     .add_ground(Color::from_hex(0x333333))
//!     .add_ring(20.0, 32, 2.0, rainbow_gradient(32))
//!     .build();
//! assert_eq!(nodes.len(), 33);
//! ```

use glam::{Quat, Vec3};

use crate::math::{hsv_to_rgb, Color};
use crate::scene::{DirectionalLight, Geometry, Material, Mesh, Node, SceneView};

/// Name given to every box of a ring, what [`spin`] looks for
pub const RING_NODE: &str = "ring";

// ============================================================================
// Primitive Generators
// ============================================================================

/// Creates a ground plane at y = 0
pub fn ground(size: f32, color: Color) -> Node {
    Node::from(Mesh::new(Geometry::plane(size, size), Material::new(color))).with_name("ground")
}

/// Creates a single box centred at position
pub fn box_at(position: Vec3, size: Vec3, color: Color) -> Node {
    Node::from(Mesh::new(
        Geometry::cuboid(size.x, size.y, size.z),
        Material::new(color),
    ))
    .with_position(position)
}

/// Creates a circular ring of boxes around the Y axis, sharing one geometry
pub fn ring(
    center: Vec3,
    radius: f32,
    count: usize,
    box_size: f32,
    colors: impl Fn(usize) -> Color,
) -> Vec<Node> {
    let geometry = Geometry::cuboid(box_size, box_size, box_size);

    (0..count)
        .map(|i| {
            let angle = (i as f32 / count as f32) * std::f32::consts::TAU;
            let position = center + Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);
            Node::from(Mesh::new(geometry.clone(), Material::new(colors(i))))
                .with_name(RING_NODE)
                .with_position(position)
                .with_rotation(Quat::from_rotation_y(-angle))
        })
        .collect()
}

/// Creates a sun sphere that fog does not touch, plus a directional light
/// shining from the same spot
pub fn sun(position: Vec3, radius: f32, color: Color) -> [Node; 2] {
    let sphere = Node::from(Mesh::new(
        Geometry::sphere(radius, 32, 16),
        Material::new(color).with_fog(false),
    ))
    .with_name("sun")
    .with_position(position);
    let light = Node::from(DirectionalLight::new(color, 0.6))
        .with_name("sunlight")
        .with_position(position);
    [sphere, light]
}

// ============================================================================
// Color Generators
// ============================================================================

/// Generates rainbow colors based on index
pub fn rainbow_gradient(total: usize) -> impl Fn(usize) -> Color {
    move |i| {
        let [r, g, b] = hsv_to_rgb(i as f32 / total.max(1) as f32, 0.8, 0.9);
        Color::from_rgb(r, g, b)
    }
}

/// Generates a single solid color
pub fn solid_color(color: Color) -> impl Fn(usize) -> Color {
    move |_| color
}

// ============================================================================
// Animation
// ============================================================================

/// Update callback turning every ring box around the Y axis
pub fn spin(radians_per_second: f32) -> impl FnMut(f32, &mut SceneView<'_>) {
    move |delta, view| {
        let turn = Quat::from_rotation_y(radians_per_second * delta);
        for node in view.iter_mut() {
            if node.name.as_deref() == Some(RING_NODE) {
                node.transform.position = turn * node.transform.position;
                node.transform.rotation = turn * node.transform.rotation;
            }
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for demo scenes
pub struct DemoBuilder {
    nodes: Vec<Node>,
}

impl DemoBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn add_ground(mut self, color: Color) -> Self {
        self.nodes.push(ground(400.0, color));
        self
    }

    pub fn add_box(mut self, position: Vec3, size: Vec3, color: Color) -> Self {
        self.nodes.push(box_at(position, size, color));
        self
    }

    pub fn add_ring(
        mut self,
        radius: f32,
        count: usize,
        box_size: f32,
        colors: impl Fn(usize) -> Color,
    ) -> Self {
        let center = Vec3::new(0.0, box_size * 0.5, 0.0);
        self.nodes.extend(ring(center, radius, count, box_size, colors));
        self
    }

    pub fn add_sun(mut self, position: Vec3, radius: f32, color: Color) -> Self {
        self.nodes.extend(sun(position, radius, color));
        self
    }

    pub fn count(&self) -> usize {
        self.nodes.len()
    }

    pub fn build(self) -> Vec<Node> {
        self.nodes
    }
}

impl Default for DemoBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The scene the binary shows when no model is given
pub fn default_scene() -> Vec<Node> {
    DemoBuilder::new()
        .add_ground(Color::from_hex(0x2E4A2E))
        .add_ring(20.0, 24, 3.0, rainbow_gradient(24))
        .add_box(Vec3::new(0.0, 4.0, 0.0), Vec3::splat(8.0), Color::WHITE)
        .add_sun(Vec3::new(-150.0, 120.0, -300.0), 20.0, Color::from_hex(0xFFEE88))
        .build()
}
