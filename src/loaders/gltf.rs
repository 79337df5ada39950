use anyhow::{bail, Context, Result};
use glam::{Mat4, Vec3};
use log::{debug, info, warn};
use std::path::Path;

use crate::math::Color;
use crate::scene::{Geometry, Material, Mesh, Node, Transform, Vertex};

/// Loads a glTF file as mesh nodes, one per triangle primitive
pub fn load_gltf_meshes(path: impl AsRef<Path>) -> Result<Vec<Node>> {
    let path = path.as_ref();
    info!("Loading glTF file: {:?}", path);

    let (gltf, buffers, _images) =
        gltf::import(path).with_context(|| format!("Failed to load glTF file: {:?}", path))?;

    meshes_from_document(&gltf, &buffers)
}

/// Same as [`load_gltf_meshes`] for an in-memory `.gltf` or `.glb`
pub fn load_gltf_meshes_from_slice(bytes: &[u8]) -> Result<Vec<Node>> {
    let (gltf, buffers, _images) =
        gltf::import_slice(bytes).context("Failed to load glTF data")?;

    meshes_from_document(&gltf, &buffers)
}

fn meshes_from_document(
    gltf: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Result<Vec<Node>> {
    debug!(
        "glTF: {} scenes, {} nodes, {} meshes",
        gltf.scenes().count(),
        gltf.nodes().count(),
        gltf.meshes().count()
    );

    let mut nodes = Vec::new();
    for scene in gltf.scenes() {
        for node in scene.nodes() {
            process_node(&node, buffers, Mat4::IDENTITY, &mut nodes)?;
        }
    }

    if nodes.is_empty() {
        warn!("No triangle geometry found in glTF data");
    }
    info!("Extracted {} meshes from glTF", nodes.len());
    Ok(nodes)
}

/// Recursively processes glTF nodes, accumulating transforms
fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent_transform: Mat4,
    out: &mut Vec<Node>,
) -> Result<()> {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global_transform = parent_transform * local_transform;

    if let Some(mesh) = node.mesh() {
        let name = node.name().or(mesh.name()).map(str::to_owned);
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                warn!("Skipping {:?} primitive in mesh {:?}", primitive.mode(), mesh.name());
                continue;
            }

            let geometry = read_geometry(&primitive, buffers)?;
            let material = read_material(&primitive.material());

            let mut scene_node = Node::from(Mesh::new(geometry, material))
                .with_transform(Transform::from_matrix(global_transform));
            scene_node.name = name.clone();
            out.push(scene_node);
        }
    }

    for child in node.children() {
        process_node(&child, buffers, global_transform, out)?;
    }

    Ok(())
}

fn read_geometry(primitive: &gltf::Primitive, buffers: &[gltf::buffer::Data]) -> Result<Geometry> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data[..]));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .context("Mesh primitive has no positions")?
        .collect();
    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    if let Some(&bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
        bail!(
            "Index {} out of range for {} vertices",
            bad,
            positions.len()
        );
    }

    match reader.read_normals() {
        Some(normals) => {
            let vertices = positions
                .iter()
                .zip(normals)
                .map(|(&position, normal)| Vertex::new(position, normal))
                .collect();
            Ok(Geometry::new(vertices, indices))
        }
        None => Ok(flat_shaded(&positions, &indices)),
    }
}

/// Unwelds triangles so every face gets its own normal
pub fn flat_shaded(positions: &[[f32; 3]], indices: &[u32]) -> Geometry {
    let mut vertices = Vec::with_capacity(indices.len());
    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]]
            .map(|i| Vec3::from_array(positions[i as usize]));
        let normal = (b - a).cross(c - a).normalize_or_zero().to_array();
        vertices.extend([a, b, c].map(|p| Vertex::new(p.to_array(), normal)));
    }

    let indices = (0..vertices.len() as u32).collect();
    Geometry::new(vertices, indices)
}

fn read_material(material: &gltf::Material) -> Material {
    let [r, g, b, a] = material.pbr_metallic_roughness().base_color_factor();
    Material::new(Color::from_linear(r, g, b)).with_opacity(a)
}

#[cfg(test)]
mod tests {
    use super::*;

    // One triangle (0,0,0) (1,0,0) (0,1,0), no normals, no indices
    const TRIANGLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "name": "tri", "mesh": 0, "translation": [1.0, 2.0, 3.0] }],
        "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 }, "material": 0 }] }],
        "materials": [{ "pbrMetallicRoughness": { "baseColorFactor": [1.0, 0.0, 0.0, 0.5] } }],
        "accessors": [{
            "bufferView": 0,
            "componentType": 5126,
            "count": 3,
            "type": "VEC3",
            "min": [0.0, 0.0, 0.0],
            "max": [1.0, 1.0, 0.0]
        }],
        "bufferViews": [{ "buffer": 0, "byteLength": 36 }],
        "buffers": [{
            "byteLength": 36,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA"
        }]
    }"#;

    #[test]
    fn test_flat_shaded_normals() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]];
        let geometry = flat_shaded(&positions, &[0, 1, 2]);

        assert_eq!(geometry.vertices().len(), 3);
        assert_eq!(geometry.indices(), &[0, 1, 2]);
        for vertex in geometry.vertices() {
            assert_eq!(vertex.normal, [0.0, 1.0, 0.0]);
        }
    }

    #[test]
    fn test_flat_shaded_degenerate_triangle() {
        let positions = [[0.0, 0.0, 0.0]; 3];
        let geometry = flat_shaded(&positions, &[0, 1, 2]);
        assert_eq!(geometry.vertices()[0].normal, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_load_triangle() {
        let nodes = load_gltf_meshes_from_slice(TRIANGLE_GLTF.as_bytes()).unwrap();
        assert_eq!(nodes.len(), 1);

        let node = &nodes[0];
        assert_eq!(node.name.as_deref(), Some("tri"));
        assert!((node.transform.position - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-6);

        let mesh = node.as_mesh().unwrap();
        assert_eq!(mesh.geometry.triangle_count(), 1);
        assert_eq!(mesh.geometry.vertices()[0].normal, [0.0, 0.0, 1.0]);
        assert_eq!(mesh.material.color.hex(), 0xFF0000);
        assert_eq!(mesh.material.opacity, 0.5);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_gltf_meshes("/nonexistent/model.gltf").unwrap_err();
        assert!(err.to_string().contains("model.gltf"));
    }

    #[test]
    fn test_load_invalid_data() {
        assert!(load_gltf_meshes_from_slice(b"not a gltf").is_err());
    }
}
