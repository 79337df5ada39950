pub mod gltf;

pub use gltf::{load_gltf_meshes, load_gltf_meshes_from_slice};
