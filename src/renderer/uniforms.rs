//! GPU uniform layouts. Field order and padding mirror `scene.wgsl`.

use glam::{Mat4, Vec3};

use crate::camera::PerspectiveCamera;
use crate::scene::{Material, NodeKind, Scene};

pub const MAX_HEMISPHERE_LIGHTS: usize = 4;
pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;

/// Camera uniform buffer data for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 3],
    pub _pad: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct HemisphereLightUniform {
    pub sky_color: [f32; 3],
    pub intensity: f32,
    pub ground_color: [f32; 3],
    pub _pad1: f32,
    /// Unit vector towards the sky
    pub direction: [f32; 3],
    pub _pad2: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirectionalLightUniform {
    pub color: [f32; 3],
    pub intensity: f32,
    /// Unit vector towards the light
    pub direction: [f32; 3],
    pub _pad: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FogUniform {
    pub color: [f32; 3],
    pub enabled: f32, // 1.0 when the scene has fog
    pub near: f32,
    pub far: f32,
    pub _pad: [f32; 2],
}

/// Per-frame data shared by every draw
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalsUniform {
    pub camera: CameraUniform,
    pub ambient: [f32; 3],
    pub hemisphere_count: u32,
    pub directional_count: u32,
    pub _pad: [u32; 3],
    pub hemisphere: [HemisphereLightUniform; MAX_HEMISPHERE_LIGHTS],
    pub directional: [DirectionalLightUniform; MAX_DIRECTIONAL_LIGHTS],
    pub fog: FogUniform,
}

impl GlobalsUniform {
    /// Collect camera, lights and fog for one frame
    ///
    /// Ambient lights are summed. Hemisphere and directional lights past the
    /// first four visible ones are ignored.
    pub fn from_scene(scene: &Scene, camera: &PerspectiveCamera) -> Self {
        let mut globals = Self {
            camera: camera.uniform(),
            ..Default::default()
        };

        let mut ambient = Vec3::ZERO;
        for node in scene.nodes().iter().filter(|node| node.visible) {
            let direction = light_direction(node.transform.position).to_array();
            match &node.kind {
                NodeKind::AmbientLight(light) => {
                    ambient += Vec3::from_array(light.color.to_linear()) * light.intensity;
                }
                NodeKind::HemisphereLight(light) => {
                    let count = globals.hemisphere_count as usize;
                    if count < MAX_HEMISPHERE_LIGHTS {
                        globals.hemisphere[count] = HemisphereLightUniform {
                            sky_color: light.sky_color.to_linear(),
                            intensity: light.intensity,
                            ground_color: light.ground_color.to_linear(),
                            direction,
                            ..Default::default()
                        };
                        globals.hemisphere_count += 1;
                    }
                }
                NodeKind::DirectionalLight(light) => {
                    let count = globals.directional_count as usize;
                    if count < MAX_DIRECTIONAL_LIGHTS {
                        globals.directional[count] = DirectionalLightUniform {
                            color: light.color.to_linear(),
                            intensity: light.intensity,
                            direction,
                            _pad: 0.0,
                        };
                        globals.directional_count += 1;
                    }
                }
                NodeKind::Mesh(_) | NodeKind::Camera => {}
            }
        }
        globals.ambient = ambient.to_array();

        if let Some(fog) = scene.fog() {
            globals.fog = FogUniform {
                color: fog.color.to_linear(),
                enabled: 1.0,
                near: fog.near,
                far: fog.far,
                _pad: [0.0; 2],
            };
        }

        globals
    }
}

/// Lights shine from their position towards the origin
fn light_direction(position: Vec3) -> Vec3 {
    position.try_normalize().unwrap_or(Vec3::Y)
}

/// Per-draw data, bound with a dynamic offset
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    /// Linear rgb plus opacity
    pub color: [f32; 4],
    pub fog: f32,
    pub _pad: [f32; 3],
}

impl ObjectUniform {
    pub fn new(model: Mat4, material: &Material) -> Self {
        let [r, g, b] = material.color.to_linear();
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            color: [r, g, b, material.opacity],
            fog: if material.fog { 1.0 } else { 0.0 },
            _pad: [0.0; 3],
        }
    }
}
