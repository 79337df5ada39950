//! Scene host configuration.
//!
//! [`HostConfig`] is what callers write: every field optional, loadable from
//! JSON. [`HostConfig::resolve`] merges it field by field over the defaults
//! below and yields the immutable [`ResolvedConfig`] the host is built from.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec3;
use serde::Deserialize;

use crate::core::WindowDimensions;
use crate::math::Color;
use crate::renderer::RendererOptions;
use crate::scene::{Fog, SceneView};

pub const DEFAULT_BACKGROUND: Color = Color::from_hex(0xFF0000);
pub const DEFAULT_AMBIENT: Color = Color::from_hex(0xFFBB00);
pub const DEFAULT_LIGHT: Color = Color::from_hex(0x0000FF);
pub const DEFAULT_GROUND: Color = Color::from_hex(0x000000);
pub const DEFAULT_FOG_COLOR: Color = Color::from_hex(0x0000FF);
pub const DEFAULT_FOG_NEAR: f32 = 1.0;
pub const DEFAULT_FOG_FAR: f32 = 1e3;
pub const DEFAULT_FOV: f32 = 120.0;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 2e4;

/// Per-frame callback: elapsed seconds since the previous frame, and the
/// scene's nodes
pub type UpdateFn = Box<dyn FnMut(f32, &mut SceneView<'_>)>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Position> for Vec3 {
    fn from(p: Position) -> Self {
        Vec3::new(p.x, p.y, p.z)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FogConfig {
    pub color: Option<Color>,
    pub near: Option<f32>,
    pub far: Option<f32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov: Option<f32>,
    pub aspect: Option<f32>,
    pub near: Option<f32>,
    pub far: Option<f32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererConfig {
    pub antialias: Option<bool>,
    pub shadow_map_enabled: Option<bool>,
}

/// Caller-facing options, all optional
#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub background: Option<Color>,
    /// Ambient light colour, also the renderer clear colour
    pub ambient: Option<Color>,
    /// Reserved colour slot, resolved but not wired to anything
    pub light: Option<Color>,
    /// Lower hemisphere light colour
    pub ground: Option<Color>,
    pub renderer: Option<RendererConfig>,
    /// Initial camera position
    pub position: Option<Position>,
    pub fog: Option<FogConfig>,
    pub camera: Option<CameraConfig>,
    #[serde(skip)]
    pub update: Option<UpdateFn>,
}

impl fmt::Debug for HostConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostConfig")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("background", &self.background)
            .field("ambient", &self.ambient)
            .field("light", &self.light)
            .field("ground", &self.ground)
            .field("renderer", &self.renderer)
            .field("position", &self.position)
            .field("fog", &self.fog)
            .field("camera", &self.camera)
            .field("update", &self.update.as_ref().map(|_| "FnMut"))
            .finish()
    }
}

impl HostConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse host configuration")
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        Self::from_json_str(&json).with_context(|| format!("In config file {:?}", path))
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_background(mut self, color: impl Into<Color>) -> Self {
        self.background = Some(color.into());
        self
    }

    pub fn with_ambient(mut self, color: impl Into<Color>) -> Self {
        self.ambient = Some(color.into());
        self
    }

    /// Colour kept in the resolved config; no light uses it yet
    pub fn with_light(mut self, color: impl Into<Color>) -> Self {
        self.light = Some(color.into());
        self
    }

    pub fn with_ground(mut self, color: impl Into<Color>) -> Self {
        self.ground = Some(color.into());
        self
    }

    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Some(Position { x, y, z });
        self
    }

    pub fn with_fog(mut self, fog: FogConfig) -> Self {
        self.fog = Some(fog);
        self
    }

    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn with_renderer(mut self, renderer: RendererConfig) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_update<F>(mut self, update: F) -> Self
    where
        F: FnMut(f32, &mut SceneView<'_>) + 'static,
    {
        self.update = Some(Box::new(update));
        self
    }

    /// Merge over the defaults; `viewport` supplies the default size
    pub fn resolve(&self, viewport: WindowDimensions) -> ResolvedConfig {
        let width = self.width.unwrap_or(viewport.width);
        let height = self.height.unwrap_or(viewport.height);

        let fog = self.fog.unwrap_or_default();
        let camera = self.camera.unwrap_or_default();
        let renderer = self.renderer.unwrap_or_default();
        let defaults = RendererOptions::default();

        ResolvedConfig {
            width,
            height,
            background: self.background.unwrap_or(DEFAULT_BACKGROUND),
            ambient: self.ambient.unwrap_or(DEFAULT_AMBIENT),
            light: self.light.unwrap_or(DEFAULT_LIGHT),
            ground: self.ground.unwrap_or(DEFAULT_GROUND),
            renderer: RendererOptions {
                antialias: renderer.antialias.unwrap_or(defaults.antialias),
                shadow_map_enabled: renderer
                    .shadow_map_enabled
                    .unwrap_or(defaults.shadow_map_enabled),
            },
            position: self.position.unwrap_or_default().into(),
            fog: Fog::new(
                fog.color.unwrap_or(DEFAULT_FOG_COLOR),
                fog.near.unwrap_or(DEFAULT_FOG_NEAR),
                fog.far.unwrap_or(DEFAULT_FOG_FAR),
            ),
            camera: CameraSettings {
                fov: camera.fov.unwrap_or(DEFAULT_FOV),
                aspect: camera.aspect.unwrap_or_else(|| {
                    WindowDimensions::new(width, height).aspect().unwrap_or(1.0)
                }),
                near: camera.near.unwrap_or(DEFAULT_NEAR),
                far: camera.far.unwrap_or(DEFAULT_FAR),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

/// Construction-time snapshot with every default filled in
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub ambient: Color,
    pub light: Color,
    pub ground: Color,
    pub renderer: RendererOptions,
    pub position: Vec3,
    pub fog: Fog,
    pub camera: CameraSettings,
}
