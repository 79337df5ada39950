//! Scene renderers.
//!
//! [`RenderBackend`] is what the scene host drives; [`GpuRenderer`] is the
//! wgpu implementation that draws into a winit window.

mod gpu;
pub mod uniforms;

pub use gpu::GpuRenderer;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::camera::PerspectiveCamera;
use crate::core::WindowDimensions;
use crate::math::Color;
use crate::scene::Scene;

/// Options fixed when the renderer is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RendererOptions {
    pub antialias: bool,
    pub shadow_map_enabled: bool,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            antialias: true,
            shadow_map_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowMapType {
    Basic,
    Pcf,
    /// Percentage-closer filtering with softened edges
    #[default]
    PcfSoft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShadowMap {
    pub enabled: bool,
    pub kind: ShadowMapType,
}

/// Draws a scene through a camera onto an output surface
pub trait RenderBackend {
    /// Physical pixels per logical pixel
    fn set_pixel_ratio(&mut self, ratio: f64);

    fn pixel_ratio(&self) -> f64;

    /// Output size in logical pixels
    fn set_size(&mut self, width: u32, height: u32);

    fn size(&self) -> WindowDimensions;

    /// Colour used where the scene has no background
    fn set_clear_color(&mut self, color: Color, alpha: f32);

    fn set_shadow_map(&mut self, shadow_map: ShadowMap);

    fn shadow_map(&self) -> ShadowMap;

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<()>;
}

/// Linear RGBA the frame is cleared to
///
/// An opaque scene background wins over the renderer clear colour.
pub fn frame_clear_color(background: Option<Color>, clear: Color, alpha: f32) -> [f64; 4] {
    let (color, alpha) = match background {
        Some(background) => (background, 1.0),
        None => (clear, alpha),
    };
    let [r, g, b] = color.to_linear();
    [r as f64, g as f64, b as f64, alpha as f64]
}

/// Logical size scaled to physical pixels
pub fn physical_size(logical: WindowDimensions, pixel_ratio: f64) -> WindowDimensions {
    let scale = |v: u32| (v as f64 * pixel_ratio).round().max(0.0) as u32;
    WindowDimensions::new(scale(logical.width), scale(logical.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = RendererOptions::default();
        assert!(options.antialias);
        assert!(options.shadow_map_enabled);
    }

    #[test]
    fn test_default_shadow_type_is_soft() {
        assert_eq!(ShadowMap::default().kind, ShadowMapType::PcfSoft);
        assert!(!ShadowMap::default().enabled);
    }

    #[test]
    fn test_background_overrides_clear_color() {
        let clear = frame_clear_color(Some(Color::WHITE), Color::BLACK, 0.0);
        assert_eq!(clear, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_clear_color_keeps_alpha() {
        let clear = frame_clear_color(None, Color::from_hex(0xFF0000), 0.0);
        assert_eq!(clear, [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_physical_size() {
        let logical = WindowDimensions::new(800, 600);
        assert_eq!(physical_size(logical, 1.0), logical);
        assert_eq!(physical_size(logical, 2.0), WindowDimensions::new(1600, 1200));
        assert_eq!(physical_size(WindowDimensions::new(101, 51), 1.5), WindowDimensions::new(152, 77));
    }
}
