use anyhow::Result;

use crate::camera::PerspectiveCamera;
use crate::controls::CameraControls;
use crate::renderer::{RenderBackend, RendererOptions};

/// Window dimensions in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowDimensions {
    pub width: u32,
    pub height: u32,
}

impl WindowDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height, `None` for a zero-area window
    pub fn aspect(&self) -> Option<f32> {
        if self.width == 0 || self.height == 0 {
            None
        } else {
            Some(self.width as f32 / self.height as f32)
        }
    }
}

/// Hosting window - everything the scene host needs from the platform
pub trait WindowContext {
    type Renderer: RenderBackend;
    type Controls: CameraControls;

    /// Current viewport size in logical pixels
    fn dimensions(&self) -> WindowDimensions;

    /// Physical pixels per logical pixel
    fn scale_factor(&self) -> f64;

    /// Create the renderer drawing into this window
    fn create_renderer(&self, options: &RendererOptions) -> Result<Self::Renderer>;

    /// Create a camera controller bound to this window's surface
    fn create_controls(&self, camera: &PerspectiveCamera) -> Self::Controls;

    /// Schedule the next frame
    fn request_redraw(&self);

    /// Make the output surface visible
    fn show(&self);
}
