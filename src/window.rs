use std::sync::Arc;

use anyhow::Result;
use winit::window::Window;

use crate::camera::PerspectiveCamera;
use crate::controls::OrbitControls;
use crate::core::{WindowContext, WindowDimensions};
use crate::renderer::{GpuRenderer, RendererOptions};

/// Winit window as the scene host platform
pub struct WinitPlatform {
    window: Arc<Window>,
}

impl WinitPlatform {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}

impl WindowContext for WinitPlatform {
    type Renderer = GpuRenderer;
    type Controls = OrbitControls;

    fn dimensions(&self) -> WindowDimensions {
        let size = self
            .window
            .inner_size()
            .to_logical::<u32>(self.window.scale_factor());
        WindowDimensions::new(size.width, size.height)
    }

    fn scale_factor(&self) -> f64 {
        self.window.scale_factor()
    }

    fn create_renderer(&self, options: &RendererOptions) -> Result<GpuRenderer> {
        pollster::block_on(GpuRenderer::new(self.window.clone(), options))
    }

    fn create_controls(&self, camera: &PerspectiveCamera) -> OrbitControls {
        OrbitControls::new(camera, self.dimensions())
    }

    fn request_redraw(&self) {
        self.window.request_redraw();
    }

    fn show(&self) {
        self.window.set_visible(true);
    }
}
