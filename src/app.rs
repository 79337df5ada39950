use std::sync::Arc;

use log::{error, info};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::config::HostConfig;
use crate::core::{FpsCounter, LoopState};
use crate::host::SceneHost;
use crate::scene::Node;
use crate::window::WinitPlatform;

const FPS_UPDATE_INTERVAL: f32 = 1.0;
const FALLBACK_WIDTH: u32 = 800;
const FALLBACK_HEIGHT: u32 = 600;

/// Winit application driving one scene host
///
/// The host is built when the event loop resumes, which plays the part of
/// the page load event.
pub struct App {
    title: String,
    config: Option<HostConfig>,
    pending: Vec<Node>,
    frame_limit: Option<u64>,
    host: Option<SceneHost<WinitPlatform>>,
    fps: FpsCounter,
}

impl App {
    pub fn new(config: HostConfig) -> Self {
        Self {
            title: "Atmos".to_string(),
            config: Some(config),
            pending: Vec::new(),
            frame_limit: None,
            host: None,
            fps: FpsCounter::new(FPS_UPDATE_INTERVAL),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Nodes added to the scene once the host exists
    pub fn with_nodes(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.pending.extend(nodes);
        self
    }

    /// Stop the loop after `frames` frames
    pub fn with_frame_limit(mut self, frames: Option<u64>) -> Self {
        self.frame_limit = frames;
        self
    }

    fn create_host(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let Some(config) = self.config.take() else {
            return Ok(());
        };

        let window = event_loop.create_window(
            Window::default_attributes()
                .with_title(self.title.as_str())
                .with_visible(false)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    config.width.unwrap_or(FALLBACK_WIDTH),
                    config.height.unwrap_or(FALLBACK_HEIGHT),
                )),
        )?;

        let mut host = SceneHost::new(WinitPlatform::new(Arc::new(window)), config)?;
        host.add(self.pending.drain(..));
        if let Err(e) = host.on_load() {
            error!("Render error: {:#}", e);
        }
        self.host = Some(host);
        Ok(())
    }

    /// Stop the loop and release the renderer
    fn shut_down(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(host) = self.host.take() {
            host.loop_handle().stop();
            info!("Shutting down after {} frames", host.frame_count());
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.host.is_some() {
            return;
        }
        if let Err(e) = self.create_host(event_loop) {
            error!("Failed to start scene host: {:#}", e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(host) = self.host.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => self.shut_down(event_loop),
            WindowEvent::Resized(_) => host.on_resize(),
            WindowEvent::RedrawRequested => {
                if let Err(e) = host.tick() {
                    error!("Render error: {:#}", e);
                }

                let frame = host.last_frame();
                if let Some(fps) = self.fps.record(frame.delta) {
                    info!("FPS: {:.1}", fps);
                }

                if let Some(limit) = self.frame_limit {
                    if frame.number >= limit {
                        host.loop_handle().stop();
                    }
                }

                if host.loop_state() == LoopState::Stopped {
                    self.shut_down(event_loop);
                }
            }
            other => {
                host.process_event(&other);
            }
        }
    }
}
