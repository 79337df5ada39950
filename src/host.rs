//! The scene host: renderer, camera, lights, fog and controller wired
//! together behind a single `add` operation and a per-frame loop.

use anyhow::{Context, Result};
use glam::Vec3;
use log::{debug, info, trace};
use winit::event::WindowEvent;

use crate::camera::PerspectiveCamera;
use crate::config::{HostConfig, ResolvedConfig, UpdateFn};
use crate::controls::CameraControls;
use crate::core::{Clock, FrameInfo, LoopHandle, LoopState, WindowContext};
use crate::renderer::{RenderBackend, ShadowMap, ShadowMapType};
use crate::scene::{AmbientLight, HemisphereLight, Node, NodeId, NodeKind, Scene, Transform};

/// Where the hemisphere light sits; its direction points from here to the origin
pub const HEMISPHERE_LIGHT_POSITION: Vec3 = Vec3::new(1.0, 2.0, 0.0);

/// Owns a scene and everything needed to draw it every frame
///
/// The scene itself is private. Objects go in through [`SceneHost::add`];
/// the update callback edits them through a [`SceneView`](crate::scene::SceneView).
pub struct SceneHost<P: WindowContext> {
    platform: P,
    config: ResolvedConfig,
    clock: Clock,
    renderer: P::Renderer,
    scene: Scene,
    camera: PerspectiveCamera,
    camera_node: NodeId,
    controls: P::Controls,
    update: Option<UpdateFn>,
    state: LoopState,
    stop: LoopHandle,
    frame: FrameInfo,
}

impl<P: WindowContext> SceneHost<P> {
    pub fn new(platform: P, mut config: HostConfig) -> Result<Self> {
        let update = config.update.take();
        let resolved = config.resolve(platform.dimensions());
        debug!("Resolved host config: {:?}", resolved);

        let clock = Clock::new();

        let mut renderer = platform
            .create_renderer(&resolved.renderer)
            .context("Failed to create renderer")?;
        renderer.set_pixel_ratio(platform.scale_factor());
        renderer.set_size(resolved.width, resolved.height);
        renderer.set_clear_color(resolved.ambient, 0.0);
        renderer.set_shadow_map(ShadowMap {
            enabled: true,
            kind: ShadowMapType::PcfSoft,
        });

        let mut scene = Scene::new();
        scene.set_fog(resolved.fog);
        scene.set_background(resolved.background);

        scene.add(Node::from(AmbientLight::new(resolved.ambient)).with_name("ambient"));

        let mut camera = PerspectiveCamera::new(
            resolved.camera.fov,
            resolved.camera.aspect,
            resolved.camera.near,
            resolved.camera.far,
        );
        camera.position = resolved.position;
        let marker = Node::new(NodeKind::Camera)
            .with_name("camera")
            .with_transform(camera_transform(&camera));
        let camera_node = marker.id();
        scene.add(marker);

        let controls = platform.create_controls(&camera);

        scene.add(
            Node::from(HemisphereLight::new(resolved.ambient, resolved.ground, 1.0))
                .with_name("hemisphere")
                .with_position(HEMISPHERE_LIGHT_POSITION),
        );

        platform.show();
        info!(
            "Scene host ready at {}x{}",
            resolved.width, resolved.height
        );

        Ok(Self {
            platform,
            config: resolved,
            clock,
            renderer,
            scene,
            camera,
            camera_node,
            controls,
            update,
            state: LoopState::Idle,
            stop: LoopHandle::new(),
            frame: FrameInfo::new(0, 0.0, 0.0),
        })
    }

    /// Append objects to the scene in the given order
    pub fn add<I>(&mut self, objects: I)
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        for object in objects {
            self.scene.add(object);
        }
    }

    /// Start the render loop and run the first frame
    ///
    /// Only the first call has any effect.
    pub fn on_load(&mut self) -> Result<()> {
        if self.state != LoopState::Idle {
            debug!("Ignoring load event in {:?} state", self.state);
            return Ok(());
        }
        info!("Render loop started");
        self.state = LoopState::Running;
        self.tick()
    }

    /// Follow a viewport change: camera and controls first, then renderer
    pub fn on_resize(&mut self) {
        let viewport = self.platform.dimensions();
        debug!("Resize to {}x{}", viewport.width, viewport.height);

        if let Some(aspect) = viewport.aspect() {
            self.camera.aspect = aspect;
            self.camera.update_projection_matrix();
        }
        self.controls.resize(viewport, &self.camera);
        self.renderer.set_size(viewport.width, viewport.height);
    }

    /// Run one frame of the loop
    ///
    /// Schedules the next frame, advances the controller, runs the update
    /// callback, then renders. Does nothing unless the loop is running.
    pub fn tick(&mut self) -> Result<()> {
        if self.state != LoopState::Running {
            return Ok(());
        }
        if self.stop.is_stopped() {
            info!("Render loop stopped after {} frames", self.frame.number);
            self.state = LoopState::Stopped;
            return Ok(());
        }

        self.platform.request_redraw();

        let delta = self.clock.tick();
        if self.controls.update(&mut self.camera) {
            if let Some(marker) = self.scene.get_mut(self.camera_node) {
                marker.transform = camera_transform(&self.camera);
            }
        }
        if let Some(update) = self.update.as_mut() {
            update(delta, &mut self.scene.view());
        }

        self.frame = FrameInfo::new(self.frame.number + 1, self.clock.elapsed(), delta);
        trace!("Frame {} (delta {:.4}s)", self.frame.number, delta);

        self.renderer
            .render(&self.scene, &self.camera)
            .with_context(|| format!("Failed to render frame {}", self.frame.number))
    }

    /// Pass an input event to the camera controller
    pub fn process_event(&mut self, event: &WindowEvent) -> bool {
        self.controls.process_event(event)
    }

    pub fn loop_handle(&self) -> LoopHandle {
        self.stop.clone()
    }

    pub fn loop_state(&self) -> LoopState {
        self.state
    }

    /// Frames run since the loop started
    pub fn frame_count(&self) -> u64 {
        self.frame.number
    }

    /// Number and timing of the most recent frame
    pub fn last_frame(&self) -> FrameInfo {
        self.frame
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn renderer(&self) -> &P::Renderer {
        &self.renderer
    }

    pub fn controls(&self) -> &P::Controls {
        &self.controls
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }
}

/// World transform of the camera marker node
fn camera_transform(camera: &PerspectiveCamera) -> Transform {
    let (_, rotation, _) = camera.view_matrix().inverse().to_scale_rotation_translation();
    Transform {
        position: camera.position,
        rotation,
        scale: Vec3::ONE,
    }
}
