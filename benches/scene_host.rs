use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use anyhow::Result;
use atmos_renderer::camera::PerspectiveCamera;
use atmos_renderer::controls::CameraControls;
use atmos_renderer::core::{WindowContext, WindowDimensions};
use atmos_renderer::demo::{rainbow_gradient, spin, DemoBuilder};
use atmos_renderer::math::Color;
use atmos_renderer::renderer::uniforms::{GlobalsUniform, ObjectUniform};
use atmos_renderer::renderer::{RenderBackend, RendererOptions, ShadowMap};
use atmos_renderer::scene::Scene;
use atmos_renderer::{HostConfig, SceneHost};

/// Platform with no window, its renderer builds the per-frame uniforms and
/// drops them
struct Headless;

struct HeadlessRenderer {
    size: WindowDimensions,
    shadow_map: ShadowMap,
}

struct IdleControls;

impl WindowContext for Headless {
    type Renderer = HeadlessRenderer;
    type Controls = IdleControls;

    fn dimensions(&self) -> WindowDimensions {
        WindowDimensions::new(1280, 720)
    }

    fn scale_factor(&self) -> f64 {
        1.0
    }

    fn create_renderer(&self, _options: &RendererOptions) -> Result<HeadlessRenderer> {
        Ok(HeadlessRenderer {
            size: self.dimensions(),
            shadow_map: ShadowMap::default(),
        })
    }

    fn create_controls(&self, _camera: &PerspectiveCamera) -> IdleControls {
        IdleControls
    }

    fn request_redraw(&self) {}

    fn show(&self) {}
}

impl RenderBackend for HeadlessRenderer {
    fn set_pixel_ratio(&mut self, _ratio: f64) {}

    fn pixel_ratio(&self) -> f64 {
        1.0
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.size = WindowDimensions::new(width, height);
    }

    fn size(&self) -> WindowDimensions {
        self.size
    }

    fn set_clear_color(&mut self, _color: Color, _alpha: f32) {}

    fn set_shadow_map(&mut self, shadow_map: ShadowMap) {
        self.shadow_map = shadow_map;
    }

    fn shadow_map(&self) -> ShadowMap {
        self.shadow_map
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<()> {
        black_box(GlobalsUniform::from_scene(scene, camera));
        for node in scene.nodes().iter().filter(|n| n.visible) {
            if let Some(mesh) = node.as_mesh() {
                black_box(ObjectUniform::new(node.transform.matrix(), &mesh.material));
            }
        }
        Ok(())
    }
}

impl CameraControls for IdleControls {
    fn update(&mut self, _camera: &mut PerspectiveCamera) -> bool {
        false
    }
}

/// Benchmark: one loop tick with a spinning ring of `count` boxes
fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_host_tick");

    for count in [16usize, 256, 4096] {
        let config = HostConfig::new().with_update(spin(0.5));
        let mut host = match SceneHost::new(Headless, config) {
            Ok(host) => host,
            Err(e) => panic!("headless host: {:#}", e),
        };
        host.add(
            DemoBuilder::new()
                .add_ground(Color::BLACK)
                .add_ring(50.0, count, 1.0, rainbow_gradient(count))
                .build(),
        );
        host.on_load().ok();

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| host.tick())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);
