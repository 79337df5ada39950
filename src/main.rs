use anyhow::Result;
use clap::Parser;
use log::info;
use winit::event_loop::EventLoop;

use atmos_renderer::app::App;
use atmos_renderer::cli::Cli;
use atmos_renderer::demo;
use atmos_renderer::loaders::load_gltf_meshes;

const RING_SPIN_SPEED: f32 = 0.2;
const DEMO_CAMERA_POSITION: [f32; 3] = [0.0, 15.0, 45.0];

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = cli.load_config()?;

    let nodes = match &cli.model {
        Some(path) => load_gltf_meshes(path)?,
        None => {
            if config.position.is_none() {
                let [x, y, z] = DEMO_CAMERA_POSITION;
                config = config.with_position(x, y, z);
            }
            config = config.with_update(demo::spin(RING_SPIN_SPEED));
            demo::default_scene()
        }
    };
    info!("Starting with {} scene objects", nodes.len());

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config)
        .with_title("Atmos Renderer")
        .with_nodes(nodes)
        .with_frame_limit(cli.frames);

    info!("Controls: drag to orbit, right-drag to pan, wheel to zoom, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
