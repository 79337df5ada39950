pub mod app;
pub mod camera;
pub mod cli;
pub mod config;
pub mod controls;
pub mod core;
pub mod demo;
pub mod host;
pub mod loaders;
pub mod math;
pub mod renderer;
pub mod scene;
pub mod window;

pub use config::HostConfig;
pub use host::SceneHost;
