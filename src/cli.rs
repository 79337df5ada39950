// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::config::HostConfig;
use crate::math::Color;

#[derive(Parser, Debug, Clone)]
#[command(name = "atmos-renderer")]
#[command(about = "Lit, fogged 3D scene viewer with orbit controls", long_about = None)]
pub struct Cli {
    /// JSON host configuration; flags below override its values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Render width in logical pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Render height in logical pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Scene background, e.g. "#112233"
    #[arg(long, value_name = "HEX")]
    pub background: Option<Color>,

    /// glTF model to show instead of the demo scene
    #[arg(long, value_name = "GLTF")]
    pub model: Option<PathBuf>,

    /// Stop after this many frames
    #[arg(long, value_name = "N")]
    pub frames: Option<u64>,
}

impl Cli {
    /// Config file contents with command-line overrides applied
    pub fn load_config(&self) -> Result<HostConfig> {
        let mut config = match &self.config {
            Some(path) => HostConfig::from_json_file(path)?,
            None => HostConfig::default(),
        };

        if let Some(width) = self.width {
            config.width = Some(width);
        }
        if let Some(height) = self.height {
            config.height = Some(height);
        }
        if let Some(background) = self.background {
            config.background = Some(background);
        }

        Ok(config)
    }
}
