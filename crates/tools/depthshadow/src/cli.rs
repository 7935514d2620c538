use clap::{Args, Parser, Subcommand};
use renderer::ColorMap;
use std::path::PathBuf;

use crate::config::{ColorizeConfig, MaskConfig};

/// Depthshadow - shadow masks for voxelized point clouds
#[derive(Parser, Debug)]
#[command(name = "depthshadow")]
#[command(about = "Shadow masks and projected textures for voxelized point clouds", long_about = None)]
pub struct Cli {
    /// TOML file with default settings; flags override it
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Hide progress bars
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute which pixels of a sensor image are shadowed from the sun
    Mask(MaskArgs),

    /// Project an image onto the point cloud and render it from a camera
    Colorize(ColorizeArgs),
}

#[derive(Args, Debug)]
pub struct MaskArgs {
    /// Point cloud (.ply)
    #[arg(long)]
    pub ply: PathBuf,

    /// Sensor camera (KRt text file)
    #[arg(short, long)]
    pub camera: PathBuf,

    /// Output mask image
    #[arg(short, long)]
    pub output: PathBuf,

    /// Light azimuth in degrees clockwise from north [default: 183.29]
    #[arg(long, allow_negative_numbers = true)]
    pub azimuth: Option<f32>,

    /// Light elevation in degrees above the horizon [default: 62.16]
    #[arg(long)]
    pub elevation: Option<f32>,

    /// Voxel size in world units [default: 1.0]
    #[arg(short, long)]
    pub resolution: Option<f32>,

    /// Shadow bias in world units [default: 1.0]
    #[arg(short, long)]
    pub bias: Option<f32>,

    /// Light depth map resolution [default: 1024]
    #[arg(long = "dmapsize")]
    pub depth_map_size: Option<u32>,

    /// Output image scale [default: 1.0]
    #[arg(short, long)]
    pub scale: Option<f32>,

    /// Maximum subdivision depth per voxel [default: 16]
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Also save a visualization of the light depth map
    #[arg(long)]
    pub depthmap: Option<PathBuf>,

    /// Color map for the depth map visualization
    #[arg(long, default_value_t = ColorMap::Gray)]
    pub colormap: ColorMap,
}

impl MaskArgs {
    /// Apply explicit flags on top of file or built-in settings
    pub fn apply(&self, mut config: MaskConfig) -> MaskConfig {
        if let Some(v) = self.azimuth {
            config.azimuth = v;
        }
        if let Some(v) = self.elevation {
            config.elevation = v;
        }
        if let Some(v) = self.resolution {
            config.resolution = v;
        }
        if let Some(v) = self.bias {
            config.bias = v;
        }
        if let Some(v) = self.depth_map_size {
            config.depth_map_size = v;
        }
        if let Some(v) = self.scale {
            config.scale = v;
        }
        if let Some(v) = self.max_depth {
            config.max_depth = v;
        }
        config
    }
}

#[derive(Args, Debug)]
pub struct ColorizeArgs {
    /// Point cloud (.ply)
    #[arg(long)]
    pub ply: PathBuf,

    /// Camera to render from (KRt text file)
    #[arg(short, long)]
    pub camera: PathBuf,

    /// Camera the image was taken with (KRt text file)
    #[arg(short, long)]
    pub projector: PathBuf,

    /// Image to project
    #[arg(short, long)]
    pub image: PathBuf,

    /// Output image
    #[arg(short, long)]
    pub output: PathBuf,

    /// Voxel size in world units [default: 1.0]
    #[arg(short, long)]
    pub resolution: Option<f32>,

    /// Projector image scale [default: 0.5]
    #[arg(long)]
    pub projector_scale: Option<f32>,

    /// Projector distance tolerance in world units [default: 1.0]
    #[arg(long)]
    pub epsilon: Option<f32>,

    /// Maximum subdivision depth per voxel [default: 16]
    #[arg(long)]
    pub max_depth: Option<u32>,
}

impl ColorizeArgs {
    pub fn apply(&self, mut config: ColorizeConfig) -> ColorizeConfig {
        if let Some(v) = self.resolution {
            config.resolution = v;
        }
        if let Some(v) = self.projector_scale {
            config.projector_scale = v;
        }
        if let Some(v) = self.epsilon {
            config.epsilon = v;
        }
        if let Some(v) = self.max_depth {
            config.max_depth = v;
        }
        config
    }
}
