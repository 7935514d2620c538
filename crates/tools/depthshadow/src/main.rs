//! Depthshadow CLI - shadow masks and projected textures for point clouds

mod cli;
mod config;
mod progress;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use cube::{glam::Vec3, PointCloud, Projection};
use image::DynamicImage;
use renderer::{
    depth_image, mask_image, Camera, ColorizeSettings, Colorizer, KrtCamera, LightRig,
    RasterLimits, ShadowMaskBuilder, ShadowSettings,
};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use cli::{Cli, ColorizeArgs, Commands, MaskArgs};
use config::{load_config, DepthShadowConfig};
use progress::BarProgress;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DepthShadowConfig::default(),
    };
    let mut progress = BarProgress::new(cli.quiet);

    match &cli.command {
        Commands::Mask(args) => mask_command(args, config, &mut progress),
        Commands::Colorize(args) => colorize_command(args, config, &mut progress),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_points(path: &Path) -> Result<(PointCloud, Vec<Vec3>)> {
    let cloud = PointCloud::load(path)
        .with_context(|| format!("failed to load point cloud {}", path.display()))?;
    let points = cloud
        .positions()
        .with_context(|| format!("point cloud {} has no positions", path.display()))?;
    ensure!(
        !points.is_empty(),
        "point cloud {} has no vertices",
        path.display()
    );
    tracing::info!(path = %path.display(), points = points.len(), "loaded point cloud");
    Ok((cloud, points))
}

fn load_camera(path: &Path, scale: f32) -> Result<KrtCamera> {
    let camera = KrtCamera::load(path)
        .with_context(|| format!("failed to load camera {}", path.display()))?;
    let camera = camera
        .scaled(scale)
        .with_context(|| format!("failed to scale camera {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        size = %camera.image_plane_size(),
        "loaded camera"
    );
    Ok(camera)
}

fn save_image(image: impl Into<DynamicImage>, path: &Path, what: &str) -> Result<()> {
    image
        .into()
        .save(path)
        .with_context(|| format!("failed to write {} {}", what, path.display()))?;
    tracing::info!(path = %path.display(), "wrote {}", what);
    Ok(())
}

fn mask_command(
    args: &MaskArgs,
    config: DepthShadowConfig,
    progress: &mut BarProgress,
) -> Result<()> {
    let settings = args.apply(config.mask);
    settings.validate()?;

    let (cloud, points) = load_points(&args.ply)?;
    let bounds = cloud.bounds().context("point cloud has no bounds")?;
    let half_extent = settings.resolution / 2.0;

    let sensor = Camera::from(load_camera(&args.camera, settings.scale)?);
    let rig = LightRig::new(settings.azimuth, settings.elevation, settings.depth_map_size);
    let light = Camera::from(rig.camera(&bounds.expanded(half_extent)));

    let output = ShadowMaskBuilder::new(&light, &sensor)
        .with_settings(ShadowSettings {
            half_extent,
            bias: settings.bias,
            limits: RasterLimits {
                max_depth: settings.max_depth,
                ..RasterLimits::default()
            },
        })
        .build(&points, progress);

    if let Some(path) = &args.depthmap {
        let visualization = depth_image(&output.light_depth, args.colormap);
        save_image(visualization, path, "light depth map")?;
    }
    save_image(mask_image(&output.mask), &args.output, "shadow mask")
}

fn colorize_command(
    args: &ColorizeArgs,
    config: DepthShadowConfig,
    progress: &mut BarProgress,
) -> Result<()> {
    let settings = args.apply(config.colorize);
    settings.validate()?;

    let (_, points) = load_points(&args.ply)?;
    let camera = load_camera(&args.camera, 1.0)?;
    let projector = load_camera(&args.projector, settings.projector_scale)?;

    let image = image::open(&args.image)
        .with_context(|| format!("failed to read image {}", args.image.display()))?
        .to_rgb8();

    let result = Colorizer::new(&projector, &camera)
        .with_settings(ColorizeSettings {
            half_extent: settings.resolution / 2.0,
            epsilon: settings.epsilon,
            limits: RasterLimits {
                max_depth: settings.max_depth,
                ..RasterLimits::default()
            },
        })
        .render(&points, &image, progress)?;

    save_image(result, &args.output, "colorized image")
}
