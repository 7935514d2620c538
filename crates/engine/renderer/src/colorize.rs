//! Projection texturing
//!
//! An image taken by a projector camera is painted onto the point cloud and
//! the result is rendered from a second camera. Surfaces the projector
//! cannot see are painted with [`OCCLUDED_COLOR`](crate::raster::OCCLUDED_COLOR).

use cube::Projection;
use glam::Vec3;
use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::error::RenderError;
use crate::grid::{DepthBuffer, Grid2D, PixelRecord};
use crate::progress::{Pass, PassProgress};
use crate::raster::{depth_pass, ColorSink, RasterLimits, Rasterizer};
use crate::visualize::record_image;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorizeSettings {
    pub half_extent: f32,
    /// Largest projector distance difference still counted as the same
    /// surface
    pub epsilon: f32,
    pub limits: RasterLimits,
}

impl Default for ColorizeSettings {
    fn default() -> Self {
        Self {
            half_extent: 0.5,
            epsilon: 1.0,
            limits: RasterLimits::default(),
        }
    }
}

pub struct Colorizer<'a, Q: ?Sized, C: ?Sized> {
    projector: &'a Q,
    camera: &'a C,
    settings: ColorizeSettings,
}

impl<'a, Q, C> Colorizer<'a, Q, C>
where
    Q: Projection + ?Sized,
    C: Projection + ?Sized,
{
    pub fn new(projector: &'a Q, camera: &'a C) -> Self {
        Self {
            projector,
            camera,
            settings: ColorizeSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ColorizeSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Nearest range per projector pixel
    pub fn projector_depth<R: PassProgress + ?Sized>(
        &self,
        points: &[Vec3],
        progress: &mut R,
    ) -> DepthBuffer {
        depth_pass(
            self.projector,
            points,
            self.settings.half_extent,
            self.settings.limits,
            progress,
            Pass::ProjectorDepth,
        )
    }

    /// Render the cloud from the camera, textured with `image` as seen by
    /// the projector. The image is resized to the projector's plane first.
    pub fn render<R: PassProgress + ?Sized>(
        &self,
        points: &[Vec3],
        image: &RgbImage,
        progress: &mut R,
    ) -> Result<RgbImage, RenderError> {
        let projector_size = self.projector.image_plane_size();
        let texture = if image.dimensions() == (projector_size.x, projector_size.y) {
            image.clone()
        } else {
            tracing::debug!(
                from = ?image.dimensions(),
                to = %projector_size,
                "resizing projected image"
            );
            imageops::resize(image, projector_size.x, projector_size.y, FilterType::Triangle)
        };

        let projector_depth = self.projector_depth(points, progress);

        let mut records = Grid2D::<PixelRecord>::cleared(self.camera.image_plane_size());
        let mut sink = ColorSink::new(
            &mut records,
            self.projector,
            &projector_depth,
            &texture,
            self.settings.epsilon,
        )?;
        let stats = Rasterizer::new(self.camera)
            .with_limits(self.settings.limits)
            .rasterize_points(
                points,
                self.settings.half_extent,
                &mut sink,
                progress,
                Pass::Colorize,
            );
        tracing::info!(written = stats.written, "colorized projection complete");

        Ok(record_image(&records))
    }
}
