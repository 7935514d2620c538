//! Two-camera shadow mask
//!
//! The light camera records, per light pixel, the distance to the surface
//! nearest the light. The sensor camera records the world position of the
//! surface it sees per pixel. A sensor pixel is in shadow when something
//! lies nearer to the light than its own surface does, by more than the
//! bias.

use cube::Projection;
use glam::Vec3;

use crate::grid::{pixel_at, DepthBuffer, PositionBuffer, ShadowMask, EMPTY_POSITION};
use crate::progress::{run_pass, Pass, PassProgress};
use crate::raster::{depth_pass, PositionSink, RasterLimits, Rasterizer};

/// Tuning values shared by all shadow passes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowSettings {
    /// Half the edge length of the cube rendered around each point
    pub half_extent: f32,
    /// Light-space depth margin before a surface counts as occluded
    pub bias: f32,
    pub limits: RasterLimits,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            half_extent: 0.5,
            bias: 1.0,
            limits: RasterLimits::default(),
        }
    }
}

/// Result of a full shadow computation
#[derive(Debug, Clone)]
pub struct ShadowOutput {
    pub mask: ShadowMask,
    pub light_depth: DepthBuffer,
}

impl ShadowOutput {
    /// Number of sensor pixels in shadow
    pub fn shadowed(&self) -> usize {
        self.mask.cells().iter().filter(|m| **m).count()
    }
}

/// Builds the shadow mask of a point cloud for one light and one sensor
pub struct ShadowMaskBuilder<'a, L: ?Sized, S: ?Sized> {
    light: &'a L,
    sensor: &'a S,
    settings: ShadowSettings,
}

impl<'a, L, S> ShadowMaskBuilder<'a, L, S>
where
    L: Projection + ?Sized,
    S: Projection + ?Sized,
{
    pub fn new(light: &'a L, sensor: &'a S) -> Self {
        Self {
            light,
            sensor,
            settings: ShadowSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ShadowSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &ShadowSettings {
        &self.settings
    }

    /// Pass 1: nearest-to-light depth per light pixel
    pub fn light_depth<R: PassProgress + ?Sized>(
        &self,
        points: &[Vec3],
        progress: &mut R,
    ) -> DepthBuffer {
        let buffer = depth_pass(
            self.light,
            points,
            self.settings.half_extent,
            self.settings.limits,
            progress,
            Pass::LightDepth,
        );

        let range = crate::visualize::depth_range(&buffer);
        tracing::info!(
            size = %buffer.size(),
            min = range.map(|r| r.0),
            max = range.map(|r| r.1),
            "light depth map complete"
        );
        buffer
    }

    /// Pass 2: nearest-to-sensor world position per sensor pixel
    pub fn sensor_positions<R: PassProgress + ?Sized>(
        &self,
        points: &[Vec3],
        progress: &mut R,
    ) -> PositionBuffer {
        let mut buffer = PositionBuffer::cleared(self.sensor.image_plane_size());
        let stats = Rasterizer::new(self.sensor)
            .with_limits(self.settings.limits)
            .rasterize_points(
                points,
                self.settings.half_extent,
                &mut PositionSink::new(&mut buffer),
                progress,
                Pass::SensorPosition,
            );
        tracing::info!(written = stats.written, "sensor position map complete");
        buffer
    }

    /// Pass 3: compare every recorded sensor surface against the light
    pub fn classify<R: PassProgress + ?Sized>(
        &self,
        light_depth: &DepthBuffer,
        positions: &PositionBuffer,
        progress: &mut R,
    ) -> ShadowMask {
        let mut mask = ShadowMask::cleared(positions.size());
        let width = positions.width() as usize;
        let cells = positions.cells();

        run_pass(progress, Pass::Classify, cells.len(), |i| {
            if self.is_shadowed(light_depth, cells[i]) {
                let (x, y) = ((i % width) as u32, (i / width) as u32);
                if let Some(cell) = mask.get_mut(x, y) {
                    *cell = true;
                }
            }
        });
        mask
    }

    fn is_shadowed(&self, light_depth: &DepthBuffer, position: Vec3) -> bool {
        if position == EMPTY_POSITION {
            return false;
        }

        let depth = self.light.depth(position);
        pixel_at(self.light.image_coordinate(position), light_depth.size())
            .and_then(|pixel| light_depth.get(pixel.x, pixel.y))
            .is_some_and(|&nearest| nearest < depth - self.settings.bias)
    }

    /// Run all three passes
    pub fn build<R: PassProgress + ?Sized>(
        &self,
        points: &[Vec3],
        progress: &mut R,
    ) -> ShadowOutput {
        tracing::info!(
            points = points.len(),
            half_extent = self.settings.half_extent,
            bias = self.settings.bias,
            "building shadow mask"
        );

        let light_depth = self.light_depth(points, progress);
        let positions = self.sensor_positions(points, progress);
        let mask = self.classify(&light_depth, &positions, progress);

        let output = ShadowOutput { mask, light_depth };
        tracing::info!(shadowed = output.shadowed(), "shadow mask complete");
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::OrthographicCamera;
    use crate::grid::Grid2D;
    use glam::{Mat4, UVec2, Vec4};

    /// Looking straight down, one pixel per unit, depth = 10 - z
    fn overhead() -> OrthographicCamera {
        let transform = Mat4::from_cols(
            Vec4::X,
            Vec4::NEG_Y,
            Vec4::NEG_Z,
            Vec4::new(4.0, 4.0, 10.0, 1.0),
        );
        OrthographicCamera::new(transform, Vec3::new(0.0, 0.0, 500.0), UVec2::new(9, 9))
    }

    #[test]
    fn test_classify_compares_against_bias() {
        let light = overhead();
        let sensor = overhead();
        let builder = ShadowMaskBuilder::new(&light, &sensor);

        // Light pixel (4, 4) saw a surface at depth 3 (z = 7)
        let mut light_depth = DepthBuffer::cleared(UVec2::new(9, 9));
        *light_depth.get_mut(4, 4).unwrap() = 3.0;

        let mut positions = PositionBuffer::cleared(UVec2::new(3, 1));
        // Well below the occluder
        *positions.get_mut(0, 0).unwrap() = Vec3::new(0.0, 0.0, 0.0);
        // Within the bias of the occluder
        *positions.get_mut(1, 0).unwrap() = Vec3::new(0.0, 0.0, 6.5);
        // Lands on an empty light pixel
        *positions.get_mut(2, 0).unwrap() = Vec3::new(2.0, 0.0, 0.0);

        let mask = builder.classify(&light_depth, &positions, &mut ());
        assert_eq!(mask.cells(), &[true, false, false]);
    }

    #[test]
    fn test_empty_positions_are_never_shadowed() {
        let light = overhead();
        let builder = ShadowMaskBuilder::new(&light, &light);
        let light_depth = Grid2D::new(UVec2::new(9, 9), f32::NEG_INFINITY);
        let positions = PositionBuffer::cleared(UVec2::new(4, 4));

        let mask = builder.classify(&light_depth, &positions, &mut ());
        assert!(mask.cells().iter().all(|m| !m));
    }

    #[test]
    fn test_light_outside_map_is_lit() {
        let light = overhead();
        let builder = ShadowMaskBuilder::new(&light, &light);
        let light_depth = Grid2D::new(UVec2::new(9, 9), f32::NEG_INFINITY);

        let mut positions = PositionBuffer::cleared(UVec2::new(1, 1));
        *positions.get_mut(0, 0).unwrap() = Vec3::new(40.0, 0.0, 0.0);

        let mask = builder.classify(&light_depth, &positions, &mut ());
        assert_eq!(mask.cells(), &[false]);
    }

    #[test]
    fn test_mask_has_sensor_resolution() {
        let light = overhead();
        let sensor = OrthographicCamera::new(
            Mat4::from_cols(Vec4::X, Vec4::NEG_Y, Vec4::NEG_Z, Vec4::new(2.0, 1.0, 10.0, 1.0)),
            Vec3::new(0.0, 0.0, 500.0),
            UVec2::new(5, 3),
        );
        let points = [Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)];
        let output = ShadowMaskBuilder::new(&light, &sensor).build(&points, &mut ());

        assert_eq!(output.mask.size(), UVec2::new(5, 3));
        assert_eq!(output.light_depth.size(), UVec2::new(9, 9));
        assert_eq!(output.shadowed(), 0);
    }

    #[test]
    fn test_stacked_points_shadow_the_lower_one() {
        let light = overhead();
        let points = [Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 5.0)];
        let builder = ShadowMaskBuilder::new(&light, &light);

        let light_depth = builder.light_depth(&points, &mut ());
        assert_eq!(light_depth.get(4, 4), Some(&5.0));

        // Only the lower point is recorded by this sensor
        let mut positions = PositionBuffer::cleared(UVec2::new(1, 1));
        *positions.get_mut(0, 0).unwrap() = points[0];
        let mask = builder.classify(&light_depth, &positions, &mut ());
        assert_eq!(mask.cells(), &[true]);
    }
}
