//! Adaptive voxel rasterization
//!
//! A cube is split into octants until its projected silhouette covers at
//! most one pixel, then its center is written as a single sample. Which
//! buffer is written, and how, is decided by a [`SampleSink`].

use std::ops::AddAssign;

use cube::{area, image_bounds, Cube, Projection};
use glam::{UVec2, Vec2, Vec3};
use image::RgbImage;

use crate::error::RenderError;
use crate::grid::{
    pixel_at, DepthBuffer, EmptyCell, Grid2D, PixelRecord, PositionBuffer, EMPTY_POSITION,
};
use crate::progress::{run_pass, Pass, PassProgress};

/// Color written where the projector sees a different surface
pub const OCCLUDED_COLOR: [u8; 3] = [255, 0, 0];

/// Bounds that stop subdivision on inputs whose projected area never
/// drops to one pixel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterLimits {
    /// Maximum number of octant splits below the submitted cube
    pub max_depth: u32,
    /// Smallest half extent a child cube may have
    pub min_half_extent: f32,
}

impl Default for RasterLimits {
    fn default() -> Self {
        Self {
            max_depth: 16,
            min_half_extent: 0.0,
        }
    }
}

/// Counters collected while rasterizing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RasterStats {
    /// Cubes examined, including every octant
    pub visited: u64,
    /// Cubes with zero projected area
    pub culled: u64,
    /// Cubes whose footprint lies entirely outside the image
    pub off_image: u64,
    /// Point samples offered to the sink
    pub samples: u64,
    /// Samples the sink accepted
    pub written: u64,
    /// Cubes written as a sample because a limit stopped subdivision
    pub depth_capped: u64,
}

impl AddAssign for RasterStats {
    fn add_assign(&mut self, other: Self) {
        self.visited += other.visited;
        self.culled += other.culled;
        self.off_image += other.off_image;
        self.samples += other.samples;
        self.written += other.written;
        self.depth_capped += other.depth_capped;
    }
}

/// Write policy for point samples
pub trait SampleSink {
    /// Size of the buffer being written
    fn size(&self) -> UVec2;

    /// Offer the sample at world `position` landing on `pixel` as seen by
    /// `camera`. Returns whether it was written.
    fn offer<P: Projection + ?Sized>(&mut self, camera: &P, pixel: UVec2, position: Vec3)
        -> bool;
}

/// Nearest camera distance per pixel
pub struct DepthSink<'a> {
    buffer: &'a mut DepthBuffer,
}

impl<'a> DepthSink<'a> {
    pub fn new(buffer: &'a mut DepthBuffer) -> Self {
        Self { buffer }
    }
}

impl SampleSink for DepthSink<'_> {
    fn size(&self) -> UVec2 {
        self.buffer.size()
    }

    fn offer<P: Projection + ?Sized>(&mut self, camera: &P, pixel: UVec2, position: Vec3) -> bool {
        let depth = camera.depth(position);
        match self.buffer.get_mut(pixel.x, pixel.y) {
            Some(cell) if depth < *cell => {
                *cell = depth;
                true
            }
            _ => false,
        }
    }
}

/// World position of the nearest sample per pixel
pub struct PositionSink<'a> {
    buffer: &'a mut PositionBuffer,
}

impl<'a> PositionSink<'a> {
    pub fn new(buffer: &'a mut PositionBuffer) -> Self {
        Self { buffer }
    }
}

impl SampleSink for PositionSink<'_> {
    fn size(&self) -> UVec2 {
        self.buffer.size()
    }

    fn offer<P: Projection + ?Sized>(&mut self, camera: &P, pixel: UVec2, position: Vec3) -> bool {
        let Some(cell) = self.buffer.get_mut(pixel.x, pixel.y) else {
            return false;
        };
        if *cell == EMPTY_POSITION || camera.depth(position) < camera.depth(*cell) {
            *cell = position;
            true
        } else {
            false
        }
    }
}

/// Colors the nearest sample per pixel from an image seen by a projector
///
/// The sample looks itself up in the projector's completed depth buffer. It
/// takes the image color when its own projector distance is within
/// `epsilon` of the stored one, and [`OCCLUDED_COLOR`] otherwise.
pub struct ColorSink<'a, Q: Projection + ?Sized> {
    records: &'a mut Grid2D<PixelRecord>,
    projector: &'a Q,
    projector_depth: &'a DepthBuffer,
    image: &'a RgbImage,
    epsilon: f32,
}

impl<'a, Q: Projection + ?Sized> ColorSink<'a, Q> {
    /// `image` must already have the projector depth buffer's size
    pub fn new(
        records: &'a mut Grid2D<PixelRecord>,
        projector: &'a Q,
        projector_depth: &'a DepthBuffer,
        image: &'a RgbImage,
        epsilon: f32,
    ) -> Result<Self, RenderError> {
        let actual = UVec2::new(image.width(), image.height());
        if actual != projector_depth.size() {
            return Err(RenderError::SizeMismatch {
                expected: projector_depth.size(),
                actual,
            });
        }
        Ok(Self {
            records,
            projector,
            projector_depth,
            image,
            epsilon,
        })
    }

    fn projected_color(&self, position: Vec3) -> [u8; 3] {
        let coordinate = self.projector.image_coordinate(position);
        let Some(pixel) = pixel_at(coordinate, self.projector_depth.size()) else {
            return PixelRecord::EMPTY.color;
        };

        let stored = self
            .projector_depth
            .get(pixel.x, pixel.y)
            .copied()
            .unwrap_or(f32::INFINITY);
        if (self.projector.depth(position) - stored).abs() < self.epsilon {
            // `new` guarantees the image matches the depth buffer size
            self.image.get_pixel(pixel.x, pixel.y).0
        } else {
            OCCLUDED_COLOR
        }
    }
}

impl<Q: Projection + ?Sized> SampleSink for ColorSink<'_, Q> {
    fn size(&self) -> UVec2 {
        self.records.size()
    }

    fn offer<P: Projection + ?Sized>(&mut self, camera: &P, pixel: UVec2, position: Vec3) -> bool {
        let depth = camera.depth(position);
        match self.records.get(pixel.x, pixel.y) {
            Some(record) if depth < record.depth => {}
            _ => return false,
        }

        let color = self.projected_color(position);
        if let Some(record) = self.records.get_mut(pixel.x, pixel.y) {
            *record = PixelRecord { color, depth };
        }
        true
    }
}

/// Recursive voxel rasterizer for one camera
pub struct Rasterizer<'a, P: Projection + ?Sized> {
    camera: &'a P,
    limits: RasterLimits,
}

impl<'a, P: Projection + ?Sized> Rasterizer<'a, P> {
    pub fn new(camera: &'a P) -> Self {
        Self {
            camera,
            limits: RasterLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: RasterLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> RasterLimits {
        self.limits
    }

    /// Rasterize one cube into `sink`
    pub fn rasterize<S: SampleSink>(&self, cube: &Cube, sink: &mut S) -> RasterStats {
        let mut stats = RasterStats::default();
        let size = sink.size();
        self.visit(cube, 0, size, sink, &mut stats);
        stats
    }

    /// Rasterize a cube of `half_extent` around every point, as one pass
    pub fn rasterize_points<S, R>(
        &self,
        points: &[Vec3],
        half_extent: f32,
        sink: &mut S,
        progress: &mut R,
        pass: Pass,
    ) -> RasterStats
    where
        S: SampleSink,
        R: PassProgress + ?Sized,
    {
        let mut stats = RasterStats::default();
        run_pass(progress, pass, points.len(), |i| {
            stats += self.rasterize(&Cube::new(points[i], half_extent), sink);
        });

        tracing::debug!(
            %pass,
            points = points.len(),
            visited = stats.visited,
            culled = stats.culled,
            off_image = stats.off_image,
            samples = stats.samples,
            written = stats.written,
            depth_capped = stats.depth_capped,
            "rasterized pass"
        );
        if stats.depth_capped > 0 {
            tracing::warn!(
                %pass,
                depth_capped = stats.depth_capped,
                max_depth = self.limits.max_depth,
                "subdivision limit reached"
            );
        }
        stats
    }

    fn visit<S: SampleSink>(
        &self,
        cube: &Cube,
        level: u32,
        size: UVec2,
        sink: &mut S,
        stats: &mut RasterStats,
    ) {
        stats.visited += 1;

        let projected = area(self.camera, cube);
        if projected <= 0.0 {
            stats.culled += 1;
            return;
        }

        if !self.overlaps_image(cube, size) {
            stats.off_image += 1;
            return;
        }

        if projected <= 1.0 {
            self.splat(cube, size, sink, stats);
            return;
        }

        let child_half_extent = cube.half_extent() * 0.5;
        if level >= self.limits.max_depth || child_half_extent < self.limits.min_half_extent {
            stats.depth_capped += 1;
            self.splat(cube, size, sink, stats);
            return;
        }

        for child in cube.octants() {
            self.visit(&child, level + 1, size, sink, stats);
        }
    }

    /// Whether any descendant sample could round to a pixel inside `size`
    fn overlaps_image(&self, cube: &Cube, size: UVec2) -> bool {
        let Some((min, max)) = image_bounds(self.camera, cube) else {
            return false;
        };
        let upper = size.as_vec2() - Vec2::splat(0.5);
        max.x >= -0.5 && max.y >= -0.5 && min.x < upper.x && min.y < upper.y
    }

    fn splat<S: SampleSink>(
        &self,
        cube: &Cube,
        size: UVec2,
        sink: &mut S,
        stats: &mut RasterStats,
    ) {
        stats.samples += 1;
        let center = cube.center();
        if let Some(pixel) = pixel_at(self.camera.image_coordinate(center), size) {
            if sink.offer(self.camera, pixel, center) {
                stats.written += 1;
            }
        }
    }
}

/// Render the depth buffer of `camera` for cubes around `points`
pub fn depth_pass<P, R>(
    camera: &P,
    points: &[Vec3],
    half_extent: f32,
    limits: RasterLimits,
    progress: &mut R,
    pass: Pass,
) -> DepthBuffer
where
    P: Projection + ?Sized,
    R: PassProgress + ?Sized,
{
    let mut buffer = DepthBuffer::cleared(camera.image_plane_size());
    Rasterizer::new(camera).with_limits(limits).rasterize_points(
        points,
        half_extent,
        &mut DepthSink::new(&mut buffer),
        progress,
        pass,
    );
    buffer
}
