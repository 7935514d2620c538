//! CPU rendering of point clouds as voxels
//!
//! Each point is rendered as a small cube. Cubes are rasterized adaptively
//! (see [`raster`]) into per-camera buffers, which the [`shadow`] and
//! [`colorize`] pipelines combine.

pub mod camera;
pub mod colorize;
mod error;
pub mod grid;
pub mod progress;
pub mod raster;
pub mod shadow;
pub mod visualize;

pub use camera::{sun_direction, Camera, KrtCamera, LightRig, OrthographicCamera};
pub use colorize::{ColorizeSettings, Colorizer};
pub use error::RenderError;
pub use grid::{
    DepthBuffer, EmptyCell, Grid2D, PixelRecord, PositionBuffer, ShadowMask, EMPTY_POSITION,
};
pub use progress::{Pass, PassProgress};
pub use raster::{
    depth_pass, ColorSink, DepthSink, PositionSink, RasterLimits, RasterStats, Rasterizer,
    SampleSink,
};
pub use shadow::{ShadowMaskBuilder, ShadowOutput, ShadowSettings};
pub use visualize::{depth_image, depth_range, mask_image, record_image, ColorMap};

// Re-export the geometry crate for convenience
pub use cube;
