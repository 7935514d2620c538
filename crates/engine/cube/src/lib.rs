//! Voxel geometry for point-cloud projection
//!
//! Every point sample is treated as a small axis-aligned [`Cube`]. This
//! crate provides the geometry kernel, the silhouette hull used to measure a
//! cube's projected footprint, and loading of PLY point clouds.

pub mod geometry;
pub mod hull;
pub mod io;
mod projection;

pub use geometry::{corner, Aabb, AabbParseError, Cube, Ray};
pub use hull::{approximate_area, area, image_bounds, HullCode, Side, Silhouette};
pub use io::ply::{PlyError, PointCloud};
pub use projection::Projection;

// Re-export glam for convenience
pub use glam;
