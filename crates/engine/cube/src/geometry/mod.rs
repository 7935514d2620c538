//! Geometry kernel: cubes, boxes and rays

mod aabb;
mod cube;
mod ray;

pub use aabb::{Aabb, AabbParseError};
pub use cube::{corner, Cube};
pub use ray::Ray;
