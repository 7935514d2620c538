// Input: point-cloud parsing

pub mod ply;

// Re-export main types and functions
pub use ply::{PlyError, PointCloud};
