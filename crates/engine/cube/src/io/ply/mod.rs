//! PLY point-cloud loading
//!
//! Only the `vertex` element is retained. Every scalar vertex property is
//! converted to `f32` and stored as its own column, so positions, normals
//! and colors can be picked out by name after loading.

mod parser;
mod reader;

use std::path::Path;

use glam::Vec3;
use thiserror::Error;

use crate::geometry::Aabb;

/// Errors raised while loading a PLY file
#[derive(Error, Debug)]
pub enum PlyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a PLY file: missing 'ply' magic line")]
    MissingMagic,

    #[error("header is not terminated by 'end_header'")]
    UnterminatedHeader,

    #[error("invalid header line {line}: '{text}'")]
    InvalidHeaderLine { line: usize, text: String },

    #[error("header has no 'format' line")]
    MissingFormat,

    #[error("property '{0}' declared before any element")]
    OrphanProperty(String),

    #[error("file has no 'vertex' element")]
    MissingVertexElement,

    #[error("vertex element has no property '{0}'")]
    MissingProperty(String),

    #[error("body ends before element '{element}' is complete")]
    TruncatedBody { element: String },

    #[error("invalid number '{token}' in element '{element}'")]
    InvalidNumber { element: String, token: String },

    #[error("ASCII body is not valid UTF-8")]
    InvalidUtf8,
}

/// Vertex data of a PLY file, one column per scalar property
#[derive(Debug, Clone, Default)]
pub struct PointCloud {
    comments: Vec<String>,
    names: Vec<String>,
    columns: Vec<Vec<f32>>,
    count: usize,
}

impl PointCloud {
    /// Load a PLY file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PlyError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let cloud = Self::from_bytes(&bytes)?;
        tracing::debug!(
            path = %path.display(),
            vertices = cloud.count,
            properties = cloud.names.len(),
            "loaded point cloud"
        );
        Ok(cloud)
    }

    /// Parse a complete PLY file held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PlyError> {
        let (lines, body_offset) = parser::split_header(bytes)?;
        let header = parser::parse_header(&lines)?;
        reader::read_vertices(&header, &bytes[body_offset..])
    }

    /// Build a cloud holding only `x`, `y`, `z` columns
    pub fn from_positions(positions: &[Vec3]) -> Self {
        let columns = vec![
            positions.iter().map(|p| p.x).collect(),
            positions.iter().map(|p| p.y).collect(),
            positions.iter().map(|p| p.z).collect(),
        ];
        Self {
            comments: Vec::new(),
            names: vec!["x".into(), "y".into(), "z".into()],
            columns,
            count: positions.len(),
        }
    }

    pub(crate) fn from_columns(
        comments: Vec<String>,
        names: Vec<String>,
        columns: Vec<Vec<f32>>,
        count: usize,
    ) -> Self {
        Self {
            comments,
            names,
            columns,
            count,
        }
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// Names of the scalar vertex properties, in file order
    pub fn vertex_properties(&self) -> &[String] {
        &self.names
    }

    /// Column of values for one vertex property
    pub fn vertex_data(&self, name: &str) -> Option<&[f32]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
    }

    pub fn vertex_count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Smallest value of a property, `None` if the property is missing or empty
    pub fn minimum(&self, name: &str) -> Option<f32> {
        self.vertex_data(name)?.iter().copied().reduce(f32::min)
    }

    /// Largest value of a property, `None` if the property is missing or empty
    pub fn maximum(&self, name: &str) -> Option<f32> {
        self.vertex_data(name)?.iter().copied().reduce(f32::max)
    }

    /// Three properties zipped into vectors, e.g. `("nx", "ny", "nz")`
    pub fn interleaved(&self, a: &str, b: &str, c: &str) -> Result<Vec<Vec3>, PlyError> {
        let column = |name: &str| {
            self.vertex_data(name)
                .ok_or_else(|| PlyError::MissingProperty(name.to_string()))
        };
        let (xs, ys, zs) = (column(a)?, column(b)?, column(c)?);

        Ok(xs
            .iter()
            .zip(ys)
            .zip(zs)
            .map(|((&x, &y), &z)| Vec3::new(x, y, z))
            .collect())
    }

    /// Vertex positions from the `x`, `y`, `z` properties
    pub fn positions(&self) -> Result<Vec<Vec3>, PlyError> {
        self.interleaved("x", "y", "z")
    }

    /// Bounding box of the vertex positions
    pub fn bounds(&self) -> Option<Aabb> {
        let min = Vec3::new(
            self.minimum("x")?,
            self.minimum("y")?,
            self.minimum("z")?,
        );
        let max = Vec3::new(
            self.maximum("x")?,
            self.maximum("y")?,
            self.maximum("z")?,
        );
        Some(Aabb::new(min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASCII: &str = "ply
format ascii 1.0
comment tiny test cloud
element vertex 3
property float x
property float y
property float z
property uchar red
element face 1
property list uchar int vertex_indices
end_header
0 0 0 255
1 2 3 128
-1 4 0.5 0
3 0 1 2
";

    #[test]
    fn test_ascii_cloud() {
        let cloud = PointCloud::from_bytes(ASCII.as_bytes()).unwrap();

        assert_eq!(cloud.vertex_count(), 3);
        assert_eq!(cloud.comments(), &["tiny test cloud".to_string()]);
        assert_eq!(cloud.vertex_properties(), &["x", "y", "z", "red"]);
        assert_eq!(cloud.vertex_data("red"), Some(&[255.0, 128.0, 0.0][..]));
        assert_eq!(cloud.minimum("x"), Some(-1.0));
        assert_eq!(cloud.maximum("y"), Some(4.0));
        assert_eq!(cloud.minimum("nope"), None);
    }

    #[test]
    fn test_positions_and_bounds() {
        let cloud = PointCloud::from_bytes(ASCII.as_bytes()).unwrap();
        let positions = cloud.positions().unwrap();

        assert_eq!(positions[1], Vec3::new(1.0, 2.0, 3.0));

        let bounds = cloud.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 4.0, 3.0));
    }

    #[test]
    fn test_missing_property() {
        let cloud = PointCloud::from_bytes(ASCII.as_bytes()).unwrap();
        assert!(matches!(
            cloud.interleaved("x", "y", "w"),
            Err(PlyError::MissingProperty(name)) if name == "w"
        ));
    }

    #[test]
    fn test_from_positions() {
        let cloud = PointCloud::from_positions(&[Vec3::ONE, Vec3::new(-2.0, 5.0, 0.0)]);
        assert_eq!(cloud.vertex_count(), 2);
        assert_eq!(cloud.positions().unwrap()[1], Vec3::new(-2.0, 5.0, 0.0));
        assert_eq!(cloud.bounds().unwrap().min, Vec3::new(-2.0, 1.0, 0.0));
    }

    #[test]
    fn test_empty_cloud_has_no_bounds() {
        let text = "ply\nformat ascii 1.0\nelement vertex 0\nproperty float x\nproperty float y\nproperty float z\nend_header\n";
        let cloud = PointCloud::from_bytes(text.as_bytes()).unwrap();
        assert!(cloud.is_empty());
        assert!(cloud.bounds().is_none());
    }
}
