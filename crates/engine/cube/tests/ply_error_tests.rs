//! PLY loading tests against files on disk
//!
//! Verifies that PointCloud::load reads every body encoding and rejects
//! malformed files with the matching error variant

use cube::io::ply::{PlyError, PointCloud};
use cube::Aabb;
use glam::Vec3;
use std::io::Write;

/// Helper: write bytes into a fresh file inside `dir`
fn write_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(bytes).unwrap();
    path
}

fn binary_cloud(points: &[Vec3]) -> Vec<u8> {
    let mut bytes = format!(
        "ply\nformat binary_little_endian 1.0\ncomment synthetic\nelement vertex {}\nproperty float x\nproperty float y\nproperty float z\nend_header\n",
        points.len()
    )
    .into_bytes();
    for p in points {
        for v in p.to_array() {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
    }
    bytes
}

#[test]
fn test_load_binary_file() {
    let dir = tempfile::tempdir().unwrap();
    let points = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(10.0, -2.0, 1.5),
        Vec3::new(3.0, 7.0, -1.0),
    ];
    let path = write_file(&dir, "cloud.ply", &binary_cloud(&points));

    let cloud = PointCloud::load(&path).unwrap();

    assert_eq!(cloud.vertex_count(), 3);
    assert_eq!(cloud.comments(), &["synthetic".to_string()]);
    assert_eq!(cloud.positions().unwrap(), points.to_vec());
    assert_eq!(
        cloud.bounds().unwrap(),
        Aabb::new(Vec3::new(0.0, -2.0, -1.0), Vec3::new(10.0, 7.0, 1.5))
    );
}

#[test]
fn test_load_ascii_file_with_colors() {
    let dir = tempfile::tempdir().unwrap();
    let text = "ply
format ascii 1.0
element vertex 2
property double x
property double y
property double z
property uchar red
property uchar green
property uchar blue
end_header
1 2 3 255 0 0
4 5 6 0 255 0
";
    let path = write_file(&dir, "colors.ply", text.as_bytes());
    let cloud = PointCloud::load(&path).unwrap();

    let colors = cloud.interleaved("red", "green", "blue").unwrap();
    assert_eq!(colors[1], Vec3::new(0.0, 255.0, 0.0));
    assert_eq!(cloud.maximum("z"), Some(6.0));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = PointCloud::load(dir.path().join("absent.ply"));

    match result.unwrap_err() {
        PlyError::Io(_) => {}
        other => panic!("Expected Io error, got {:?}", other),
    }
}

#[test]
fn test_not_a_ply_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "mesh.obj", b"v 0 0 0\nv 1 0 0\n");

    match PointCloud::load(&path).unwrap_err() {
        PlyError::MissingMagic => {}
        other => panic!("Expected MissingMagic error, got {:?}", other),
    }
}

#[test]
fn test_truncated_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut bytes = binary_cloud(&[Vec3::ONE, Vec3::ZERO]);
    bytes.truncate(bytes.len() - 5);
    let path = write_file(&dir, "short.ply", &bytes);

    match PointCloud::load(&path).unwrap_err() {
        PlyError::TruncatedBody { element } => assert_eq!(element, "vertex"),
        other => panic!("Expected TruncatedBody error, got {:?}", other),
    }
}

#[test]
fn test_positions_require_xyz() {
    let dir = tempfile::tempdir().unwrap();
    let text = "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nproperty float y\nend_header\n1 2\n";
    let path = write_file(&dir, "flat.ply", text.as_bytes());
    let cloud = PointCloud::load(&path).unwrap();

    match cloud.positions().unwrap_err() {
        PlyError::MissingProperty(name) => assert_eq!(name, "z"),
        other => panic!("Expected MissingProperty error, got {:?}", other),
    }
    assert!(cloud.bounds().is_none());
}

#[test]
fn test_oversized_vertex_count_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let header = "ply\nformat binary_little_endian 1.0\nelement vertex 1000000000000000000\nproperty float x\nproperty float y\nproperty float z\nend_header\n";
    let path = write_file(&dir, "huge.ply", header.as_bytes());

    match PointCloud::load(&path).unwrap_err() {
        PlyError::TruncatedBody { element } => assert_eq!(element, "vertex"),
        other => panic!("Expected TruncatedBody error, got {:?}", other),
    }
}
