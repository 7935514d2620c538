//! Cameras consumed by the rasterizer

mod krt;
mod light;
mod orthographic;

pub use krt::KrtCamera;
pub use light::{sun_direction, LightRig};
pub use orthographic::OrthographicCamera;

use cube::Projection;
use glam::{UVec2, Vec2, Vec3};

/// Either camera model behind one projection interface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Camera {
    Perspective(KrtCamera),
    Orthographic(OrthographicCamera),
}

impl From<KrtCamera> for Camera {
    fn from(camera: KrtCamera) -> Self {
        Camera::Perspective(camera)
    }
}

impl From<OrthographicCamera> for Camera {
    fn from(camera: OrthographicCamera) -> Self {
        Camera::Orthographic(camera)
    }
}

impl Projection for Camera {
    fn image_coordinate(&self, point: Vec3) -> Vec2 {
        match self {
            Camera::Perspective(c) => c.image_coordinate(point),
            Camera::Orthographic(c) => c.image_coordinate(point),
        }
    }

    fn depth(&self, point: Vec3) -> f32 {
        match self {
            Camera::Perspective(c) => c.depth(point),
            Camera::Orthographic(c) => c.depth(point),
        }
    }

    fn image_plane_size(&self) -> UVec2 {
        match self {
            Camera::Perspective(c) => c.image_plane_size(),
            Camera::Orthographic(c) => c.image_plane_size(),
        }
    }

    fn position(&self) -> Vec3 {
        match self {
            Camera::Perspective(c) => c.position(),
            Camera::Orthographic(c) => c.position(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    #[test]
    fn test_camera_dispatch() {
        let ortho = OrthographicCamera::new(Mat4::IDENTITY, Vec3::Z * 5.0, UVec2::new(3, 4));
        let camera = Camera::from(ortho);

        assert_eq!(camera.image_plane_size(), UVec2::new(3, 4));
        assert_eq!(camera.position(), Vec3::Z * 5.0);
        assert_eq!(camera.depth(Vec3::new(1.0, 2.0, 3.0)), 3.0);
        assert_eq!(
            camera.image_coordinate(Vec3::new(1.0, 2.0, 3.0)),
            Vec2::new(1.0, 2.0)
        );
    }

    #[test]
    fn test_perspective_depth_is_range() {
        let krt: KrtCamera = "1 0 0.5 0 1 0.5 0 0 1  1 0 0 0 1 0 0 0 1  0 0 0  1 1"
            .parse()
            .unwrap();
        let camera = Camera::from(krt);
        assert_eq!(camera.position(), Vec3::ZERO);
        assert!((camera.depth(Vec3::new(3.0, 4.0, 0.0)) - 5.0).abs() < 1e-6);
    }
}
