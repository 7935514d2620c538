use cube::Projection;
use glam::{Mat4, UVec2, Vec2, Vec3};

/// Parallel projection through a 4x4 transform
///
/// The transform maps world space straight to image space: x and y are pixel
/// coordinates and z is the depth. The eye position cannot be recovered from
/// such a transform, so it is stored separately and only used to pick the
/// visible faces of a cube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthographicCamera {
    transform: Mat4,
    position: Vec3,
    size: UVec2,
}

impl OrthographicCamera {
    pub fn new(transform: Mat4, position: Vec3, size: UVec2) -> Self {
        Self {
            transform,
            position,
            size,
        }
    }

    pub fn transform(&self) -> Mat4 {
        self.transform
    }
}

impl Projection for OrthographicCamera {
    fn image_coordinate(&self, point: Vec3) -> Vec2 {
        self.transform.project_point3(point).truncate()
    }

    fn depth(&self, point: Vec3) -> f32 {
        self.transform.project_point3(point).z
    }

    fn image_plane_size(&self) -> UVec2 {
        self.size
    }

    fn position(&self) -> Vec3 {
        self.position
    }
}
