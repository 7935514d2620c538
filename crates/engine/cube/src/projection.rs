use glam::{UVec2, Vec2, Vec3};

/// World to image mapping consumed by silhouette and rasterization code.
///
/// Image coordinates are in pixels with the pixel `(x, y)` centered on the
/// integer coordinate. `depth` is the camera specific distance used for
/// nearest-wins tests: smaller means closer to the camera.
pub trait Projection {
    /// Project a world point onto the image plane
    fn image_coordinate(&self, point: Vec3) -> Vec2;

    /// Distance of a world point from the camera
    fn depth(&self, point: Vec3) -> f32;

    /// Image plane size in pixels
    fn image_plane_size(&self) -> UVec2;

    /// Eye position in world space
    fn position(&self) -> Vec3;
}

impl<P: Projection + ?Sized> Projection for &P {
    fn image_coordinate(&self, point: Vec3) -> Vec2 {
        (**self).image_coordinate(point)
    }

    fn depth(&self, point: Vec3) -> f32 {
        (**self).depth(point)
    }

    fn image_plane_size(&self) -> UVec2 {
        (**self).image_plane_size()
    }

    fn position(&self) -> Vec3 {
        (**self).position()
    }
}
