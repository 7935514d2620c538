//! Directional light camera
//!
//! The light is described by compass angles: azimuth measured clockwise
//! from north (+Y) towards east (+X), elevation above the horizon (XY plane).
//! Its camera starts out standing north of the scene looking south and is
//! then tilted down by the elevation and swung round by the azimuth.

use cube::Aabb;
use glam::{Mat4, UVec2, Vec3, Vec4};

use super::OrthographicCamera;

/// Eye distance from the scene center, in scene diagonals
const EYE_DISTANCE: f32 = 1000.0;

/// Unit vector pointing from the scene towards the light
pub fn sun_direction(azimuth: f32, elevation: f32) -> Vec3 {
    let (sin_az, cos_az) = azimuth.to_radians().sin_cos();
    let (sin_el, cos_el) = elevation.to_radians().sin_cos();
    Vec3::new(sin_az * cos_el, cos_az * cos_el, sin_el)
}

/// Light placement and shadow map resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRig {
    /// Degrees clockwise from north
    pub azimuth: f32,
    /// Degrees above the horizon
    pub elevation: f32,
    /// Width and height of the square depth map
    pub map_size: u32,
}

impl LightRig {
    pub fn new(azimuth: f32, elevation: f32, map_size: u32) -> Self {
        Self {
            azimuth,
            elevation,
            map_size,
        }
    }

    pub fn direction(&self) -> Vec3 {
        sun_direction(self.azimuth, self.elevation)
    }

    /// World to light-view rotation; the light looks down its local -Z
    pub fn view(&self) -> Mat4 {
        let north_looking_south = Mat4::look_to_rh(Vec3::ZERO, Vec3::NEG_Y, Vec3::Z);
        north_looking_south
            * Mat4::from_rotation_x(-self.elevation.to_radians())
            * Mat4::from_rotation_z(self.azimuth.to_radians())
    }

    /// Orthographic camera covering `scene` from the light
    ///
    /// The view-space extent of the box is fitted into the map with a
    /// uniform scale, image row 0 at the top. Depth grows away from the
    /// light in world units and is 0 on the box plane nearest to it.
    pub fn camera(&self, scene: &Aabb) -> OrthographicCamera {
        let view = self.view();
        let size = self.map_size.max(1);

        let (min, max) = scene.corners().iter().fold(
            (Vec3::INFINITY, Vec3::NEG_INFINITY),
            |(min, max), corner| {
                let v = view.transform_point3(*corner);
                (min.min(v), max.max(v))
            },
        );

        let extent = (max - min).truncate().max_element();
        let span = if extent > 0.0 && extent.is_finite() {
            extent
        } else {
            1.0
        };
        let last_pixel = (size - 1).max(1) as f32;
        let scale = last_pixel / span;
        let center = (min + max) * 0.5;
        let offset = last_pixel * 0.5;

        let fit = Mat4::from_cols(
            Vec4::new(scale, 0.0, 0.0, 0.0),
            Vec4::new(0.0, -scale, 0.0, 0.0),
            Vec4::new(0.0, 0.0, -1.0, 0.0),
            Vec4::new(
                -center.x * scale + offset,
                center.y * scale + offset,
                max.z,
                1.0,
            ),
        );

        let radius = scene.size().length().max(1.0);
        let position = scene.center() + self.direction() * radius * EYE_DISTANCE;

        tracing::debug!(
            azimuth = self.azimuth,
            elevation = self.elevation,
            map_size = size,
            pixels_per_unit = scale,
            "built light camera"
        );

        OrthographicCamera::new(fit * view, position, UVec2::splat(size))
    }
}
