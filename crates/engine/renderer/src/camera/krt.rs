//! Calibrated pinhole camera loaded from a KRt text file
//!
//! The file holds, in order and separated by any whitespace:
//!
//! ```text
//! # intrinsics K (row-major 3x3)
//! fx  0 cx
//!  0 fy cy
//!  0  0  1
//! # rotation R (row-major 3x3), world to camera
//! r00 r01 r02
//! r10 r11 r12
//! r20 r21 r22
//! # translation t
//! tx ty tz
//! # optional image plane size
//! width height
//! ```
//!
//! Everything after a `#` on a line is ignored. Without an explicit size
//! the image plane is assumed to be centered on the principal point.

use std::path::Path;
use std::str::FromStr;

use cube::Projection;
use glam::{Mat3, UVec2, Vec2, Vec3};

use crate::error::RenderError;

/// Perspective camera mapping `p` to `K (R p + t)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KrtCamera {
    intrinsics: Mat3,
    rotation: Mat3,
    translation: Vec3,
    size: UVec2,
    position: Vec3,
}

impl KrtCamera {
    pub fn new(
        intrinsics: Mat3,
        rotation: Mat3,
        translation: Vec3,
        size: UVec2,
    ) -> Result<Self, RenderError> {
        if !(intrinsics.is_finite() && rotation.is_finite() && translation.is_finite()) {
            return Err(RenderError::InvalidCamera(
                "camera parameters must be finite".into(),
            ));
        }
        if size.x == 0 || size.y == 0 {
            return Err(RenderError::InvalidCamera(format!(
                "image plane size {size} is empty"
            )));
        }
        if intrinsics.determinant() == 0.0 || rotation.determinant() == 0.0 {
            return Err(RenderError::InvalidCamera(
                "intrinsics and rotation must be invertible".into(),
            ));
        }

        Ok(Self {
            intrinsics,
            rotation,
            translation,
            size,
            position: -(rotation.transpose() * translation),
        })
    }

    /// Load a camera from a KRt text file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RenderError::CameraIo {
            path: path.to_path_buf(),
            source,
        })?;
        let camera: KrtCamera = text.parse()?;
        tracing::debug!(
            path = %path.display(),
            size = %camera.size,
            position = %camera.position,
            "loaded camera"
        );
        Ok(camera)
    }

    /// Camera whose image plane is resized by `factor`
    pub fn scaled(&self, factor: f32) -> Result<Self, RenderError> {
        if !(factor > 0.0 && factor.is_finite()) {
            return Err(RenderError::InvalidCamera(format!(
                "scale factor {factor} must be positive"
            )));
        }

        let scale = Mat3::from_diagonal(Vec3::new(factor, factor, 1.0));
        let size = (self.size.as_vec2() * factor).round().max(Vec2::ONE).as_uvec2();
        Self::new(scale * self.intrinsics, self.rotation, self.translation, size)
    }

    pub fn intrinsics(&self) -> Mat3 {
        self.intrinsics
    }

    pub fn rotation(&self) -> Mat3 {
        self.rotation
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }
}

impl FromStr for KrtCamera {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .lines()
            .map(|line| line.split('#').next().unwrap_or(""))
            .flat_map(str::split_ascii_whitespace)
            .map(|token| {
                token
                    .parse::<f32>()
                    .map_err(|_| RenderError::CameraNumber(token.to_string()))
            })
            .collect::<Result<Vec<f32>, _>>()?;

        if values.len() != 21 && values.len() != 23 {
            return Err(RenderError::CameraValueCount(values.len()));
        }

        // Both matrices are stored row-major in the file
        let intrinsics = Mat3::from_cols_slice(&values[0..9]).transpose();
        let rotation = Mat3::from_cols_slice(&values[9..18]).transpose();
        let translation = Vec3::from_slice(&values[18..21]);

        let size = match values.get(21..23) {
            Some(&[width, height]) => {
                if width.fract() != 0.0 || height.fract() != 0.0 || width < 0.0 || height < 0.0
                {
                    return Err(RenderError::InvalidCamera(format!(
                        "image plane size {width} x {height} is not a pair of integers"
                    )));
                }
                UVec2::new(width as u32, height as u32)
            }
            _ => {
                let principal = Vec2::new(values[2], values[5]);
                (principal * 2.0).round().max(Vec2::ZERO).as_uvec2()
            }
        };

        Self::new(intrinsics, rotation, translation, size)
    }
}

impl Projection for KrtCamera {
    /// Points at or behind the camera plane map to NaN.
    ///
    /// A cube with any corner on that side therefore has no finite outline
    /// and is skipped whole, even when part of it lies in front of the
    /// camera. Voxels crossing the camera plane are not clipped.
    fn image_coordinate(&self, point: Vec3) -> Vec2 {
        let camera = self.rotation * point + self.translation;
        if camera.z <= 0.0 {
            return Vec2::NAN;
        }
        let image = self.intrinsics * camera;
        image.truncate() / image.z
    }

    fn depth(&self, point: Vec3) -> f32 {
        point.distance(self.position)
    }

    fn image_plane_size(&self) -> UVec2 {
        self.size
    }

    fn position(&self) -> Vec3 {
        self.position
    }
}
