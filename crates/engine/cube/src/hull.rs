//! Silhouette hull of a cube seen from an eye position
//!
//! The eye is classified against the six face planes of the cube. Each
//! axis contributes one of three sides (below the min face, between the
//! faces, above the max face), which packs into a 6-bit hull code. Every
//! valid code selects the ordered outline of the projected cube:
//!
//! - 4 corners when a single face is front-facing,
//! - 6 corners when two or three faces are front-facing,
//! - no corners when the eye is inside or on the cube.
//!
//! The outline is projected through a [`Projection`] to measure the cube's
//! footprint in pixels.

use crate::geometry::{corner::*, Cube};
use crate::Projection;
use glam::{Vec2, Vec3};

/// Maximum number of outline corners
pub const MAX_SILHOUETTE_VERTICES: usize = 6;

/// Eye is strictly below the min-x face
pub const BEYOND_MIN_X: u8 = 1 << 0;
/// Eye is strictly above the max-x face
pub const BEYOND_MAX_X: u8 = 1 << 1;
pub const BEYOND_MIN_Y: u8 = 1 << 2;
pub const BEYOND_MAX_Y: u8 = 1 << 3;
pub const BEYOND_MIN_Z: u8 = 1 << 4;
pub const BEYOND_MAX_Z: u8 = 1 << 5;

const AXIS_BITS: [(u8, u8); 3] = [
    (BEYOND_MIN_X, BEYOND_MAX_X),
    (BEYOND_MIN_Y, BEYOND_MAX_Y),
    (BEYOND_MIN_Z, BEYOND_MAX_Z),
];

/// Position of the eye relative to the two faces of one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Strictly beyond the min face
    Below,
    /// Between the faces, or on one of them
    Inside,
    /// Strictly beyond the max face
    Above,
}

/// 6-bit classification of an eye against a cube's face planes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HullCode(u8);

impl HullCode {
    /// Eye inside (or on the boundary of) the cube
    pub const INSIDE: HullCode = HullCode(0);

    /// Classify an eye position against a cube
    pub fn classify(eye: Vec3, cube: &Cube) -> HullCode {
        let min = cube.minimum();
        let max = cube.maximum();
        let mut bits = 0;

        for (axis, (below, above)) in AXIS_BITS.iter().enumerate() {
            if eye[axis] < min[axis] {
                bits |= below;
            }
            if eye[axis] > max[axis] {
                bits |= above;
            }
        }

        debug_assert!(
            Self::from_bits(bits).is_some(),
            "eye {eye:?} is beyond both faces of an axis of {cube:?}"
        );
        HullCode(bits)
    }

    /// Validate a raw code.
    ///
    /// Rejects values wider than 6 bits and codes that are beyond both the
    /// min and max face of the same axis.
    pub fn from_bits(bits: u8) -> Option<HullCode> {
        if bits >= 64 {
            return None;
        }
        let contradictory = AXIS_BITS
            .iter()
            .any(|(below, above)| bits & below != 0 && bits & above != 0);
        (!contradictory).then_some(HullCode(bits))
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Per-axis sides in x, y, z order
    pub fn sides(self) -> [Side; 3] {
        AXIS_BITS.map(|(below, above)| {
            if self.0 & below != 0 {
                Side::Below
            } else if self.0 & above != 0 {
                Side::Above
            } else {
                Side::Inside
            }
        })
    }

    /// Ordered outline corners for this code
    pub fn silhouette(self) -> Silhouette {
        use Side::*;

        match self.sides() {
            [Inside, Inside, Inside] => Silhouette::EMPTY,

            // One front face
            [Below, Inside, Inside] => Silhouette::quad([NNN, NNP, NPP, NPN]),
            [Above, Inside, Inside] => Silhouette::quad([PNP, PNN, PPN, PPP]),
            [Inside, Below, Inside] => Silhouette::quad([NNP, NNN, PNN, PNP]),
            [Inside, Above, Inside] => Silhouette::quad([NPN, NPP, PPP, PPN]),
            [Inside, Inside, Below] => Silhouette::quad([PNN, NNN, NPN, PPN]),
            [Inside, Inside, Above] => Silhouette::quad([NNP, PNP, PPP, NPP]),

            // Two front faces sharing an edge
            [Below, Below, Inside] => Silhouette::hexagon([PNN, PNP, NNP, NPP, NPN, NNN]),
            [Above, Below, Inside] => Silhouette::hexagon([NNP, NNN, PNN, PPN, PPP, PNP]),
            [Below, Above, Inside] => Silhouette::hexagon([NNN, NNP, NPP, PPP, PPN, NPN]),
            [Above, Above, Inside] => Silhouette::hexagon([PNP, PNN, PPN, NPN, NPP, PPP]),
            [Below, Inside, Below] => Silhouette::hexagon([PNN, NNN, NNP, NPP, NPN, PPN]),
            [Above, Inside, Below] => Silhouette::hexagon([PNP, PNN, NNN, NPN, PPN, PPP]),
            [Inside, Below, Below] => Silhouette::hexagon([PNP, NNP, NNN, NPN, PPN, PNN]),
            [Inside, Above, Below] => Silhouette::hexagon([PNN, NNN, NPN, NPP, PPP, PPN]),
            [Below, Inside, Above] => Silhouette::hexagon([NNN, NNP, PNP, PPP, NPP, NPN]),
            [Above, Inside, Above] => Silhouette::hexagon([NNP, PNP, PNN, PPN, PPP, NPP]),
            [Inside, Below, Above] => Silhouette::hexagon([NNN, PNN, PNP, PPP, NPP, NNP]),
            [Inside, Above, Above] => Silhouette::hexagon([NNP, PNP, PPP, PPN, NPN, NPP]),

            // Three front faces meeting at a corner
            [Below, Below, Below] => Silhouette::hexagon([PNN, PNP, NNP, NPP, NPN, PPN]),
            [Above, Below, Below] => Silhouette::hexagon([PNP, NNP, NNN, NPN, PPN, PPP]),
            [Below, Above, Below] => Silhouette::hexagon([PNN, NNN, NNP, NPP, PPP, PPN]),
            [Above, Above, Below] => Silhouette::hexagon([PNP, PNN, NNN, NPN, NPP, PPP]),
            [Below, Below, Above] => Silhouette::hexagon([NNN, PNN, PNP, PPP, NPP, NPN]),
            [Above, Below, Above] => Silhouette::hexagon([NNP, NNN, PNN, PPN, PPP, NPP]),
            [Below, Above, Above] => Silhouette::hexagon([NNN, NNP, PNP, PPP, PPN, NPN]),
            [Above, Above, Above] => Silhouette::hexagon([NNP, PNP, PNN, PPN, NPN, NPP]),
        }
    }
}

/// Ordered outline of a projected cube as corner indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Silhouette {
    corners: [u8; MAX_SILHOUETTE_VERTICES],
    len: u8,
}

impl Silhouette {
    pub const EMPTY: Silhouette = Silhouette {
        corners: [0; MAX_SILHOUETTE_VERTICES],
        len: 0,
    };

    const fn quad(c: [u8; 4]) -> Silhouette {
        Silhouette {
            corners: [c[0], c[1], c[2], c[3], 0, 0],
            len: 4,
        }
    }

    const fn hexagon(corners: [u8; 6]) -> Silhouette {
        Silhouette { corners, len: 6 }
    }

    /// Silhouette for a raw code; invalid codes have no outline
    pub fn for_bits(bits: u8) -> Silhouette {
        HullCode::from_bits(bits).map_or(Silhouette::EMPTY, HullCode::silhouette)
    }

    #[inline]
    pub fn corners(&self) -> &[u8] {
        &self.corners[..self.len as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Outline of a cube projected through a camera, or `None` when the cube has
/// no visible outline (degenerate cube, eye inside or on the cube).
fn project_outline<P: Projection + ?Sized>(
    camera: &P,
    cube: &Cube,
) -> Option<([Vec2; MAX_SILHOUETTE_VERTICES], usize)> {
    if cube.is_degenerate() {
        return None;
    }

    let silhouette = HullCode::classify(camera.position(), cube).silhouette();
    if silhouette.is_empty() {
        return None;
    }

    let mut points = [Vec2::ZERO; MAX_SILHOUETTE_VERTICES];
    for (point, &index) in points.iter_mut().zip(silhouette.corners()) {
        *point = camera.image_coordinate(cube.corner(index));
    }
    Some((points, silhouette.len()))
}

/// Exact projected silhouette area of a cube in square pixels.
///
/// Applies the shoelace formula over the projected outline. Occluders are
/// ignored. Returns 0 for cubes without an outline and for projections that
/// produce non-finite coordinates.
pub fn area<P: Projection + ?Sized>(camera: &P, cube: &Cube) -> f32 {
    let Some((points, count)) = project_outline(camera, cube) else {
        return 0.0;
    };

    let mut sum = 0.0;
    for i in 0..count {
        let a = points[i];
        let b = points[(i + 1) % count];
        sum += (a.x + b.x) * (a.y - b.y);
    }

    let result = (sum * 0.5).abs();
    if result.is_finite() {
        result
    } else {
        0.0
    }
}

/// Image-space bounding rectangle `(min, max)` of the projected outline.
///
/// `None` when the cube has no outline or a corner projects to a
/// non-finite coordinate.
pub fn image_bounds<P: Projection + ?Sized>(camera: &P, cube: &Cube) -> Option<(Vec2, Vec2)> {
    let (points, count) = project_outline(camera, cube)?;

    let (min, max) = points[1..count]
        .iter()
        .fold((points[0], points[0]), |(min, max), p| (min.min(*p), max.max(*p)));

    (min.is_finite() && max.is_finite()).then_some((min, max))
}

/// Area of the image-space bounding rectangle of the projected outline.
///
/// Never smaller than [`area`]; equal when the outline is already an
/// axis-aligned rectangle in the image.
pub fn approximate_area<P: Projection + ?Sized>(camera: &P, cube: &Cube) -> f32 {
    let Some((min, max)) = image_bounds(camera, cube) else {
        return 0.0;
    };

    let extent = max - min;
    let result = extent.x * extent.y;
    if result.is_finite() {
        result
    } else {
        0.0
    }
}
