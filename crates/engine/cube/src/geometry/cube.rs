use glam::Vec3;

/// Corner indices of a cube.
///
/// A corner index carries one bit per axis: `4` selects +x, `2` selects +y
/// and `1` selects +z. The names spell the sign of each axis offset in
/// x, y, z order (`N` = negative, `P` = positive).
pub mod corner {
    pub const NNN: u8 = 0;
    pub const NNP: u8 = 1;
    pub const NPN: u8 = 2;
    pub const NPP: u8 = 3;
    pub const PNN: u8 = 4;
    pub const PNP: u8 = 5;
    pub const PPN: u8 = 6;
    pub const PPP: u8 = 7;
}

/// Axis-aligned cube described by its center and half extent.
///
/// A cube is the volumetric footprint of a single point sample (a voxel).
/// A half extent of zero denotes a degenerate point which is never
/// subdivided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cube {
    center: Vec3,
    half_extent: f32,
}

impl Cube {
    /// Create a cube from its center and half extent.
    ///
    /// Negative half extents are clamped to zero.
    pub fn new(center: Vec3, half_extent: f32) -> Self {
        Self {
            center,
            half_extent: half_extent.max(0.0),
        }
    }

    /// Degenerate cube covering a single point.
    pub fn point(center: Vec3) -> Self {
        Self::new(center, 0.0)
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        self.center
    }

    #[inline]
    pub fn half_extent(&self) -> f32 {
        self.half_extent
    }

    /// Edge length of the cube
    #[inline]
    pub fn size(&self) -> f32 {
        self.half_extent * 2.0
    }

    #[inline]
    pub fn volume(&self) -> f32 {
        self.size().powi(3)
    }

    /// True when the cube has no extent (or a non-finite one)
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.half_extent <= 0.0 || !self.half_extent.is_finite()
    }

    pub fn minimum(&self) -> Vec3 {
        self.center - Vec3::splat(self.half_extent)
    }

    pub fn maximum(&self) -> Vec3 {
        self.center + Vec3::splat(self.half_extent)
    }

    /// Position of a corner, see [`corner`] for the index layout.
    #[inline]
    pub fn corner(&self, index: u8) -> Vec3 {
        self.center + octant_sign(index) * self.half_extent
    }

    pub fn corners(&self) -> [Vec3; 8] {
        std::array::from_fn(|i| self.corner(i as u8))
    }

    /// Child cube occupying one octant of this cube.
    ///
    /// The octant index uses the same bit layout as corner indices; the
    /// child's half extent is half of the parent's and its center sits half
    /// a child edge away from the parent center on every axis.
    #[inline]
    pub fn octant(&self, index: u8) -> Cube {
        let child_half = self.half_extent * 0.5;
        Cube {
            center: self.center + octant_sign(index) * child_half,
            half_extent: child_half,
        }
    }

    /// All eight child octants, ordered by octant index.
    pub fn octants(&self) -> [Cube; 8] {
        std::array::from_fn(|i| self.octant(i as u8))
    }
}

/// Sign vector of an octant / corner index (each component is ±1)
#[inline]
fn octant_sign(index: u8) -> Vec3 {
    Vec3::new(
        if index & 0b100 != 0 { 1.0 } else { -1.0 },
        if index & 0b010 != 0 { 1.0 } else { -1.0 },
        if index & 0b001 != 0 { 1.0 } else { -1.0 },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Aabb;

    #[test]
    fn test_cube_bounds() {
        let cube = Cube::new(Vec3::new(1.0, 2.0, 3.0), 0.5);
        assert_eq!(cube.minimum(), Vec3::new(0.5, 1.5, 2.5));
        assert_eq!(cube.maximum(), Vec3::new(1.5, 2.5, 3.5));
        assert_eq!(cube.size(), 1.0);
    }

    #[test]
    fn test_corner_layout() {
        let cube = Cube::new(Vec3::ZERO, 1.0);
        assert_eq!(cube.corner(corner::NNN), Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(cube.corner(corner::NNP), Vec3::new(-1.0, -1.0, 1.0));
        assert_eq!(cube.corner(corner::NPN), Vec3::new(-1.0, 1.0, -1.0));
        assert_eq!(cube.corner(corner::PNN), Vec3::new(1.0, -1.0, -1.0));
        assert_eq!(cube.corner(corner::PPP), Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_octants_are_distinct_halves() {
        let parent = Cube::new(Vec3::new(4.0, -2.0, 8.0), 2.0);
        let children = parent.octants();

        for (i, child) in children.iter().enumerate() {
            assert_eq!(child.half_extent(), 1.0);
            let offset = child.center() - parent.center();
            assert_eq!(offset.abs(), Vec3::splat(1.0), "octant {i}");
            for other in &children[i + 1..] {
                assert_ne!(child.center(), other.center());
            }
        }
    }

    #[test]
    fn test_octants_partition_parent() {
        let parent = Cube::new(Vec3::new(0.5, 0.5, 0.5), 0.5);
        let children = parent.octants();

        let total: f32 = children.iter().map(Cube::volume).sum();
        assert!((total - parent.volume()).abs() < 1e-6);

        // Children only share faces: no two interiors overlap
        for (i, a) in children.iter().enumerate() {
            for b in &children[i + 1..] {
                assert!(!Aabb::from(*a).intersects(&Aabb::from(*b)));
            }
        }

        // Union of child bounds is the parent bounds
        let union = children
            .iter()
            .fold(Aabb::from(children[0]), |acc, c| acc.union(&Aabb::from(*c)));
        assert_eq!(union, Aabb::from(parent));
    }

    #[test]
    fn test_degenerate_cube() {
        assert!(Cube::point(Vec3::ONE).is_degenerate());
        assert!(Cube::new(Vec3::ZERO, -3.0).is_degenerate());
        assert!(!Cube::new(Vec3::ZERO, 0.25).is_degenerate());
    }
}
