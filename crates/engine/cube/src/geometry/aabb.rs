//! Axis-aligned bounding box
//!
//! General bounding-volume utility used for scene bounds and light fitting.
//! A box whose minimum equals its maximum is considered null.

use std::str::FromStr;

use glam::Vec3;
use thiserror::Error;

use super::{Cube, Ray};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

#[derive(Debug, Error, PartialEq)]
pub enum AabbParseError {
    #[error("expected 6 numbers (min xyz, max xyz), got {0}")]
    WrongCount(usize),

    #[error("invalid number: {0}")]
    InvalidNumber(String),
}

impl Aabb {
    /// Create a new AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, or `None` for an empty iterator
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::new(first, first), |acc, p| Self {
            min: acc.min.min(p),
            max: acc.max.max(p),
        }))
    }

    /// True when min == max
    pub fn is_null(&self) -> bool {
        self.min == self.max
    }

    /// Inclusive point containment test
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Test intersection with another AABB
    ///
    /// Boxes that only touch at a face, edge or corner do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        for axis in 0..3 {
            if other.min[axis] >= self.max[axis] || other.max[axis] <= self.min[axis] {
                return false;
            }
        }
        true
    }

    /// Slab test against a ray.
    ///
    /// Returns the parametric entry and exit distances `(tmin, tmax)` along
    /// the ray when the infinite line through the ray crosses the box.
    pub fn intersects_ray(&self, ray: &Ray) -> Option<(f32, f32)> {
        let inverse = ray.direction.recip();
        let mut tmin = f32::NEG_INFINITY;
        let mut tmax = f32::INFINITY;

        for axis in 0..3 {
            let (near, far) = if inverse[axis] >= 0.0 {
                (self.min[axis], self.max[axis])
            } else {
                (self.max[axis], self.min[axis])
            };
            let t0 = (near - ray.origin[axis]) * inverse[axis];
            let t1 = (far - ray.origin[axis]) * inverse[axis];

            if tmin > t1 || t0 > tmax {
                return None;
            }
            tmin = tmin.max(t0);
            tmax = tmax.min(t1);
        }

        Some((tmin, tmax))
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Box grown by `margin` on every side
    pub fn expanded(&self, margin: f32) -> Aabb {
        Aabb {
            min: self.min - Vec3::splat(margin),
            max: self.max + Vec3::splat(margin),
        }
    }

    /// The eight corners of the box
    pub fn corners(&self) -> [Vec3; 8] {
        std::array::from_fn(|i| {
            Vec3::new(
                if i & 0b100 != 0 { self.max.x } else { self.min.x },
                if i & 0b010 != 0 { self.max.y } else { self.min.y },
                if i & 0b001 != 0 { self.max.z } else { self.min.z },
            )
        })
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn depth(&self) -> f32 {
        self.max.z - self.min.z
    }

    /// Largest of width, height and depth
    pub fn maximum_extent(&self) -> f32 {
        self.size().max_element()
    }
}

impl From<Cube> for Aabb {
    fn from(cube: Cube) -> Self {
        Aabb::new(cube.minimum(), cube.maximum())
    }
}

impl FromStr for Aabb {
    type Err = AabbParseError;

    /// Parse `min.x min.y min.z max.x max.y max.z`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split_whitespace()
            .map(|token| {
                token
                    .parse::<f32>()
                    .map_err(|_| AabbParseError::InvalidNumber(token.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        match values.as_slice() {
            [a, b, c, d, e, f] => Ok(Aabb::new(Vec3::new(*a, *b, *c), Vec3::new(*d, *e, *f))),
            other => Err(AabbParseError::WrongCount(other.len())),
        }
    }
}
