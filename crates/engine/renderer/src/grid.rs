//! Dense 2D pixel buffers
//!
//! Every rasterization pass owns exactly one of these for its lifetime.

use glam::{UVec2, Vec3};

/// Cell value a freshly cleared buffer starts from
pub trait EmptyCell: Copy {
    const EMPTY: Self;
}

impl EmptyCell for f32 {
    const EMPTY: f32 = f32::INFINITY;
}

impl EmptyCell for Vec3 {
    const EMPTY: Vec3 = Vec3::INFINITY;
}

impl EmptyCell for bool {
    const EMPTY: bool = false;
}

/// Color and camera distance of the nearest sample seen by a pixel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRecord {
    pub color: [u8; 3],
    pub depth: f32,
}

impl EmptyCell for PixelRecord {
    const EMPTY: PixelRecord = PixelRecord {
        color: [0, 0, 0],
        depth: f32::INFINITY,
    };
}

/// Row-major grid of cells
#[derive(Debug, Clone, PartialEq)]
pub struct Grid2D<T> {
    width: u32,
    height: u32,
    cells: Vec<T>,
}

/// Per-pixel camera distance, `+inf` where nothing was written
pub type DepthBuffer = Grid2D<f32>;

/// Per-pixel world position, [`EMPTY_POSITION`] where nothing was written
pub type PositionBuffer = Grid2D<Vec3>;

/// `true` where a sensor pixel is occluded from the light
pub type ShadowMask = Grid2D<bool>;

/// Sentinel stored in a [`PositionBuffer`] cell without a sample
pub const EMPTY_POSITION: Vec3 = Vec3::INFINITY;

impl<T: Clone> Grid2D<T> {
    pub fn new(size: UVec2, value: T) -> Self {
        Self {
            width: size.x,
            height: size.y,
            cells: vec![value; size.x as usize * size.y as usize],
        }
    }

    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }
}

impl<T: EmptyCell> Grid2D<T> {
    /// Buffer with every cell set to the empty value
    pub fn cleared(size: UVec2) -> Self {
        Self::new(size, T::EMPTY)
    }
}

impl<T> Grid2D<T> {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    /// Signed bounds test, so rounded image coordinates can be checked
    /// before converting them to indices
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u32, y: u32) -> Option<&T> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut T> {
        self.index(x, y).map(move |i| &mut self.cells[i])
    }

    /// Cells in row-major order
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    /// Cells with their pixel coordinates, row by row
    pub fn iter(&self) -> impl Iterator<Item = (UVec2, &T)> + '_ {
        let width = self.width.max(1);
        self.cells.iter().enumerate().map(move |(i, cell)| {
            let i = i as u32;
            (UVec2::new(i % width, i / width), cell)
        })
    }
}

/// Round an image coordinate to the pixel whose center is nearest,
/// `None` for non-finite coordinates or pixels outside `size`
pub fn pixel_at(coordinate: glam::Vec2, size: UVec2) -> Option<UVec2> {
    if !coordinate.is_finite() {
        return None;
    }
    let rounded = coordinate.round();
    let (x, y) = (rounded.x as i64, rounded.y as i64);
    (x >= 0 && y >= 0 && x < size.x as i64 && y < size.y as i64)
        .then(|| UVec2::new(x as u32, y as u32))
}
