//! Conversion of buffers to images

use std::fmt;
use std::str::FromStr;

use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::error::RenderError;
use crate::grid::{DepthBuffer, Grid2D, PixelRecord, ShadowMask};

/// Mapping of normalized depth in `[0, 1]` to a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMap {
    #[default]
    Gray,
    Jet,
    HotCold,
}

impl ColorMap {
    pub fn color(self, v: f32) -> [u8; 3] {
        let v = v.clamp(0.0, 1.0);
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0) as u8;
        match self {
            ColorMap::Gray => [channel(v); 3],
            ColorMap::Jet => [
                channel(1.5 - (4.0 * v - 3.0).abs()),
                channel(1.5 - (4.0 * v - 2.0).abs()),
                channel(1.5 - (4.0 * v - 1.0).abs()),
            ],
            ColorMap::HotCold => [
                channel(2.0 - (4.0 * v - 4.0).abs()),
                channel(2.0 - (4.0 * v - 2.0).abs()),
                channel(2.0 - (4.0 * v).abs()),
            ],
        }
    }
}

impl FromStr for ColorMap {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gray" | "grey" => Ok(ColorMap::Gray),
            "jet" => Ok(ColorMap::Jet),
            "hotcold" | "hot-cold" => Ok(ColorMap::HotCold),
            _ => Err(RenderError::UnknownColorMap(s.to_string())),
        }
    }
}

impl fmt::Display for ColorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColorMap::Gray => "gray",
            ColorMap::Jet => "jet",
            ColorMap::HotCold => "hotcold",
        })
    }
}

/// Smallest and largest finite depth, `None` if nothing was written
pub fn depth_range(buffer: &DepthBuffer) -> Option<(f32, f32)> {
    buffer
        .cells()
        .iter()
        .copied()
        .filter(|d| d.is_finite())
        .fold(None, |range, d| match range {
            None => Some((d, d)),
            Some((min, max)) => Some((min.min(d), max.max(d))),
        })
}

/// Depth buffer mapped linearly over its finite range; unwritten cells
/// are black
pub fn depth_image(buffer: &DepthBuffer, map: ColorMap) -> RgbImage {
    let (min, max) = depth_range(buffer).unwrap_or((0.0, 0.0));
    let span = max - min;

    RgbImage::from_fn(buffer.width(), buffer.height(), |x, y| {
        match buffer.get(x, y).copied() {
            Some(d) if d.is_finite() => {
                let v = if span > 0.0 { (d - min) / span } else { 0.0 };
                Rgb(map.color(v))
            }
            _ => Rgb([0, 0, 0]),
        }
    })
}

/// Shadowed pixels white, everything else black
pub fn mask_image(mask: &ShadowMask) -> GrayImage {
    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        if mask.get(x, y).copied().unwrap_or(false) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

pub fn record_image(records: &Grid2D<PixelRecord>) -> RgbImage {
    RgbImage::from_fn(records.width(), records.height(), |x, y| {
        Rgb(records.get(x, y).map(|r| r.color).unwrap_or([0, 0, 0]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec2;

    #[test]
    fn test_depth_range_skips_unwritten() {
        let mut buffer = DepthBuffer::cleared(UVec2::new(3, 1));
        assert_eq!(depth_range(&buffer), None);

        *buffer.get_mut(0, 0).unwrap() = 4.0;
        *buffer.get_mut(2, 0).unwrap() = 2.0;
        assert_eq!(depth_range(&buffer), Some((2.0, 4.0)));
    }

    #[test]
    fn test_gray_depth_image() {
        let mut buffer = DepthBuffer::cleared(UVec2::new(3, 1));
        *buffer.get_mut(0, 0).unwrap() = 10.0;
        *buffer.get_mut(1, 0).unwrap() = 20.0;

        let image = depth_image(&buffer, ColorMap::Gray);
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(image.get_pixel(1, 0).0, [255, 255, 255]);
        assert_eq!(image.get_pixel(2, 0).0, [0, 0, 0]);
    }

    #[test]
    fn test_single_depth_maps_to_zero() {
        let mut buffer = DepthBuffer::cleared(UVec2::new(2, 1));
        *buffer.get_mut(0, 0).unwrap() = 7.0;
        *buffer.get_mut(1, 0).unwrap() = 7.0;

        let image = depth_image(&buffer, ColorMap::Jet);
        assert_eq!(image.get_pixel(0, 0).0, ColorMap::Jet.color(0.0));
    }

    #[test]
    fn test_color_map_ends() {
        assert_eq!(ColorMap::Jet.color(0.0), [0, 0, 127]);
        assert_eq!(ColorMap::Jet.color(1.0), [127, 0, 0]);
        assert_eq!(ColorMap::Jet.color(0.5), [127, 255, 127]);
        assert_eq!(ColorMap::HotCold.color(0.0), [0, 0, 255]);
        assert_eq!(ColorMap::HotCold.color(1.0), [255, 0, 0]);
        assert_eq!(ColorMap::HotCold.color(0.5), [0, 255, 0]);
    }

    #[test]
    fn test_color_map_parsing() {
        assert_eq!("jet".parse::<ColorMap>().unwrap(), ColorMap::Jet);
        assert_eq!("HotCold".parse::<ColorMap>().unwrap(), ColorMap::HotCold);
        assert_eq!(ColorMap::Gray.to_string().parse::<ColorMap>().unwrap(), ColorMap::Gray);
        assert!(matches!(
            "rainbow".parse::<ColorMap>(),
            Err(RenderError::UnknownColorMap(name)) if name == "rainbow"
        ));
    }

    #[test]
    fn test_mask_image() {
        let mut mask = ShadowMask::cleared(UVec2::new(2, 2));
        *mask.get_mut(1, 0).unwrap() = true;

        let image = mask_image(&mask);
        assert_eq!(image.get_pixel(1, 0).0, [255]);
        assert_eq!(image.get_pixel(0, 1).0, [0]);
    }
}
