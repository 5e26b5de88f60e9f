//! Full-range 8-bit HSV conversion.
//!
//! Hue is scaled so that one full turn (360°) spans `0..=255`, saturation and
//! value are `0..=255`.  This matches what camera pipelines usually call
//! "HSV_FULL", so thresholds tuned against such tools carry over unchanged.

use image::{Rgb, RgbImage};

/// A single HSV pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    /// Convert one RGB pixel.
    pub fn from_rgb(Rgb([r, g, b]): Rgb<u8>) -> Self {
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let diff = f32::from(max - min);

        let s = if max == 0 {
            0.0
        } else {
            diff * 255.0 / f32::from(max)
        };

        let h_deg = if diff == 0.0 {
            0.0
        } else {
            let (rf, gf, bf) = (f32::from(r), f32::from(g), f32::from(b));
            let h = if max == r {
                60.0 * (gf - bf) / diff
            } else if max == g {
                120.0 + 60.0 * (bf - rf) / diff
            } else {
                240.0 + 60.0 * (rf - gf) / diff
            };
            if h < 0.0 { h + 360.0 } else { h }
        };

        Self {
            h: ((h_deg * 256.0 / 360.0).round() as u32 % 256) as u8,
            s: s.round() as u8,
            v: max,
        }
    }
}

/// A frame converted to HSV, row-major.
#[derive(Debug, Clone)]
pub struct HsvImage {
    width: u32,
    height: u32,
    pixels: Vec<Hsv>,
}

impl HsvImage {
    /// Convert every pixel of `image`.
    pub fn from_rgb(image: &RgbImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            pixels: image.pixels().map(|p| Hsv::from_rgb(*p)).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixels in row-major order.
    pub fn pixels(&self) -> &[Hsv] {
        &self.pixels
    }

    /// The pixel at `(x, y)`, or `None` when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<Hsv> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primaries_map_to_thirds_of_the_hue_circle() {
        assert_eq!(Hsv::from_rgb(Rgb([255, 0, 0])), Hsv { h: 0, s: 255, v: 255 });
        // 120° → 85.3, 240° → 170.7
        assert_eq!(Hsv::from_rgb(Rgb([0, 255, 0])).h, 85);
        assert_eq!(Hsv::from_rgb(Rgb([0, 0, 255])).h, 171);
    }

    #[test]
    fn grey_has_no_hue_or_saturation() {
        let hsv = Hsv::from_rgb(Rgb([128, 128, 128]));
        assert_eq!(hsv, Hsv { h: 0, s: 0, v: 128 });
    }

    #[test]
    fn black_is_all_zero() {
        assert_eq!(Hsv::from_rgb(Rgb([0, 0, 0])), Hsv { h: 0, s: 0, v: 0 });
    }

    #[test]
    fn magenta_red_wraps_near_top_of_range() {
        // Hue ≈ 355°, just below a full turn.
        let hsv = Hsv::from_rgb(Rgb([255, 0, 20]));
        assert!(hsv.h > 250, "expected hue near 255, got {}", hsv.h);
    }

    #[test]
    fn half_saturation() {
        let hsv = Hsv::from_rgb(Rgb([200, 100, 100]));
        assert_eq!(hsv.s, 128); // 100 * 255 / 200 = 127.5 → 128
        assert_eq!(hsv.v, 200);
        assert_eq!(hsv.h, 0);
    }

    #[test]
    fn image_conversion_is_row_major() {
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(1, 0, Rgb([0, 255, 0]));
        let hsv = HsvImage::from_rgb(&img);
        assert_eq!(hsv.pixels().len(), 4);
        assert_eq!(hsv.get(1, 0).unwrap().h, 85);
        assert_eq!(hsv.get(0, 1).unwrap().v, 0);
        assert!(hsv.get(2, 0).is_none());
    }
}
