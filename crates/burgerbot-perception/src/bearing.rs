//! [`BearingEstimator`] – horizontal bearing towards the largest colour blob.
//!
//! The bearing is linear in the pixel offset of the blob's centre from the
//! middle of the frame:
//!
//! ```text
//! bearing_deg = (center_x - image_width / 2) * deg_per_pixel
//! ```
//!
//! Positive bearings mean the blob is right of centre.  Nothing here accounts
//! for lens distortion; `deg_per_pixel` is a single calibration constant.
//!
//! # Example
//!
//! ```rust
//! use burgerbot_perception::BearingEstimator;
//! use burgerbot_types::ColorClass;
//! use image::{Rgb, RgbImage};
//!
//! let mut frame = RgbImage::from_pixel(640, 480, Rgb([128, 128, 128]));
//! for y in 220..260 {
//!     for x in 300..340 {
//!         frame.put_pixel(x, y, Rgb([0, 0, 255]));
//!     }
//! }
//!
//! let detection = BearingEstimator::default()
//!     .estimate(&frame, ColorClass::Blue)
//!     .expect("blue blob must be found");
//! assert!(detection.bearing_rad.abs() < 1e-6);
//! ```

use burgerbot_types::{BlobRect, ColorClass};
use image::RgbImage;
use tracing::trace;

use crate::blob::find_blobs;
use crate::color::ColorMask;
use crate::hsv::HsvImage;

/// Default camera calibration in degrees per horizontal pixel.
pub const DEFAULT_DEG_PER_PIXEL: f32 = 0.077;

/// The largest blob of one colour and its bearing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub color: ColorClass,
    pub rect: BlobRect,
    pub bearing_rad: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct BearingEstimator {
    deg_per_pixel: f32,
}

impl Default for BearingEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_DEG_PER_PIXEL)
    }
}

impl BearingEstimator {
    pub fn new(deg_per_pixel: f32) -> Self {
        Self { deg_per_pixel }
    }

    pub fn deg_per_pixel(&self) -> f32 {
        self.deg_per_pixel
    }

    /// Bearing in radians of `rect` inside a frame `image_width` pixels wide.
    /// Both centres are whole pixels.
    pub fn bearing_for(&self, rect: &BlobRect, image_width: u32) -> f32 {
        let offset_px = rect.center_x() - (image_width / 2) as f32;
        (offset_px * self.deg_per_pixel).to_radians()
    }

    /// Find the largest `color` blob in `image`.  Returns `None` when no
    /// pixel passes the threshold.
    pub fn estimate(&self, image: &RgbImage, color: ColorClass) -> Option<Detection> {
        self.estimate_hsv(&HsvImage::from_rgb(image), color)
    }

    /// Run [`estimate`](Self::estimate) for every colour, converting to HSV
    /// once.  The result is indexed by [`ColorClass::index`].
    pub fn estimate_all(&self, image: &RgbImage) -> [Option<Detection>; 3] {
        let hsv = HsvImage::from_rgb(image);
        ColorClass::ALL.map(|color| self.estimate_hsv(&hsv, color))
    }

    fn estimate_hsv(&self, hsv: &HsvImage, color: ColorClass) -> Option<Detection> {
        let mask = ColorMask::segment(hsv, color);
        let blobs = find_blobs(&mask);

        // Strict comparison: the first blob in raster order wins ties.
        let mut largest: Option<BlobRect> = None;
        for blob in &blobs {
            if largest.is_none_or(|best| blob.rect.area() > best.area()) {
                largest = Some(blob.rect);
            }
        }
        let rect = largest?;

        let bearing_rad = self.bearing_for(&rect, hsv.width());
        trace!(
            %color,
            blobs = blobs.len(),
            x = rect.x,
            width = rect.width,
            bearing_rad,
            "blob bearing"
        );
        Some(Detection {
            color,
            rect,
            bearing_rad,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const GREY: Rgb<u8> = Rgb([128, 128, 128]);

    fn paint(img: &mut RgbImage, rgb: [u8; 3], x: u32, y: u32, w: u32, h: u32) {
        for yy in y..(y + h).min(img.height()) {
            for xx in x..(x + w).min(img.width()) {
                img.put_pixel(xx, yy, Rgb(rgb));
            }
        }
    }

    fn frame_with(rgb: [u8; 3], x: u32, w: u32) -> RgbImage {
        let mut img = RgbImage::from_pixel(640, 480, GREY);
        paint(&mut img, rgb, x, 220, w, 40);
        img
    }

    #[test]
    fn centred_blob_has_zero_bearing_for_every_colour() {
        let est = BearingEstimator::default();
        for (rgb, color) in [
            ([255, 0, 0], ColorClass::Red),
            ([0, 255, 0], ColorClass::Green),
            ([0, 0, 255], ColorClass::Blue),
        ] {
            let d = est.estimate(&frame_with(rgb, 300, 40), color).unwrap();
            assert_eq!(
                d.rect,
                BlobRect {
                    x: 300,
                    y: 220,
                    width: 40,
                    height: 40
                }
            );
            assert!(d.bearing_rad.abs() < 1e-6, "{color}: {}", d.bearing_rad);
        }
    }

    #[test]
    fn blob_at_right_edge_has_positive_bearing() {
        // Clipped to x = 620..640, centre 630, offset 310 px.
        let d = BearingEstimator::default()
            .estimate(&frame_with([0, 255, 0], 620, 40), ColorClass::Green)
            .unwrap();
        let expected = (310.0_f32 * 0.077).to_radians();
        assert!((d.bearing_rad - expected).abs() < 1e-5);
        assert!(d.bearing_rad > 0.0);
    }

    #[test]
    fn blob_left_of_centre_has_negative_bearing() {
        let d = BearingEstimator::default()
            .estimate(&frame_with([0, 0, 255], 100, 40), ColorClass::Blue)
            .unwrap();
        assert!(d.bearing_rad < 0.0);
    }

    #[test]
    fn bearing_is_linear_in_offset() {
        let est = BearingEstimator::default();
        let one = est
            .estimate(&frame_with([255, 0, 0], 400, 40), ColorClass::Red)
            .unwrap()
            .bearing_rad;
        let two = est
            .estimate(&frame_with([255, 0, 0], 500, 40), ColorClass::Red)
            .unwrap()
            .bearing_rad;
        assert!((two - 2.0 * one).abs() < 1e-5, "{one} vs {two}");
    }

    #[test]
    fn missing_colour_yields_none() {
        let img = frame_with([0, 255, 0], 300, 40);
        assert!(BearingEstimator::default().estimate(&img, ColorClass::Red).is_none());
    }

    #[test]
    fn largest_blob_wins() {
        let mut img = RgbImage::from_pixel(640, 480, GREY);
        paint(&mut img, [0, 0, 255], 10, 10, 10, 10);
        paint(&mut img, [0, 0, 255], 500, 300, 60, 60);
        let d = BearingEstimator::default()
            .estimate(&img, ColorClass::Blue)
            .unwrap();
        assert_eq!(d.rect.x, 500);
        assert_eq!(d.rect.width, 60);
    }

    #[test]
    fn first_blob_wins_a_tie() {
        let mut img = RgbImage::from_pixel(640, 480, GREY);
        paint(&mut img, [0, 255, 0], 400, 100, 20, 20);
        paint(&mut img, [0, 255, 0], 50, 300, 20, 20);
        let d = BearingEstimator::default()
            .estimate(&img, ColorClass::Green)
            .unwrap();
        assert_eq!(d.rect.x, 400);
    }

    #[test]
    fn uses_actual_frame_width() {
        // 320-wide frame: centre is 160.
        let mut img = RgbImage::from_pixel(320, 240, GREY);
        paint(&mut img, [255, 0, 0], 140, 100, 40, 40);
        let d = BearingEstimator::default()
            .estimate(&img, ColorClass::Red)
            .unwrap();
        assert!(d.bearing_rad.abs() < 1e-6);
    }

    #[test]
    fn estimate_all_reports_each_colour() {
        let mut img = RgbImage::from_pixel(640, 480, GREY);
        paint(&mut img, [255, 0, 0], 0, 0, 20, 20);
        paint(&mut img, [0, 0, 255], 600, 400, 20, 20);
        let all = BearingEstimator::default().estimate_all(&img);
        assert!(all[ColorClass::Red.index()].unwrap().bearing_rad < 0.0);
        assert!(all[ColorClass::Green.index()].is_none());
        assert!(all[ColorClass::Blue.index()].unwrap().bearing_rad > 0.0);
    }

    #[test]
    fn calibration_scales_bearing() {
        let rect = BlobRect {
            x: 420,
            y: 0,
            width: 0,
            height: 0,
        };
        let a = BearingEstimator::new(0.1).bearing_for(&rect, 640);
        assert!((a - 10.0_f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn odd_sizes_use_whole_pixel_centres() {
        let rect = BlobRect {
            x: 400,
            y: 0,
            width: 41,
            height: 1,
        };
        // centre 420, frame centre 320
        let a = BearingEstimator::new(0.1).bearing_for(&rect, 641);
        assert!((a - 10.0_f32.to_radians()).abs() < 1e-6);
    }
}
