//! Debug overlay: outline detections on a frame.

use burgerbot_types::BlobRect;
use image::{Rgb, RgbImage};

use crate::bearing::Detection;

/// Outline colour used by [`draw_detection`].
pub const DETECTION_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Line thickness in pixels used by [`draw_detection`].
pub const DETECTION_THICKNESS: u32 = 2;

/// Draw the bounding box of `detection` onto `image`.
pub fn draw_detection(image: &mut RgbImage, detection: &Detection) {
    draw_rect_outline(image, &detection.rect, DETECTION_COLOR, DETECTION_THICKNESS);
}

/// Draw a hollow rectangle growing inwards from `rect`'s edges.  Anything
/// outside the image is clipped.
pub fn draw_rect_outline(image: &mut RgbImage, rect: &BlobRect, color: Rgb<u8>, thickness: u32) {
    let x_end = rect.x.saturating_add(rect.width).min(image.width());
    let y_end = rect.y.saturating_add(rect.height).min(image.height());
    for y in rect.y..y_end {
        for x in rect.x..x_end {
            let on_edge = x - rect.x < thickness
                || y - rect.y < thickness
                || rect.x + rect.width - 1 - x < thickness
                || rect.y + rect.height - 1 - y < thickness;
            if on_edge {
                image.put_pixel(x, y, color);
            }
        }
    }
}
