//! Generic `Camera` trait and supporting types for image-capture hardware.

use burgerbot_types::{BotError, ImageMessage};
use image::RgbImage;

/// Pixel layouts understood by [`CameraFrame::to_rgb_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelEncoding {
    /// 3 bytes per pixel, blue first (the arena camera's native format).
    Bgr8,
    /// 3 bytes per pixel, red first.
    Rgb8,
    /// 1 byte per pixel, greyscale.
    Mono8,
}

impl PixelEncoding {
    /// Parse a ROS encoding string.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::ImageDecode`] for encodings other than `bgr8`,
    /// `rgb8` and `mono8`.
    pub fn parse(encoding: &str) -> Result<Self, BotError> {
        match encoding {
            "bgr8" => Ok(PixelEncoding::Bgr8),
            "rgb8" => Ok(PixelEncoding::Rgb8),
            "mono8" => Ok(PixelEncoding::Mono8),
            other => Err(BotError::ImageDecode(format!(
                "unsupported image encoding '{other}'"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PixelEncoding::Bgr8 => "bgr8",
            PixelEncoding::Rgb8 => "rgb8",
            PixelEncoding::Mono8 => "mono8",
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelEncoding::Bgr8 | PixelEncoding::Rgb8 => 3,
            PixelEncoding::Mono8 => 1,
        }
    }
}

/// A raw image frame returned by a camera driver.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    pub encoding: PixelEncoding,
    /// Raw pixel data, row-major, tightly packed.
    pub data: Vec<u8>,
}

impl CameraFrame {
    /// Interpret an inbound `/image_raw` message.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::ImageDecode`] if the encoding is unsupported.
    pub fn from_message(message: ImageMessage) -> Result<Self, BotError> {
        Ok(Self {
            width: message.width,
            height: message.height,
            encoding: PixelEncoding::parse(&message.encoding)?,
            data: message.data,
        })
    }

    /// Package this frame as an `/image_raw` message.
    pub fn into_message(self) -> ImageMessage {
        ImageMessage {
            width: self.width,
            height: self.height,
            encoding: self.encoding.as_str().to_string(),
            data: self.data,
        }
    }

    /// Decode into an RGB image.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::ImageDecode`] when the buffer length does not
    /// match `width * height * bytes_per_pixel`.
    pub fn to_rgb_image(&self) -> Result<RgbImage, BotError> {
        let bpp = self.encoding.bytes_per_pixel();
        let expected = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|pixels| pixels.checked_mul(bpp))
            .ok_or_else(|| {
                BotError::ImageDecode(format!(
                    "{}x{} {} frame size overflows",
                    self.width,
                    self.height,
                    self.encoding.as_str()
                ))
            })?;
        if self.data.len() != expected {
            return Err(BotError::ImageDecode(format!(
                "{}x{} {} frame needs {} bytes, got {}",
                self.width,
                self.height,
                self.encoding.as_str(),
                expected,
                self.data.len()
            )));
        }

        let mut rgb = Vec::with_capacity(expected / bpp * 3);
        for px in self.data.chunks_exact(bpp) {
            match self.encoding {
                PixelEncoding::Bgr8 => rgb.extend_from_slice(&[px[2], px[1], px[0]]),
                PixelEncoding::Rgb8 => rgb.extend_from_slice(px),
                PixelEncoding::Mono8 => rgb.extend_from_slice(&[px[0], px[0], px[0]]),
            }
        }
        RgbImage::from_raw(self.width, self.height, rgb).ok_or_else(|| {
            BotError::ImageDecode(format!(
                "{}x{} buffer rejected by image decoder",
                self.width, self.height
            ))
        })
    }
}

/// A camera or image-capture device.
pub trait Camera: Send + Sync {
    /// Stable identifier for this camera, e.g. `"front_rgb"`.
    fn id(&self) -> &str;

    /// Capture and return the next available frame.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::HardwareFault`] if the frame cannot be captured
    /// (e.g. the device is disconnected or the buffer is unavailable).
    fn capture(&mut self) -> Result<CameraFrame, BotError>;
}
