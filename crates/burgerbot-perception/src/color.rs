//! Colour thresholds and binary segmentation.
//!
//! Each [`ColorClass`] maps to exactly one [`ColorThreshold`] in a static
//! table.  Red needs a wrapping hue band because it straddles 0°.
//!
//! | Colour | Hue (0–255)        | Saturation | Value   |
//! |--------|--------------------|------------|---------|
//! | Red    | `< 20` or `> 200`  | `> 128`    | any     |
//! | Green  | `75..=110`         | `50..=255` | `50..=255` |
//! | Blue   | `130..=200`        | `50..=255` | `50..=255` |

use burgerbot_types::ColorClass;

use crate::hsv::{Hsv, HsvImage};

/// Accepted hue interval on the 0–255 circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HueBand {
    /// `min <= hue <= max`.
    Within { min: u8, max: u8 },
    /// `hue < below || hue > above`, for bands that wrap past 0.
    Wrapping { below: u8, above: u8 },
}

impl HueBand {
    pub fn contains(self, hue: u8) -> bool {
        match self {
            HueBand::Within { min, max } => (min..=max).contains(&hue),
            HueBand::Wrapping { below, above } => hue < below || hue > above,
        }
    }
}

/// HSV acceptance window for one colour class.  Saturation and value bounds
/// are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorThreshold {
    pub color: ColorClass,
    pub hue: HueBand,
    pub saturation_min: u8,
    pub saturation_max: u8,
    pub value_min: u8,
    pub value_max: u8,
}

impl ColorThreshold {
    pub fn matches(&self, px: Hsv) -> bool {
        self.hue.contains(px.h)
            && (self.saturation_min..=self.saturation_max).contains(&px.s)
            && (self.value_min..=self.value_max).contains(&px.v)
    }
}

/// Indexed by [`ColorClass::index`].
static THRESHOLDS: [ColorThreshold; 3] = [
    ColorThreshold {
        color: ColorClass::Red,
        hue: HueBand::Wrapping {
            below: 20,
            above: 200,
        },
        saturation_min: 129,
        saturation_max: 255,
        value_min: 0,
        value_max: 255,
    },
    ColorThreshold {
        color: ColorClass::Green,
        hue: HueBand::Within { min: 75, max: 110 },
        saturation_min: 50,
        saturation_max: 255,
        value_min: 50,
        value_max: 255,
    },
    ColorThreshold {
        color: ColorClass::Blue,
        hue: HueBand::Within { min: 130, max: 200 },
        saturation_min: 50,
        saturation_max: 255,
        value_min: 50,
        value_max: 255,
    },
];

/// The threshold for `color`.
pub fn threshold(color: ColorClass) -> &'static ColorThreshold {
    &THRESHOLDS[color.index()]
}

// ────────────────────────────────────────────────────────────────────────────
// Mask
// ────────────────────────────────────────────────────────────────────────────

/// Binary image: `true` where a pixel passed the threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl ColorMask {
    /// Segment `image` against the threshold for `color`.
    pub fn segment(image: &HsvImage, color: ColorClass) -> Self {
        let t = threshold(color);
        Self {
            width: image.width(),
            height: image.height(),
            bits: image.pixels().iter().map(|&px| t.matches(px)).collect(),
        }
    }

    /// Build a mask directly from row-major bits.  Returns `None` if the
    /// length does not match the dimensions.
    pub fn from_bits(width: u32, height: u32, bits: Vec<bool>) -> Option<Self> {
        (bits.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            bits,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether `(x, y)` is set.  Out-of-bounds coordinates read as unset.
    pub fn get(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return false;
        }
        self.bits[y as usize * self.width as usize + x as usize]
    }

    /// Number of set pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}
