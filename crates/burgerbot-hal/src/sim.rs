//! In-process simulated sensors for headless runs and CI.
//!
//! [`SimCamera`] renders flat-coloured rectangles ("targets") on a uniform
//! background and emits them as `bgr8` frames, the same encoding the arena
//! camera uses.  [`SimRangeSensor`] plays back a scripted list of forward
//! distances.
//!
//! # Example
//!
//! ```rust
//! use burgerbot_hal::sim::{SimCamera, SimRangeSensor};
//! use burgerbot_hal::{Camera, RangeSensor};
//! use burgerbot_types::BlobRect;
//!
//! let mut camera = SimCamera::new("front_rgb", 640, 480)
//!     .with_target([255, 0, 0], BlobRect { x: 300, y: 220, width: 40, height: 40 });
//! let frame = camera.capture().expect("sim capture must succeed");
//! assert_eq!(frame.data.len(), 640 * 480 * 3);
//!
//! let mut lidar = SimRangeSensor::new("lidar", vec![1.0, 0.3]);
//! assert_eq!(lidar.scan().unwrap().ranges[0], 1.0);
//! assert_eq!(lidar.scan().unwrap().ranges[0], 0.3);
//! ```

use burgerbot_types::{BlobRect, BotError};
use tracing::{debug, trace};

use crate::camera::{Camera, CameraFrame, PixelEncoding};
use crate::range::{LaserScan, RangeSensor};

// ────────────────────────────────────────────────────────────────────────────
// Simulated camera
// ────────────────────────────────────────────────────────────────────────────

/// A simulated camera that renders solid rectangles on a grey background.
/// Always succeeds.
pub struct SimCamera {
    id: String,
    width: u32,
    height: u32,
    background: [u8; 3],
    targets: Vec<([u8; 3], BlobRect)>,
}

impl SimCamera {
    /// Create a camera producing `width`×`height` frames with a mid-grey
    /// background and no targets.
    pub fn new(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            background: [128, 128, 128],
            targets: Vec::new(),
        }
    }

    /// Add a solid rectangle of the given RGB colour.  Later targets are
    /// painted over earlier ones; parts outside the frame are clipped.
    pub fn with_target(mut self, rgb: [u8; 3], rect: BlobRect) -> Self {
        self.targets.push((rgb, rect));
        self
    }

    /// Replace the background colour.
    pub fn with_background(mut self, rgb: [u8; 3]) -> Self {
        self.background = rgb;
        self
    }
}

impl Camera for SimCamera {
    fn id(&self) -> &str {
        &self.id
    }

    fn capture(&mut self) -> Result<CameraFrame, BotError> {
        let (w, h) = (self.width as usize, self.height as usize);
        let [r, g, b] = self.background;
        let mut data = [b, g, r].repeat(w * h);

        for ([r, g, b], rect) in &self.targets {
            let x_end = (rect.x.saturating_add(rect.width) as usize).min(w);
            let y_end = (rect.y.saturating_add(rect.height) as usize).min(h);
            for y in (rect.y as usize)..y_end {
                for x in (rect.x as usize)..x_end {
                    let i = (y * w + x) * 3;
                    data[i..i + 3].copy_from_slice(&[*b, *g, *r]);
                }
            }
        }

        trace!(camera = %self.id, targets = self.targets.len(), "simulated frame");
        Ok(CameraFrame {
            width: self.width,
            height: self.height,
            encoding: PixelEncoding::Bgr8,
            data,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated laser scanner
// ────────────────────────────────────────────────────────────────────────────

/// Number of readings in a simulated sweep (1° resolution).
const SIM_SCAN_READINGS: usize = 360;

/// Range reported for every bearing except straight ahead.
const SIM_OPEN_RANGE_M: f32 = 3.5;

/// A simulated 360° scanner whose forward reading cycles through a script.
pub struct SimRangeSensor {
    id: String,
    forward_script: Vec<f32>,
    cursor: usize,
}

impl SimRangeSensor {
    /// Create a scanner whose `ranges[0]` steps through `forward_script`,
    /// wrapping around at the end.
    pub fn new(id: impl Into<String>, forward_script: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            forward_script,
            cursor: 0,
        }
    }
}

impl RangeSensor for SimRangeSensor {
    fn id(&self) -> &str {
        &self.id
    }

    fn scan(&mut self) -> Result<LaserScan, BotError> {
        if self.forward_script.is_empty() {
            return Err(BotError::HardwareFault {
                component: self.id.clone(),
                details: "simulated scanner has an empty distance script".to_string(),
            });
        }
        let at = self.cursor % self.forward_script.len();
        if at == 0 && self.cursor > 0 {
            debug!(sensor = %self.id, "distance script wrapped");
        }
        let forward = self.forward_script[at];
        self.cursor = self.cursor.wrapping_add(1);

        let mut ranges = vec![SIM_OPEN_RANGE_M; SIM_SCAN_READINGS];
        ranges[0] = forward;
        Ok(LaserScan {
            ranges,
            angle_min_rad: 0.0,
            angle_increment_rad: std::f32::consts::TAU / SIM_SCAN_READINGS as f32,
        })
    }
}
