//! [`BotState`] – everything the node remembers between callbacks.
//!
//! Only the latest value of each reading is kept; there is no history.

use burgerbot_perception::Detection;
use burgerbot_types::{ColorClass, SENTINEL_DISTANCE_M};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// What to do with a colour's bearing when a frame contains no blob of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Keep the previous bearing.
    #[default]
    HoldLast,
    /// Forget the previous bearing.
    Invalidate,
}

#[derive(Debug, Clone)]
pub struct BotState {
    front_distance: f32,
    bearings: [Option<f32>; 3],
    last_frame: Option<RgbImage>,
    stale_policy: StalePolicy,
}

impl Default for BotState {
    fn default() -> Self {
        Self::new(StalePolicy::default())
    }
}

impl BotState {
    /// Fresh state: distance is the "nothing seen yet" sentinel and no
    /// bearings are known.
    pub fn new(stale_policy: StalePolicy) -> Self {
        Self {
            front_distance: SENTINEL_DISTANCE_M,
            bearings: [None; 3],
            last_frame: None,
            stale_policy,
        }
    }

    /// Latest straight-ahead distance in metres.
    pub fn front_distance(&self) -> f32 {
        self.front_distance
    }

    /// Latest bearing towards `color` in radians, if known.
    pub fn bearing(&self, color: ColorClass) -> Option<f32> {
        self.bearings[color.index()]
    }

    /// The most recent (annotated) camera frame.
    pub fn last_frame(&self) -> Option<&RgbImage> {
        self.last_frame.as_ref()
    }

    pub fn stale_policy(&self) -> StalePolicy {
        self.stale_policy
    }

    /// Take `ranges[0]` as the new forward distance.  Empty scans and
    /// non-numeric readings are ignored; returns whether the distance
    /// changed.
    pub fn on_scan(&mut self, ranges: &[f32]) -> bool {
        match ranges.first() {
            Some(&d) if !d.is_nan() => {
                self.front_distance = d;
                true
            }
            _ => {
                trace!(readings = ranges.len(), "scan without usable forward reading");
                false
            }
        }
    }

    /// Fold one frame's detections (indexed by [`ColorClass::index`]) into
    /// the stored bearings.
    pub fn on_detections(&mut self, detections: &[Option<Detection>; 3]) {
        for color in ColorClass::ALL {
            let slot = &mut self.bearings[color.index()];
            match (detections[color.index()], self.stale_policy) {
                (Some(d), _) => *slot = Some(d.bearing_rad),
                (None, StalePolicy::HoldLast) => {}
                (None, StalePolicy::Invalidate) => *slot = None,
            }
        }
    }

    pub fn set_last_frame(&mut self, frame: RgbImage) {
        self.last_frame = Some(frame);
    }
}
