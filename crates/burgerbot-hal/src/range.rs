//! Generic `RangeSensor` trait for planar laser scanners.

use burgerbot_types::BotError;

/// One sweep of a planar laser scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct LaserScan {
    /// Measured distances in metres.  Index 0 points straight ahead.
    pub ranges: Vec<f32>,
    /// Bearing of `ranges[0]` in radians.
    pub angle_min_rad: f32,
    /// Angular step between consecutive readings in radians.
    pub angle_increment_rad: f32,
}

/// A laser range scanner.
pub trait RangeSensor: Send + Sync {
    /// Stable identifier for this sensor, e.g. `"lidar"`.
    fn id(&self) -> &str;

    /// Return the next complete sweep.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::HardwareFault`] if no sweep can be produced.
    fn scan(&mut self) -> Result<LaserScan, BotError>;
}
