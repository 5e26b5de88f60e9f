//! [`ObstacleController`] – the two-state obstacle reaction law.
//!
//! | Forward distance      | Command                       |
//! |-----------------------|-------------------------------|
//! | `d > clearance_m`     | `(cruise_speed, 0)`           |
//! | `d <= clearance_m`    | `(0, turn_rate)`              |
//!
//! The law is memoryless: no hysteresis, no smoothing, no rate limiting.

use std::f32::consts::FRAC_PI_4;

use burgerbot_types::VelocityCommand;

pub const DEFAULT_CLEARANCE_M: f32 = 0.45;
pub const DEFAULT_CRUISE_SPEED: f32 = 0.2;
pub const DEFAULT_TURN_RATE: f32 = FRAC_PI_4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleController {
    pub clearance_m: f32,
    pub cruise_speed: f32,
    pub turn_rate: f32,
}

impl Default for ObstacleController {
    fn default() -> Self {
        Self {
            clearance_m: DEFAULT_CLEARANCE_M,
            cruise_speed: DEFAULT_CRUISE_SPEED,
            turn_rate: DEFAULT_TURN_RATE,
        }
    }
}

impl ObstacleController {
    /// Command for a forward distance of `distance_m`.  A distance exactly
    /// at the clearance turns; NaN turns as well.
    pub fn command(&self, distance_m: f32) -> VelocityCommand {
        if distance_m > self.clearance_m {
            VelocityCommand::new(self.cruise_speed, 0.0)
        } else {
            VelocityCommand::new(0.0, self.turn_rate)
        }
    }
}
