use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Forward distance assumed before the first laser scan arrives.  Large
/// enough to count as "clear" for any sensible clearance threshold.
pub const SENTINEL_DISTANCE_M: f32 = 10_000.0;

/// A differential-drive velocity command (`geometry_msgs/Twist` with only
/// `linear.x` and `angular.z` populated).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VelocityCommand {
    /// Forward speed in m/s (negative = reverse).
    pub linear: f32,
    /// Yaw rate in rad/s (positive = counter-clockwise).
    pub angular: f32,
}

impl VelocityCommand {
    /// Both speeds zero.
    pub const STOP: Self = Self::new(0.0, 0.0);

    pub const fn new(linear: f32, angular: f32) -> Self {
        Self { linear, angular }
    }
}

/// The colour classes the blob detector knows how to segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorClass {
    Red,
    Green,
    Blue,
}

impl ColorClass {
    /// Every colour class, in the order the camera callback evaluates them.
    pub const ALL: [ColorClass; 3] = [ColorClass::Red, ColorClass::Green, ColorClass::Blue];

    /// Dense index in `0..3`, handy for per-colour arrays.
    pub const fn index(self) -> usize {
        match self {
            ColorClass::Red => 0,
            ColorClass::Green => 1,
            ColorClass::Blue => 2,
        }
    }
}

impl std::fmt::Display for ColorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorClass::Red => write!(f, "red"),
            ColorClass::Green => write!(f, "green"),
            ColorClass::Blue => write!(f, "blue"),
        }
    }
}

/// Axis-aligned bounding box of a blob in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BlobRect {
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Horizontal centre, `(x + (x + width)) / 2` in whole pixels (floored).
    pub fn center_x(&self) -> f32 {
        ((2 * u64::from(self.x) + u64::from(self.width)) / 2) as f32
    }
}

/// Raw image message as delivered by the camera topic
/// (`sensor_msgs/Image`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMessage {
    pub width: u32,
    pub height: u32,
    /// ROS encoding string, e.g. `"bgr8"`.
    pub encoding: String,
    pub data: Vec<u8>,
}

/// A navigation target for the external `move_base` action server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationGoal {
    pub id: Uuid,
    /// Reference frame of the pose, e.g. `"Seigo/map"`.
    pub frame_id: String,
    pub x: f32,
    pub y: f32,
    /// Heading about +Z in radians.
    pub yaw: f32,
}

impl NavigationGoal {
    pub fn new(frame_id: impl Into<String>, x: f32, y: f32, yaw: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            frame_id: frame_id.into(),
            x,
            y,
            yaw,
        }
    }

    /// Orientation quaternion `[x, y, z, w]` for a pure rotation of `yaw`
    /// about Z.
    pub fn orientation(&self) -> [f32; 4] {
        let half = self.yaw / 2.0;
        [0.0, 0.0, half.sin(), half.cos()]
    }
}

/// Terminal state reported by the navigation action server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationStatus {
    Succeeded,
    Aborted,
    Preempted,
    Rejected,
}

/// Unified event wrapper for the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// e.g., "burgerbot-middleware::ros2/scan"
    pub source: String,
    pub payload: EventPayload,
}

impl Event {
    /// Wrap `payload` in a fresh envelope stamped now.
    pub fn new(source: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
            payload,
        }
    }
}

/// Variants of data that can be routed over the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    /// A `sensor_msgs/LaserScan`, reduced to what the controller uses.
    LaserScan {
        ranges: Vec<f32>,
        angle_min_rad: f32,
        angle_increment_rad: f32,
    },
    /// A camera frame.
    CameraImage(ImageMessage),
    /// A velocity command that was handed to the drive.
    Velocity(VelocityCommand),
    /// Serialised rosbridge frame bound for the outside world.
    RosbridgeFrame(String),
    /// A goal sent to the navigation action server.
    NavigationGoal(NavigationGoal),
    /// The navigation action server's verdict on a goal.
    NavigationResult {
        goal_id: Uuid,
        status: NavigationStatus,
    },
    /// Latest bearing estimate for a colour (`None` = unknown).
    BlobBearing {
        color: ColorClass,
        bearing_rad: Option<f32>,
    },
    Fault {
        component: String,
        code: u32,
        message: String,
    },
}

/// Error type shared by every burgerbot crate.
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum BotError {
    #[error("Hardware Fault on {component}: {details}")]
    HardwareFault { component: String, details: String },

    #[error("Channel Error: {0}")]
    Channel(String),

    #[error("Parsing Error: {0}")]
    Parsing(String),

    #[error("Image Decode Error: {0}")]
    ImageDecode(String),

    #[error("Navigation Unavailable: {0}")]
    NavigationUnavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velocity_command_roundtrip() {
        let cmd = VelocityCommand::new(0.2, -std::f32::consts::FRAC_PI_4);
        let json = serde_json::to_string(&cmd).unwrap();
        let back: VelocityCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(cmd, back);
    }

    #[test]
    fn stop_is_all_zero() {
        assert_eq!(VelocityCommand::STOP, VelocityCommand::default());
    }

    #[test]
    fn color_class_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ColorClass::Green).unwrap(), "\"green\"");
        assert_eq!(ColorClass::Blue.to_string(), "blue");
    }

    #[test]
    fn color_indices_are_dense() {
        let indices: Vec<usize> = ColorClass::ALL.iter().map(|c| c.index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn blob_rect_center_and_area() {
        let rect = BlobRect {
            x: 300,
            y: 220,
            width: 40,
            height: 40,
        };
        assert!((rect.center_x() - 320.0).abs() < f32::EPSILON);
        assert_eq!(rect.area(), 1600);
    }

    #[test]
    fn blob_rect_center_floors_odd_widths() {
        let rect = BlobRect {
            x: 300,
            y: 0,
            width: 41,
            height: 1,
        };
        assert_eq!(rect.center_x(), 320.0);
    }

    #[test]
    fn navigation_goal_orientation_is_unit_quaternion_about_z() {
        let goal = NavigationGoal::new("Seigo/map", 1.0, -0.5, std::f32::consts::FRAC_PI_2);
        let [qx, qy, qz, qw] = goal.orientation();
        assert_eq!(qx, 0.0);
        assert_eq!(qy, 0.0);
        assert!((qz - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((qw - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn event_roundtrip() {
        let event = Event::new(
            "burgerbot-middleware::ros2/scan",
            EventPayload::LaserScan {
                ranges: vec![0.3, 1.2],
                angle_min_rad: 0.0,
                angle_increment_rad: 0.0175,
            },
        );
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(event.id, back.id);
        assert_eq!(event.source, back.source);
        assert!(matches!(back.payload, EventPayload::LaserScan { .. }));
    }

    #[test]
    fn bot_error_display() {
        let err = BotError::HardwareFault {
            component: "left_wheel".to_string(),
            details: "overcurrent".to_string(),
        };
        assert!(err.to_string().contains("left_wheel"));

        let err = BotError::NavigationUnavailable("move_base".to_string());
        assert!(err.to_string().contains("Navigation Unavailable"));
    }
}
