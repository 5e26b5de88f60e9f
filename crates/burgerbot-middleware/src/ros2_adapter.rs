//! ROS 2 adapter for the arena robot.
//!
//! [`Ros2Adapter`] bridges between the internal [`EventBus`] and the ROS 2
//! side of the world:
//!
//! * **Inbound (Perception)** – `/scan` laser scans and `/image_raw` camera
//!   frames are validated and published on [`Topic::Scan`] and
//!   [`Topic::Camera`].
//!
//! * **Inbound (Navigation)** – `move_base` results are published on
//!   [`Topic::Navigation`] so a waiting
//!   [`NavigationClient`][crate::navigation::NavigationClient] can pick them
//!   up.
//!
//! * **Outbound** – velocity commands become `geometry_msgs/msg/Twist`
//!   rosbridge frames for `/cmd_vel`; navigation goals become
//!   `move_base_msgs/MoveBaseGoal` frames.  Both are published on
//!   [`Topic::Commands`] for the transport to forward.

use std::sync::Arc;

use async_trait::async_trait;
use burgerbot_types::{
    BotError, Event, EventPayload, ImageMessage, NavigationGoal, NavigationStatus,
    VelocityCommand,
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::adapter::RobotAdapter;
use crate::bus::{EventBus, Topic};

/// Topic the laser scanner publishes on.
pub const SCAN_TOPIC: &str = "/red_bot/scan";
/// Topic the camera publishes on.
pub const IMAGE_TOPIC: &str = "/red_bot/image_raw";
/// Topic the drive listens on.
pub const CMD_VEL_TOPIC: &str = "/cmd_vel";
/// Goal topic of the navigation action server.
pub const MOVE_BASE_GOAL_TOPIC: &str = "/move_base/goal";

/// Maximum number of LiDAR range readings accepted in a single scan.
///
/// Payloads with more entries than this are rejected to prevent memory
/// exhaustion from malformed scan messages.
pub const MAX_LIDAR_RANGES: usize = 4096;

/// Maximum byte length of a single camera frame.
pub const MAX_IMAGE_BYTES: usize = 16 * 1024 * 1024; // 16 MiB

/// Build the rosbridge `/cmd_vel` frame for `command`.
pub fn twist_frame(command: VelocityCommand) -> Value {
    json!({
        "op": "publish",
        "topic": CMD_VEL_TOPIC,
        "msg": {
            "linear":  { "x": command.linear, "y": 0.0, "z": 0.0 },
            "angular": { "x": 0.0, "y": 0.0, "z": command.angular }
        }
    })
}

/// Build the rosbridge `move_base` goal frame for `goal`.
pub fn move_base_goal_frame(goal: &NavigationGoal) -> Value {
    let [qx, qy, qz, qw] = goal.orientation();
    json!({
        "op": "publish",
        "topic": MOVE_BASE_GOAL_TOPIC,
        "msg": {
            "goal_id": { "id": goal.id.to_string() },
            "goal": {
                "target_pose": {
                    "header": { "frame_id": goal.frame_id },
                    "pose": {
                        "position": { "x": goal.x, "y": goal.y, "z": 0.0 },
                        "orientation": { "x": qx, "y": qy, "z": qz, "w": qw }
                    }
                }
            }
        }
    })
}

/// Adapter that translates controller commands into ROS 2 messages and
/// ingests the robot's sensor data.
pub struct Ros2Adapter {
    bus: Arc<EventBus>,
}

impl Ros2Adapter {
    /// Create a new [`Ros2Adapter`] backed by the given [`EventBus`].
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }

    /// Ingest a `/scan` laser-scan message and publish it on
    /// [`Topic::Scan`].
    ///
    /// `ranges` are the measured distances in metres; `angle_min_rad` is the
    /// bearing of the first reading and `angle_increment_rad` the step
    /// between consecutive readings.
    pub fn ingest_laser_scan(
        &self,
        ranges: &[f32],
        angle_min_rad: f32,
        angle_increment_rad: f32,
    ) -> Result<usize, BotError> {
        if ranges.len() > MAX_LIDAR_RANGES {
            return Err(BotError::Parsing(format!(
                "laser scan has {} range readings, exceeding the limit of {}",
                ranges.len(),
                MAX_LIDAR_RANGES,
            )));
        }
        let event = Event::new(
            format!("burgerbot-middleware::ros2{SCAN_TOPIC}"),
            EventPayload::LaserScan {
                ranges: ranges.to_vec(),
                angle_min_rad,
                angle_increment_rad,
            },
        );
        self.bus.publish_to(Topic::Scan, event)
    }

    /// Ingest an `/image_raw` frame and publish it on [`Topic::Camera`].
    ///
    /// Only the size is checked here; decoding (and rejecting unsupported
    /// encodings) is left to the consumer.
    pub fn ingest_image(&self, image: ImageMessage) -> Result<usize, BotError> {
        if image.data.len() > MAX_IMAGE_BYTES {
            return Err(BotError::Parsing(format!(
                "image frame is {} bytes, exceeding the limit of {}",
                image.data.len(),
                MAX_IMAGE_BYTES,
            )));
        }
        let event = Event::new(
            format!("burgerbot-middleware::ros2{IMAGE_TOPIC}"),
            EventPayload::CameraImage(image),
        );
        self.bus.publish_to(Topic::Camera, event)
    }

    /// Ingest a `move_base` result for `goal_id` and publish it on
    /// [`Topic::Navigation`].
    pub fn ingest_navigation_result(
        &self,
        goal_id: Uuid,
        status: NavigationStatus,
    ) -> Result<usize, BotError> {
        let event = Event::new(
            "burgerbot-middleware::ros2/move_base/result",
            EventPayload::NavigationResult { goal_id, status },
        );
        self.bus.publish_to(Topic::Navigation, event)
    }
}

#[async_trait]
impl RobotAdapter for Ros2Adapter {
    async fn send_velocity(&self, command: VelocityCommand) -> Result<(), BotError> {
        let event = Event::new(
            format!("burgerbot-middleware::ros2{CMD_VEL_TOPIC}"),
            EventPayload::RosbridgeFrame(twist_frame(command).to_string()),
        );
        self.bus.publish_to(Topic::Commands, event).map(|_| ())
    }

    async fn send_goal(&self, goal: &NavigationGoal) -> Result<(), BotError> {
        let event = Event::new(
            format!("burgerbot-middleware::ros2{MOVE_BASE_GOAL_TOPIC}"),
            EventPayload::RosbridgeFrame(move_base_goal_frame(goal).to_string()),
        );
        self.bus.publish_to(Topic::Commands, event).map(|_| ())
    }
}
