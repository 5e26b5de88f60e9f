//! The adapter seam.
//!
//! The controller never speaks ROS directly.  It hands commands to a
//! [`RobotAdapter`], which translates them into the protocol of whatever is
//! on the other side (rosbridge JSON for
//! [`Ros2Adapter`][crate::ros2_adapter::Ros2Adapter], a recording stub in
//! tests).

use async_trait::async_trait;
use burgerbot_types::{BotError, NavigationGoal, VelocityCommand};

/// Outbound half of a robot transport.
#[async_trait]
pub trait RobotAdapter: Send + Sync {
    /// Publish a velocity command to the drive (`/cmd_vel`).
    async fn send_velocity(&self, command: VelocityCommand) -> Result<(), BotError>;

    /// Hand a goal to the navigation action server.  Returns once the goal
    /// has been sent; the result arrives asynchronously.
    async fn send_goal(&self, goal: &NavigationGoal) -> Result<(), BotError>;
}
