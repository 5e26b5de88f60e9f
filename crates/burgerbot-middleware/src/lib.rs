//! `burgerbot-middleware` – message plumbing between the robot and the
//! controller.
//!
//! # Modules
//!
//! - [`bus`] – typed, topic-based publish/subscribe event bus built on Tokio
//!   broadcast channels.
//! - [`adapter`] – the [`RobotAdapter`] trait every outbound transport
//!   implements.
//! - [`ros2_adapter`] – ingests `/scan`, `/image_raw` and navigation results;
//!   emits `/cmd_vel` Twists and `move_base` goals as rosbridge JSON.
//! - [`navigation`] – [`NavigationClient`]: send one goal and wait for the
//!   action server's verdict.

pub mod adapter;
pub mod bus;
pub mod navigation;
pub mod ros2_adapter;

pub use adapter::RobotAdapter;
pub use bus::{EventBus, Topic, TopicReceiver};
pub use navigation::NavigationClient;
pub use ros2_adapter::Ros2Adapter;
