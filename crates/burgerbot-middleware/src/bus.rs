//! Typed, topic-based publish/subscribe event bus.
//!
//! Uses [`tokio::sync::broadcast`] channels under the hood so that every
//! subscriber receives every message without any single subscriber blocking
//! the others.  A subscriber that falls behind loses the oldest messages;
//! staleness is acceptable for everything routed here.
//!
//! # Topics
//!
//! | Topic | Typical traffic |
//! |---|---|
//! | [`Topic::Scan`] | Laser scans from `/scan` |
//! | [`Topic::Camera`] | Raw frames from `/image_raw` |
//! | [`Topic::Commands`] | Outbound rosbridge frames (`/cmd_vel`, `move_base` goals) |
//! | [`Topic::Navigation`] | Navigation action results |
//! | [`Topic::Perception`] | Per-colour bearing estimates |
//! | [`Topic::SystemAlerts`] | Faults and shutdown notices |

use burgerbot_types::{BotError, Event};
use tokio::sync::broadcast;

/// Default channel capacity (number of buffered events before old ones are
/// dropped for slow subscribers).
const DEFAULT_CAPACITY: usize = 256;

/// Enumeration of all routing topics on the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Laser range scans.
    Scan,
    /// Camera frames.
    Camera,
    /// Outbound commands for the robot and its navigation stack.
    Commands,
    /// Results reported by the navigation action server.
    Navigation,
    /// Bearing estimates produced by the blob detector.
    Perception,
    /// Faults, shutdown notices.
    SystemAlerts,
}

/// Shared event bus. Clone it cheaply – all clones share the same underlying
/// broadcast channels.
#[derive(Clone, Debug)]
pub struct EventBus {
    scan: broadcast::Sender<Event>,
    camera: broadcast::Sender<Event>,
    commands: broadcast::Sender<Event>,
    navigation: broadcast::Sender<Event>,
    perception: broadcast::Sender<Event>,
    system_alerts: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new bus with the given channel capacity.
    ///
    /// The `capacity` is applied to every topic channel independently.
    pub fn new(capacity: usize) -> Self {
        let (scan, _) = broadcast::channel(capacity);
        let (camera, _) = broadcast::channel(capacity);
        let (commands, _) = broadcast::channel(capacity);
        let (navigation, _) = broadcast::channel(capacity);
        let (perception, _) = broadcast::channel(capacity);
        let (system_alerts, _) = broadcast::channel(capacity);
        Self {
            scan,
            camera,
            commands,
            navigation,
            perception,
            system_alerts,
        }
    }

    /// Publish `event` to the given [`Topic`] channel.
    ///
    /// Returns the number of active receivers that were handed the event, or
    /// [`BotError::Channel`] when nobody is listening on the topic.
    pub fn publish_to(&self, topic: Topic, event: Event) -> Result<usize, BotError> {
        self.topic_sender(topic)
            .send(event)
            .map_err(|_| BotError::Channel(format!("No subscribers for topic {topic:?}")))
    }

    /// Subscribe to a specific [`Topic`] channel.
    pub fn subscribe_to(&self, topic: Topic) -> TopicReceiver {
        TopicReceiver {
            topic,
            receiver: self.topic_sender(topic).subscribe(),
        }
    }

    /// Number of live subscribers on `topic`.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.topic_sender(topic).receiver_count()
    }

    fn topic_sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Scan => &self.scan,
            Topic::Camera => &self.camera,
            Topic::Commands => &self.commands,
            Topic::Navigation => &self.navigation,
            Topic::Perception => &self.perception,
            Topic::SystemAlerts => &self.system_alerts,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// An async receiver bound to a single [`Topic`] channel.
///
/// Obtained via [`EventBus::subscribe_to`].
pub struct TopicReceiver {
    topic: Topic,
    receiver: broadcast::Receiver<Event>,
}

impl TopicReceiver {
    /// Wait for the next event on this topic.
    ///
    /// Returns:
    /// * `Ok(event)` – a successfully received event.
    /// * `Err(broadcast::error::RecvError::Lagged(n))` – the subscriber fell
    ///   behind and `n` messages were dropped.  The caller decides whether to
    ///   continue or abort.
    /// * `Err(broadcast::error::RecvError::Closed)` – the bus has shut down.
    pub async fn recv(&mut self) -> Result<Event, broadcast::error::RecvError> {
        self.receiver.recv().await
    }

    /// Take the next queued event without waiting.
    pub fn try_recv(&mut self) -> Result<Event, broadcast::error::TryRecvError> {
        self.receiver.try_recv()
    }

    /// The [`Topic`] this receiver is bound to.
    pub fn topic(&self) -> Topic {
        self.topic
    }
}
