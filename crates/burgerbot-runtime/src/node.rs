//! [`BotNode`] – the single task that owns [`BotState`].
//!
//! The node subscribes to [`Topic::Scan`] and [`Topic::Camera`] and folds
//! each message into its state.  Camera frames go through the bearing
//! estimator; the resulting per-colour bearings are published on
//! [`Topic::Perception`].  With reactive control enabled the same loop also
//! ticks the [`ObstacleController`] once per control period and sends the
//! command to the drive.
//!
//! ```text
//!   Topic::Scan ──┐
//!                 ├─► BotNode ──► BotState ──► ObstacleController ──► RobotAdapter
//!   Topic::Camera ┘       │
//!                         └─► BearingEstimator ──► Topic::Perception
//! ```

use std::sync::Arc;
use std::time::Duration;

use burgerbot_hal::CameraFrame;
use burgerbot_middleware::{EventBus, RobotAdapter, Topic, TopicReceiver};
use burgerbot_perception::BearingEstimator;
use burgerbot_perception::overlay::draw_detection;
use burgerbot_types::{ColorClass, Event, EventPayload, ImageMessage, VelocityCommand};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::reactive::ObstacleController;
use crate::shutdown::cancelled;
use crate::state::{BotState, StalePolicy};

const SOURCE: &str = "burgerbot-runtime::node";

/// [`EventPayload::Fault`] code for a camera frame that could not be decoded.
pub const FAULT_UNDECODABLE_FRAME: u32 = 1;

/// Shortest control period the node will tick at.
pub const MIN_CONTROL_PERIOD: Duration = Duration::from_millis(1);

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct BotNodeConfig {
    /// Whether the node drives the robot with the reactive law.
    pub reactive: bool,
    /// Time between reactive control decisions, at least
    /// [`MIN_CONTROL_PERIOD`].
    pub control_period: Duration,
    pub controller: ObstacleController,
    pub estimator: BearingEstimator,
    pub stale_policy: StalePolicy,
}

impl Default for BotNodeConfig {
    fn default() -> Self {
        Self {
            reactive: true,
            control_period: Duration::from_secs(1),
            controller: ObstacleController::default(),
            estimator: BearingEstimator::default(),
            stale_policy: StalePolicy::default(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// BotNode
// ────────────────────────────────────────────────────────────────────────────

pub struct BotNode {
    bus: Arc<EventBus>,
    adapter: Arc<dyn RobotAdapter>,
    config: BotNodeConfig,
    state: BotState,
}

impl BotNode {
    pub fn new(bus: Arc<EventBus>, adapter: Arc<dyn RobotAdapter>, config: BotNodeConfig) -> Self {
        Self {
            bus,
            adapter,
            state: BotState::new(config.stale_policy),
            config,
        }
    }

    pub fn state(&self) -> &BotState {
        &self.state
    }

    /// Route one bus event to the matching callback.  Other payloads are
    /// ignored.
    pub fn handle_event(&mut self, event: Event) {
        match event.payload {
            EventPayload::LaserScan { ranges, .. } => self.on_scan(&ranges),
            EventPayload::CameraImage(image) => self.on_image(image),
            _ => {}
        }
    }

    pub fn on_scan(&mut self, ranges: &[f32]) {
        if self.state.on_scan(ranges) {
            debug!(front_distance = self.state.front_distance(), "scan");
        }
    }

    /// Estimate all three bearings from `image`.  Frames that cannot be
    /// decoded are logged and dropped.
    pub fn on_image(&mut self, image: ImageMessage) {
        let decoded = CameraFrame::from_message(image).and_then(|f| f.to_rgb_image());
        let mut rgb = match decoded {
            Ok(rgb) => rgb,
            Err(e) => {
                warn!(error = %e, "dropping undecodable camera frame");
                let alert = Event::new(
                    SOURCE,
                    EventPayload::Fault {
                        component: "camera".to_string(),
                        code: FAULT_UNDECODABLE_FRAME,
                        message: e.to_string(),
                    },
                );
                if let Err(e) = self.bus.publish_to(Topic::SystemAlerts, alert) {
                    debug!(error = %e, "fault not published");
                }
                return;
            }
        };

        let detections = self.config.estimator.estimate_all(&rgb);
        self.state.on_detections(&detections);

        for detection in detections.iter().flatten() {
            draw_detection(&mut rgb, detection);
        }
        self.state.set_last_frame(rgb);

        for color in ColorClass::ALL {
            let bearing_rad = self.state.bearing(color);
            debug!(%color, bearing_rad = ?bearing_rad, "bearing");
            let event = Event::new(SOURCE, EventPayload::BlobBearing { color, bearing_rad });
            if let Err(e) = self.bus.publish_to(Topic::Perception, event) {
                debug!(error = %e, "bearing not published");
            }
        }
    }

    /// Evaluate the reactive law on the current distance and send the result.
    pub async fn control_tick(&mut self) -> VelocityCommand {
        let distance = self.state.front_distance();
        let command = self.config.controller.command(distance);
        debug!(
            distance,
            linear = command.linear,
            angular = command.angular,
            "reactive decision"
        );
        if let Err(e) = self.adapter.send_velocity(command).await {
            debug!(error = %e, "velocity command not delivered");
        }
        command
    }

    /// Run until `cancel` becomes `true` (or its sender is dropped), then
    /// hand back the final state.  In reactive mode a stop command is sent on
    /// the way out.
    pub async fn run(mut self, mut cancel: watch::Receiver<bool>) -> BotState {
        let mut scans = self.bus.subscribe_to(Topic::Scan);
        let mut frames = self.bus.subscribe_to(Topic::Camera);
        let period = self.config.control_period.max(MIN_CONTROL_PERIOD);
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            reactive = self.config.reactive,
            control_period_ms = period.as_millis() as u64,
            stale_policy = ?self.config.stale_policy,
            "bot node started"
        );

        loop {
            tokio::select! {
                _ = cancelled(&mut cancel) => break,
                event = scans.recv() => {
                    if !self.accept(&scans, event) {
                        break;
                    }
                }
                event = frames.recv() => {
                    if !self.accept(&frames, event) {
                        break;
                    }
                }
                _ = ticker.tick(), if self.config.reactive => {
                    self.control_tick().await;
                }
            }
        }

        if self.config.reactive
            && let Err(e) = self.adapter.send_velocity(VelocityCommand::STOP).await
        {
            debug!(error = %e, "stop command not delivered");
        }
        info!("bot node stopped");
        self.state
    }

    /// Handle one receive result.  Returns `false` once the topic is closed.
    fn accept(&mut self, receiver: &TopicReceiver, event: Result<Event, RecvError>) -> bool {
        match event {
            Ok(event) => {
                self.handle_event(event);
                true
            }
            Err(RecvError::Lagged(n)) => {
                warn!(topic = ?receiver.topic(), lagged_by = n, "bot node lagged, messages dropped");
                true
            }
            Err(RecvError::Closed) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use burgerbot_middleware::Ros2Adapter;
    use burgerbot_types::{BotError, NavigationGoal};

    #[derive(Default)]
    struct RecordingAdapter {
        sent: Mutex<Vec<VelocityCommand>>,
    }

    #[async_trait]
    impl RobotAdapter for RecordingAdapter {
        async fn send_velocity(&self, command: VelocityCommand) -> Result<(), BotError> {
            self.sent.lock().unwrap().push(command);
            Ok(())
        }

        async fn send_goal(&self, _goal: &NavigationGoal) -> Result<(), BotError> {
            Ok(())
        }
    }

    /// 640×480 bgr8 frame, grey, with one pure-colour square.
    fn frame_with_square(bgr: [u8; 3], x0: u32) -> ImageMessage {
        let (w, h) = (640u32, 480u32);
        let mut data = [128u8, 128, 128].repeat((w * h) as usize);
        for y in 220..260 {
            for x in x0..x0 + 40 {
                let i = ((y * w + x) * 3) as usize;
                data[i..i + 3].copy_from_slice(&bgr);
            }
        }
        ImageMessage {
            width: w,
            height: h,
            encoding: "bgr8".to_string(),
            data,
        }
    }

    fn node(config: BotNodeConfig) -> (Arc<EventBus>, Arc<RecordingAdapter>, BotNode) {
        let bus = Arc::new(EventBus::default());
        let adapter = Arc::new(RecordingAdapter::default());
        let node = BotNode::new(Arc::clone(&bus), adapter.clone(), config);
        (bus, adapter, node)
    }

    #[tokio::test]
    async fn control_tick_follows_latest_scan() {
        let (_bus, adapter, mut node) = node(BotNodeConfig::default());

        // Nothing seen yet: sentinel distance, drive forward.
        assert_eq!(node.control_tick().await, VelocityCommand::new(0.2, 0.0));
        node.on_scan(&[0.3]);
        assert_eq!(node.control_tick().await, VelocityCommand::new(0.0, FRAC_PI_4));

        assert_eq!(adapter.sent.lock().unwrap().len(), 2);
    }

    #[test]
    fn image_updates_bearings_and_publishes_them() {
        let (bus, _adapter, mut node) = node(BotNodeConfig::default());
        let mut perception = bus.subscribe_to(Topic::Perception);

        // Blue in BGR order, centred.
        node.on_image(frame_with_square([255, 0, 0], 300));
        let blue = node.state().bearing(ColorClass::Blue).unwrap();
        assert!(blue.abs() < 1e-6);
        assert!(node.state().bearing(ColorClass::Red).is_none());
        assert!(node.state().last_frame().is_some());

        let mut published = Vec::new();
        while let Ok(event) = perception.try_recv() {
            if let EventPayload::BlobBearing { color, bearing_rad } = event.payload {
                published.push((color, bearing_rad.is_some()));
            }
        }
        assert_eq!(
            published,
            vec![
                (ColorClass::Red, false),
                (ColorClass::Green, false),
                (ColorClass::Blue, true)
            ]
        );
    }

    #[test]
    fn stale_policy_applies_to_empty_frames() {
        for (policy, expect_kept) in [(StalePolicy::HoldLast, true), (StalePolicy::Invalidate, false)] {
            let (_bus, _adapter, mut node) = node(BotNodeConfig {
                stale_policy: policy,
                ..BotNodeConfig::default()
            });
            // Green, right of centre.
            node.on_image(frame_with_square([0, 255, 0], 500));
            assert!(node.state().bearing(ColorClass::Green).unwrap() > 0.0);

            node.on_image(frame_with_square([128, 128, 128], 0));
            assert_eq!(
                node.state().bearing(ColorClass::Green).is_some(),
                expect_kept,
                "{policy:?}"
            );
        }
    }

    #[test]
    fn overlay_is_drawn_on_stored_frame() {
        let (_bus, _adapter, mut node) = node(BotNodeConfig::default());
        node.on_image(frame_with_square([0, 255, 0], 300));
        let frame = node.state().last_frame().unwrap();
        // Top-left corner of the box is outlined in red.
        assert_eq!(frame.get_pixel(300, 220).0, [255, 0, 0]);
        // Interior keeps the blob colour.
        assert_eq!(frame.get_pixel(320, 240).0, [0, 255, 0]);
    }

    #[test]
    fn undecodable_frame_is_dropped_and_reported() {
        let (bus, _adapter, mut node) = node(BotNodeConfig::default());
        let mut alerts = bus.subscribe_to(Topic::SystemAlerts);
        node.on_image(ImageMessage {
            width: 10,
            height: 10,
            encoding: "bgr8".to_string(),
            data: vec![0; 7],
        });
        assert!(node.state().last_frame().is_none());
        let alert = alerts.try_recv().unwrap();
        assert!(matches!(
            alert.payload,
            EventPayload::Fault { code: FAULT_UNDECODABLE_FRAME, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn run_consumes_bus_and_stops_on_cancel() {
        let bus = Arc::new(EventBus::default());
        let ros = Arc::new(Ros2Adapter::new(Arc::clone(&bus)));
        let mut outbox = bus.subscribe_to(Topic::Commands);
        let config = BotNodeConfig {
            control_period: Duration::from_millis(100),
            ..BotNodeConfig::default()
        };
        let node = BotNode::new(Arc::clone(&bus), ros.clone(), config);

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let task = tokio::spawn(node.run(cancel_rx));

        // Wait until the node has subscribed before feeding it.
        while bus.subscriber_count(Topic::Scan) == 0 {
            tokio::task::yield_now().await;
        }
        ros.ingest_laser_scan(&[0.2, 1.0], 0.0, 0.1).unwrap();
        time::sleep(Duration::from_millis(250)).await;
        cancel_tx.send(true).unwrap();
        let state = task.await.unwrap();

        assert_eq!(state.front_distance(), 0.2);
        let mut frames = Vec::new();
        while let Ok(event) = outbox.try_recv() {
            if let EventPayload::RosbridgeFrame(frame) = event.payload {
                frames.push(frame);
            }
        }
        // At least one turn command, then a final stop.
        assert!(frames.len() >= 2);
        let last: serde_json::Value = serde_json::from_str(frames.last().unwrap()).unwrap();
        assert_eq!(last["msg"]["linear"]["x"], 0.0);
        assert_eq!(last["msg"]["angular"]["z"], 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_control_period_is_clamped() {
        let bus = Arc::new(EventBus::default());
        let adapter = Arc::new(RecordingAdapter::default());
        let config = BotNodeConfig {
            control_period: Duration::ZERO,
            ..BotNodeConfig::default()
        };
        let node = BotNode::new(Arc::clone(&bus), adapter.clone(), config);

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let task = tokio::spawn(node.run(cancel_rx));
        time::sleep(Duration::from_millis(5)).await;
        cancel_tx.send(true).unwrap();
        task.await.unwrap();

        let sent = adapter.sent.lock().unwrap();
        assert!(sent.len() >= 2);
        assert_eq!(sent.last(), Some(&VelocityCommand::STOP));
    }
}
