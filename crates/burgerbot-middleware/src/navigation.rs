//! [`NavigationClient`] – one-shot goal requests to the navigation action
//! server.
//!
//! The goal is handed to a [`RobotAdapter`]; the verdict comes back through
//! [`Topic::Navigation`] (see
//! [`Ros2Adapter::ingest_navigation_result`][crate::ros2_adapter::Ros2Adapter::ingest_navigation_result]).
//! If no verdict arrives within the configured timeout the action server is
//! considered unavailable.

use std::sync::Arc;
use std::time::Duration;

use burgerbot_types::{BotError, EventPayload, NavigationGoal, NavigationStatus};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::adapter::RobotAdapter;
use crate::bus::{EventBus, Topic};

/// Sends navigation goals and waits for their results.
pub struct NavigationClient {
    adapter: Arc<dyn RobotAdapter>,
    bus: Arc<EventBus>,
    timeout: Duration,
}

impl NavigationClient {
    pub fn new(adapter: Arc<dyn RobotAdapter>, bus: Arc<EventBus>, timeout: Duration) -> Self {
        Self {
            adapter,
            bus,
            timeout,
        }
    }

    /// Send `goal` and wait for the action server's verdict.
    ///
    /// # Errors
    ///
    /// * [`BotError::NavigationUnavailable`] if no result for this goal
    ///   arrives within the timeout, or the result channel closes.
    /// * Whatever the adapter returns if the goal cannot be sent.
    pub async fn send_goal(&self, goal: NavigationGoal) -> Result<NavigationStatus, BotError> {
        // Subscribe first so a fast result cannot slip past us.
        let mut results = self.bus.subscribe_to(Topic::Navigation);
        self.adapter.send_goal(&goal).await?;
        info!(goal_id = %goal.id, x = goal.x, y = goal.y, yaw = goal.yaw, "navigation goal sent");

        let wait = async {
            loop {
                match results.recv().await {
                    Ok(event) => {
                        if let EventPayload::NavigationResult { goal_id, status } = event.payload
                            && goal_id == goal.id
                        {
                            return Ok(status);
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        warn!(lagged_by = n, "navigation result receiver lagged");
                    }
                    Err(RecvError::Closed) => {
                        return Err(BotError::NavigationUnavailable(
                            "navigation result channel closed".to_string(),
                        ));
                    }
                }
            }
        };

        match tokio::time::timeout(self.timeout, wait).await {
            Ok(result) => result,
            Err(_) => Err(BotError::NavigationUnavailable(format!(
                "no result for goal {} within {:?}",
                goal.id, self.timeout
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ros2_adapter::Ros2Adapter;
    use uuid::Uuid;

    fn make_client(timeout: Duration) -> (Arc<EventBus>, Arc<Ros2Adapter>, NavigationClient) {
        let bus = Arc::new(EventBus::default());
        let adapter = Arc::new(Ros2Adapter::new(Arc::clone(&bus)));
        let client = NavigationClient::new(adapter.clone(), Arc::clone(&bus), timeout);
        (bus, adapter, client)
    }

    #[tokio::test]
    async fn returns_status_of_matching_result() {
        let (bus, adapter, client) = make_client(Duration::from_secs(5));
        let mut outbox = bus.subscribe_to(Topic::Commands);
        let goal = NavigationGoal::new("Seigo/map", 0.5, 0.0, 0.0);
        let goal_id = goal.id;

        let responder = tokio::spawn(async move {
            // Wait for the goal to go out, answer an unrelated goal first.
            outbox.recv().await.unwrap();
            adapter
                .ingest_navigation_result(Uuid::new_v4(), NavigationStatus::Aborted)
                .unwrap();
            adapter
                .ingest_navigation_result(goal_id, NavigationStatus::Succeeded)
                .unwrap();
        });

        let status = client.send_goal(goal).await.unwrap();
        assert_eq!(status, NavigationStatus::Succeeded);
        responder.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_when_server_never_answers() {
        let (bus, _adapter, client) = make_client(Duration::from_secs(3));
        let _outbox = bus.subscribe_to(Topic::Commands);

        let result = client
            .send_goal(NavigationGoal::new("Seigo/map", 0.0, 0.0, 0.0))
            .await;
        assert!(
            matches!(result, Err(BotError::NavigationUnavailable(_))),
            "expected NavigationUnavailable, got {result:?}"
        );
    }

    #[tokio::test]
    async fn fails_fast_when_goal_cannot_be_sent() {
        // No outbox subscriber: the adapter reports a channel error.
        let (_bus, _adapter, client) = make_client(Duration::from_secs(60));
        let result = client
            .send_goal(NavigationGoal::new("Seigo/map", 0.0, 0.0, 0.0))
            .await;
        assert!(matches!(result, Err(BotError::Channel(_))));
    }
}
