//! [`MotionSequencer`] – open-loop playback of a timed [`MotionPlan`].
//!
//! A plan is a start-up delay, an ordered list of [`MotionStep`]s and an
//! optional hold command that is re-sent at a fixed period until the run is
//! cancelled.
//!
//! Every deadline is measured from the moment [`MotionSequencer::run`]
//! starts, so slow sends never push later steps back.  Each wait races the
//! cancellation channel; on cancellation one stop command is sent.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use burgerbot_middleware::{EventBus, Ros2Adapter};
//! use burgerbot_runtime::sequencer::{MotionPlan, MotionSequencer};
//!
//! # async fn demo() {
//! let bus = Arc::new(EventBus::default());
//! let adapter = Arc::new(Ros2Adapter::new(Arc::clone(&bus)));
//! let (_cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
//! let outcome = MotionSequencer::new(MotionPlan::burger_war(), adapter)
//!     .run(cancel_rx)
//!     .await;
//! println!("{outcome:?}");
//! # }
//! ```

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
use std::sync::Arc;
use std::time::Duration;

use burgerbot_middleware::RobotAdapter;
use burgerbot_types::VelocityCommand;
use tokio::sync::watch;
use tokio::time::{self, Instant};
use tracing::{debug, info};

use crate::shutdown::cancelled;

// ────────────────────────────────────────────────────────────────────────────
// Plan
// ────────────────────────────────────────────────────────────────────────────

/// One command held for a fixed time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionStep {
    pub command: VelocityCommand,
    pub duration: Duration,
}

impl MotionStep {
    pub const fn new(linear: f32, angular: f32, duration_ms: u64) -> Self {
        Self {
            command: VelocityCommand::new(linear, angular),
            duration: Duration::from_millis(duration_ms),
        }
    }
}

/// Command re-sent every `period` after the last step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldCommand {
    pub command: VelocityCommand,
    pub period: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MotionPlan {
    pub startup_delay: Duration,
    pub steps: Vec<MotionStep>,
    pub hold: Option<HoldCommand>,
}

impl MotionPlan {
    /// The arena run: back out of the start zone, sweep the near side, cross
    /// over and finish spinning in place.
    pub fn burger_war() -> Self {
        Self {
            startup_delay: Duration::from_millis(1000),
            steps: vec![
                MotionStep::new(0.2, 0.0, 4500),
                MotionStep::new(-0.2, 0.0, 2000),
                MotionStep::new(0.0, 0.0, 500),
                MotionStep::new(0.0, FRAC_PI_4, 2000),
                MotionStep::new(0.2, 0.0, 2000),
                MotionStep::new(0.0, 0.0, 500),
                MotionStep::new(0.0, FRAC_PI_4, 9300),
                MotionStep::new(0.0, 0.0, 500),
                MotionStep::new(-0.2, 0.0, 4000),
                // Not quite π/2.
                MotionStep::new(0.0, 3.1415 / 2.0, 4000),
                MotionStep::new(0.2, 0.0, 2000),
                MotionStep::new(0.0, -FRAC_PI_4, 900),
                MotionStep::new(0.2, 0.0, 2000),
                MotionStep::new(0.0, FRAC_PI_4, 9000),
                MotionStep::new(0.2, 0.0, 2500),
            ],
            hold: Some(HoldCommand {
                command: VelocityCommand::new(0.0, FRAC_PI_2),
                period: Duration::from_millis(1000),
            }),
        }
    }

    /// `(offset from start, command)` for every step, without waiting.
    pub fn schedule(&self) -> Vec<(Duration, VelocityCommand)> {
        let mut offset = self.startup_delay;
        self.steps
            .iter()
            .map(|step| {
                let at = offset;
                offset += step.duration;
                (at, step.command)
            })
            .collect()
    }

    /// Offset at which the last step ends and the hold (if any) begins.
    pub fn steps_end(&self) -> Duration {
        self.startup_delay + self.steps.iter().map(|s| s.duration).sum::<Duration>()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sequencer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceOutcome {
    /// Every step was played and the plan has no hold command.
    Completed,
    /// Cancelled after `steps_sent` commands (hold repeats included); a stop
    /// command followed.
    Cancelled { steps_sent: usize },
}

pub struct MotionSequencer {
    plan: MotionPlan,
    adapter: Arc<dyn RobotAdapter>,
}

impl MotionSequencer {
    pub fn new(plan: MotionPlan, adapter: Arc<dyn RobotAdapter>) -> Self {
        Self { plan, adapter }
    }

    pub fn plan(&self) -> &MotionPlan {
        &self.plan
    }

    /// Play the plan.  Returns when it completes or when `cancel` becomes
    /// `true`.  A dropped sender counts as cancellation.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) -> SequenceOutcome {
        let start = Instant::now();
        let mut offset = self.plan.startup_delay;
        let mut steps_sent = 0;

        info!(
            steps = self.plan.steps.len(),
            startup_delay_ms = offset.as_millis() as u64,
            "motion plan started"
        );
        if sleep_or_cancel(start + offset, &mut cancel).await {
            return self.stop(steps_sent).await;
        }

        for (i, step) in self.plan.steps.iter().enumerate() {
            self.send(step.command).await;
            steps_sent += 1;
            info!(
                step = i + 1,
                linear = step.command.linear,
                angular = step.command.angular,
                duration_ms = step.duration.as_millis() as u64,
                "motion step"
            );
            offset += step.duration;
            if sleep_or_cancel(start + offset, &mut cancel).await {
                return self.stop(steps_sent).await;
            }
        }

        let Some(hold) = self.plan.hold else {
            info!(steps_sent, "motion plan completed");
            return SequenceOutcome::Completed;
        };

        info!(
            linear = hold.command.linear,
            angular = hold.command.angular,
            "holding final command"
        );
        loop {
            self.send(hold.command).await;
            steps_sent += 1;
            offset += hold.period;
            if sleep_or_cancel(start + offset, &mut cancel).await {
                return self.stop(steps_sent).await;
            }
        }
    }

    async fn send(&self, command: VelocityCommand) {
        if let Err(e) = self.adapter.send_velocity(command).await {
            debug!(error = %e, "velocity command not delivered");
        }
    }

    async fn stop(&self, steps_sent: usize) -> SequenceOutcome {
        self.send(VelocityCommand::STOP).await;
        info!(steps_sent, "motion plan cancelled, robot stopped");
        SequenceOutcome::Cancelled { steps_sent }
    }
}

/// Sleep until `deadline`.  Returns `true` if cancelled first.
async fn sleep_or_cancel(deadline: Instant, cancel: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = time::sleep_until(deadline) => false,
        _ = cancelled(cancel) => true,
    }
}
