//! `burgerbot-runtime` – the robot's control loops.
//!
//! # Modules
//!
//! - [`state`] – [`BotState`][state::BotState]: latest forward distance,
//!   per-colour bearings and the last annotated frame, plus the
//!   [`StalePolicy`][state::StalePolicy] applied when a colour disappears.
//! - [`reactive`] – [`ObstacleController`][reactive::ObstacleController]:
//!   drive forward while the path is clear, turn in place otherwise.
//! - [`sequencer`] – [`MotionSequencer`][sequencer::MotionSequencer]: plays a
//!   timed [`MotionPlan`][sequencer::MotionPlan] open-loop against a
//!   monotonic clock, with clean cancellation.
//! - [`node`] – [`BotNode`][node::BotNode]: the task that owns `BotState`,
//!   consumes scans and frames from the bus and, in reactive mode, ticks the
//!   controller.
//! - [`field_map`] – [`FieldMap`][field_map::FieldMap]: arena geometry.
//! - [`shutdown`] – awaiting the shared cancellation channel.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: log
//!   formatting and optional OTLP span export.

pub mod field_map;
pub mod node;
pub mod reactive;
pub mod sequencer;
pub mod shutdown;
pub mod state;
pub mod telemetry;

pub use field_map::FieldMap;
pub use node::{BotNode, BotNodeConfig};
pub use reactive::ObstacleController;
pub use sequencer::{MotionPlan, MotionSequencer, MotionStep, SequenceOutcome};
pub use state::{BotState, StalePolicy};
pub use telemetry::{TracerProviderGuard, init_tracing};
