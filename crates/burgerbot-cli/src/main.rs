//! `burgerbot` – command-line entry point.
//!
//! 1. Initialises logging (and OTLP export when configured).
//! 2. Loads `~/.burgerbot/config.toml`, writing the defaults on first run.
//! 3. Wires the event bus, the ROS 2 adapter, a simulated sensor feed and the
//!    [`BotNode`], then runs the configured mode:
//!    * `reactive` – the node drives from the forward scan distance;
//!    * `sequence` – the built-in timed motion plan plays open-loop;
//!    * `goal` – one navigation goal; no answer in time is fatal.
//! 4. Ctrl-C cancels every loop; the robot is sent a stop command.

mod config;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use burgerbot_hal::sim::{SimCamera, SimRangeSensor};
use burgerbot_hal::{Camera, RangeSensor};
use burgerbot_middleware::{EventBus, NavigationClient, Ros2Adapter, Topic, TopicReceiver};
use burgerbot_perception::BearingEstimator;
use burgerbot_runtime::shutdown::cancelled;
use burgerbot_runtime::{
    BotNode, BotNodeConfig, FieldMap, MotionPlan, MotionSequencer, ObstacleController,
};
use burgerbot_types::{BlobRect, Event, EventPayload, NavigationGoal};

use config::{Config, Mode};

/// Period of the simulated scanner.
const SIM_SCAN_PERIOD: Duration = Duration::from_millis(100);

/// The simulated camera renders a frame every this many scans.
const SIM_FRAMES_EVERY: u64 = 5;

/// [`EventPayload::Fault`] code raised when the navigation goal fails.
const FAULT_NAVIGATION_UNAVAILABLE: u32 = 2;

fn main() -> ExitCode {
    let _telemetry = burgerbot_runtime::init_tracing("burgerbot");

    print_banner();
    let cfg = load_config();
    print_summary(&cfg);

    // ── Shared cancellation ───────────────────────────────────────────────
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let cancel_tx = Arc::new(cancel_tx);

    let ctrlc_tx = Arc::clone(&cancel_tx);
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!(
            "{}",
            "⚠  Ctrl-C received – stopping the robot …".yellow().bold()
        );
        ctrlc_tx.send_replace(true);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; the robot can only be stopped by killing the process");
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to start the async runtime");
            return ExitCode::FAILURE;
        }
    };

    let code = runtime.block_on(run(cfg, cancel_tx, cancel_rx));
    println!("{}", "  ✓ burgerbot stopped.".green());
    code
}

// ─────────────────────────────────────────────────────────────────────────────
// Wiring
// ─────────────────────────────────────────────────────────────────────────────

async fn run(
    cfg: Config,
    cancel_tx: Arc<watch::Sender<bool>>,
    cancel_rx: watch::Receiver<bool>,
) -> ExitCode {
    let bus = Arc::new(EventBus::default());
    let ros = Arc::new(Ros2Adapter::new(Arc::clone(&bus)));

    let outbox = tokio::spawn(log_topic(bus.subscribe_to(Topic::Commands)));
    let alerts = tokio::spawn(log_topic(bus.subscribe_to(Topic::SystemAlerts)));

    let node_config = BotNodeConfig {
        reactive: cfg.mode == Mode::Reactive,
        control_period: Duration::from_millis(cfg.control_period_ms),
        controller: ObstacleController {
            clearance_m: cfg.clearance_m,
            cruise_speed: cfg.cruise_speed,
            turn_rate: cfg.turn_rate,
        },
        estimator: BearingEstimator::new(cfg.deg_per_pixel),
        stale_policy: cfg.stale_policy,
    };
    let node = BotNode::new(Arc::clone(&bus), ros.clone(), node_config);
    let node_task = tokio::spawn(node.run(cancel_rx.clone()));
    let feed_task = tokio::spawn(sim_feed(
        Arc::clone(&ros),
        cfg.sim_distances.clone(),
        cancel_rx.clone(),
    ));

    info!(mode = %cfg.mode, bot = %cfg.bot_name, "burgerbot running");
    let code = match cfg.mode {
        Mode::Reactive => {
            let mut cancel = cancel_rx.clone();
            cancelled(&mut cancel).await;
            ExitCode::SUCCESS
        }
        Mode::Sequence => {
            let sequencer = MotionSequencer::new(MotionPlan::burger_war(), ros.clone());
            let outcome = sequencer.run(cancel_rx.clone()).await;
            info!(?outcome, "motion sequence finished");
            ExitCode::SUCCESS
        }
        Mode::Goal => run_goal(&cfg, &bus, &ros, cancel_rx.clone()).await,
    };

    // Stop everything else, then let the outbox drain.
    cancel_tx.send_replace(true);
    if let Err(e) = node_task.await {
        error!(error = %e, "bot node task failed");
    }
    if let Err(e) = feed_task.await {
        error!(error = %e, "sensor feed task failed");
    }
    drop(ros);
    drop(bus);
    for logger in [outbox, alerts] {
        if let Err(e) = logger.await {
            error!(error = %e, "bus logger failed");
        }
    }
    code
}

async fn run_goal(
    cfg: &Config,
    bus: &Arc<EventBus>,
    ros: &Arc<Ros2Adapter>,
    mut cancel: watch::Receiver<bool>,
) -> ExitCode {
    let client = NavigationClient::new(
        ros.clone(),
        Arc::clone(bus),
        Duration::from_secs(cfg.navigation_timeout_secs),
    );
    let goal = NavigationGoal::new(
        format!("{}/map", cfg.bot_name),
        cfg.goal.x,
        cfg.goal.y,
        cfg.goal.yaw,
    );

    tokio::select! {
        result = client.send_goal(goal) => match result {
            Ok(status) => {
                info!(?status, "navigation finished");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(error = %e, "navigation unavailable, shutting down");
                let alert = Event::new(
                    "burgerbot-cli",
                    EventPayload::Fault {
                        component: "move_base".to_string(),
                        code: FAULT_NAVIGATION_UNAVAILABLE,
                        message: e.to_string(),
                    },
                );
                if let Err(e) = bus.publish_to(Topic::SystemAlerts, alert) {
                    debug!(error = %e, "fault not published");
                }
                ExitCode::FAILURE
            }
        },
        _ = cancelled(&mut cancel) => {
            info!("navigation cancelled");
            ExitCode::SUCCESS
        }
    }
}

/// Feed simulated scans (and every few scans a camera frame) into the
/// adapter until cancelled.
async fn sim_feed(ros: Arc<Ros2Adapter>, distances: Vec<f32>, mut cancel: watch::Receiver<bool>) {
    let mut lidar = Some(SimRangeSensor::new("lidar", distances));
    let mut camera = SimCamera::new("front_rgb", 640, 480)
        .with_target([255, 0, 0], BlobRect { x: 80, y: 200, width: 60, height: 60 })
        .with_target([0, 255, 0], BlobRect { x: 300, y: 210, width: 40, height: 40 })
        .with_target([0, 0, 255], BlobRect { x: 500, y: 190, width: 50, height: 80 });

    let mut ticker = tokio::time::interval(SIM_SCAN_PERIOD);
    let mut tick: u64 = 0;
    loop {
        tokio::select! {
            _ = cancelled(&mut cancel) => break,
            _ = ticker.tick() => {}
        }

        if let Some(sensor) = lidar.as_mut() {
            match sensor.scan() {
                Ok(scan) => {
                    if let Err(e) = ros.ingest_laser_scan(
                        &scan.ranges,
                        scan.angle_min_rad,
                        scan.angle_increment_rad,
                    ) {
                        debug!(error = %e, "scan not delivered");
                    }
                }
                Err(e) => {
                    warn!(sensor = sensor.id(), error = %e, "simulated scanner disabled");
                    lidar = None;
                }
            }
        }

        if tick % SIM_FRAMES_EVERY == 0 {
            match camera.capture() {
                Ok(frame) => {
                    if let Err(e) = ros.ingest_image(frame.into_message()) {
                        debug!(error = %e, "frame not delivered");
                    }
                }
                Err(e) => warn!(camera = camera.id(), error = %e, "capture failed"),
            }
        }
        tick += 1;
    }
}

/// Log outbound rosbridge frames and faults seen on one topic until the bus
/// shuts down.
async fn log_topic(mut receiver: TopicReceiver) {
    let topic = receiver.topic();
    loop {
        match receiver.recv().await {
            Ok(event) => match event.payload {
                EventPayload::RosbridgeFrame(frame) => {
                    debug!(source = %event.source, %frame, "outbound frame");
                }
                EventPayload::Fault {
                    component,
                    code,
                    message,
                } => {
                    warn!(source = %event.source, %component, code, %message, "fault");
                }
                _ => {}
            },
            Err(RecvError::Lagged(n)) => warn!(?topic, lagged_by = n, "bus logger lagged"),
            Err(RecvError::Closed) => break,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Config
// ─────────────────────────────────────────────────────────────────────────────

fn load_config() -> Config {
    let mut cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let cfg = Config::default();
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  {} Default config written to {}",
                    "✓".green().bold(),
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!("{}: {}", "Error saving config".red(), e),
            }
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            Config::default()
        }
    };
    config::apply_env_overrides(&mut cfg);
    cfg
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   __                             __        __ "#.bold().red());
    println!("{}", r#"  / /  __ _________ ____ _______ / /  ___  / /_"#.bold().red());
    println!("{}", r#" / _ \/ // / __/ _ `/ -_) __/ _ \/ _ \/ _ \/ __/"#.bold().red());
    println!("{}", r#"/_.__/\_,_/_/  \_, /\__/_/ /_.__/_.__/\___/\__/ "#.bold().red());
    println!("{}", r#"              /___/                             "#.bold().red());
    println!();
    println!(
        "  {} {}",
        "burgerbot".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!();
}

fn print_summary(cfg: &Config) {
    println!("  Robot      {}", cfg.bot_name.bold());
    println!("  Mode       {}", cfg.mode.to_string().bold().cyan());
    if cfg.mode == Mode::Reactive {
        println!(
            "  Control    every {} ms, turn at ≤ {} m",
            cfg.control_period_ms, cfg.clearance_m
        );
    }
    if cfg.mode == Mode::Goal {
        println!(
            "  Goal       ({}, {}) yaw {} in {}/map",
            cfg.goal.x, cfg.goal.y, cfg.goal.yaw, cfg.bot_name
        );
    }
    println!("  Field      {}", FieldMap::burger_war().to_string().dimmed());
    println!();
}
