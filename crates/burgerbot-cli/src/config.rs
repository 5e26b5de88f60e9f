//! Configuration vault – reads/writes `~/.burgerbot/config.toml`.

use burgerbot_runtime::StalePolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// What the robot does once the node is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Obstacle-reactive driving from the forward scan distance.
    #[default]
    Reactive,
    /// Open-loop playback of the built-in motion plan.
    Sequence,
    /// A single navigation goal.
    Goal,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Reactive => write!(f, "reactive"),
            Mode::Sequence => write!(f, "sequence"),
            Mode::Goal => write!(f, "goal"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reactive" => Ok(Mode::Reactive),
            "sequence" => Ok(Mode::Sequence),
            "goal" => Ok(Mode::Goal),
            other => Err(format!(
                "unknown mode '{other}' (expected reactive, sequence or goal)"
            )),
        }
    }
}

/// Target pose for [`Mode::Goal`], in metres and radians in the
/// `<bot_name>/map` frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalConfig {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub yaw: f32,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            x: -0.5,
            y: 0.0,
            yaw: 0.0,
        }
    }
}

/// Persisted settings stored in `~/.burgerbot/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Robot name; prefixes the navigation map frame.
    #[serde(default = "default_bot_name")]
    pub bot_name: String,

    #[serde(default)]
    pub mode: Mode,

    /// Reactive control period in milliseconds.
    #[serde(default = "default_control_period_ms")]
    pub control_period_ms: u64,

    /// Forward distance (m) at or below which the robot turns.
    #[serde(default = "default_clearance_m")]
    pub clearance_m: f32,

    #[serde(default = "default_cruise_speed")]
    pub cruise_speed: f32,

    #[serde(default = "default_turn_rate")]
    pub turn_rate: f32,

    /// Camera calibration, degrees per horizontal pixel.
    #[serde(default = "default_deg_per_pixel")]
    pub deg_per_pixel: f32,

    #[serde(default)]
    pub stale_policy: StalePolicy,

    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,

    /// Forward distances (m) the simulated scanner cycles through.
    #[serde(default = "default_sim_distances")]
    pub sim_distances: Vec<f32>,

    #[serde(default)]
    pub goal: GoalConfig,
}

fn default_bot_name() -> String {
    "Seigo".to_string()
}
fn default_control_period_ms() -> u64 {
    1000
}
fn default_clearance_m() -> f32 {
    burgerbot_runtime::reactive::DEFAULT_CLEARANCE_M
}
fn default_cruise_speed() -> f32 {
    burgerbot_runtime::reactive::DEFAULT_CRUISE_SPEED
}
fn default_turn_rate() -> f32 {
    burgerbot_runtime::reactive::DEFAULT_TURN_RATE
}
fn default_deg_per_pixel() -> f32 {
    burgerbot_perception::DEFAULT_DEG_PER_PIXEL
}
fn default_navigation_timeout_secs() -> u64 {
    30
}
fn default_sim_distances() -> Vec<f32> {
    vec![1.2, 0.9, 0.6, 0.4, 0.3, 0.8, 1.5]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot_name: default_bot_name(),
            mode: Mode::default(),
            control_period_ms: default_control_period_ms(),
            clearance_m: default_clearance_m(),
            cruise_speed: default_cruise_speed(),
            turn_rate: default_turn_rate(),
            deg_per_pixel: default_deg_per_pixel(),
            stale_policy: StalePolicy::default(),
            navigation_timeout_secs: default_navigation_timeout_secs(),
            sim_distances: default_sim_distances(),
            goal: GoalConfig::default(),
        }
    }
}

/// Return the path to `~/.burgerbot/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".burgerbot").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    if cfg.control_period_ms == 0 {
        return Err("control_period_ms must be greater than zero".to_string());
    }
    Ok(Some(cfg))
}

/// Apply `BURGERBOT_*` environment variable overrides to `cfg`.  Values that
/// do not parse are ignored.
///
/// | Variable | Config field |
/// |---|---|
/// | `BURGERBOT_MODE` | `mode` |
/// | `BURGERBOT_CONTROL_PERIOD_MS` | `control_period_ms` |
/// | `BURGERBOT_CLEARANCE_M` | `clearance_m` |
pub fn apply_env_overrides(cfg: &mut Config) {
    apply_overrides(cfg, |key| std::env::var(key).ok());
}

fn apply_overrides(cfg: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("BURGERBOT_MODE")
        && let Ok(mode) = v.parse::<Mode>()
    {
        cfg.mode = mode;
    }
    if let Some(v) = lookup("BURGERBOT_CONTROL_PERIOD_MS")
        && let Ok(ms) = v.trim().parse::<u64>()
        && ms > 0
    {
        cfg.control_period_ms = ms;
    }
    if let Some(v) = lookup("BURGERBOT_CLEARANCE_M")
        && let Ok(m) = v.trim().parse::<f32>()
        && m.is_finite()
    {
        cfg.clearance_m = m;
    }
}

/// Save the config to disk, creating `~/.burgerbot/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| f.write_all(raw.as_bytes()))
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}
