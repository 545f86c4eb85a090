pub mod controller;
pub mod doctor;
pub mod history;
pub mod interlock;
pub mod render;
pub mod servo;
pub mod sink;
pub mod timers;

pub use controller::{Controller, Event, UiCommand};
pub use render::{LaserStatus, Render};
pub use servo::ServoMode;
pub use sink::{CommandSink, SinkError};
pub use timers::TimerId;

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Longest inbound line kept by the framer, in bytes.
    pub max_line_len: usize,

    /// Full scale of the power gauge, mW.
    pub max_expected_power_mw: f32,

    pub interlock: InterlockConfig,
    pub sweep: SweepConfig,
    pub history: HistoryConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_line_len: turret_proto::framer::DEFAULT_MAX_LINE_LEN,
            max_expected_power_mw: 1500.0,
            interlock: InterlockConfig::default(),
            sweep: SweepConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InterlockConfig {
    /// Radar contacts closer than this fire the laser.
    pub trigger_distance_cm: f32,
    /// Laser stays on this long unless the device reports it off first.
    pub hold_ms: u64,
}

impl Default for InterlockConfig {
    fn default() -> Self {
        Self { trigger_distance_cm: 50.0, hold_ms: 2000 }
    }
}

impl InterlockConfig {
    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub period_ms: u64,
    pub step: u8,
    pub min_angle: u8,
    pub max_angle: u8,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self { period_ms: 50, step: 2, min_angle: 0, max_angle: servo::MAX_ANGLE }
    }
}

impl SweepConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub telemetry_capacity: usize,
    pub detection_capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { telemetry_capacity: 10, detection_capacity: 50 }
    }
}
