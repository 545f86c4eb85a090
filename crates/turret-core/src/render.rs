use std::fmt;

use turret_proto::{BatteryReading, DetectionPoint};

use crate::history::TelemetryHistory;
use crate::servo::ServoMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaserStatus {
    On,
    Off,
}

impl fmt::Display for LaserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaserStatus::On => f.write_str("Laser: On"),
            LaserStatus::Off => f.write_str("Laser: Off"),
        }
    }
}

/// Display side of the panel. Calls are fire-and-forget; every hook defaults
/// to doing nothing.
pub trait Render {
    /// Live labels and the power gauge.
    fn battery(&mut self, _reading: &BatteryReading, _power_pct: u8) {}
    fn history(&mut self, _history: &TelemetryHistory) {}
    /// Needle angle, range label and the new overlay point.
    fn detection(&mut self, _point: &DetectionPoint) {}
    fn point_evicted(&mut self, _point: &DetectionPoint) {}
    fn laser_status(&mut self, _status: LaserStatus) {}
    fn sweep_angle(&mut self, _angle: u8) {}
    /// Slider mirror after a preset press.
    fn slider(&mut self, _angle: u8) {}
    fn controls_enabled(&mut self, _enabled: bool) {}
    fn mode(&mut self, _mode: ServoMode) {}
}

impl Render for () {}
