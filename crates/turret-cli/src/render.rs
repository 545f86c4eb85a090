use tracing::{debug, info};
use turret_core::history::TelemetryHistory;
use turret_core::{LaserStatus, Render, ServoMode};
use turret_proto::{BatteryReading, DetectionPoint};

/// Headless panel: every display update becomes a log line.
#[derive(Debug, Default)]
pub struct LogRender;

impl Render for LogRender {
    fn battery(&mut self, r: &BatteryReading, power_pct: u8) {
        info!(
            "battery {} bus={:.2} V shunt={:.2} mV load={:.2} V current={:.2} mA power={:.2} mW gauge={}%",
            r.clock(),
            r.bus_voltage,
            r.shunt_voltage,
            r.load_voltage,
            r.current,
            r.power,
            power_pct
        );
    }

    fn history(&mut self, history: &TelemetryHistory) {
        for r in history.iter() {
            debug!(
                "history {} {:.2} {:.2} {:.2} {:.2} {:.2}",
                r.clock(),
                r.bus_voltage,
                r.shunt_voltage,
                r.load_voltage,
                r.current,
                r.power
            );
        }
    }

    fn detection(&mut self, p: &DetectionPoint) {
        info!(
            "radar angle={:.1} range={:.1} cm at ({:.1}, {:.1})",
            p.detection.angle_deg, p.detection.distance_cm, p.x, p.y
        );
    }

    fn point_evicted(&mut self, p: &DetectionPoint) {
        debug!("radar point expired ({:.1}, {:.1})", p.x, p.y);
    }

    fn laser_status(&mut self, status: LaserStatus) {
        info!("{}", status);
    }

    fn sweep_angle(&mut self, angle: u8) {
        debug!("sweep {}", angle);
    }

    fn slider(&mut self, angle: u8) {
        debug!("slider -> {}", angle);
    }

    fn controls_enabled(&mut self, enabled: bool) {
        info!("controls {}", if enabled { "enabled" } else { "disabled" });
    }

    fn mode(&mut self, mode: ServoMode) {
        let button = match mode {
            ServoMode::Auto => "Stop Auto",
            ServoMode::Manual => "Start Auto",
        };
        info!("mode {:?} [{}]", mode, button);
    }
}
