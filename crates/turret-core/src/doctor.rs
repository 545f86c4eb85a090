use anyhow::Result;

use crate::servo::MAX_ANGLE;
use crate::ControllerConfig;

pub fn check_controller(cfg: &ControllerConfig) -> Result<()> {
    anyhow::ensure!(cfg.max_line_len >= 16, "max_line_len too small (min 16 bytes)");
    anyhow::ensure!(cfg.max_expected_power_mw > 0.0, "max_expected_power_mw must be positive");

    let il = &cfg.interlock;
    anyhow::ensure!(il.trigger_distance_cm.is_finite() && il.trigger_distance_cm > 0.0, "interlock.trigger_distance_cm must be positive");
    anyhow::ensure!(il.hold_ms >= 100, "interlock.hold_ms too short (min 100)");

    let sw = &cfg.sweep;
    anyhow::ensure!(sw.period_ms >= 10, "sweep.period_ms too short (min 10)");
    anyhow::ensure!(sw.step >= 1, "sweep.step must be >= 1");
    anyhow::ensure!(sw.max_angle <= MAX_ANGLE, "sweep.max_angle above {}", MAX_ANGLE);
    anyhow::ensure!(sw.min_angle < sw.max_angle, "sweep.min_angle must be below sweep.max_angle");

    let h = &cfg.history;
    anyhow::ensure!(h.telemetry_capacity >= 1, "history.telemetry_capacity must be >= 1");
    anyhow::ensure!(h.detection_capacity >= 1, "history.detection_capacity must be >= 1");
    Ok(())
}
