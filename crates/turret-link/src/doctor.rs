use anyhow::Result;

use crate::SerialConfig;

pub fn check_serial(cfg: &SerialConfig) -> Result<()> {
    if !cfg.autodetect {
        anyhow::ensure!(cfg.device.as_ref().map(|s| !s.is_empty()).unwrap_or(false), "serial.device missing");
    }
    anyhow::ensure!(cfg.baud > 0, "serial.baud invalid");
    anyhow::ensure!(cfg.command_queue >= 1, "serial.command_queue must be >= 1");
    Ok(())
}
