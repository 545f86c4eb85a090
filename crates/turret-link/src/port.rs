use anyhow::{Context, Result};
use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, SerialStream, StopBits};
use tracing::info;

use crate::autodetect::autodetect_turret;
use crate::SerialConfig;

/// Opens `dev` as 8N1 without flow control.
pub fn open(dev: &str, baud: u32) -> Result<SerialStream> {
    let port = tokio_serial::new(dev, baud)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .open_native_async()
        .with_context(|| format!("open turret serial device {}", dev))?;
    info!("serial: opened {} @ {}", dev, baud);
    Ok(port)
}

pub fn resolve_port(cfg: &SerialConfig) -> Result<String> {
    if cfg.autodetect {
        let res = autodetect_turret(cfg.vendor_id, cfg.product_id)?;
        match res.chosen {
            Some(dev) => Ok(dev),
            None => anyhow::bail!(
                "turret autodetect failed: no USB port with id {:04x}:{:04x}",
                cfg.vendor_id,
                cfg.product_id
            ),
        }
    } else {
        cfg.device.clone().context("serial.device missing (autodetect=false)")
    }
}
