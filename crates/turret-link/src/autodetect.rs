use anyhow::{Context, Result};
use tokio_serial::{SerialPortInfo, SerialPortType};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortEntry {
    pub dev: String,
    /// (vendor id, product id) for USB ports
    pub usb: Option<(u16, u16)>,
    pub label: String,
}

impl From<SerialPortInfo> for PortEntry {
    fn from(p: SerialPortInfo) -> Self {
        match p.port_type {
            SerialPortType::UsbPort(info) => {
                let label = [info.manufacturer, info.product]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ");
                Self {
                    dev: p.port_name,
                    usb: Some((info.vid, info.pid)),
                    label: if label.is_empty() { "USB serial".into() } else { label },
                }
            }
            SerialPortType::BluetoothPort => Self { dev: p.port_name, usb: None, label: "Bluetooth".into() },
            SerialPortType::PciPort => Self { dev: p.port_name, usb: None, label: "PCI".into() },
            SerialPortType::Unknown => Self { dev: p.port_name, usb: None, label: String::new() },
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub port: PortEntry,
    pub matched: bool,
}

#[derive(Debug, Clone)]
pub struct AutodetectResult {
    pub chosen: Option<String>,
    pub probes: Vec<ProbeResult>,
}

pub fn list_ports() -> Result<Vec<PortEntry>> {
    let ports = tokio_serial::available_ports().context("enumerate serial ports")?;
    Ok(ports.into_iter().map(PortEntry::from).collect())
}

pub fn autodetect_turret(vendor_id: u16, product_id: u16) -> Result<AutodetectResult> {
    let res = pick(list_ports()?, vendor_id, product_id);
    match &res.chosen {
        Some(dev) => info!("turret autodetect: OK {}", dev),
        None => debug!("turret autodetect: no match among {} ports", res.probes.len()),
    }
    Ok(res)
}

/// First port whose USB ids match wins; every port is reported.
pub fn pick(ports: Vec<PortEntry>, vendor_id: u16, product_id: u16) -> AutodetectResult {
    let mut chosen = None;
    let probes = ports
        .into_iter()
        .map(|port| {
            let matched = chosen.is_none() && port.usb == Some((vendor_id, product_id));
            if matched {
                chosen = Some(port.dev.clone());
            }
            ProbeResult { port, matched }
        })
        .collect();
    AutodetectResult { chosen, probes }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(dev: &str, usb: Option<(u16, u16)>) -> PortEntry {
        PortEntry { dev: dev.into(), usb, label: String::new() }
    }

    #[test]
    fn picks_first_matching_usb_port() {
        let ports = vec![
            entry("/dev/ttyS0", None),
            entry("/dev/ttyUSB0", Some((0x0403, 0x6001))),
            entry("/dev/ttyACM0", Some((0x2341, 0x0043))),
            entry("/dev/ttyACM1", Some((0x2341, 0x0043))),
        ];
        let res = pick(ports, 0x2341, 0x0043);
        assert_eq!(res.chosen.as_deref(), Some("/dev/ttyACM0"));
        let matched: Vec<bool> = res.probes.iter().map(|p| p.matched).collect();
        assert_eq!(matched, vec![false, false, true, false]);
    }

    #[test]
    fn no_match_reports_all_probes() {
        let res = pick(vec![entry("COM3", Some((0x2341, 0x0042)))], 0x2341, 0x0043);
        assert!(res.chosen.is_none());
        assert_eq!(res.probes.len(), 1);
    }
}
