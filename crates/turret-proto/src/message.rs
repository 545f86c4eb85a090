/// Inbound line, routed by shape only. Field-level validation happens in the
/// telemetry parsers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    BatteryLine(String),
    RadarLine(String),
    LaserActivated,
    LaserDeactivated,
    Unknown,
}

pub const BATTERY_TAG: &str = "B,";
pub const LASER_ACTIVATED: &str = "LASER_ACTIVATED";
pub const LASER_DEACTIVATED: &str = "LASER_DEACTIVATED";

pub fn classify(line: &str) -> Message {
    if line.starts_with(BATTERY_TAG) {
        Message::BatteryLine(line.to_string())
    } else if line.contains(',') {
        Message::RadarLine(line.to_string())
    } else if line == LASER_ACTIVATED {
        Message::LaserActivated
    } else if line == LASER_DEACTIVATED {
        Message::LaserDeactivated
    } else {
        Message::Unknown
    }
}
