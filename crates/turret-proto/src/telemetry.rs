use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};

const CLOCK_FMT: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second]");

/// One power-monitor sample: `B,<bus>,<shunt>,<load>,<current>,<power>`.
///
/// Some firmware builds put a sample counter right after the tag
/// (`B,<n>,<bus>,...`); that form is accepted and the counter ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct BatteryReading {
    pub ts: OffsetDateTime,
    pub bus_voltage: f32,   // V
    pub shunt_voltage: f32, // mV
    pub load_voltage: f32,  // V
    pub current: f32,       // mA
    pub power: f32,         // mW
}

impl BatteryReading {
    /// Parse and stamp with the current wall clock, whole seconds.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::parse_at(raw, now_whole_seconds())
    }

    pub fn parse_at(raw: &str, ts: OffsetDateTime) -> Option<Self> {
        let parts: Vec<&str> = raw.split(',').collect();
        let values = match parts.len() {
            6 => &parts[1..],
            7 => {
                parse_field(parts[1])?;
                &parts[2..]
            }
            _ => return None,
        };

        let mut v = [0.0f32; 5];
        for (slot, field) in v.iter_mut().zip(values) {
            *slot = parse_field(field)?;
        }

        Some(Self {
            ts,
            bus_voltage: v[0],
            shunt_voltage: v[1],
            load_voltage: v[2],
            current: v[3],
            power: v[4],
        })
    }

    /// Share of `max_expected_mw`, rounded, for the power gauge.
    pub fn power_percent(&self, max_expected_mw: f32) -> u8 {
        if max_expected_mw <= 0.0 { return 0; }
        ((self.power / max_expected_mw) * 100.0).round().clamp(0.0, 100.0) as u8
    }

    /// `hh:mm:ss` of the stamp.
    pub fn clock(&self) -> String {
        self.ts.format(CLOCK_FMT).unwrap_or_default()
    }
}

/// Radar sample: `<angle>,<distance>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadarDetection {
    pub angle_deg: f32,
    pub distance_cm: f32,
}

impl RadarDetection {
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split(',');
        let (Some(angle), Some(distance), None) = (parts.next(), parts.next(), parts.next()) else {
            return None;
        };
        Some(Self { angle_deg: parse_field(angle)?, distance_cm: parse_field(distance)? })
    }
}

/// A detection placed on the radar plane, origin at the turret, in cm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionPoint {
    pub detection: RadarDetection,
    pub x: f32,
    pub y: f32,
}

impl From<RadarDetection> for DetectionPoint {
    fn from(detection: RadarDetection) -> Self {
        let rad = detection.angle_deg.to_radians();
        Self {
            detection,
            x: detection.distance_cm * rad.cos(),
            y: detection.distance_cm * rad.sin(),
        }
    }
}

fn parse_field(s: &str) -> Option<f32> {
    s.trim().parse::<f32>().ok().filter(|v| v.is_finite())
}

fn now_whole_seconds() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(0).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn battery_six_fields() {
        let r = BatteryReading::parse("B,3.30,0.05,3.25,120.0,400.0").expect("reading");
        assert_eq!(r.bus_voltage, 3.30);
        assert_eq!(r.shunt_voltage, 0.05);
        assert_eq!(r.load_voltage, 3.25);
        assert_eq!(r.current, 120.0);
        assert_eq!(r.power, 400.0);
        assert_eq!(r.ts.nanosecond(), 0);
    }

    #[test]
    fn battery_with_sample_counter() {
        let r = BatteryReading::parse("B,1,3.30,0.05,3.25,120.0,400.0").expect("reading");
        assert_eq!(r.bus_voltage, 3.30);
        assert_eq!(r.power, 400.0);
        assert!(BatteryReading::parse("B,x,3.30,0.05,3.25,120.0,400.0").is_none());
    }

    #[test]
    fn battery_rejects_malformed() {
        assert!(BatteryReading::parse("B,1,3.30").is_none());
        assert!(BatteryReading::parse("B,3.30,0.05,3.25,120.0").is_none());
        assert!(BatteryReading::parse("B,3.30,abc,3.25,120.0,400.0").is_none());
        assert!(BatteryReading::parse("B,3.30,0.05,3.25,120.0,").is_none());
        assert!(BatteryReading::parse("B,3.30,0.05,inf,120.0,400.0").is_none());
        assert!(BatteryReading::parse("B,1,2,3,4,5,6,7").is_none());
    }

    #[test]
    fn battery_tolerates_padding_and_stamps() {
        let ts = datetime!(2024-05-01 13:07:09 UTC);
        let r = BatteryReading::parse_at("B, 5.1 ,0.2, 4.9,80,392.0", ts).expect("reading");
        assert_eq!(r.load_voltage, 4.9);
        assert_eq!(r.clock(), "13:07:09");
    }

    #[test]
    fn power_gauge_clamps() {
        let ts = datetime!(2024-05-01 0:00 UTC);
        let r = BatteryReading::parse_at("B,5,0,5,100,750", ts).expect("reading");
        assert_eq!(r.power_percent(1500.0), 50);
        let r = BatteryReading::parse_at("B,5,0,5,100,9000", ts).expect("reading");
        assert_eq!(r.power_percent(1500.0), 100);
        let r = BatteryReading::parse_at("B,5,0,5,100,-20", ts).expect("reading");
        assert_eq!(r.power_percent(1500.0), 0);
        assert_eq!(r.power_percent(0.0), 0);
    }

    #[test]
    fn radar_two_fields_only() {
        let d = RadarDetection::parse("30,45").expect("detection");
        assert_eq!(d, RadarDetection { angle_deg: 30.0, distance_cm: 45.0 });
        assert!(RadarDetection::parse("30").is_none());
        assert!(RadarDetection::parse("30,45,1").is_none());
        assert!(RadarDetection::parse("30,far").is_none());
        assert!(RadarDetection::parse(",").is_none());
        assert!(RadarDetection::parse("-15.5,0").is_some());
    }

    #[test]
    fn detection_point_projection() {
        let p = DetectionPoint::from(RadarDetection { angle_deg: 90.0, distance_cm: 20.0 });
        assert!(p.x.abs() < 1e-4);
        assert!((p.y - 20.0).abs() < 1e-4);
        let p = DetectionPoint::from(RadarDetection { angle_deg: 0.0, distance_cm: 12.5 });
        assert_eq!(p.x, 12.5);
        assert_eq!(p.y, 0.0);
    }
}
