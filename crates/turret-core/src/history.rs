use std::collections::VecDeque;

use turret_proto::{BatteryReading, DetectionPoint};

/// Recent battery readings, newest first. Order is arrival order, not stamp order.
#[derive(Debug, Clone)]
pub struct TelemetryHistory {
    entries: VecDeque<BatteryReading>,
    capacity: usize,
}

impl TelemetryHistory {
    pub fn new(capacity: usize) -> Self {
        Self { entries: VecDeque::with_capacity(capacity + 1), capacity }
    }

    pub fn record(&mut self, reading: BatteryReading) {
        self.entries.push_front(reading);
        self.entries.truncate(self.capacity);
    }

    pub fn latest(&self) -> Option<&BatteryReading> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BatteryReading> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Points on the radar overlay, oldest first, FIFO-evicted.
#[derive(Debug, Clone)]
pub struct DetectionPointBuffer {
    points: VecDeque<DetectionPoint>,
    capacity: usize,
}

impl DetectionPointBuffer {
    pub fn new(capacity: usize) -> Self {
        Self { points: VecDeque::with_capacity(capacity + 1), capacity }
    }

    /// Appends `point` and returns whatever fell off the front.
    pub fn record(&mut self, point: DetectionPoint) -> Vec<DetectionPoint> {
        self.points.push_back(point);
        let mut evicted = Vec::new();
        while self.points.len() > self.capacity {
            if let Some(old) = self.points.pop_front() {
                evicted.push(old);
            }
        }
        evicted
    }

    pub fn iter(&self) -> impl Iterator<Item = &DetectionPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turret_proto::RadarDetection;

    fn reading(n: u32) -> BatteryReading {
        BatteryReading::parse(&format!("B,{n},0,{n},0,{n}")).expect("reading")
    }

    fn point(n: u32) -> DetectionPoint {
        RadarDetection { angle_deg: n as f32, distance_cm: 100.0 }.into()
    }

    #[test]
    fn telemetry_keeps_ten_newest_first() {
        let mut h = TelemetryHistory::new(10);
        for n in 1..=15 {
            h.record(reading(n));
            assert!(h.len() <= 10);
        }
        let bus: Vec<f32> = h.iter().map(|r| r.bus_voltage).collect();
        let want: Vec<f32> = (6..=15).rev().map(|n| n as f32).collect();
        assert_eq!(bus, want);
        assert_eq!(h.latest().map(|r| r.bus_voltage), Some(15.0));
    }

    #[test]
    fn detections_evict_oldest_first() {
        let mut b = DetectionPointBuffer::new(50);
        let mut evicted = Vec::new();
        for n in 1..=60 {
            evicted.extend(b.record(point(n)));
            assert!(b.len() <= 50);
        }
        let kept: Vec<f32> = b.iter().map(|p| p.detection.angle_deg).collect();
        let want: Vec<f32> = (11..=60).map(|n| n as f32).collect();
        assert_eq!(kept, want);
        let gone: Vec<f32> = evicted.iter().map(|p| p.detection.angle_deg).collect();
        let want: Vec<f32> = (1..=10).map(|n| n as f32).collect();
        assert_eq!(gone, want);
    }

    #[test]
    fn no_eviction_below_capacity() {
        let mut b = DetectionPointBuffer::new(3);
        assert!(b.record(point(1)).is_empty());
        assert!(b.record(point(2)).is_empty());
        assert!(b.record(point(3)).is_empty());
        assert_eq!(b.record(point(4)).len(), 1);
    }
}
