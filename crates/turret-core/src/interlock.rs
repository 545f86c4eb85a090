//! Laser safety interlock.
//!
//! `Idle -> Active` on a close radar contact or a `LASER_ACTIVATED` report,
//! `Active -> Idle` on the hold timer or a `LASER_DEACTIVATED` report. While
//! active, manual aiming and auto mode toggling are locked out. What the
//! operator had before the laser fired is kept here until the resume step
//! hands it back.

use turret_proto::RadarDetection;

use crate::InterlockConfig;

/// Panel state to restore once the laser is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub auto_mode: bool,
    pub controls_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct Interlock {
    laser_active: bool,
    // Some from engage until the resume step takes it
    snapshot: Option<Snapshot>,
    trigger_distance_cm: f32,
}

impl Interlock {
    pub fn new(cfg: &InterlockConfig) -> Self {
        Self { laser_active: false, snapshot: None, trigger_distance_cm: cfg.trigger_distance_cm }
    }

    pub fn is_active(&self) -> bool {
        self.laser_active
    }

    pub fn should_fire(&self, d: &RadarDetection) -> bool {
        !self.laser_active && d.distance_cm < self.trigger_distance_cm
    }

    /// Idle -> Active. Returns false (and changes nothing) when already active.
    ///
    /// If the previous episode's resume has not run yet, its snapshot is the
    /// one that still describes the operator's setup and is kept; `current`
    /// would only capture the locked-out state.
    pub fn engage(&mut self, current: Snapshot) -> bool {
        if self.laser_active { return false; }
        self.laser_active = true;
        self.snapshot.get_or_insert(current);
        true
    }

    /// Active -> Idle. Returns whether the laser was actually on.
    pub fn release(&mut self) -> bool {
        std::mem::replace(&mut self.laser_active, false)
    }

    /// Hands the snapshot to the resume step. None after a redundant release.
    pub fn take_snapshot(&mut self) -> Option<Snapshot> {
        if self.laser_active { return None; }
        self.snapshot.take()
    }

    pub fn pending_snapshot(&self) -> Option<Snapshot> {
        self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANUAL: Snapshot = Snapshot { auto_mode: false, controls_enabled: true };
    const LOCKED: Snapshot = Snapshot { auto_mode: false, controls_enabled: false };
    const AUTO: Snapshot = Snapshot { auto_mode: true, controls_enabled: false };

    fn det(distance_cm: f32) -> RadarDetection {
        RadarDetection { angle_deg: 30.0, distance_cm }
    }

    #[test]
    fn fires_below_trigger_distance_only_when_idle() {
        let mut il = Interlock::new(&InterlockConfig::default());
        assert!(il.should_fire(&det(49.9)));
        assert!(!il.should_fire(&det(50.0)));
        assert!(il.engage(MANUAL));
        assert!(!il.should_fire(&det(10.0)));
    }

    #[test]
    fn reentrant_engage_keeps_first_snapshot() {
        let mut il = Interlock::new(&InterlockConfig::default());
        assert!(il.engage(AUTO));
        assert!(!il.engage(LOCKED));
        assert!(il.release());
        assert_eq!(il.take_snapshot(), Some(AUTO));
        assert_eq!(il.take_snapshot(), None);
    }

    #[test]
    fn redundant_release_has_nothing_to_restore() {
        let mut il = Interlock::new(&InterlockConfig::default());
        assert!(!il.release());
        assert_eq!(il.take_snapshot(), None);
    }

    #[test]
    fn engage_before_resume_keeps_pending_snapshot() {
        let mut il = Interlock::new(&InterlockConfig::default());
        il.engage(AUTO);
        il.release();
        // resume has not run; the panel is still locked out
        assert!(il.engage(LOCKED));
        assert_eq!(il.take_snapshot(), None);
        il.release();
        assert_eq!(il.take_snapshot(), Some(AUTO));
    }
}
