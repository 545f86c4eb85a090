use turret_proto::Command;

use crate::SweepConfig;

pub const MAX_ANGLE: u8 = 180;
pub const PRESET_ANGLES: [u8; 5] = [0, 45, 90, 135, 180];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoMode {
    Manual,
    Auto,
}

/// Triangle-wave position for auto mode. Turning points include the bounds.
#[derive(Debug, Clone)]
pub struct Sweep {
    angle: u8,
    increasing: bool,
    step: u8,
    min: u8,
    max: u8,
}

impl Sweep {
    pub fn new(cfg: &SweepConfig) -> Self {
        Self {
            angle: cfg.min_angle,
            increasing: true,
            step: cfg.step,
            min: cfg.min_angle,
            max: cfg.max_angle,
        }
    }

    pub fn step(&mut self) -> u8 {
        if self.increasing {
            self.angle = self.angle.saturating_add(self.step);
            if self.angle >= self.max {
                self.angle = self.max;
                self.increasing = false;
            }
        } else {
            self.angle = self.angle.saturating_sub(self.step);
            if self.angle <= self.min {
                self.angle = self.min;
                self.increasing = true;
            }
        }
        self.angle
    }

    pub fn angle(&self) -> u8 {
        self.angle
    }

    pub fn increasing(&self) -> bool {
        self.increasing
    }
}

/// Mode, manual-control enable and sweep position of the pan servo.
///
/// The sweep position is kept across Manual/Auto switches so a resumed sweep
/// continues where it stopped.
#[derive(Debug, Clone)]
pub struct ServoController {
    mode: ServoMode,
    controls_enabled: bool,
    sweep: Sweep,
}

impl ServoController {
    pub fn new(cfg: &SweepConfig) -> Self {
        Self { mode: ServoMode::Manual, controls_enabled: true, sweep: Sweep::new(cfg) }
    }

    pub fn mode(&self) -> ServoMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ServoMode) {
        self.mode = mode;
    }

    pub fn controls_enabled(&self) -> bool {
        self.controls_enabled
    }

    /// Returns true when the flag actually changed.
    pub fn set_controls_enabled(&mut self, enabled: bool) -> bool {
        let changed = self.controls_enabled != enabled;
        self.controls_enabled = enabled;
        changed
    }

    pub fn sweep(&self) -> &Sweep {
        &self.sweep
    }

    pub fn sweep_mut(&mut self) -> &mut Sweep {
        &mut self.sweep
    }

    /// Angle command for a manual request, or None when manual input is
    /// locked out (auto mode, controls disabled, laser firing, out of range).
    pub fn manual_command(&self, angle: u8, laser_active: bool) -> Option<Command> {
        if laser_active { return None; }
        if self.mode != ServoMode::Manual || !self.controls_enabled { return None; }
        if angle > MAX_ANGLE { return None; }
        Some(Command::Angle(angle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_bounces_between_bounds() {
        let mut s = Sweep::new(&SweepConfig::default());
        let mut seen = Vec::new();
        for _ in 0..90 {
            seen.push(s.step());
        }
        assert_eq!(seen.first(), Some(&2));
        assert_eq!(seen.last(), Some(&180));
        assert!(!s.increasing());
        assert_eq!(s.step(), 178);

        for _ in 0..88 {
            s.step();
        }
        assert_eq!(s.angle(), 2);
        assert_eq!(s.step(), 0);
        assert!(s.increasing());
        assert_eq!(s.step(), 2);
    }

    #[test]
    fn sweep_clamps_uneven_step() {
        let mut s = Sweep::new(&SweepConfig { period_ms: 50, step: 7, min_angle: 10, max_angle: 30 });
        let seen: Vec<u8> = (0..6).map(|_| s.step()).collect();
        assert_eq!(seen, vec![17, 24, 30, 23, 16, 10]);
    }

    #[test]
    fn manual_command_gates() {
        let mut servo = ServoController::new(&SweepConfig::default());
        assert_eq!(servo.manual_command(90, false), Some(Command::Angle(90)));
        assert_eq!(servo.manual_command(90, true), None);
        assert_eq!(servo.manual_command(181, false), None);

        servo.set_controls_enabled(false);
        assert_eq!(servo.manual_command(90, false), None);

        servo.set_controls_enabled(true);
        servo.set_mode(ServoMode::Auto);
        assert_eq!(servo.manual_command(90, false), None);
    }
}
