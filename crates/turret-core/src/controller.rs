use std::time::{Duration, Instant};

use bytes::Bytes;
use tracing::{debug, info, warn};
use turret_proto::{classify, BatteryReading, Command, DetectionPoint, LineFramer, Message, RadarDetection};

use crate::history::{DetectionPointBuffer, TelemetryHistory};
use crate::interlock::{Interlock, Snapshot};
use crate::render::{LaserStatus, Render};
use crate::servo::{ServoController, ServoMode, Sweep, PRESET_ANGLES};
use crate::sink::CommandSink;
use crate::timers::{TimerId, Timers};
use crate::ControllerConfig;

/// Operator input from the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    /// One of the preset buttons: 0, 45, 90, 135 or 180 degrees.
    Preset(u8),
    Slider(u8),
    ToggleAuto,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Chunk(Bytes),
    TimerFired(TimerId),
    Ui(UiCommand),
}

/// Everything the panel knows about the turret, driven one event at a time.
///
/// The controller does no I/O of its own: bytes come in through `handle`,
/// commands leave through the sink, and the driver is told when to wake via
/// `next_deadline` / `poll_timers`.
pub struct Controller<S, R> {
    cfg: ControllerConfig,
    framer: LineFramer,
    history: TelemetryHistory,
    points: DetectionPointBuffer,
    interlock: Interlock,
    servo: ServoController,
    timers: Timers,
    sink: S,
    render: R,
}

impl<S: CommandSink, R: Render> Controller<S, R> {
    pub fn new(cfg: ControllerConfig, sink: S, render: R) -> Self {
        Self {
            framer: LineFramer::new(cfg.max_line_len),
            history: TelemetryHistory::new(cfg.history.telemetry_capacity),
            points: DetectionPointBuffer::new(cfg.history.detection_capacity),
            interlock: Interlock::new(&cfg.interlock),
            servo: ServoController::new(&cfg.sweep),
            timers: Timers::default(),
            cfg,
            sink,
            render,
        }
    }

    pub fn handle(&mut self, event: Event, now: Instant) {
        match event {
            Event::Chunk(bytes) => {
                for line in self.framer.feed(&bytes) {
                    self.on_line(&line, now);
                }
            }
            Event::TimerFired(id) => {
                self.timers.cancel(id);
                self.on_timer(id, now);
            }
            Event::Ui(cmd) => self.on_ui(cmd, now),
        }
    }

    /// Fires the timers due at `now`, earliest first, each to completion.
    /// Anything a handler arms here (the zero-delay resume included) is left
    /// for the next call.
    pub fn poll_timers(&mut self, now: Instant) {
        let generation = self.timers.generation();
        while let Some(id) = self.timers.pop_due(now, generation) {
            self.on_timer(id, now);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn is_timer_armed(&self, id: TimerId) -> bool {
        self.timers.is_armed(id)
    }

    pub fn laser_active(&self) -> bool {
        self.interlock.is_active()
    }

    pub fn mode(&self) -> ServoMode {
        self.servo.mode()
    }

    pub fn controls_enabled(&self) -> bool {
        self.servo.controls_enabled()
    }

    pub fn sweep(&self) -> &Sweep {
        self.servo.sweep()
    }

    pub fn history(&self) -> &TelemetryHistory {
        &self.history
    }

    pub fn points(&self) -> &DetectionPointBuffer {
        &self.points
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn render(&self) -> &R {
        &self.render
    }

    pub fn render_mut(&mut self) -> &mut R {
        &mut self.render
    }

    pub fn into_parts(self) -> (S, R) {
        (self.sink, self.render)
    }

    // ----- inbound -----

    fn on_line(&mut self, line: &str, now: Instant) {
        match classify(line) {
            Message::BatteryLine(raw) => match BatteryReading::parse(&raw) {
                Some(r) => self.on_battery(r),
                None => debug!("dropped malformed telemetry: {:?}", raw),
            },
            Message::RadarLine(raw) => match RadarDetection::parse(&raw) {
                Some(d) => self.on_detection(d, now),
                None => debug!("dropped malformed detection: {:?}", raw),
            },
            Message::LaserActivated => self.engage(now),
            Message::LaserDeactivated => self.disengage(now),
            Message::Unknown => {
                if !line.is_empty() {
                    debug!("ignored line: {:?}", line);
                }
            }
        }
    }

    fn on_battery(&mut self, reading: BatteryReading) {
        let pct = reading.power_percent(self.cfg.max_expected_power_mw);
        self.render.battery(&reading, pct);
        self.history.record(reading);
        self.render.history(&self.history);
    }

    fn on_detection(&mut self, d: RadarDetection, now: Instant) {
        debug!("detection angle={} distance={}", d.angle_deg, d.distance_cm);
        let point = DetectionPoint::from(d);
        self.render.detection(&point);
        for old in self.points.record(point) {
            self.render.point_evicted(&old);
        }
        if self.interlock.should_fire(&d) {
            self.engage(now);
        }
    }

    // ----- interlock -----

    fn engage(&mut self, now: Instant) {
        let current = Snapshot {
            auto_mode: self.servo.mode() == ServoMode::Auto,
            controls_enabled: self.servo.controls_enabled(),
        };
        if !self.interlock.engage(current) {
            debug!("interlock: already active");
            return;
        }
        self.timers.cancel(TimerId::Resume);

        if self.servo.mode() == ServoMode::Auto {
            self.timers.cancel(TimerId::Sweep);
            self.servo.set_mode(ServoMode::Manual);
            self.render.mode(ServoMode::Manual);
        }
        self.set_controls(false);
        self.render.laser_status(LaserStatus::On);
        self.send(Command::LaserOn);
        self.timers.start(TimerId::LaserHold, now, self.cfg.interlock.hold());
        info!("interlock: laser on (was auto={})", current.auto_mode);
    }

    fn disengage(&mut self, now: Instant) {
        let was_active = self.interlock.release();
        if !was_active {
            debug!("interlock: release while idle");
        }
        self.render.laser_status(LaserStatus::Off);
        self.send(Command::LaserOff);
        self.timers.cancel(TimerId::LaserHold);
        // restore on the next turn, not from inside this handler
        self.timers.start(TimerId::Resume, now, Duration::ZERO);
        if was_active {
            info!("interlock: laser off");
        }
    }

    fn resume(&mut self, now: Instant) {
        match self.interlock.take_snapshot() {
            Some(prev) => {
                if prev.auto_mode {
                    self.servo.set_mode(ServoMode::Auto);
                    self.timers.start(TimerId::Sweep, now, self.cfg.sweep.period());
                    self.send(Command::Auto);
                } else {
                    self.send(Command::Manual);
                }
                self.set_controls(prev.controls_enabled);
                info!("interlock: resumed {:?}", self.servo.mode());
            }
            None => {
                // nothing was suspended; just restate the mode
                let cmd = match self.servo.mode() {
                    ServoMode::Auto => Command::Auto,
                    ServoMode::Manual => Command::Manual,
                };
                self.send(cmd);
            }
        }
        self.render.mode(self.servo.mode());
    }

    // ----- servo -----

    fn on_ui(&mut self, cmd: UiCommand, now: Instant) {
        match cmd {
            UiCommand::Preset(angle) => {
                if !PRESET_ANGLES.contains(&angle) {
                    warn!("ignoring unknown preset {}", angle);
                    return;
                }
                if self.manual(angle) {
                    self.render.slider(angle);
                }
            }
            UiCommand::Slider(angle) => {
                self.manual(angle);
            }
            UiCommand::ToggleAuto => self.toggle_auto(now),
        }
    }

    fn manual(&mut self, angle: u8) -> bool {
        match self.servo.manual_command(angle, self.interlock.is_active()) {
            Some(cmd) => {
                self.send(cmd);
                true
            }
            None => {
                debug!("manual angle {} dropped (mode={:?} laser={})", angle, self.servo.mode(), self.interlock.is_active());
                false
            }
        }
    }

    fn toggle_auto(&mut self, now: Instant) {
        if self.interlock.is_active() {
            debug!("auto toggle ignored while laser active");
            return;
        }
        match self.servo.mode() {
            ServoMode::Manual => {
                self.servo.set_mode(ServoMode::Auto);
                self.timers.start(TimerId::Sweep, now, self.cfg.sweep.period());
                self.set_controls(false);
                self.send(Command::Auto);
            }
            ServoMode::Auto => {
                self.timers.cancel(TimerId::Sweep);
                self.servo.set_mode(ServoMode::Manual);
                self.set_controls(true);
                self.send(Command::Manual);
            }
        }
        info!("servo mode: {:?}", self.servo.mode());
        self.render.mode(self.servo.mode());
    }

    fn sweep_step(&mut self, now: Instant) {
        if self.servo.mode() != ServoMode::Auto {
            return;
        }
        let angle = self.servo.sweep_mut().step();
        self.send(Command::Angle(angle));
        self.render.sweep_angle(angle);
        self.timers.start(TimerId::Sweep, now, self.cfg.sweep.period());
    }

    // ----- plumbing -----

    fn on_timer(&mut self, id: TimerId, now: Instant) {
        match id {
            TimerId::LaserHold => self.disengage(now),
            TimerId::Sweep => self.sweep_step(now),
            TimerId::Resume => self.resume(now),
        }
    }

    fn set_controls(&mut self, enabled: bool) {
        if self.servo.set_controls_enabled(enabled) {
            self.render.controls_enabled(enabled);
        }
    }

    fn send(&mut self, cmd: Command) {
        if let Err(e) = self.sink.send(cmd) {
            warn!("dropped command {}: {}", cmd, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> Controller<Vec<Command>, ()> {
        Controller::new(ControllerConfig::default(), Vec::new(), ())
    }

    fn chunk(s: &str) -> Event {
        Event::Chunk(Bytes::copy_from_slice(s.as_bytes()))
    }

    #[test]
    fn malformed_lines_change_nothing() {
        let mut c = controller();
        let t0 = Instant::now();
        c.handle(chunk("B,1,3.30\nB,a,b,c,d,e\n1,2,3\nx,45\nLASER_ACTIVATEDX\n\n"), t0);
        assert!(c.history().is_empty());
        assert!(c.points().is_empty());
        assert!(!c.laser_active());
        assert!(c.sink().is_empty());
        assert_eq!(c.next_deadline(), None);
    }

    #[test]
    fn far_detection_does_not_fire() {
        let mut c = controller();
        c.handle(chunk("90,50\n"), Instant::now());
        assert_eq!(c.points().len(), 1);
        assert!(!c.laser_active());
        assert!(c.sink().is_empty());
    }

    #[test]
    fn failed_send_leaves_state_alone() {
        struct Broken;
        impl CommandSink for Broken {
            fn send(&mut self, _cmd: Command) -> Result<(), crate::SinkError> {
                Err(crate::SinkError::Closed)
            }
        }
        let mut c = Controller::new(ControllerConfig::default(), Broken, ());
        c.handle(chunk("LASER_ACTIVATED\n"), Instant::now());
        assert!(c.laser_active());
        assert!(!c.controls_enabled());
        assert!(c.is_timer_armed(TimerId::LaserHold));
    }
}
