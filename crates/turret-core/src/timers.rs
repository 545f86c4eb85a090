use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerId {
    /// One-shot: laser auto-off.
    LaserHold,
    /// Periodic auto-sweep step.
    Sweep,
    /// Zero-delay: restore mode after the laser goes off.
    Resume,
}

impl TimerId {
    pub const ALL: [TimerId; 3] = [TimerId::LaserHold, TimerId::Sweep, TimerId::Resume];

    fn slot(self) -> usize {
        match self {
            TimerId::LaserHold => 0,
            TimerId::Sweep => 1,
            TimerId::Resume => 2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Armed {
    deadline: Instant,
    seq: u64,
}

/// The three named timers. Starting a timer replaces any pending firing of
/// it; due timers come out by deadline, ties by arming order.
#[derive(Debug, Default)]
pub struct Timers {
    slots: [Option<Armed>; 3],
    seq: u64,
}

impl Timers {
    pub fn start(&mut self, id: TimerId, now: Instant, after: Duration) {
        self.seq += 1;
        self.slots[id.slot()] = Some(Armed { deadline: now + after, seq: self.seq });
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.slots[id.slot()].take().is_some()
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.slots[id.slot()].is_some()
    }

    pub fn deadline(&self, id: TimerId) -> Option<Instant> {
        self.slots[id.slot()].map(|a| a.deadline)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.earliest(None).map(|(_, a)| a.deadline)
    }

    /// Arming counter; every `start` bumps it.
    pub fn generation(&self) -> u64 {
        self.seq
    }

    /// Disarms and returns the earliest timer due at `now` that was armed at
    /// or before `generation`. Timers armed later wait for the next poll.
    pub fn pop_due(&mut self, now: Instant, generation: u64) -> Option<TimerId> {
        let (id, _) = self.earliest(Some((now, generation)))?;
        self.slots[id.slot()] = None;
        Some(id)
    }

    fn earliest(&self, due: Option<(Instant, u64)>) -> Option<(TimerId, Armed)> {
        TimerId::ALL
            .iter()
            .filter_map(|id| self.slots[id.slot()].map(|a| (*id, a)))
            .filter(|(_, a)| due.map_or(true, |(now, upto)| a.deadline <= now && a.seq <= upto))
            .min_by_key(|(_, a)| (a.deadline, a.seq))
    }
}
