//! Double and triple click detection.

use std::time::{Duration, Instant};

use glam::IVec2;

use crate::event::MouseButton;

/// Number of presses remembered.
pub const HISTORY_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickRecord {
    pub at: Instant,
    pub button: MouseButton,
    pub pos: IVec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClickKind {
    #[default]
    Single,
    Double,
    Triple,
}

/// Ring of the most recent presses.
#[derive(Debug, Clone)]
pub struct ClickHistory {
    ring: [Option<ClickRecord>; HISTORY_LEN],
    /// Slot that receives the next press.
    next: usize,
    double_click: Duration,
    triple_click: Duration,
    last: ClickKind,
}

impl Default for ClickHistory {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), Duration::from_secs(1))
    }
}

impl ClickHistory {
    pub fn new(double_click: Duration, triple_click: Duration) -> Self {
        Self {
            ring: [None; HISTORY_LEN],
            next: 0,
            double_click,
            triple_click,
            last: ClickKind::Single,
        }
    }

    /// The `n`-th most recent press, `0` being the latest.
    pub fn nth_back(&self, n: usize) -> Option<&ClickRecord> {
        if n >= HISTORY_LEN {
            return None;
        }
        let slot = (self.next + HISTORY_LEN - 1 - n) % HISTORY_LEN;
        self.ring[slot].as_ref()
    }

    fn matches(record: Option<&ClickRecord>, press: &ClickRecord, window: Duration) -> bool {
        record.is_some_and(|prev| {
            prev.button == press.button
                && prev.pos == press.pos
                && press.at.saturating_duration_since(prev.at) < window
        })
    }

    /// Classifies `press` against the history, then remembers it.
    pub fn record(&mut self, press: ClickRecord) -> ClickKind {
        let double = Self::matches(self.nth_back(0), &press, self.double_click);
        let triple = double && Self::matches(self.nth_back(1), &press, self.triple_click);

        self.ring[self.next] = Some(press);
        self.next = (self.next + 1) % HISTORY_LEN;
        self.last = match (double, triple) {
            (_, true) => ClickKind::Triple,
            (true, false) => ClickKind::Double,
            _ => ClickKind::Single,
        };
        self.last
    }

    pub fn last_kind(&self) -> ClickKind {
        self.last
    }

    pub fn has_double_clicked(&self) -> bool {
        matches!(self.last, ClickKind::Double | ClickKind::Triple)
    }

    pub fn has_triple_clicked(&self) -> bool {
        self.last == ClickKind::Triple
    }

    pub fn clear(&mut self) {
        self.ring = [None; HISTORY_LEN];
        self.last = ClickKind::Single;
    }
}
