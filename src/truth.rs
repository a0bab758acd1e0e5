use serde::{Deserialize, Serialize};

use crate::events::EventSet;
use crate::Mode;

/// Answer categories, declared in lookup priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Clean,
    Blink,
    Horizontal,
}

impl Label {
    /// Wording shown on the diagnosis form.
    pub fn option_text(&self, mode: Mode) -> &'static str {
        match (mode, self) {
            (Mode::Blink, Label::Clean) => "No Blink",
            (Mode::Blink, Label::Blink) => "Yes, there is a Blink",
            (Mode::EyeMovement, Label::Clean) => "Clean",
            (Mode::EyeMovement, Label::Blink) => "Blink",
            (_, Label::Horizontal) => "Horizontal eye movement",
        }
    }

    /// Banner drawn over the answer channel once revealed.
    pub fn banner(&self) -> Option<&'static str> {
        match self {
            Label::Clean => None,
            Label::Blink => Some("BLINK DETECTED"),
            Label::Horizontal => Some("HORIZONTAL MOVEMENT DETECTED"),
        }
    }
}

/// Detected events for the whole recording, the reference every answer is graded against.
#[derive(Debug, Clone)]
pub struct GroundTruth {
    pub sfreq: f64,
    pub blinks: EventSet,
    pub horizontal: Option<EventSet>,
}

impl GroundTruth {
    pub fn new(sfreq: f64, blinks: EventSet, horizontal: Option<EventSet>) -> Self {
        Self {
            sfreq,
            blinks,
            horizontal,
        }
    }

    /// First matching category for `[start, start + duration)`: blink, then
    /// horizontal movement, else clean.
    pub fn classify(&self, start_secs: f64, duration_secs: f64) -> Label {
        if self.blinks.any_within(start_secs, duration_secs, self.sfreq) {
            return Label::Blink;
        }
        match &self.horizontal {
            Some(h) if h.any_within(start_secs, duration_secs, self.sfreq) => Label::Horizontal,
            _ => Label::Clean,
        }
    }

    /// Every known event time, used to steer new windows towards artifacts.
    pub fn event_times(&self) -> Vec<f64> {
        let mut times: Vec<f64> = self.blinks.times(self.sfreq).collect();
        if let Some(h) = &self.horizontal {
            times.extend(h.times(self.sfreq));
        }
        times
    }
}
