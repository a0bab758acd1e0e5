use chrono::{DateTime, Local};

use crate::truth::Label;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    AwaitingAnswer,
    AnswerRevealed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub choice: Label,
    pub truth: Label,
}

impl Verdict {
    pub fn is_correct(&self) -> bool {
        self.choice == self.truth
    }
}

/// Per-session record of where the learner is and how they are doing.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub start_secs: f64,
    pub score: u32,
    pub attempts: u32,
    pub phase: Phase,
    pub last_verdict: Option<Verdict>,
    pub started_at: DateTime<Local>,
}

impl SessionState {
    pub fn new(start_secs: f64) -> Self {
        Self {
            start_secs,
            score: 0,
            attempts: 0,
            phase: Phase::AwaitingAnswer,
            last_verdict: None,
            started_at: Local::now(),
        }
    }

    pub fn accuracy(&self) -> Option<f64> {
        match self.attempts {
            0 => None,
            n => Some(self.score as f64 / n as f64 * 100.0),
        }
    }
}
