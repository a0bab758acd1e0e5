use rand::Rng;
use tracing::{debug, info};

use crate::error::{Result, TrainerError};
use crate::session::{Phase, SessionState, Verdict};
use crate::truth::{GroundTruth, Label};
use crate::Mode;

#[derive(Debug, Clone, PartialEq)]
pub struct QuizParams {
    pub window_secs: f64,
    pub total_secs: f64,
    pub snap_probability: f64,
}

impl QuizParams {
    /// Latest start time for which the whole window fits in the recording.
    pub fn max_start(&self) -> f64 {
        (self.total_secs - self.window_secs).max(0.0)
    }

    pub fn clamp_start(&self, start_secs: f64) -> f64 {
        start_secs.clamp(0.0, self.max_start())
    }
}

/// Submit/advance state machine over windows of one recording.
#[derive(Debug, Clone)]
pub struct Quiz {
    pub mode: Mode,
    pub params: QuizParams,
    pub state: SessionState,
}

impl Quiz {
    pub fn new(mode: Mode, params: QuizParams, initial_start_secs: f64) -> Self {
        let start = params.clamp_start(initial_start_secs);
        Self {
            mode,
            params,
            state: SessionState::new(start),
        }
    }

    pub fn is_revealed(&self) -> bool {
        self.state.phase == Phase::AnswerRevealed
    }

    pub fn current_truth(&self, truth: &GroundTruth) -> Label {
        truth.classify(self.state.start_secs, self.params.window_secs)
    }

    /// Grades `choice` against the current window and reveals the answer.
    pub fn submit(&mut self, choice: Label, truth: &GroundTruth) -> Result<Verdict> {
        if self.is_revealed() {
            return Err(TrainerError::AlreadyAnswered);
        }
        if !self.mode.options().contains(&choice) {
            return Err(TrainerError::ChoiceNotOffered {
                choice,
                mode: self.mode,
            });
        }

        let verdict = Verdict {
            choice,
            truth: self.current_truth(truth),
        };
        self.state.attempts += 1;
        if verdict.is_correct() {
            self.state.score += 1;
        }
        self.state.last_verdict = Some(verdict);
        self.state.phase = Phase::AnswerRevealed;

        info!(
            start = self.state.start_secs,
            choice = ?verdict.choice,
            truth = ?verdict.truth,
            score = self.state.score,
            attempts = self.state.attempts,
            "answer submitted"
        );
        Ok(verdict)
    }

    /// Moves to a fresh window: near a random known event with probability
    /// `snap_probability`, otherwise uniformly over the valid range.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R, event_times: &[f64]) -> Result<f64> {
        if !self.is_revealed() {
            return Err(TrainerError::NotAnswered);
        }

        let max_start = self.params.max_start();
        let snap = !event_times.is_empty() && rng.gen_bool(self.params.snap_probability);
        let start = if snap {
            let event = event_times[rng.gen_range(0..event_times.len())];
            event - rng.gen_range(0.0..self.params.window_secs)
        } else if max_start > 0.0 {
            rng.gen_range(0.0..=max_start)
        } else {
            0.0
        };

        self.state.start_secs = self.params.clamp_start(start);
        self.state.phase = Phase::AwaitingAnswer;
        self.state.last_verdict = None;
        debug!(start = self.state.start_secs, snap, "advanced to new window");
        Ok(self.state.start_secs)
    }

    /// Shifts the unanswered window by `delta_secs`, staying inside the recording.
    pub fn scroll(&mut self, delta_secs: f64) -> Result<f64> {
        if self.is_revealed() {
            return Err(TrainerError::AlreadyAnswered);
        }
        self.state.start_secs = self.params.clamp_start(self.state.start_secs + delta_secs);
        Ok(self.state.start_secs)
    }
}
