use rand::{rngs::StdRng, SeedableRng};
use tracing::debug;

use crate::config::Config;
use crate::controls::Command;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::quiz::{Quiz, QuizParams};
use crate::recording::Window;
use crate::session::Verdict;
use crate::truth::Label;

/// One learner's session over a loaded dataset: the quiz plus the
/// highlighted form option.
#[derive(Debug)]
pub struct Trainer {
    pub config: Config,
    pub dataset: Dataset,
    pub quiz: Quiz,
    pub selected: usize,
    rng: StdRng,
    event_times: Vec<f64>,
}

impl Trainer {
    /// Fails when the configured window does not fit in the recording.
    pub fn new(config: Config, dataset: Dataset, seed: Option<u64>) -> Result<Self> {
        dataset.recording.window(0.0, config.window_secs)?;

        let params = QuizParams {
            window_secs: config.window_secs,
            total_secs: dataset.recording.duration_secs(),
            snap_probability: config.event_snap_probability,
        };
        let quiz = Quiz::new(config.mode, params, config.initial_start_secs);
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let event_times = dataset.truth.event_times();

        Ok(Self {
            config,
            dataset,
            quiz,
            selected: 0,
            rng,
            event_times,
        })
    }

    pub fn options(&self) -> &'static [Label] {
        self.quiz.mode.options()
    }

    pub fn selected_label(&self) -> Label {
        self.options()[self.selected]
    }

    pub fn window(&self) -> Result<Window<'_>> {
        self.dataset
            .recording
            .window(self.quiz.state.start_secs, self.quiz.params.window_secs)
    }

    /// Ground truth for the window currently on screen.
    pub fn current_truth(&self) -> Label {
        self.quiz.current_truth(&self.dataset.truth)
    }

    pub fn submit(&mut self) -> Result<Verdict> {
        self.quiz.submit(self.selected_label(), &self.dataset.truth)
    }

    pub fn next_window(&mut self) -> Result<f64> {
        let start = self.quiz.advance(&mut self.rng, &self.event_times)?;
        self.selected = 0;
        Ok(start)
    }

    /// Applies a quiz command. Quitting and the guide belong to the UI and are
    /// ignored here.
    pub fn apply(&mut self, command: Command) -> Result<()> {
        let n = self.options().len();
        match command {
            Command::Select(idx) if idx < n => self.selected = idx,
            Command::Select(_) => {}
            Command::SelectPrev => self.selected = (self.selected + n - 1) % n,
            Command::SelectNext => self.selected = (self.selected + 1) % n,
            Command::Submit => {
                self.submit()?;
            }
            Command::Next => {
                self.next_window()?;
            }
            Command::Scroll(steps) => {
                let start = self.quiz.scroll(steps * self.config.scroll_step_secs)?;
                debug!(start, "window scrolled");
            }
            Command::ToggleGuide | Command::Quit => {}
        }
        Ok(())
    }

    /// One line for the terminal once the session ends.
    pub fn summary(&self) -> String {
        let state = &self.quiz.state;
        let accuracy = state
            .accuracy()
            .map(|a| format!(" ({a:.0}%)"))
            .unwrap_or_default();
        format!(
            "Session started {}: {} / {} correct{} in {} mode",
            state.started_at.format("%Y-%m-%d %H:%M"),
            state.score,
            state.attempts,
            accuracy,
            self.quiz.mode
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrainerError;
    use crate::sample::{generate, SampleSpec};
    use crate::session::Phase;
    use crate::Mode;
    use assert_matches::assert_matches;

    fn trainer(mode: Mode) -> Trainer {
        let config = Config {
            mode,
            ..Config::default()
        };
        let (raw, _) = generate(&SampleSpec {
            duration_secs: 40.0,
            ..SampleSpec::default()
        })
        .unwrap();
        let dataset = Dataset::from_recording(raw, &config).unwrap();
        Trainer::new(config, dataset, Some(11)).unwrap()
    }

    #[test]
    fn starts_at_configured_window() {
        let t = trainer(Mode::Blink);
        assert_eq!(t.quiz.state.start_secs, 10.0);
        let w = t.window().unwrap();
        assert_eq!(w.len(), 450);
    }

    #[test]
    fn selection_wraps_around() {
        let mut t = trainer(Mode::EyeMovement);
        t.apply(Command::SelectPrev).unwrap();
        assert_eq!(t.selected_label(), Label::Horizontal);
        t.apply(Command::SelectNext).unwrap();
        assert_eq!(t.selected_label(), Label::Clean);
        t.apply(Command::Select(1)).unwrap();
        assert_eq!(t.selected_label(), Label::Blink);
        t.apply(Command::Select(7)).unwrap();
        assert_eq!(t.selected_label(), Label::Blink);
    }

    #[test]
    fn submit_grades_selected_option() {
        let mut t = trainer(Mode::Blink);
        let truth = t.current_truth();
        let idx = t.options().iter().position(|l| *l == truth).unwrap();
        t.apply(Command::Select(idx)).unwrap();
        t.apply(Command::Submit).unwrap();

        assert_eq!(t.quiz.state.score, 1);
        assert_eq!(t.quiz.state.attempts, 1);
        assert_eq!(t.quiz.state.phase, Phase::AnswerRevealed);
    }

    #[test]
    fn next_requires_answer_and_resets_selection() {
        let mut t = trainer(Mode::Blink);
        assert_matches!(t.apply(Command::Next), Err(TrainerError::NotAnswered));

        t.apply(Command::Select(1)).unwrap();
        t.apply(Command::Submit).unwrap();
        t.apply(Command::Next).unwrap();

        assert_eq!(t.selected, 0);
        assert_eq!(t.quiz.state.phase, Phase::AwaitingAnswer);
        assert!(t.window().is_ok());
    }

    #[test]
    fn scroll_moves_by_configured_step() {
        let mut t = trainer(Mode::Blink);
        t.apply(Command::Scroll(-1.0)).unwrap();
        assert_eq!(t.quiz.state.start_secs, 9.0);
        t.apply(Command::Scroll(2.0)).unwrap();
        assert_eq!(t.quiz.state.start_secs, 11.0);
    }

    #[test]
    fn window_longer_than_recording_is_rejected() {
        let config = Config {
            window_secs: 200.0,
            ..Config::default()
        };
        let (raw, _) = generate(&SampleSpec {
            duration_secs: 60.0,
            ..SampleSpec::default()
        })
        .unwrap();
        let dataset = Dataset::from_recording(raw, &config).unwrap();
        assert_matches!(
            Trainer::new(config, dataset, Some(1)),
            Err(TrainerError::WindowOutOfRange { duration, .. }) if duration == 200.0
        );
    }

    #[test]
    fn window_as_long_as_recording_is_allowed() {
        let config = Config {
            window_secs: 40.0,
            ..Config::default()
        };
        let (raw, _) = generate(&SampleSpec {
            duration_secs: 40.0,
            ..SampleSpec::default()
        })
        .unwrap();
        let dataset = Dataset::from_recording(raw, &config).unwrap();
        let t = Trainer::new(config, dataset, Some(1)).unwrap();
        assert_eq!(t.quiz.state.start_secs, 0.0);
        assert_eq!(t.window().unwrap().len(), 6000);
    }

    #[test]
    fn summary_reports_score() {
        let mut t = trainer(Mode::Blink);
        t.apply(Command::Submit).unwrap();
        let summary = t.summary();
        assert!(summary.contains("/ 1 correct"), "{summary}");
        assert!(summary.ends_with("in blink mode"));
    }
}
