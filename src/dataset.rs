use std::path::PathBuf;

use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::events::{find_eog_events, require_events};
use crate::recording::Recording;
use crate::truth::GroundTruth;
use crate::{io, sample};

/// Where the raw recording comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordingSource {
    /// bundled sample, cached at the given path
    Sample(PathBuf),
    Csv(PathBuf),
}

impl RecordingSource {
    pub fn from_config(config: &Config) -> Self {
        match &config.recording {
            Some(path) => RecordingSource::Csv(path.clone()),
            None => RecordingSource::Sample(sample::data_path()),
        }
    }

    pub fn read(&self) -> Result<Recording> {
        match self {
            RecordingSource::Sample(path) => sample::load_or_create(path),
            RecordingSource::Csv(path) => io::read_csv(path),
        }
    }
}

/// The filtered recording and its ground truth, loaded once per session.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub recording: Recording,
    pub truth: GroundTruth,
}

impl Dataset {
    pub fn load(config: &Config) -> Result<Self> {
        let source = RecordingSource::from_config(config);
        info!(?source, mode = %config.mode, "loading recording");
        Self::from_recording(source.read()?, config)
    }

    /// Filters `raw`, derives the horizontal channel when the mode needs it
    /// and runs event detection on the reference channels.
    pub fn from_recording(raw: Recording, config: &Config) -> Result<Self> {
        let channels = &config.channels;
        for name in &channels.frontal {
            raw.channel_index(name)?;
        }

        let mut recording = raw.bandpassed(config.display_filter_order, config.display_band)?;

        let blinks = require_events(find_eog_events(
            &recording,
            &channels.vertical_eog,
            &config.detection,
        )?)?;

        let horizontal = if config.mode.needs_horizontal_channel() {
            recording.append_difference(
                &channels.horizontal_eog,
                &channels.lateral_left,
                &channels.lateral_right,
            )?;
            Some(require_events(find_eog_events(
                &recording,
                &channels.horizontal_eog,
                &config.detection,
            )?)?)
        } else {
            None
        };

        info!(
            blinks = blinks.len(),
            horizontal = horizontal.as_ref().map(|h| h.len()),
            duration = recording.duration_secs(),
            "dataset ready"
        );
        let truth = GroundTruth::new(recording.sfreq(), blinks, horizontal);
        Ok(Self { recording, truth })
    }

    /// Channels drawn in the answer panel for `config.mode`.
    pub fn answer_channels<'a>(&self, config: &'a Config) -> Vec<&'a str> {
        let mut names = vec![config.channels.vertical_eog.as_str()];
        if self.truth.horizontal.is_some() {
            names.push(config.channels.horizontal_eog.as_str());
        }
        names
    }
}
