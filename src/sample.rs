//! Bundled sample recording.
//!
//! A seeded, synthetic stand-in for the public sample dataset: frontal,
//! lateral and central EEG plus one vertical EOG reference, with blinks and
//! horizontal saccades placed at random but reproducible times. Generated on
//! first use and cached as CSV.

use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::info;

use crate::app_dirs::AppDirs;
use crate::error::Result;
use crate::io;
use crate::recording::Recording;

/// Amplitude of an artifact on each channel, relative to its source.
struct Projection {
    name: &'static str,
    blink: f64,
    /// signed: positive on the left lateral site, negative on the right
    saccade: f64,
    alpha: f64,
}

const CHANNELS: [Projection; 7] = [
    Projection { name: "EEG 001", blink: 0.85, saccade: 0.10, alpha: 0.4 },
    Projection { name: "EEG 002", blink: 0.80, saccade: -0.10, alpha: 0.4 },
    Projection { name: "EEG 003", blink: 0.45, saccade: 0.0, alpha: 0.6 },
    Projection { name: "EEG 004", blink: 0.20, saccade: 0.50, alpha: 0.7 },
    Projection { name: "EEG 005", blink: 0.20, saccade: -0.50, alpha: 0.7 },
    Projection { name: "EEG 006", blink: 0.05, saccade: 0.0, alpha: 1.0 },
    Projection { name: "EOG 061", blink: 1.00, saccade: 0.05, alpha: 0.1 },
];

#[derive(Debug, Clone, PartialEq)]
pub struct SampleSpec {
    pub seed: u64,
    pub sfreq: f64,
    pub duration_secs: f64,
}

impl Default for SampleSpec {
    fn default() -> Self {
        Self {
            seed: 0x5eed_0061,
            sfreq: 150.0,
            duration_secs: 120.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Artifact {
    /// centre time, amplitude in µV
    Blink { centre: f64, amplitude: f64 },
    /// onset time, hold duration, signed amplitude in µV
    Saccade { onset: f64, hold: f64, amplitude: f64 },
}

const BLINK_WIDTH_SECS: f64 = 0.35;
const SACCADE_RAMP_SECS: f64 = 0.05;

impl Artifact {
    /// Blink and saccade source waveforms at time `t`.
    fn sources(&self, t: f64) -> (f64, f64) {
        match *self {
            Artifact::Blink { centre, amplitude } => {
                let half = BLINK_WIDTH_SECS / 2.0;
                let dt = t - centre;
                if dt.abs() < half {
                    (amplitude * 0.5 * (1.0 + (PI * dt / half).cos()), 0.0)
                } else {
                    (0.0, 0.0)
                }
            }
            Artifact::Saccade { onset, hold, amplitude } => {
                let rise = ((t - onset) / SACCADE_RAMP_SECS).clamp(0.0, 1.0);
                let fall = ((t - onset - hold) / SACCADE_RAMP_SECS).clamp(0.0, 1.0);
                (0.0, amplitude * (rise - fall))
            }
        }
    }
}

/// Artifact schedule for `spec`, at least 2.5 s apart.
pub fn schedule(spec: &SampleSpec, rng: &mut StdRng) -> Vec<Artifact> {
    let mut artifacts = Vec::new();
    let mut t = 1.5;
    loop {
        t += rng.gen_range(2.5..6.0);
        if t > spec.duration_secs - 1.5 {
            break;
        }
        let artifact = if rng.gen_bool(0.55) {
            Artifact::Blink {
                centre: t,
                amplitude: rng.gen_range(120.0..200.0),
            }
        } else {
            let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            Artifact::Saccade {
                onset: t,
                hold: rng.gen_range(0.4..0.9),
                amplitude: sign * rng.gen_range(60.0..100.0),
            }
        };
        artifacts.push(artifact);
    }
    artifacts
}

/// Builds the synthetic recording together with the artifacts injected into it.
pub fn generate(spec: &SampleSpec) -> Result<(Recording, Vec<Artifact>)> {
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let artifacts = schedule(spec, &mut rng);
    let n_samples = (spec.duration_secs * spec.sfreq).round() as usize;

    let mut data = Array2::<f64>::zeros((CHANNELS.len(), n_samples));
    for (ch, proj) in CHANNELS.iter().enumerate() {
        let alpha_phase = rng.gen_range(0.0..2.0 * PI);
        let theta_phase = rng.gen_range(0.0..2.0 * PI);
        for i in 0..n_samples {
            let t = i as f64 / spec.sfreq;
            let background = proj.alpha * 12.0 * (2.0 * PI * 10.0 * t + alpha_phase).sin()
                + 6.0 * (2.0 * PI * 6.0 * t + theta_phase).sin()
                + rng.gen_range(-6.0..6.0);
            let (blink, saccade) = artifacts
                .iter()
                .map(|a| a.sources(t))
                .fold((0.0, 0.0), |acc, s| (acc.0 + s.0, acc.1 + s.1));
            data[[ch, i]] = background + proj.blink * blink + proj.saccade * saccade;
        }
    }

    let ch_names = CHANNELS.iter().map(|p| p.name.to_string()).collect();
    Ok((Recording::new(spec.sfreq, ch_names, data)?, artifacts))
}

/// Cached location of the sample file, falling back to the working directory.
pub fn data_path() -> PathBuf {
    AppDirs::sample_path().unwrap_or_else(|| PathBuf::from("blinktrainer_sample_eeg.csv"))
}

/// Reads the sample from `path`, generating and caching it first when missing.
pub fn load_or_create(path: &Path) -> Result<Recording> {
    if !path.exists() {
        info!(path = %path.display(), "generating sample recording");
        let (recording, _) = generate(&SampleSpec::default())?;
        io::write_csv(&recording, path)?;
    }
    io::read_csv(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn short_spec() -> SampleSpec {
        SampleSpec {
            duration_secs: 30.0,
            ..SampleSpec::default()
        }
    }

    #[test]
    fn generation_is_reproducible() {
        let (a, events_a) = generate(&short_spec()).unwrap();
        let (b, events_b) = generate(&short_spec()).unwrap();
        assert_eq!(a.data(), b.data());
        assert_eq!(events_a, events_b);
    }

    #[test]
    fn layout_matches_default_channels() {
        let (rec, _) = generate(&short_spec()).unwrap();
        assert_eq!(rec.ch_names().len(), 7);
        assert_eq!(rec.n_samples(), 4500);
        assert!(rec.channel("EOG 061").is_ok());
        assert!(rec.channel("EEG 004").is_ok());
    }

    #[test]
    fn schedule_keeps_artifacts_apart_and_inside() {
        let spec = SampleSpec::default();
        let mut rng = StdRng::seed_from_u64(spec.seed);
        let artifacts = schedule(&spec, &mut rng);
        let starts: Vec<f64> = artifacts
            .iter()
            .map(|a| match a {
                Artifact::Blink { centre, .. } => *centre,
                Artifact::Saccade { onset, .. } => *onset,
            })
            .collect();

        assert!(starts.len() > 10);
        assert!(starts.windows(2).all(|w| w[1] - w[0] >= 2.5));
        assert!(starts.iter().all(|&t| t > 1.5 && t < spec.duration_secs - 1.5));
    }

    #[test]
    fn blink_peaks_on_eog_channel() {
        let spec = short_spec();
        let (rec, artifacts) = generate(&spec).unwrap();
        let eog = rec.channel("EOG 061").unwrap();
        for a in artifacts {
            if let Artifact::Blink { centre, amplitude } = a {
                let idx = (centre * spec.sfreq).round() as usize;
                assert!(eog[idx] > amplitude * 0.7, "blink at {centre} too small");
            }
        }
    }

    #[test]
    fn saccade_is_opposite_on_lateral_sites() {
        let probe = Artifact::Saccade {
            onset: 1.0,
            hold: 0.5,
            amplitude: 80.0,
        };
        assert_eq!(probe.sources(0.9), (0.0, 0.0));
        assert_eq!(probe.sources(1.2), (0.0, 80.0));
        assert_eq!(probe.sources(1.7), (0.0, 0.0));
        assert!(CHANNELS[3].saccade > 0.0 && CHANNELS[4].saccade < 0.0);
    }

    #[test]
    fn load_or_create_caches_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sample_eeg.csv");

        let first = load_or_create(&path).unwrap();
        assert!(path.exists());
        let second = load_or_create(&path).unwrap();

        assert_eq!(first.ch_names(), second.ch_names());
        assert_eq!(first.n_samples(), second.n_samples());
        assert!((first.sfreq() - 150.0).abs() < 1e-3);
    }
}
