use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, TrainerError};
use crate::recording::Recording;
use crate::signal::{self, Band};

/// Sorted sample indices of detected artifacts on one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSet {
    pub channel: String,
    samples: Vec<usize>,
}

impl EventSet {
    pub fn new(channel: impl Into<String>, mut samples: Vec<usize>) -> Self {
        samples.sort_unstable();
        samples.dedup();
        Self {
            channel: channel.into(),
            samples,
        }
    }

    pub fn samples(&self) -> &[usize] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn times(&self, sfreq: f64) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(move |&s| s as f64 / sfreq)
    }

    /// Event times falling in `[start, start + duration)`.
    pub fn within(&self, start_secs: f64, duration_secs: f64, sfreq: f64) -> Vec<f64> {
        let end = start_secs + duration_secs;
        self.times(sfreq)
            .filter(|t| *t >= start_secs && *t < end)
            .collect()
    }

    pub fn any_within(&self, start_secs: f64, duration_secs: f64, sfreq: f64) -> bool {
        let end = start_secs + duration_secs;
        self.times(sfreq).any(|t| t >= start_secs && t < end)
    }
}

/// Tuning constants of the EOG peak heuristic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionConfig {
    pub band: Band,
    pub filter_order: usize,
    /// Absolute threshold; when unset it is `(max - min) / threshold_divisor`.
    pub threshold: Option<f64>,
    pub threshold_divisor: f64,
    pub min_separation_secs: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            band: Band::new(1.0, 10.0),
            filter_order: 4,
            threshold: None,
            threshold_divisor: 4.0,
            min_separation_secs: 0.5,
        }
    }
}

/// Filters `channel` to the detection band and returns its peaks as an [`EventSet`].
pub fn find_eog_events(
    recording: &Recording,
    channel: &str,
    config: &DetectionConfig,
) -> Result<EventSet> {
    let raw = recording.channel(channel)?.to_vec();
    let sos = signal::design_butter_bp(config.filter_order, config.band, recording.sfreq())?;
    let filtered = signal::bandpass(channel, &raw, &sos)?;

    let oriented = dominant_polarity(filtered);
    let threshold = config.threshold.unwrap_or_else(|| {
        let (min, max) = oriented
            .iter()
            .copied()
            .minmax()
            .into_option()
            .unwrap_or((0.0, 0.0));
        (max - min) / config.threshold_divisor
    });
    let min_distance = (config.min_separation_secs * recording.sfreq()).round() as usize;

    let peaks = detect_peaks(&oriented, threshold, min_distance);
    info!(
        %channel,
        events = peaks.len(),
        threshold,
        "eog events detected"
    );
    Ok(EventSet::new(channel, peaks))
}

/// Flips the signal when its largest excursion is negative.
pub fn dominant_polarity(mut samples: Vec<f64>) -> Vec<f64> {
    let (min, max) = samples
        .iter()
        .copied()
        .minmax()
        .into_option()
        .unwrap_or((0.0, 0.0));
    if min.abs() > max.abs() {
        debug!("negative polarity dominates, flipping");
        samples.iter_mut().for_each(|s| *s = -*s);
    }
    samples
}

/// Local maxima at or above `threshold`, keeping the largest peak within any
/// `min_distance` samples.
pub fn detect_peaks(samples: &[f64], threshold: f64, min_distance: usize) -> Vec<usize> {
    if samples.len() < 3 {
        return Vec::new();
    }

    let candidates = (1..samples.len() - 1)
        .filter(|&i| {
            samples[i] >= threshold && samples[i] >= samples[i - 1] && samples[i] > samples[i + 1]
        })
        .sorted_by(|&a, &b| {
            samples[b]
                .partial_cmp(&samples[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });

    let mut accepted: Vec<usize> = Vec::new();
    for idx in candidates {
        if accepted.iter().all(|&p| p.abs_diff(idx) >= min_distance) {
            accepted.push(idx);
        }
    }
    accepted.sort_unstable();
    accepted
}

/// Fails when a ground-truth channel produced nothing to quiz on.
pub fn require_events(events: EventSet) -> Result<EventSet> {
    if events.is_empty() {
        return Err(TrainerError::NoEvents(events.channel));
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use ndarray::Array2;
    use std::f64::consts::PI;

    #[test]
    fn detection_band_must_fit_sample_rate() {
        let data = Array2::from_shape_vec((1, 400), vec![0.0; 400]).unwrap();
        let rec = Recording::new(16.0, vec!["EOG 061".into()], data).unwrap();
        assert_matches!(
            find_eog_events(&rec, "EOG 061", &DetectionConfig::default()),
            Err(TrainerError::BandAboveNyquist { high, .. }) if high == 10.0
        );
    }

    #[test]
    fn event_set_is_sorted_and_unique() {
        let set = EventSet::new("EOG 061", vec![30, 10, 20, 10]);
        assert_eq!(set.samples(), &[10, 20, 30]);
    }

    #[test]
    fn event_at_12_4_seconds_matches_only_its_window() {
        let sfreq = 150.0;
        let set = EventSet::new("EOG 061", vec![(12.4 * sfreq) as usize]);
        assert!(set.any_within(12.0, 3.0, sfreq));
        assert!(!set.any_within(5.0, 3.0, sfreq));
    }

    #[test]
    fn window_is_half_open() {
        let set = EventSet::new("EOG 061", vec![300]);
        assert!(set.any_within(3.0, 1.0, 100.0));
        assert!(!set.any_within(2.0, 1.0, 100.0));
    }

    #[test]
    fn empty_set_never_matches() {
        let set = EventSet::new("EOG 061", vec![]);
        assert!(!set.any_within(0.0, 1000.0, 100.0));
        assert!(set.within(0.0, 1000.0, 100.0).is_empty());
    }

    #[test]
    fn within_returns_times_in_window() {
        let set = EventSet::new("EOG 061", vec![50, 150, 250, 350]);
        assert_eq!(set.within(1.0, 2.0, 100.0), vec![1.5, 2.5]);
    }

    #[test]
    fn detect_peaks_applies_threshold() {
        let x = [0.0, 1.0, 0.0, 5.0, 0.0, 2.0, 0.0];
        assert_eq!(detect_peaks(&x, 1.5, 1), vec![3, 5]);
        assert_eq!(detect_peaks(&x, 3.0, 1), vec![3]);
    }

    #[test]
    fn detect_peaks_keeps_largest_within_refractory() {
        let x = [0.0, 4.0, 0.0, 6.0, 0.0, 0.0, 0.0, 0.0, 3.0, 0.0];
        assert_eq!(detect_peaks(&x, 1.0, 3), vec![3, 8]);
        assert_eq!(detect_peaks(&x, 1.0, 6), vec![3]);
    }

    #[test]
    fn detect_peaks_handles_plateaus_and_short_input() {
        assert_eq!(detect_peaks(&[0.0, 2.0, 2.0, 0.0], 1.0, 1), vec![2]);
        assert!(detect_peaks(&[5.0, 5.0], 1.0, 1).is_empty());
    }

    #[test]
    fn dominant_polarity_flips_negative_signals() {
        assert_eq!(dominant_polarity(vec![1.0, -4.0, 2.0]), vec![-1.0, 4.0, -2.0]);
        assert_eq!(dominant_polarity(vec![3.0, -1.0]), vec![3.0, -1.0]);
    }

    #[test]
    fn find_eog_events_locates_blinks() {
        let sfreq = 100.0;
        let n = 2000;
        let blink_centres = [4.0, 9.5, 15.0];
        let eog: Vec<f64> = (0..n)
            .map(|i| {
                let t = i as f64 / sfreq;
                let background = 3.0 * (2.0 * PI * 7.0 * t).sin();
                let blinks: f64 = blink_centres
                    .iter()
                    .filter(|c| (t - *c).abs() < 0.15)
                    .map(|c| 150.0 * 0.5 * (1.0 + (PI * (t - c) / 0.15).cos()))
                    .sum();
                background + blinks
            })
            .collect();
        let data = Array2::from_shape_vec((1, n), eog).unwrap();
        let rec = Recording::new(sfreq, vec!["EOG 061".into()], data).unwrap();

        let events = find_eog_events(&rec, "EOG 061", &DetectionConfig::default()).unwrap();

        assert_eq!(events.len(), blink_centres.len());
        for (t, centre) in events.times(sfreq).zip(blink_centres) {
            assert!((t - centre).abs() < 0.1, "event at {t}, blink at {centre}");
        }
    }

    #[test]
    fn require_events_rejects_empty_sets() {
        assert_matches!(
            require_events(EventSet::new("HEOG", vec![])),
            Err(TrainerError::NoEvents(ch)) if ch == "HEOG"
        );
        assert!(require_events(EventSet::new("HEOG", vec![1])).is_ok());
    }
}
