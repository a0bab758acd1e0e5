use std::ops::Range;

use ndarray::{Array2, ArrayView1, Axis};
use tracing::debug;

use crate::error::{Result, TrainerError};
use crate::signal::{self, Band};

/// A continuous multi-channel recording held in memory for the whole session.
#[derive(Debug, Clone)]
pub struct Recording {
    sfreq: f64,
    ch_names: Vec<String>,
    /// channels x samples
    data: Array2<f64>,
}

impl Recording {
    pub fn new(sfreq: f64, ch_names: Vec<String>, data: Array2<f64>) -> Result<Self> {
        if !(sfreq.is_finite() && sfreq > 0.0) {
            return Err(TrainerError::InvalidConfig(format!(
                "sample rate must be positive, got {sfreq}"
            )));
        }
        if ch_names.len() != data.nrows() {
            return Err(TrainerError::InvalidConfig(format!(
                "{} channel names for {} channels",
                ch_names.len(),
                data.nrows()
            )));
        }
        Ok(Self {
            sfreq,
            ch_names,
            data,
        })
    }

    pub fn sfreq(&self) -> f64 {
        self.sfreq
    }

    pub fn ch_names(&self) -> &[String] {
        &self.ch_names
    }

    pub fn n_samples(&self) -> usize {
        self.data.ncols()
    }

    pub fn duration_secs(&self) -> f64 {
        self.n_samples() as f64 / self.sfreq
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn channel_index(&self, name: &str) -> Result<usize> {
        self.ch_names
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| TrainerError::UnknownChannel(name.to_string()))
    }

    pub fn channel(&self, name: &str) -> Result<ArrayView1<'_, f64>> {
        let idx = self.channel_index(name)?;
        Ok(self.data.row(idx))
    }

    /// Appends `left - right` as a new channel called `name`.
    pub fn append_difference(&mut self, name: &str, left: &str, right: &str) -> Result<()> {
        if self.ch_names.iter().any(|c| c == name) {
            return Err(TrainerError::DuplicateChannel(name.to_string()));
        }
        let derived = signal::difference(
            &self.channel(left)?.to_vec(),
            &self.channel(right)?.to_vec(),
        )?;
        self.data
            .push_row(ArrayView1::from(&derived))
            .map_err(|e| TrainerError::InvalidConfig(format!("cannot append {name}: {e}")))?;
        self.ch_names.push(name.to_string());
        debug!(%name, %left, %right, "derived channel appended");
        Ok(())
    }

    /// Returns a copy with every channel band-pass filtered.
    pub fn bandpassed(&self, order: usize, band: Band) -> Result<Self> {
        let sos = signal::design_butter_bp(order, band, self.sfreq)?;
        let mut data = self.data.clone();
        for (name, mut row) in self.ch_names.iter().zip(data.axis_iter_mut(Axis(0))) {
            let filtered = signal::bandpass(name, &row.to_vec(), &sos)?;
            row.assign(&ArrayView1::from(&filtered));
        }
        Ok(Self {
            sfreq: self.sfreq,
            ch_names: self.ch_names.clone(),
            data,
        })
    }

    /// Validates `[start, start + duration)` and borrows it as a [`Window`].
    pub fn window(&self, start_secs: f64, duration_secs: f64) -> Result<Window<'_>> {
        let out_of_range = || TrainerError::WindowOutOfRange {
            start: start_secs,
            duration: duration_secs,
            total: self.duration_secs(),
        };
        if !(start_secs >= 0.0 && duration_secs > 0.0) {
            return Err(out_of_range());
        }
        let range = sample_range(start_secs, duration_secs, self.sfreq);
        if range.end > self.n_samples() {
            return Err(out_of_range());
        }
        Ok(Window {
            recording: self,
            start_secs,
            duration_secs,
            range,
        })
    }
}

/// `[round(start * sfreq), round((start + duration) * sfreq))`
pub fn sample_range(start_secs: f64, duration_secs: f64, sfreq: f64) -> Range<usize> {
    let start = (start_secs * sfreq).round() as usize;
    let stop = ((start_secs + duration_secs) * sfreq).round() as usize;
    start..stop.max(start)
}

/// Short-lived view over a slice of a [`Recording`].
#[derive(Debug, Clone)]
pub struct Window<'a> {
    recording: &'a Recording,
    pub start_secs: f64,
    pub duration_secs: f64,
    pub range: Range<usize>,
}

impl<'a> Window<'a> {
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    pub fn end_secs(&self) -> f64 {
        self.start_secs + self.duration_secs
    }

    pub fn times(&self) -> Vec<f64> {
        let sfreq = self.recording.sfreq;
        self.range.clone().map(|i| i as f64 / sfreq).collect()
    }

    pub fn channel(&self, name: &str) -> Result<ArrayView1<'a, f64>> {
        let idx = self.recording.channel_index(name)?;
        Ok(self
            .recording
            .data
            .row(idx)
            .slice_move(ndarray::s![self.range.clone()]))
    }

    /// `(time, value)` pairs for one channel, shifted up by `offset`.
    pub fn points(&self, name: &str, offset: f64) -> Result<Vec<(f64, f64)>> {
        let channel = self.channel(name)?;
        Ok(self
            .times()
            .into_iter()
            .zip(channel.iter())
            .map(|(t, v)| (t, v + offset))
            .collect())
    }
}
