use sci_rs::signal::filter::{design::*, sosfiltfilt_dyn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainerError};

/// Pass band of a Butterworth filter, in Hz.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

impl Band {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

/// Second-order sections of a Butterworth band-pass. The band has to sit
/// strictly inside `(0, fs / 2)`.
pub fn design_butter_bp(order: usize, band: Band, fs: f64) -> Result<Vec<Sos<f64>>> {
    if !(band.low > 0.0 && band.low < band.high && band.high < fs / 2.0) {
        return Err(TrainerError::BandAboveNyquist {
            low: band.low,
            high: band.high,
            sfreq: fs,
        });
    }
    let filter = butter_dyn(
        order,
        [band.low, band.high].to_vec(),
        Some(FilterBandType::Bandpass),
        Some(false),
        Some(FilterOutputType::Sos),
        Some(fs),
    );
    match filter {
        DigitalFilter::Sos(SosFormatFilter { sos }) => Ok(sos),
        // butter_dyn honours the requested output type
        _ => unreachable!("butterworth design did not return second-order sections"),
    }
}

/// Minimum number of samples `sosfiltfilt` needs for its edge padding.
pub fn min_filter_len(sos: &[Sos<f64>]) -> usize {
    3 * (2 * sos.len() + 1)
}

/// Zero-phase band-pass of one channel.
pub fn bandpass(channel: &str, samples: &[f64], sos: &[Sos<f64>]) -> Result<Vec<f64>> {
    let min = min_filter_len(sos);
    if samples.len() <= min {
        return Err(TrainerError::SignalTooShort {
            channel: channel.to_string(),
            len: samples.len(),
            min,
        });
    }
    Ok(sosfiltfilt_dyn(samples.iter().copied(), sos))
}

/// Element-wise `left - right`, the whole of the derived-channel synthesis.
pub fn difference(left: &[f64], right: &[f64]) -> Result<Vec<f64>> {
    if left.len() != right.len() {
        return Err(TrainerError::LengthMismatch {
            left: left.len(),
            right: right.len(),
        });
    }
    Ok(left.iter().zip(right).map(|(l, r)| l - r).collect())
}
