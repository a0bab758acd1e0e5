use std::path::PathBuf;

use crate::truth::Label;
use crate::Mode;

pub type Result<T> = std::result::Result<T, TrainerError>;

#[derive(Debug, thiserror::Error)]
pub enum TrainerError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed recording {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("recording {path} is invalid: {reason}")]
    InvalidRecording { path: PathBuf, reason: String },

    #[error("channel '{0}' not found in recording")]
    UnknownChannel(String),

    #[error("channel '{0}' already exists in recording")]
    DuplicateChannel(String),

    #[error("cannot subtract signals of different lengths ({left} vs {right} samples)")]
    LengthMismatch { left: usize, right: usize },

    #[error("signal on '{channel}' is too short to filter ({len} samples, need more than {min})")]
    SignalTooShort {
        channel: String,
        len: usize,
        min: usize,
    },

    #[error("window starting at {start:.2}s lasting {duration:.2}s lies outside the recording (0-{total:.2}s)")]
    WindowOutOfRange {
        start: f64,
        duration: f64,
        total: f64,
    },

    #[error("{low}-{high} Hz is not a usable pass band at {sfreq} Hz sampling (needs 0 < low < high < {nyquist} Hz)", nyquist = .sfreq / 2.0)]
    BandAboveNyquist { low: f64, high: f64, sfreq: f64 },

    #[error("no events detected on channel '{0}'")]
    NoEvents(String),

    #[error("answer already submitted for this window")]
    AlreadyAnswered,

    #[error("submit an answer before moving to the next window")]
    NotAnswered,

    #[error("'{choice:?}' is not an option in {mode} mode")]
    ChoiceNotOffered { choice: Label, mode: Mode },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
