use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::truth::Label;

/// Which trainer variant is running.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, ValueEnum, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Mode {
    /// two options: blink or no blink
    #[default]
    Blink,
    /// three options: clean, blink or horizontal eye movement
    EyeMovement,
}

impl Mode {
    pub fn options(&self) -> &'static [Label] {
        match self {
            Mode::Blink => &[Label::Clean, Label::Blink],
            Mode::EyeMovement => &[Label::Clean, Label::Blink, Label::Horizontal],
        }
    }

    pub fn question(&self) -> &'static str {
        match self {
            Mode::Blink => "Is there a blink in this segment?",
            Mode::EyeMovement => "Which eye-movement artifact is present?",
        }
    }

    pub fn needs_horizontal_channel(&self) -> bool {
        matches!(self, Mode::EyeMovement)
    }
}
