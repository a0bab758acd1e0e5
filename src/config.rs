use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{Result, TrainerError};
use crate::events::DetectionConfig;
use crate::signal::Band;
use crate::Mode;

/// Channel names the trainer reads from the recording.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelConfig {
    /// plotted as the EEG trace
    pub frontal: Vec<String>,
    pub vertical_eog: String,
    pub lateral_left: String,
    pub lateral_right: String,
    /// name given to `lateral_left - lateral_right`
    pub horizontal_eog: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            frontal: vec!["EEG 001".into(), "EEG 002".into(), "EEG 003".into()],
            vertical_eog: "EOG 061".into(),
            lateral_left: "EEG 004".into(),
            lateral_right: "EEG 005".into(),
            horizontal_eog: "HEOG".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub mode: Mode,
    pub window_secs: f64,
    pub initial_start_secs: f64,
    pub event_snap_probability: f64,
    pub scroll_step_secs: f64,
    pub display_band: Band,
    pub display_filter_order: usize,
    pub detection: DetectionConfig,
    pub channels: ChannelConfig,
    /// CSV recording; the bundled sample is used when unset
    pub recording: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Blink,
            window_secs: 3.0,
            initial_start_secs: 10.0,
            event_snap_probability: 0.5,
            scroll_step_secs: 1.0,
            display_band: Band::new(1.0, 40.0),
            display_filter_order: 4,
            detection: DetectionConfig::default(),
            channels: ChannelConfig::default(),
            recording: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(TrainerError::InvalidConfig(msg));

        if !(self.window_secs.is_finite() && self.window_secs > 0.0) {
            return invalid(format!("window must be positive, got {}", self.window_secs));
        }
        if !(0.0..=1.0).contains(&self.event_snap_probability) {
            return invalid(format!(
                "snap probability must be within [0, 1], got {}",
                self.event_snap_probability
            ));
        }
        if !(self.scroll_step_secs > 0.0) {
            return invalid(format!(
                "scroll step must be positive, got {}",
                self.scroll_step_secs
            ));
        }
        for (what, band) in [
            ("display band", self.display_band),
            ("detection band", self.detection.band),
        ] {
            if !(band.low > 0.0 && band.low < band.high) {
                return invalid(format!("{what} {}-{} Hz is not a pass band", band.low, band.high));
            }
        }
        if self.display_filter_order == 0 || self.detection.filter_order == 0 {
            return invalid("filter order must be at least 1".into());
        }
        if !(self.detection.threshold_divisor > 0.0) {
            return invalid("threshold divisor must be positive".into());
        }
        if self.detection.min_separation_secs < 0.0 {
            return invalid("minimum event separation cannot be negative".into());
        }
        if self.channels.frontal.is_empty() {
            return invalid("at least one frontal channel is required".into());
        }
        Ok(())
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "blinktrainer") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("blinktrainer_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => warn!(path = %self.path.display(), error = %e, "ignoring unreadable config"),
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            mode: Mode::EyeMovement,
            window_secs: 5.0,
            event_snap_probability: 0.8,
            detection: DetectionConfig {
                threshold: Some(120.0),
                ..DetectionConfig::default()
            },
            recording: Some(PathBuf::from("/data/session.csv")),
            ..Config::default()
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn missing_or_corrupt_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());

        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{ "mode": "eye-movement", "window_secs": 4.0 }"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.mode, Mode::EyeMovement);
        assert_eq!(cfg.window_secs, 4.0);
        assert_eq!(cfg.event_snap_probability, 0.5);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let bad = [
            Config {
                window_secs: 0.0,
                ..Config::default()
            },
            Config {
                event_snap_probability: 1.5,
                ..Config::default()
            },
            Config {
                display_band: Band::new(40.0, 1.0),
                ..Config::default()
            },
            Config {
                channels: ChannelConfig {
                    frontal: vec![],
                    ..ChannelConfig::default()
                },
                ..Config::default()
            },
        ];
        for cfg in bad {
            assert_matches!(cfg.validate(), Err(TrainerError::InvalidConfig(_)));
        }
    }
}
