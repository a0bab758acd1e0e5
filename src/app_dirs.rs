use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("blinktrainer"),
            )
        } else {
            ProjectDirs::from("", "", "blinktrainer")
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("blinktrainer.log"))
    }

    /// Where the generated sample recording is cached between runs.
    pub fn sample_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "blinktrainer")
            .map(|proj_dirs| proj_dirs.cache_dir().join("sample_eeg.csv"))
    }
}
