// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod config;
pub mod controls;
pub mod dataset;
pub mod error;
pub mod events;
pub mod guide;
pub mod io;
pub mod logging;
pub mod mode;
pub mod quiz;
pub mod recording;
pub mod runtime;
pub mod sample;
pub mod session;
pub mod signal;
pub mod trainer;
pub mod truth;

pub use error::{Result, TrainerError};
pub use mode::Mode;
