//! Configuration errors.
//!
//! These are the only recoverable failures of the core. Invariant violations are
//! asserted in debug builds and clamped in release builds; they never show up here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("unknown entity template `{0}`")]
    UnknownTemplate(String),

    #[error("no boss archetype configured for this level")]
    MissingBoss,

    #[error("invalid wave {index}: {reason}")]
    InvalidWave { index: usize, reason: String },

    #[error("invalid encounter timings: {0}")]
    InvalidTimings(String),

    #[error("invalid level geometry: {0}")]
    InvalidGeometry(String),

    #[error("invalid template `{id}`: {reason}")]
    InvalidTemplate { id: String, reason: String },

    #[error("failed to parse level configuration")]
    Parse(#[from] toml::de::Error),
}
