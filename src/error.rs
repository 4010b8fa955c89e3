use thiserror::Error;

use crate::sim::DurationType;

/// Rejected configuration, reported when a builder is constructed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid physics constant `{name}`: {value}")]
    InvalidConstant { name: &'static str, value: f32 },

    #[error("track build budget must be at least one sample evaluation")]
    ZeroBudget,

    #[error("progressive track builds need a known sample count, got {0:?} duration")]
    UnsupportedDurationType(DurationType),

    #[error("invalid build duration: {0}")]
    InvalidDuration(f32),
}

/// Failure to collect the result of a background build.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("build worker panicked: {0}")]
    WorkerPanicked(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type BuildResult<T> = Result<T, BuildError>;
