//! Errors raised while building, persisting and applying a DNA descriptor.

use algorhythm_core::Feature;
use thiserror::Error;

/// Errors from the DNA pipeline and the working session.
#[derive(Debug, Error)]
pub enum DnaError {
    /// Too few tracks to fit the statistical models.
    #[error("need at least {required} tracks to build DNA, got {count}")]
    InsufficientSamples { count: usize, required: usize },

    /// A track in the sample carries a NaN or infinite feature value.
    #[error("track at position {position} has a non-finite {feature} value")]
    NonFiniteFeature { position: usize, feature: Feature },

    /// The candidate passed to the scorer carries a NaN or infinite value.
    #[error("candidate has a non-finite {feature} value")]
    NonFiniteCandidate { feature: Feature },

    /// A finite candidate still produced a non-finite composite score.
    #[error("scoring produced a non-finite composite")]
    NonFiniteScore,

    /// Scoring or reporting was requested before any DNA was built.
    #[error("no DNA has been built for this session")]
    MissingDescriptor,

    /// The track set changed after the DNA was built.
    #[error("DNA was built from track set version {built_from}, current version is {current}; rebuild first")]
    StaleDescriptor { built_from: u64, current: u64 },

    /// A 1-indexed track position outside the current track set.
    #[error("position {position} is out of range (valid: 1-{len})")]
    PositionOutOfRange { position: usize, len: usize },

    /// A descriptor could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A decoded descriptor is structurally invalid.
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),
}

/// Convenience alias for DNA results.
pub type DnaResult<T> = std::result::Result<T, DnaError>;
