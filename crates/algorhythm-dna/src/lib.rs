//! Playlist DNA for algorhythm.
//!
//! Fits a statistical descriptor of a track sample (normalization,
//! mean/covariance, anomaly model, principal components, key/mode
//! tallies), scores candidates against it, and summarises how cohesive
//! the sample is. The three fitted models sit behind the [`Normalizer`],
//! [`DimReducer`] and [`AnomalyModel`] capabilities.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod builder;
pub mod cohesion;
pub mod descriptor;
pub mod error;
pub mod isolation;
pub mod linalg;
pub mod normalize;
pub mod pca;
pub mod scorer;
pub mod session;

pub use builder::{build_dna, build_dna_with, MIN_TRACKS};
pub use cohesion::{cohesion_report, CohesionReport};
pub use descriptor::{Dna, DnaDescriptor, RawStats};
pub use error::{DnaError, DnaResult};
pub use isolation::{AnomalyModel, IsolationForest, IsolationParams};
pub use normalize::{Normalizer, StandardScaler};
pub use pca::{DimReducer, Pca};
pub use scorer::{score_track, score_vector, ScoreReport, Scores, Verdict};
pub use session::{Exclusion, Session};
