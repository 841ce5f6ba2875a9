//! A working track set paired with the DNA built from it.
//!
//! Every mutation of the track set bumps a version number. The descriptor
//! remembers the version it was built from, so scoring against a descriptor
//! that no longer matches the tracks is refused instead of silently served.
//! The session is a plain value: callers that share it across tasks wrap it
//! in a lock, and the descriptor itself is handed out as an `Arc` so scorers
//! never hold that lock.

use std::collections::BTreeSet;
use std::sync::Arc;

use log::info;
use serde::Serialize;

use algorhythm_core::{Track, Tuning};

use crate::builder::build_dna;
use crate::cohesion::{cohesion_report, CohesionReport};
use crate::descriptor::Dna;
use crate::error::{DnaError, DnaResult};
use crate::scorer::{score_track, ScoreReport};

/// Outcome of [`Session::exclude`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exclusion {
    pub excluded: Vec<Track>,
    pub excluded_count: usize,
    pub remaining_count: usize,
}

#[derive(Debug, Clone)]
pub struct Session {
    name: String,
    tracks: Vec<Track>,
    version: u64,
    dna: Option<(u64, Arc<Dna>)>,
}

impl Session {
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            name: name.into(),
            tracks,
            version: 0,
            dna: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Monotonic track-set version.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Remove the tracks at the given 1-indexed positions.
    ///
    /// All positions are checked before anything is removed, so one bad
    /// position leaves the session untouched. Repeated positions count once.
    pub fn exclude(&mut self, positions: &[usize]) -> DnaResult<Exclusion> {
        let len = self.tracks.len();
        if let Some(&position) = positions.iter().find(|&&p| p == 0 || p > len) {
            return Err(DnaError::PositionOutOfRange { position, len });
        }

        let drop: BTreeSet<usize> = positions.iter().map(|p| p - 1).collect();
        let mut excluded = Vec::with_capacity(drop.len());
        let mut kept = Vec::with_capacity(len - drop.len());
        for (index, track) in std::mem::take(&mut self.tracks).into_iter().enumerate() {
            if drop.contains(&index) {
                info!("removing #{}: {} - {}", index + 1, track.name, track.artist);
                excluded.push(track);
            } else {
                kept.push(track);
            }
        }
        self.tracks = kept;

        if !excluded.is_empty() {
            self.version += 1;
        }
        info!("[{}] remaining: {} tracks", self.name, self.tracks.len());

        Ok(Exclusion {
            excluded_count: excluded.len(),
            remaining_count: self.tracks.len(),
            excluded,
        })
    }

    /// Fit a descriptor on the current tracks and pair it with this version.
    pub fn build_dna(&mut self) -> DnaResult<Arc<Dna>> {
        let dna = Arc::new(build_dna(&self.tracks, &self.name)?);
        self.dna = Some((self.version, Arc::clone(&dna)));
        Ok(dna)
    }

    /// The descriptor for the current track set.
    pub fn dna(&self) -> DnaResult<&Arc<Dna>> {
        match &self.dna {
            None => Err(DnaError::MissingDescriptor),
            Some((built_from, _)) if *built_from != self.version => {
                Err(DnaError::StaleDescriptor {
                    built_from: *built_from,
                    current: self.version,
                })
            }
            Some((_, dna)) => Ok(dna),
        }
    }

    /// Whether a descriptor exists but was built from an older track set.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        matches!(&self.dna, Some((built_from, _)) if *built_from != self.version)
    }

    pub fn score(&self, candidate: &Track) -> DnaResult<ScoreReport> {
        score_track(candidate, self.dna()?)
    }

    pub fn report(&self, tuning: &Tuning) -> DnaResult<CohesionReport> {
        Ok(cohesion_report(self.dna()?, tuning))
    }
}

#[cfg(test)]
mod tests {
    use algorhythm_core::{AudioFeatures, FeatureVector};

    use super::*;

    fn session(n: usize) -> Session {
        let tracks = (0..n)
            .map(|i| {
                let t = i as f64;
                Track::new(
                    format!("t{i}"),
                    format!("Song {i}"),
                    "Artist",
                    AudioFeatures::from(FeatureVector::new([
                        0.5 + 0.03 * t,
                        0.6 - 0.02 * t,
                        -7.0 + 0.3 * t,
                        0.05,
                        0.2 + 0.01 * (t * 1.3).sin(),
                        0.0,
                        0.1 + 0.01 * t,
                        0.5,
                        110.0 + 2.0 * t,
                    ])),
                )
            })
            .collect();
        Session::new("Mix", tracks)
    }

    #[test]
    fn test_scoring_requires_a_descriptor() {
        let s = session(5);
        assert!(matches!(s.dna(), Err(DnaError::MissingDescriptor)));
        assert!(matches!(
            s.score(&s.tracks()[0]),
            Err(DnaError::MissingDescriptor)
        ));
        assert!(!s.is_stale());
    }

    #[test]
    fn test_exclusion_invalidates_descriptor() {
        let mut s = session(5);
        s.build_dna().unwrap();
        assert!(s.dna().is_ok());

        let out = s.exclude(&[2, 4]).unwrap();
        assert_eq!(out.excluded_count, 2);
        assert_eq!(out.remaining_count, 3);
        assert_eq!(out.excluded[0].id, "t1");
        assert_eq!(out.excluded[1].id, "t3");
        assert_eq!(s.version(), 1);
        assert!(s.is_stale());
        assert!(matches!(
            s.dna(),
            Err(DnaError::StaleDescriptor {
                built_from: 0,
                current: 1
            })
        ));

        s.build_dna().unwrap();
        assert_eq!(s.dna().unwrap().track_count(), 3);
        assert!(s.score(&s.tracks()[0]).is_ok());
    }

    #[test]
    fn test_out_of_range_rejects_whole_call() {
        let mut s = session(5);
        let err = s.exclude(&[1, 6]).unwrap_err();
        assert!(matches!(
            err,
            DnaError::PositionOutOfRange {
                position: 6,
                len: 5
            }
        ));
        assert_eq!(s.tracks().len(), 5);
        assert_eq!(s.version(), 0);

        assert!(matches!(
            s.exclude(&[0]),
            Err(DnaError::PositionOutOfRange { position: 0, .. })
        ));
    }

    #[test]
    fn test_removing_last_position_twice_is_a_range_error() {
        let mut s = session(5);
        s.exclude(&[5]).unwrap();
        assert!(matches!(
            s.exclude(&[5]),
            Err(DnaError::PositionOutOfRange {
                position: 5,
                len: 4
            })
        ));
        assert_eq!(s.tracks().len(), 4);
    }

    #[test]
    fn test_duplicate_positions_count_once() {
        let mut s = session(5);
        let out = s.exclude(&[3, 3, 3]).unwrap();
        assert_eq!(out.excluded_count, 1);
        assert_eq!(out.remaining_count, 4);
    }

    #[test]
    fn test_empty_exclusion_keeps_version() {
        let mut s = session(4);
        s.build_dna().unwrap();
        let out = s.exclude(&[]).unwrap();
        assert_eq!(out.excluded_count, 0);
        assert!(!s.is_stale());
        assert!(s.report(&Tuning::default()).is_ok());
    }

    #[test]
    fn test_failed_rebuild_keeps_stale_marker() {
        let mut s = session(4);
        s.build_dna().unwrap();
        s.exclude(&[1, 2]).unwrap();
        assert!(matches!(
            s.build_dna(),
            Err(DnaError::InsufficientSamples { count: 2, .. })
        ));
        assert!(s.is_stale());
    }
}
