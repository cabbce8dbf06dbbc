#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Crowd inference provider interface.
//!
//! Callers reach crowd analysis only through the [`CrowdInference`]
//! trait, so the synthetic generator shipped here can later be replaced
//! by a real model satisfying the same contract without touching the
//! call sites. [`SyntheticCrowdInference`] is the sole implementation:
//! it draws every value from a uniform random source.

pub mod synthetic;

use crowdwatch_crowd_models::{CrowdDensitySummary, Incident};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use synthetic::SyntheticCrowdInference;

/// The result of one analysis pass: a density summary plus zero or more
/// flagged incidents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrowdAnalysis {
    /// Frame-level crowd density summary.
    pub crowd_density: CrowdDensitySummary,
    /// Incidents flagged during the pass. Count and severity correlate
    /// with `crowd_density.overall`.
    pub incidents: Vec<Incident>,
}

/// A provider that turns a stored video into a crowd analysis.
pub trait CrowdInference: Send + Sync {
    /// Runs one analysis pass over the video stored at `file_path`.
    ///
    /// Stateless and synchronous: one invocation produces one complete
    /// [`CrowdAnalysis`] with no retained state between calls.
    fn analyze(&self, video_id: Uuid, file_path: &str) -> CrowdAnalysis;
}
