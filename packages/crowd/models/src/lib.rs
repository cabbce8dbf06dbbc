#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Crowd monitoring domain types.
//!
//! This crate defines the value objects shared across the crowdwatch
//! system: area occupancy statistics, crowd density samples and summaries,
//! and flagged incidents. All of these are created fresh per generation
//! or analysis call — there is no shared mutable state and no
//! cross-entity references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// Severity level for a flagged incident.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    /// Minor concern, informational.
    Low,
    /// Moderate concern, worth operator attention.
    Medium,
    /// Serious concern, requires response.
    High,
}

impl Severity {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High]
    }
}

/// Lifecycle status of an incident.
///
/// Incidents are immutable once created — a `resolved` incident is
/// generated as already resolved, never transitioned from `active`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IncidentStatus {
    /// The incident is ongoing.
    Active,
    /// The incident has been resolved.
    Resolved,
}

/// A discrete flagged event with severity and lifecycle status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    /// Unique incident ID.
    pub id: Uuid,
    /// Free-form category string (e.g. `overcrowding`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Severity level.
    pub severity: Severity,
    /// Lifecycle status.
    pub status: IncidentStatus,
    /// Where the incident was flagged.
    pub location: String,
    /// Human-readable description.
    pub description: String,
    /// When the incident was flagged (ISO 8601 on the wire).
    pub timestamp: DateTime<Utc>,
}

/// Occupancy statistics for a single monitored area.
///
/// Recomputed on every generation call; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaStatistic {
    /// Stable area identifier.
    pub id: String,
    /// Display name of the area.
    pub name: String,
    /// Number of people currently in the area.
    pub current_count: u32,
    /// Maximum occupancy of the area.
    pub capacity: u32,
    /// Occupancy percentage, 0-100. Always derived from
    /// `current_count / capacity` — never set independently.
    pub density: u8,
    /// Number of open incidents in the area.
    pub incidents: u32,
}

impl AreaStatistic {
    /// Creates an area statistic, deriving `density` from the count and
    /// capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(id: &str, name: &str, current_count: u32, capacity: u32, incidents: u32) -> Self {
        assert!(capacity > 0, "area capacity must be positive");
        Self {
            id: id.to_string(),
            name: name.to_string(),
            current_count,
            capacity,
            density: derive_density(current_count, capacity),
            incidents,
        }
    }
}

/// Derives an occupancy percentage from a head count and capacity,
/// rounded to the nearest integer.
#[must_use]
pub fn derive_density(current_count: u32, capacity: u32) -> u8 {
    let pct = (f64::from(current_count) / f64::from(capacity) * 100.0).round();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        pct as u8
    }
}

/// One point in an hourly crowd density time series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrowdDensitySample {
    /// Hour boundary this sample covers (ISO 8601 on the wire).
    pub timestamp: DateTime<Utc>,
    /// Density percentage at this hour.
    pub density: u32,
    /// Estimated total crowd size at this hour.
    pub total: u32,
}

/// A rectangular region of the frame with its own density estimate.
///
/// Coordinates and dimensions are normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityRegion {
    /// Left edge, normalized.
    pub x: f64,
    /// Top edge, normalized.
    pub y: f64,
    /// Width, normalized.
    pub width: f64,
    /// Height, normalized.
    pub height: f64,
    /// Density estimate for this region, in `[0, 1]`.
    pub density: f64,
}

/// Crowd density summary produced by one analysis pass.
///
/// `regions` and `total_people_count` are generated independently — no
/// invariant ties them together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrowdDensitySummary {
    /// Overall density scalar in `[0.1, 0.9]`. Drives incident tiering.
    pub overall: f64,
    /// Estimated number of people in view, in `[50, 200]`.
    pub total_people_count: u32,
    /// Model confidence in the result.
    pub confidence: f64,
    /// Per-region density estimates, in a fixed order.
    pub regions: Vec<DensityRegion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn density_is_rounded_percentage() {
        assert_eq!(derive_density(100, 200), 50);
        assert_eq!(derive_density(149, 200), 75); // 74.5 rounds up
        assert_eq!(derive_density(0, 100), 0);
        assert_eq!(derive_density(100, 100), 100);
    }

    #[test]
    fn area_statistic_derives_density() {
        let area = AreaStatistic::new("1", "Main Entrance", 120, 200, 1);
        assert_eq!(area.density, 60);
        assert_eq!(area.current_count, 120);
        assert_eq!(area.capacity, 200);
    }

    #[test]
    #[should_panic(expected = "area capacity must be positive")]
    fn zero_capacity_rejected() {
        let _ = AreaStatistic::new("1", "Broken", 10, 0, 0);
    }

    #[test]
    fn severity_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Severity::High).unwrap(),
            "\"high\""
        );
        assert_eq!(Severity::Low.to_string(), "low");
        assert_eq!("medium".parse::<Severity>().unwrap(), Severity::Medium);
    }

    #[test]
    fn incident_kind_serializes_as_type() {
        let incident = Incident {
            id: Uuid::new_v4(),
            kind: "overcrowding".to_string(),
            severity: Severity::High,
            status: IncidentStatus::Active,
            location: "main hall".to_string(),
            description: "Potential incident detected in the main hall".to_string(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&incident).unwrap();
        assert_eq!(json["type"], "overcrowding");
        assert_eq!(json["status"], "active");
    }
}
