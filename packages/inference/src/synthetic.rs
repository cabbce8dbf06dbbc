//! Synthetic crowd analysis generation.
//!
//! Stands in for ML inference: the density summary and incident list are
//! drawn from uniform random distributions. Incident count and severity
//! are tiered by the drawn overall density, with each tier using its own
//! type and location vocabulary.

use chrono::{DateTime, Utc};
use crowdwatch_crowd_models::{
    CrowdDensitySummary, DensityRegion, Incident, IncidentStatus, Severity,
};
use rand::Rng;
use uuid::Uuid;

use crate::{CrowdAnalysis, CrowdInference};

/// Fixed model confidence reported with every summary.
const CONFIDENCE: f64 = 0.92;

/// Incident vocabulary for high-density passes (`overall > 0.7`).
const HIGH_TIER_TYPES: &[&str] = &[
    "overcrowding",
    "suspicious activity",
    "restricted area violation",
    "abnormal movement",
];
const HIGH_TIER_LOCATIONS: &[&str] = &[
    "northeast corner",
    "main entrance",
    "center area",
    "west section",
    "south exit",
];

/// Incident vocabulary for medium-density passes (`0.4 < overall ≤ 0.7`).
const MEDIUM_TIER_TYPES: &[&str] = &[
    "suspicious activity",
    "unusual gathering",
    "potential security concern",
];
const MEDIUM_TIER_LOCATIONS: &[&str] = &[
    "north section",
    "east entrance",
    "perimeter area",
    "central plaza",
];

/// The synthetic inference provider.
///
/// Every analysis is independent: no state is carried between calls, and
/// the video itself is never read.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticCrowdInference;

impl CrowdInference for SyntheticCrowdInference {
    fn analyze(&self, video_id: Uuid, _file_path: &str) -> CrowdAnalysis {
        log::debug!("Running synthetic analysis for video {video_id}");
        analysis_with(Utc::now(), &mut rand::rng())
    }
}

/// Runs one full synthetic analysis pass with an explicit clock and RNG.
pub fn analysis_with(now: DateTime<Utc>, rng: &mut impl Rng) -> CrowdAnalysis {
    let people_count = rng.random_range(0..150) + 50;
    let crowd_density = density_summary_with(people_count, rng);
    let incidents = incidents_for_density(crowd_density.overall, people_count, now, rng);

    CrowdAnalysis {
        crowd_density,
        incidents,
    }
}

/// Draws a density summary around a fixed people count.
///
/// The three region rectangles are constant; only their density fields
/// are re-randomized per call. Regions and the people count are
/// generated independently of each other.
pub fn density_summary_with(people_count: u32, rng: &mut impl Rng) -> CrowdDensitySummary {
    CrowdDensitySummary {
        overall: rng.random::<f64>() * 0.8 + 0.1,
        total_people_count: people_count,
        confidence: CONFIDENCE,
        regions: vec![
            DensityRegion {
                x: 0.1,
                y: 0.2,
                width: 0.3,
                height: 0.4,
                density: rng.random::<f64>() * 0.7 + 0.2,
            },
            DensityRegion {
                x: 0.5,
                y: 0.6,
                width: 0.2,
                height: 0.3,
                density: rng.random::<f64>() * 0.8 + 0.1,
            },
            DensityRegion {
                x: 0.7,
                y: 0.1,
                width: 0.25,
                height: 0.25,
                density: rng.random::<f64>() * 0.9,
            },
        ],
    }
}

/// Generates the incident list for a given overall density.
///
/// Tiering:
/// - `overall > 0.7`: 2-4 incidents, severity via nested draws
///   (high 40% / medium 24% / low 36%), active with probability 0.7.
/// - `0.4 < overall ≤ 0.7`: 1-2 incidents, medium 30% / low 70%,
///   active with probability 0.5.
/// - `overall ≤ 0.4`: one incident with probability 0.3, severity low,
///   active with probability 0.5.
pub fn incidents_for_density(
    overall: f64,
    people_count: u32,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> Vec<Incident> {
    let mut incidents = Vec::new();

    if overall > 0.7 {
        let count = rng.random_range(0..3) + 2;
        for _ in 0..count {
            // Two independent draws, matching the observed severity
            // distribution exactly.
            let severity = if rng.random::<f64>() > 0.6 {
                Severity::High
            } else if rng.random::<f64>() > 0.4 {
                Severity::Medium
            } else {
                Severity::Low
            };
            let described_kind = pick(HIGH_TIER_TYPES, rng);
            incidents.push(Incident {
                id: Uuid::new_v4(),
                kind: pick(HIGH_TIER_TYPES, rng).to_string(),
                severity,
                status: active_with_probability(0.7, rng),
                location: pick(HIGH_TIER_LOCATIONS, rng).to_string(),
                description: format!(
                    "Potential {described_kind} detected with {people_count} people in view"
                ),
                timestamp: now,
            });
        }
    } else if overall > 0.4 {
        let count = rng.random_range(0..2) + 1;
        for _ in 0..count {
            let severity = if rng.random::<f64>() > 0.7 {
                Severity::Medium
            } else {
                Severity::Low
            };
            incidents.push(Incident {
                id: Uuid::new_v4(),
                kind: pick(MEDIUM_TIER_TYPES, rng).to_string(),
                severity,
                status: active_with_probability(0.5, rng),
                location: pick(MEDIUM_TIER_LOCATIONS, rng).to_string(),
                description: format!(
                    "Moderate concern with {people_count} people detected in the area"
                ),
                timestamp: now,
            });
        }
    } else if rng.random::<f64>() > 0.7 {
        incidents.push(Incident {
            id: Uuid::new_v4(),
            kind: "unusual activity".to_string(),
            severity: Severity::Low,
            status: active_with_probability(0.5, rng),
            location: "south perimeter".to_string(),
            description: format!(
                "Minor concern detected with {people_count} people in low-density area"
            ),
            timestamp: now,
        });
    }

    incidents
}

/// Draws an incident status that is active with the given probability.
fn active_with_probability(p: f64, rng: &mut impl Rng) -> IncidentStatus {
    if rng.random::<f64>() < p {
        IncidentStatus::Active
    } else {
        IncidentStatus::Resolved
    }
}

/// Uniformly picks one entry from a fixed slice.
fn pick<'a>(choices: &'a [&'a str], rng: &mut impl Rng) -> &'a str {
    choices[rng.random_range(0..choices.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn people_count_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            let analysis = analysis_with(Utc::now(), &mut rng);
            let count = analysis.crowd_density.total_people_count;
            assert!((50..=200).contains(&count), "people count {count}");
        }
    }

    #[test]
    fn overall_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..1000 {
            let summary = density_summary_with(100, &mut rng);
            assert!(summary.overall >= 0.1 && summary.overall <= 0.9);
            assert!((summary.confidence - CONFIDENCE).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn region_rectangles_are_fixed() {
        let mut rng = StdRng::seed_from_u64(3);
        let a = density_summary_with(100, &mut rng);
        let b = density_summary_with(100, &mut rng);
        assert_eq!(a.regions.len(), 3);
        for (ra, rb) in a.regions.iter().zip(&b.regions) {
            assert!((ra.x - rb.x).abs() < f64::EPSILON);
            assert!((ra.y - rb.y).abs() < f64::EPSILON);
            assert!((ra.width - rb.width).abs() < f64::EPSILON);
            assert!((ra.height - rb.height).abs() < f64::EPSILON);
            // Densities are re-drawn per call and normalized.
            assert!((0.0..1.0).contains(&ra.density));
        }
    }

    #[test]
    fn high_density_yields_two_to_four_incidents() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..500 {
            let incidents = incidents_for_density(0.85, 120, Utc::now(), &mut rng);
            assert!((2..=4).contains(&incidents.len()), "{}", incidents.len());
            for incident in &incidents {
                assert!(Severity::all().contains(&incident.severity));
                assert!(HIGH_TIER_TYPES.contains(&incident.kind.as_str()));
                assert!(HIGH_TIER_LOCATIONS.contains(&incident.location.as_str()));
                assert!(incident.description.contains("120 people in view"));
            }
        }
    }

    #[test]
    fn medium_density_yields_one_or_two_incidents() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..500 {
            let incidents = incidents_for_density(0.55, 80, Utc::now(), &mut rng);
            assert!((1..=2).contains(&incidents.len()));
            for incident in &incidents {
                assert!(matches!(
                    incident.severity,
                    Severity::Low | Severity::Medium
                ));
                assert!(MEDIUM_TIER_TYPES.contains(&incident.kind.as_str()));
            }
        }
    }

    #[test]
    fn low_density_yields_at_most_one_incident() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut emitted = 0u32;
        for _ in 0..500 {
            let incidents = incidents_for_density(0.2, 60, Utc::now(), &mut rng);
            assert!(incidents.len() <= 1);
            if let Some(incident) = incidents.first() {
                emitted += 1;
                assert_eq!(incident.severity, Severity::Low);
                assert_eq!(incident.kind, "unusual activity");
                assert_eq!(incident.location, "south perimeter");
            }
        }
        // Probability 0.3 per pass; 500 passes make zero emissions
        // astronomically unlikely.
        assert!(emitted > 0);
    }

    #[test]
    fn tier_boundaries_are_exclusive_above() {
        let mut rng = StdRng::seed_from_u64(7);
        // 0.7 exactly is the medium tier, 0.4 exactly the low tier.
        for _ in 0..100 {
            assert!(incidents_for_density(0.7, 100, Utc::now(), &mut rng).len() <= 2);
            assert!(incidents_for_density(0.4, 100, Utc::now(), &mut rng).len() <= 1);
        }
    }

    #[test]
    fn analysis_incidents_match_tier_of_drawn_overall() {
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..500 {
            let analysis = analysis_with(Utc::now(), &mut rng);
            let n = analysis.incidents.len();
            let overall = analysis.crowd_density.overall;
            if overall > 0.7 {
                assert!((2..=4).contains(&n));
            } else if overall > 0.4 {
                assert!((1..=2).contains(&n));
            } else {
                assert!(n <= 1);
            }
        }
    }
}
