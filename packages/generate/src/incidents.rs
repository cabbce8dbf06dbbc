//! Synthetic recent-incident generation.
//!
//! Each field is drawn independently and uniformly from a fixed
//! enumeration. The description embeds a second, independently drawn
//! location that may differ from the record's own `location` field —
//! downstream consumers have come to rely on the observable output, so
//! the two draws are kept separate.

use chrono::{DateTime, Duration, Utc};
use crowdwatch_crowd_models::{Incident, IncidentStatus, Severity};
use rand::Rng;
use uuid::Uuid;

/// Incident categories reported by the dashboard feed.
const INCIDENT_TYPES: &[&str] = &[
    "overcrowding",
    "suspicious activity",
    "unusual behavior",
    "restricted area",
];

/// Locations incidents are flagged at.
const LOCATIONS: &[&str] = &[
    "north entrance",
    "main hall",
    "west corridor",
    "parking area",
    "south exit",
];

/// Window incidents are backdated into, in milliseconds.
const RECENT_WINDOW_MS: i64 = 3_600_000;

/// Generates `count` synthetic incidents flagged within the last hour.
#[must_use]
pub fn generate_recent_incidents(count: u32) -> Vec<Incident> {
    recent_incidents_with(count, Utc::now(), &mut rand::rng())
}

/// [`generate_recent_incidents`] with an explicit clock and RNG.
pub fn recent_incidents_with(
    count: u32,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> Vec<Incident> {
    (0..count)
        .map(|_| {
            let kind = pick(INCIDENT_TYPES, rng);
            let severity = Severity::all()[rng.random_range(0..Severity::all().len())];
            let status = if rng.random::<f64>() > 0.5 {
                IncidentStatus::Active
            } else {
                IncidentStatus::Resolved
            };
            let location = pick(LOCATIONS, rng);
            // Second independent draw; may disagree with `location`.
            let described_location = pick(LOCATIONS, rng);
            let backdate_ms = rng.random_range(0..RECENT_WINDOW_MS);

            Incident {
                id: Uuid::new_v4(),
                kind: kind.to_string(),
                severity,
                status,
                location: location.to_string(),
                description: format!("Potential incident detected in the {described_location}"),
                timestamp: now - Duration::milliseconds(backdate_ms),
            }
        })
        .collect()
}

/// Uniformly picks one entry from a fixed slice.
fn pick<'a>(choices: &'a [&'a str], rng: &mut impl Rng) -> &'a str {
    choices[rng.random_range(0..choices.len())]
}
