//! Hourly crowd density time series generation.
//!
//! Models a day cycle on top of a base crowd size: busier mid-day,
//! moderately busy in the evening, quiet overnight, with uniform jitter
//! applied on top so successive series differ.

use chrono::{DateTime, Duration, Utc};
use crowdwatch_crowd_models::CrowdDensitySample;
use rand::Rng;

/// Base crowd size before the day-cycle multiplier.
const BASE_TOTAL: f64 = 400.0;

/// Base density percentage before the day-cycle multiplier.
const BASE_DENSITY: f64 = 40.0;

/// Generates an hourly density series covering the last `hours` hours.
///
/// Returns `hours + 1` samples, oldest first, spaced exactly one hour
/// apart with the final sample at the current time.
#[must_use]
pub fn generate_hourly_density(hours: u32) -> Vec<CrowdDensitySample> {
    hourly_density_with(hours, Utc::now(), &mut rand::rng())
}

/// [`generate_hourly_density`] with an explicit clock and RNG.
pub fn hourly_density_with(
    hours: u32,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> Vec<CrowdDensitySample> {
    let mut data = Vec::with_capacity(hours as usize + 1);

    for i in (0..=i64::from(hours)).rev() {
        let timestamp = now - Duration::hours(i);
        let multiplier = day_cycle_multiplier(i);

        // One jitter draw per sample, shared by total and density.
        let jitter = 0.8 + rng.random::<f64>() * 0.4;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let total = (BASE_TOTAL * multiplier * jitter).round() as u32;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let density = (BASE_DENSITY * multiplier * jitter).round() as u32;

        data.push(CrowdDensitySample {
            timestamp,
            density,
            total,
        });
    }

    data
}

/// Day-cycle multiplier for the sample `i` hours before the series end.
///
/// The nominal hour of day is `(24 - i) % 24`; series longer than a day
/// wrap into negative remainders, which land in the overnight bucket.
fn day_cycle_multiplier(i: i64) -> f64 {
    let time_of_day = (24 - i) % 24;
    if (10..=18).contains(&time_of_day) {
        1.5
    } else if (19..=22).contains(&time_of_day) {
        1.2
    } else {
        0.7
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn returns_hours_plus_one_samples() {
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(1);
        for hours in [0u32, 1, 12, 24, 48] {
            let series = hourly_density_with(hours, now, &mut rng);
            assert_eq!(series.len(), hours as usize + 1);
        }
    }

    #[test]
    fn samples_are_hourly_and_end_now() {
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(2);
        let series = hourly_density_with(12, now, &mut rng);

        for pair in series.windows(2) {
            let gap = pair[1].timestamp - pair[0].timestamp;
            assert_eq!(gap.num_milliseconds(), 3_600_000);
        }
        assert_eq!(series.last().unwrap().timestamp, now);
        assert_eq!(series.first().unwrap().timestamp, now - Duration::hours(12));
    }

    #[test]
    fn values_respect_jitter_bounds() {
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(3);
        let series = hourly_density_with(48, now, &mut rng);

        for sample in &series {
            // Extremes: 400 * 0.7 * 0.8 = 224 and 400 * 1.5 * 1.2 = 720.
            assert!((224..=720).contains(&sample.total), "total {}", sample.total);
            assert!((22..=72).contains(&sample.density), "density {}", sample.density);
        }
    }

    #[test]
    fn mid_day_hours_run_hotter_than_overnight() {
        assert!((day_cycle_multiplier(10) - 1.5).abs() < f64::EPSILON); // 14:00
        assert!((day_cycle_multiplier(4) - 1.2).abs() < f64::EPSILON); // 20:00
        assert!((day_cycle_multiplier(0) - 0.7).abs() < f64::EPSILON); // midnight wrap
        // Series longer than a day wrap into the overnight bucket.
        assert!((day_cycle_multiplier(30) - 0.7).abs() < f64::EPSILON);
    }
}
