#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Periodic dashboard feed scheduler.
//!
//! Regenerates an immutable [`DashboardSnapshot`] on a fixed interval
//! and publishes it through a watch channel. Consumers read the latest
//! snapshot without blocking the tick loop; successive ticks have no
//! ordering guarantee beyond last-write-wins on the channel. The
//! scheduler owns its own cancellation handle — dropping it or calling
//! [`FeedScheduler::stop`] cancels the background task.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use crowdwatch_crowd_models::{AreaStatistic, CrowdDensitySample, Incident};
use crowdwatch_generate::{
    generate_area_stats, generate_hourly_density, generate_recent_incidents,
};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// How the dashboard feed is shaped and how often it refreshes.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Time between snapshot regenerations.
    pub interval: Duration,
    /// Hours of density history per snapshot.
    pub density_hours: u32,
    /// Number of recent incidents per snapshot.
    pub incident_count: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            density_hours: 12,
            incident_count: 5,
        }
    }
}

impl FeedConfig {
    /// Builds a config from the environment, falling back to defaults.
    ///
    /// `FEED_INTERVAL_SECS` overrides the refresh interval.
    #[must_use]
    pub fn from_env() -> Self {
        let interval = std::env::var("FEED_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map_or_else(|| Duration::from_secs(30), Duration::from_secs);

        Self {
            interval,
            ..Self::default()
        }
    }
}

/// One immutable view of the dashboard feed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// When this snapshot was generated.
    pub generated_at: DateTime<Utc>,
    /// Occupancy statistics for all monitored areas.
    pub areas: Vec<AreaStatistic>,
    /// Hourly density series, oldest first.
    pub density: Vec<CrowdDensitySample>,
    /// Recently flagged incidents.
    pub incidents: Vec<Incident>,
}

impl DashboardSnapshot {
    /// Generates a fresh snapshot from the synthetic generators.
    #[must_use]
    pub fn generate(config: &FeedConfig) -> Self {
        Self {
            generated_at: Utc::now(),
            areas: generate_area_stats(),
            density: generate_hourly_density(config.density_hours),
            incidents: generate_recent_incidents(config.incident_count),
        }
    }
}

/// Background task regenerating dashboard snapshots on an interval.
pub struct FeedScheduler {
    handle: JoinHandle<()>,
    receiver: watch::Receiver<Arc<DashboardSnapshot>>,
}

impl FeedScheduler {
    /// Generates an initial snapshot and starts the refresh task.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn start(config: FeedConfig) -> Self {
        let initial = Arc::new(DashboardSnapshot::generate(&config));
        let (sender, receiver) = watch::channel(initial);

        log::info!(
            "Starting dashboard feed: refresh every {:?}, {} hours of density history",
            config.interval,
            config.density_hours
        );

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.interval);
            // The first tick fires immediately; skip it so the initial
            // snapshot stands for a full interval.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let snapshot = Arc::new(DashboardSnapshot::generate(&config));
                if sender.send(snapshot).is_err() {
                    break;
                }
            }
        });

        Self { handle, receiver }
    }

    /// Returns the most recently published snapshot.
    #[must_use]
    pub fn latest(&self) -> Arc<DashboardSnapshot> {
        self.receiver.borrow().clone()
    }

    /// Returns a receiver that observes future snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardSnapshot>> {
        self.receiver.clone()
    }

    /// Cancels the refresh task. Idempotent.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for FeedScheduler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_has_configured_shape() {
        let config = FeedConfig {
            interval: Duration::from_secs(30),
            density_hours: 6,
            incident_count: 3,
        };
        let snapshot = DashboardSnapshot::generate(&config);

        assert_eq!(snapshot.areas.len(), 5);
        assert_eq!(snapshot.density.len(), 7);
        assert_eq!(snapshot.incidents.len(), 3);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn scheduler_publishes_fresh_snapshots() {
        let scheduler = FeedScheduler::start(FeedConfig {
            interval: Duration::from_millis(10),
            density_hours: 1,
            incident_count: 1,
        });

        let first = scheduler.latest();
        let mut receiver = scheduler.subscribe();
        receiver.changed().await.unwrap();
        let second = scheduler.latest();

        assert!(second.generated_at >= first.generated_at);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stop_cancels_the_refresh_task() {
        let scheduler = FeedScheduler::start(FeedConfig {
            interval: Duration::from_millis(10),
            density_hours: 1,
            incident_count: 1,
        });

        let mut receiver = scheduler.subscribe();
        scheduler.stop();

        // Once the task is gone the sender is dropped and the channel
        // reports closure instead of new snapshots.
        while receiver.changed().await.is_ok() {}
        assert!(receiver.changed().await.is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn latest_is_available_immediately() {
        let scheduler = FeedScheduler::start(FeedConfig::default());
        assert_eq!(scheduler.latest().areas.len(), 5);
        scheduler.stop();
    }
}
