#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Database row types for video records and analysis results.
//!
//! These types represent the shapes of data as stored in and retrieved
//! from the `videos` and `video_analysis` tables. They are distinct from
//! the API response types in `crowdwatch_server_models`.

use chrono::{DateTime, Utc};
use crowdwatch_crowd_models::{CrowdDensitySummary, Incident};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// Processing status of a stored video record.
///
/// The only transition is `Processing → Completed`, one-way. There is no
/// `failed` terminal state: a record whose analysis write fails stays at
/// `Processing` permanently.
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
pub enum VideoStatus {
    /// Uploaded, analysis not yet persisted.
    Processing,
    /// Analysis persisted; terminal.
    Completed,
}

/// A stored reference to an uploaded video and its processing status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRow {
    /// Primary key.
    pub id: Uuid,
    /// Owning user, when known.
    pub user_id: Option<String>,
    /// Display title.
    pub title: String,
    /// Object-store key the video bytes live under.
    pub file_path: String,
    /// Processing status.
    pub status: VideoStatus,
    /// Free-form upload metadata (content type, size, ...).
    pub metadata: serde_json::Value,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a new video record.
///
/// Records always start in [`VideoStatus::Processing`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVideo {
    /// Pre-assigned primary key (doubles as the object-store key prefix).
    pub id: Uuid,
    /// Owning user, when known.
    pub user_id: Option<String>,
    /// Display title.
    pub title: String,
    /// Object-store key the video bytes live under.
    pub file_path: String,
    /// Free-form upload metadata.
    pub metadata: serde_json::Value,
}

/// A persisted analysis result associated with a video record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRow {
    /// Primary key.
    pub id: i64,
    /// The video this analysis belongs to.
    pub video_id: Uuid,
    /// Crowd density summary, stored as JSON.
    pub crowd_density: CrowdDensitySummary,
    /// Flagged incidents, stored as JSON.
    pub incidents: Vec<Incident>,
    /// When the analysis was persisted.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        assert_eq!(VideoStatus::Processing.to_string(), "processing");
        assert_eq!(
            "completed".parse::<VideoStatus>().unwrap(),
            VideoStatus::Completed
        );
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&VideoStatus::Completed).unwrap(),
            "\"completed\""
        );
    }
}
