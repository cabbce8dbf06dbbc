#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the crowdwatch server.
//!
//! These types are serialized to JSON for the REST API. They are
//! separate from the database row types to allow independent evolution
//! of the API contract.

use chrono::{DateTime, Utc};
use crowdwatch_crowd_models::{CrowdDensitySummary, Incident};
use crowdwatch_database_models::{AnalysisRow, VideoRow, VideoStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Request body for the analyze endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// ID of the stored video record to analyze.
    pub video_id: Option<String>,
}

/// Analysis payload nested in a successful analyze response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResults {
    /// Frame-level crowd density summary.
    pub crowd_density: CrowdDensitySummary,
    /// Incidents flagged during the pass.
    pub incidents: Vec<Incident>,
}

/// Successful analyze response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    /// Always `true` on the success path.
    pub success: bool,
    /// Human-readable completion message.
    pub message: String,
    /// The generated analysis.
    pub results: AnalysisResults,
}

/// Query parameters for the video upload endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadVideoParams {
    /// Display title for the video.
    pub title: String,
    /// Original file name; becomes the tail of the object-store key.
    pub file_name: String,
    /// MIME type of the uploaded bytes.
    pub content_type: Option<String>,
}

/// A persisted analysis as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAnalysis {
    /// Analysis row ID.
    pub id: i64,
    /// The video this analysis belongs to.
    pub video_id: Uuid,
    /// Crowd density summary.
    pub crowd_density: CrowdDensitySummary,
    /// Flagged incidents.
    pub incidents: Vec<Incident>,
    /// When the analysis was persisted.
    pub created_at: DateTime<Utc>,
}

impl From<AnalysisRow> for ApiAnalysis {
    fn from(row: AnalysisRow) -> Self {
        Self {
            id: row.id,
            video_id: row.video_id,
            crowd_density: row.crowd_density,
            incidents: row.incidents,
            created_at: row.created_at,
        }
    }
}

/// A video record as returned by the API, with its analysis when one
/// exists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVideo {
    /// Record ID.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Object-store key the video bytes live under.
    pub file_path: String,
    /// Processing status.
    pub status: VideoStatus,
    /// Free-form upload metadata.
    pub metadata: serde_json::Value,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// Most recent analysis, `null` while processing.
    pub analysis: Option<ApiAnalysis>,
}

impl ApiVideo {
    /// Combines a video row with its optional analysis row.
    #[must_use]
    pub fn from_rows(video: VideoRow, analysis: Option<AnalysisRow>) -> Self {
        Self {
            id: video.id,
            title: video.title,
            file_path: video.file_path,
            status: video.status,
            metadata: video.metadata,
            created_at: video.created_at,
            analysis: analysis.map(ApiAnalysis::from),
        }
    }
}

/// Presigned playback URL response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackResponse {
    /// Short-lived presigned GET URL.
    pub url: String,
}

/// Query parameters for the hourly density endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityQueryParams {
    /// Hours of history to return.
    pub hours: Option<u32>,
}

/// Query parameters for the recent incidents endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentsQueryParams {
    /// Number of incidents to return.
    pub count: Option<u32>,
}
