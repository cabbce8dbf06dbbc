//! The analyze flow: resolve a stored video, run one inference pass,
//! persist the result, and mark the record completed.
//!
//! Persistence failures are terminal per request — there is no retry
//! and no rollback of a partially written analysis. A record whose
//! status update fails after a successful analysis insert stays at
//! `processing` permanently.

use crowdwatch_database::{DbError, queries};
use crowdwatch_database_models::VideoStatus;
use crowdwatch_inference::CrowdInference;
use crowdwatch_server_models::{AnalysisResults, AnalyzeResponse};
use switchy_database::Database;
use uuid::Uuid;

/// Errors surfaced by the analyze flow.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    /// The request carried no usable video ID.
    #[error("Missing video ID")]
    MissingVideoId,

    /// The video ID did not resolve to a stored record.
    #[error("Video not found")]
    VideoNotFound,

    /// A persistence operation failed.
    #[error(transparent)]
    Database(#[from] DbError),
}

/// Runs one analysis pass for the given raw video ID.
///
/// # Errors
///
/// Returns [`AnalyzeError::MissingVideoId`] when the ID is absent or
/// blank, [`AnalyzeError::VideoNotFound`] when it does not resolve to a
/// stored record (malformed IDs resolve the same way), and
/// [`AnalyzeError::Database`] when persistence fails.
pub async fn run_analysis(
    db: &dyn Database,
    inference: &dyn CrowdInference,
    video_id: Option<&str>,
) -> Result<AnalyzeResponse, AnalyzeError> {
    let raw = video_id
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(AnalyzeError::MissingVideoId)?;

    // A malformed ID cannot match any stored record.
    let id = Uuid::parse_str(raw).map_err(|_| AnalyzeError::VideoNotFound)?;

    let video = queries::get_video(db, id)
        .await?
        .ok_or(AnalyzeError::VideoNotFound)?;

    log::info!("Processing video analysis for video {id}");

    let analysis = inference.analyze(id, &video.file_path);

    log::info!(
        "Analysis generated {} incidents with {} people counted",
        analysis.incidents.len(),
        analysis.crowd_density.total_people_count
    );

    queries::insert_analysis(db, id, &analysis.crowd_density, &analysis.incidents).await?;
    queries::set_video_status(db, id, VideoStatus::Completed).await?;

    Ok(AnalyzeResponse {
        success: true,
        message: "Video analysis complete".to_string(),
        results: AnalysisResults {
            crowd_density: analysis.crowd_density,
            incidents: analysis.incidents,
        },
    })
}
