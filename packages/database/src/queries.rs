//! Database query functions for video records and analysis results.
//!
//! JSON payloads (upload metadata, density summaries, incident lists)
//! are stored as serialized text columns; timestamps are stored as
//! RFC 3339 text so the same statements run on both supported backends.

use chrono::{DateTime, Utc};
use crowdwatch_crowd_models::{CrowdDensitySummary, Incident};
use crowdwatch_database_models::{AnalysisRow, NewVideo, VideoRow, VideoStatus};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};
use uuid::Uuid;

use crate::DbError;

/// Inserts a new video record in the `processing` state.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails or the metadata
/// cannot be serialized.
pub async fn insert_video(db: &dyn Database, video: &NewVideo) -> Result<VideoRow, DbError> {
    let created_at = Utc::now();
    let metadata = serde_json::to_string(&video.metadata).map_err(|e| DbError::Conversion {
        message: format!("Failed to serialize video metadata: {e}"),
    })?;

    db.exec_raw_params(
        "INSERT INTO videos (id, user_id, title, file_path, status, metadata, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
        &[
            DatabaseValue::String(video.id.to_string()),
            video
                .user_id
                .as_ref()
                .map_or(DatabaseValue::Null, |u| DatabaseValue::String(u.clone())),
            DatabaseValue::String(video.title.clone()),
            DatabaseValue::String(video.file_path.clone()),
            DatabaseValue::String(VideoStatus::Processing.to_string()),
            DatabaseValue::String(metadata),
            DatabaseValue::String(created_at.to_rfc3339()),
        ],
    )
    .await?;

    Ok(VideoRow {
        id: video.id,
        user_id: video.user_id.clone(),
        title: video.title.clone(),
        file_path: video.file_path.clone(),
        status: VideoStatus::Processing,
        metadata: video.metadata.clone(),
        created_at,
    })
}

/// Fetches a single video record by ID.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails or a stored row
/// cannot be converted.
pub async fn get_video(db: &dyn Database, id: Uuid) -> Result<Option<VideoRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, user_id, title, file_path, status, metadata, created_at
             FROM videos WHERE id = $1",
            &[DatabaseValue::String(id.to_string())],
        )
        .await?;

    rows.first().map(map_video_row).transpose()
}

/// Lists all video records, newest first.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails or a stored row
/// cannot be converted.
pub async fn list_videos(db: &dyn Database) -> Result<Vec<VideoRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, user_id, title, file_path, status, metadata, created_at
             FROM videos ORDER BY created_at DESC",
            &[],
        )
        .await?;

    rows.iter().map(map_video_row).collect()
}

/// Sets the status of a video record, returning the number of rows
/// affected (zero when the ID is unknown).
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn set_video_status(
    db: &dyn Database,
    id: Uuid,
    status: VideoStatus,
) -> Result<u64, DbError> {
    let affected = db
        .exec_raw_params(
            "UPDATE videos SET status = $2 WHERE id = $1",
            &[
                DatabaseValue::String(id.to_string()),
                DatabaseValue::String(status.to_string()),
            ],
        )
        .await?;

    Ok(affected)
}

/// Inserts one analysis row for a video.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails or a payload
/// cannot be serialized.
pub async fn insert_analysis(
    db: &dyn Database,
    video_id: Uuid,
    crowd_density: &CrowdDensitySummary,
    incidents: &[Incident],
) -> Result<(), DbError> {
    let crowd_density = serde_json::to_string(crowd_density).map_err(|e| DbError::Conversion {
        message: format!("Failed to serialize crowd density: {e}"),
    })?;
    let incidents = serde_json::to_string(incidents).map_err(|e| DbError::Conversion {
        message: format!("Failed to serialize incidents: {e}"),
    })?;

    db.exec_raw_params(
        "INSERT INTO video_analysis (video_id, crowd_density, incidents, created_at)
         VALUES ($1, $2, $3, $4)",
        &[
            DatabaseValue::String(video_id.to_string()),
            DatabaseValue::String(crowd_density),
            DatabaseValue::String(incidents),
            DatabaseValue::String(Utc::now().to_rfc3339()),
        ],
    )
    .await?;

    Ok(())
}

/// Fetches the most recent analysis for a video, if one exists.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails or a stored row
/// cannot be converted.
pub async fn get_analysis(db: &dyn Database, video_id: Uuid) -> Result<Option<AnalysisRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, video_id, crowd_density, incidents, created_at
             FROM video_analysis WHERE video_id = $1
             ORDER BY id DESC LIMIT 1",
            &[DatabaseValue::String(video_id.to_string())],
        )
        .await?;

    rows.first().map(map_analysis_row).transpose()
}

/// Converts a `videos` row into a [`VideoRow`].
fn map_video_row(row: &switchy_database::Row) -> Result<VideoRow, DbError> {
    let id: String = row.to_value("id").map_err(|e| DbError::Conversion {
        message: format!("Failed to read video id: {e}"),
    })?;
    let id = Uuid::parse_str(&id).map_err(|e| DbError::Conversion {
        message: format!("Invalid video id {id}: {e}"),
    })?;

    let status: String = row.to_value("status").map_err(|e| DbError::Conversion {
        message: format!("Failed to read video status: {e}"),
    })?;
    let status = status.parse::<VideoStatus>().map_err(|_| DbError::Conversion {
        message: format!("Unknown video status: {status}"),
    })?;

    let metadata: String = row.to_value("metadata").unwrap_or_else(|_| "{}".to_string());
    let metadata =
        serde_json::from_str(&metadata).unwrap_or_else(|_| serde_json::Value::Object(serde_json::Map::new()));

    Ok(VideoRow {
        id,
        user_id: row.to_value("user_id").unwrap_or(None),
        title: row.to_value("title").unwrap_or_default(),
        file_path: row.to_value("file_path").unwrap_or_default(),
        status,
        metadata,
        created_at: parse_timestamp(row, "created_at")?,
    })
}

/// Converts a `video_analysis` row into an [`AnalysisRow`].
fn map_analysis_row(row: &switchy_database::Row) -> Result<AnalysisRow, DbError> {
    let video_id: String = row.to_value("video_id").map_err(|e| DbError::Conversion {
        message: format!("Failed to read analysis video_id: {e}"),
    })?;
    let video_id = Uuid::parse_str(&video_id).map_err(|e| DbError::Conversion {
        message: format!("Invalid analysis video_id {video_id}: {e}"),
    })?;

    let crowd_density: String = row.to_value("crowd_density").map_err(|e| DbError::Conversion {
        message: format!("Failed to read crowd density: {e}"),
    })?;
    let crowd_density =
        serde_json::from_str(&crowd_density).map_err(|e| DbError::Conversion {
            message: format!("Invalid crowd density payload: {e}"),
        })?;

    let incidents: String = row.to_value("incidents").map_err(|e| DbError::Conversion {
        message: format!("Failed to read incidents: {e}"),
    })?;
    let incidents = serde_json::from_str(&incidents).map_err(|e| DbError::Conversion {
        message: format!("Invalid incidents payload: {e}"),
    })?;

    Ok(AnalysisRow {
        id: row.to_value("id").unwrap_or(0),
        video_id,
        crowd_density,
        incidents,
        created_at: parse_timestamp(row, "created_at")?,
    })
}

/// Reads an RFC 3339 text column into a UTC timestamp.
fn parse_timestamp(row: &switchy_database::Row, column: &str) -> Result<DateTime<Utc>, DbError> {
    let raw: String = row.to_value(column).map_err(|e| DbError::Conversion {
        message: format!("Failed to read {column}: {e}"),
    })?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::Conversion {
            message: format!("Invalid {column} timestamp {raw}: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowdwatch_crowd_models::{DensityRegion, IncidentStatus, Severity};
    use switchy_database_connection::init_sqlite_rusqlite;

    async fn test_db() -> Box<dyn Database> {
        let db = init_sqlite_rusqlite(None).expect("Failed to open in-memory SQLite");

        db.exec_raw(
            "CREATE TABLE videos (
                id TEXT PRIMARY KEY,
                user_id TEXT,
                title TEXT NOT NULL,
                file_path TEXT NOT NULL,
                status TEXT NOT NULL,
                metadata TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .await
        .unwrap();

        db.exec_raw(
            "CREATE TABLE video_analysis (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                video_id TEXT NOT NULL,
                crowd_density TEXT NOT NULL,
                incidents TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .await
        .unwrap();

        db
    }

    fn sample_video() -> NewVideo {
        NewVideo {
            id: Uuid::new_v4(),
            user_id: Some("user-1".to_string()),
            title: "Lobby cam".to_string(),
            file_path: "videos/lobby.mp4".to_string(),
            metadata: serde_json::json!({"contentType": "video/mp4", "size": 1024}),
        }
    }

    fn sample_summary() -> CrowdDensitySummary {
        CrowdDensitySummary {
            overall: 0.75,
            total_people_count: 132,
            confidence: 0.92,
            regions: vec![DensityRegion {
                x: 0.1,
                y: 0.2,
                width: 0.3,
                height: 0.4,
                density: 0.5,
            }],
        }
    }

    fn sample_incident() -> Incident {
        Incident {
            id: Uuid::new_v4(),
            kind: "overcrowding".to_string(),
            severity: Severity::High,
            status: IncidentStatus::Active,
            location: "main entrance".to_string(),
            description: "Potential overcrowding detected with 132 people in view".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let db = test_db().await;
        let new = sample_video();

        let inserted = insert_video(db.as_ref(), &new).await.unwrap();
        assert_eq!(inserted.status, VideoStatus::Processing);

        let fetched = get_video(db.as_ref(), new.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, new.id);
        assert_eq!(fetched.title, "Lobby cam");
        assert_eq!(fetched.status, VideoStatus::Processing);
        assert_eq!(fetched.metadata["contentType"], "video/mp4");
    }

    #[tokio::test]
    async fn get_unknown_video_returns_none() {
        let db = test_db().await;
        let found = get_video(db.as_ref(), Uuid::new_v4()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let db = test_db().await;
        for _ in 0..3 {
            insert_video(db.as_ref(), &sample_video()).await.unwrap();
        }

        let listed = list_videos(db.as_ref()).await.unwrap();
        assert_eq!(listed.len(), 3);
        for pair in listed.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[tokio::test]
    async fn status_transition_persists() {
        let db = test_db().await;
        let new = sample_video();
        insert_video(db.as_ref(), &new).await.unwrap();

        let affected = set_video_status(db.as_ref(), new.id, VideoStatus::Completed)
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let fetched = get_video(db.as_ref(), new.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, VideoStatus::Completed);
    }

    #[tokio::test]
    async fn status_update_for_unknown_id_affects_nothing() {
        let db = test_db().await;
        let affected = set_video_status(db.as_ref(), Uuid::new_v4(), VideoStatus::Completed)
            .await
            .unwrap();
        assert_eq!(affected, 0);
    }

    #[tokio::test]
    async fn analysis_round_trips_json_payloads() {
        let db = test_db().await;
        let new = sample_video();
        insert_video(db.as_ref(), &new).await.unwrap();

        let summary = sample_summary();
        let incidents = vec![sample_incident(), sample_incident()];
        insert_analysis(db.as_ref(), new.id, &summary, &incidents)
            .await
            .unwrap();

        let fetched = get_analysis(db.as_ref(), new.id).await.unwrap().unwrap();
        assert_eq!(fetched.video_id, new.id);
        assert_eq!(fetched.crowd_density, summary);
        assert_eq!(fetched.incidents, incidents);
    }

    #[tokio::test]
    async fn missing_analysis_returns_none() {
        let db = test_db().await;
        let new = sample_video();
        insert_video(db.as_ref(), &new).await.unwrap();

        let found = get_analysis(db.as_ref(), new.id).await.unwrap();
        assert!(found.is_none());
    }
}
