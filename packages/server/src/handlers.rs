//! HTTP handler functions for the crowdwatch API.

use actix_web::{HttpResponse, web};
use crowdwatch_database::queries;
use crowdwatch_database_models::NewVideo;
use crowdwatch_generate::{
    generate_area_stats, generate_hourly_density, generate_recent_incidents,
};
use crowdwatch_server_models::{
    AnalyzeRequest, ApiHealth, ApiVideo, DensityQueryParams, IncidentsQueryParams,
    PlaybackResponse, UploadVideoParams,
};
use uuid::Uuid;

use crate::AppState;
use crate::analyze::{AnalyzeError, run_analysis};

/// Hours of density history returned when the query does not say.
const DEFAULT_DENSITY_HOURS: u32 = 12;

/// Upper bound on requested density history (one week).
const MAX_DENSITY_HOURS: u32 = 168;

/// Incidents returned when the query does not say.
const DEFAULT_INCIDENT_COUNT: u32 = 5;

/// Upper bound on requested incidents.
const MAX_INCIDENT_COUNT: u32 = 50;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /api/analyze`
///
/// Runs one synthetic analysis pass for a stored video, persists the
/// result, and marks the record completed.
pub async fn analyze_video(
    state: web::Data<AppState>,
    body: web::Json<AnalyzeRequest>,
) -> HttpResponse {
    match run_analysis(
        state.db.as_ref(),
        state.inference.as_ref(),
        body.video_id.as_deref(),
    )
    .await
    {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e @ AnalyzeError::MissingVideoId) => {
            HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
        }
        Err(e @ AnalyzeError::VideoNotFound) => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": e.to_string() }))
        }
        Err(AnalyzeError::Database(e)) => {
            log::error!("Failed to persist analysis: {e}");
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": e.to_string() }))
        }
    }
}

/// `POST /api/videos`
///
/// Uploads the raw request body to object storage and inserts a video
/// record in the `processing` state.
pub async fn upload_video(
    state: web::Data<AppState>,
    params: web::Query<UploadVideoParams>,
    body: web::Bytes,
) -> HttpResponse {
    if params.title.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": "Missing title" }));
    }
    if body.is_empty() {
        return HttpResponse::BadRequest()
            .json(serde_json::json!({ "error": "Missing video data" }));
    }

    let id = Uuid::new_v4();
    let key = crowdwatch_storage::video_key(id, &params.file_name);
    let content_type = params
        .content_type
        .clone()
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let metadata = serde_json::json!({
        "fileName": params.file_name,
        "contentType": content_type,
        "size": body.len(),
    });

    if let Err(e) = state.store.upload(&key, body.to_vec(), &content_type).await {
        log::error!("Failed to upload video: {e}");
        return HttpResponse::InternalServerError()
            .json(serde_json::json!({ "error": e.to_string() }));
    }

    let new = NewVideo {
        id,
        user_id: None,
        title: params.title.clone(),
        file_path: key,
        metadata,
    };

    match queries::insert_video(state.db.as_ref(), &new).await {
        Ok(row) => HttpResponse::Ok().json(ApiVideo::from_rows(row, None)),
        Err(e) => {
            log::error!("Failed to insert video record: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() }))
        }
    }
}

/// `GET /api/videos`
///
/// Lists video records newest first, each with its analysis when one
/// exists.
pub async fn list_videos(state: web::Data<AppState>) -> HttpResponse {
    let rows = match queries::list_videos(state.db.as_ref()).await {
        Ok(rows) => rows,
        Err(e) => {
            log::error!("Failed to list videos: {e}");
            return HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": e.to_string() }));
        }
    };

    let mut videos = Vec::with_capacity(rows.len());
    for row in rows {
        // A record without an analysis is still listed, with `null`.
        match queries::get_analysis(state.db.as_ref(), row.id).await {
            Ok(analysis) => videos.push(ApiVideo::from_rows(row, analysis)),
            Err(e) => {
                log::error!("Failed to fetch analysis for video {}: {e}", row.id);
                return HttpResponse::InternalServerError()
                    .json(serde_json::json!({ "error": e.to_string() }));
            }
        }
    }

    HttpResponse::Ok().json(videos)
}

/// `GET /api/videos/{id}/playback`
///
/// Returns a short-lived presigned URL for streaming the stored video.
pub async fn playback(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let Ok(id) = Uuid::parse_str(&path.into_inner()) else {
        return HttpResponse::NotFound().json(serde_json::json!({ "error": "Video not found" }));
    };

    let video = match queries::get_video(state.db.as_ref(), id).await {
        Ok(Some(video)) => video,
        Ok(None) => {
            return HttpResponse::NotFound()
                .json(serde_json::json!({ "error": "Video not found" }));
        }
        Err(e) => {
            log::error!("Failed to fetch video {id}: {e}");
            return HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": e.to_string() }));
        }
    };

    match state.store.presigned_playback_url(&video.file_path).await {
        Ok(url) => HttpResponse::Ok().json(PlaybackResponse { url }),
        Err(e) => {
            log::error!("Failed to presign playback URL for video {id}: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() }))
        }
    }
}

/// `GET /api/dashboard/areas`
pub async fn dashboard_areas() -> HttpResponse {
    HttpResponse::Ok().json(generate_area_stats())
}

/// `GET /api/dashboard/density`
pub async fn dashboard_density(params: web::Query<DensityQueryParams>) -> HttpResponse {
    HttpResponse::Ok().json(generate_hourly_density(density_hours(&params)))
}

/// `GET /api/dashboard/incidents`
pub async fn dashboard_incidents(params: web::Query<IncidentsQueryParams>) -> HttpResponse {
    HttpResponse::Ok().json(generate_recent_incidents(incident_count(&params)))
}

/// `GET /api/dashboard/snapshot`
///
/// Returns the latest scheduler-produced snapshot without regenerating.
pub async fn dashboard_snapshot(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(&*state.feed.latest())
}

/// Resolves the density history length, clamped to a week.
fn density_hours(params: &DensityQueryParams) -> u32 {
    params.hours.unwrap_or(DEFAULT_DENSITY_HOURS).min(MAX_DENSITY_HOURS)
}

/// Resolves the incident count, clamped.
fn incident_count(params: &IncidentsQueryParams) -> u32 {
    params
        .count
        .unwrap_or(DEFAULT_INCIDENT_COUNT)
        .min(MAX_INCIDENT_COUNT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn density_hours_defaults_and_clamps() {
        assert_eq!(density_hours(&DensityQueryParams { hours: None }), 12);
        assert_eq!(density_hours(&DensityQueryParams { hours: Some(24) }), 24);
        assert_eq!(density_hours(&DensityQueryParams { hours: Some(0) }), 0);
        assert_eq!(density_hours(&DensityQueryParams { hours: Some(9999) }), 168);
    }

    #[test]
    fn incident_count_defaults_and_clamps() {
        assert_eq!(incident_count(&IncidentsQueryParams { count: None }), 5);
        assert_eq!(incident_count(&IncidentsQueryParams { count: Some(10) }), 10);
        assert_eq!(incident_count(&IncidentsQueryParams { count: Some(500) }), 50);
    }
}
