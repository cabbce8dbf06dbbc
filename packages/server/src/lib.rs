#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the crowdwatch dashboard.
//!
//! Serves the REST API for video uploads, synthetic crowd analysis, and
//! the dashboard feed, plus the static dashboard bundle. Analysis is
//! reached through the [`CrowdInference`] provider seam; the synthetic
//! implementation is wired in here.

pub mod analyze;
mod handlers;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use crowdwatch_database::{db, run_migrations};
use crowdwatch_inference::{CrowdInference, SyntheticCrowdInference};
use crowdwatch_scheduler::{FeedConfig, FeedScheduler};
use crowdwatch_storage::VideoStore;
use std::sync::Arc;
use switchy_database::Database;

/// Shared application state.
pub struct AppState {
    /// Database connection.
    pub db: Arc<dyn Database>,
    /// Video object storage.
    pub store: Arc<VideoStore>,
    /// Crowd inference provider.
    pub inference: Arc<dyn CrowdInference>,
    /// Dashboard feed scheduler.
    pub feed: Arc<FeedScheduler>,
}

/// Starts the crowdwatch API server.
///
/// Connects to the database, runs migrations, initializes video storage,
/// starts the dashboard feed scheduler, and starts the Actix-Web HTTP
/// server. This is a regular async function — the caller is responsible
/// for providing the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind
/// or encounters a runtime error.
///
/// # Panics
///
/// Panics if the database connection fails, migrations fail, or video
/// storage cannot be initialized from the environment.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    log::info!("Connecting to database...");
    let db_conn = db::connect_from_env()
        .await
        .expect("Failed to connect to database");

    log::info!("Running migrations...");
    run_migrations(db_conn.as_ref())
        .await
        .expect("Failed to run migrations");

    log::info!("Initializing video storage...");
    let store = VideoStore::from_env().expect("Failed to initialize video storage");

    log::info!("Starting dashboard feed scheduler...");
    let feed = FeedScheduler::start(FeedConfig::from_env());

    let state = web::Data::new(AppState {
        db: Arc::from(db_conn),
        store: Arc::new(store),
        inference: Arc::new(SyntheticCrowdInference),
        feed: Arc::new(feed),
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/analyze", web::post().to(handlers::analyze_video))
                    .route("/videos", web::post().to(handlers::upload_video))
                    .route("/videos", web::get().to(handlers::list_videos))
                    .route("/videos/{id}/playback", web::get().to(handlers::playback))
                    .route("/dashboard/areas", web::get().to(handlers::dashboard_areas))
                    .route("/dashboard/density", web::get().to(handlers::dashboard_density))
                    .route(
                        "/dashboard/incidents",
                        web::get().to(handlers::dashboard_incidents),
                    )
                    .route(
                        "/dashboard/snapshot",
                        web::get().to(handlers::dashboard_snapshot),
                    ),
            )
            // Serve frontend static files (production)
            .service(Files::new("/", "app/dist").index_file("index.html"))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
