//! quillpad-api - HTTP API server for quillpad

mod error;
mod handlers;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use quillpad_core::{defaults, TextGenerator};
use quillpad_db::{Database, FilesystemStore, PgNoteRepository};
use quillpad_inference::{GeminiBackend, HfImageBackend};
use quillpad_jobs::{JobWorker, ThumbnailHandler, WorkerConfig};

use handlers::{auth, jobs, notes};
use state::{AppState, OAuthConfig};

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically — useful for
/// log correlation and debugging production incidents.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// STARTUP
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   RUST_LOG    - standard env filter (default: "quillpad_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "quillpad_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("quillpad-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false) // no ANSI in files
                        .with_writer(non_blocking),
                )
                .init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            registry.with(tracing_subscriber::fmt::layer()).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    // Get configuration from environment
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/quillpad".to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| defaults::SERVER_PORT.to_string())
        .parse()
        .unwrap_or(defaults::SERVER_PORT);
    let site_url =
        std::env::var("SITE_URL").unwrap_or_else(|_| format!("http://{}:{}", host, port));

    // Rate limiting configuration
    // RATE_LIMIT_REQUESTS: requests per period (default: 100)
    // RATE_LIMIT_PERIOD_SECS: period in seconds (default: 60)
    let rate_limit_requests: u64 = std::env::var("RATE_LIMIT_REQUESTS")
        .unwrap_or_else(|_| defaults::RATE_LIMIT_REQUESTS.to_string())
        .parse()
        .unwrap_or(defaults::RATE_LIMIT_REQUESTS);
    let rate_limit_period_secs: u64 = std::env::var("RATE_LIMIT_PERIOD_SECS")
        .unwrap_or_else(|_| defaults::RATE_LIMIT_PERIOD_SECS.to_string())
        .parse()
        .unwrap_or(defaults::RATE_LIMIT_PERIOD_SECS);
    let rate_limit_enabled: bool = std::env::var("RATE_LIMIT_ENABLED")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(true);

    info!(
        "Rate limiting: {} ({} requests per {} seconds)",
        if rate_limit_enabled {
            "enabled"
        } else {
            "disabled"
        },
        rate_limit_requests,
        rate_limit_period_secs
    );

    // Connect to database
    info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;
    info!("Database connected");

    // Run pending database migrations on startup
    info!("Running database migrations...");
    db.migrate().await?;
    info!("Database migrations complete");

    // Initialize object storage for generated thumbnails
    let file_storage_path =
        std::env::var("FILE_STORAGE_PATH").unwrap_or_else(|_| "/var/lib/quillpad/files".to_string());
    let object_store = Arc::new(FilesystemStore::new(
        &file_storage_path,
        format!("{}/files", site_url),
    ));
    if let Err(e) = object_store.validate().await {
        warn!("Object storage validation failed: {}", e);
    }
    info!("Object storage initialized at {}", file_storage_path);

    // Generative backends
    let text_backend = Arc::new(GeminiBackend::from_env());
    info!("Text backend initialized: {}", text_backend.model_name());

    // Create and start job worker
    let worker_enabled = std::env::var("WORKER_ENABLED")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(true);

    let _worker_handle = if worker_enabled {
        info!("Starting job worker...");
        let worker = JobWorker::new(db.clone(), WorkerConfig::from_env());

        worker
            .register_handler(ThumbnailHandler::new(
                Arc::new(PgNoteRepository::new(db.pool.clone())),
                Arc::new(GeminiBackend::from_env()),
                Arc::new(HfImageBackend::from_env()),
                object_store.clone(),
            ))
            .await;

        let handle = worker.start();
        info!("Job worker started");
        Some(handle)
    } else {
        info!("Job worker disabled");
        None
    };

    // OAuth provider configuration (optional)
    let oauth = OAuthConfig::from_env(&site_url);
    if oauth.is_none() {
        info!("Provider login disabled (OAUTH_CLIENT_ID not set)");
    }

    // Create rate limiter if enabled
    let rate_limiter = if rate_limit_enabled {
        let quota = Quota::with_period(std::time::Duration::from_secs(rate_limit_period_secs))
            .expect("Rate limit period must be non-zero")
            .allow_burst(
                NonZeroU32::new(rate_limit_requests as u32).expect("Rate limit must be non-zero"),
            );
        Some(Arc::new(RateLimiter::direct(quota)))
    } else {
        None
    };

    // Create app state
    let state = AppState {
        db,
        text: text_backend,
        site_url,
        oauth,
        rate_limiter,
    };

    // Build router
    let app = Router::new()
        // Health check
        .route("/health", get(health_check))
        // Stored thumbnails
        .nest_service("/files", ServeDir::new(&file_storage_path))
        // Auth
        .route("/api/v1/auth/signup", post(auth::signup))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/callback", get(auth::oauth_callback))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/user", get(auth::current_user))
        // Notebooks
        .route(
            "/api/v1/notebooks",
            post(notes::create_notebook).get(notes::list_notebooks),
        )
        .route("/api/v1/notes/summarize", post(notes::summarize_note))
        .route(
            "/api/v1/notes/:id",
            get(notes::get_note)
                .patch(notes::update_note)
                .delete(notes::delete_note),
        )
        .route("/api/v1/notes/:id/jobs", get(jobs::note_jobs))
        // Completion
        .route("/api/v1/completion", post(notes::completion))
        // Jobs
        .route("/api/v1/jobs/stats", get(jobs::job_stats))
        .route("/api/v1/jobs/:id", get(jobs::get_job))
        // Middleware
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer({
            let allowed_origins = parse_allowed_origins(&state.site_url);

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600))
        })
        .layer(RequestBodyLimitLayer::new(defaults::REQUEST_BODY_LIMIT))
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Parse allowed CORS origins from `ALLOWED_ORIGINS` (comma-separated),
/// defaulting to the deployment's own site URL.
fn parse_allowed_origins(site_url: &str) -> Vec<HeaderValue> {
    let raw = std::env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| site_url.to_string());
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}

// =============================================================================
// RATE LIMITING MIDDLEWARE
// =============================================================================

async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    // If rate limiting is disabled, pass through
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            tracing::warn!("Rate limit exceeded");
            return Err((
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "error": "rate_limit_exceeded",
                    "error_description": "Too many requests. Please wait before retrying."
                })),
            ));
        }
    }
    Ok(next.run(request).await)
}

// =============================================================================
// HEALTH CHECK
// =============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "quillpad-api",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allowed_origins_defaults_to_site_url() {
        std::env::remove_var("ALLOWED_ORIGINS");
        let origins = parse_allowed_origins("http://localhost:3000");
        assert_eq!(origins.len(), 1);
        assert_eq!(origins[0], "http://localhost:3000");
    }

    #[test]
    fn test_make_request_id_is_uuid() {
        let mut maker = MakeRequestUuidV7;
        let req = axum::http::Request::new(());
        let id = maker.make_request_id(&req).unwrap();
        let value = id.header_value().to_str().unwrap().to_string();
        assert!(Uuid::parse_str(&value).is_ok());
    }
}
