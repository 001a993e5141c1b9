//! Job observability handlers.
//!
//! Thumbnail generation is durable and inspectable: clients can poll the
//! job attached to a note instead of guessing whether a pipeline ran.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use quillpad_core::{JobRepository, NoteRepository};

use crate::error::ApiError;
use crate::handlers::auth::CurrentUser;
use crate::state::AppState;

/// GET /api/v1/jobs/:id
pub async fn get_job(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let job = state
        .db
        .jobs
        .get(job_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Job not found".to_string()))?;

    // A job is visible only through a note the requester owns.
    let owned = match job.note_id {
        Some(note_id) => state
            .db
            .notes
            .fetch_owned(note_id, user.id)
            .await?
            .is_some(),
        None => false,
    };
    if !owned {
        return Err(ApiError::NotFound("Job not found".to_string()));
    }

    Ok(Json(job))
}

/// GET /api/v1/notes/:id/jobs
pub async fn note_jobs(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(note_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .notes
        .fetch_owned(note_id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    let jobs = state.db.jobs.get_for_note(note_id).await?;
    Ok(Json(serde_json::json!({ "jobs": jobs })))
}

/// GET /api/v1/jobs/stats
pub async fn job_stats(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state.db.jobs.queue_stats().await?;
    Ok(Json(stats))
}
