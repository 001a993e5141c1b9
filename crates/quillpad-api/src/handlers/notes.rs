//! Notebook and note handlers: creation, reads, edits, summarization, and
//! text completion.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{error, info};

use quillpad_core::{
    defaults, extract_text, CreateNoteRequest, JobRepository, JobType, NoteRepository,
};
use quillpad_inference::prompts::{completion_prompt, summarize_prompt};

use crate::error::ApiError;
use crate::handlers::auth::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateNotebookBody {
    name: Option<String>,
}

/// POST /api/v1/notebooks
///
/// Inserts the note synchronously, then queues the thumbnail job. The
/// response only depends on the insert; the pipeline runs on the worker.
pub async fn create_notebook(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateNotebookBody>,
) -> Result<impl IntoResponse, ApiError> {
    let name = body.name.unwrap_or_default().trim().to_string();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }

    let note_id = state
        .db
        .notes
        .insert(CreateNoteRequest {
            owner_id: user.id,
            name,
        })
        .await?;

    // The note is committed; a queue failure degrades to "no thumbnail",
    // never to a failed creation.
    match state
        .db
        .jobs
        .queue_deduplicated(
            Some(note_id),
            JobType::Thumbnail,
            JobType::Thumbnail.default_priority(),
            None,
        )
        .await
    {
        Ok(Some(job_id)) => {
            info!(note_id, job_id = %job_id, "Thumbnail job queued");
        }
        Ok(None) => {}
        Err(e) => {
            error!(note_id, error = %e, "Failed to queue thumbnail job");
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "note_id": note_id })),
    ))
}

/// GET /api/v1/notebooks
pub async fn list_notebooks(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let notes = state.db.notes.list_for_owner(user.id).await?;
    Ok(Json(serde_json::json!({ "notes": notes })))
}

/// GET /api/v1/notes/:id
pub async fn get_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(note_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state
        .db
        .notes
        .fetch_owned(note_id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    Ok(Json(note))
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteBody {
    editor_state: Option<JsonValue>,
}

/// PATCH /api/v1/notes/:id
pub async fn update_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(note_id): Path<i64>,
    Json(body): Json<UpdateNoteBody>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(editor_state) = body.editor_state else {
        return Err(ApiError::BadRequest("editor_state is required".to_string()));
    };

    let updated = state
        .db
        .notes
        .update_editor_state(note_id, user.id, &editor_state)
        .await?;
    if !updated {
        return Err(ApiError::NotFound("Note not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "success": true })))
}

/// DELETE /api/v1/notes/:id
pub async fn delete_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(note_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state.db.notes.delete_owned(note_id, user.id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Note not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct SummarizeBody {
    note_id: Option<i64>,
    editor_state: Option<String>,
}

/// POST /api/v1/notes/summarize
///
/// Pure read + one synchronous text-generation call; no state mutation.
pub async fn summarize_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<SummarizeBody>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(note_id), Some(editor_state)) = (body.note_id, body.editor_state) else {
        return Err(ApiError::BadRequest(
            "note_id and editor_state are required".to_string(),
        ));
    };

    // Ownership check first: absent and not-owned are indistinguishable.
    state
        .db
        .notes
        .fetch_owned(note_id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    let document: JsonValue = serde_json::from_str(&editor_state)
        .map_err(|_| ApiError::BadRequest("Invalid editor_state format".to_string()))?;

    let text = extract_text(&document);
    if too_short_to_summarize(&text) {
        return Err(ApiError::BadRequest(format!(
            "Note content is too short for summarization (minimum {} characters)",
            defaults::SUMMARY_MIN_CHARS
        )));
    }

    let summary = state.text.generate(&summarize_prompt(text.trim())).await?;

    Ok(Json(serde_json::json!({ "summary": summary })))
}

/// True when the trimmed extracted text is below the summarization minimum.
/// Checked before the text backend is ever called.
fn too_short_to_summarize(text: &str) -> bool {
    text.trim().chars().count() < defaults::SUMMARY_MIN_CHARS
}

#[derive(Debug, Deserialize)]
pub struct CompletionBody {
    prompt: Option<String>,
}

/// POST /api/v1/completion
pub async fn completion(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Json(body): Json<CompletionBody>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(prompt) = body.prompt else {
        return Err(ApiError::BadRequest("prompt is required".to_string()));
    };

    let completion = state.text.generate(&completion_prompt(&prompt)).await?;

    Ok(Json(serde_json::json!({ "completion": completion })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_threshold_boundary() {
        let at_threshold = "x".repeat(defaults::SUMMARY_MIN_CHARS);
        let below_threshold = "x".repeat(defaults::SUMMARY_MIN_CHARS - 1);

        assert!(!too_short_to_summarize(&at_threshold));
        assert!(too_short_to_summarize(&below_threshold));
    }

    #[test]
    fn test_summary_threshold_ignores_surrounding_whitespace() {
        let padded = format!("   {}   ", "x".repeat(defaults::SUMMARY_MIN_CHARS - 1));
        assert!(too_short_to_summarize(&padded));
    }

    #[test]
    fn test_summary_threshold_counts_characters_not_bytes() {
        // Multi-byte characters still count one each.
        let text = "é".repeat(defaults::SUMMARY_MIN_CHARS);
        assert!(!too_short_to_summarize(&text));
    }
}
