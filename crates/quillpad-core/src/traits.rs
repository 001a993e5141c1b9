//! Core traits for quillpad abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use chrono::Duration;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// NOTE REPOSITORY
// =============================================================================

/// Repository for note CRUD operations.
///
/// All owned accessors take `(id, owner_id)` and apply them as a single
/// compound filter, so "does not exist" and "not owned by the requester"
/// are indistinguishable to callers.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a new note with no thumbnail; returns the store-assigned id.
    async fn insert(&self, req: CreateNoteRequest) -> Result<i64>;

    /// Fetch a note owned by the given user.
    async fn fetch_owned(&self, id: i64, owner_id: Uuid) -> Result<Option<Note>>;

    /// Fetch a note by id only. Used by trusted job handlers, which receive
    /// the note id from a queued job rather than from a client.
    async fn fetch(&self, id: i64) -> Result<Option<Note>>;

    /// List notes for a user, newest first.
    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<NoteSummary>>;

    /// Replace the editor state of an owned note. Returns false if no row
    /// matched the compound filter.
    async fn update_editor_state(
        &self,
        id: i64,
        owner_id: Uuid,
        editor_state: &JsonValue,
    ) -> Result<bool>;

    /// Set the thumbnail URL, only if none has been set yet. Returns false
    /// if no row matched (note deleted, or already has an image).
    async fn set_image_url(&self, id: i64, url: &str) -> Result<bool>;

    /// Delete an owned note. Returns false if no row matched.
    async fn delete_owned(&self, id: i64, owner_id: Uuid) -> Result<bool>;
}

// =============================================================================
// USER STORE
// =============================================================================

/// Store for accounts and the sessions that authenticate them.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create an account with a password. Fails with `Conflict` if the
    /// email is already registered.
    async fn create_account(&self, email: &str, password: &str) -> Result<User>;

    /// Verify email/password credentials. `None` for unknown email or
    /// wrong password (callers must not distinguish the two).
    async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<User>>;

    /// Find or create an account for an OAuth-asserted email.
    async fn upsert_oauth_account(&self, email: &str) -> Result<User>;

    /// Mint a session for a user; returns the opaque token for the cookie.
    async fn create_session(&self, user_id: Uuid, ttl: Duration) -> Result<String>;

    /// Resolve a session token to its user. `None` for unknown or expired
    /// tokens.
    async fn resolve_session(&self, token: &str) -> Result<Option<User>>;

    /// Delete a session by token (logout). Unknown tokens are a no-op.
    async fn delete_session(&self, token: &str) -> Result<()>;
}

// =============================================================================
// JOB REPOSITORY
// =============================================================================

/// Repository for durable job queue operations.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Queue a new job.
    async fn queue(
        &self,
        note_id: Option<i64>,
        job_type: JobType,
        priority: i32,
        payload: Option<JsonValue>,
    ) -> Result<Uuid>;

    /// Queue a job with deduplication (skip if same type+note pending or
    /// running). Returns `None` when deduplicated away.
    async fn queue_deduplicated(
        &self,
        note_id: Option<i64>,
        job_type: JobType,
        priority: i32,
        payload: Option<JsonValue>,
    ) -> Result<Option<Uuid>>;

    /// Claim the next pending job whose type is in `job_types`.
    /// An empty slice means "claim any type".
    async fn claim_next_for_types(&self, job_types: &[JobType]) -> Result<Option<Job>>;

    /// Update job progress.
    async fn update_progress(&self, job_id: Uuid, percent: i32, message: Option<&str>)
        -> Result<()>;

    /// Mark job as completed.
    async fn complete(&self, job_id: Uuid, result: Option<JsonValue>) -> Result<()>;

    /// Mark job as failed; requeues as pending while retries remain.
    async fn fail(&self, job_id: Uuid, error: &str) -> Result<()>;

    /// Get job by ID.
    async fn get(&self, job_id: Uuid) -> Result<Option<Job>>;

    /// Get all jobs for a note.
    async fn get_for_note(&self, note_id: i64) -> Result<Vec<Job>>;

    /// Get pending jobs count.
    async fn pending_count(&self) -> Result<i64>;

    /// Get queue statistics.
    async fn queue_stats(&self) -> Result<QueueStats>;
}

// =============================================================================
// GENERATIVE BACKENDS
// =============================================================================

/// Backend for text generation (LLM).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text given a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Backend for text-to-image generation.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Render an image from a textual description.
    async fn generate(&self, description: &str) -> Result<GeneratedImage>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

// =============================================================================
// OBJECT STORE
// =============================================================================

/// Store for binary objects served back to clients over HTTP.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write an object under `key`; returns its public URL.
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<String>;

    /// Delete the object at `key`, if present.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check whether an object exists at `key`.
    async fn exists(&self, key: &str) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_note_request() {
        let owner = Uuid::new_v4();
        let req = CreateNoteRequest {
            owner_id: owner,
            name: "Trip Plan".to_string(),
        };

        assert_eq!(req.owner_id, owner);
        assert_eq!(req.name, "Trip Plan");
    }

    #[test]
    fn test_trait_objects_are_usable() {
        // The narrow interfaces exist so handlers can be driven by fakes.
        fn assert_object_safe(_: Option<&dyn NoteRepository>) {}
        fn assert_store_object_safe(_: Option<&dyn ObjectStore>) {}
        fn assert_text_object_safe(_: Option<&dyn TextGenerator>) {}
        fn assert_image_object_safe(_: Option<&dyn ImageGenerator>) {}

        assert_object_safe(None);
        assert_store_object_safe(None);
        assert_text_object_safe(None);
        assert_image_object_safe(None);
    }
}
