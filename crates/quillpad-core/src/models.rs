//! Core data models for quillpad.
//!
//! These types are shared across all quillpad crates and represent the
//! core domain entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

// =============================================================================
// NOTE TYPES
// =============================================================================

/// A notebook note with its optional AI-generated thumbnail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    /// Identifier of the user who created the note; immutable.
    pub owner_id: Uuid,
    pub name: String,
    /// Public URL of the generated thumbnail; `None` until the pipeline
    /// succeeds, and permanently `None` if it never does.
    pub image_url: Option<String>,
    /// Serialized rich-editor document tree. Mutated only by the editing
    /// surface, never by the creation or summarization workflows.
    pub editor_state: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lightweight note view for dashboard listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteSummary {
    pub id: i64,
    pub name: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request for creating a new note.
#[derive(Debug, Clone)]
pub struct CreateNoteRequest {
    pub owner_id: Uuid,
    pub name: String,
}

// =============================================================================
// USER TYPES
// =============================================================================

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// JOB TYPES
// =============================================================================

/// Status of a job in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Type of job to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    /// Generate a thumbnail image for a note and store its public URL.
    Thumbnail,
}

impl JobType {
    /// Default priority for this job type (higher = more urgent)
    pub fn default_priority(&self) -> i32 {
        match self {
            JobType::Thumbnail => 5,
        }
    }
}

/// A job in the processing queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub note_id: Option<i64>,
    pub job_type: JobType,
    pub status: JobStatus,
    pub priority: i32,
    pub payload: Option<JsonValue>,
    pub result: Option<JsonValue>,
    pub error_message: Option<String>,
    pub progress_percent: i32,
    pub progress_message: Option<String>,
    pub retry_count: i32,
    pub max_retries: i32,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Queue statistics summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueStats {
    pub pending: i64,
    pub running: i64,
    pub completed_last_hour: i64,
    pub failed_last_hour: i64,
    pub total: i64,
}

// =============================================================================
// INFERENCE TYPES
// =============================================================================

/// Bytes produced by an image generator, with their MIME type.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_note_serialization_round_trip() {
        let note = Note {
            id: 7,
            owner_id: Uuid::new_v4(),
            name: "Trip Plan".to_string(),
            image_url: None,
            editor_state: Some(json!({"content": [{"text": "hello"}]})),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let encoded = serde_json::to_string(&note).unwrap();
        let decoded: Note = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.id, 7);
        assert_eq!(decoded.name, "Trip Plan");
        assert!(decoded.image_url.is_none());
    }

    #[test]
    fn test_job_status_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&JobStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&JobStatus::Running).unwrap(),
            "\"running\""
        );
        assert_eq!(
            serde_json::to_string(&JobStatus::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(
            serde_json::to_string(&JobStatus::Failed).unwrap(),
            "\"failed\""
        );
    }

    #[test]
    fn test_job_type_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&JobType::Thumbnail).unwrap(),
            "\"thumbnail\""
        );
    }

    #[test]
    fn test_job_type_default_priority() {
        assert_eq!(JobType::Thumbnail.default_priority(), 5);
    }

    #[test]
    fn test_queue_stats_serialization() {
        let stats = QueueStats {
            pending: 2,
            running: 1,
            completed_last_hour: 10,
            failed_last_hour: 0,
            total: 13,
        };

        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"pending\":2"));
        assert!(json.contains("\"total\":13"));
    }

    #[test]
    fn test_user_does_not_expose_password() {
        let user = User {
            id: Uuid::new_v4(),
            email: "alice@example.com".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password"));
    }
}
