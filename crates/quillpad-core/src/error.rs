//! Error types for quillpad.

use thiserror::Error;

/// Result type alias using quillpad's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for quillpad operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Note not found (absent or not owned by the requester)
    #[error("Note not found: {0}")]
    NoteNotFound(i64),

    /// Text or image generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Object storage operation failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Job queue error
    #[error("Job error: {0}")]
    Job(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Conflict with existing state (e.g. duplicate email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Authentication/authorization failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("test resource".to_string());
        assert_eq!(err.to_string(), "Not found: test resource");
    }

    #[test]
    fn test_error_display_note_not_found() {
        let err = Error::NoteNotFound(42);
        assert_eq!(err.to_string(), "Note not found: 42");
    }

    #[test]
    fn test_error_display_inference() {
        let err = Error::Inference("model timeout".to_string());
        assert_eq!(err.to_string(), "Inference error: model timeout");
    }

    #[test]
    fn test_error_display_storage() {
        let err = Error::Storage("upload failed".to_string());
        assert_eq!(err.to_string(), "Storage error: upload failed");
    }

    #[test]
    fn test_error_display_job() {
        let err = Error::Job("queue full".to_string());
        assert_eq!(err.to_string(), "Job error: queue full");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("name is required".to_string());
        assert_eq!(err.to_string(), "Invalid input: name is required");
    }

    #[test]
    fn test_error_display_conflict() {
        let err = Error::Conflict("email already registered".to_string());
        assert_eq!(err.to_string(), "Conflict: email already registered");
    }

    #[test]
    fn test_error_display_unauthorized() {
        let err = Error::Unauthorized("invalid session".to_string());
        assert_eq!(err.to_string(), "Unauthorized: invalid session");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => {
                assert!(!msg.is_empty());
            }
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_result_type_ok() {
        fn get_result() -> Result<i32> {
            Ok(42)
        }
        let result = get_result();
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), 42);
    }
}
