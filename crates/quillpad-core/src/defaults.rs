//! Centralized default constants for the quillpad system.
//!
//! **This module is the single source of truth** for all shared default values.
//! All crates should reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// SUMMARIZATION
// =============================================================================

/// Minimum trimmed length of extracted note text for summarization.
///
/// Below this the text backend is never called and the request is rejected.
pub const SUMMARY_MIN_CHARS: usize = 50;

// =============================================================================
// AUTH / SESSIONS
// =============================================================================

/// Length of the opaque session token handed to clients.
pub const SESSION_TOKEN_LENGTH: usize = 48;

/// Session lifetime in hours.
pub const SESSION_TTL_HOURS: i64 = 168;

/// Minimum accepted password length at signup.
pub const PASSWORD_MIN_CHARS: usize = 8;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "qp_session";

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Default rate limit: max requests per period.
pub const RATE_LIMIT_REQUESTS: u64 = 100;

/// Default rate limit: period in seconds.
pub const RATE_LIMIT_PERIOD_SECS: u64 = 60;

/// Maximum request body size in bytes (editor state payloads can be large).
pub const REQUEST_BODY_LIMIT: usize = 2 * 1024 * 1024;

// =============================================================================
// JOBS
// =============================================================================

/// Default maximum retries for failed jobs.
pub const JOB_MAX_RETRIES: i32 = 3;

/// Default maximum concurrent jobs per worker.
pub const JOB_MAX_CONCURRENT: usize = 4;

/// Default polling interval when the queue is empty (milliseconds).
pub const JOB_POLL_INTERVAL_MS: u64 = 500;

/// Per-job execution timeout in seconds.
pub const JOB_TIMEOUT_SECS: u64 = 300;

/// Broadcast channel capacity for worker events.
pub const EVENT_BUS_CAPACITY: usize = 256;

// =============================================================================
// INFERENCE
// =============================================================================

/// Default Gemini API base URL.
pub const GEMINI_URL: &str = "https://generativelanguage.googleapis.com";

/// Default Gemini text generation model.
pub const GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Default Hugging Face inference API base URL.
pub const HF_URL: &str = "https://api-inference.huggingface.co";

/// Default text-to-image model.
pub const IMAGE_MODEL: &str = "black-forest-labs/FLUX.1-dev";

/// Generated thumbnail width in pixels.
pub const IMAGE_WIDTH: u32 = 512;

/// Generated thumbnail height in pixels.
pub const IMAGE_HEIGHT: u32 = 512;

/// Diffusion inference steps for thumbnail generation.
pub const IMAGE_INFERENCE_STEPS: u32 = 50;

/// Timeout for text generation requests (seconds).
pub const GEN_TIMEOUT_SECS: u64 = 120;

/// Timeout for image generation requests (seconds).
pub const IMAGE_TIMEOUT_SECS: u64 = 180;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_threshold_is_single_source() {
        // The two historical variants were 50 and 30; 50 is the resolved value.
        assert_eq!(SUMMARY_MIN_CHARS, 50);
    }

    #[test]
    fn test_session_token_length_is_generous() {
        assert!(SESSION_TOKEN_LENGTH >= 32);
    }

    #[test]
    fn test_job_defaults() {
        assert_eq!(JOB_MAX_RETRIES, 3);
        assert_eq!(JOB_MAX_CONCURRENT, 4);
        assert_eq!(JOB_POLL_INTERVAL_MS, 500);
    }

    #[test]
    fn test_image_defaults_match_model_limits() {
        assert_eq!(IMAGE_WIDTH, 512);
        assert_eq!(IMAGE_HEIGHT, 512);
        assert_eq!(IMAGE_INFERENCE_STEPS, 50);
    }
}
