//! API error type and HTTP response mapping.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

/// Errors surfaced by HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    Internal(quillpad_core::Error),
    Unauthorized(String),
    NotFound(String),
    BadRequest(String),
    Conflict(String),
}

impl From<quillpad_core::Error> for ApiError {
    fn from(err: quillpad_core::Error) -> Self {
        match &err {
            quillpad_core::Error::NotFound(msg) => ApiError::NotFound(msg.clone()),
            quillpad_core::Error::NoteNotFound(id) => {
                ApiError::NotFound(format!("Note not found: {}", id))
            }
            quillpad_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg.clone()),
            quillpad_core::Error::Unauthorized(msg) => ApiError::Unauthorized(msg.clone()),
            quillpad_core::Error::Conflict(msg) => ApiError::Conflict(msg.clone()),
            quillpad_core::Error::Database(sqlx_err) => {
                let msg = sqlx_err.to_string();
                if msg.contains("duplicate key") || msg.contains("unique constraint") {
                    return ApiError::Conflict(msg);
                }
                ApiError::Internal(err)
            }
            _ => ApiError::Internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Internal(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(ApiError::Unauthorized("no session".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(ApiError::NotFound("nope".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ApiError::BadRequest("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::Conflict("dup".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ApiError::Internal(quillpad_core::Error::Internal(
                "boom".into()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_core_not_found_maps_to_404() {
        let err: ApiError = quillpad_core::Error::NoteNotFound(7).into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_core_invalid_input_maps_to_400() {
        let err: ApiError = quillpad_core::Error::InvalidInput("name required".into()).into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_core_conflict_maps_to_409() {
        let err: ApiError = quillpad_core::Error::Conflict("email taken".into()).into();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_inference_error_maps_to_500() {
        let err: ApiError = quillpad_core::Error::Inference("model down".into()).into();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
