use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Dispatch error: {0}")]
    Dispatch(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Dispatch(msg) => {
                tracing::error!("Email dispatch error: {}", msg);
                (StatusCode::BAD_GATEWAY, format!("Email dispatch failed: {}", msg))
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            AppError::Json(e) => (StatusCode::BAD_REQUEST, format!("JSON error: {}", e)),
            AppError::Jwt(e) => (StatusCode::UNAUTHORIZED, format!("JWT error: {}", e)),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use http_body_util::BodyExt;

    async fn get_response_body(response: Response) -> (StatusCode, String) {
        let status = response.status();
        let body = response.into_body();
        let bytes = body.collect().await.unwrap().to_bytes();
        let body_str = String::from_utf8(bytes.to_vec()).unwrap();
        (status, body_str)
    }

    #[tokio::test]
    async fn test_not_found_error() {
        let error = AppError::NotFound("Invite not found".to_string());
        let response = error.into_response();
        let (status, body) = get_response_body(response).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Invite not found"));
    }

    #[tokio::test]
    async fn test_validation_error() {
        let error = AppError::Validation("Missing invite_id".to_string());
        let response = error.into_response();
        let (status, body) = get_response_body(response).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Missing invite_id"));
    }

    #[tokio::test]
    async fn test_unauthorized_error() {
        let error = AppError::Unauthorized("Token expired".to_string());
        let response = error.into_response();
        let (status, body) = get_response_body(response).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Token expired"));
    }

    #[tokio::test]
    async fn test_forbidden_error() {
        let error = AppError::Forbidden("Admin access required".to_string());
        let response = error.into_response();
        let (status, body) = get_response_body(response).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.contains("Admin access required"));
    }

    #[tokio::test]
    async fn test_conflict_error() {
        let error = AppError::Conflict("Invite already claimed".to_string());
        let response = error.into_response();
        let (status, body) = get_response_body(response).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.contains("Invite already claimed"));
    }

    #[tokio::test]
    async fn test_dispatch_error_maps_to_bad_gateway() {
        let error = AppError::Dispatch("SMTP connection refused".to_string());
        let response = error.into_response();
        let (status, body) = get_response_body(response).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.contains("SMTP connection refused"));
    }

    #[tokio::test]
    async fn test_json_error_response_format() {
        let error = AppError::NotFound("Invite not found".to_string());
        let response = error.into_response();
        let (_, body) = get_response_body(response).await;

        // Response should be JSON with an "error" field
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed.get("error").unwrap(), "Invite not found");
    }

    #[test]
    fn test_error_display_impl() {
        assert_eq!(
            AppError::NotFound("test".to_string()).to_string(),
            "Not found: test"
        );
        assert_eq!(
            AppError::Validation("test".to_string()).to_string(),
            "Validation error: test"
        );
        assert_eq!(
            AppError::Conflict("test".to_string()).to_string(),
            "Conflict: test"
        );
        assert_eq!(
            AppError::Dispatch("test".to_string()).to_string(),
            "Dispatch error: test"
        );
    }

    #[test]
    fn test_json_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json");
        assert!(json_err.is_err());
        let app_error: AppError = json_err.unwrap_err().into();
        assert!(matches!(app_error, AppError::Json(_)));
    }
}
