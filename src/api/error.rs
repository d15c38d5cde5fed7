use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unsupported Media Type: {0}")]
    UnsupportedMediaType(String),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error("Staging failed: {0}")]
    StagingIo(String),

    #[error("Media analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Media contains no usable stream")]
    NoStreamData,

    #[error("Remux failed: {0}")]
    RemuxFailed(String),

    #[error("Asset store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Metadata update failed: {0}")]
    MetadataUpdateFailed(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::BadRequest(_)
            | AppError::StagingIo(_)
            | AppError::AnalysisFailed(_)
            | AppError::NoStreamData
            | AppError::RemuxFailed(_) => StatusCode::BAD_REQUEST,
            AppError::StoreUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::MetadataUpdateFailed(_)
            | AppError::Database(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Internal Server Error".to_string()
            }
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::UnsupportedMediaType(msg)
            | AppError::PayloadTooLarge(msg) => msg,
            AppError::StagingIo(detail) => {
                tracing::error!("Staging error: {}", detail);
                "Couldn't save the uploaded file".to_string()
            }
            AppError::AnalysisFailed(detail) => {
                tracing::warn!("Media analysis failed: {}", detail);
                "Couldn't determine the video's aspect ratio".to_string()
            }
            AppError::NoStreamData => "Uploaded file contains no video stream".to_string(),
            AppError::RemuxFailed(detail) => {
                tracing::warn!("Remux failed: {}", detail);
                "Couldn't prepare the video for streaming".to_string()
            }
            AppError::StoreUnavailable(detail) => {
                tracing::error!("Asset store error: {}", detail);
                "Couldn't store the uploaded file".to_string()
            }
            AppError::MetadataUpdateFailed(detail) => {
                tracing::error!("Metadata update error: {}", detail);
                "Couldn't update the video record".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal Server Error".to_string()
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::UnsupportedMediaType("x".into()).status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(AppError::NoStreamData.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::RemuxFailed("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::StoreUnavailable("x".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::MetadataUpdateFailed("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_detail_is_not_exposed() {
        let response =
            AppError::AnalysisFailed("ffprobe: /tmp/tubely-upload-abc.mp4: EOF".into())
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let message = json["error"].as_str().unwrap();
        assert!(!message.contains("/tmp"));
        assert!(!message.is_empty());
    }
}
