use crate::api::error::AppError;
use crate::api::handlers::videos::VideoResponse;
use crate::services::ingest::{AssetKind, UploadRequest};
use crate::utils::auth::Claims;
use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
};
use futures::TryStreamExt;
use tokio_util::io::StreamReader;

#[utoipa::path(
    post,
    path = "/api/video_upload/{video_id}",
    params(
        ("video_id" = String, Path, description = "Video ID")
    ),
    request_body(content = Multipart, description = "MP4 file in the `video` field"),
    responses(
        (status = 200, description = "Video stored and linked", body = VideoResponse),
        (status = 400, description = "Unreadable or unprocessable video"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Video not found"),
        (status = 413, description = "Upload too large"),
        (status = 415, description = "Not an MP4"),
        (status = 502, description = "Asset store unavailable")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "uploads"
)]
pub async fn upload_video(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(video_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<VideoResponse>, AppError> {
    handle_upload(state, claims, video_id, AssetKind::Video, multipart).await
}

#[utoipa::path(
    post,
    path = "/api/thumbnail_upload/{video_id}",
    params(
        ("video_id" = String, Path, description = "Video ID")
    ),
    request_body(content = Multipart, description = "PNG or JPEG image in the `thumbnail` field"),
    responses(
        (status = 200, description = "Thumbnail stored and linked", body = VideoResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Video not found"),
        (status = 413, description = "Upload too large"),
        (status = 415, description = "Not a PNG or JPEG")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "uploads"
)]
pub async fn upload_thumbnail(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(video_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<VideoResponse>, AppError> {
    handle_upload(state, claims, video_id, AssetKind::Thumbnail, multipart).await
}

async fn handle_upload(
    state: crate::AppState,
    claims: Claims,
    video_id: String,
    kind: AssetKind,
    mut multipart: Multipart,
) -> Result<Json<VideoResponse>, AppError> {
    let result: Result<Json<VideoResponse>, AppError> = async {
        while let Some(field) = multipart.next_field().await.map_err(|e| {
            let err_msg = e.to_string();
            if err_msg.contains("length limit exceeded") {
                AppError::PayloadTooLarge(
                    "Request body exceeds the maximum allowed limit".to_string(),
                )
            } else {
                AppError::BadRequest(err_msg)
            }
        })? {
            if field.name() != Some(kind.form_field()) {
                continue;
            }

            let content_type = field.content_type().map(|s| s.to_string());
            let reader = StreamReader::new(field.map_err(std::io::Error::other));

            let request = UploadRequest::new(
                kind,
                &claims.sub,
                &video_id,
                content_type.as_deref(),
                reader,
            );
            let video = state.ingest.ingest(request).await?;
            return Ok(Json(video.into()));
        }

        Err(AppError::BadRequest(format!(
            "Missing multipart field '{}'",
            kind.form_field()
        )))
    }
    .await;

    match result {
        Ok(res) => Ok(res),
        Err(e) => {
            // Drain the rest of the body so the client sees the response, not a reset
            tracing::warn!("Upload failed early: {}. Consuming remaining stream...", e);
            while let Ok(Some(mut field)) = multipart.next_field().await {
                while let Ok(Some(_)) = field.chunk().await {}
            }
            Err(e)
        }
    }
}
