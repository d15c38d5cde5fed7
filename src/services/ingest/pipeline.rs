use crate::api::error::AppError;
use crate::entities::videos;
use crate::services::staging::StagedFile;
use crate::services::storage::{AssetStore, StoredAsset};
use crate::utils::keys::{thumbnail_key, video_key};
use crate::utils::validation::{extension_for, validate_media_type};
use mime::Mime;
use sea_orm::Set;
use std::path::Path;
use tokio::io::AsyncRead;

use super::{AssetKind, IngestService, UploadRequest};

impl IngestService {
    /// Runs one upload end to end and returns the updated record.
    ///
    /// Nothing is staged or stored unless the caller owns the record and the
    /// declared type is allowed. Staged and remuxed copies are gone by the
    /// time this returns, whatever the outcome.
    pub async fn ingest<R>(&self, request: UploadRequest<R>) -> Result<videos::Model, AppError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let UploadRequest {
            owner_id,
            video_id,
            kind,
            content_type,
            body,
        } = request;

        // 1. Ownership
        let video = self.verify_owner(&owner_id, &video_id).await?;

        // 2. Format
        let media_type = validate_media_type(content_type.as_deref(), kind.allowed_media_types())
            .map_err(|e| AppError::UnsupportedMediaType(e.to_string()))?;
        let extension = extension_for(&media_type);

        tracing::info!(
            "Uploading {} for video {} by user {}",
            kind.form_field(),
            video_id,
            owner_id
        );

        // 3. Staging
        let staged = self
            .staging
            .stage(body, &format!(".{}", extension), kind.max_size(&self.config))
            .await?;

        // 4. Process and store
        let result = match kind {
            AssetKind::Video => self.store_video(&staged, &media_type).await,
            AssetKind::Thumbnail => self.store_thumbnail(&staged, &media_type, &extension).await,
        };
        staged.release();
        let stored = result?;

        // 5. Link
        self.link(video, kind, stored).await
    }

    pub async fn verify_owner(
        &self,
        owner_id: &str,
        video_id: &str,
    ) -> Result<videos::Model, AppError> {
        let video = self
            .metadata
            .get(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Couldn't find video".to_string()))?;

        if video.user_id != owner_id {
            return Err(AppError::Forbidden(
                "You are not authorized to edit this video".to_string(),
            ));
        }

        Ok(video)
    }

    async fn store_video(
        &self,
        staged: &StagedFile,
        media_type: &Mime,
    ) -> Result<StoredAsset, AppError> {
        let aspect_ratio = self.classifier.classify(staged.path()).await?;
        let processed = self.transformer.remux(staged.path()).await?;

        let key = video_key(aspect_ratio);
        let result = put_file(self.video_store.as_ref(), &key, processed.path(), media_type).await;
        processed.release();
        result
    }

    async fn store_thumbnail(
        &self,
        staged: &StagedFile,
        media_type: &Mime,
        extension: &str,
    ) -> Result<StoredAsset, AppError> {
        let key = thumbnail_key(extension);
        put_file(self.thumbnail_store.as_ref(), &key, staged.path(), media_type).await
    }

    /// Writes the stored URL into the record, leaving every other column alone
    async fn link(
        &self,
        video: videos::Model,
        kind: AssetKind,
        stored: StoredAsset,
    ) -> Result<videos::Model, AppError> {
        let mut active: videos::ActiveModel = video.into();
        match kind {
            AssetKind::Video => active.video_url = Set(Some(stored.url.clone())),
            AssetKind::Thumbnail => active.thumbnail_url = Set(Some(stored.url.clone())),
        }

        let updated = self.metadata.update(active).await.map_err(|e| {
            tracing::warn!("Asset {} stored but left unlinked", stored.key);
            AppError::MetadataUpdateFailed(e.to_string())
        })?;

        tracing::info!(
            "Linked {} ({} bytes) to video {}",
            stored.url,
            stored.size,
            updated.id
        );

        Ok(updated)
    }
}

async fn put_file(
    store: &dyn AssetStore,
    key: &str,
    path: &Path,
    media_type: &Mime,
) -> Result<StoredAsset, AppError> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| AppError::StagingIo(format!("{}: {}", path.display(), e)))?;

    store
        .put(key, Box::new(file), media_type.essence_str())
        .await
        .map_err(|e| AppError::StoreUnavailable(e.to_string()))
}
