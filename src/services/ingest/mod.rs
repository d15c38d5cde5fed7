use crate::config::SecurityConfig;
use crate::services::media::{MediaClassifier, MediaTransformer};
use crate::services::metadata::MetadataStore;
use crate::services::staging::StagingArea;
use crate::services::storage::AssetStore;
use std::sync::Arc;

pub mod pipeline;
pub mod types;

pub use types::{AssetKind, UploadRequest};

/// Runs uploads from an owner check through to a linked, stored asset.
///
/// Holds no per-request state; every call to `ingest` is independent.
pub struct IngestService {
    metadata: Arc<dyn MetadataStore>,
    staging: StagingArea,
    classifier: Arc<dyn MediaClassifier>,
    transformer: Arc<dyn MediaTransformer>,
    video_store: Arc<dyn AssetStore>,
    thumbnail_store: Arc<dyn AssetStore>,
    config: SecurityConfig,
}

impl IngestService {
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        staging: StagingArea,
        classifier: Arc<dyn MediaClassifier>,
        transformer: Arc<dyn MediaTransformer>,
        video_store: Arc<dyn AssetStore>,
        thumbnail_store: Arc<dyn AssetStore>,
        config: SecurityConfig,
    ) -> Self {
        Self {
            metadata,
            staging,
            classifier,
            transformer,
            video_store,
            thumbnail_store,
            config,
        }
    }

    pub fn config(&self) -> &SecurityConfig {
        &self.config
    }
}
