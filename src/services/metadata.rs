use crate::entities::{prelude::*, videos};
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait};

/// Access to existing video records.
///
/// `update` only writes the columns that are `Set` on the active model, so a
/// caller can change one field without touching the rest of the record.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn get(&self, video_id: &str) -> Result<Option<videos::Model>, DbErr>;
    async fn update(&self, video: videos::ActiveModel) -> Result<videos::Model, DbErr>;
}

pub struct DatabaseMetadataStore {
    db: DatabaseConnection,
}

impl DatabaseMetadataStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MetadataStore for DatabaseMetadataStore {
    async fn get(&self, video_id: &str) -> Result<Option<videos::Model>, DbErr> {
        Videos::find_by_id(video_id.to_string()).one(&self.db).await
    }

    async fn update(&self, video: videos::ActiveModel) -> Result<videos::Model, DbErr> {
        video.update(&self.db).await
    }
}
