use crate::config::StorageConfig;
use crate::services::storage::{AssetStore, LocalAssetStore, S3AssetStore};
use aws_sdk_s3::config::Region;
use std::sync::Arc;
use tracing::info;

/// The two stores the ingest pipeline writes to
pub struct AssetStores {
    pub videos: Arc<dyn AssetStore>,
    pub thumbnails: Arc<dyn AssetStore>,
}

pub async fn setup_storage(config: &StorageConfig) -> anyhow::Result<AssetStores> {
    let bucket = config.s3_bucket.clone();
    info!(
        "☁️  S3 Storage: {} (Bucket: {}, Region: {})",
        config.s3_endpoint.as_deref().unwrap_or("aws"),
        bucket,
        config.s3_region
    );

    // Credentials come from the default provider chain
    let mut loader = aws_config::from_env().region(Region::new(config.s3_region.clone()));
    if let Some(endpoint) = &config.s3_endpoint {
        loader = loader.endpoint_url(endpoint);
    }
    let aws_config = loader.load().await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(config.s3_endpoint.is_some())
        .build();

    let s3_client = aws_sdk_s3::Client::from_conf(s3_config);

    match s3_client.head_bucket().bucket(&bucket).send().await {
        Ok(_) => info!("✅ Bucket '{}' is ready", bucket),
        Err(_) => {
            info!("🪣 Bucket '{}' not found, creating...", bucket);
            if let Err(e) = s3_client.create_bucket().bucket(&bucket).send().await {
                tracing::error!("❌ Failed to create bucket '{}': {}", bucket, e);
            } else {
                info!("✅ Bucket '{}' created successfully", bucket);
            }
        }
    }

    let s3_store: Arc<dyn AssetStore> = Arc::new(S3AssetStore::new(
        s3_client,
        bucket,
        config.public_base(),
        config.chunk_size,
    ));

    let thumbnails: Arc<dyn AssetStore> = match config.thumbnail_backend.as_str() {
        "s3" => {
            info!("🖼️  Thumbnails: S3");
            s3_store.clone()
        }
        _ => {
            tokio::fs::create_dir_all(&config.assets_root).await?;
            info!(
                "🖼️  Thumbnails: {} (served at {})",
                config.assets_root.display(),
                config.assets_base_url
            );
            Arc::new(LocalAssetStore::new(
                config.assets_root.clone(),
                &config.assets_base_url,
            ))
        }
    };

    Ok(AssetStores {
        videos: s3_store,
        thumbnails,
    })
}
