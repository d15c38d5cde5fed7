#![allow(dead_code)]

use async_trait::async_trait;
use axum::{Router, body::Body, http::Request};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, DbErr, Set};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use tubely_backend::api::error::AppError;
use tubely_backend::config::SecurityConfig;
use tubely_backend::entities::{users, videos};
use tubely_backend::infrastructure::database;
use tubely_backend::services::ingest::IngestService;
use tubely_backend::services::media::remux::processing_path;
use tubely_backend::services::media::{AspectRatio, MediaClassifier, MediaTransformer, ProcessedFile};
use tubely_backend::services::metadata::{DatabaseMetadataStore, MetadataStore};
use tubely_backend::services::staging::StagingArea;
use tubely_backend::services::storage::{AssetStore, StoredAsset};
use tubely_backend::utils::auth::create_jwt;
use tubely_backend::{AppState, create_app};

pub const BOUNDARY: &str = "---------------------------tubelyboundary1234";

pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new("tubely_backend=debug,tower_http=debug"))
        .with(fmt::layer().with_test_writer())
        .try_init();
}

pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    database::run_migrations(&db).await.unwrap();
    db
}

/// In-memory object store recording every successful put
pub struct MockAssetStore {
    pub objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    pub calls: Mutex<usize>,
    fail: bool,
}

impl MockAssetStore {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            calls: Mutex::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl AssetStore for MockAssetStore {
    async fn put<'a>(
        &self,
        key: &str,
        mut reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
        content_type: &str,
    ) -> anyhow::Result<StoredAsset> {
        *self.calls.lock().unwrap() += 1;
        if self.fail {
            return Err(anyhow::anyhow!("connection refused"));
        }

        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;
        let size = data.len() as u64;
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (data, content_type.to_string()));

        Ok(StoredAsset {
            key: key.to_string(),
            url: self.public_url(key),
            size,
        })
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://tubely-test.s3.us-east-1.amazonaws.com/{}", key)
    }
}

pub struct StaticClassifier(pub AspectRatio);

#[async_trait]
impl MediaClassifier for StaticClassifier {
    async fn classify(&self, _path: &Path) -> Result<AspectRatio, AppError> {
        Ok(self.0)
    }
}

/// Produces the processed file by copying the input
pub struct CopyRemuxer;

#[async_trait]
impl MediaTransformer for CopyRemuxer {
    async fn remux(&self, path: &Path) -> Result<ProcessedFile, AppError> {
        let output = processing_path(path);
        tokio::fs::copy(path, &output)
            .await
            .map_err(|e| AppError::RemuxFailed(e.to_string()))?;
        Ok(ProcessedFile::new(tempfile::TempPath::from_path(output)))
    }
}

pub struct FailingRemuxer;

#[async_trait]
impl MediaTransformer for FailingRemuxer {
    async fn remux(&self, _path: &Path) -> Result<ProcessedFile, AppError> {
        Err(AppError::RemuxFailed(
            "ffmpeg exited with exit status: 1: moov atom not found".to_string(),
        ))
    }
}

/// Reads from the database but refuses every write
pub struct ReadOnlyMetadataStore {
    inner: DatabaseMetadataStore,
}

impl ReadOnlyMetadataStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            inner: DatabaseMetadataStore::new(db),
        }
    }
}

#[async_trait]
impl MetadataStore for ReadOnlyMetadataStore {
    async fn get(&self, video_id: &str) -> Result<Option<videos::Model>, DbErr> {
        self.inner.get(video_id).await
    }

    async fn update(&self, _video: videos::ActiveModel) -> Result<videos::Model, DbErr> {
        Err(DbErr::Custom("database is locked".to_string()))
    }
}

pub struct TestApp {
    pub app: Router,
    pub db: DatabaseConnection,
    pub config: SecurityConfig,
    pub videos: Arc<MockAssetStore>,
    pub thumbnails: Arc<MockAssetStore>,
    pub staging_dir: tempfile::TempDir,
    pub assets_dir: tempfile::TempDir,
}

pub struct TestAppBuilder {
    config: SecurityConfig,
    transformer: Arc<dyn MediaTransformer>,
    aspect_ratio: AspectRatio,
    video_store: Arc<MockAssetStore>,
    read_only_metadata: bool,
}

impl TestAppBuilder {
    pub fn config(mut self, config: SecurityConfig) -> Self {
        self.config = config;
        self
    }

    pub fn transformer(mut self, transformer: Arc<dyn MediaTransformer>) -> Self {
        self.transformer = transformer;
        self
    }

    pub fn aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn video_store(mut self, store: MockAssetStore) -> Self {
        self.video_store = Arc::new(store);
        self
    }

    pub fn read_only_metadata(mut self) -> Self {
        self.read_only_metadata = true;
        self
    }

    pub async fn build(self) -> TestApp {
        init_tracing();

        let db = setup_test_db().await;
        let staging_dir = tempfile::tempdir().unwrap();
        let assets_dir = tempfile::tempdir().unwrap();
        let thumbnails = Arc::new(MockAssetStore::new());

        let metadata: Arc<dyn MetadataStore> = if self.read_only_metadata {
            Arc::new(ReadOnlyMetadataStore::new(db.clone()))
        } else {
            Arc::new(DatabaseMetadataStore::new(db.clone()))
        };

        let ingest = Arc::new(IngestService::new(
            metadata,
            StagingArea::new(staging_dir.path()),
            Arc::new(StaticClassifier(self.aspect_ratio)),
            self.transformer,
            self.video_store.clone(),
            thumbnails.clone(),
            self.config.clone(),
        ));

        let state = AppState {
            db: db.clone(),
            ingest,
            config: self.config.clone(),
            assets_root: assets_dir.path().to_path_buf(),
        };

        TestApp {
            app: create_app(state),
            db,
            config: self.config,
            videos: self.video_store,
            thumbnails,
            staging_dir,
            assets_dir,
        }
    }
}

impl TestApp {
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder {
            config: SecurityConfig::development(),
            transformer: Arc::new(CopyRemuxer),
            aspect_ratio: AspectRatio::Landscape,
            video_store: Arc::new(MockAssetStore::new()),
            read_only_metadata: false,
        }
    }

    pub async fn new() -> Self {
        Self::builder().build().await
    }

    /// Inserts a user directly and returns its id with a valid token
    pub async fn create_user(&self, email: &str) -> (String, String) {
        let id = uuid::Uuid::new_v4().to_string();
        users::ActiveModel {
            id: Set(id.clone()),
            email: Set(email.to_string()),
            password_hash: Set("not-a-real-hash".to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .unwrap();

        let token = create_jwt(&id, &self.config.jwt_secret).unwrap();
        (id, token)
    }

    pub async fn create_video(&self, user_id: &str) -> videos::Model {
        let now = Utc::now();
        videos::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            user_id: Set(user_id.to_string()),
            title: Set("Boots demo".to_string()),
            description: Set("Walking around in boots".to_string()),
            thumbnail_url: Set(None),
            video_url: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .unwrap()
    }

    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.staging_dir.path()).unwrap().count()
    }
}

pub fn multipart_body(field: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{boundary}\r\n\
        Content-Disposition: form-data; name=\"{field}\"; filename=\"upload.bin\"\r\n\
        Content-Type: {content_type}\r\n\r\n",
        boundary = BOUNDARY,
        field = field,
        content_type = content_type
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn upload_request(uri: &str, token: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri).header(
        "Content-Type",
        format!("multipart/form-data; boundary={}", BOUNDARY),
    );
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}
