use anyhow::{Result, anyhow};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use std::path::{Component, Path, PathBuf};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

pub struct StoredAsset {
    pub key: String,
    pub url: String,
    pub size: u64,
}

/// Durable blob storage with deterministic public addresses.
///
/// `put` either publishes the whole object at `key` or nothing at all.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn put<'a>(
        &self,
        key: &str,
        reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
        content_type: &str,
    ) -> Result<StoredAsset>;

    fn public_url(&self, key: &str) -> String;
}

pub struct S3AssetStore {
    client: Client,
    bucket: String,
    public_base: String,
    chunk_size: usize,
}

impl S3AssetStore {
    pub fn new(client: Client, bucket: String, public_base: String, chunk_size: usize) -> Self {
        Self {
            client,
            bucket,
            public_base: public_base.trim_end_matches('/').to_string(),
            chunk_size,
        }
    }

    async fn upload_parts<'a>(
        &self,
        key: &str,
        upload_id: &str,
        reader: &mut Box<dyn AsyncRead + Unpin + Send + 'a>,
        mut buffer: Vec<u8>,
        first: usize,
    ) -> Result<u64> {
        let mut chunk_index = 1;
        let mut completed_parts = Vec::new();
        let mut total_size = 0u64;
        let mut n = first;

        while n > 0 {
            total_size += n as u64;
            let body = ByteStream::from(buffer[..n].to_vec());
            let upload_part_res = self
                .client
                .upload_part()
                .bucket(&self.bucket)
                .key(key)
                .upload_id(upload_id)
                .body(body)
                .part_number(chunk_index)
                .send()
                .await?;

            completed_parts.push(
                CompletedPart::builder()
                    .e_tag(upload_part_res.e_tag().unwrap_or_default())
                    .part_number(chunk_index)
                    .build(),
            );

            chunk_index += 1;
            n = fill_chunk(reader, &mut buffer).await?;
        }

        let completed_multipart_upload = CompletedMultipartUpload::builder()
            .set_parts(Some(completed_parts))
            .build();

        self.client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(completed_multipart_upload)
            .send()
            .await?;

        Ok(total_size)
    }
}

/// Reads until `buffer` is full or the reader is exhausted
async fn fill_chunk<R>(reader: &mut R, buffer: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut n = 0;
    while n < buffer.len() {
        let read = reader.read(&mut buffer[n..]).await?;
        if read == 0 {
            break;
        }
        n += read;
    }
    Ok(n)
}

#[async_trait]
impl AssetStore for S3AssetStore {
    async fn put<'a>(
        &self,
        key: &str,
        mut reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
        content_type: &str,
    ) -> Result<StoredAsset> {
        let mut buffer = vec![0u8; self.chunk_size];
        let first = fill_chunk(&mut reader, &mut buffer).await?;

        // Small bodies go up in one request
        if first < self.chunk_size {
            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(key)
                .content_type(content_type)
                .body(ByteStream::from(buffer[..first].to_vec()))
                .send()
                .await?;

            return Ok(StoredAsset {
                key: key.to_string(),
                url: self.public_url(key),
                size: first as u64,
            });
        }

        let multipart_upload_res = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .send()
            .await?;

        let upload_id = multipart_upload_res
            .upload_id()
            .ok_or_else(|| anyhow!("No upload ID"))?
            .to_string();

        match self
            .upload_parts(key, &upload_id, &mut reader, buffer, first)
            .await
        {
            Ok(size) => Ok(StoredAsset {
                key: key.to_string(),
                url: self.public_url(key),
                size,
            }),
            Err(e) => {
                tracing::error!(
                    "S3 multipart upload failed: bucket={}, key={}, error={:?}",
                    self.bucket,
                    key,
                    e
                );
                if let Err(abort_err) = self
                    .client
                    .abort_multipart_upload()
                    .bucket(&self.bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .send()
                    .await
                {
                    tracing::warn!("Failed to abort multipart upload {}: {}", upload_id, abort_err);
                }
                Err(e)
            }
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key)
    }
}

/// Stores assets on the local filesystem under `root`, served at `base_url`.
pub struct LocalAssetStore {
    root: PathBuf,
    base_url: String,
}

impl LocalAssetStore {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn object_path(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_plain {
            return Err(anyhow!("Invalid asset key: {}", key));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn put<'a>(
        &self,
        key: &str,
        mut reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
        _content_type: &str,
    ) -> Result<StoredAsset> {
        let destination = self.object_path(key)?;
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write beside the destination, then rename into place
        let temp_file = tempfile::Builder::new()
            .prefix(".upload-")
            .tempfile_in(&self.root)?;
        let (file, temp_path) = temp_file.into_parts();
        let mut writer = tokio::fs::File::from_std(file);

        let size = tokio::io::copy(&mut reader, &mut writer).await?;
        writer.flush().await?;
        writer.sync_all().await?;
        drop(writer);

        temp_path.persist(&destination)?;

        Ok(StoredAsset {
            key: key.to_string(),
            url: self.public_url(key),
            size,
        })
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}
