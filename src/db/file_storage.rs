//! Object storage backends for documents and media.

use crate::config::StorageConfig;
use crate::db::errors::{DbError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// A stored object request: raw bytes plus the content type and a filename
/// hint used to build a readable key.
pub struct FileStorageRequest {
    pub content: Vec<u8>,
    pub content_type: String,
    /// Key prefix such as "documents/2603" or "media/<unit>"
    pub key_prefix: String,
    pub filename: String,
}

pub struct FileStorageResponse {
    pub storage_key: String,
}

/// Trait for file storage backends
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Store file content and return storage key
    async fn store(&self, request: FileStorageRequest) -> Result<FileStorageResponse>;

    /// Retrieve file content using storage key
    async fn retrieve(&self, storage_key: &str) -> Result<Vec<u8>>;

    /// Delete file content using storage key
    async fn delete(&self, storage_key: &str) -> Result<()>;

    /// Check if file exists using storage key
    async fn exists(&self, storage_key: &str) -> Result<bool>;
}

fn object_key(key_prefix: &str, filename: &str) -> String {
    // Readable, collision-free keys: <prefix>/<uuid>-<sanitized filename>
    let safe_name: String = filename
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let prefix = key_prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{}-{}", uuid::Uuid::new_v4(), safe_name)
    } else {
        format!("{}/{}-{}", prefix, uuid::Uuid::new_v4(), safe_name)
    }
}

// ============================================================================
// Local Filesystem Storage Implementation
// ============================================================================

/// Local filesystem storage backend - stores files in a directory.
/// Useful for development and testing.
pub struct LocalFileStorage {
    base_path: PathBuf,
}

impl LocalFileStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn store(&self, request: FileStorageRequest) -> Result<FileStorageResponse> {
        let storage_key = object_key(&request.key_prefix, &request.filename);
        let full_path = self.base_path.join(&storage_key);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&full_path).await?;
        file.write_all(&request.content).await?;
        file.sync_all().await?;

        Ok(FileStorageResponse { storage_key })
    }

    async fn retrieve(&self, storage_key: &str) -> Result<Vec<u8>> {
        let full_path = self.base_path.join(storage_key);

        if !full_path.exists() {
            return Err(DbError::NotFound);
        }

        let mut file = fs::File::open(&full_path).await?;
        let mut content = Vec::new();
        file.read_to_end(&mut content).await?;

        Ok(content)
    }

    async fn delete(&self, storage_key: &str) -> Result<()> {
        let full_path = self.base_path.join(storage_key);

        if full_path.exists() {
            fs::remove_file(&full_path).await?;
        }

        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> Result<bool> {
        let full_path = self.base_path.join(storage_key);
        Ok(full_path.exists())
    }
}

// ============================================================================
// S3 Storage Implementation
// ============================================================================

/// S3 storage backend. Credentials come from the standard AWS credential
/// chain (environment, profile, instance role).
pub struct S3FileStorage {
    client: aws_sdk_s3::Client,
    bucket: String,
    prefix: String,
}

impl S3FileStorage {
    pub async fn new(bucket: String, region: String, prefix: String) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region))
            .load()
            .await;

        Self {
            client: aws_sdk_s3::Client::new(&config),
            bucket,
            prefix,
        }
    }

    fn full_key(&self, storage_key: &str) -> String {
        if self.prefix.is_empty() {
            storage_key.to_string()
        } else {
            format!("{}/{}", self.prefix.trim_matches('/'), storage_key)
        }
    }
}

#[async_trait]
impl FileStorage for S3FileStorage {
    async fn store(&self, request: FileStorageRequest) -> Result<FileStorageResponse> {
        let storage_key = object_key(&request.key_prefix, &request.filename);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(self.full_key(&storage_key))
            .content_type(&request.content_type)
            .body(aws_sdk_s3::primitives::ByteStream::from(request.content))
            .send()
            .await
            .map_err(|e| DbError::Other(anyhow::anyhow!("S3 put_object failed: {e}")))?;

        Ok(FileStorageResponse { storage_key })
    }

    async fn retrieve(&self, storage_key: &str) -> Result<Vec<u8>> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(self.full_key(storage_key))
            .send()
            .await
            .map_err(|e| {
                let service_err = e.into_service_error();
                if service_err.is_no_such_key() {
                    DbError::NotFound
                } else {
                    DbError::Other(anyhow::anyhow!("S3 get_object failed: {service_err}"))
                }
            })?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| DbError::Other(anyhow::anyhow!("S3 body read failed: {e}")))?;

        Ok(bytes.into_bytes().to_vec())
    }

    async fn delete(&self, storage_key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(self.full_key(storage_key))
            .send()
            .await
            .map_err(|e| DbError::Other(anyhow::anyhow!("S3 delete_object failed: {e}")))?;

        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> Result<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(self.full_key(storage_key))
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_err = e.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(DbError::Other(anyhow::anyhow!("S3 head_object failed: {service_err}")))
                }
            }
        }
    }
}

// ============================================================================
// Factory
// ============================================================================

/// Create a file storage backend based on configuration
pub async fn create_file_storage(config: &StorageConfig) -> Result<Arc<dyn FileStorage>> {
    match config {
        StorageConfig::S3 { bucket, region, prefix } => {
            tracing::info!("Creating S3 file storage backend (bucket: {bucket}, region: {region})");
            Ok(Arc::new(S3FileStorage::new(bucket.clone(), region.clone(), prefix.clone()).await))
        }
        StorageConfig::Local { path } => {
            tracing::info!("Creating local file storage backend (path: {:?})", path);
            if let Err(e) = tokio::fs::create_dir_all(path).await {
                return Err(DbError::Other(anyhow::anyhow!(
                    "Failed to create local storage directory {:?}: {}",
                    path,
                    e
                )));
            }
            Ok(Arc::new(LocalFileStorage::new(path.clone())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_storage_lifecycle() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(temp_dir.path().to_path_buf());

        let content = b"test content for local storage";

        let request = FileStorageRequest {
            content: content.to_vec(),
            content_type: "application/pdf".to_string(),
            key_prefix: "documents/2604".to_string(),
            filename: "invoice.pdf".to_string(),
        };

        let response = storage.store(request).await.unwrap();
        assert!(response.storage_key.starts_with("documents/2604/"));
        assert!(response.storage_key.ends_with("-invoice.pdf"));

        assert!(storage.exists(&response.storage_key).await.unwrap());

        let retrieved = storage.retrieve(&response.storage_key).await.unwrap();
        assert_eq!(retrieved, content);

        storage.delete(&response.storage_key).await.unwrap();
        assert!(!storage.exists(&response.storage_key).await.unwrap());
    }

    #[tokio::test]
    async fn test_local_storage_retrieve_nonexistent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(temp_dir.path().to_path_buf());

        let result = storage.retrieve("nonexistent/file.pdf").await;
        assert!(matches!(result, Err(DbError::NotFound)));
    }

    #[test]
    fn test_object_key_sanitizes_filename() {
        let key = object_key("media/abc", "weird name (1).JPG");
        assert!(key.starts_with("media/abc/"));
        assert!(key.ends_with("-weird_name__1_.JPG"));
        assert!(!key.contains(' '));
    }
}
