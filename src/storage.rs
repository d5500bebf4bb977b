use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::presigning::PresigningConfig;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{AppError, Result};

/// Lifetime of a presigned upload URL.
pub const UPLOAD_URL_TTL: Duration = Duration::from_secs(600);

/// StorageService
///
/// Contract for the object storage holding uploaded resumes. Swapped for
/// `MockStorageService` in tests.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Creates the resume bucket when it does not exist yet. Only called in
    /// `Env::Local`, against MinIO.
    async fn ensure_bucket(&self) -> Result<()>;

    /// Signs a PUT URL for `key`. The upload must carry `content_type`.
    async fn presign_upload(&self, key: &str, content_type: &str) -> Result<String>;
}

/// S3StorageClient
///
/// `StorageService` over the AWS SDK. Path-style addressing keeps it compatible with
/// MinIO and other S3-compatible gateways.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    bucket: String,
}

impl S3StorageClient {
    pub fn from_config(config: &AppConfig) -> Self {
        let credentials = s3::config::Credentials::new(
            &config.s3_key,
            &config.s3_secret,
            None,
            None,
            "job-portal",
        );

        let sdk_config = s3::Config::builder()
            .behavior_version_latest()
            .endpoint_url(&config.s3_endpoint)
            .region(s3::config::Region::new(config.s3_region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: s3::Client::from_conf(sdk_config),
            bucket: config.s3_bucket.clone(),
        }
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    async fn ensure_bucket(&self) -> Result<()> {
        if self.client.head_bucket().bucket(&self.bucket).send().await.is_ok() {
            return Ok(());
        }
        self.client
            .create_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("create bucket {}: {e}", self.bucket)))?;
        tracing::info!(bucket = %self.bucket, "created resume bucket");
        Ok(())
    }

    async fn presign_upload(&self, key: &str, content_type: &str) -> Result<String> {
        let expiry = PresigningConfig::expires_in(UPLOAD_URL_TTL)
            .map_err(|e| AppError::Internal(format!("presigning config: {e}")))?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(expiry)
            .await
            .map_err(|e| AppError::Internal(format!("presign {key}: {e}")))?;

        Ok(request.uri().to_string())
    }
}

/// sanitize_key
///
/// Drops empty, `.` and `..` path segments so a client-supplied name cannot escape its prefix.
pub fn sanitize_key(key: &str) -> String {
    key.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Object key for a resume: `resumes/<user id>/<random id>-<file name>`.
pub fn resume_key(user_id: Uuid, filename: &str) -> String {
    let name = sanitize_key(filename).replace('/', "_");
    let name = if name.is_empty() { "resume".to_string() } else { name };
    format!("resumes/{user_id}/{}-{name}", Uuid::new_v4())
}

/// MockStorageService
///
/// Deterministic `StorageService` for tests, no network involved. URLs point at
/// `storage.test` and carry a fixed signature.
#[derive(Clone, Default)]
pub struct MockStorageService {
    /// Every call fails with an internal error, as an unreachable gateway would.
    pub unavailable: bool,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self { unavailable: true }
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_bucket(&self) -> Result<()> {
        Ok(())
    }

    async fn presign_upload(&self, key: &str, content_type: &str) -> Result<String> {
        if self.unavailable {
            return Err(AppError::Internal("storage unavailable".to_string()));
        }
        Ok(format!(
            "https://storage.test/resumes/{}?content-type={content_type}&X-Amz-Signature=mock",
            sanitize_key(key)
        ))
    }
}

/// StorageState
///
/// The shared handle to object storage held in `AppState`.
pub type StorageState = Arc<dyn StorageService>;
