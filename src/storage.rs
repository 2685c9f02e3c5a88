use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::{error::DisplayErrorContext, primitives::ByteStream};
use std::{
    path::Path,
    sync::{Arc, Mutex},
};
use uuid::Uuid;

use crate::error::UploadError;

/// ImageHost
///
/// Contract for the external media host. Implementations take a local temp file
/// and hand back a durable URL. Swappable so handlers can be tested against
/// [`MockImageHost`] without network access.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Ensures the configured bucket exists. Local/MinIO convenience, no-op elsewhere.
    async fn ensure_bucket_exists(&self);

    /// Uploads the file at `local_path` and returns its public URL.
    ///
    /// Deleting the local file afterwards is the caller's job.
    async fn upload(&self, local_path: &Path) -> Result<String, UploadError>;
}

/// ImageHostState
///
/// The concrete type used to share the media host across the application state.
pub type ImageHostState = Arc<dyn ImageHost>;

/// S3ImageHost
///
/// Media host backed by any S3-compatible store (MinIO locally). Path-style
/// addressing is forced because MinIO and most gateways require it.
#[derive(Clone)]
pub struct S3ImageHost {
    client: s3::Client,
    bucket_name: String,
    public_base_url: String,
}

impl S3ImageHost {
    pub fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
        public_base_url: &str,
    ) -> Self {
        let credentials =
            s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            .force_path_style(true)
            .build();

        Self {
            client: s3::Client::from_conf(config),
            bucket_name: bucket.to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ImageHost for S3ImageHost {
    async fn ensure_bucket_exists(&self) {
        match self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
        {
            Ok(_) => tracing::info!(bucket = %self.bucket_name, "bucket created"),
            Err(err) => {
                let exists = err.as_service_error().is_some_and(|e| {
                    e.is_bucket_already_owned_by_you() || e.is_bucket_already_exists()
                });
                if exists {
                    tracing::debug!(bucket = %self.bucket_name, "bucket already exists");
                } else {
                    tracing::warn!(
                        bucket = %self.bucket_name,
                        error = %DisplayErrorContext(&err),
                        "could not ensure bucket exists"
                    );
                }
            }
        }
    }

    async fn upload(&self, local_path: &Path) -> Result<String, UploadError> {
        let extension = image_extension(local_path);
        let key = format!("images/{}.{}", Uuid::new_v4(), extension);
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| UploadError::Rejected(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .content_type(content_type_for(extension))
            .body(body)
            .send()
            .await
            .map_err(|e| UploadError::Rejected(e.to_string()))?;

        tracing::debug!(key = %key, "image uploaded");
        Ok(format!("{}/{}", self.public_base_url, key))
    }
}

/// Lower-cased extension of `path`, `bin` when there is none.
pub fn image_extension(path: &Path) -> &str {
    path.extension()
        .and_then(std::ffi::OsStr::to_str)
        .filter(|ext| !ext.is_empty())
        .unwrap_or("bin")
}

/// Content type sent to the media host for an extension.
pub fn content_type_for(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

/// sanitize_key
///
/// Strips directory navigation (`..`, `.`) and empty segments from a key.
fn sanitize_key(key: &str) -> String {
    key.split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// MockImageHost
///
/// In-process media host for tests. Checks the temp file is still on disk, then
/// returns a deterministic URL built from its file name and records it.
#[derive(Clone, Default)]
pub struct MockImageHost {
    /// When true, every upload fails as if the host were unreachable.
    pub should_fail: bool,
    /// Uploads beyond this many fail.
    pub fail_after: Option<usize>,
    uploaded: Arc<Mutex<Vec<String>>>,
}

impl MockImageHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Accepts `successes` uploads, then fails every later one.
    pub fn new_failing_after(successes: usize) -> Self {
        Self {
            fail_after: Some(successes),
            ..Self::default()
        }
    }

    /// URLs handed out so far, in upload order.
    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded
            .lock()
            .map(|urls| urls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ImageHost for MockImageHost {
    async fn ensure_bucket_exists(&self) {}

    async fn upload(&self, local_path: &Path) -> Result<String, UploadError> {
        if self.should_fail {
            return Err(UploadError::Rejected(
                "Mock media host error: simulation requested".to_string(),
            ));
        }

        if let Some(limit) = self.fail_after
            && self.uploaded().len() >= limit
        {
            return Err(UploadError::Rejected(format!(
                "Mock media host error: limit of {} uploads reached",
                limit
            )));
        }

        tokio::fs::metadata(local_path).await?;

        let file_name = local_path
            .file_name()
            .and_then(std::ffi::OsStr::to_str)
            .unwrap_or("image");
        let url = format!(
            "http://localhost:9000/mock-bucket/{}",
            sanitize_key(file_name)
        );

        if let Ok(mut urls) = self.uploaded.lock() {
            urls.push(url.clone());
        }
        Ok(url)
    }
}
