//! File-upload middleware.
//!
//! [`UploadForm`] turns a request body into text fields plus image files written
//! to the configured upload directory. Multipart bodies carry both; JSON bodies
//! carry fields only, so the update routes keep accepting plain JSON clients.
//! Temp files are removed when the form is dropped at the end of the request.

use axum::{
    Json,
    extract::{FromRef, FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::{collections::HashMap, io::Write, path::Path};
use tempfile::NamedTempFile;

use crate::{
    config::AppConfig,
    error::{ApiError, FieldError},
};

/// An uploaded image held on local disk until the request finishes.
#[derive(Debug)]
pub struct TempImage {
    file: NamedTempFile,
    original_name: String,
}

impl TempImage {
    /// Writes `bytes` to `image-<millis>-<random>.<original name>` inside `dir`.
    pub fn write(dir: &Path, original_name: &str, bytes: &[u8]) -> std::io::Result<Self> {
        let safe_name = Path::new(original_name)
            .file_name()
            .and_then(std::ffi::OsStr::to_str)
            .unwrap_or("upload")
            .replace(char::is_whitespace, "_");

        let mut file = tempfile::Builder::new()
            .prefix(&format!("image-{}-", chrono::Utc::now().timestamp_millis()))
            .suffix(&format!(".{}", safe_name))
            .tempfile_in(dir)?;
        file.write_all(bytes)?;
        file.flush()?;

        Ok(Self {
            file,
            original_name: original_name.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }
}

/// UploadForm
///
/// Parsed request body handed to the multipart-capable handlers.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: Map<String, Value>,
    files: HashMap<String, TempImage>,
}

impl UploadForm {
    /// Deserializes the text fields into a typed request payload.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Ok(serde_json::from_value(Value::Object(self.fields.clone()))?)
    }

    pub fn file(&self, name: &str) -> Option<&TempImage> {
        self.files.get(name)
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// Fails with a validation error listing every missing image field.
    pub fn require_files(&self, names: &[&str]) -> Result<(), ApiError> {
        let missing: Vec<_> = names
            .iter()
            .filter(|name| !self.has_file(name))
            .map(|name| FieldError::missing_image(name))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(missing))
        }
    }

    async fn from_multipart(mut multipart: Multipart, upload_dir: &Path) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match field.file_name().map(str::to_owned) {
                // An empty file input still arrives as a part with `filename=""`.
                Some(file_name) if file_name.is_empty() => {
                    tracing::debug!(field = %name, "skipping empty file part");
                }
                Some(file_name) => {
                    let content_type = field.content_type().unwrap_or_default().to_owned();
                    if !content_type.starts_with("image") {
                        return Err(ApiError::BadRequest("only image is allowed".to_string()));
                    }
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                    let image = TempImage::write(upload_dir, &file_name, &bytes)?;
                    tracing::debug!(field = %name, path = %image.path().display(), "image buffered");
                    form.files.insert(name, image);
                }
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                    form.fields.insert(name, Value::String(text));
                }
            }
        }

        Ok(form)
    }
}

impl<S> FromRequest<S> for UploadForm
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            Self::from_multipart(multipart, &config.upload_dir).await
        } else if content_type.starts_with("application/json") {
            let Json(fields) = Json::<Map<String, Value>>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            Ok(Self {
                fields,
                files: HashMap::new(),
            })
        } else {
            Ok(Self::default())
        }
    }
}
