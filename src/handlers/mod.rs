//! Route handlers.
//!
//! Every mutating handler follows the same read-modify-write sequence:
//! authenticate, load the aggregate, check ownership, locate the nested node,
//! upload any images, mutate the in-memory document, save it whole, respond.
//! Uploads happen before the first mutation so a failed upload leaves the
//! aggregate untouched.

use uuid::Uuid;

use crate::{AppState, error::ApiError, models::Owned, upload::UploadForm};

pub mod blog;
pub mod category;

/// Returns the aggregate if it exists and belongs to `user_id`.
///
/// Missing → 404 `"<what> not found"`; owned by someone else → 403 "Not Allowed".
pub(crate) fn authorize<T: Owned>(
    aggregate: Option<T>,
    user_id: Uuid,
    what: &str,
) -> Result<T, ApiError> {
    let aggregate = aggregate.ok_or_else(|| ApiError::not_found(what))?;
    if !aggregate.is_owned_by(user_id) {
        tracing::warn!(%user_id, owner = %aggregate.owner(), "{} access denied", what);
        return Err(ApiError::NotAllowed);
    }
    Ok(aggregate)
}

/// Uploads the image attached under `field`, if any, and returns its URL.
pub(crate) async fn upload_image(
    state: &AppState,
    form: &UploadForm,
    field: &str,
) -> Result<Option<String>, ApiError> {
    let Some(image) = form.file(field) else {
        return Ok(None);
    };
    let url = state.images.upload(image.path()).await?;
    tracing::info!(field, original = image.original_name(), %url, "image stored");
    Ok(Some(url))
}

/// Uploads the images attached under `fields`, in order.
///
/// When one upload fails, the ones already stored are reported as orphaned
/// before the error is returned.
pub(crate) async fn upload_images<const N: usize>(
    state: &AppState,
    form: &UploadForm,
    fields: [&str; N],
) -> Result<[Option<String>; N], ApiError> {
    let mut urls: [Option<String>; N] = std::array::from_fn(|_| None);
    for (i, field) in fields.into_iter().enumerate() {
        match upload_image(state, form, field).await {
            Ok(url) => urls[i] = url,
            Err(err) => {
                let stored: Vec<String> = urls.iter().flatten().cloned().collect();
                return Err(orphaned(err, &stored));
            }
        }
    }
    Ok(urls)
}

/// Logs `uploaded` as unreferenced after a failed request and passes the error on.
pub(crate) fn orphaned(err: impl Into<ApiError>, uploaded: &[String]) -> ApiError {
    let err = err.into();
    for url in uploaded {
        tracing::warn!(%url, error = %err, "uploaded image left orphaned");
    }
    err
}
