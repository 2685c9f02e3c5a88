mod common;

use axum::http::{Method, StatusCode};
use common::{TEST_USER, context_with, multipart_request, seed_category, send};
use std::path::Path;
use tour_cms::{AppConfig, MockImageHost, upload::TempImage};

fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[test]
fn test_temp_image_is_removed_on_drop() {
    let dir = tempfile::tempdir().unwrap();

    let image = TempImage::write(dir.path(), "my holiday.png", b"\x89PNG").unwrap();
    let path = image.path().to_path_buf();

    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("image-"));
    assert!(name.ends_with("my_holiday.png"));
    assert_eq!(image.original_name(), "my holiday.png");
    assert!(path.exists());

    drop(image);
    assert!(!path.exists());
}

#[test]
fn test_temp_image_strips_client_directories() {
    let dir = tempfile::tempdir().unwrap();

    let image = TempImage::write(dir.path(), "../../etc/passwd.png", b"x").unwrap();

    assert_eq!(image.path().parent(), Some(dir.path()));
    assert!(image.path().to_str().unwrap().ends_with("passwd.png"));
}

#[tokio::test]
async fn test_upload_dir_is_empty_after_request() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        upload_dir: dir.path().to_path_buf(),
        ..AppConfig::default()
    };
    let ctx = context_with(MockImageHost::new(), config);
    let category = seed_category(ctx.repo.as_ref(), TEST_USER, "Hiking").await;

    let (status, _) = send(
        &ctx.router,
        multipart_request(
            Method::POST,
            &format!("/api/category/{}/subcategories", category.id),
            TEST_USER,
            &[("subCategory", "Everest")],
            &[
                ("subCatimage", "main.png"),
                ("about1image", "about1.png"),
                ("about2image", "about2.png"),
            ],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(ctx.images.uploaded().len(), 3);
    assert_eq!(entries(dir.path()), 0);
}

#[tokio::test]
async fn test_upload_dir_is_empty_after_rejected_request() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        upload_dir: dir.path().to_path_buf(),
        ..AppConfig::default()
    };
    let ctx = context_with(MockImageHost::new_failing(), config);
    let category = seed_category(ctx.repo.as_ref(), TEST_USER, "Hiking").await;

    let (status, _) = send(
        &ctx.router,
        multipart_request(
            Method::POST,
            &format!("/api/category/{}/subcategories", category.id),
            TEST_USER,
            &[("subCategory", "Everest")],
            &[("subCatimage", "main.png")],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(entries(dir.path()), 0);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let config = AppConfig {
        max_upload_bytes: 64,
        ..AppConfig::default()
    };
    let ctx = context_with(MockImageHost::new(), config);
    let category = seed_category(ctx.repo.as_ref(), TEST_USER, "Hiking").await;
    let big = "x".repeat(1024);

    let (status, _) = send(
        &ctx.router,
        multipart_request(
            Method::POST,
            &format!("/api/category/{}/subcategories", category.id),
            TEST_USER,
            &[("subCategory", big.as_str())],
            &[],
        ),
    )
    .await;

    assert!(status.is_client_error(), "got {status}");
    assert!(ctx.images.uploaded().is_empty());
}
