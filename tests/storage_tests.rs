mod common;

use common::capture_logs;
use std::{io::Write, path::Path};
use tour_cms::{
    MockImageHost, S3ImageHost,
    error::UploadError,
    storage::{ImageHost, content_type_for, image_extension},
};

fn temp_png() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("image-test-")
        .suffix(".hero.png")
        .tempfile()
        .unwrap();
    file.write_all(b"\x89PNG").unwrap();
    file
}

#[tokio::test]
async fn test_mock_upload_success() {
    let host = MockImageHost::new();
    let file = temp_png();

    let url = host.upload(file.path()).await.unwrap();

    let file_name = file.path().file_name().unwrap().to_str().unwrap();
    assert_eq!(url, format!("http://localhost:9000/mock-bucket/{}", file_name));
    assert_eq!(host.uploaded(), vec![url]);
}

#[tokio::test]
async fn test_mock_upload_failure() {
    let host = MockImageHost::new_failing();
    let file = temp_png();

    let result = host.upload(file.path()).await;

    assert!(matches!(result, Err(UploadError::Rejected(_))));
    assert!(host.uploaded().is_empty());
}

#[tokio::test]
async fn test_mock_upload_missing_file() {
    let host = MockImageHost::new();

    let result = host
        .upload(Path::new("/definitely/not/here/image.png"))
        .await;

    assert!(matches!(result, Err(UploadError::Io(_))));
}

#[tokio::test]
async fn test_mock_clones_share_upload_log() {
    let host = MockImageHost::new();
    let clone = host.clone();
    let file = temp_png();

    clone.upload(file.path()).await.unwrap();

    assert_eq!(host.uploaded().len(), 1);
}

#[test]
fn test_extension_helpers() {
    assert_eq!(image_extension(Path::new("/tmp/a.hero.png")), "png");
    assert_eq!(image_extension(Path::new("/tmp/noext")), "bin");

    assert_eq!(content_type_for("JPG"), "image/jpeg");
    assert_eq!(content_type_for("png"), "image/png");
    assert_eq!(content_type_for("webp"), "image/webp");
    assert_eq!(content_type_for("bin"), "application/octet-stream");
}

#[tokio::test]
async fn test_s3_host_construction() {
    let host = S3ImageHost::new(
        "http://localhost:9000",
        "us-east-1",
        "admin",
        "password",
        "tour-cms-test",
        "http://localhost:9000/tour-cms-test/",
    );
    // Building the client must not touch the network.
    let _ = host.clone();
}

#[tokio::test]
async fn test_mock_upload_fails_past_limit() {
    let host = MockImageHost::new_failing_after(1);
    let first = temp_png();
    let second = temp_png();

    let url = host.upload(first.path()).await.unwrap();
    let result = host.upload(second.path()).await;

    assert!(matches!(result, Err(UploadError::Rejected(_))));
    assert_eq!(host.uploaded(), vec![url]);
}

#[tokio::test]
async fn test_unreachable_bucket_is_logged_as_warning() {
    let host = S3ImageHost::new(
        "http://127.0.0.1:1",
        "us-east-1",
        "admin",
        "password",
        "tour-cms-test",
        "http://127.0.0.1:1/tour-cms-test",
    );
    let (_guard, logs) = capture_logs();

    host.ensure_bucket_exists().await;

    let logs = logs.contents();
    assert!(logs.contains("WARN"), "{logs}");
    assert!(logs.contains("could not ensure bucket exists"), "{logs}");
    assert!(logs.contains("bucket=tour-cms-test"), "{logs}");
}

#[tokio::test]
#[ignore = "requires a running MinIO at localhost:9000"]
async fn test_s3_upload_against_minio() {
    let host = S3ImageHost::new(
        "http://localhost:9000",
        "us-east-1",
        "admin",
        "password",
        "tour-cms-test",
        "http://localhost:9000/tour-cms-test",
    );
    host.ensure_bucket_exists().await;
    let file = temp_png();

    let url = host.upload(file.path()).await.unwrap();

    assert!(url.starts_with("http://localhost:9000/tour-cms-test/images/"));
    assert!(url.ends_with(".png"));
}
