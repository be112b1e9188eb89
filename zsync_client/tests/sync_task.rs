use std::sync::Arc;

use file_reconstruction::{DownloadRange, FileReconstructionError, ReconstructionPlan, ReuseRange, StaticRangePlanner};
use progress_tracking::NoOpProgressUpdater;
use tracing_test::traced_test;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zsync_client::{SyncTask, ZsyncClientError};
use zsync_config::{IntegrityPolicy, ZsyncConfig};

const DIGITS_SHA1: &str = "87acec17cd9dcd20a716cc2cf67417b71c8a7016";

fn descriptor(url: &str, sha1: &str) -> Vec<u8> {
    let mut d = format!(
        "zsync: 0.6.2\nFilename: part.bin\nMTime: Tue, 14 Nov 2023 22:13:20 +0000\nBlocksize: 2048\n\
         Length: 10\nHash-Lengths: 1,2,4\nURL: {url}\nSHA-1: {sha1}\n\n"
    )
    .into_bytes();
    // Binary block checksums follow the header.
    d.extend_from_slice(&[0x00, 0xff, 0x10, 0x0a, 0x0a, 0x7f]);
    d
}

async fn serve_descriptor(server: &MockServer, body: Vec<u8>) -> String {
    Mock::given(method("GET"))
        .and(path("/files/part.bin.zsync"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .expect(1)
        .mount(server)
        .await;
    format!("{}/files/part.bin.zsync", server.uri())
}

async fn serve_tail(server: &MockServer, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path("/files/part.bin"))
        .and(header("Range", "bytes=5-9"))
        .respond_with(ResponseTemplate::new(206).set_body_bytes(body.to_vec()))
        .expect(1)
        .mount(server)
        .await;
}

fn head_and_tail_plan() -> Arc<StaticRangePlanner> {
    Arc::new(StaticRangePlanner(
        ReconstructionPlan::new(vec![ReuseRange::new(0, 0, 5)], vec![DownloadRange::new(5, 9)]).with_length(10),
    ))
}

#[tokio::test]
async fn test_sync_in_place() {
    let server = MockServer::start().await;
    let location = serve_descriptor(&server, descriptor("part.bin", DIGITS_SHA1)).await;
    serve_tail(&server, b"56789").await;

    let dir = tempfile::tempdir().unwrap();
    let seed = dir.path().join("part.bin");
    std::fs::write(&seed, b"01234").unwrap();

    let outcome = SyncTask::new(location, &seed, ZsyncConfig::default())
        .with_planner(head_and_tail_plan())
        .with_progress_updater(NoOpProgressUpdater::new())
        .run()
        .await
        .unwrap();

    assert_eq!(std::fs::read(&seed).unwrap(), b"0123456789");
    assert_eq!(outcome.output_path(), seed.as_path());
    assert_eq!(outcome.target_length, 10);
    assert_eq!(outcome.sha1, DIGITS_SHA1);
    assert_eq!(outcome.download_url.as_str(), format!("{}/files/part.bin", server.uri()));
    assert_eq!(outcome.summary.bytes_reused, 5);
    assert_eq!(outcome.summary.bytes_downloaded, 5);

    let mtime = std::fs::metadata(&seed).unwrap().modified().unwrap();
    assert_eq!(mtime, std::time::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000));
}

#[tokio::test]
async fn test_sync_to_output_file() {
    let server = MockServer::start().await;
    let location = serve_descriptor(&server, descriptor("part.bin", DIGITS_SHA1)).await;
    serve_tail(&server, b"56789").await;

    let dir = tempfile::tempdir().unwrap();
    let seed = dir.path().join("old.bin");
    let out = dir.path().join("new.bin");
    std::fs::write(&seed, b"01234").unwrap();

    SyncTask::new(location, &seed, ZsyncConfig::default())
        .with_output_path(&out)
        .with_planner(head_and_tail_plan())
        .run()
        .await
        .unwrap();

    assert_eq!(std::fs::read(&out).unwrap(), b"0123456789");
    assert_eq!(std::fs::read(&seed).unwrap(), b"01234");
}

#[tokio::test]
async fn test_absolute_url_in_descriptor() {
    let metadata_server = MockServer::start().await;
    let file_server = MockServer::start().await;

    let file_url = format!("{}/files/part.bin", file_server.uri());
    let location = serve_descriptor(&metadata_server, descriptor(&file_url, DIGITS_SHA1)).await;
    serve_tail(&file_server, b"56789").await;

    let dir = tempfile::tempdir().unwrap();
    let seed = dir.path().join("part.bin");
    std::fs::write(&seed, b"01234").unwrap();

    let outcome = SyncTask::new(location, &seed, ZsyncConfig::default())
        .with_planner(head_and_tail_plan())
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.download_url.as_str(), file_url);
    assert_eq!(std::fs::read(&seed).unwrap(), b"0123456789");
}

#[tokio::test]
#[traced_test]
async fn test_advisory_mismatch_keeps_file() {
    let server = MockServer::start().await;
    let location = serve_descriptor(&server, descriptor("part.bin", DIGITS_SHA1)).await;
    serve_tail(&server, b"5678X").await;

    let dir = tempfile::tempdir().unwrap();
    let seed = dir.path().join("part.bin");
    std::fs::write(&seed, b"01234").unwrap();

    let err = SyncTask::new(location, &seed, ZsyncConfig::default())
        .with_planner(head_and_tail_plan())
        .run()
        .await
        .unwrap_err();

    match err {
        ZsyncClientError::Reconstruction(FileReconstructionError::IntegrityMismatch { expected, actual }) => {
            assert_eq!(expected, DIGITS_SHA1);
            assert_eq!(actual, "2d2fa1f59600aa2514fbe6338422384832ee161e");
        },
        e => panic!("unexpected error {e:?}"),
    }
    assert_eq!(std::fs::read(&seed).unwrap(), b"012345678X");
    assert!(logs_contain("Output kept despite SHA-1 mismatch"));
}

#[tokio::test]
async fn test_strict_mismatch_keeps_seed() {
    let server = MockServer::start().await;
    let location = serve_descriptor(&server, descriptor("part.bin", DIGITS_SHA1)).await;
    serve_tail(&server, b"5678X").await;

    let dir = tempfile::tempdir().unwrap();
    let seed = dir.path().join("part.bin");
    std::fs::write(&seed, b"01234").unwrap();

    let mut config = ZsyncConfig::default();
    config.reconstruction.integrity_policy = IntegrityPolicy::Strict;

    let err = SyncTask::new(location, &seed, config)
        .with_planner(head_and_tail_plan())
        .run()
        .await
        .unwrap_err();

    assert!(err.is_integrity_mismatch());
    assert_eq!(std::fs::read(&seed).unwrap(), b"01234");
}

#[tokio::test]
async fn test_truncated_descriptor() {
    let server = MockServer::start().await;
    let location = serve_descriptor(&server, b"zsync: 0.6.2\nLength: 10\n".to_vec()).await;

    let dir = tempfile::tempdir().unwrap();
    let seed = dir.path().join("part.bin");
    std::fs::write(&seed, b"01234").unwrap();

    let err = SyncTask::new(location, &seed, ZsyncConfig::default())
        .with_planner(head_and_tail_plan())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ZsyncClientError::Reconstruction(FileReconstructionError::MalformedMetadata(_))
    ));
    assert_eq!(std::fs::read(&seed).unwrap(), b"01234");
}

#[tokio::test]
async fn test_local_descriptor_needing_no_downloads() {
    let dir = tempfile::tempdir().unwrap();
    let metadata = dir.path().join("part.bin.zsync");
    std::fs::write(&metadata, descriptor("part.bin", DIGITS_SHA1)).unwrap();

    let seed = dir.path().join("part.bin");
    std::fs::write(&seed, b"0123456789").unwrap();

    let planner = Arc::new(StaticRangePlanner(ReconstructionPlan::new(vec![ReuseRange::new(0, 0, 10)], vec![])));
    let outcome = SyncTask::new(metadata.to_str().unwrap(), &seed, ZsyncConfig::default())
        .with_planner(planner)
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.summary.download_requests, 0);
    assert_eq!(outcome.download_url.scheme(), "file");
    assert_eq!(std::fs::read(&seed).unwrap(), b"0123456789");
}

#[cfg(unix)]
#[tokio::test]
async fn test_planner_command_failure() {
    let dir = tempfile::tempdir().unwrap();
    let metadata = dir.path().join("part.bin.zsync");
    std::fs::write(&metadata, descriptor("part.bin", DIGITS_SHA1)).unwrap();
    let seed = dir.path().join("part.bin");
    std::fs::write(&seed, b"01234").unwrap();

    let mut config = ZsyncConfig::default();
    config.planner.command = "false".to_owned();

    let err = SyncTask::new(metadata.to_str().unwrap(), &seed, config)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ZsyncClientError::Reconstruction(FileReconstructionError::PlannerFailure(_))
    ));
}
