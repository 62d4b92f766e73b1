//! Background adapter integration tests.

mod common;

use std::fs;
use std::sync::Arc;
use std::time::SystemTime;

use common::{FixedClock, ScriptedFetcher};
use zenithsync::{
    BackgroundAdapter, SharedStore, SyncConfig, SyncEngine, SyncError, SyncPhase, TriggerKind,
};

const MANIFEST_URL: &str = "https://x/manifest.json";
const MANIFEST: &[u8] = br#"{
    "assets": [
        {"id": "workouts", "url": "https://x/workouts.json"},
        {"id": "ns.image.Atlas", "url": "https://x/images/Atlas.jpg", "estimated_size_bytes": 2048}
    ]
}"#;

fn adapter_with(
    store_root: &std::path::Path,
    fetcher: Arc<ScriptedFetcher>,
) -> BackgroundAdapter {
    BackgroundAdapter::new(fetcher, Arc::new(SharedStore::new(store_root)))
}

#[tokio::test]
async fn schedule_downloads_plans_every_manifest_asset() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher.respond_bytes(MANIFEST_URL, MANIFEST);
    let adapter = adapter_with(dir.path(), fetcher);

    let requests = adapter
        .schedule_downloads(MANIFEST_URL, TriggerKind::Install)
        .await;

    assert_eq!(requests.len(), 2);
    let workouts = requests.iter().find(|r| r.id == "workouts").unwrap();
    assert_eq!(workouts.url, "https://x/workouts.json");
    assert!(workouts.essential);
    assert_eq!(workouts.estimated_size_bytes, 1024 * 1024);

    let image = requests.iter().find(|r| r.id == "ns.image.Atlas").unwrap();
    assert!(image.essential);
    assert_eq!(image.estimated_size_bytes, 2048);
}

#[tokio::test]
async fn periodic_trigger_schedules_non_essential_downloads() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher.respond_bytes(MANIFEST_URL, MANIFEST);
    let adapter = adapter_with(dir.path(), fetcher);

    let requests = adapter
        .schedule_downloads(MANIFEST_URL, TriggerKind::Periodic)
        .await;

    assert!(requests.iter().all(|r| !r.essential));
}

#[tokio::test]
async fn malformed_manifest_schedules_nothing_and_records_error() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher.respond_bytes(MANIFEST_URL, b"not a manifest");
    let adapter = adapter_with(dir.path(), fetcher);

    let requests = adapter
        .schedule_downloads(MANIFEST_URL, TriggerKind::Update)
        .await;

    assert!(requests.is_empty());
    assert!(matches!(
        adapter.last_error(),
        Some(SyncError::DataProcessing(_))
    ));
}

#[tokio::test]
async fn unreachable_manifest_schedules_nothing_and_records_error() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher.respond_error(MANIFEST_URL, SyncError::network("no route to host"));
    let adapter = adapter_with(dir.path(), fetcher);

    let requests = adapter
        .schedule_downloads(MANIFEST_URL, TriggerKind::Periodic)
        .await;

    assert!(requests.is_empty());
    assert_eq!(
        adapter.last_error(),
        Some(SyncError::network("no route to host"))
    );
}

#[tokio::test]
async fn duplicate_manifest_ids_schedule_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher.respond_bytes(
        MANIFEST_URL,
        br#"{"assets": [
            {"id": "workouts", "url": "https://x/1"},
            {"id": "workouts", "url": "https://x/2"}
        ]}"#,
    );
    let adapter = adapter_with(dir.path(), fetcher);

    let requests = adapter
        .schedule_downloads(MANIFEST_URL, TriggerKind::Install)
        .await;

    assert!(requests.is_empty());
    assert!(adapter.last_error().is_some());
}

#[test]
fn complete_download_routes_into_the_store() {
    let store_dir = tempfile::tempdir().unwrap();
    let staging = tempfile::tempdir().unwrap();
    let temp_file = staging.path().join("finished.tmp");
    fs::write(&temp_file, b"{\"Atlas\": []}").unwrap();

    let adapter = adapter_with(store_dir.path(), Arc::new(ScriptedFetcher::new()));
    let committed = adapter.complete_download("workouts", &temp_file).unwrap();

    assert_eq!(committed, Some(store_dir.path().join("workouts.json")));
    assert_eq!(
        fs::read(store_dir.path().join("workouts.json")).unwrap(),
        b"{\"Atlas\": []}".to_vec()
    );
    assert!(!temp_file.exists(), "temp file must be consumed");
}

#[test]
fn complete_download_discards_unrecognized_id() {
    let store_dir = tempfile::tempdir().unwrap();
    let staging = tempfile::tempdir().unwrap();
    let temp_file = staging.path().join("finished.tmp");
    fs::write(&temp_file, b"whatever").unwrap();

    let adapter = adapter_with(store_dir.path(), Arc::new(ScriptedFetcher::new()));
    let committed = adapter.complete_download("unknown.thing", &temp_file).unwrap();

    assert_eq!(committed, None);
    assert!(!temp_file.exists(), "unroutable temp file must be discarded");
    assert_eq!(fs::read_dir(store_dir.path()).unwrap().count(), 0);
}

#[test]
fn fail_download_records_without_retrying() {
    let dir = tempfile::tempdir().unwrap();
    let adapter = adapter_with(dir.path(), Arc::new(ScriptedFetcher::new()));

    adapter.fail_download("workouts", &SyncError::network("timed out"));

    assert_eq!(adapter.last_error(), Some(SyncError::network("timed out")));
}

#[tokio::test]
async fn background_completion_interleaves_with_foreground_sync() {
    let dir = tempfile::tempdir().unwrap();

    // Foreground engine with its own store handle.
    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher.respond_bytes("https://x/workouts.json", br#"{"Atlas": []}"#);
    fetcher.respond_bytes("https://x/definitions.json", b"[]");
    fetcher.respond_bytes("https://x/descriptions.json", b"{}");
    fetcher.respond_bytes("https://x/images/Atlas.jpg", b"atlas");
    let config = SyncConfig::new(dir.path())
        .with_config_base_url("https://x")
        .with_media_base_url("https://x/images");
    let engine = Arc::new(SyncEngine::with_parts(
        config,
        fetcher,
        Arc::new(FixedClock(SystemTime::UNIX_EPOCH)),
    ));

    // Background adapter with an independent handle on the same root.
    let adapter = Arc::new(adapter_with(
        dir.path(),
        Arc::new(ScriptedFetcher::new()),
    ));
    let staging = tempfile::tempdir().unwrap();
    let temp_file = staging.path().join("borealis.tmp");
    fs::write(&temp_file, b"borealis").unwrap();

    let background = {
        let adapter = Arc::clone(&adapter);
        tokio::task::spawn_blocking(move || {
            adapter.complete_download("ns.image.Borealis", &temp_file)
        })
    };

    let (phase, completed) = tokio::join!(engine.run_sync(), background);
    assert!(matches!(phase, SyncPhase::Completed(_)));
    assert!(completed.unwrap().unwrap().is_some());

    assert_eq!(
        fs::read(dir.path().join("images/Atlas.jpg")).unwrap(),
        b"atlas".to_vec()
    );
    assert_eq!(
        fs::read(dir.path().join("images/Borealis.jpg")).unwrap(),
        b"borealis".to_vec()
    );
}
