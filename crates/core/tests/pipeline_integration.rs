//! Full pipeline tests: reconciliation, layout transforms, and transfer
//! orchestration against a real temporary filesystem, with the bulk-copy
//! collaborator mocked out.

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use romferry_core::catalog::{Catalog, CatalogEntry, CatalogStore, JsonCatalogStore};
use romferry_core::orchestrator::{RunError, RunOptions, SyncRunner};
use romferry_core::testing::{MockSpaceProbe, MockTransfer};
use romferry_core::{load_config_from_str, Config};

struct Fixture {
    source_dir: TempDir,
    target_dir: TempDir,
    config: Config,
    store: Arc<JsonCatalogStore>,
}

impl Fixture {
    /// A source tree with categories "alpha" and "snes", and a device tree
    /// in device layout: "alpha" renamed to "ALPHA" with images and the
    /// catalog document relocated to shared roots; "snes" untouched.
    async fn new() -> Self {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        let store = Arc::new(JsonCatalogStore::new());

        for category in ["alpha", "snes"] {
            tokio::fs::create_dir_all(source.path().join(category))
                .await
                .unwrap();
        }
        tokio::fs::create_dir_all(source.path().join("bios"))
            .await
            .unwrap();

        // Source catalogs: nothing marked favorite yet, one stale entry.
        let mut alpha = Catalog::new();
        let mut entry = CatalogEntry::new("./foo.rom", "Foo");
        entry.crc32 = Some("11111111".to_string());
        alpha.entries.push(entry);
        alpha.entries.push(CatalogEntry::new("./bar.rom", "Bar"));
        store
            .replace(&source.path().join("alpha/gamelist.json"), &alpha)
            .await
            .unwrap();

        let mut snes = Catalog::new();
        snes.entries.push(CatalogEntry::new("./baz.rom", "Baz"));
        store
            .replace(&source.path().join("snes/gamelist.json"), &snes)
            .await
            .unwrap();

        // Device layout for alpha: alias, shared media, shared metadata.
        tokio::fs::create_dir_all(target.path().join("ALPHA"))
            .await
            .unwrap();
        tokio::fs::create_dir_all(target.path().join("Media/ALPHA/Imgs"))
            .await
            .unwrap();
        tokio::fs::create_dir_all(target.path().join("Metadata/ALPHA"))
            .await
            .unwrap();
        tokio::fs::create_dir_all(target.path().join("Metadata/snes"))
            .await
            .unwrap();
        tokio::fs::create_dir_all(target.path().join("snes"))
            .await
            .unwrap();

        // Device snapshots carrying user state.
        let mut alpha_snapshot = Catalog::new();
        let mut snap = CatalogEntry::new("./foo.rom", "Foo");
        snap.favorite = Some(true);
        snap.hidden = Some(false);
        snap.playcount = Some(4);
        alpha_snapshot.entries.push(snap);
        store
            .replace(
                &target.path().join("Metadata/ALPHA/gamelist.json"),
                &alpha_snapshot,
            )
            .await
            .unwrap();

        let mut snes_snapshot = Catalog::new();
        let mut snap = CatalogEntry::new("./baz.rom", "Baz");
        snap.hidden = Some(true);
        snes_snapshot.entries.push(snap);
        store
            .replace(
                &target.path().join("Metadata/snes/gamelist.json"),
                &snes_snapshot,
            )
            .await
            .unwrap();

        let config = config_for(source.path(), target.path());

        Self {
            source_dir: source,
            target_dir: target,
            config,
            store,
        }
    }

    fn source(&self) -> &Path {
        self.source_dir.path()
    }

    fn target(&self) -> &Path {
        self.target_dir.path()
    }
}

fn config_for(source_root: &Path, target_root: &Path) -> Config {
    load_config_from_str(&format!(
        r#"
[paths]
source_root = "{source}"

[devices.pocket]
target_root = "{target}"
media_root = "Media"
metadata_root = "Metadata"
exclude = ["bios"]
bios_dir = "bios"

[devices.pocket.aliases]
alpha = "ALPHA"

[devices.pocket.media_folders]
images = "Imgs"
"#,
        source = source_root.display(),
        target = target_root.display(),
    ))
    .unwrap()
}

#[tokio::test]
async fn test_full_run_merges_and_restores_device_layout() {
    let fixture = Fixture::new().await;
    let transfer = Arc::new(MockTransfer::new());

    let runner = SyncRunner::new(
        fixture.config.clone(),
        RunOptions::new("pocket"),
        Arc::clone(&fixture.store),
        Arc::clone(&transfer),
    )
    .unwrap();

    let report = runner.run().await.unwrap();
    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.categories.len(), 2);
    assert!(report.all_succeeded());

    // Device favorites merged into the source catalog; the stale crc32
    // absent from the snapshot is untouched; hidden=false copied nothing.
    let merged = fixture
        .store
        .load(&fixture.source().join("alpha/gamelist.json"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(merged.entries[0].favorite, Some(true));
    assert_eq!(merged.entries[0].hidden, None);
    assert_eq!(merged.entries[0].playcount, Some(4));
    assert_eq!(merged.entries[0].crc32.as_deref(), Some("11111111"));
    assert_eq!(merged.entries[1].favorite, None);

    let merged_snes = fixture
        .store
        .load(&fixture.source().join("snes/gamelist.json"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(merged_snes.entries[0].hidden, Some(true));

    // Transfers saw canonical-layout paths, one invocation per category.
    let requests = transfer.recorded_requests().await;
    assert_eq!(requests.len(), 2);
    assert!(requests
        .iter()
        .any(|r| r.destination == fixture.target().join("alpha")));
    assert!(requests
        .iter()
        .any(|r| r.destination == fixture.target().join("snes")));

    // Device layout restored after the run.
    assert!(fixture.target().join("ALPHA").exists());
    assert!(fixture.target().join("Media/ALPHA/Imgs").exists());
    assert!(fixture.target().join("Metadata/ALPHA/gamelist.json").exists());
    assert!(fixture.target().join("Metadata/snes/gamelist.json").exists());
    assert!(!fixture.target().join("alpha").exists());
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let fixture = Fixture::new().await;
    let transfer = Arc::new(MockTransfer::new());

    for _ in 0..2 {
        let runner = SyncRunner::new(
            fixture.config.clone(),
            RunOptions::new("pocket"),
            Arc::clone(&fixture.store),
            Arc::clone(&transfer),
        )
        .unwrap();
        assert_eq!(runner.run().await.unwrap().exit_code(), 0);
    }

    let merged = fixture
        .store
        .load(&fixture.source().join("alpha/gamelist.json"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(merged.entries[0].favorite, Some(true));
    assert_eq!(merged.entries[0].playcount, Some(4));

    // Layout still in device form after the second round trip.
    assert!(fixture.target().join("ALPHA").exists());
    assert!(!fixture.target().join("alpha").exists());
}

#[tokio::test]
async fn test_fatal_transfer_isolates_the_category() {
    let fixture = Fixture::new().await;
    let transfer = Arc::new(MockTransfer::new());
    transfer.fail_category("alpha", "destination unreachable").await;

    let runner = SyncRunner::new(
        fixture.config.clone(),
        RunOptions::new("pocket"),
        Arc::clone(&fixture.store),
        Arc::clone(&transfer),
    )
    .unwrap();

    let report = runner.run().await.unwrap();
    assert_eq!(report.exit_code(), 1);

    let alpha = report
        .categories
        .iter()
        .find(|c| c.category == "alpha")
        .unwrap();
    assert!(alpha.failed());
    assert!(alpha.transfer_error.as_deref().unwrap().contains("unreachable"));

    // The other category completed, and alpha's reconciliation still
    // happened before the transfer failed.
    let snes = report
        .categories
        .iter()
        .find(|c| c.category == "snes")
        .unwrap();
    assert!(!snes.failed());

    let merged = fixture
        .store
        .load(&fixture.source().join("alpha/gamelist.json"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(merged.entries[0].favorite, Some(true));

    // Post-processing was skipped for alpha: the folder stays canonical.
    assert!(fixture.target().join("alpha").exists());
    assert!(!fixture.target().join("ALPHA").exists());
}

#[tokio::test]
async fn test_partial_transfer_warning_does_not_fail_category() {
    let fixture = Fixture::new().await;
    let transfer = Arc::new(MockTransfer::new());
    transfer.warn_category("snes", "3 files vanished").await;

    let runner = SyncRunner::new(
        fixture.config.clone(),
        RunOptions::new("pocket"),
        Arc::clone(&fixture.store),
        Arc::clone(&transfer),
    )
    .unwrap();

    let report = runner.run().await.unwrap();
    assert_eq!(report.exit_code(), 0);
    let snes = report
        .categories
        .iter()
        .find(|c| c.category == "snes")
        .unwrap();
    assert!(!snes.failed());
    assert!(!snes.transfer.as_ref().unwrap().is_clean());
}

#[tokio::test]
async fn test_dry_run_simulates_transfer_but_reconciles() {
    let fixture = Fixture::new().await;
    let transfer = Arc::new(MockTransfer::new());

    let runner = SyncRunner::new(
        fixture.config.clone(),
        RunOptions::new("pocket").with_dry_run(true),
        Arc::clone(&fixture.store),
        Arc::clone(&transfer),
    )
    .unwrap();
    runner.run().await.unwrap();

    for request in transfer.recorded_requests().await {
        assert!(request.dry_run);
    }

    // The merge is considered safe and runs unconditionally.
    let merged = fixture
        .store
        .load(&fixture.source().join("alpha/gamelist.json"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(merged.entries[0].favorite, Some(true));
}

#[tokio::test]
async fn test_skip_reconcile_leaves_source_untouched() {
    let fixture = Fixture::new().await;
    let transfer = Arc::new(MockTransfer::new());

    let runner = SyncRunner::new(
        fixture.config.clone(),
        RunOptions::new("pocket").with_skip_reconcile(true),
        Arc::clone(&fixture.store),
        Arc::clone(&transfer),
    )
    .unwrap();
    runner.run().await.unwrap();

    let source = fixture
        .store
        .load(&fixture.source().join("alpha/gamelist.json"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(source.entries[0].favorite, None);
}

#[tokio::test]
async fn test_explicit_category_list_limits_the_run() {
    let fixture = Fixture::new().await;
    let transfer = Arc::new(MockTransfer::new());

    let runner = SyncRunner::new(
        fixture.config.clone(),
        RunOptions::new("pocket").with_categories(vec!["snes".to_string()]),
        Arc::clone(&fixture.store),
        Arc::clone(&transfer),
    )
    .unwrap();
    let report = runner.run().await.unwrap();

    assert_eq!(report.categories.len(), 1);
    assert_eq!(report.categories[0].category, "snes");
    assert_eq!(transfer.request_count().await, 1);
}

#[tokio::test]
async fn test_bios_copy_on_request() {
    let fixture = Fixture::new().await;
    let transfer = Arc::new(MockTransfer::new());

    let runner = SyncRunner::new(
        fixture.config.clone(),
        RunOptions::new("pocket").with_bios(true),
        Arc::clone(&fixture.store),
        Arc::clone(&transfer),
    )
    .unwrap();
    let report = runner.run().await.unwrap();

    let requests = transfer.recorded_requests().await;
    let bios = requests.iter().find(|r| r.category == "bios").unwrap();
    assert_eq!(bios.destination, fixture.target().join("bios"));
    // Purge never applies to the BIOS folder.
    assert!(!bios.purge);
    assert!(report.categories.iter().any(|c| c.category == "bios"));
}

#[tokio::test]
async fn test_missing_source_root_is_fatal() {
    let target = TempDir::new().unwrap();
    let config = config_for(Path::new("/nonexistent/roms"), target.path());

    let runner = SyncRunner::new(
        config,
        RunOptions::new("pocket"),
        Arc::new(JsonCatalogStore::new()),
        Arc::new(MockTransfer::new()),
    )
    .unwrap();
    let err = runner.run().await.unwrap_err();
    assert!(matches!(err, RunError::Precondition(_)));
}

#[tokio::test]
async fn test_missing_target_root_is_fatal() {
    let source = TempDir::new().unwrap();
    let config = config_for(source.path(), Path::new("/nonexistent/device"));

    let runner = SyncRunner::new(
        config,
        RunOptions::new("pocket"),
        Arc::new(JsonCatalogStore::new()),
        Arc::new(MockTransfer::new()),
    )
    .unwrap();
    assert!(runner.run().await.is_err());
}

#[tokio::test]
async fn test_insufficient_space_is_fatal() {
    let fixture = Fixture::new().await;
    let mut config = fixture.config.clone();
    config.sync.min_free_bytes = 10_000;

    let transfer = Arc::new(MockTransfer::new());
    let runner = SyncRunner::new(
        config,
        RunOptions::new("pocket"),
        Arc::clone(&fixture.store),
        Arc::clone(&transfer),
    )
    .unwrap()
    .with_space_probe(Arc::new(MockSpaceProbe::with_available(4_096)));

    let err = runner.run().await.unwrap_err();
    assert!(matches!(err, RunError::Precondition(_)));
    // Aborted before any category was touched.
    assert_eq!(transfer.request_count().await, 0);
}

#[tokio::test]
async fn test_unknown_space_skips_the_check() {
    let fixture = Fixture::new().await;
    let mut config = fixture.config.clone();
    config.sync.min_free_bytes = 10_000;

    let runner = SyncRunner::new(
        config,
        RunOptions::new("pocket"),
        Arc::clone(&fixture.store),
        Arc::new(MockTransfer::new()),
    )
    .unwrap()
    .with_space_probe(Arc::new(MockSpaceProbe::unknown()));

    assert!(runner.run().await.is_ok());
}

#[tokio::test]
async fn test_unknown_device_is_a_config_error() {
    let fixture = Fixture::new().await;
    let result = SyncRunner::new(
        fixture.config.clone(),
        RunOptions::new("brick"),
        Arc::clone(&fixture.store),
        Arc::new(MockTransfer::new()),
    );
    assert!(matches!(result, Err(RunError::Config(_))));
}
