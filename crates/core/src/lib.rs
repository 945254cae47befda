pub mod catalog;
pub mod categories;
pub mod config;
pub mod layout;
pub mod orchestrator;
pub mod reconcile;
pub mod testing;
pub mod transfer;

pub use catalog::{
    find_entry, normalize, Catalog, CatalogEntry, CatalogError, CatalogStore, JsonCatalogStore,
    PreservedField,
};
pub use categories::{discover_source_subdirs, resolve_categories, Category};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DeviceConfig,
    PathsConfig, SyncConfig,
};
pub use layout::{commit_dirs, LayoutRules, LayoutTransformer, LayoutWarning};
pub use orchestrator::{
    CategoryReport, NoopSpaceProbe, PreconditionError, RunError, RunOptions, RunReport,
    SpaceProbe, SyncRunner,
};
pub use reconcile::{ReconcileEngine, ReconcileError, ReconcileOutcome};
pub use transfer::{
    RsyncConfig, RsyncTransfer, Transfer, TransferError, TransferOutcome, TransferRequest,
    TransferStats,
};
