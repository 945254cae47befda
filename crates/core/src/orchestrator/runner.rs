//! Run orchestrator implementation.
//!
//! Drives one synchronization run through its phases:
//! - Preconditions: fatal checks before anything is touched
//! - Reconciliation: parallel per category - IO-bound, no shared state
//! - Reverse layout transforms: all categories, then a durability barrier
//! - Transfer + forward transforms: sequential per category
//! - Summary

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::catalog::CatalogStore;
use crate::categories::{discover_source_subdirs, resolve_categories, Category};
use crate::config::{Config, DeviceConfig};
use crate::layout::{commit_dirs, LayoutRules, LayoutTransformer};
use crate::reconcile::ReconcileEngine;
use crate::transfer::{Transfer, TransferRequest};

use super::config::RunOptions;
use super::types::{
    CategoryReport, NoopSpaceProbe, PreconditionError, RunError, RunReport, SpaceProbe,
};

/// The run orchestrator - takes one device through a full synchronization.
pub struct SyncRunner<S, T>
where
    S: CatalogStore + 'static,
    T: Transfer + 'static,
{
    config: Config,
    device: DeviceConfig,
    options: RunOptions,
    store: Arc<S>,
    transfer: Arc<T>,
    space_probe: Arc<dyn SpaceProbe>,
}

impl<S, T> SyncRunner<S, T>
where
    S: CatalogStore + 'static,
    T: Transfer + 'static,
{
    /// Creates a runner for the device named in the options.
    pub fn new(
        config: Config,
        options: RunOptions,
        store: Arc<S>,
        transfer: Arc<T>,
    ) -> Result<Self, RunError> {
        let device = config.device(&options.device)?.clone();
        Ok(Self {
            config,
            device,
            options,
            store,
            transfer,
            space_probe: Arc::new(NoopSpaceProbe),
        })
    }

    /// Plugs in a free-space collaborator.
    pub fn with_space_probe(mut self, probe: Arc<dyn SpaceProbe>) -> Self {
        self.space_probe = probe;
        self
    }

    /// Runs the full pipeline and returns the per-category report.
    ///
    /// `Err` means a fatal pre-run failure; nothing was mutated. Category
    /// failures are not errors here - they are recorded in the report and
    /// reflected in its exit code.
    pub async fn run(&self) -> Result<RunReport, RunError> {
        let started_at = Utc::now();
        let started = Instant::now();

        self.check_preconditions().await?;
        let names = self.resolve_categories().await?;
        let categories: Vec<Category> = names
            .iter()
            .map(|n| Category::new(n.clone(), &self.config.paths.source_root, &self.device.target_root))
            .collect();

        info!(
            device = %self.options.device,
            categories = categories.len(),
            dry_run = self.options.dry_run,
            "Starting synchronization run"
        );

        let mut reports: Vec<CategoryReport> =
            names.iter().map(|n| CategoryReport::new(n.clone())).collect();

        let rules = LayoutRules::from_device(&self.device, &self.config.paths.catalog_filename);
        let transformer = LayoutTransformer::new(rules);

        // Phase: reconciliation, fanned out per category.
        if self.options.skip_reconcile {
            info!("Reconciliation skipped on request");
        } else {
            self.reconcile_all(transformer.rules(), &categories, &mut reports)
                .await;
        }

        // Phase: every category back to canonical layout before any
        // transfer starts, then flush so the copies see real state.
        for report in reports.iter_mut().filter(|r| !r.failed()) {
            let warnings = transformer.to_canonical(&report.category).await;
            report.layout_warnings.extend(warnings);
        }
        commit_dirs(self.barrier_dirs(&names)).await;

        // Phase: transfer and forward transform, category by category.
        for (category, report) in categories.iter().zip(reports.iter_mut()) {
            if report.failed() {
                debug!(category = %report.category, "Skipping transfer for failed category");
                continue;
            }
            let phase_start = Instant::now();
            let request = TransferRequest {
                category: category.name.clone(),
                source: category.source_path.clone(),
                destination: category.target_path.clone(),
                excludes: self.device.transfer_excludes(&category.name),
                purge: self.options.purge,
                dry_run: self.options.dry_run,
            };
            match self.transfer.transfer(request).await {
                Ok(outcome) => {
                    report.transfer = Some(outcome);
                    let warnings = transformer.to_device(&report.category).await;
                    report.layout_warnings.extend(warnings);
                }
                Err(e) => {
                    error!(category = %report.category, "Transfer failed: {e}");
                    report.transfer_error = Some(e.to_string());
                }
            }
            report.duration_ms += phase_start.elapsed().as_millis() as u64;
        }

        if self.options.include_bios {
            if let Some(report) = self.copy_bios().await {
                reports.push(report);
            }
        }

        commit_dirs(self.barrier_dirs(&names)).await;

        let report = RunReport {
            device: self.options.device.clone(),
            dry_run: self.options.dry_run,
            started_at,
            duration_ms: started.elapsed().as_millis() as u64,
            categories: reports,
        };
        self.log_summary(&report);

        Ok(report)
    }

    /// Fatal checks, before any mutation.
    async fn check_preconditions(&self) -> Result<(), PreconditionError> {
        let source_root = &self.config.paths.source_root;
        if tokio::fs::metadata(source_root).await.is_err() {
            return Err(PreconditionError::SourceRootMissing {
                path: source_root.clone(),
            });
        }

        let target_root = &self.device.target_root;
        if tokio::fs::metadata(target_root).await.is_err() {
            return Err(PreconditionError::TargetRootMissing {
                path: target_root.clone(),
            });
        }

        let required = self.config.sync.min_free_bytes;
        if required > 0 {
            match self.space_probe.available_bytes(target_root) {
                Some(available) if available < required => {
                    return Err(PreconditionError::InsufficientSpace {
                        path: target_root.clone(),
                        required,
                        available,
                    });
                }
                Some(available) => {
                    debug!(available, required, "Free-space check passed");
                }
                None => {
                    debug!("Free space unknown, check skipped");
                }
            }
        }

        Ok(())
    }

    /// Resolves the category names this run will process.
    async fn resolve_categories(&self) -> Result<Vec<String>, PreconditionError> {
        let source_root = &self.config.paths.source_root;
        let subdirs = discover_source_subdirs(source_root).await.map_err(|e| {
            PreconditionError::SourceRootUnreadable {
                path: source_root.clone(),
                source: e,
            }
        })?;
        Ok(resolve_categories(
            &subdirs,
            &self.device.exclude,
            &self.options.categories,
        ))
    }

    /// Fans reconciliation out across categories under a bounded pool.
    ///
    /// Safe to parallelize: each category's documents are owned exclusively
    /// by its worker for the duration of the run.
    async fn reconcile_all(
        &self,
        rules: &LayoutRules,
        categories: &[Category],
        reports: &mut [CategoryReport],
    ) {
        let engine = Arc::new(ReconcileEngine::new(
            Arc::clone(&self.store),
            self.config.sync.preserved_fields.iter().copied(),
        ));
        let semaphore = Arc::new(Semaphore::new(worker_limit()));

        let tasks: Vec<_> = categories
            .iter()
            .map(|category| {
                let source_doc = category
                    .source_path
                    .join(&self.config.paths.catalog_filename);
                let snapshot_doc = rules.device_catalog_path(&category.name);
                let category = category.name.clone();
                let engine = Arc::clone(&engine);
                let semaphore = Arc::clone(&semaphore);
                tokio::spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .expect("semaphore never closed");
                    let start = Instant::now();
                    let result = engine
                        .reconcile_category(&category, &source_doc, &snapshot_doc)
                        .await;
                    (result, start.elapsed().as_millis() as u64)
                })
            })
            .collect();

        for (report, joined) in reports.iter_mut().zip(join_all(tasks).await) {
            match joined {
                Ok((Ok(outcome), elapsed)) => {
                    report.reconcile = Some(outcome);
                    report.duration_ms += elapsed;
                }
                Ok((Err(e), elapsed)) => {
                    error!(category = %report.category, "Reconciliation failed: {e}");
                    report.reconcile_error = Some(e.to_string());
                    report.duration_ms += elapsed;
                }
                Err(e) => {
                    error!(category = %report.category, "Reconciliation worker died: {e}");
                    report.reconcile_error = Some(format!("worker died: {e}"));
                }
            }
        }
    }

    /// Copies the BIOS folder, transfer only - no catalog, no layout.
    async fn copy_bios(&self) -> Option<CategoryReport> {
        let Some(bios_dir) = self.device.bios_dir.as_deref() else {
            warn!("BIOS copy requested but no bios_dir configured for this device");
            return None;
        };

        let mut report = CategoryReport::new(bios_dir);
        let start = Instant::now();
        let request = TransferRequest {
            category: bios_dir.to_string(),
            source: self.config.paths.source_root.join(bios_dir),
            destination: self.device.target_root.join(bios_dir),
            excludes: Vec::new(),
            // Never delete unknown BIOS files; devices ship their own.
            purge: false,
            dry_run: self.options.dry_run,
        };
        match self.transfer.transfer(request).await {
            Ok(outcome) => report.transfer = Some(outcome),
            Err(e) => {
                error!(category = bios_dir, "BIOS copy failed: {e}");
                report.transfer_error = Some(e.to_string());
            }
        }
        report.duration_ms = start.elapsed().as_millis() as u64;
        Some(report)
    }

    /// Directories the durability barrier flushes.
    fn barrier_dirs(&self, categories: &[String]) -> Vec<PathBuf> {
        let target_root = &self.device.target_root;
        let mut dirs: BTreeSet<PathBuf> = BTreeSet::new();
        dirs.insert(target_root.clone());
        if let Some(media_root) = &self.device.media_root {
            dirs.insert(target_root.join(media_root));
        }
        if let Some(metadata_root) = &self.device.metadata_root {
            dirs.insert(target_root.join(metadata_root));
        }
        for name in categories {
            dirs.insert(target_root.join(name));
            if let Some(alias) = self.device.aliases.get(name) {
                dirs.insert(target_root.join(alias));
            }
            if let Some(media_root) = &self.device.media_root {
                let device_name = self.device.aliases.get(name).unwrap_or(name);
                dirs.insert(target_root.join(media_root).join(device_name));
            }
        }
        dirs.into_iter().collect()
    }

    fn log_summary(&self, report: &RunReport) {
        for category in &report.categories {
            if let Some(err) = category
                .reconcile_error
                .as_deref()
                .or(category.transfer_error.as_deref())
            {
                warn!(category = %category.category, "FAILED: {err}");
            } else {
                info!(
                    category = %category.category,
                    warnings = category.layout_warnings.len(),
                    duration_ms = category.duration_ms,
                    "OK"
                );
            }
        }
        let succeeded = report.succeeded().count();
        let failed = report.failed().count();
        info!(
            device = %report.device,
            succeeded,
            failed,
            duration_ms = report.duration_ms,
            "Run complete"
        );
    }
}

/// One worker per category, bounded by available processor count.
fn worker_limit() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
