use chrono::Utc;
use std::sync::Arc;

use crate::config::RunConfig;
use crate::error::Result;
use crate::github::{RemoteRepository, StarredSource};
use crate::llm::LLMProvider;
use crate::publish::render::group_by_category;
use crate::publish::Publisher;
use crate::storage::Storage;
use crate::sync::classifier::Classifier;
use crate::sync::fetcher::RepoFetcher;
use crate::sync::reconciler::reconcile;

/// What one run did, for the closing log line.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunReport {
    pub fetch_failed: bool,
    pub starred: usize,
    pub removed: usize,
    pub classified: usize,
    pub failed_batches: usize,
    pub published: bool,
    pub lists_changed: bool,
}

pub struct SyncPipeline {
    fetcher: RepoFetcher,
    classifier: Classifier,
    publisher: Publisher,
    storage: Storage,
    config: RunConfig,
}

impl SyncPipeline {
    pub fn new(
        stars: Arc<dyn StarredSource>,
        llm: Arc<dyn LLMProvider>,
        remote: Arc<dyn RemoteRepository>,
        storage: Storage,
        config: RunConfig,
    ) -> Self {
        Self {
            fetcher: RepoFetcher::new(stars),
            classifier: Classifier::new(llm, config.batch_size),
            publisher: Publisher::new(remote, config.output_dir.clone()),
            storage,
            config,
        }
    }

    /// Local state errors abort the run; remote failures are logged and the
    /// affected step produces nothing.
    pub async fn run(&self) -> Result<RunReport> {
        let mut report = RunReport::default();

        // Step 1: Download the current stars
        let snapshot = match self.fetcher.fetch().await {
            Ok(snapshot) => snapshot,
            // An empty snapshot here would reconcile away every assignment, so stop instead
            Err(e) => {
                tracing::error!("Failed to download starred repositories: {}", e);
                tracing::warn!("Keeping existing categories untouched this run");
                report.fetch_failed = true;
                return Ok(report);
            }
        };
        self.storage.save_snapshot(&snapshot)?;
        report.starred = snapshot.len();

        // Step 2: Load the catalog and previous assignments
        let catalog = self.storage.load_catalog()?;
        if catalog.is_empty() {
            tracing::warn!(
                "No categories defined in {}; everything will be filed under Other",
                self.storage.dir().display()
            );
        }
        let mut assignments = self.storage.load_assignments()?;

        // Step 3: Reconcile
        let reconciliation = reconcile(&snapshot, &mut assignments);
        report.removed = reconciliation.removed.len();
        if !reconciliation.removed.is_empty() {
            self.storage.save_assignments(&assignments)?;
        }

        let pending = reconciliation.to_classify.len();
        tracing::info!("Found {} new or uncategorized repos to process", pending);
        tracing::info!("Removed {} unstarred repos from categories", report.removed);

        // Step 4: Classify
        if pending > 0 {
            let classified = self
                .classifier
                .classify_into(
                    reconciliation.to_classify,
                    &catalog,
                    &mut assignments,
                    &self.storage,
                )
                .await?;
            report.classified = classified.classified;
            report.failed_batches = classified.failed_batches;
        }

        if self.config.verbose {
            for (category, repos) in group_by_category(&catalog, &assignments) {
                tracing::debug!("{}: {} repos", category, repos.len());
            }
        }

        // Step 5: Publish
        let changes_made = pending > 0 || report.removed > 0;
        if !changes_made && !self.config.force_publish {
            tracing::info!("No changes to process, skipping list and README update");
            return Ok(report);
        }

        report.published = true;
        match self
            .publisher
            .publish_lists(&catalog, &snapshot, &assignments)
            .await
        {
            Ok(changed) => {
                report.lists_changed = changed;
                tracing::info!("GitHub lists updated (changes: {})", changed);
            }
            Err(e) => tracing::error!("Failed to publish category lists: {}", e),
        }

        match self
            .publisher
            .publish_index(&snapshot, &assignments, Utc::now())
            .await
        {
            Ok(()) => tracing::info!("README updated"),
            Err(e) => tracing::error!("Failed to publish README: {}", e),
        }

        Ok(report)
    }
}
