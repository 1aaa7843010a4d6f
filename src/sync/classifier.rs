use std::collections::HashSet;
use std::sync::Arc;

use crate::error::Result;
use crate::llm::prompts::CLASSIFY_MAX_TOKENS;
use crate::llm::{parse_classification, ClassificationRequest, LLMProvider, RepoBatcher};
use crate::models::{Assignments, Catalog, Snapshot, StarredRepo};
use crate::progress::progress_bar;
use crate::storage::Storage;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ClassifyReport {
    pub batches: usize,
    pub failed_batches: usize,
    pub classified: usize,
}

/// Sorts uncategorized repositories into catalog categories, one LLM call per batch.
pub struct Classifier {
    llm: Arc<dyn LLMProvider>,
    batcher: RepoBatcher,
}

impl Classifier {
    pub fn new(llm: Arc<dyn LLMProvider>, batch_size: usize) -> Self {
        Self {
            llm,
            batcher: RepoBatcher::new(batch_size),
        }
    }

    /// Assignments for the repositories of one batch only.
    pub async fn classify_batch(
        &self,
        batch: &[StarredRepo],
        catalog: &Catalog,
    ) -> Result<Assignments> {
        let prompt = ClassificationRequest::new(batch, catalog).to_prompt()?;
        let reply = self.llm.complete(&prompt, CLASSIFY_MAX_TOKENS).await?;
        tracing::debug!("{}'s response: {}", self.llm.name(), reply);

        let ids: HashSet<&str> = batch.iter().map(|r| r.full_name.as_str()).collect();
        let parsed = parse_classification(&reply, catalog, &ids);

        if parsed.skipped_rows > 0 || parsed.coerced_rows > 0 {
            tracing::warn!(
                "Batch reply had {} skipped and {} coerced rows",
                parsed.skipped_rows,
                parsed.coerced_rows
            );
        }
        tracing::info!("Organized {} repos", parsed.assignments.len());

        Ok(parsed.assignments)
    }

    /// Classifies `pending` batch by batch, merging each result into `assignments`
    /// and saving after every batch. A failed batch is logged and skipped.
    pub async fn classify_into(
        &self,
        pending: Snapshot,
        catalog: &Catalog,
        assignments: &mut Assignments,
        storage: &Storage,
    ) -> Result<ClassifyReport> {
        let total = pending.len();
        let batches = self.batcher.create_batches(pending.into_values().collect());
        let mut report = ClassifyReport {
            batches: batches.len(),
            ..Default::default()
        };

        tracing::info!(
            "Classifying {} repos in {} batches of up to {}",
            total,
            batches.len(),
            self.batcher.batch_size()
        );
        let pb = progress_bar(total as u64, "repos classified");

        for (index, batch) in batches.iter().enumerate() {
            match self.classify_batch(batch, catalog).await {
                Ok(new_assignments) => {
                    report.classified += new_assignments.len();
                    // A reclassified repository replaces its previous list
                    assignments.extend(new_assignments);
                    storage.save_assignments(assignments)?;
                }
                Err(e) => {
                    tracing::error!("Classification of batch {} failed: {}", index + 1, e);
                    report.failed_batches += 1;
                }
            }

            pb.inc(batch.len() as u64);
        }

        pb.finish_with_message("Classification complete");
        Ok(report)
    }
}
