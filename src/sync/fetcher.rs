use std::sync::Arc;

use crate::error::Result;
use crate::github::StarredSource;
use crate::models::{Snapshot, StarredRepo};
use crate::progress::progress_bar;

/// Downloads the current starred repositories with their README excerpts.
pub struct RepoFetcher {
    source: Arc<dyn StarredSource>,
}

impl RepoFetcher {
    pub fn new(source: Arc<dyn StarredSource>) -> Self {
        Self { source }
    }

    /// Fails only when the star listing itself fails; a missing README becomes "".
    pub async fn fetch(&self) -> Result<Snapshot> {
        let starred = self.source.starred().await?;
        tracing::info!("Found {} starred repositories", starred.len());

        let pb = progress_bar(starred.len() as u64, "repos");
        let mut snapshot = Snapshot::new();

        for item in starred {
            let full_name = item.repo.full_name.clone();
            let readme = match self.source.readme(&full_name).await {
                Ok(readme) => readme,
                Err(e) => {
                    tracing::debug!("No README for {}: {}", full_name, e);
                    String::new()
                }
            };

            snapshot.insert(full_name, StarredRepo::from_api(item, &readme));
            pb.inc(1);
        }

        pb.finish_with_message("Downloaded starred repos");
        tracing::info!("Downloaded {} starred repos", snapshot.len());
        Ok(snapshot)
    }
}
