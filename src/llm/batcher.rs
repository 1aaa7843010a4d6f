use crate::config::DEFAULT_BATCH_SIZE;
use crate::models::StarredRepo;

/// Splits pending repositories into fixed-size classification batches.
pub struct RepoBatcher {
    batch_size: usize,
}

impl RepoBatcher {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn create_batches(&self, repos: Vec<StarredRepo>) -> Vec<Vec<StarredRepo>> {
        let mut batches = Vec::with_capacity(repos.len().div_ceil(self.batch_size));
        let mut current_batch = Vec::with_capacity(self.batch_size);

        for repo in repos {
            current_batch.push(repo);
            if current_batch.len() == self.batch_size {
                batches.push(std::mem::replace(
                    &mut current_batch,
                    Vec::with_capacity(self.batch_size),
                ));
            }
        }

        if !current_batch.is_empty() {
            batches.push(current_batch);
        }

        batches
    }
}

impl Default for RepoBatcher {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}
