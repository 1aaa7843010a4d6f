pub mod classifier;
pub mod fetcher;
pub mod pipeline;
pub mod reconciler;

pub use classifier::{ClassifyReport, Classifier};
pub use fetcher::RepoFetcher;
pub use pipeline::{RunReport, SyncPipeline};
pub use reconciler::{reconcile, Reconciliation};
