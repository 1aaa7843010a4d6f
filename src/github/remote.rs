use async_trait::async_trait;

use crate::error::Result;
use crate::models::{RemoteFile, StarredItem};

/// Where starred repositories come from.
#[async_trait]
pub trait StarredSource: Send + Sync {
    async fn starred(&self) -> Result<Vec<StarredItem>>;

    /// Decoded README text of `owner/name`.
    async fn readme(&self, full_name: &str) -> Result<String>;
}

/// File operations on the repository the lists are published into.
///
/// Updates and deletes need the revision (`sha`) of the file being replaced.
#[async_trait]
pub trait RemoteRepository: Send + Sync {
    /// Paths of the files at the repository root.
    async fn list_root_files(&self) -> Result<Vec<String>>;

    async fn get_file(&self, path: &str) -> Result<Option<RemoteFile>>;

    async fn create_file(&self, path: &str, message: &str, content: &str) -> Result<()>;

    async fn update_file(&self, path: &str, message: &str, content: &str, sha: &str)
        -> Result<()>;

    async fn delete_file(&self, path: &str, message: &str, sha: &str) -> Result<()>;
}
