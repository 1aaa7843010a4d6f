pub mod config;
pub mod error;
pub mod github;
pub mod llm;
pub mod models;
pub mod progress;
pub mod publish;
pub mod storage;
pub mod sync;

pub use config::{Config, RunConfig};
pub use error::{Error, Result};
pub use github::{GitHubClient, RemoteRepository, StarredSource};
pub use llm::{ClaudeProvider, LLMProvider};
pub use publish::Publisher;
pub use storage::Storage;
pub use sync::SyncPipeline;
