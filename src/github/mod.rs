pub mod client;
pub mod contents;
pub mod paginator;
pub mod rate_limiter;
pub mod remote;

pub use client::GitHubClient;
pub use contents::RepoContents;
pub use paginator::Paginator;
pub use rate_limiter::RateLimiter;
pub use remote::{RemoteRepository, StarredSource};
