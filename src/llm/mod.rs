pub mod batcher;
pub mod claude;
pub mod parser;
pub mod prompts;
pub mod provider;

pub use batcher::RepoBatcher;
pub use claude::ClaudeProvider;
pub use parser::{parse_classification, ParsedClassification};
pub use prompts::ClassificationRequest;
pub use provider::LLMProvider;
