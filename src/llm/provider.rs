use async_trait::async_trait;
use crate::error::Result;

#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Sends a single user prompt and returns the first text block of the reply.
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;
    fn name(&self) -> &str;
}
