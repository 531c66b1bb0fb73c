// Service exports
pub mod cache;
pub mod llm;

pub use cache::{DescriptionCache, CacheKey, CacheStats};
pub use llm::{LanguageModel, OpenAiClient, CompletionOptions, LlmError};
