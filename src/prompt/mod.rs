pub mod llm_integration;
pub mod site_catalog;

pub use llm_integration::{get_llm_config, LanguageModel, LlmClient, LlmConfig, LlmProvider};
