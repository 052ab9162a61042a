//! Client modules for external services

pub mod anthropic;
pub mod hubspot;

// Re-export all client types
pub use anthropic::{AnthropicClient, CompletionRequest, LanguageModel, ModelAccess};
pub use hubspot::{CrmMode, HubSpotClient};
