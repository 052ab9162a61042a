//! NovaMind Core Library
//!
//! Business logic for the NovaMind content pipeline: language-model and CRM
//! clients, SQLite persistence, content generation, analytics and the
//! campaign orchestrator.

pub mod clients;
pub mod config;
pub mod constants;
pub mod error;
pub mod personas;
pub mod pipeline;
pub mod services;
pub mod storage;

// Re-export main types for easy access
pub use config::NovaMindConfig;
pub use error::{NovaMindError, Result};

pub use clients::{
    AnthropicClient,
    CompletionRequest,
    CrmMode,
    HubSpotClient,
    LanguageModel,
    ModelAccess,
};

pub use services::{
    AnalyticsEngine,
    ContentGenerator,
    ContentOptimizer,
};

pub use pipeline::{CampaignOrchestrator, GeneratedContent, LaunchOutcome, PipelineReport};
pub use storage::{CampaignActivityLog, Database};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::clients::{CompletionRequest, LanguageModel};
    use crate::error::{NovaMindError, Result};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned replies in order and records every request
    pub struct ScriptedModel {
        replies: Mutex<VecDeque<std::result::Result<String, String>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedModel {
        pub fn new(replies: Vec<std::result::Result<String, String>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn complete(&self, request: CompletionRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request);
            match self.replies.lock().unwrap().pop_front() {
                Some(Ok(reply)) => Ok(reply),
                Some(Err(message)) => Err(NovaMindError::LanguageModel(message)),
                None => Err(NovaMindError::LanguageModel("script exhausted".to_string())),
            }
        }
    }
}
