pub mod orchestrator;

pub use orchestrator::{CampaignOrchestrator, GeneratedContent, LaunchOutcome, PipelineReport};
