//! Service modules for business logic

pub mod analytics_engine;
pub mod content_generator;
pub mod optimizer;
pub mod response_parser;

// Re-export service types
pub use analytics_engine::AnalyticsEngine;
pub use content_generator::ContentGenerator;
pub use optimizer::ContentOptimizer;
