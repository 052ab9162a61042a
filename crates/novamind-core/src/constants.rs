/// Pipeline configuration constants

/// Number of alternative subject lines generated per newsletter for A/B testing
pub const ALTERNATIVE_SUBJECT_COUNT: usize = 2;

/// Upper bound on parsed next-topic suggestions
pub const MAX_TOPIC_SUGGESTIONS: usize = 5;

/// Number of most recent campaign topics fed into topic suggestion
pub const RECENT_TOPIC_WINDOW: usize = 3;

/// Category tag stored with optimizer output
pub const CONTENT_IMPROVEMENT_CATEGORY: &str = "content_improvement";

/// Blog metadata attached by the console pipeline
pub const PUBLISHED_STATUS: &str = "published";
