//! Shared types for the NovaMind content pipeline

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Target-audience segment used to tailor generated content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Persona {
    pub key: String,
    pub name: String,
    pub focus: Vec<String>,
    pub tone: String,
    pub pain_points: Vec<String>,
}

/// Contact record from the mock contact dataset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    pub email: String,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub jobtitle: Option<String>,
    pub persona: String,
}

/// On-disk layout of the mock contact file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactDataset {
    pub contacts: Vec<Contact>,
}

/// Blog post fields parsed from a model reply, before persistence
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BlogDraft {
    pub title: String,
    pub outline: String,
    pub content: String,
}

/// Persisted blog post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: i64,
    pub topic: String,
    pub title: String,
    pub outline: String,
    pub content: String,
    pub word_count: i64,
    pub created_at: DateTime<Utc>,
    pub metadata: serde_json::Value,
}

/// Count of whitespace-separated tokens
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Newsletter variant for one persona, before persistence
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewsletterDraft {
    pub persona_key: String,
    /// Persona display name
    pub persona: String,
    pub subject_line: String,
    pub preview_text: String,
    pub content: String,
}

/// Persisted newsletter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Newsletter {
    pub id: i64,
    pub blog_id: i64,
    pub persona_key: String,
    pub persona: String,
    pub subject_line: String,
    pub preview_text: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Newsletter {
    pub fn to_draft(&self) -> NewsletterDraft {
        NewsletterDraft {
            persona_key: self.persona_key.clone(),
            persona: self.persona.clone(),
            subject_line: self.subject_line.clone(),
            preview_text: self.preview_text.clone(),
            content: self.content.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Sent,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
        }
    }
}

impl TryFrom<&str> for CampaignStatus {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, String> {
        match value {
            "draft" => Ok(Self::Draft),
            "sent" => Ok(Self::Sent),
            other => Err(format!("Unknown campaign status: {}", other)),
        }
    }
}

/// Persisted campaign
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: i64,
    pub blog_id: i64,
    pub campaign_name: String,
    pub send_date: DateTime<Utc>,
    pub crm_campaign_ref: Option<String>,
    pub status: CampaignStatus,
}

/// Campaign joined with its parent blog post, for listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignOverview {
    pub id: i64,
    pub name: String,
    pub send_date: DateTime<Utc>,
    pub status: CampaignStatus,
    pub blog_title: String,
    pub topic: String,
}

/// Send and engagement counts for one persona segment.
///
/// Rates are percentages rounded to two decimals. `click_rate` is measured
/// against opens, `open_rate` and `unsubscribe_rate` against deliveries.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct EngagementStats {
    pub sent: u32,
    pub delivered: u32,
    pub opens: u32,
    pub clicks: u32,
    pub unsubscribes: u32,
    pub open_rate: f64,
    pub click_rate: f64,
    pub unsubscribe_rate: f64,
}

impl EngagementStats {
    /// Build stats from raw counts, deriving every rate
    pub fn from_counts(sent: u32, delivered: u32, opens: u32, clicks: u32, unsubscribes: u32) -> Self {
        Self {
            sent,
            delivered,
            opens,
            clicks,
            unsubscribes,
            open_rate: rate_percent(opens, delivered),
            click_rate: rate_percent(clicks, opens),
            unsubscribe_rate: rate_percent(unsubscribes, delivered),
        }
    }
}

/// `numerator / denominator` as a percentage rounded to two decimals, 0 when the denominator is 0
pub fn rate_percent(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round2(numerator as f64 / denominator as f64 * 100.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Persisted per-persona metrics row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub id: i64,
    pub campaign_id: i64,
    /// Persona key
    pub persona: String,
    #[serde(flatten)]
    pub stats: EngagementStats,
    pub recorded_at: DateTime<Utc>,
}

/// Persisted optimization suggestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationSuggestion {
    pub id: i64,
    pub campaign_id: i64,
    pub suggestion_type: String,
    pub suggestion_text: String,
    pub confidence_score: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CampaignSummary {
    pub total_sent: u32,
    pub total_opens: u32,
    pub total_clicks: u32,
    pub avg_open_rate: f64,
    pub avg_click_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformerSummary {
    pub persona: String,
    pub click_rate: f64,
}

/// Full analysis of one campaign, also written out as the JSON report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignAnalysis {
    pub campaign_id: i64,
    pub summary: CampaignSummary,
    pub best_performer: PerformerSummary,
    pub worst_performer: PerformerSummary,
    pub ai_insights: String,
    pub generated_at: DateTime<Utc>,
}

/// Content-improvement suggestions with the confidence of their source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImprovementSuggestions {
    pub suggestions: Vec<String>,
    pub confidence: f64,
}
