//! Campaign analysis, insights and topic suggestions

use crate::clients::{CompletionRequest, ModelAccess};
use crate::constants::{MAX_TOPIC_SUGGESTIONS, RECENT_TOPIC_WINDOW};
use crate::error::{NovaMindError, Result};
use crate::services::response_parser::parse_list_items;
use chrono::{Local, Utc};
use novamind_types::{
    round2, CampaignAnalysis, CampaignOverview, CampaignSummary, EngagementStats, PerformerSummary,
};
use std::fs;
use std::path::{Path, PathBuf};

const FALLBACK_TOPICS: [&str; 3] = [
    "AI automation tools comparison",
    "Workflow optimization case studies",
    "Creative productivity hacks",
];

pub struct AnalyticsEngine {
    model: ModelAccess,
}

impl AnalyticsEngine {
    pub fn new(model: ModelAccess) -> Self {
        Self { model }
    }

    /// Aggregate per-persona stats into a campaign analysis with insights.
    ///
    /// Ties resolve to the earliest persona in `metrics`, for best and worst alike.
    pub async fn analyze_campaign_performance(
        &self,
        campaign_id: i64,
        metrics: &[(String, EngagementStats)],
    ) -> Result<CampaignAnalysis> {
        log::info!("📊 Analyzing campaign performance...");

        let (first_persona, first_stats) = metrics.first().ok_or_else(|| {
            NovaMindError::Validation("Cannot analyze a campaign without metrics".to_string())
        })?;

        let count = metrics.len() as f64;
        let summary = CampaignSummary {
            total_sent: metrics.iter().map(|(_, m)| m.sent).sum(),
            total_opens: metrics.iter().map(|(_, m)| m.opens).sum(),
            total_clicks: metrics.iter().map(|(_, m)| m.clicks).sum(),
            avg_open_rate: round2(metrics.iter().map(|(_, m)| m.open_rate).sum::<f64>() / count),
            avg_click_rate: round2(metrics.iter().map(|(_, m)| m.click_rate).sum::<f64>() / count),
        };

        let mut best = (first_persona, first_stats.click_rate);
        let mut worst = best;
        for (persona, stats) in &metrics[1..] {
            if stats.click_rate > best.1 {
                best = (persona, stats.click_rate);
            }
            if stats.click_rate < worst.1 {
                worst = (persona, stats.click_rate);
            }
        }

        let best_performer = PerformerSummary { persona: best.0.clone(), click_rate: best.1 };
        let worst_performer = PerformerSummary { persona: worst.0.clone(), click_rate: worst.1 };

        let ai_insights = match &self.model {
            ModelAccess::Live(_) => {
                self.generate_ai_insights(metrics, &summary, &best_performer, &worst_performer).await
            }
            ModelAccess::Canned => generate_basic_insights(&best_performer, &worst_performer),
        };

        log::info!("✅ Analysis complete");

        Ok(CampaignAnalysis {
            campaign_id,
            summary,
            best_performer,
            worst_performer,
            ai_insights,
            generated_at: Utc::now(),
        })
    }

    async fn generate_ai_insights(
        &self,
        metrics: &[(String, EngagementStats)],
        summary: &CampaignSummary,
        best: &PerformerSummary,
        worst: &PerformerSummary,
    ) -> String {
        let ModelAccess::Live(model) = &self.model else {
            return generate_basic_insights(best, worst);
        };

        log::info!("🤖 Generating AI-powered insights...");

        let metrics_text = metrics
            .iter()
            .map(|(persona, m)| {
                format!("- {}: {}% open rate, {}% click rate", persona, m.open_rate, m.click_rate)
            })
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "Analyze this email campaign performance data and provide actionable insights:\n\
            \n\
            Campaign Metrics by Persona:\n\
            {}\n\
            \n\
            Overall Performance:\n\
            - Average open rate: {}%\n\
            - Average click rate: {}%\n\
            - Best performer: {} ({}% CTR)\n\
            \n\
            Provide:\n\
            1. Key insights about what worked well\n\
            2. Recommendations for improving underperforming segments\n\
            3. Specific content suggestions for the next campaign\n\
            4. A/B test ideas\n\
            \n\
            Keep response under 200 words and make it actionable.",
            metrics_text, summary.avg_open_rate, summary.avg_click_rate, best.persona, best.click_rate
        );

        match model.complete(CompletionRequest::new(prompt, 500, 0.7)).await {
            Ok(insights) => {
                log::info!("✅ AI insights generated");
                insights
            }
            Err(e) => {
                log::warn!("⚠️  Could not generate AI insights: {}", e);
                generate_basic_insights(best, worst)
            }
        }
    }

    /// Up to five next blog topics based on the most recent campaign topics.
    ///
    /// `history` is newest first, as returned by the campaign listing.
    pub async fn suggest_next_topics(&self, history: &[CampaignOverview]) -> Vec<String> {
        log::info!("💡 Generating topic suggestions...");

        let ModelAccess::Live(model) = &self.model else {
            return fallback_topics();
        };

        let topics_text = history
            .iter()
            .take(RECENT_TOPIC_WINDOW)
            .filter(|c| !c.topic.trim().is_empty())
            .map(|c| format!("- {}", c.topic))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "Based on these recent blog topics for an AI automation startup:\n\
            \n\
            {}\n\
            \n\
            Suggest 5 new blog topics that:\n\
            1. Are different from recent topics\n\
            2. Appeal to creative agency decision-makers\n\
            3. Focus on automation, AI, and workflow optimization\n\
            4. Are timely and trend-relevant\n\
            \n\
            Return just the 5 topics, one per line.",
            topics_text
        );

        match model.complete(CompletionRequest::new(prompt, 300, 0.8)).await {
            Ok(reply) => {
                let mut topics = parse_list_items(&reply);
                topics.truncate(MAX_TOPIC_SUGGESTIONS);
                log::info!("✅ Generated {} topic suggestions", topics.len());
                topics
            }
            Err(e) => {
                log::warn!("⚠️  Could not generate topics: {}", e);
                fallback_topics()
            }
        }
    }
}

fn fallback_topics() -> Vec<String> {
    FALLBACK_TOPICS.iter().map(|s| s.to_string()).collect()
}

/// Deterministic insight text built from the best and worst performers
pub fn generate_basic_insights(best: &PerformerSummary, worst: &PerformerSummary) -> String {
    format!(
        "Performance Summary:\n\
        \n\
        The {best} segment performed best with a {best_rate}% click rate.\n\
        The {worst} segment had the lowest engagement at {worst_rate}%.\n\
        \n\
        Recommendations:\n\
        1. Replicate successful elements from the {best} newsletter\n\
        2. Test different messaging approaches for {worst}\n\
        3. Consider A/B testing subject lines to improve open rates\n\
        4. Focus on pain points more relevant to underperforming segments",
        best = best.persona,
        best_rate = best.click_rate,
        worst = worst.persona,
        worst_rate = worst.click_rate,
    )
}

/// Write the analysis as pretty JSON to `campaign_{id}_analysis_{timestamp}.json`
pub fn save_analysis_report<P: AsRef<Path>>(analysis: &CampaignAnalysis, reports_dir: P) -> Result<PathBuf> {
    let reports_dir = reports_dir.as_ref();
    fs::create_dir_all(reports_dir)?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = reports_dir.join(format!("campaign_{}_analysis_{}.json", analysis.campaign_id, timestamp));

    fs::write(&path, serde_json::to_string_pretty(analysis)?)?;
    log::info!("Analysis saved to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedModel;
    use chrono::Utc;
    use novamind_types::CampaignStatus;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn stats(open_rate: f64, click_rate: f64, sent: u32) -> EngagementStats {
        EngagementStats {
            sent,
            opens: sent / 4,
            clicks: sent / 20,
            open_rate,
            click_rate,
            ..EngagementStats::default()
        }
    }

    fn overview(topic: &str) -> CampaignOverview {
        CampaignOverview {
            id: 1,
            name: topic.to_string(),
            send_date: Utc::now(),
            status: CampaignStatus::Sent,
            blog_title: topic.to_string(),
            topic: topic.to_string(),
        }
    }

    #[tokio::test]
    async fn test_summary_uses_unweighted_means() {
        let engine = AnalyticsEngine::new(ModelAccess::Canned);
        let metrics = vec![
            ("founders".to_string(), stats(25.0, 20.0, 200)),
            ("creatives".to_string(), stats(30.0, 25.0, 160)),
            ("operations".to_string(), stats(22.0, 15.5, 180)),
        ];

        let analysis = engine.analyze_campaign_performance(7, &metrics).await.unwrap();
        assert_eq!(analysis.campaign_id, 7);
        assert_eq!(analysis.summary.total_sent, 540);
        assert_eq!(analysis.summary.avg_open_rate, 25.67);
        assert_eq!(analysis.summary.avg_click_rate, 20.17);
        assert_eq!(analysis.best_performer.persona, "creatives");
        assert_eq!(analysis.worst_performer.persona, "operations");
        assert!(analysis.ai_insights.contains("The creatives segment performed best with a 25% click rate."));
    }

    #[tokio::test]
    async fn test_ties_resolve_to_first_persona() {
        let engine = AnalyticsEngine::new(ModelAccess::Canned);
        let metrics = vec![
            ("founders".to_string(), stats(25.0, 18.0, 150)),
            ("creatives".to_string(), stats(30.0, 18.0, 150)),
        ];

        let analysis = engine.analyze_campaign_performance(1, &metrics).await.unwrap();
        assert_eq!(analysis.best_performer.persona, "founders");
        assert_eq!(analysis.worst_performer.persona, "founders");
    }

    #[tokio::test]
    async fn test_empty_metrics_rejected() {
        let engine = AnalyticsEngine::new(ModelAccess::Canned);
        let result = engine.analyze_campaign_performance(1, &[]).await;
        assert!(matches!(result, Err(NovaMindError::Validation(_))));
    }

    #[tokio::test]
    async fn test_insight_failure_falls_back_to_basic_text() {
        let model = Arc::new(ScriptedModel::new(vec![Err("timeout".to_string())]));
        let engine = AnalyticsEngine::new(ModelAccess::Live(model));
        let metrics = vec![("founders".to_string(), stats(25.0, 20.0, 150))];

        let analysis = engine.analyze_campaign_performance(1, &metrics).await.unwrap();
        assert!(analysis.ai_insights.starts_with("Performance Summary:"));
    }

    #[tokio::test]
    async fn test_topics_use_recent_history() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(
            "- One\n- Two\n- Three\n- Four\n- Five\n- Six".to_string(),
        )]));
        let engine = AnalyticsEngine::new(ModelAccess::Live(model.clone()));
        let history = vec![overview("Newest"), overview(""), overview("Older"), overview("Oldest")];

        let topics = engine.suggest_next_topics(&history).await;
        assert_eq!(topics, vec!["One", "Two", "Three", "Four", "Five"]);

        let prompt = &model.requests()[0].prompt;
        assert!(prompt.contains("- Newest\n- Older"));
        assert!(!prompt.contains("Oldest"));
    }

    #[tokio::test]
    async fn test_topics_fallback_without_model() {
        let engine = AnalyticsEngine::new(ModelAccess::Canned);
        assert_eq!(engine.suggest_next_topics(&[]).await.len(), 3);
    }

    #[tokio::test]
    async fn test_save_report_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let engine = AnalyticsEngine::new(ModelAccess::Canned);
        let metrics = vec![("founders".to_string(), stats(25.0, 20.0, 150))];
        let analysis = engine.analyze_campaign_performance(3, &metrics).await.unwrap();

        let path = save_analysis_report(&analysis, temp_dir.path().join("outputs")).unwrap();
        let file_name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with("campaign_3_analysis_"));

        let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["campaign_id"], 3);
        assert_eq!(saved["best_performer"]["persona"], "founders");
    }
}
