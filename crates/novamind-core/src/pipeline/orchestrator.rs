//! Campaign pipeline: generate, persist, distribute, measure, analyze, optimize

use crate::clients::{AnthropicClient, HubSpotClient, LanguageModel, ModelAccess};
use crate::config::NovaMindConfig;
use crate::constants::{ALTERNATIVE_SUBJECT_COUNT, CONTENT_IMPROVEMENT_CATEGORY, PUBLISHED_STATUS};
use crate::error::{NovaMindError, Result};
use crate::personas::load_personas;
use crate::services::analytics_engine::save_analysis_report;
use crate::services::{AnalyticsEngine, ContentGenerator, ContentOptimizer};
use crate::storage::{load_contacts, CampaignActivityLog, Database};
use indexmap::IndexMap;
use novamind_types::{
    BlogDraft, CampaignAnalysis, CampaignOverview, Contact, EngagementStats, ImprovementSuggestions,
    NewsletterDraft, PerformanceMetrics,
};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a console run produced
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub blog_id: i64,
    pub blog: BlogDraft,
    pub newsletter_ids: Vec<i64>,
    pub newsletters: Vec<NewsletterDraft>,
    /// Alternative subject lines per persona key
    pub alternatives: Vec<(String, Vec<String>)>,
    pub campaign_id: i64,
    pub analysis: CampaignAnalysis,
    pub report_path: PathBuf,
    /// Suggestions for the worst performer's newsletter
    pub improvements: Option<ImprovementSuggestions>,
    pub next_topics: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedContent {
    pub blog_id: i64,
    pub blog: BlogDraft,
    pub newsletters: Vec<NewsletterDraft>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LaunchOutcome {
    pub campaign_id: i64,
    pub analysis: CampaignAnalysis,
    pub report_path: PathBuf,
}

struct Distribution {
    campaign_id: i64,
    performance: Vec<(String, EngagementStats)>,
}

pub struct CampaignOrchestrator {
    db: Database,
    generator: ContentGenerator,
    crm: HubSpotClient,
    analytics: AnalyticsEngine,
    optimizer: ContentOptimizer,
    contacts_path: PathBuf,
    reports_dir: PathBuf,
}

impl CampaignOrchestrator {
    pub fn new(
        db: Database,
        generator: ContentGenerator,
        crm: HubSpotClient,
        analytics: AnalyticsEngine,
        optimizer: ContentOptimizer,
        contacts_path: PathBuf,
        reports_dir: PathBuf,
    ) -> Self {
        Self {
            db,
            generator,
            crm,
            analytics,
            optimizer,
            contacts_path,
            reports_dir,
        }
    }

    /// Wire up every component from configuration, probing the CRM once
    pub async fn from_config(config: &NovaMindConfig) -> Result<Self> {
        let model: Arc<dyn LanguageModel> = Arc::new(AnthropicClient::new(config.anthropic.clone())?);
        let personas = load_personas(&config.storage.personas_path)?;
        let db = Database::open(&config.storage.database_path)?;

        let activity_log = CampaignActivityLog::new(&config.storage.campaign_log_path);
        let crm = HubSpotClient::connect(config.hubspot.clone(), activity_log).await?;

        Ok(Self::new(
            db,
            ContentGenerator::new(model.clone(), personas),
            crm,
            AnalyticsEngine::new(ModelAccess::Live(model.clone())),
            ContentOptimizer::new(ModelAccess::Live(model)),
            config.storage.contacts_path.clone(),
            config.storage.reports_dir.clone(),
        ))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn crm(&self) -> &HubSpotClient {
        &self.crm
    }

    /// Run every step from blog generation to next-topic suggestions
    pub async fn run_full_pipeline(&self, topic: &str, context: &str) -> Result<PipelineReport> {
        log::info!("🚀 Starting content pipeline for topic: {}", topic);

        log::info!("Step 1: Generating blog post");
        let blog = self.generator.generate_blog_post(topic, context).await?;
        let blog_id = self.db.save_blog_post(
            topic,
            &blog.title,
            &blog.outline,
            &blog.content,
            &json!({ "status": PUBLISHED_STATUS }),
        )?;
        log::info!("💾 Blog post saved (ID: {})", blog_id);

        log::info!("Step 2: Generating newsletters");
        let newsletters = self.generator.generate_newsletter_variations(&blog).await?;
        let newsletter_ids = self.save_newsletters(blog_id, &newsletters)?;

        log::info!("Step 3: Generating alternative subject lines");
        let mut alternatives = Vec::with_capacity(newsletters.len());
        for newsletter in &newsletters {
            let variants = self.generator
                .generate_alternative_versions(&newsletter.subject_line, "subject_line", ALTERNATIVE_SUBJECT_COUNT)
                .await;
            alternatives.push((newsletter.persona_key.clone(), variants));
        }

        log::info!("Step 4: Syncing contacts with CRM");
        let segments = self.sync_contacts().await?;

        log::info!("Step 5-6: Distributing campaign and collecting metrics");
        let campaign_name = format!("{} - {}", blog.title, topic);
        let distribution = self.distribute(blog_id, &campaign_name, &newsletters, &segments).await?;

        log::info!("Step 7: Analyzing performance");
        let analysis = self.analytics
            .analyze_campaign_performance(distribution.campaign_id, &distribution.performance)
            .await?;
        let report_path = save_analysis_report(&analysis, &self.reports_dir)?;

        log::info!("Step 8: Generating optimization suggestions");
        let improvements = self
            .improve_worst_performer(distribution.campaign_id, &analysis, &newsletters, &distribution.performance)
            .await?;

        log::info!("Step 9: Suggesting next topics");
        let next_topics = self.analytics.suggest_next_topics(&self.db.get_all_campaigns()?).await;

        log::info!("✅ Pipeline complete for campaign {}", distribution.campaign_id);

        Ok(PipelineReport {
            blog_id,
            blog,
            newsletter_ids,
            newsletters,
            alternatives,
            campaign_id: distribution.campaign_id,
            analysis,
            report_path,
            improvements,
            next_topics,
        })
    }

    /// Generate and store a blog post with its newsletters, without distributing them
    pub async fn generate_content(&self, topic: &str, context: &str) -> Result<GeneratedContent> {
        let blog = self.generator.generate_blog_post(topic, context).await?;
        let blog_id = self.db.save_blog_post(topic, &blog.title, &blog.outline, &blog.content, &json!({}))?;

        let newsletters = self.generator.generate_newsletter_variations(&blog).await?;
        self.save_newsletters(blog_id, &newsletters)?;

        Ok(GeneratedContent {
            blog_id,
            blog,
            newsletters,
        })
    }

    /// Distribute the stored newsletters of a blog post and analyze the result
    pub async fn launch_campaign(&self, blog_id: i64) -> Result<LaunchOutcome> {
        let blog = self.db.get_blog_post(blog_id)?
            .ok_or_else(|| NovaMindError::NotFound(format!("Blog post {} not found", blog_id)))?;

        let newsletters: Vec<NewsletterDraft> = self.db
            .get_newsletters_for_blog(blog_id)?
            .iter()
            .map(|n| n.to_draft())
            .collect();

        if newsletters.is_empty() {
            return Err(NovaMindError::Validation(format!("Blog post {} has no newsletters", blog_id)));
        }

        let segments = self.sync_contacts().await?;
        let distribution = self.distribute(blog_id, &blog.title, &newsletters, &segments).await?;

        let analysis = self.analytics
            .analyze_campaign_performance(distribution.campaign_id, &distribution.performance)
            .await?;
        let report_path = save_analysis_report(&analysis, &self.reports_dir)?;

        Ok(LaunchOutcome {
            campaign_id: distribution.campaign_id,
            analysis,
            report_path,
        })
    }

    pub fn campaign_metrics(&self, campaign_id: i64) -> Result<Vec<PerformanceMetrics>> {
        self.db.get_campaign_performance(campaign_id)
    }

    pub fn list_campaigns(&self) -> Result<Vec<CampaignOverview>> {
        self.db.get_all_campaigns()
    }

    fn save_newsletters(&self, blog_id: i64, newsletters: &[NewsletterDraft]) -> Result<Vec<i64>> {
        newsletters
            .iter()
            .map(|newsletter| {
                let id = self.db.save_newsletter(blog_id, newsletter)?;
                log::info!("💾 Newsletter for {} saved (ID: {})", newsletter.persona, id);
                Ok(id)
            })
            .collect()
    }

    /// Upsert the contact dataset and group CRM ids by persona tag
    async fn sync_contacts(&self) -> Result<IndexMap<String, Vec<String>>> {
        let contacts = load_contacts(&self.contacts_path)?;
        let crm_ids = self.crm.bulk_create_contacts(&contacts).await;
        Ok(group_segments(&contacts, &crm_ids))
    }

    /// Record the campaign, send each newsletter to its segment and collect simulated stats
    async fn distribute(
        &self,
        blog_id: i64,
        campaign_name: &str,
        newsletters: &[NewsletterDraft],
        segments: &IndexMap<String, Vec<String>>,
    ) -> Result<Distribution> {
        let crm_ref = self.crm.campaign_reference();
        let campaign_id = self.db.create_campaign(blog_id, campaign_name, Some(&crm_ref))?;
        log::info!("📣 Campaign '{}' created (ID: {})", campaign_name, campaign_id);

        for newsletter in newsletters {
            match segments.get(&newsletter.persona_key) {
                Some(contact_ids) if !contact_ids.is_empty() => {
                    self.crm.send_email_to_segment(&newsletter.persona, contact_ids, newsletter).await?;
                }
                _ => log::warn!("No contacts in segment {}, skipping send", newsletter.persona_key),
            }
        }

        let mut performance = Vec::with_capacity(newsletters.len());
        for newsletter in newsletters {
            let stats = self.crm.generate_simulated_stats(&newsletter.persona_key);
            self.db.save_performance_metrics(campaign_id, &newsletter.persona_key, &stats)?;
            log::info!(
                "📈 {}: {}% open rate, {}% click rate",
                newsletter.persona_key, stats.open_rate, stats.click_rate
            );
            performance.push((newsletter.persona_key.clone(), stats));
        }

        Ok(Distribution { campaign_id, performance })
    }

    async fn improve_worst_performer(
        &self,
        campaign_id: i64,
        analysis: &CampaignAnalysis,
        newsletters: &[NewsletterDraft],
        performance: &[(String, EngagementStats)],
    ) -> Result<Option<ImprovementSuggestions>> {
        let worst = &analysis.worst_performer.persona;

        let newsletter = newsletters.iter().find(|n| &n.persona_key == worst);
        let stats = performance.iter().find(|(key, _)| key == worst).map(|(_, stats)| stats);

        let (Some(newsletter), Some(stats)) = (newsletter, stats) else {
            log::warn!("No newsletter found for worst performer {}", worst);
            return Ok(None);
        };

        let improvements = self.optimizer.suggest_improvements(&newsletter.content, stats).await;
        for suggestion in &improvements.suggestions {
            self.db.save_optimization_suggestion(
                campaign_id,
                CONTENT_IMPROVEMENT_CATEGORY,
                suggestion,
                improvements.confidence,
            )?;
        }

        Ok(Some(improvements))
    }
}

/// Group CRM ids by persona tag in dataset order; contacts the CRM dropped are skipped
fn group_segments(contacts: &[Contact], crm_ids: &[(String, String)]) -> IndexMap<String, Vec<String>> {
    let id_by_email: HashMap<&str, &str> = crm_ids
        .iter()
        .map(|(email, id)| (email.as_str(), id.as_str()))
        .collect();

    let mut segments: IndexMap<String, Vec<String>> = IndexMap::new();
    for contact in contacts {
        if let Some(id) = id_by_email.get(contact.email.as_str()) {
            segments.entry(contact.persona.clone()).or_default().push(id.to_string());
        }
    }

    segments
}
