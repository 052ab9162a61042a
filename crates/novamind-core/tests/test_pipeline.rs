use async_trait::async_trait;
use novamind_core::config::HubSpotConfig;
use novamind_core::personas::default_personas;
use novamind_core::{
    AnalyticsEngine, CampaignActivityLog, CampaignOrchestrator, CompletionRequest, ContentGenerator,
    ContentOptimizer, Database, HubSpotClient, LanguageModel, ModelAccess, NovaMindError, Result,
};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

const TOPIC: &str = "Boost Productivity with AI in 2025";

/// Answers each prompt family with a well-formed reply
struct PromptRoutedModel {
    fail_blog: bool,
}

impl PromptRoutedModel {
    fn new() -> Self {
        Self { fail_blog: false }
    }

    fn failing_blog() -> Self {
        Self { fail_blog: true }
    }
}

#[async_trait]
impl LanguageModel for PromptRoutedModel {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let prompt = request.prompt.as_str();

        if prompt.starts_with("You are a content writer") {
            if self.fail_blog {
                return Err(NovaMindError::LanguageModel("overloaded".to_string()));
            }
            return Ok("TITLE: Work Smarter with AI\n\nOUTLINE:\n1. Why now\n2. Tools\n\nCONTENT:\nAI tools help agencies ship faster.\n\nStart small.".to_string());
        }

        if prompt.starts_with("Based on this blog post") {
            return Ok("SUBJECT: Your AI edge\nPREVIEW: Three tools inside\nBODY:\nHi there,\nread the full post.".to_string());
        }

        if prompt.starts_with("Generate ") {
            return Ok("1. Alt subject one\n2. Alt subject two\n3. Alt subject three".to_string());
        }

        if prompt.starts_with("Analyze this email campaign") {
            return Ok("Creatives responded best; test shorter subjects.".to_string());
        }

        if prompt.starts_with("Review this newsletter") {
            return Ok("1. Lead with a statistic\n2. Move the CTA up".to_string());
        }

        if prompt.starts_with("Based on these recent blog topics") {
            return Ok("- AI onboarding playbooks\n- Automating client reporting".to_string());
        }

        Err(NovaMindError::LanguageModel(format!("unexpected prompt: {}", prompt)))
    }
}

fn write_contacts(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("mock_contacts.json");
    fs::write(&path, r#"{"contacts": [
        {"email": "sarah.chen@brightagency.io", "firstname": "Sarah", "lastname": "Chen", "company": "Bright Agency", "jobtitle": "CEO", "persona": "founders"},
        {"email": "maya.ortiz@pixelworks.co", "firstname": "Maya", "lastname": "Ortiz", "company": "Pixelworks", "jobtitle": "Art Director", "persona": "creatives"},
        {"email": "tom.becker@flowops.com", "firstname": "Tom", "lastname": "Becker", "company": "FlowOps", "jobtitle": "Operations Manager", "persona": "operations"}
    ]}"#).unwrap();
    path
}

fn build_orchestrator(dir: &TempDir, model: Arc<dyn LanguageModel>) -> CampaignOrchestrator {
    let db = Database::open(dir.path().join("novamind.db")).unwrap();
    let crm = HubSpotClient::simulated(
        HubSpotConfig::default(),
        CampaignActivityLog::new(dir.path().join("campaign_logs.json")),
    ).unwrap();

    CampaignOrchestrator::new(
        db,
        ContentGenerator::new(model.clone(), default_personas()),
        crm,
        AnalyticsEngine::new(ModelAccess::Live(model.clone())),
        ContentOptimizer::new(ModelAccess::Live(model)),
        write_contacts(dir),
        dir.path().join("outputs"),
    )
}

#[tokio::test]
async fn test_full_pipeline_persists_every_step() {
    let temp_dir = TempDir::new().unwrap();
    let orchestrator = build_orchestrator(&temp_dir, Arc::new(PromptRoutedModel::new()));

    let report = orchestrator
        .run_full_pipeline(TOPIC, "Discover how AI tools can streamline your daily tasks")
        .await
        .expect("pipeline should succeed");

    let db = orchestrator.database();

    let blog = db.get_blog_post(report.blog_id).unwrap().expect("blog post stored");
    assert_eq!(blog.topic, TOPIC);
    assert_eq!(blog.title, "Work Smarter with AI");
    assert_eq!(blog.word_count, 8);
    assert_eq!(blog.metadata["status"], "published");

    let newsletters = db.get_newsletters_for_blog(report.blog_id).unwrap();
    assert_eq!(newsletters.len(), 3);
    assert_eq!(report.newsletter_ids.len(), 3);

    let campaigns = orchestrator.list_campaigns().unwrap();
    assert_eq!(campaigns.len(), 1);
    assert_eq!(campaigns[0].name, format!("Work Smarter with AI - {}", TOPIC));
    let campaign = db.get_campaign(report.campaign_id).unwrap().unwrap();
    assert_eq!(campaign.crm_campaign_ref.as_deref(), Some("sim_campaign"));

    let metrics = orchestrator.campaign_metrics(report.campaign_id).unwrap();
    let personas: Vec<_> = metrics.iter().map(|m| m.persona.as_str()).collect();
    assert_eq!(personas, vec!["founders", "creatives", "operations"]);

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report.report_path).unwrap()).unwrap();
    assert_eq!(saved["campaign_id"], report.campaign_id);

    let best = saved["best_performer"]["click_rate"].as_f64().unwrap();
    let worst = saved["worst_performer"]["click_rate"].as_f64().unwrap();
    for m in &metrics {
        assert!(best >= m.stats.click_rate);
        assert!(worst <= m.stats.click_rate);
    }
    assert_eq!(report.analysis.ai_insights, "Creatives responded best; test shorter subjects.");

    for (_, alternatives) in &report.alternatives {
        assert_eq!(alternatives, &vec!["Alt subject one".to_string(), "Alt subject two".to_string()]);
    }

    let suggestions = db.get_optimization_suggestions(report.campaign_id).unwrap();
    assert_eq!(suggestions.len(), 2);
    assert!(suggestions.iter().all(|s| s.suggestion_type == "content_improvement" && s.confidence_score == 0.85));

    assert_eq!(report.next_topics, vec!["AI onboarding playbooks", "Automating client reporting"]);

    // Simulated sends never touch the activity log
    assert!(!temp_dir.path().join("campaign_logs.json").exists());
}

#[tokio::test]
async fn test_generate_then_launch_uses_stored_persona_keys() {
    let temp_dir = TempDir::new().unwrap();
    let orchestrator = build_orchestrator(&temp_dir, Arc::new(PromptRoutedModel::new()));

    let generated = orchestrator.generate_content(TOPIC, "").await.unwrap();
    assert_eq!(generated.newsletters.len(), 3);
    let blog = orchestrator.database().get_blog_post(generated.blog_id).unwrap().unwrap();
    assert_eq!(blog.metadata, serde_json::json!({}));

    let outcome = orchestrator.launch_campaign(generated.blog_id).await.unwrap();
    assert_eq!(outcome.analysis.campaign_id, outcome.campaign_id);
    assert!(outcome.report_path.exists());

    let campaigns = orchestrator.list_campaigns().unwrap();
    assert_eq!(campaigns[0].name, "Work Smarter with AI");

    let metrics = orchestrator.campaign_metrics(outcome.campaign_id).unwrap();
    let personas: Vec<_> = metrics.iter().map(|m| m.persona.as_str()).collect();
    assert_eq!(personas, vec!["founders", "creatives", "operations"]);
}

#[tokio::test]
async fn test_launch_unknown_blog_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let orchestrator = build_orchestrator(&temp_dir, Arc::new(PromptRoutedModel::new()));

    let result = orchestrator.launch_campaign(404).await;
    assert!(matches!(result, Err(NovaMindError::NotFound(_))));
}

#[tokio::test]
async fn test_blog_failure_stops_pipeline_before_persisting() {
    let temp_dir = TempDir::new().unwrap();
    let orchestrator = build_orchestrator(&temp_dir, Arc::new(PromptRoutedModel::failing_blog()));

    let result = orchestrator.run_full_pipeline(TOPIC, "").await;
    assert!(matches!(result, Err(NovaMindError::LanguageModel(_))));
    assert!(orchestrator.list_campaigns().unwrap().is_empty());
    assert!(orchestrator.database().get_blog_post(1).unwrap().is_none());
}
