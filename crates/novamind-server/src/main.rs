//! NovaMind pipeline executable
//!
//! Runs the full content pipeline once from the console, or serves the
//! HTTP front-end with `--serve`.

mod web_service;

use anyhow::Context;
use clap::{Arg, Command};
use novamind_core::{CampaignOrchestrator, NovaMindConfig, PipelineReport};
use std::path::Path;
use std::sync::Arc;

const DEFAULT_TOPIC: &str = "Boost Productivity with AI in 2025";
const DEFAULT_CONTEXT: &str = "Discover how AI tools can streamline your daily tasks, automate routine work, \
and help your team achieve more in less time";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with INFO as default if RUST_LOG not set
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let matches = Command::new("novamind")
        .version("1.0.0")
        .about("NovaMind AI content marketing pipeline")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config/novamind.json")
        )
        .arg(
            Arg::new("topic")
                .long("topic")
                .value_name("TEXT")
                .help("Blog topic for the pipeline run")
                .default_value(DEFAULT_TOPIC)
        )
        .arg(
            Arg::new("context")
                .long("context")
                .value_name("TEXT")
                .help("Additional context passed to the blog prompt")
                .default_value(DEFAULT_CONTEXT)
        )
        .arg(
            Arg::new("serve")
                .long("serve")
                .help("Start the HTTP front-end instead of running the pipeline")
                .action(clap::ArgAction::SetTrue)
        )
        .arg(
            Arg::new("bind")
                .long("bind")
                .value_name("ADDR")
                .help("HTTP bind address (overrides server.bind_addr)")
        )
        .get_matches();

    // Load configuration
    let config_path = matches.get_one::<String>("config").map(String::as_str).unwrap_or("config/novamind.json");
    let mut config = NovaMindConfig::load(Some(Path::new(config_path)))
        .context("Failed to load configuration")?;

    if Path::new(config_path).exists() {
        log::info!("Loaded configuration from {}", config_path);
    } else {
        log::info!("No configuration file at {}, using defaults and environment", config_path);
    }

    if let Some(bind) = matches.get_one::<String>("bind") {
        config.server.bind_addr = bind.clone();
    }

    log::info!("🔧 Initializing pipeline components...");
    let orchestrator = Arc::new(CampaignOrchestrator::from_config(&config).await?);
    if orchestrator.crm().simulation_mode() {
        log::info!("CRM running in simulation mode");
    }
    log::info!("✅ All components initialized");

    if matches.get_flag("serve") {
        web_service::serve(orchestrator, &config.server.bind_addr)
            .await
            .map_err(|e| anyhow::anyhow!("HTTP server failed: {}", e))?;
        return Ok(());
    }

    let topic = matches.get_one::<String>("topic").map(String::as_str).unwrap_or(DEFAULT_TOPIC);
    let context = matches.get_one::<String>("context").map(String::as_str).unwrap_or(DEFAULT_CONTEXT);

    let report = orchestrator
        .run_full_pipeline(topic, context)
        .await
        .context("Pipeline run failed")?;

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &PipelineReport) {
    let rule = "=".repeat(60);

    println!("\n{}", rule);
    println!("🚀 NOVAMIND CONTENT PIPELINE");
    println!("{}\n", rule);

    println!("📝 Blog Post (ID: {})", report.blog_id);
    println!("   Title: {}", report.blog.title);
    println!("   Word Count: {}", novamind_types::word_count(&report.blog.content));

    for newsletter in &report.newsletters {
        println!("\n📧 Newsletter for {}", newsletter.persona);
        println!("   Subject: {}", newsletter.subject_line);
        let preview: String = newsletter.preview_text.chars().take(50).collect();
        println!("   Preview: {}...", preview);
    }

    for (persona_key, alternatives) in &report.alternatives {
        println!("\n🔄 Alternatives for {}:", persona_key);
        for (i, alt) in alternatives.iter().enumerate() {
            println!("   {}. {}", i + 1, alt);
        }
    }

    let summary = &report.analysis.summary;
    println!("\n📈 Campaign {} Summary:", report.campaign_id);
    println!("   Total Sent: {}", summary.total_sent);
    println!("   Average Open Rate: {}%", summary.avg_open_rate);
    println!("   Average Click Rate: {}%", summary.avg_click_rate);

    println!("\n🏆 Best Performer: {}", report.analysis.best_performer.persona);
    println!("   Click Rate: {}%", report.analysis.best_performer.click_rate);
    println!("\n📉 Needs Improvement: {}", report.analysis.worst_performer.persona);
    println!("   Click Rate: {}%", report.analysis.worst_performer.click_rate);

    println!("\n🤖 AI Insights:\n{}", report.analysis.ai_insights);
    println!("\nAnalysis saved to {}", report.report_path.display());

    if let Some(improvements) = &report.improvements {
        println!("\n💡 Suggestions for {}:", report.analysis.worst_performer.persona);
        for suggestion in &improvements.suggestions {
            println!("   • {}", suggestion);
        }
    }

    println!("\n📚 Suggested Next Topics:");
    for (i, topic) in report.next_topics.iter().enumerate() {
        println!("   {}. {}", i + 1, topic);
    }

    println!("\n{}", rule);
    println!("✅ PIPELINE COMPLETE");
    println!("{}\n", rule);
}
