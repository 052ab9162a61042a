//! SQLite persistence for blog posts, newsletters, campaigns, metrics and suggestions
//!
//! Every operation opens its own connection with foreign keys enforced, so
//! each insert commits on its own and a dangling parent id is rejected.

use crate::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use novamind_types::{
    word_count, BlogPost, Campaign, CampaignOverview, CampaignStatus, EngagementStats,
    Newsletter, NewsletterDraft, OptimizationSuggestion, PerformanceMetrics,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::fs;
use std::path::{Path, PathBuf};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS blog_posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    topic TEXT NOT NULL,
    title TEXT NOT NULL,
    outline TEXT NOT NULL,
    content TEXT NOT NULL,
    word_count INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    metadata TEXT NOT NULL DEFAULT '{}'
);

CREATE TABLE IF NOT EXISTS newsletters (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    blog_id INTEGER NOT NULL REFERENCES blog_posts(id),
    persona_key TEXT NOT NULL,
    persona TEXT NOT NULL,
    subject_line TEXT NOT NULL,
    preview_text TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS campaigns (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    blog_id INTEGER NOT NULL REFERENCES blog_posts(id),
    campaign_name TEXT NOT NULL,
    send_date TEXT NOT NULL,
    crm_campaign_ref TEXT,
    status TEXT NOT NULL DEFAULT 'draft'
);

CREATE TABLE IF NOT EXISTS performance_metrics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    campaign_id INTEGER NOT NULL REFERENCES campaigns(id),
    persona TEXT NOT NULL,
    sent INTEGER NOT NULL,
    delivered INTEGER NOT NULL,
    opened INTEGER NOT NULL,
    clicked INTEGER NOT NULL,
    unsubscribed INTEGER NOT NULL,
    open_rate REAL NOT NULL,
    click_rate REAL NOT NULL,
    unsubscribe_rate REAL NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS optimization_suggestions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    campaign_id INTEGER NOT NULL REFERENCES campaigns(id),
    suggestion_type TEXT NOT NULL,
    suggestion_text TEXT NOT NULL,
    confidence_score REAL NOT NULL,
    created_at TEXT NOT NULL
);
";

pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Open (or create) the database file and make sure every table exists
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let db = Self { path };
        db.connect()?.execute_batch(SCHEMA)?;
        log::info!("✅ Database initialized at {}", db.path.display());
        Ok(db)
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }

    pub fn save_blog_post(
        &self,
        topic: &str,
        title: &str,
        outline: &str,
        content: &str,
        metadata: &serde_json::Value,
    ) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO blog_posts (topic, title, outline, content, word_count, created_at, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                topic,
                title,
                outline,
                content,
                word_count(content) as i64,
                timestamp(Utc::now()),
                serde_json::to_string(metadata)?,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_blog_post(&self, id: i64) -> Result<Option<BlogPost>> {
        let conn = self.connect()?;
        let post = conn
            .query_row(
                "SELECT id, topic, title, outline, content, word_count, created_at, metadata
                 FROM blog_posts WHERE id = ?1",
                params![id],
                |row| {
                    let metadata: String = row.get(7)?;
                    Ok(BlogPost {
                        id: row.get(0)?,
                        topic: row.get(1)?,
                        title: row.get(2)?,
                        outline: row.get(3)?,
                        content: row.get(4)?,
                        word_count: row.get(5)?,
                        created_at: read_timestamp(row, 6)?,
                        metadata: serde_json::from_str(&metadata).map_err(|e| {
                            rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e))
                        })?,
                    })
                },
            )
            .optional()?;
        Ok(post)
    }

    pub fn save_newsletter(&self, blog_id: i64, newsletter: &NewsletterDraft) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO newsletters (blog_id, persona_key, persona, subject_line, preview_text, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                blog_id,
                newsletter.persona_key,
                newsletter.persona,
                newsletter.subject_line,
                newsletter.preview_text,
                newsletter.content,
                timestamp(Utc::now()),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Newsletters of a blog post in insertion order
    pub fn get_newsletters_for_blog(&self, blog_id: i64) -> Result<Vec<Newsletter>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, blog_id, persona_key, persona, subject_line, preview_text, content, created_at
             FROM newsletters WHERE blog_id = ?1 ORDER BY id",
        )?;

        let rows = stmt.query_map(params![blog_id], |row| {
            Ok(Newsletter {
                id: row.get(0)?,
                blog_id: row.get(1)?,
                persona_key: row.get(2)?,
                persona: row.get(3)?,
                subject_line: row.get(4)?,
                preview_text: row.get(5)?,
                content: row.get(6)?,
                created_at: read_timestamp(row, 7)?,
            })
        })?;

        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Record a campaign as sent now
    pub fn create_campaign(&self, blog_id: i64, name: &str, crm_campaign_ref: Option<&str>) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO campaigns (blog_id, campaign_name, send_date, crm_campaign_ref, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                blog_id,
                name,
                timestamp(Utc::now()),
                crm_campaign_ref,
                CampaignStatus::Sent.as_str(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_campaign(&self, id: i64) -> Result<Option<Campaign>> {
        let conn = self.connect()?;
        let campaign = conn
            .query_row(
                "SELECT id, blog_id, campaign_name, send_date, crm_campaign_ref, status
                 FROM campaigns WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Campaign {
                        id: row.get(0)?,
                        blog_id: row.get(1)?,
                        campaign_name: row.get(2)?,
                        send_date: read_timestamp(row, 3)?,
                        crm_campaign_ref: row.get(4)?,
                        status: read_status(row, 5)?,
                    })
                },
            )
            .optional()?;
        Ok(campaign)
    }

    /// Every campaign with its blog title and topic, newest first
    pub fn get_all_campaigns(&self) -> Result<Vec<CampaignOverview>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT c.id, c.campaign_name, c.send_date, c.status, b.title, b.topic
             FROM campaigns c
             JOIN blog_posts b ON c.blog_id = b.id
             ORDER BY c.send_date DESC, c.id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(CampaignOverview {
                id: row.get(0)?,
                name: row.get(1)?,
                send_date: read_timestamp(row, 2)?,
                status: read_status(row, 3)?,
                blog_title: row.get(4)?,
                topic: row.get(5)?,
            })
        })?;

        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn save_performance_metrics(&self, campaign_id: i64, persona_key: &str, stats: &EngagementStats) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO performance_metrics
             (campaign_id, persona, sent, delivered, opened, clicked, unsubscribed, open_rate, click_rate, unsubscribe_rate, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                campaign_id,
                persona_key,
                stats.sent,
                stats.delivered,
                stats.opens,
                stats.clicks,
                stats.unsubscribes,
                stats.open_rate,
                stats.click_rate,
                stats.unsubscribe_rate,
                timestamp(Utc::now()),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Metrics rows of a campaign in insertion order
    pub fn get_campaign_performance(&self, campaign_id: i64) -> Result<Vec<PerformanceMetrics>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, campaign_id, persona, sent, delivered, opened, clicked, unsubscribed,
                    open_rate, click_rate, unsubscribe_rate, recorded_at
             FROM performance_metrics WHERE campaign_id = ?1 ORDER BY id",
        )?;

        let rows = stmt.query_map(params![campaign_id], |row| {
            Ok(PerformanceMetrics {
                id: row.get(0)?,
                campaign_id: row.get(1)?,
                persona: row.get(2)?,
                stats: EngagementStats {
                    sent: row.get(3)?,
                    delivered: row.get(4)?,
                    opens: row.get(5)?,
                    clicks: row.get(6)?,
                    unsubscribes: row.get(7)?,
                    open_rate: row.get(8)?,
                    click_rate: row.get(9)?,
                    unsubscribe_rate: row.get(10)?,
                },
                recorded_at: read_timestamp(row, 11)?,
            })
        })?;

        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn save_optimization_suggestion(
        &self,
        campaign_id: i64,
        suggestion_type: &str,
        suggestion_text: &str,
        confidence_score: f64,
    ) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO optimization_suggestions (campaign_id, suggestion_type, suggestion_text, confidence_score, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                campaign_id,
                suggestion_type,
                suggestion_text,
                confidence_score,
                timestamp(Utc::now()),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_optimization_suggestions(&self, campaign_id: i64) -> Result<Vec<OptimizationSuggestion>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, campaign_id, suggestion_type, suggestion_text, confidence_score, created_at
             FROM optimization_suggestions WHERE campaign_id = ?1 ORDER BY id",
        )?;

        let rows = stmt.query_map(params![campaign_id], |row| {
            Ok(OptimizationSuggestion {
                id: row.get(0)?,
                campaign_id: row.get(1)?,
                suggestion_type: row.get(2)?,
                suggestion_text: row.get(3)?,
                confidence_score: row.get(4)?,
                created_at: read_timestamp(row, 5)?,
            })
        })?;

        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

/// Fixed-width UTC text so that string order matches time order
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn read_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn read_status(row: &Row<'_>, idx: usize) -> rusqlite::Result<CampaignStatus> {
    let text: String = row.get(idx)?;
    CampaignStatus::try_from(text.as_str())
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NovaMindError;
    use serde_json::json;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, Database) {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::open(temp_dir.path().join("data").join("novamind.db")).unwrap();
        (temp_dir, db)
    }

    fn draft(key: &str, name: &str) -> NewsletterDraft {
        NewsletterDraft {
            persona_key: key.to_string(),
            persona: name.to_string(),
            subject_line: format!("{} subject", name),
            preview_text: "Preview".to_string(),
            content: "Body".to_string(),
        }
    }

    #[test]
    fn test_blog_post_round_trip() {
        let (_dir, db) = open_temp();
        let content = "AI tools  save\n\ntime for agencies.";
        let id = db.save_blog_post(
            "Boost Productivity with AI in 2025",
            "Work Smarter",
            "1. Intro\n2. Tools",
            content,
            &json!({"status": "published"}),
        ).unwrap();

        let post = db.get_blog_post(id).unwrap().unwrap();
        assert_eq!(post.topic, "Boost Productivity with AI in 2025");
        assert_eq!(post.title, "Work Smarter");
        assert_eq!(post.outline, "1. Intro\n2. Tools");
        assert_eq!(post.content, content);
        assert_eq!(post.word_count, 6);
        assert_eq!(post.metadata["status"], "published");

        assert!(db.get_blog_post(id + 1).unwrap().is_none());
    }

    #[test]
    fn test_newsletters_keep_persona_key_and_order() {
        let (_dir, db) = open_temp();
        let blog_id = db.save_blog_post("t", "T", "", "c", &json!({})).unwrap();

        db.save_newsletter(blog_id, &draft("founders", "Founders / Decision-Makers")).unwrap();
        db.save_newsletter(blog_id, &draft("creatives", "Creative Professionals")).unwrap();

        let newsletters = db.get_newsletters_for_blog(blog_id).unwrap();
        let keys: Vec<_> = newsletters.iter().map(|n| n.persona_key.as_str()).collect();
        assert_eq!(keys, vec!["founders", "creatives"]);
        assert_eq!(newsletters[1].persona, "Creative Professionals");
    }

    #[test]
    fn test_dangling_parent_is_rejected() {
        let (_dir, db) = open_temp();
        let result = db.save_newsletter(999, &draft("founders", "Founders"));
        assert!(matches!(result, Err(NovaMindError::Database(_))));

        let result = db.save_performance_metrics(42, "founders", &EngagementStats::default());
        assert!(matches!(result, Err(NovaMindError::Database(_))));
    }

    #[test]
    fn test_campaign_listing_joins_blog_newest_first() {
        let (_dir, db) = open_temp();
        let first_blog = db.save_blog_post("First topic", "First", "", "c", &json!({})).unwrap();
        let second_blog = db.save_blog_post("Second topic", "Second", "", "c", &json!({})).unwrap();

        let first = db.create_campaign(first_blog, "First campaign", Some("sim_campaign")).unwrap();
        let second = db.create_campaign(second_blog, "Second campaign", None).unwrap();

        let campaigns = db.get_all_campaigns().unwrap();
        assert_eq!(campaigns.len(), 2);
        assert_eq!(campaigns[0].id, second);
        assert_eq!(campaigns[0].topic, "Second topic");
        assert_eq!(campaigns[1].id, first);
        assert_eq!(campaigns[1].blog_title, "First");

        let stored = db.get_campaign(first).unwrap().unwrap();
        assert_eq!(stored.status, CampaignStatus::Sent);
        assert_eq!(stored.crm_campaign_ref.as_deref(), Some("sim_campaign"));
    }

    #[test]
    fn test_metrics_and_suggestions_round_trip() {
        let (_dir, db) = open_temp();
        let blog_id = db.save_blog_post("t", "T", "", "c", &json!({})).unwrap();
        let campaign_id = db.create_campaign(blog_id, "T", None).unwrap();

        let stats = EngagementStats::from_counts(180, 176, 44, 9, 1);
        db.save_performance_metrics(campaign_id, "operations", &stats).unwrap();
        db.save_optimization_suggestion(campaign_id, "content_improvement", "Add a case study", 0.85).unwrap();

        let metrics = db.get_campaign_performance(campaign_id).unwrap();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].persona, "operations");
        assert_eq!(metrics[0].stats, stats);

        let suggestions = db.get_optimization_suggestions(campaign_id).unwrap();
        assert_eq!(suggestions[0].suggestion_text, "Add a case study");
        assert_eq!(suggestions[0].confidence_score, 0.85);
    }
}
