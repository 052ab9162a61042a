//! Append-only JSON log of campaign send activity

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityEntry {
    pub segment: String,
    pub activity: String,
    pub contacts: usize,
    pub timestamp: DateTime<Utc>,
}

pub struct CampaignActivityLog {
    path: PathBuf,
}

impl CampaignActivityLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Append one entry, rewriting the whole array
    pub fn append(&self, segment: &str, activity: &str, contacts: usize) -> Result<ActivityEntry> {
        let entry = ActivityEntry {
            segment: segment.to_string(),
            activity: activity.to_string(),
            contacts,
            timestamp: Utc::now(),
        };

        let mut entries = self.entries();
        entries.push(entry.clone());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;

        log::debug!("Logged '{}' activity for segment {} ({} contacts)", activity, segment, contacts);
        Ok(entry)
    }

    /// Current entries; a missing or corrupt file reads as empty
    pub fn entries(&self) -> Vec<ActivityEntry> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return Vec::new(),
        };

        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Ignoring unreadable campaign log {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_append_creates_file_and_parents() {
        let temp_dir = TempDir::new().unwrap();
        let log = CampaignActivityLog::new(temp_dir.path().join("data").join("campaign_logs.json"));

        log.append("Founders / Decision-Makers", "sent", 4).unwrap();
        log.append("Creative Professionals", "sent", 3).unwrap();

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].segment, "Founders / Decision-Makers");
        assert_eq!(entries[1].contacts, 3);
    }

    #[test]
    fn test_corrupt_log_is_replaced() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("campaign_logs.json");
        fs::write(&path, "{not json").unwrap();

        let log = CampaignActivityLog::new(&path);
        assert!(log.entries().is_empty());

        log.append("operations", "sent", 2).unwrap();
        assert_eq!(log.entries().len(), 1);
    }
}
