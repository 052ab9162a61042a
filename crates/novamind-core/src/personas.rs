//! Audience personas: built-in defaults or an ordered JSON file keyed by persona key

use crate::error::Result;
use indexmap::IndexMap;
use novamind_types::Persona;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One entry of the personas file; the key comes from the enclosing object
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersonaProfile {
    name: String,
    #[serde(default)]
    focus: Vec<String>,
    #[serde(default)]
    tone: String,
    #[serde(default)]
    pain_points: Vec<String>,
}

fn persona(key: &str, name: &str, focus: &[&str], tone: &str, pain_points: &[&str]) -> Persona {
    Persona {
        key: key.to_string(),
        name: name.to_string(),
        focus: focus.iter().map(|s| s.to_string()).collect(),
        tone: tone.to_string(),
        pain_points: pain_points.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn default_personas() -> Vec<Persona> {
    vec![
        persona(
            "founders",
            "Founders / Decision-Makers",
            &["ROI", "growth", "efficiency"],
            "strategic and data-driven",
            &["time management", "scaling challenges"],
        ),
        persona(
            "creatives",
            "Creative Professionals",
            &["inspiration", "time-saving tools"],
            "inspiring and visual",
            &["creative blocks", "repetitive tasks"],
        ),
        persona(
            "operations",
            "Operations Managers",
            &["workflows", "integrations", "reliability"],
            "practical and detail-oriented",
            &["system integration", "team coordination"],
        ),
    ]
}

/// Load personas in file order, or the defaults when the file does not exist
pub fn load_personas<P: AsRef<Path>>(path: P) -> Result<Vec<Persona>> {
    let path = path.as_ref();
    if !path.exists() {
        log::debug!("No personas file at {}, using defaults", path.display());
        return Ok(default_personas());
    }

    let content = fs::read_to_string(path)?;
    parse_personas(&content)
}

fn parse_personas(json: &str) -> Result<Vec<Persona>> {
    let profiles: IndexMap<String, PersonaProfile> = serde_json::from_str(json)?;

    Ok(profiles
        .into_iter()
        .map(|(key, profile)| Persona {
            key,
            name: profile.name,
            focus: profile.focus,
            tone: profile.tone,
            pain_points: profile.pain_points,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_order() {
        let keys: Vec<_> = default_personas().into_iter().map(|p| p.key).collect();
        assert_eq!(keys, vec!["founders", "creatives", "operations"]);
    }

    #[test]
    fn test_file_order_is_preserved() {
        let personas = parse_personas(r#"{
            "zeta": {"name": "Zeta", "focus": ["a"], "tone": "calm", "pain_points": []},
            "alpha": {"name": "Alpha", "tone": "bold"}
        }"#).unwrap();

        assert_eq!(personas[0].key, "zeta");
        assert_eq!(personas[1].key, "alpha");
        assert!(personas[1].focus.is_empty());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let personas = load_personas(temp_dir.path().join("personas.json")).unwrap();
        assert_eq!(personas, default_personas());
    }
}
