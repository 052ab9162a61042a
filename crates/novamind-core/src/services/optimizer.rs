//! Content improvement suggestions and subject-line variants

use crate::clients::{CompletionRequest, ModelAccess};
use crate::services::response_parser::parse_numbered_list;
use novamind_types::{EngagementStats, ImprovementSuggestions};

const CANNED_CONFIDENCE: f64 = 0.7;
const MODEL_CONFIDENCE: f64 = 0.85;
const SUBJECT_VARIANT_COUNT: usize = 3;

pub struct ContentOptimizer {
    model: ModelAccess,
}

impl ContentOptimizer {
    pub fn new(model: ModelAccess) -> Self {
        Self { model }
    }

    pub async fn suggest_improvements(&self, content: &str, performance: &EngagementStats) -> ImprovementSuggestions {
        let ModelAccess::Live(model) = &self.model else {
            return ImprovementSuggestions {
                suggestions: vec![
                    "Add more specific examples".to_string(),
                    "Include data and statistics".to_string(),
                    "Strengthen call-to-action".to_string(),
                ],
                confidence: CANNED_CONFIDENCE,
            };
        };

        let prompt = format!(
            "Review this newsletter content and suggest improvements based on performance data:\n\
            \n\
            Content:\n\
            {}\n\
            \n\
            Performance:\n\
            - Open rate: {}%\n\
            - Click rate: {}%\n\
            \n\
            Provide 3-5 specific, actionable suggestions to improve engagement. Focus on:\n\
            1. Subject line optimization\n\
            2. Content structure\n\
            3. Call-to-action effectiveness\n\
            4. Personalization opportunities\n\
            \n\
            Format as a numbered list.",
            content, performance.open_rate, performance.click_rate
        );

        match model.complete(CompletionRequest::new(prompt, 400, 0.7)).await {
            Ok(reply) => ImprovementSuggestions {
                suggestions: parse_numbered_list(&reply),
                confidence: MODEL_CONFIDENCE,
            },
            Err(e) => {
                log::error!("Error generating suggestions: {}", e);
                ImprovementSuggestions {
                    suggestions: vec!["Could not generate suggestions".to_string()],
                    confidence: 0.0,
                }
            }
        }
    }

    pub async fn optimize_subject_line(&self, subject: &str, persona: &str) -> Vec<String> {
        let ModelAccess::Live(model) = &self.model else {
            return ["Optimized", "Improved", "Enhanced"]
                .iter()
                .map(|tag| format!("[{}] {}", tag, subject))
                .collect();
        };

        let prompt = format!(
            "Optimize this email subject line for {persona}:\n\
            \n\
            Original: {subject}\n\
            \n\
            Create 3 variations that:\n\
            1. Are more engaging and clickable\n\
            2. Use proven email marketing techniques\n\
            3. Stay under 60 characters\n\
            4. Appeal specifically to {persona}\n\
            \n\
            Return just the 3 subject lines, numbered."
        );

        match model.complete(CompletionRequest::new(prompt, 200, 0.8)).await {
            Ok(reply) => {
                let mut variations = parse_numbered_list(&reply);
                variations.truncate(SUBJECT_VARIANT_COUNT);
                variations
            }
            Err(e) => {
                log::error!("Error optimizing subject: {}", e);
                vec![subject.to_string()]
            }
        }
    }
}
