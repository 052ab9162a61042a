//! Blog and newsletter generation through the language model

use crate::clients::{CompletionRequest, LanguageModel};
use crate::error::Result;
use crate::services::response_parser::{
    parse_numbered_list, parse_sections, ParsedSections, BLOG_SCHEMA, NEWSLETTER_SCHEMA,
};
use novamind_types::{BlogDraft, NewsletterDraft, Persona};
use std::sync::Arc;

pub struct ContentGenerator {
    model: Arc<dyn LanguageModel>,
    personas: Vec<Persona>,
}

impl ContentGenerator {
    pub fn new(model: Arc<dyn LanguageModel>, personas: Vec<Persona>) -> Self {
        Self { model, personas }
    }

    /// Generate a blog post draft (title, outline, content) for a topic
    pub async fn generate_blog_post(&self, topic: &str, context: &str) -> Result<BlogDraft> {
        log::info!("🤖 Generating blog post about: {}", topic);

        let reply = self.model
            .complete(CompletionRequest::new(build_blog_prompt(topic, context), 2000, 0.7))
            .await
            .map_err(|e| {
                log::error!("❌ Error generating blog post: {}", e);
                e
            })?;

        let parsed = parse_sections(&reply, &BLOG_SCHEMA);
        warn_if_incomplete(&parsed, "blog post");

        let draft = BlogDraft {
            title: parsed.get("TITLE:").to_string(),
            outline: parsed.get("OUTLINE:").to_string(),
            content: parsed.get("CONTENT:").to_string(),
        };

        log::info!("✅ Blog post generated: {}", draft.title);
        Ok(draft)
    }

    /// One newsletter per persona, in persona order. The first failure aborts the batch.
    pub async fn generate_newsletter_variations(&self, blog: &BlogDraft) -> Result<Vec<NewsletterDraft>> {
        log::info!("📧 Generating personalized newsletters...");

        let mut newsletters = Vec::with_capacity(self.personas.len());

        for persona in &self.personas {
            let reply = self.model
                .complete(CompletionRequest::new(build_newsletter_prompt(blog, persona), 800, 0.8))
                .await
                .map_err(|e| {
                    log::error!("❌ Error generating newsletter for {}: {}", persona.key, e);
                    e
                })?;

            let parsed = parse_sections(&reply, &NEWSLETTER_SCHEMA);
            warn_if_incomplete(&parsed, &format!("newsletter for {}", persona.key));

            newsletters.push(NewsletterDraft {
                persona_key: persona.key.clone(),
                persona: persona.name.clone(),
                subject_line: parsed.get("SUBJECT:").to_string(),
                preview_text: parsed.get("PREVIEW:").to_string(),
                content: parsed.get("BODY:").to_string(),
            });

            log::info!("✅ Newsletter created for {}", persona.name);
        }

        Ok(newsletters)
    }

    /// Alternative phrasings for A/B testing; errors yield an empty list
    pub async fn generate_alternative_versions(
        &self,
        original: &str,
        content_type: &str,
        count: usize,
    ) -> Vec<String> {
        log::info!("🔄 Generating {} alternatives for {}...", count, content_type);

        let prompt = build_alternatives_prompt(original, content_type, count);

        match self.model.complete(CompletionRequest::new(prompt, 300, 0.9)).await {
            Ok(reply) => {
                let mut alternatives = parse_numbered_list(&reply);
                alternatives.truncate(count);
                log::info!("✅ Generated {} alternatives", alternatives.len());
                alternatives
            }
            Err(e) => {
                log::error!("❌ Error generating alternatives: {}", e);
                Vec::new()
            }
        }
    }
}

fn warn_if_incomplete(parsed: &ParsedSections, what: &str) {
    if !parsed.is_complete() {
        log::warn!("⚠️  Incomplete {} reply, missing: {}", what, parsed.missing().join(", "));
    }
}

fn build_blog_prompt(topic: &str, context: &str) -> String {
    let context_line = if context.trim().is_empty() {
        String::new()
    } else {
        format!("Additional Context: {}", context)
    };

    format!(
        "You are a content writer for NovaMind, an AI startup helping creative agencies automate workflows.\n\
        \n\
        Topic: {}\n\
        {}\n\
        \n\
        Write a blog post that:\n\
        1. Addresses automation trends in creative work\n\
        2. Shows practical value and real-world applications\n\
        3. Is approximately 500 words\n\
        4. Has an engaging, conversational tone\n\
        5. Includes actionable takeaways\n\
        \n\
        First provide a brief outline (3-4 main sections), then write the full blog post.\n\
        \n\
        Format your response as:\n\
        TITLE: [compelling title]\n\
        \n\
        OUTLINE:\n\
        [outline here]\n\
        \n\
        CONTENT:\n\
        [full blog post here]",
        topic, context_line
    )
}

fn build_newsletter_prompt(blog: &BlogDraft, persona: &Persona) -> String {
    format!(
        "Based on this blog post, create a personalized newsletter version for {}.\n\
        \n\
        Blog Title: {}\n\
        Blog Content: {}\n\
        \n\
        Persona Details:\n\
        - Focus areas: {}\n\
        - Tone: {}\n\
        - Pain points: {}\n\
        \n\
        Create a newsletter that:\n\
        1. Has a compelling subject line (under 60 characters)\n\
        2. Includes a preview text (under 100 characters)\n\
        3. Summarizes the blog in 150-200 words\n\
        4. Emphasizes points relevant to this persona\n\
        5. Has a clear call-to-action to read the full blog\n\
        6. Uses the appropriate tone for this audience\n\
        \n\
        Format:\n\
        SUBJECT: [subject line]\n\
        PREVIEW: [preview text]\n\
        BODY: [newsletter content]",
        persona.name,
        blog.title,
        blog.content,
        persona.focus.join(", "),
        persona.tone,
        persona.pain_points.join(", ")
    )
}

fn build_alternatives_prompt(original: &str, content_type: &str, count: usize) -> String {
    format!(
        "Generate {count} alternative versions of this {content_type}:\n\
        \n\
        Original: {original}\n\
        \n\
        Make each version:\n\
        1. Significantly different in approach\n\
        2. Equally compelling\n\
        3. Appropriate for professional marketing\n\
        \n\
        Return just the {count} alternatives, numbered 1-{count}."
    )
}
