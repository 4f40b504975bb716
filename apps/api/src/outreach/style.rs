//! Style specification: the versionable data table that drives prompt construction,
//! output validation and subject selection.
//!
//! The built-in table is used unless `STYLE_SPEC_PATH` points at a JSON file. Every field
//! is optional in that file; missing fields keep their built-in value.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Limits, rules and templates for AI-generated outreach emails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSpec {
    /// Maximum characters of résumé text embedded in a prompt.
    pub max_resume_chars: usize,
    /// Maximum characters of role description embedded in a prompt.
    pub max_description_chars: usize,
    pub max_title_chars: usize,
    pub max_company_chars: usize,

    /// Word range the model is asked to hit.
    pub target_words_min: usize,
    pub target_words_max: usize,
    pub max_paragraphs: usize,
    pub max_lines_per_paragraph: usize,

    /// Bodies shorter than this are rejected by the validator.
    pub min_words: usize,
    /// Number of distinct banned phrases that makes a body "too generic".
    pub banned_phrase_threshold: usize,
    /// Matched case-insensitively as substrings.
    pub banned_phrases: Vec<String>,

    pub opening_rules: Vec<String>,
    pub proof_point_rule: String,
    pub call_to_action_rule: String,
    /// Sentence every email must end with (before the sign-off).
    pub closing_sentence: String,

    /// `{role}` and `{company}` are substituted.
    pub subject_templates: Vec<String>,

    pub system_instruction: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for StyleSpec {
    fn default() -> Self {
        Self {
            max_resume_chars: 1500,
            max_description_chars: 600,
            max_title_chars: 120,
            max_company_chars: 120,

            target_words_min: 120,
            target_words_max: 170,
            max_paragraphs: 4,
            max_lines_per_paragraph: 3,

            min_words: 100,
            banned_phrase_threshold: 2,
            banned_phrases: [
                "i am writing to express",
                "i am passionate",
                "i have experience",
                "various projects",
                "i believe i would be a great fit",
                "i am excited to apply",
                "strong interest",
                "team player",
                "hardworking",
                "fast learner",
                "to whom it may concern",
                "leverage my skills",
                "hit the ground running",
                "think outside the box",
            ]
            .into_iter()
            .map(String::from)
            .collect(),

            opening_rules: vec![
                "Open with one sentence about something specific to the company or the role, not about yourself".to_string(),
                "Never open with \"I am writing to\", \"My name is\" or \"I hope this email finds you well\"".to_string(),
            ],
            proof_point_rule: "Include exactly ONE proof point: a single concrete project or achievement from the background, named, with the technology used and one tangible or quantified result".to_string(),
            call_to_action_rule: "End with exactly ONE call to action: ask for a short 15-minute conversation".to_string(),
            closing_sentence: "Thank you for your time and consideration.".to_string(),

            subject_templates: vec![
                "Application for {role} Position at {company}".to_string(),
                "Interested in {role} Role at {company}".to_string(),
                "{role} Application - Enthusiastic Candidate".to_string(),
                "Passionate Candidate for {role} at {company}".to_string(),
            ],

            system_instruction: "You are a professional career counselor and email writer \
                specializing in helping students write internship and job application emails. \
                Your responses are always professional, constructive, and appropriate for \
                workplace communication."
                .to_string(),
            temperature: 0.7,
            max_output_tokens: 500,
        }
    }
}

impl StyleSpec {
    /// Loads a style table from a JSON file, filling unspecified fields from the defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read style spec at '{}'", path.display()))?;
        let spec: StyleSpec = serde_json::from_str(&raw)
            .with_context(|| format!("Style spec at '{}' is not valid JSON", path.display()))?;
        spec.check()?;
        Ok(spec)
    }

    /// Rejects tables that would make the pipeline misbehave.
    pub fn check(&self) -> Result<()> {
        if self.subject_templates.is_empty() {
            anyhow::bail!("style spec must define at least one subject template");
        }
        if let Some(bad) = self
            .subject_templates
            .iter()
            .find(|t| !t.contains("{role}") && !t.contains("{company}"))
        {
            anyhow::bail!("subject template '{bad}' must reference {{role}} or {{company}}");
        }
        if self.banned_phrase_threshold == 0 {
            anyhow::bail!("banned_phrase_threshold must be at least 1");
        }
        if self.target_words_min > self.target_words_max {
            anyhow::bail!(
                "target word range is inverted ({} > {})",
                self.target_words_min,
                self.target_words_max
            );
        }
        Ok(())
    }
}
