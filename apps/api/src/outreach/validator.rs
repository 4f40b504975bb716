//! Output Validator: heuristic "too generic" gate applied to backend output.
//!
//! Rule (from the style table):
//! - reject if `banned_phrase_threshold` or more banned phrases appear (case-insensitive substring)
//! - reject if the body has fewer than `min_words` whitespace-separated words
//!
//! This is deliberately a fixed rule, not a quality judgement. False positives are expected.

use serde::Serialize;

use crate::outreach::style::StyleSpec;

/// Result of running the validator over a generated body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationVerdict {
    pub is_generic: bool,
    pub reasons: Vec<String>,
}

impl ValidationVerdict {
    pub fn accepted(&self) -> bool {
        !self.is_generic
    }
}

/// Applies the style table's genericity rule to `body`.
pub fn validate_output(body: &str, style: &StyleSpec) -> ValidationVerdict {
    let mut reasons = Vec::new();

    let hits = banned_phrase_hits(body, &style.banned_phrases);
    if hits.len() >= style.banned_phrase_threshold {
        reasons.push(format!(
            "contains {} banned phrases: {}",
            hits.len(),
            hits.join(", ")
        ));
    }

    let words = word_count(body);
    if words < style.min_words {
        reasons.push(format!(
            "too short: {words} words (minimum {})",
            style.min_words
        ));
    }

    ValidationVerdict {
        is_generic: !reasons.is_empty(),
        reasons,
    }
}

/// Banned phrases present in `body`, in table order, each reported once.
pub fn banned_phrase_hits<'a>(body: &str, banned: &'a [String]) -> Vec<&'a str> {
    let lower = body.to_lowercase();
    banned
        .iter()
        .map(String::as_str)
        .filter(|phrase| !phrase.is_empty() && lower.contains(&phrase.to_lowercase()))
        .collect()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
