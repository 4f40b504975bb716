//! Prompt Builder: turns a `GenerationRequest` into the instruction text sent to the
//! generation backend. Pure: no I/O, never fails.

use crate::outreach::style::StyleSpec;

/// Substituted when the company name is blank.
pub const COMPANY_PLACEHOLDER: &str = "the company";
/// Substituted when the role title is blank.
pub const ROLE_PLACEHOLDER: &str = "this role";
const DESCRIPTION_PLACEHOLDER: &str = "No description provided.";
const BACKGROUND_PLACEHOLDER: &str = "No background provided.";

/// Outreach prompt template. Filled in a single pass by `fill_template`, so
/// braces inside résumé or description text are never re-expanded.
pub const OUTREACH_PROMPT_TEMPLATE: &str = r#"Write a cold outreach email from a student to {company} about the {role} opening.

POSITION: {role}
COMPANY: {company}

ROLE DESCRIPTION:
{description}

CANDIDATE BACKGROUND:
{resume}

STYLE RULES:
- Length: {words_min}-{words_max} words in at most {max_paragraphs} short paragraphs of no more than {max_lines} lines each
{opening_rules}
- {proof_point_rule}
- {call_to_action_rule}
- The last sentence before the sign-off must be exactly: "{closing_sentence}"
- Never use any of these phrases: {banned_phrases}
- First person, plain professional tone, no bullet points, no placeholders in brackets
- Do NOT include a subject line or a signature block

Write only the email body:"#;

/// One outreach generation request. Lives for a single call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRequest {
    pub resume_text: String,
    pub role_description: String,
    pub role_title: String,
    pub company_name: String,
}

impl GenerationRequest {
    #[cfg(test)]
    pub fn new(
        resume_text: impl Into<String>,
        role_description: impl Into<String>,
        role_title: impl Into<String>,
        company_name: impl Into<String>,
    ) -> Self {
        Self {
            resume_text: resume_text.into(),
            role_description: role_description.into(),
            role_title: role_title.into(),
            company_name: company_name.into(),
        }
    }

    /// Trims every field and cuts it to the style table's limits.
    pub fn sanitized(&self, style: &StyleSpec) -> Self {
        Self {
            resume_text: truncate_chars(&self.resume_text, style.max_resume_chars),
            role_description: truncate_chars(&self.role_description, style.max_description_chars),
            role_title: truncate_chars(&self.role_title, style.max_title_chars),
            company_name: truncate_chars(&self.company_name, style.max_company_chars),
        }
    }

    /// Role title, or the generic placeholder when blank.
    pub fn role_or_placeholder(&self) -> &str {
        non_blank_or(&self.role_title, ROLE_PLACEHOLDER)
    }

    /// Company name, or the generic placeholder when blank.
    pub fn company_or_placeholder(&self) -> &str {
        non_blank_or(&self.company_name, COMPANY_PLACEHOLDER)
    }
}

/// Trims surrounding whitespace and keeps at most `max` characters.
/// Counts Unicode scalar values, so a multi-byte character is never split.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.trim().chars().take(max).collect()
}

pub(crate) fn non_blank_or<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        placeholder
    } else {
        trimmed
    }
}

/// Builds the backend instruction text. The request must already be sanitized.
pub fn build_outreach_prompt(request: &GenerationRequest, style: &StyleSpec) -> String {
    let opening_rules = style
        .opening_rules
        .iter()
        .map(|rule| format!("- {rule}"))
        .collect::<Vec<_>>()
        .join("\n");
    let banned_phrases = style
        .banned_phrases
        .iter()
        .map(|p| format!("\"{p}\""))
        .collect::<Vec<_>>()
        .join(", ");

    let words_min = style.target_words_min.to_string();
    let words_max = style.target_words_max.to_string();
    let max_paragraphs = style.max_paragraphs.to_string();
    let max_lines = style.max_lines_per_paragraph.to_string();

    fill_template(
        OUTREACH_PROMPT_TEMPLATE,
        &[
            ("company", request.company_or_placeholder()),
            ("role", request.role_or_placeholder()),
            (
                "description",
                non_blank_or(&request.role_description, DESCRIPTION_PLACEHOLDER),
            ),
            (
                "resume",
                non_blank_or(&request.resume_text, BACKGROUND_PLACEHOLDER),
            ),
            ("words_min", &words_min),
            ("words_max", &words_max),
            ("max_paragraphs", &max_paragraphs),
            ("max_lines", &max_lines),
            ("opening_rules", &opening_rules),
            ("proof_point_rule", &style.proof_point_rule),
            ("call_to_action_rule", &style.call_to_action_rule),
            ("closing_sentence", &style.closing_sentence),
            ("banned_phrases", &banned_phrases),
        ],
    )
}

/// Replaces `{key}` markers in a single left-to-right pass.
/// Unknown markers are copied through verbatim; substituted values are never rescanned.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replaced = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });
        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest::new(
            "Built SmartSense using STM32 and FreeRTOS.",
            "Firmware internship on sensor nodes.",
            "Embedded Systems Intern",
            "Acme Robotics",
        )
    }

    #[test]
    fn test_prompt_embeds_request_fields() {
        let style = StyleSpec::default();
        let prompt = build_outreach_prompt(&request().sanitized(&style), &style);

        assert!(prompt.contains("POSITION: Embedded Systems Intern"));
        assert!(prompt.contains("COMPANY: Acme Robotics"));
        assert!(prompt.contains("Built SmartSense using STM32 and FreeRTOS."));
        assert!(prompt.contains("Firmware internship on sensor nodes."));
    }

    #[test]
    fn test_prompt_embeds_style_rules() {
        let style = StyleSpec::default();
        let prompt = build_outreach_prompt(&request().sanitized(&style), &style);

        assert!(prompt.contains("120-170 words"));
        assert!(prompt.contains(&style.closing_sentence));
        assert!(prompt.contains(&style.proof_point_rule));
        assert!(prompt.contains(&style.call_to_action_rule));
        assert!(prompt.contains("\"various projects\""));
        assert!(prompt.contains("Do NOT include a subject line"));
    }

    #[test]
    fn test_empty_request_uses_placeholders() {
        let style = StyleSpec::default();
        let prompt =
            build_outreach_prompt(&GenerationRequest::default().sanitized(&style), &style);

        assert!(prompt.contains("POSITION: this role"));
        assert!(prompt.contains("COMPANY: the company"));
        assert!(prompt.contains(DESCRIPTION_PLACEHOLDER));
        assert!(prompt.contains(BACKGROUND_PLACEHOLDER));
        assert!(!prompt.contains("{role}"));
        assert!(!prompt.contains("{company}"));
    }

    #[test]
    fn test_whitespace_only_fields_count_as_empty() {
        let style = StyleSpec::default();
        let req = GenerationRequest::new("  ", "\n", " \t ", "   ").sanitized(&style);
        assert_eq!(req.role_or_placeholder(), ROLE_PLACEHOLDER);
        assert_eq!(req.company_or_placeholder(), COMPANY_PLACEHOLDER);
    }

    #[test]
    fn test_resume_truncated_to_exact_limit() {
        let style = StyleSpec::default();
        let long = "a".repeat(style.max_resume_chars + 250);
        let req = GenerationRequest::new(long, "", "", "").sanitized(&style);
        assert_eq!(req.resume_text.chars().count(), style.max_resume_chars);
    }

    #[test]
    fn test_description_truncated_to_exact_limit() {
        let style = StyleSpec::default();
        let long = "d".repeat(style.max_description_chars * 2);
        let req = GenerationRequest::new("", long, "", "").sanitized(&style);
        assert_eq!(req.role_description.chars().count(), style.max_description_chars);
    }

    #[test]
    fn test_short_fields_are_not_padded_or_cut() {
        let style = StyleSpec::default();
        let req = request().sanitized(&style);
        assert_eq!(req, request());
    }

    #[test]
    fn test_truncate_chars_never_splits_multibyte() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo");
        assert_eq!(truncate_chars("日本語テキスト", 3), "日本語");
    }

    #[test]
    fn test_truncate_chars_trims_first() {
        assert_eq!(truncate_chars("   abc   ", 2), "ab");
    }

    #[test]
    fn test_fill_template_does_not_rescan_values() {
        let out = fill_template("{a} and {b}", &[("a", "{b}"), ("b", "x")]);
        assert_eq!(out, "{b} and x");
    }

    #[test]
    fn test_fill_template_keeps_unknown_markers() {
        let out = fill_template("{known} {unknown} {", &[("known", "k")]);
        assert_eq!(out, "k {unknown} {");
    }

    #[test]
    fn test_braces_in_resume_are_left_alone() {
        let style = StyleSpec::default();
        let req = GenerationRequest::new("Wrote fn main() { {company} }", "", "Intern", "Initech")
            .sanitized(&style);
        let prompt = build_outreach_prompt(&req, &style);
        assert!(prompt.contains("Wrote fn main() { {company} }"));
    }
}
