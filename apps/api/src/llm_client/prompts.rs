// Cross-cutting prompt fragments shared by every backend variant.
// Task-specific prompt text lives next to the task (see outreach::prompts).

/// Appended to every system instruction: backends must answer with a bare email body.
pub const PLAIN_TEXT_INSTRUCTION: &str = "\
    Respond with plain text only. \
    Do NOT use markdown, code fences, or bullet points. \
    Do NOT include a subject line, a signature block, or commentary about the email.";

/// Joins a task-specific system instruction with the shared plain-text rule.
pub fn system_prompt(base: &str) -> String {
    let base = base.trim();
    if base.is_empty() {
        PLAIN_TEXT_INSTRUCTION.to_string()
    } else {
        format!("{base}\n\n{PLAIN_TEXT_INSTRUCTION}")
    }
}
