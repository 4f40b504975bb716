// Outreach email generation.
// Implements: prompt building, output validation, template fallback, subject lines, pipeline.
// All backend calls go through llm_client; nothing in here talks to a provider directly.

pub mod fallback;
pub mod generator;
pub mod handlers;
pub mod profile;
pub mod prompts;
pub mod style;
pub mod subject;
pub mod validator;
