//! Subject Line Generator: picks one template uniformly at random and fills in role/company.
//!
//! The random source is injectable: production uses the thread-local RNG, tests use a
//! seeded `StdRng` or a fixed index.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::outreach::prompts::{
    fill_template, non_blank_or, truncate_chars, COMPANY_PLACEHOLDER, ROLE_PLACEHOLDER,
};
use crate::outreach::style::StyleSpec;

const FALLBACK_TEMPLATE: &str = "Application for {role} at {company}";

/// Source of template indices. `len` is always at least 1.
pub trait IndexPicker: Send + Sync {
    fn pick(&self, len: usize) -> usize;
}

/// Uniform choice from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngPicker;

impl IndexPicker for ThreadRngPicker {
    fn pick(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Reproducible choice sequence.
#[allow(dead_code)] // injected through `EmailService::with_parts` in tests
#[derive(Debug)]
pub struct SeededPicker(Mutex<StdRng>);

#[allow(dead_code)]
impl SeededPicker {
    pub fn new(seed: u64) -> Self {
        Self(Mutex::new(StdRng::seed_from_u64(seed)))
    }
}

impl IndexPicker for SeededPicker {
    fn pick(&self, len: usize) -> usize {
        match self.0.lock() {
            Ok(mut rng) => rng.random_range(0..len),
            // A poisoned lock only means another picker call panicked; any index is valid.
            Err(poisoned) => poisoned.into_inner().random_range(0..len),
        }
    }
}

/// Always returns the same index, clamped to the template count.
#[allow(dead_code)] // injected through `EmailService::with_parts` in tests
#[derive(Debug, Clone, Copy)]
pub struct FixedPicker(pub usize);

impl IndexPicker for FixedPicker {
    fn pick(&self, len: usize) -> usize {
        self.0.min(len - 1)
    }
}

pub struct SubjectLineGenerator {
    templates: Vec<String>,
    picker: Box<dyn IndexPicker>,
    max_title_chars: usize,
    max_company_chars: usize,
}

impl SubjectLineGenerator {
    pub fn new(style: &StyleSpec, picker: Box<dyn IndexPicker>) -> Self {
        Self {
            templates: style.subject_templates.clone(),
            picker,
            max_title_chars: style.max_title_chars,
            max_company_chars: style.max_company_chars,
        }
    }

    /// Every subject this generator could return for the given inputs.
    #[cfg(test)]
    pub fn candidates(&self, role_title: &str, company_name: &str) -> Vec<String> {
        self.templates
            .iter()
            .map(|t| self.instantiate(t, role_title, company_name))
            .collect()
    }

    pub fn generate(&self, role_title: &str, company_name: &str) -> String {
        if self.templates.is_empty() {
            // StyleSpec::check forbids this; keep a usable subject anyway.
            return self.instantiate(FALLBACK_TEMPLATE, role_title, company_name);
        }
        let index = self.picker.pick(self.templates.len());
        self.instantiate(&self.templates[index], role_title, company_name)
    }

    /// Title and company are truncated to the style limits before substitution.
    fn instantiate(&self, template: &str, role_title: &str, company_name: &str) -> String {
        let role = truncate_chars(role_title, self.max_title_chars);
        let company = truncate_chars(company_name, self.max_company_chars);
        fill_template(
            template,
            &[
                ("role", non_blank_or(&role, ROLE_PLACEHOLDER)),
                ("company", non_blank_or(&company, COMPANY_PLACEHOLDER)),
            ],
        )
    }
}
