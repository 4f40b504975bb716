//! Profile extraction for the template fallback: keyword dictionary + capitalization
//! heuristics over résumé text and role title. No network, no allocation-heavy parsing.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

/// Broad area the role belongs to, derived from the role title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Ai,
    Embedded,
    Data,
    Backend,
    Frontend,
    Fullstack,
    Generic,
}

/// Keywords per domain, checked in this order. Single words match whole title tokens;
/// entries containing a space or hyphen match as substrings of the lowercased title.
const DOMAIN_KEYWORDS: &[(Domain, &[&str])] = &[
    (
        Domain::Ai,
        &[
            "ai", "ml", "llm", "nlp", "genai", "machine learning", "deep learning",
            "artificial intelligence", "computer vision", "agents",
        ],
    ),
    (
        Domain::Embedded,
        &[
            "embedded", "firmware", "iot", "hardware", "microcontroller", "robotics", "fpga",
            "electronics",
        ],
    ),
    (
        Domain::Data,
        &[
            "data", "analytics", "analyst", "etl", "bi", "business intelligence", "statistics",
        ],
    ),
    (
        Domain::Fullstack,
        &["fullstack", "full stack", "full-stack", "mern"],
    ),
    (
        Domain::Backend,
        &[
            "backend", "back-end", "back end", "server", "api", "platform", "infrastructure",
            "devops", "cloud", "sre",
        ],
    ),
    (
        Domain::Frontend,
        &[
            "frontend", "front-end", "front end", "ui", "ux", "react", "web design",
        ],
    ),
];

/// Technology dictionary: canonical name followed by lowercase match forms.
/// Matches are case-insensitive and must sit on word boundaries.
const TECHNOLOGIES: &[(&str, &[&str])] = &[
    ("Python", &["python"]),
    ("Java", &["java"]),
    ("C++", &["c++", "cpp"]),
    ("JavaScript", &["javascript"]),
    ("TypeScript", &["typescript"]),
    ("Rust", &["rust"]),
    ("Golang", &["golang"]),
    ("React", &["react", "react.js", "reactjs"]),
    ("Next.js", &["next.js", "nextjs"]),
    ("Node.js", &["node.js", "nodejs"]),
    ("Django", &["django"]),
    ("Flask", &["flask"]),
    ("FastAPI", &["fastapi"]),
    ("Spring Boot", &["spring boot"]),
    ("TensorFlow", &["tensorflow"]),
    ("PyTorch", &["pytorch"]),
    ("scikit-learn", &["scikit-learn", "sklearn"]),
    ("LangChain", &["langchain"]),
    ("CrewAI", &["crewai"]),
    ("LLMs", &["llm", "llms"]),
    ("OpenCV", &["opencv"]),
    ("Pandas", &["pandas"]),
    ("NumPy", &["numpy"]),
    ("SQL", &["sql"]),
    ("PostgreSQL", &["postgresql", "postgres"]),
    ("MongoDB", &["mongodb"]),
    ("Redis", &["redis"]),
    ("Docker", &["docker"]),
    ("Kubernetes", &["kubernetes", "k8s"]),
    ("AWS", &["aws"]),
    ("GCP", &["gcp"]),
    ("Azure", &["azure"]),
    ("STM32", &["stm32"]),
    ("Arduino", &["arduino"]),
    ("Raspberry Pi", &["raspberry pi"]),
    ("ESP32", &["esp32"]),
    ("FreeRTOS", &["freertos"]),
    ("Verilog", &["verilog"]),
    ("MATLAB", &["matlab"]),
    ("Spark", &["spark", "pyspark"]),
    ("Kafka", &["kafka"]),
    ("Tableau", &["tableau"]),
    ("Power BI", &["power bi"]),
    ("GraphQL", &["graphql"]),
    ("Tailwind CSS", &["tailwind"]),
    ("Linux", &["linux"]),
    ("Git", &["git"]),
];

/// Verbs that usually precede a project name on a résumé.
const PROJECT_TRIGGERS: &[&str] = &[
    "built", "developed", "designed", "created", "implemented", "engineered", "architected",
    "launched", "made", "programmed", "prototyped",
];

/// How many tokens after a trigger word are searched for a project name.
const PROJECT_WINDOW: usize = 5;
/// Longest run of capitalized tokens joined into one project name.
const MAX_PROJECT_WORDS: usize = 3;

/// Capitalized words that are never project names.
const NAME_STOPWORDS: &[&str] = &[
    "a", "an", "the", "i", "my", "our", "this", "that", "using", "with", "for", "and", "in",
    "on", "at", "to", "of", "from", "by", "via", "into", "new", "web", "mobile", "app",
    "application", "website", "system", "tool", "platform", "project", "team", "then", "also",
];

/// What the fallback knows about the candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedProfile {
    /// Canonical names, most-mentioned first.
    pub technologies: Vec<String>,
    pub project_name: Option<String>,
    pub domain: Domain,
}

impl ExtractedProfile {
    pub fn extract(resume_text: &str, role_title: &str) -> Self {
        Self {
            technologies: extract_technologies(resume_text),
            project_name: extract_project_name(resume_text),
            domain: detect_domain(role_title),
        }
    }
}

/// Classifies a role title into a `Domain`.
pub fn detect_domain(role_title: &str) -> Domain {
    let lower = role_title.to_lowercase();
    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    DOMAIN_KEYWORDS
        .iter()
        .find(|(_, keywords)| {
            keywords.iter().any(|kw| {
                if kw.contains(' ') || kw.contains('-') {
                    lower.contains(kw)
                } else {
                    tokens.contains(kw)
                }
            })
        })
        .map(|(domain, _)| *domain)
        .unwrap_or(Domain::Generic)
}

/// Technologies mentioned in `text`, ranked by mention count, ties broken by first appearance.
pub fn extract_technologies(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    // canonical -> match start positions; forms sharing a prefix ("react", "react.js")
    // land on the same position and count once.
    let mut found: HashMap<&str, BTreeSet<usize>> = HashMap::new();

    for (canonical, forms) in TECHNOLOGIES {
        for form in forms.iter() {
            for pos in boundary_matches(&lower, form) {
                found.entry(*canonical).or_default().insert(pos);
            }
        }
    }

    let mut ranked: Vec<(&str, usize, usize)> = found
        .into_iter()
        .filter_map(|(name, positions)| {
            let first = positions.first().copied()?;
            Some((name, positions.len(), first))
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.into_iter().map(|(name, _, _)| name.to_string()).collect()
}

/// Byte offsets of `needle` in `haystack` where neither neighbour is alphanumeric.
fn boundary_matches(haystack: &str, needle: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut start = 0;

    while let Some(found) = haystack[start..].find(needle) {
        let pos = start + found;
        let end = pos + needle.len();
        let before_ok = haystack[..pos]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        // "C++" and "Next.js" end in punctuation; a following letter still breaks the match.
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric() && c != '+');
        if before_ok && after_ok {
            positions.push(pos);
        }
        start = pos + needle.chars().next().map_or(1, char::len_utf8);
    }
    positions
}

/// Best-effort project name: the first run of capitalized, non-stopword, non-technology
/// tokens within `PROJECT_WINDOW` tokens after a trigger verb.
pub fn extract_project_name(text: &str) -> Option<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();

    for (i, raw) in tokens.iter().enumerate() {
        if !PROJECT_TRIGGERS.contains(&clean_token(raw).to_lowercase().as_str()) {
            continue;
        }

        let window_end = (i + 1 + PROJECT_WINDOW).min(tokens.len());
        let mut j = i + 1;
        while j < window_end {
            if !is_name_candidate(tokens[j]) {
                j += 1;
                continue;
            }

            let mut parts = vec![clean_token(tokens[j])];
            let mut k = j;
            while parts.len() < MAX_PROJECT_WORDS
                && !ends_clause(tokens[k])
                && k + 1 < tokens.len()
                && is_name_candidate(tokens[k + 1])
            {
                k += 1;
                parts.push(clean_token(tokens[k]));
            }
            return Some(parts.join(" "));
        }
    }
    None
}

fn clean_token(raw: &str) -> &str {
    raw.trim_matches(|c: char| !c.is_alphanumeric())
}

fn ends_clause(raw: &str) -> bool {
    raw.ends_with([',', '.', ';', ':', ')', '!', '?'])
}

fn is_name_candidate(raw: &str) -> bool {
    let token = clean_token(raw);
    let starts_upper = token.chars().next().is_some_and(char::is_uppercase);
    if !starts_upper || token.chars().count() < 3 {
        return false;
    }
    let lower = token.to_lowercase();
    if NAME_STOPWORDS.contains(&lower.as_str()) || PROJECT_TRIGGERS.contains(&lower.as_str()) {
        return false;
    }
    !TECHNOLOGIES
        .iter()
        .any(|(_, forms)| forms.contains(&lower.as_str()))
}
