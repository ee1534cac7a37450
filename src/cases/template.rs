//! Template-based case generation.
//!
//! Produces syntactically valid cases without calling a model. The content
//! is generic: a random role and theme are drawn from fixed lists and
//! interpolated into fixed sentences.

use rand::seq::IndexedRandom;
use rand::Rng;

use super::record::{CaseRecord, Skill};
use super::validation::DEFAULT_ID_PREFIX;

/// Roles a template case can be written for.
pub const ROLES: [&str; 7] = [
    "BARISTA",
    "MANAGER",
    "IT",
    "LOGISTICS",
    "HR",
    "FINANCE",
    "MARKETING",
];

/// Themes a template case can cover.
pub const THEMES: [&str; 6] = [
    "UPSELL",
    "QUALITY",
    "CUSTOMER",
    "TRAINING",
    "OPTIMIZATION",
    "ANALYTICS",
];

/// Generates placeholder cases from fixed patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSynthesizer {
    id_prefix: String,
    organization: String,
}

impl Default for TemplateSynthesizer {
    fn default() -> Self {
        Self::new(DEFAULT_ID_PREFIX, super::prompt::DEFAULT_ORGANIZATION)
    }
}

impl TemplateSynthesizer {
    /// Create a synthesizer for the given identifier prefix and organization.
    pub fn new(id_prefix: impl Into<String>, organization: impl Into<String>) -> Self {
        Self {
            id_prefix: id_prefix.into(),
            organization: organization.into(),
        }
    }

    /// Generate the case numbered `index` with a thread-local RNG.
    pub fn generate_template(&self, index: usize) -> CaseRecord {
        self.generate_with_rng(index, &mut rand::rng())
    }

    /// Generate the case numbered `index`, drawing role and theme from `rng`.
    pub fn generate_with_rng<R: Rng + ?Sized>(&self, index: usize, rng: &mut R) -> CaseRecord {
        let role = ROLES.choose(rng).copied().unwrap_or(ROLES[0]);
        let theme = THEMES.choose(rng).copied().unwrap_or(THEMES[0]);
        let role_lower = role.to_lowercase();

        let keywords = vec![
            role_lower.clone(),
            theme.to_lowercase(),
            self.id_prefix.to_lowercase(),
            "case".to_string(),
        ];

        CaseRecord {
            case_id: format!("{}-{}-{}-{:03}", self.id_prefix, role, theme, index),
            case_text: format!(
                "In your role as {} at {}, a realistic work situation has come up that requires a decision.",
                role_lower, self.organization
            ),
            best_solution: format!(
                "A concrete action plan for the {} that follows best practices and uses the available resources.",
                role_lower
            ),
            keywords: json_text(&keywords),
            skills: json_text(&[boilerplate_skill()]),
        }
    }

    /// Generate `count` cases numbered from `start_index`.
    pub fn generate_batch(&self, start_index: usize, count: usize) -> Vec<CaseRecord> {
        let mut rng = rand::rng();
        (0..count)
            .map(|i| self.generate_with_rng(start_index + i, &mut rng))
            .collect()
    }
}

fn boilerplate_skill() -> Skill {
    Skill {
        skill: "Professional knowledge".to_string(),
        criterion: "Depth of understanding of the subject area".to_string(),
        rubric: vec![
            "0 - absent".to_string(),
            "5 - expert understanding".to_string(),
        ],
        recommendation: "Study additional materials on the topic".to_string(),
    }
}

fn json_text<T: serde::Serialize + ?Sized>(value: &T) -> String {
    // Vec<String> and Vec<Skill> always serialize.
    serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string())
}
