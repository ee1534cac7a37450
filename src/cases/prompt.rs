//! Prompt construction for case generation.
//!
//! The prompt shows the model one existing case verbatim and asks for a new,
//! structurally identical case as a bare JSON object.

use super::record::CaseRecord;
use super::validation::DEFAULT_ID_PREFIX;

/// Default organization the training cases are written for.
pub const DEFAULT_ORGANIZATION: &str = "X5 Group";

/// Prompt template for case generation.
///
/// Placeholders: `{organization}`, `{prefix}`, `{case_id}`, `{case_text}`,
/// `{best_solution}`, `{keywords}`, `{skills}`.
pub const CASE_GENERATION_PROMPT: &str = r#"You are an expert in designing training cases for corporate learning at {organization}.

Using the example below, create a new unique case in EXACTLY THE SAME FORMAT.

Example case:
case_id: {case_id}
case_text: {case_text}
best_solution: {best_solution}
keywords: {keywords}
skills: {skills}

Create a new case with the following requirements:
1. case_id in the format {prefix}-[NEW_ROLE]-[NEW_THEME]-[NUMBER]
2. case_text must describe a realistic work situation at {organization}
3. best_solution must contain concrete, practical recommendations
4. keywords and skills must be JSON lists: keywords a list of relevant keywords, skills a list of skill objects
5. The case must be unique and differ from the example
6. Keep the professional tone, the level of detail and the language of the example

Return ONLY a JSON object, without any explanations:
{
"case_id": "{prefix}-NEW_ROLE-NEW_THEME-001",
"case_text": "case text",
"best_solution": "solution",
"keywords": ["key", "words"],
"skills": [{"skill": "skill", "criterion": "criterion", "rubric": ["scale"], "recommendation": "recommendation"}]
}
"#;

/// Builds generation prompts from an exemplar case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBuilder {
    organization: String,
    id_prefix: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_ORGANIZATION, DEFAULT_ID_PREFIX)
    }
}

impl PromptBuilder {
    /// Create a builder for the given organization and identifier prefix.
    pub fn new(organization: impl Into<String>, id_prefix: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            id_prefix: id_prefix.into(),
        }
    }

    /// Build the instruction asking for a case analogous to `exemplar`.
    pub fn build(&self, exemplar: &CaseRecord) -> String {
        // Exemplar fields are filled last-to-first: each placeholder then
        // precedes all inserted text, so braces inside case text are inert.
        CASE_GENERATION_PROMPT
            .replace("{organization}", &self.organization)
            .replace("{prefix}", &self.id_prefix)
            .replacen("{skills}", &exemplar.skills, 1)
            .replacen("{keywords}", &exemplar.keywords, 1)
            .replacen("{best_solution}", &exemplar.best_solution, 1)
            .replacen("{case_text}", &exemplar.case_text, 1)
            .replacen("{case_id}", &exemplar.case_id, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exemplar() -> CaseRecord {
        CaseRecord {
            case_id: "X5-BARISTA-UPSELL-001".to_string(),
            case_text: "Гость заказывает американо и торопится на поезд, очередь растёт.".to_string(),
            best_solution: "Предложить выпечку к кофе одной фразой, не задерживая гостя.".to_string(),
            keywords: r#"["upsell","coffee"]"#.to_string(),
            skills: r#"[{"skill":"Продажи","criterion":"Уместность","rubric":["0","5"],"recommendation":"Тренируйте"}]"#
                .to_string(),
        }
    }

    #[test]
    fn test_prompt_contains_exemplar_verbatim() {
        let record = exemplar();
        let prompt = PromptBuilder::default().build(&record);

        assert!(prompt.contains(&record.case_id));
        assert!(prompt.contains(&record.case_text));
        assert!(prompt.contains(&record.best_solution));
        assert!(prompt.contains(&record.keywords));
        assert!(prompt.contains(&record.skills));
    }

    #[test]
    fn test_prompt_lists_requirements_and_schema() {
        let prompt = PromptBuilder::default().build(&exemplar());

        for n in 1..=6 {
            assert!(prompt.contains(&format!("\n{}. ", n)), "missing requirement {}", n);
        }
        assert!(prompt.contains("X5-[NEW_ROLE]-[NEW_THEME]-[NUMBER]"));
        assert!(prompt.contains("Return ONLY a JSON object"));
        assert!(prompt.contains(r#""case_id": "X5-NEW_ROLE-NEW_THEME-001""#));
        assert!(prompt.contains("X5 Group"));
        assert!(!prompt.contains("{prefix}"));
        assert!(!prompt.contains("{organization}"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let builder = PromptBuilder::default();
        assert_eq!(builder.build(&exemplar()), builder.build(&exemplar()));
    }

    #[test]
    fn test_custom_organization_and_prefix() {
        let prompt = PromptBuilder::new("Acme Retail", "ACME").build(&exemplar());
        assert!(prompt.contains("corporate learning at Acme Retail"));
        assert!(prompt.contains("ACME-[NEW_ROLE]-[NEW_THEME]-[NUMBER]"));
    }

    #[test]
    fn test_placeholder_text_in_exemplar_is_kept() {
        let mut record = exemplar();
        record.case_text = "Manager writes {skills} on the whiteboard before the shift.".to_string();
        let prompt = PromptBuilder::default().build(&record);
        assert!(prompt.contains(&record.case_text));
        assert!(prompt.contains(&record.skills));
    }
}
