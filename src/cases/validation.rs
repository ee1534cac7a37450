//! Structural validation of generated cases.
//!
//! Validation never judges content (relevance of keywords, quality of the
//! solution); it only checks shape: required fields, identifier prefix,
//! minimum text lengths and list-typed fields.

use serde_json::Value;

use super::parser::CaseDraft;
use super::record::{CaseRecord, BEST_SOLUTION, CASE_ID, CASE_TEXT, KEYWORDS, REQUIRED_FIELDS, SKILLS};
use crate::error::ValidationError;

/// Default organizational prefix of case identifiers.
pub const DEFAULT_ID_PREFIX: &str = "X5";

/// Default minimum length, in characters, of scenario and solution texts.
pub const DEFAULT_MIN_TEXT_CHARS: usize = 50;

/// Checks generated cases against the dataset's structural rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseValidator {
    id_prefix: String,
    min_text_chars: usize,
}

impl Default for CaseValidator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_PREFIX, DEFAULT_MIN_TEXT_CHARS)
    }
}

impl CaseValidator {
    /// Create a validator for identifiers starting with `<id_prefix>-`.
    pub fn new(id_prefix: impl Into<String>, min_text_chars: usize) -> Self {
        Self {
            id_prefix: id_prefix.into(),
            min_text_chars,
        }
    }

    /// The identifier prefix including the trailing dash, e.g. `X5-`.
    pub fn required_id_start(&self) -> String {
        format!("{}-", self.id_prefix)
    }

    /// Minimum scenario/solution length in characters.
    pub fn min_text_chars(&self) -> usize {
        self.min_text_chars
    }

    /// Validate a draft and convert it into a tabular record.
    ///
    /// Keyword and skill lists are JSON-encoded for storage.
    pub fn validate(&self, draft: &CaseDraft) -> Result<CaseRecord, ValidationError> {
        for field in REQUIRED_FIELDS {
            if draft.get(field).is_none() {
                return Err(ValidationError::MissingField(field));
            }
        }

        let case_id = self.string_field(draft, CASE_ID)?;
        let required_start = self.required_id_start();
        if !case_id.starts_with(&required_start) {
            return Err(ValidationError::InvalidPrefix {
                id: case_id.to_string(),
                prefix: required_start,
            });
        }

        let case_text = self.text_field(draft, CASE_TEXT)?;
        let best_solution = self.text_field(draft, BEST_SOLUTION)?;
        let keywords = self.list_field(draft, KEYWORDS)?;
        let skills = self.list_field(draft, SKILLS)?;

        Ok(CaseRecord {
            case_id: case_id.to_string(),
            case_text: case_text.to_string(),
            best_solution: best_solution.to_string(),
            keywords: keywords.to_string(),
            skills: skills.to_string(),
        })
    }

    /// Whether the draft passes [`CaseValidator::validate`].
    pub fn is_valid(&self, draft: &CaseDraft) -> bool {
        self.validate(draft).is_ok()
    }

    /// Validate a stored record by decoding its list columns first.
    pub fn validate_record(&self, record: &CaseRecord) -> Result<CaseRecord, ValidationError> {
        self.validate(&CaseDraft::from_record(record))
    }

    fn string_field<'a>(
        &self,
        draft: &'a CaseDraft,
        field: &'static str,
    ) -> Result<&'a str, ValidationError> {
        draft
            .get(field)
            .and_then(Value::as_str)
            .ok_or(ValidationError::NotAString(field))
    }

    fn text_field<'a>(
        &self,
        draft: &'a CaseDraft,
        field: &'static str,
    ) -> Result<&'a str, ValidationError> {
        let text = self.string_field(draft, field)?;
        let len = text.chars().count();
        if len < self.min_text_chars {
            return Err(ValidationError::TooShort {
                field,
                len,
                min: self.min_text_chars,
            });
        }
        Ok(text)
    }

    fn list_field<'a>(
        &self,
        draft: &'a CaseDraft,
        field: &'static str,
    ) -> Result<&'a Value, ValidationError> {
        match draft.get(field) {
            Some(value @ Value::Array(_)) => Ok(value),
            Some(_) => Err(ValidationError::NotAList(field)),
            None => Err(ValidationError::MissingField(field)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cases::parser::parse_case;
    use serde_json::json;

    fn draft(value: serde_json::Value) -> CaseDraft {
        parse_case(&value.to_string()).expect("test draft should parse")
    }

    fn valid_case() -> serde_json::Value {
        json!({
            "case_id": "X5-BARISTA-UPSELL-002",
            "case_text": "A guest orders a plain espresso during the morning rush and looks undecided.",
            "best_solution": "Greet warmly, suggest a fresh croissant as a pairing, and confirm the order.",
            "keywords": ["upsell", "coffee"],
            "skills": [{"skill": "Sales", "criterion": "Relevant offer", "rubric": ["0", "5"], "recommendation": "Practice"}]
        })
    }

    #[test]
    fn test_valid_case_passes() {
        let validator = CaseValidator::default();
        let record = validator
            .validate(&draft(valid_case()))
            .expect("case should be valid");

        assert_eq!(record.case_id, "X5-BARISTA-UPSELL-002");
        assert_eq!(record.keywords, r#"["upsell","coffee"]"#);
        assert_eq!(record.skill_list().expect("skills decode")[0].skill, "Sales");
    }

    #[test]
    fn test_rejects_wrong_prefix() {
        let mut case = valid_case();
        case["case_id"] = json!("Y7-BARISTA-UPSELL-002");

        let err = CaseValidator::default()
            .validate(&draft(case))
            .expect_err("prefix should be rejected");
        assert_eq!(
            err,
            ValidationError::InvalidPrefix {
                id: "Y7-BARISTA-UPSELL-002".to_string(),
                prefix: "X5-".to_string(),
            }
        );
    }

    #[test]
    fn test_prefix_requires_dash() {
        let mut case = valid_case();
        case["case_id"] = json!("X5BARISTA-UPSELL-002");
        assert!(!CaseValidator::default().is_valid(&draft(case)));
    }

    #[test]
    fn test_rejects_short_scenario() {
        let mut case = valid_case();
        case["case_text"] = json!("Too short to be a real scenario.");

        let err = CaseValidator::default()
            .validate(&draft(case))
            .expect_err("short text should be rejected");
        assert!(matches!(
            err,
            ValidationError::TooShort {
                field: "case_text",
                min: 50,
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_short_solution() {
        let mut case = valid_case();
        case["best_solution"] = json!("Just do it.");
        assert!(matches!(
            CaseValidator::default().validate(&draft(case)),
            Err(ValidationError::TooShort {
                field: "best_solution",
                ..
            })
        ));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 50 Cyrillic characters are 100 bytes but exactly at the threshold.
        let mut case = valid_case();
        case["case_text"] = json!("ж".repeat(50));
        assert!(CaseValidator::default().is_valid(&draft(case.clone())));

        case["case_text"] = json!("ж".repeat(49));
        assert!(!CaseValidator::default().is_valid(&draft(case)));
    }

    #[test]
    fn test_rejects_non_list_keywords_and_skills() {
        let mut case = valid_case();
        case["keywords"] = json!("upsell, coffee");
        assert_eq!(
            CaseValidator::default().validate(&draft(case)),
            Err(ValidationError::NotAList("keywords"))
        );

        let mut case = valid_case();
        case["skills"] = json!({"skill": "Sales"});
        assert_eq!(
            CaseValidator::default().validate(&draft(case)),
            Err(ValidationError::NotAList("skills"))
        );
    }

    #[test]
    fn test_rejects_non_string_id() {
        let mut case = valid_case();
        case["case_id"] = json!(42);
        assert_eq!(
            CaseValidator::default().validate(&draft(case)),
            Err(ValidationError::NotAString("case_id"))
        );
    }

    #[test]
    fn test_custom_prefix_and_threshold() {
        let validator = CaseValidator::new("ACME", 10);
        let case = json!({
            "case_id": "ACME-HR-TRAINING-001",
            "case_text": "Ten chars!",
            "best_solution": "Eleven chrs",
            "keywords": [],
            "skills": []
        });
        assert!(validator.is_valid(&draft(case)));
        assert_eq!(validator.required_id_start(), "ACME-");
    }

    #[test]
    fn test_validate_record_decodes_list_columns() {
        let validator = CaseValidator::default();
        let record = validator
            .validate(&draft(valid_case()))
            .expect("case should be valid");
        assert_eq!(validator.validate_record(&record), Ok(record.clone()));

        let mut broken = record;
        broken.keywords = "upsell; coffee".to_string();
        assert_eq!(
            validator.validate_record(&broken),
            Err(ValidationError::NotAList("keywords"))
        );
    }
}
