//! Training cases: the record model and everything that turns model output
//! into records.
//!
//! - [`record`]: `CaseRecord`, `Skill` and the ordered `Dataset`
//! - [`prompt`]: the generation prompt built from an exemplar case
//! - [`parser`]: extraction of a `CaseDraft` from noisy generated text
//! - [`validation`]: structural checks turning a draft into a record
//! - [`template`]: model-free fallback cases

pub mod parser;
pub mod prompt;
pub mod record;
pub mod template;
pub mod validation;

pub use parser::{parse_case, CaseDraft};
pub use prompt::{PromptBuilder, CASE_GENERATION_PROMPT, DEFAULT_ORGANIZATION};
pub use record::{CaseRecord, ColumnLayout, Dataset, Skill, REQUIRED_FIELDS};
pub use template::{TemplateSynthesizer, ROLES, THEMES};
pub use validation::{CaseValidator, DEFAULT_ID_PREFIX, DEFAULT_MIN_TEXT_CHARS};
