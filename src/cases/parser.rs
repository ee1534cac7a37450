//! Parsing of generated text into case drafts.
//!
//! The model is asked to answer with a bare JSON object, but replies still
//! arrive wrapped in prose or code fences. Parsing takes the widest
//! `{...}` span of the reply, decodes it and checks that every required field
//! is present. Field-level rules live in [`super::validation`].

use serde_json::{Map, Value};

use super::record::{CaseRecord, KEYWORDS, REQUIRED_FIELDS, SKILLS};
use crate::error::ParseError;
use crate::utils::json_extraction::{content_preview, detect_truncated_json, extract_outer_object};

/// A decoded but not yet validated case object.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseDraft {
    fields: Map<String, Value>,
}

impl CaseDraft {
    /// Field value by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// The decoded JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Consume the draft, returning the decoded JSON object.
    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }

    /// Build a draft from a stored record, decoding its JSON list columns.
    ///
    /// Columns that are not valid JSON are kept as plain strings so that
    /// validation reports them as non-list values.
    pub fn from_record(record: &CaseRecord) -> Self {
        let mut fields = Map::new();
        for name in REQUIRED_FIELDS {
            let raw = record.field(name).unwrap_or_default();
            let value = if name == KEYWORDS || name == SKILLS {
                serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
            } else {
                Value::String(raw.to_string())
            };
            fields.insert(name.to_string(), value);
        }
        Self { fields }
    }
}

impl TryFrom<Value> for CaseDraft {
    type Error = ParseError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let fields = match value {
            Value::Object(fields) => fields,
            Value::Null => return Err(ParseError::NotAnObject("null")),
            Value::Bool(_) => return Err(ParseError::NotAnObject("a boolean")),
            Value::Number(_) => return Err(ParseError::NotAnObject("a number")),
            Value::String(_) => return Err(ParseError::NotAnObject("a string")),
            Value::Array(_) => return Err(ParseError::NotAnObject("an array")),
        };

        if let Some(missing) = REQUIRED_FIELDS
            .into_iter()
            .find(|field| !fields.contains_key(*field))
        {
            return Err(ParseError::MissingField(missing));
        }

        Ok(Self { fields })
    }
}

/// Extract a case draft from generated text.
///
/// Fails when the text has no brace-delimited span, when the span is not
/// valid JSON, or when a required field is missing.
pub fn parse_case(text: &str) -> Result<CaseDraft, ParseError> {
    let Some(span) = extract_outer_object(text) else {
        if let Some((unclosed_braces, unclosed_brackets)) = detect_truncated_json(text) {
            return Err(ParseError::Truncated {
                unclosed_braces,
                unclosed_brackets,
            });
        }
        return Err(ParseError::NoJsonObject {
            content_preview: content_preview(text, 50),
        });
    };

    let value: Value = serde_json::from_str(span).map_err(|e| {
        match detect_truncated_json(span) {
            Some((unclosed_braces, unclosed_brackets)) => ParseError::Truncated {
                unclosed_braces,
                unclosed_brackets,
            },
            None => ParseError::InvalidJson(e.to_string()),
        }
    })?;

    CaseDraft::try_from(value)
}
