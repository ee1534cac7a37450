//! JSON extraction utilities for parsing LLM responses.
//!
//! Generated replies often wrap the requested JSON object in explanations or
//! markdown fences. The extraction here takes the widest brace-delimited span
//! of the reply (from the first `{` to the last `}`), which keeps nested
//! objects intact and tolerates any amount of surrounding prose.
//!
//! # Example
//!
//! ```
//! use case_forge::utils::json_extraction::extract_outer_object;
//!
//! let response = "Sure! Here it is: {\"case_id\": \"X5-HR-TRAINING-001\"} Hope it helps.";
//! assert_eq!(
//!     extract_outer_object(response),
//!     Some("{\"case_id\": \"X5-HR-TRAINING-001\"}")
//! );
//! assert_eq!(extract_outer_object("no json here"), None);
//! ```

use std::sync::LazyLock;

use regex::Regex;

/// Greedy brace span, newlines included.
static OUTER_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("Invalid regex for outer object"));

/// Analysis result for JSON structure
#[derive(Debug, Clone, PartialEq)]
pub struct JsonStructureAnalysis {
    /// Number of unclosed braces ('{' without matching '}')
    pub unclosed_braces: usize,
    /// Number of unclosed brackets ('[' without matching ']')
    pub unclosed_brackets: usize,
    /// Whether we ended inside a string literal
    pub in_string: bool,
    /// The position where JSON-like content starts (first '{' or '[')
    pub json_start: Option<usize>,
}

/// Returns the greedy `{...}` span of `content`: everything from the first
/// opening brace to the last closing brace, newlines included.
///
/// Returns `None` when the content has no such span.
pub fn extract_outer_object(content: &str) -> Option<&str> {
    OUTER_OBJECT.find(content).map(|m| m.as_str())
}

/// Analyzes JSON structure to determine if content is truncated
///
/// Scans the content and tracks brace/bracket depth outside of string
/// literals.
pub fn analyze_json_structure(s: &str) -> JsonStructureAnalysis {
    let mut brace_depth: isize = 0;
    let mut bracket_depth: isize = 0;
    let mut in_string = false;
    let mut escape_next = false;
    let mut json_start: Option<usize> = None;

    for (i, c) in s.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => {
                escape_next = true;
            }
            '"' => {
                in_string = !in_string;
            }
            '{' if !in_string => {
                if json_start.is_none() {
                    json_start = Some(i);
                }
                brace_depth += 1;
            }
            '}' if !in_string => {
                brace_depth -= 1;
            }
            '[' if !in_string => {
                if json_start.is_none() {
                    json_start = Some(i);
                }
                bracket_depth += 1;
            }
            ']' if !in_string => {
                bracket_depth -= 1;
            }
            _ => {}
        }
    }

    JsonStructureAnalysis {
        unclosed_braces: brace_depth.max(0) as usize,
        unclosed_brackets: bracket_depth.max(0) as usize,
        in_string,
        json_start,
    }
}

/// Detects if content appears to contain truncated JSON
///
/// Returns `Some((unclosed_braces, unclosed_brackets))` when JSON starts in
/// the content but never closes, `None` if it is balanced or absent.
pub fn detect_truncated_json(content: &str) -> Option<(usize, usize)> {
    let analysis = analyze_json_structure(content.trim());
    analysis.json_start?;

    if analysis.unclosed_braces > 0 || analysis.unclosed_brackets > 0 || analysis.in_string {
        Some((analysis.unclosed_braces, analysis.unclosed_brackets))
    } else {
        None
    }
}

/// First `max_chars` characters of the trimmed content, for log lines and
/// error messages. Never splits a multi-byte character.
pub fn content_preview(content: &str, max_chars: usize) -> String {
    content.trim().chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_direct_object() {
        let input = r#"{"key": "value"}"#;
        assert_eq!(extract_outer_object(input), Some(input));
    }

    #[test]
    fn test_extract_object_with_surrounding_text() {
        let input = "Here is the case:\n{\"a\": 1}\nThanks!";
        assert_eq!(extract_outer_object(input), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_extract_is_greedy_across_objects() {
        // The span runs from the first '{' to the last '}'.
        let input = "{\"a\": 1} and {\"b\": 2}";
        assert_eq!(extract_outer_object(input), Some(input));
    }

    #[test]
    fn test_extract_nested_and_multiline() {
        let input = "```json\n{\n  \"skills\": [{\"skill\": \"x\"}]\n}\n```";
        assert_eq!(
            extract_outer_object(input),
            Some("{\n  \"skills\": [{\"skill\": \"x\"}]\n}")
        );
    }

    #[test]
    fn test_extract_not_found() {
        assert_eq!(extract_outer_object(""), None);
        assert_eq!(extract_outer_object("plain text"), None);
        assert_eq!(extract_outer_object("only an opening {"), None);
    }

    #[test]
    fn test_outer_object_pattern_is_compiled_once() {
        let first: *const Regex = &*OUTER_OBJECT;
        for reply in ["{\"a\": 1}", "text {\n\"b\": 2\n} text", "none"] {
            extract_outer_object(reply);
        }
        assert!(std::ptr::eq(first, &*OUTER_OBJECT));
        assert!(OUTER_OBJECT.is_match("{\n}"));
    }

    #[test]
    fn test_analyze_json_structure() {
        let analysis = analyze_json_structure(r#"{"a": [1, 2"#);
        assert_eq!(analysis.unclosed_braces, 1);
        assert_eq!(analysis.unclosed_brackets, 1);
        assert!(!analysis.in_string);
        assert_eq!(analysis.json_start, Some(0));

        let analysis = analyze_json_structure(r#"text {"a": "}"}"#);
        assert_eq!(analysis.unclosed_braces, 0);
        assert_eq!(analysis.json_start, Some(5));
    }

    #[test]
    fn test_detect_truncated_json() {
        assert_eq!(detect_truncated_json(r#"{"case_id": "X5-"#), Some((1, 0)));
        assert_eq!(detect_truncated_json(r#"{"a": {"b": [1"#), Some((2, 1)));
        assert_eq!(detect_truncated_json(r#"{"a": 1}"#), None);
        assert_eq!(detect_truncated_json("no json"), None);
    }

    #[test]
    fn test_content_preview_is_char_safe() {
        assert_eq!(content_preview("  Привет, мир  ", 6), "Привет");
        assert_eq!(content_preview("short", 50), "short");
    }
}
