//! Best-effort JSON extraction from model output.
//!
//! Models asked for JSON routinely wrap it in prose or markdown fences,
//! or append stray characters after the closing brace. These helpers
//! pull out the first balanced `{...}` region so callers can treat
//! "almost JSON" replies uniformly.

use serde::de::DeserializeOwned;

/// Extract a JSON object from a response that may contain markdown or
/// other text.
pub fn extract_object(response: &str) -> &str {
    let trimmed = response.trim();

    // If it starts with {, extract the balanced JSON object
    if trimmed.starts_with('{') {
        return extract_balanced(trimmed);
    }

    // Try to find JSON in a ```json code block
    if let Some(start) = trimmed.find("```json") {
        let json_start = start + 7;
        if let Some(end) = trimmed[json_start..].find("```") {
            let extracted = trimmed[json_start..json_start + end].trim();
            return extract_balanced(extracted);
        }
    }

    // Try to find JSON in a generic code block
    if let Some(start) = trimmed.find("```") {
        let after_backticks = &trimmed[start + 3..];
        // Skip optional language identifier
        let json_start = after_backticks.find('\n').map(|i| i + 1).unwrap_or(0);
        if let Some(end) = after_backticks[json_start..].find("```") {
            let extracted = after_backticks[json_start..json_start + end].trim();
            return extract_balanced(extracted);
        }
    }

    // Try to find a JSON object anywhere in the text
    if let Some(start) = trimmed.find('{') {
        return extract_balanced(&trimmed[start..]);
    }

    trimmed
}

/// Extract and deserialize a JSON object from model output.
///
/// Returns `None` when the response holds nothing parseable, so callers
/// handle the soft-failure path in one place.
pub fn parse_object<T: DeserializeOwned>(response: &str) -> Option<T> {
    serde_json::from_str(extract_object(response)).ok()
}

/// Extract a balanced JSON object from a string that starts with '{'.
///
/// Handles models appending trailing characters after the object, for
/// example `{"to": "bob"}}}` -> `{"to": "bob"}`.
fn extract_balanced(s: &str) -> &str {
    if !s.starts_with('{') {
        return s;
    }

    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in s.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => {
                escape_next = true;
            }
            '"' => {
                in_string = !in_string;
            }
            '{' if !in_string => {
                depth += 1;
            }
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return &s[..=i];
                }
            }
            _ => {}
        }
    }

    // No balanced object found, hand back the input
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Draft {
        to: Option<String>,
        subject: Option<String>,
    }

    #[test]
    fn test_extract_clean_object() {
        let input = r#"{"to": "bob@example.com", "subject": "hi"}"#;
        assert_eq!(extract_object(input), input);
    }

    #[test]
    fn test_extract_trailing_braces() {
        let input = r#"{"to": "bob"}}}"#;
        assert_eq!(extract_object(input), r#"{"to": "bob"}"#);
    }

    #[test]
    fn test_extract_braces_inside_strings() {
        let input = r#"{"subject": "re: {urgent}", "nested": {"k": "v"}}"#;
        assert_eq!(extract_object(input), input);
    }

    #[test]
    fn test_extract_escaped_quotes() {
        let input = r#"{"subject": "she said \"now\"", "done": true}"#;
        assert_eq!(extract_object(input), input);
    }

    #[test]
    fn test_extract_from_json_fence() {
        let input = "Here you go:\n```json\n{\"to\": \"bob\"}\n```\nanything else?";
        assert_eq!(extract_object(input), r#"{"to": "bob"}"#);
    }

    #[test]
    fn test_extract_from_generic_fence() {
        let input = "```\n{\"to\": \"bob\"}\n```";
        assert_eq!(extract_object(input), r#"{"to": "bob"}"#);
    }

    #[test]
    fn test_extract_from_prose() {
        let input = r#"Sure! The fields are {"to": "bob", "subject": null} as requested."#;
        assert_eq!(extract_object(input), r#"{"to": "bob", "subject": null}"#);
    }

    #[test]
    fn test_parse_object_success() {
        let parsed: Option<Draft> =
            parse_object("The JSON is:\n{\"to\": \"bob\", \"subject\": \"lunch\"}");
        let draft = parsed.unwrap();
        assert_eq!(draft.to.as_deref(), Some("bob"));
        assert_eq!(draft.subject.as_deref(), Some("lunch"));
    }

    #[test]
    fn test_parse_object_null_fields() {
        let parsed: Option<Draft> = parse_object(r#"{"to": null, "subject": "x"}"#);
        let draft = parsed.unwrap();
        assert!(draft.to.is_none());
    }

    #[test]
    fn test_parse_object_garbage() {
        let parsed: Option<Draft> = parse_object("I can't help with that.");
        assert!(parsed.is_none());
    }

    #[test]
    fn test_parse_object_unbalanced() {
        let parsed: Option<Draft> = parse_object(r#"{"to": "bob""#);
        assert!(parsed.is_none());
    }
}
