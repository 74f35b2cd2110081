// src/linkedin_analysis/response_parser.rs
//! Best-effort extraction of the JSON object embedded in free model output

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z0-9_+-]*").expect("fence pattern is valid"));

// Greedy: first `{` through last `}`.
static JSON_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").expect("json span pattern is valid"));

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Could not parse AI response as JSON{}", truncation_note(.truncated))]
    NoJsonObject { truncated: bool },

    #[error("AI response contained malformed JSON{}: {source}", truncation_note(.truncated))]
    MalformedJson {
        truncated: bool,
        source: serde_json::Error,
    },

    #[error("Invalid analysis response from AI{}: {detail}", truncation_note(.truncated))]
    UnexpectedShape { truncated: bool, detail: String },
}

impl ParseError {
    pub fn truncated(&self) -> bool {
        match self {
            ParseError::NoJsonObject { truncated }
            | ParseError::MalformedJson { truncated, .. }
            | ParseError::UnexpectedShape { truncated, .. } => *truncated,
        }
    }

    pub fn error_code(&self) -> &'static str {
        if self.truncated() {
            return "AI_RESPONSE_TRUNCATED";
        }
        match self {
            ParseError::NoJsonObject { .. } => "AI_RESPONSE_NOT_JSON",
            ParseError::MalformedJson { .. } => "AI_RESPONSE_MALFORMED",
            ParseError::UnexpectedShape { .. } => "AI_RESPONSE_INVALID",
        }
    }
}

fn truncation_note(truncated: &bool) -> &'static str {
    if *truncated {
        " (response was truncated: the model reached its output token limit)"
    } else {
        ""
    }
}

/// Remove every triple-backtick fence marker, with or without a language tag.
pub fn strip_code_fences(text: &str) -> String {
    CODE_FENCE.replace_all(text.trim(), "").trim().to_string()
}

/// Locate the span from the first `{` to the last `}`.
pub fn extract_json_span(text: &str) -> Option<&str> {
    JSON_SPAN.find(text).map(|m| m.as_str())
}

/// Decode the JSON object embedded in raw model output.
///
/// `truncated` reports whether the upstream API flagged the output as cut
/// short; it only changes the error messages.
pub fn parse_model_json(text: &str, truncated: bool) -> Result<Value, ParseError> {
    let cleaned = strip_code_fences(text);

    let span = extract_json_span(&cleaned).ok_or(ParseError::NoJsonObject { truncated })?;

    serde_json::from_str(span).map_err(|source| ParseError::MalformedJson { truncated, source })
}

/// Decode model output straight into a typed shape.
pub fn parse_model_output<T: DeserializeOwned>(text: &str, truncated: bool) -> Result<T, ParseError> {
    let value = parse_model_json(text, truncated)?;

    serde_json::from_value(value).map_err(|e| ParseError::UnexpectedShape {
        truncated,
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linkedin_analysis::types::{EmailMessage, TextMessage};
    use serde_json::json;

    #[test]
    fn test_plain_object() {
        let value = parse_model_json(r#"{"message": "hi"}"#, false).unwrap();
        assert_eq!(value, json!({"message": "hi"}));
    }

    #[test]
    fn test_fenced_object_matches_unfenced() {
        let unfenced = r#"{"subject": "Hello", "body": "Line one"}"#;
        let fenced = format!("```json\n{}\n```", unfenced);
        let bare_fence = format!("```\n{}\n```\n", unfenced);

        let expected = parse_model_json(unfenced, false).unwrap();
        assert_eq!(parse_model_json(&fenced, false).unwrap(), expected);
        assert_eq!(parse_model_json(&bare_fence, false).unwrap(), expected);
    }

    #[test]
    fn test_surrounding_prose_is_ignored() {
        let text = "Here is the analysis you asked for:\n{\"message\": \"Hi {name}\"}\nHope it helps!";
        let msg: TextMessage = parse_model_output(text, false).unwrap();
        assert_eq!(msg.message, "Hi {name}");
    }

    #[test]
    fn test_greedy_span_covers_nested_objects() {
        let text = r#"{"subject": "s", "body": "b", "meta": {"tone": "warm"}}"#;
        let msg: EmailMessage = parse_model_output(text, false).unwrap();
        assert_eq!(msg.subject, "s");
        assert_eq!(msg.body, "b");
    }

    #[test]
    fn test_no_object_fails_explicitly() {
        let err = parse_model_json("I cannot help with that.", false).unwrap_err();
        assert!(matches!(err, ParseError::NoJsonObject { truncated: false }));
        assert!(err.to_string().contains("Could not parse AI response as JSON"));
        assert_eq!(err.error_code(), "AI_RESPONSE_NOT_JSON");
    }

    #[test]
    fn test_malformed_object_fails() {
        let err = parse_model_json("```json\n{\"message\": \"unterminated}\n```", false).unwrap_err();
        assert!(matches!(err, ParseError::MalformedJson { .. }));
        assert!(!err.to_string().contains("truncated"));
    }

    #[test]
    fn test_truncation_is_reported() {
        let err = parse_model_json("```json\n{\"dominance\": 35, \"influ", true).unwrap_err();
        assert!(err.truncated());
        assert!(err.to_string().contains("truncated"));
        assert_eq!(err.error_code(), "AI_RESPONSE_TRUNCATED");
    }

    #[test]
    fn test_wrong_shape_is_reported() {
        let err = parse_model_output::<EmailMessage>(r#"{"message": "hi"}"#, false).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedShape { .. }));
        assert!(err.to_string().contains("subject"));
    }
}
