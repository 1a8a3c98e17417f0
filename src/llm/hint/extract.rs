use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::models::{HintError, StructuredHint};
use super::permissive::parse_permissive;

lazy_static! {
    // First `{` up to the nearest `}`, across lines.
    static ref BRACE_BLOCK: Regex =
        Regex::new(r"(?s)\{.*?\}").expect("brace block pattern is valid");
}


pub fn first_brace_block(text: &str) -> Option<&str> {
    BRACE_BLOCK.find(text).map(|m| m.as_str())
}


/// Turns raw interpreter text into a hint.
///
/// Strict JSON is tried first with single quotes normalized to double
/// quotes, then the permissive grammar on the untouched block.
pub fn decode_hint(text: &str) -> Result<StructuredHint, HintError> {
    let block = first_brace_block(text).ok_or_else(|| HintError::UnstructuredResponse {
        raw: text.to_string(),
    })?;

    let decoded = match serde_json::from_str::<Value>(&block.replace('\'', "\"")) {
        Ok(value) => value,
        Err(strict_err) => {
            debug!("Strict decode failed ({}), trying permissive grammar", strict_err);
            parse_permissive(block).map_err(|e| {
                debug!("Permissive decode failed: {}", e);
                HintError::MalformedHint {
                    raw: block.to_string(),
                }
            })?
        }
    };

    match decoded {
        Value::Object(object) => Ok(StructuredHint::from_object(&object)),
        _ => Err(HintError::MalformedHint {
            raw: block.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_block_is_non_greedy() {
        let text = r#"Output: {"category":"fashion"} and later {"category":"tech"}"#;
        assert_eq!(first_brace_block(text), Some(r#"{"category":"fashion"}"#));
    }

    #[test]
    fn test_block_spans_lines() {
        let text = "Sure!\n{\n  \"category\": \"beauty\"\n}\nDone.";
        assert_eq!(first_brace_block(text), Some("{\n  \"category\": \"beauty\"\n}"));
    }

    #[test]
    fn test_decode_strict_json_with_noise() {
        let text = r#"Output: {"category":"fashion","follower_filter":">10000","sort_by":"engagement rate"}"#;
        let hint = decode_hint(text).unwrap();
        assert_eq!(hint.category.as_deref(), Some("fashion"));
        assert_eq!(hint.follower_filter.as_deref(), Some(">10000"));
        assert_eq!(hint.sort_by.as_deref(), Some("engagement rate"));
    }

    #[test]
    fn test_decode_single_quoted() {
        let hint = decode_hint("{'category': 'tech', 'follower_filter': '<5000'}").unwrap();
        assert_eq!(hint.category.as_deref(), Some("tech"));
        assert_eq!(hint.follower_filter.as_deref(), Some("<5000"));
        assert_eq!(hint.sort_by, None);
    }

    #[test]
    fn test_decode_falls_back_to_permissive() {
        let hint = decode_hint("{category: \"women's wear\", follower_filter: >500}").unwrap();
        assert_eq!(hint.category.as_deref(), Some("women's wear"));
        assert_eq!(hint.follower_filter.as_deref(), Some(">500"));
    }

    #[test]
    fn test_no_block_is_unstructured() {
        let err = decode_hint("I cannot help with that.").unwrap_err();
        assert_eq!(
            err,
            HintError::UnstructuredResponse {
                raw: "I cannot help with that.".to_string()
            }
        );
    }

    #[test]
    fn test_garbage_block_is_malformed() {
        let err = decode_hint("{ : : }").unwrap_err();
        assert!(matches!(err, HintError::MalformedHint { .. }));
    }

    #[test]
    fn test_deeply_nested_block_is_malformed() {
        let text = format!("{{a: {}}}", "[".repeat(10_000));
        let err = decode_hint(&text).unwrap_err();
        assert!(matches!(err, HintError::MalformedHint { .. }));
    }
}
