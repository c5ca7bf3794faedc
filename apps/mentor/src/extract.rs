//! Defensive lookups over loosely-shaped backend JSON.
//!
//! Backends disagree on where a value lives and how its key is spelled, so
//! callers pass an ordered list of JSON pointers and take the first hit.

use serde_json::Value;

/// Returns the first value found at any of `pointers` that carries content,
/// in order. Null and blank strings count as absent.
pub fn first_present<'a>(value: &'a Value, pointers: &[&str]) -> Option<&'a Value> {
    pointers
        .iter()
        .filter_map(|p| value.pointer(p))
        .find(|v| !is_blank(v))
}

/// Returns the first candidate that renders as a display scalar.
pub fn first_scalar(value: &Value, pointers: &[&str]) -> Option<String> {
    pointers
        .iter()
        .filter_map(|p| value.pointer(p))
        .find_map(display_scalar)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Returns the first non-blank string found at any of `pointers`, in order.
/// Values of other types at a candidate path are skipped.
pub fn first_str<'a>(value: &'a Value, pointers: &[&str]) -> Option<&'a str> {
    pointers
        .iter()
        .filter_map(|p| value.pointer(p))
        .filter_map(Value::as_str)
        .find(|s| !s.trim().is_empty())
}

/// Renders a scalar for display. Numbers and booleans become their text form;
/// blank strings, arrays, objects and null yield `None`.
pub fn display_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
/// Text before the opening fence and after the closing fence is dropped.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let (start, tag_len) = match (text.find("```json"), text.find("```")) {
        (Some(i), _) => (i, "```json".len()),
        (None, Some(i)) => (i, "```".len()),
        (None, None) => return text,
    };

    let body = &text[start + tag_len..];
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Parses JSON that may be wrapped in a markdown code fence.
pub fn parse_embedded_json(text: &str) -> Option<Value> {
    serde_json::from_str(strip_json_fences(text)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_with_surrounding_prose() {
        let input = "Here is the extraction:\n```json\n{\"a\": 1}\n```\nLet me know!";
        assert_eq!(strip_json_fences(input), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_json_fences_unterminated() {
        let input = "```json\n{\"a\": 1}";
        assert_eq!(strip_json_fences(input), "{\"a\": 1}");
    }

    #[test]
    fn test_parse_embedded_json_rejects_garbage() {
        assert!(parse_embedded_json("```json\nnot json\n```").is_none());
        assert_eq!(parse_embedded_json("[1,2]"), Some(json!([1, 2])));
    }

    #[test]
    fn test_first_present_respects_order_and_skips_null() {
        let value = json!({ "a": null, "b": { "c": 2 }, "d": 3 });
        assert_eq!(first_present(&value, &["/a", "/b/c", "/d"]), Some(&json!(2)));
        assert_eq!(first_present(&value, &["/missing"]), None);
    }

    #[test]
    fn test_first_present_skips_blank_strings() {
        let value = json!({ "Full Name": "  ", "full_name": "Alice" });
        assert_eq!(
            first_present(&value, &["/Full Name", "/full_name"]),
            Some(&json!("Alice"))
        );
    }

    #[test]
    fn test_first_scalar_skips_values_that_do_not_render() {
        let value = json!({ "a": "", "b": [], "c": 7 });
        assert_eq!(first_scalar(&value, &["/a", "/b", "/c"]), Some("7".to_string()));
        assert_eq!(first_scalar(&value, &["/a", "/b"]), None);
    }

    #[test]
    fn test_first_str_skips_non_strings_and_blanks() {
        let value = json!({ "message": { "nested": true }, "reply": "  ", "text": "hi" });
        assert_eq!(first_str(&value, &["/message", "/reply", "/text"]), Some("hi"));
    }

    #[test]
    fn test_pointer_keys_with_spaces() {
        let value = json!({ "Full Name": "Alice" });
        assert_eq!(first_str(&value, &["/full_name", "/Full Name"]), Some("Alice"));
    }

    #[test]
    fn test_display_scalar() {
        assert_eq!(display_scalar(&json!(1650)), Some("1650".to_string()));
        assert_eq!(display_scalar(&json!(" 4★ ")), Some("4★".to_string()));
        assert_eq!(display_scalar(&json!([])), None);
        assert_eq!(display_scalar(&Value::Null), None);
    }
}
