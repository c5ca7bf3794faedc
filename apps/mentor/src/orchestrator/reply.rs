use serde_json::Value;

use crate::extract;
use crate::orchestrator::prompts::FALLBACK_REPLY;

/// Places a chat reply may live in, by backend variant, most specific first.
const REPLY_PATHS: &[&str] = &[
    "/response",
    "/reply",
    "/message",
    "/data/response",
    "/data/reply",
    "/data/message",
    "/answer",
    "/text",
    "/content",
    "/output",
];

/// Locates the assistant reply text in a `/chat` response.
pub fn extract_reply(response: &Value) -> String {
    if let Value::String(text) = response {
        if !text.trim().is_empty() {
            return text.clone();
        }
    }

    extract::first_str(response, REPLY_PATHS)
        .unwrap_or(FALLBACK_REPLY)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_top_level_response_wins() {
        let value = json!({ "response": "first", "data": { "reply": "second" } });
        assert_eq!(extract_reply(&value), "first");
    }

    #[test]
    fn test_nested_data_paths() {
        assert_eq!(extract_reply(&json!({ "data": { "message": "nested" } })), "nested");
        assert_eq!(extract_reply(&json!({ "output": "last resort" })), "last resort");
    }

    #[test]
    fn test_non_string_and_blank_candidates_are_skipped() {
        let value = json!({ "response": { "id": 1 }, "reply": "  ", "answer": "kept" });
        assert_eq!(extract_reply(&value), "kept");
    }

    #[test]
    fn test_bare_string_body() {
        assert_eq!(extract_reply(&json!("plain text")), "plain text");
    }

    #[test]
    fn test_unknown_shape_falls_back() {
        assert_eq!(extract_reply(&json!({ "status": "ok" })), FALLBACK_REPLY);
        assert_eq!(extract_reply(&Value::Null), FALLBACK_REPLY);
    }
}
