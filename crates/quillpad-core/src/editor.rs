//! Plain-text extraction from rich-editor document trees.
//!
//! The editor persists documents as a nested JSON tree. Summarization only
//! needs the flat text, extracted by a depth-first walk:
//!
//! - a string node contributes itself
//! - an array contributes the space-joined contributions of its elements
//! - an object with a `content` field contributes the result of recursing
//!   into that field
//! - an object with a `text` field (and no `content`) contributes that field
//! - any other node contributes the empty string

use serde_json::Value;

/// Extract the flat text of an editor document tree.
pub fn extract_text(node: &Value) -> String {
    match node {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(extract_text)
            .collect::<Vec<_>>()
            .join(" "),
        Value::Object(map) => {
            if let Some(content) = map.get("content") {
                extract_text(content)
            } else if let Some(Value::String(text)) = map.get("text") {
                text.clone()
            } else {
                String::new()
            }
        }
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_string_is_returned_unchanged() {
        let node = json!("already flat text");
        assert_eq!(extract_text(&node), "already flat text");
    }

    #[test]
    fn test_nested_structure_joins_with_single_space() {
        let node = json!({"content": [{"text": "a"}, {"content": [{"text": "b"}]}]});
        assert_eq!(extract_text(&node), "a b");
    }

    #[test]
    fn test_object_with_text_field() {
        let node = json!({"text": "hello"});
        assert_eq!(extract_text(&node), "hello");
    }

    #[test]
    fn test_content_takes_precedence_over_text() {
        let node = json!({"text": "ignored", "content": [{"text": "kept"}]});
        assert_eq!(extract_text(&node), "kept");
    }

    #[test]
    fn test_array_of_strings() {
        let node = json!(["one", "two", "three"]);
        assert_eq!(extract_text(&node), "one two three");
    }

    #[test]
    fn test_scalar_nodes_contribute_nothing() {
        assert_eq!(extract_text(&json!(42)), "");
        assert_eq!(extract_text(&json!(true)), "");
        assert_eq!(extract_text(&json!(null)), "");
    }

    #[test]
    fn test_object_without_content_or_text() {
        let node = json!({"type": "horizontalRule"});
        assert_eq!(extract_text(&node), "");
    }

    #[test]
    fn test_deeply_nested_document() {
        // Shape produced by the editor for a heading plus two paragraphs.
        let node = json!({
            "type": "doc",
            "content": [
                {"type": "heading", "content": [{"type": "text", "text": "Trip Plan"}]},
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "Pack"},
                    {"type": "text", "text": "light"}
                ]},
                {"type": "paragraph", "content": [{"type": "text", "text": "Book flights"}]}
            ]
        });
        assert_eq!(extract_text(&node), "Trip Plan Pack light Book flights");
    }

    #[test]
    fn test_empty_array() {
        assert_eq!(extract_text(&json!([])), "");
    }

    #[test]
    fn test_non_string_text_field_is_ignored() {
        let node = json!({"text": 5});
        assert_eq!(extract_text(&node), "");
    }
}
