//! Locates a keyed JSON object inside a larger non-JSON body (an RSC stream).
//!
//! This is a textual scanner, not a JSON tokenizer: braces inside string
//! literals are counted like any other brace. The upstream payload under the
//! scanned key does not contain unbalanced braces in strings, so the count
//! holds for it. Swap in a real streaming JSON reader if that changes.

use crate::error::ExtractionError;

/// Returns the balanced `{ ... }` substring that follows the first `"key"`
/// occurrence in `text`.
///
/// The scan goes: first quoted key, then the next `:`, then the next `{`,
/// then forward until brace depth returns to zero.
pub fn extract_json_object<'a>(text: &'a str, key: &str) -> Result<&'a str, ExtractionError> {
    let needle = format!("\"{key}\"");
    let key_pos = text
        .find(&needle)
        .ok_or_else(|| ExtractionError::KeyNotFound(key.to_string()))?;

    let colon_pos = text[key_pos..]
        .find(':')
        .map(|off| key_pos + off)
        .ok_or_else(|| ExtractionError::MissingColon(key.to_string()))?;

    let start = text[colon_pos..]
        .find('{')
        .map(|off| colon_pos + off)
        .ok_or_else(|| ExtractionError::MissingBrace(key.to_string()))?;

    // Braces are ASCII, so byte offsets are always char boundaries here.
    let mut depth: usize = 0;
    for (i, b) in text.as_bytes()[start..].iter().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&text[start..=start + i]);
                }
            }
            _ => {}
        }
    }

    Err(ExtractionError::Unterminated(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_nested_object_and_ignores_trailing_text() {
        let text = r#"0:["$","div",null]
1:{"props":{"stockDataSSR":{"seeds":[{"id":1,"meta":{"x":2}}]},"other":{}}} trailing }}}"#;
        let got = extract_json_object(text, "stockDataSSR").unwrap();
        assert_eq!(got, r#"{"seeds":[{"id":1,"meta":{"x":2}}]}"#);
    }

    #[test]
    fn skips_whitespace_and_non_brace_bytes_before_object() {
        let text = "\"k\" :   \n {\"a\":1} rest";
        assert_eq!(extract_json_object(text, "k").unwrap(), "{\"a\":1}");
    }

    #[test]
    fn handles_multibyte_text_around_payload() {
        let text = "héllo \"k\":{\"name\":\"Äpfel 🍎\"} wörld";
        assert_eq!(
            extract_json_object(text, "k").unwrap(),
            "{\"name\":\"Äpfel 🍎\"}"
        );
    }

    #[test]
    fn uses_first_occurrence_of_key() {
        let text = r#""k":{"n":1} "k":{"n":2}"#;
        assert_eq!(extract_json_object(text, "k").unwrap(), r#"{"n":1}"#);
    }

    #[test]
    fn missing_key() {
        let err = extract_json_object("{\"other\":{}}", "stockDataSSR").unwrap_err();
        assert_eq!(err, ExtractionError::KeyNotFound("stockDataSSR".into()));
        assert_eq!(err.to_string(), "stockDataSSR not found");
    }

    #[test]
    fn missing_colon_and_brace() {
        assert_eq!(
            extract_json_object("\"k\"", "k").unwrap_err(),
            ExtractionError::MissingColon("k".into())
        );
        assert_eq!(
            extract_json_object("\"k\": [1, 2]", "k").unwrap_err(),
            ExtractionError::MissingBrace("k".into())
        );
    }

    #[test]
    fn unterminated_object() {
        let err = extract_json_object(r#""k": {"a": {"b": 1}"#, "k").unwrap_err();
        assert_eq!(err, ExtractionError::Unterminated("k".into()));
    }

    #[test]
    fn brace_inside_string_literal_is_counted() {
        // Known limitation: the `{` inside the string keeps the depth above zero.
        let err = extract_json_object(r#""k": {"a": "{"}"#, "k").unwrap_err();
        assert_eq!(err, ExtractionError::Unterminated("k".into()));
    }
}
