//! Inbound body decoding.
//!
//! Ortto posts JSON most of the time, but test deliveries and some proxies send
//! URL-encoded forms or nothing at all. Decoding never fails the request: an
//! unusable body is reported as [`DecodeOutcome::Empty`] or
//! [`DecodeOutcome::Malformed`] and the handler treats both as a connectivity test.

use axum::body::Bytes;
use serde_json::{Map, Value};

/// Body of one inbound request, in whatever form the caller had it.
#[derive(Debug, Clone)]
pub enum RawBody {
    Absent,
    Bytes(Bytes),
    Text(String),
    /// Already decoded by an upstream layer.
    Structured(Value),
}

/// Result of decoding a [`RawBody`].
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    Decoded(Map<String, Value>),
    Empty,
    Malformed(String),
}

impl DecodeOutcome {
    pub fn into_payload(self) -> Option<Map<String, Value>> {
        match self {
            DecodeOutcome::Decoded(map) => Some(map),
            _ => None,
        }
    }
}

pub fn decode_body(raw: RawBody) -> DecodeOutcome {
    match raw {
        RawBody::Absent => DecodeOutcome::Empty,
        RawBody::Structured(Value::Object(map)) => DecodeOutcome::Decoded(map),
        RawBody::Structured(Value::Null) => DecodeOutcome::Empty,
        RawBody::Structured(other) => {
            DecodeOutcome::Malformed(format!("expected an object, got {}", kind_of(&other)))
        }
        RawBody::Bytes(bytes) => match std::str::from_utf8(&bytes) {
            Ok(text) => decode_text(text),
            Err(e) => DecodeOutcome::Malformed(format!("body is not valid UTF-8: {}", e)),
        },
        RawBody::Text(text) => decode_text(&text),
    }
}

fn decode_text(text: &str) -> DecodeOutcome {
    let text = text.trim();
    if text.is_empty() {
        return DecodeOutcome::Empty;
    }

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => return DecodeOutcome::Decoded(map),
        Ok(other) => {
            return DecodeOutcome::Malformed(format!(
                "expected a JSON object, got {}",
                kind_of(&other)
            ))
        }
        // Looked like JSON but wasn't; a form would never start this way
        Err(e) if text.starts_with('{') || text.starts_with('[') => {
            return DecodeOutcome::Malformed(format!("invalid JSON: {}", e))
        }
        Err(_) => {}
    }

    match decode_form(text) {
        Some(map) => DecodeOutcome::Decoded(map),
        None => DecodeOutcome::Malformed("body is neither JSON nor a URL-encoded form".to_string()),
    }
}

/// Parses `key=value&key=value` into a flat mapping of strings.
///
/// A form carrying a single JSON object under `payload` (the Slack-style
/// envelope) decodes to that embedded object instead.
fn decode_form(text: &str) -> Option<Map<String, Value>> {
    if !text.contains('=') {
        return None;
    }

    let mut map = Map::new();
    for (key, value) in url::form_urlencoded::parse(text.as_bytes()) {
        if key.trim().is_empty() {
            continue;
        }
        map.insert(key.into_owned(), Value::String(value.into_owned()));
    }

    if map.is_empty() {
        return None;
    }

    if map.len() == 1 {
        if let Some(Value::String(embedded)) = map.get("payload") {
            if let Ok(Value::Object(inner)) = serde_json::from_str::<Value>(embedded) {
                return Some(inner);
            }
        }
    }

    Some(map)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decoded(outcome: DecodeOutcome) -> Map<String, Value> {
        match outcome {
            DecodeOutcome::Decoded(map) => map,
            other => panic!("Expected decoded payload, got {:?}", other),
        }
    }

    #[test]
    fn test_absent_body_is_empty() {
        assert_eq!(decode_body(RawBody::Absent), DecodeOutcome::Empty);
    }

    #[test]
    fn test_whitespace_bytes_are_empty() {
        let outcome = decode_body(RawBody::Bytes(Bytes::from_static(b"  \n\t ")));
        assert_eq!(outcome, DecodeOutcome::Empty);
    }

    #[test]
    fn test_structured_object_passes_through() {
        let value = json!({"country_code": "US", "fields": {"prompt": "x"}});
        let map = decoded(decode_body(RawBody::Structured(value.clone())));
        assert_eq!(Value::Object(map), value);
    }

    #[test]
    fn test_structured_non_object_is_malformed() {
        let outcome = decode_body(RawBody::Structured(json!(["US"])));
        assert!(matches!(outcome, DecodeOutcome::Malformed(_)));
    }

    #[test]
    fn test_json_bytes_decoded() {
        let body = Bytes::from_static(br#" {"str:cm:country-of-residence-code": "FR"} "#);
        let map = decoded(decode_body(RawBody::Bytes(body)));
        assert_eq!(map["str:cm:country-of-residence-code"], json!("FR"));
    }

    #[test]
    fn test_form_text_decoded() {
        let map = decoded(decode_body(RawBody::Text(
            "country_code=DE&prompt=Official+name%21&contact_id=7".to_string(),
        )));
        assert_eq!(map["country_code"], json!("DE"));
        assert_eq!(map["prompt"], json!("Official name!"));
        assert_eq!(map["contact_id"], json!("7"));
    }

    #[test]
    fn test_form_payload_envelope_unwrapped() {
        let map = decoded(decode_body(RawBody::Text(
            "payload=%7B%22country%22%3A%22BR%22%7D".to_string(),
        )));
        assert_eq!(map["country"], json!("BR"));
    }

    #[test]
    fn test_broken_json_is_malformed() {
        let outcome = decode_body(RawBody::Text(r#"{"country_code": "US""#.to_string()));
        assert!(matches!(outcome, DecodeOutcome::Malformed(_)));
    }

    #[test]
    fn test_plain_text_is_malformed() {
        let outcome = decode_body(RawBody::Text("hello ortto".to_string()));
        assert!(matches!(outcome, DecodeOutcome::Malformed(_)));
    }

    #[test]
    fn test_json_scalar_is_malformed() {
        let outcome = decode_body(RawBody::Text("42".to_string()));
        assert!(matches!(outcome, DecodeOutcome::Malformed(_)));
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let outcome = decode_body(RawBody::Bytes(Bytes::from_static(&[0xff, 0xfe, 0x00])));
        assert!(matches!(outcome, DecodeOutcome::Malformed(_)));
    }
}
