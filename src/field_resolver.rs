//! Field lookup across the payload shapes Ortto is known to send.
//!
//! The same logical field can arrive as a top-level key, inside one of the
//! `fields`/`data`/`attributes` containers, or as an entry of a
//! `[{ "field": k, "value": v }]` descriptor array. [`FieldResolver`] probes
//! each [`PayloadShape`] in order and returns the first non-empty value.

use serde_json::{Map, Value};

use crate::webhook_models::ResolvedFields;

pub const COUNTRY_CODE_FIELD: &str = "str:cm:country-of-residence-code";
pub const PROMPT_FIELD: &str = "str:cm:prompt";
pub const CONTACT_ID_FIELD: &str = "contact_id";
pub const COUNTRY_NAME_FIELD: &str = "str:cm:country-of-residence";

/// A logical field and the keys it may appear under, highest priority first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub aliases: Vec<String>,
}

impl FieldSpec {
    pub fn new(name: &'static str, aliases: &[&str]) -> Self {
        Self {
            name,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Alias lists for every field the webhook extracts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAliases {
    pub country_code: FieldSpec,
    pub prompt: FieldSpec,
    pub contact_id: FieldSpec,
    pub email: FieldSpec,
}

impl Default for FieldAliases {
    fn default() -> Self {
        Self {
            country_code: FieldSpec::new(
                "country code",
                &[
                    COUNTRY_CODE_FIELD,
                    "country_of_residence_code",
                    "country_code",
                    "country",
                ],
            ),
            prompt: FieldSpec::new("prompt", &[PROMPT_FIELD, "prompt"]),
            contact_id: FieldSpec::new(
                "contact id",
                &[CONTACT_ID_FIELD, "contactId", "str:cm:contact-id"],
            ),
            email: FieldSpec::new("email", &["email", "str:cm:email-secondary", "str::email"]),
        }
    }
}

/// One place a field value can live inside a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadShape {
    /// `payload[key]`
    FlatMap,
    /// `payload.<path>[key]` for each container path, in order.
    NestedContainers(Vec<Vec<&'static str>>),
    /// `payload.<path>` is an array of `{field|key, value}` descriptors.
    DescriptorArray(Vec<&'static str>),
}

impl PayloadShape {
    pub fn lookup(&self, payload: &Map<String, Value>, key: &str) -> Option<String> {
        match self {
            PayloadShape::FlatMap => payload.get(key).and_then(normalize),
            PayloadShape::NestedContainers(paths) => paths
                .iter()
                .filter_map(|path| navigate(payload, path))
                .filter_map(Value::as_object)
                .find_map(|container| container.get(key).and_then(normalize)),
            PayloadShape::DescriptorArray(path) => navigate(payload, path)
                .and_then(Value::as_array)?
                .iter()
                .filter_map(Value::as_object)
                .filter(|descriptor| descriptor_key(descriptor) == Some(key))
                .find_map(|descriptor| descriptor.get("value").and_then(normalize)),
        }
    }

    /// Shapes in the order Ortto payloads are probed.
    pub fn default_order() -> Vec<PayloadShape> {
        vec![
            PayloadShape::FlatMap,
            PayloadShape::NestedContainers(vec![
                vec!["fields"],
                vec!["data"],
                vec!["data", "fields"],
                vec!["attributes"],
                vec!["attributes", "fields"],
            ]),
            PayloadShape::DescriptorArray(vec!["fields"]),
        ]
    }
}

/// `field` when it is a string, otherwise `key`.
fn descriptor_key(descriptor: &Map<String, Value>) -> Option<&str> {
    descriptor
        .get("field")
        .and_then(Value::as_str)
        .or_else(|| descriptor.get("key").and_then(Value::as_str))
}

fn navigate<'a>(payload: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    rest.iter()
        .try_fold(payload.get(*first)?, |value, segment| value.get(*segment))
}

/// Empty strings, `null` and non-scalar values count as absent.
fn normalize(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct FieldResolver {
    shapes: Vec<PayloadShape>,
    aliases: FieldAliases,
}

impl Default for FieldResolver {
    fn default() -> Self {
        Self::new(PayloadShape::default_order(), FieldAliases::default())
    }
}

impl FieldResolver {
    pub fn new(shapes: Vec<PayloadShape>, aliases: FieldAliases) -> Self {
        Self { shapes, aliases }
    }

    pub fn resolve(&self, payload: &Map<String, Value>, key: &str) -> Option<String> {
        self.shapes.iter().find_map(|shape| shape.lookup(payload, key))
    }

    pub fn resolve_any(&self, payload: &Map<String, Value>, spec: &FieldSpec) -> Option<String> {
        let (alias, value) = spec
            .aliases
            .iter()
            .find_map(|alias| self.resolve(payload, alias).map(|value| (alias, value)))?;
        tracing::trace!(field = spec.name, %alias, "Field resolved");
        Some(value)
    }

    pub fn extract(&self, payload: &Map<String, Value>) -> ResolvedFields {
        ResolvedFields {
            country_code: self.resolve_any(payload, &self.aliases.country_code),
            prompt: self.resolve_any(payload, &self.aliases.prompt),
            contact_id: self.resolve_any(payload, &self.aliases.contact_id),
            email: self.resolve_any(payload, &self.aliases.email),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("Expected object"),
        }
    }

    #[test]
    fn test_direct_key_wins_over_nested() {
        let resolver = FieldResolver::default();
        let payload = object(json!({
            "country_code": "US",
            "fields": {"country_code": "CA"}
        }));
        assert_eq!(resolver.resolve(&payload, "country_code"), Some("US".to_string()));
    }

    #[test]
    fn test_empty_direct_key_falls_through() {
        let resolver = FieldResolver::default();
        let payload = object(json!({
            "country_code": "",
            "data": {"country_code": "MX"}
        }));
        assert_eq!(resolver.resolve(&payload, "country_code"), Some("MX".to_string()));
    }

    #[test]
    fn test_nested_container_order() {
        let resolver = FieldResolver::default();
        let payload = object(json!({
            "data": {"fields": {"prompt": "from data.fields"}},
            "attributes": {"prompt": "from attributes"}
        }));
        assert_eq!(
            resolver.resolve(&payload, "prompt"),
            Some("from data.fields".to_string())
        );
    }

    #[test]
    fn test_attributes_fields_container() {
        let resolver = FieldResolver::default();
        let payload = object(json!({"attributes": {"fields": {"contactId": "abc"}}}));
        assert_eq!(resolver.resolve(&payload, "contactId"), Some("abc".to_string()));
    }

    #[test]
    fn test_descriptor_array_with_field_and_key() {
        let resolver = FieldResolver::default();
        let payload = object(json!({
            "fields": [
                {"field": "str:cm:prompt", "value": "Say it in French"},
                {"key": "country", "value": "JP"}
            ]
        }));
        assert_eq!(
            resolver.resolve(&payload, PROMPT_FIELD),
            Some("Say it in French".to_string())
        );
        assert_eq!(resolver.resolve(&payload, "country"), Some("JP".to_string()));
        assert_eq!(resolver.resolve(&payload, "email"), None);
    }

    #[test]
    fn test_blank_descriptor_falls_through_to_later_entry() {
        let resolver = FieldResolver::default();
        let payload = object(json!({
            "fields": [
                {"field": "country", "value": ""},
                {"field": "country", "value": null},
                {"field": "country", "value": "JP"}
            ]
        }));
        assert_eq!(resolver.resolve(&payload, "country"), Some("JP".to_string()));
    }

    #[test]
    fn test_descriptor_null_field_uses_key() {
        let resolver = FieldResolver::default();
        let payload = object(json!({
            "fields": [{"field": null, "key": "country", "value": "JP"}]
        }));
        assert_eq!(resolver.resolve(&payload, "country"), Some("JP".to_string()));
    }

    #[test]
    fn test_default_field_names() {
        let aliases = FieldAliases::default();
        assert_eq!(aliases.country_code.name, "country code");
        assert_eq!(aliases.contact_id.name, "contact id");
        assert_eq!(aliases.country_code.aliases[0], COUNTRY_CODE_FIELD);
    }

    #[test]
    fn test_numeric_values_become_strings() {
        let resolver = FieldResolver::default();
        let payload = object(json!({"contact_id": 42}));
        assert_eq!(resolver.extract(&payload).contact_id, Some("42".to_string()));
    }

    #[test]
    fn test_null_blank_and_objects_are_absent() {
        let resolver = FieldResolver::default();
        let payload = object(json!({
            "str:cm:country-of-residence-code": null,
            "country_of_residence_code": "   ",
            "country_code": {"value": "US"},
            "country": true
        }));
        assert_eq!(resolver.extract(&payload).country_code, None);
    }

    #[test]
    fn test_alias_priority() {
        let resolver = FieldResolver::default();
        let payload = object(json!({
            "country": "ES",
            "fields": {"str:cm:country-of-residence-code": "PT"}
        }));
        // Higher priority alias found in a nested container beats a lower alias at top level
        assert_eq!(resolver.extract(&payload).country_code, Some("PT".to_string()));
    }

    #[test]
    fn test_extract_all_fields() {
        let resolver = FieldResolver::default();
        let payload = object(json!({
            "str:cm:country-of-residence-code": "IT",
            "prompt": "Official English name",
            "str:cm:contact-id": "c-9",
            "str::email": "ana@example.com"
        }));
        let fields = resolver.extract(&payload);
        assert_eq!(fields.country_code.as_deref(), Some("IT"));
        assert_eq!(fields.prompt.as_deref(), Some("Official English name"));
        assert_eq!(fields.contact_id.as_deref(), Some("c-9"));
        assert_eq!(fields.email.as_deref(), Some("ana@example.com"));
    }

    #[test]
    fn test_custom_aliases_injected() {
        let aliases = FieldAliases {
            country_code: FieldSpec::new("country code", &["iso"]),
            ..FieldAliases::default()
        };
        let resolver = FieldResolver::new(PayloadShape::default_order(), aliases);
        let payload = object(json!({"iso": "NZ", "country_code": "AU"}));
        assert_eq!(resolver.extract(&payload).country_code, Some("NZ".to_string()));
    }
}
