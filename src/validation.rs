use crate::field_resolver::{CONTACT_ID_FIELD, COUNTRY_CODE_FIELD, PROMPT_FIELD};
use crate::webhook_models::{ResolvedFields, ValidatedFields};

/// Which fields a real (non-test) delivery must carry.
///
/// The country code is always required since it is the input of the lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequiredFields {
    pub require_prompt: bool,
    pub require_contact_id: bool,
}

impl RequiredFields {
    /// Canonical keys of the required fields, in reporting order.
    pub fn required_keys(&self) -> Vec<&'static str> {
        let mut keys = vec![COUNTRY_CODE_FIELD];
        if self.require_prompt {
            keys.push(PROMPT_FIELD);
        }
        if self.require_contact_id {
            keys.push(CONTACT_ID_FIELD);
        }
        keys
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFields {
    pub required: Vec<&'static str>,
    pub missing: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// No signal field at all: Ortto checking that the endpoint answers.
    EmptyTest,
    Missing(MissingFields),
    Valid(ValidatedFields),
}

pub fn classify(fields: ResolvedFields, policy: &RequiredFields) -> Classification {
    if fields.has_no_signal() {
        return Classification::EmptyTest;
    }

    let mut missing = Vec::new();
    if fields.country_code.is_none() {
        missing.push(COUNTRY_CODE_FIELD);
    }
    if policy.require_prompt && fields.prompt.is_none() {
        missing.push(PROMPT_FIELD);
    }
    if policy.require_contact_id && fields.contact_id.is_none() {
        missing.push(CONTACT_ID_FIELD);
    }

    match fields.country_code {
        Some(country_code) if missing.is_empty() => Classification::Valid(ValidatedFields {
            country_code,
            prompt: fields.prompt,
            contact_id: fields.contact_id,
            email: fields.email,
        }),
        _ => Classification::Missing(MissingFields {
            required: policy.required_keys(),
            missing,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(
        country: Option<&str>,
        prompt: Option<&str>,
        contact: Option<&str>,
    ) -> ResolvedFields {
        ResolvedFields {
            country_code: country.map(String::from),
            prompt: prompt.map(String::from),
            contact_id: contact.map(String::from),
            email: None,
        }
    }

    #[test]
    fn test_no_signal_is_empty_test() {
        let result = classify(ResolvedFields::default(), &RequiredFields::default());
        assert_eq!(result, Classification::EmptyTest);
    }

    #[test]
    fn test_country_code_alone_is_valid_by_default() {
        let result = classify(fields(Some("US"), None, None), &RequiredFields::default());
        match result {
            Classification::Valid(valid) => {
                assert_eq!(valid.country_code, "US");
                assert!(valid.prompt.is_none());
                assert!(valid.contact_id.is_none());
            }
            other => panic!("Expected valid, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_country_code_reported() {
        let result = classify(fields(None, Some("p"), None), &RequiredFields::default());
        assert_eq!(
            result,
            Classification::Missing(MissingFields {
                required: vec![COUNTRY_CODE_FIELD],
                missing: vec![COUNTRY_CODE_FIELD],
            })
        );
    }

    #[test]
    fn test_strict_policy_lists_missing_in_stable_order() {
        let policy = RequiredFields {
            require_prompt: true,
            require_contact_id: true,
        };
        let result = classify(fields(None, None, Some("42")), &policy);
        assert_eq!(
            result,
            Classification::Missing(MissingFields {
                required: vec![COUNTRY_CODE_FIELD, PROMPT_FIELD, CONTACT_ID_FIELD],
                missing: vec![COUNTRY_CODE_FIELD, PROMPT_FIELD],
            })
        );
    }

    #[test]
    fn test_strict_policy_satisfied() {
        let policy = RequiredFields {
            require_prompt: true,
            require_contact_id: true,
        };
        let result = classify(fields(Some("FR"), Some("p"), Some("42")), &policy);
        assert!(matches!(result, Classification::Valid(_)));
    }

    #[test]
    fn test_optional_fields_not_reported_missing() {
        let result = classify(fields(None, None, Some("42")), &RequiredFields::default());
        match result {
            Classification::Missing(missing) => {
                assert_eq!(missing.missing, vec![COUNTRY_CODE_FIELD]);
            }
            other => panic!("Expected missing fields, got {:?}", other),
        }
    }
}
