//! # Field Validator
//!
//! Stateless field-level constraint checks invoked by every message setter and
//! by message-level validation. All functions are pure: no shared state, safe
//! for unlimited concurrent use.
//!
//! A [`FieldSpec`] bundles the constraints of one field (name, length bounds,
//! presence). Either bound may be left open.

use super::errors::{MessagingError, MessagingResult};
use std::fmt;

/// Declared constraints of a single message field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
    pub required: bool,
}

impl FieldSpec {
    /// Optional field with inclusive length bounds
    pub const fn new(name: &'static str, min_len: usize, max_len: usize) -> Self {
        Self {
            name,
            min_len: Some(min_len),
            max_len: Some(max_len),
            required: false,
        }
    }

    /// Optional field with exactly `len` characters
    pub const fn exact(name: &'static str, len: usize) -> Self {
        Self::new(name, len, len)
    }

    /// Optional field with a lower bound only
    pub const fn at_least(name: &'static str, min_len: usize) -> Self {
        Self {
            name,
            min_len: Some(min_len),
            max_len: None,
            required: false,
        }
    }

    /// Optional field without length constraints
    pub const fn unbounded(name: &'static str) -> Self {
        Self {
            name,
            min_len: None,
            max_len: None,
            required: false,
        }
    }

    /// Same constraints, but the field must be present
    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    /// Same constraints, presence not enforced
    pub const fn optional(self) -> Self {
        Self {
            required: false,
            ..self
        }
    }

    fn admits(&self, len: usize) -> bool {
        self.min_len.map_or(true, |min| len >= min) && self.max_len.map_or(true, |max| len <= max)
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min_len, self.max_len) {
            (Some(min), Some(max)) if min == max => write!(f, "expected length {}", min),
            (Some(min), Some(max)) => write!(f, "expected length between {} and {}", min, max),
            (Some(min), None) => write!(f, "expected length of at least {}", min),
            (None, Some(max)) => write!(f, "expected length of at most {}", max),
            (None, None) => write!(f, "any length"),
        }
    }
}

/// Values the validator can inspect
///
/// Only textual values are length-checked; structured values report no text
/// and skip the length rule.
pub trait FieldValue {
    fn as_text(&self) -> Option<&str> {
        None
    }
}

impl FieldValue for str {
    fn as_text(&self) -> Option<&str> {
        Some(self)
    }
}

impl FieldValue for String {
    fn as_text(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

impl<T> FieldValue for [T] {}

impl<T> FieldValue for Vec<T> {}

/// Check presence and length of a field value
pub fn validate_field<V: FieldValue + ?Sized>(
    msg_id: &str,
    value: Option<&V>,
    spec: &FieldSpec,
) -> MessagingResult<()> {
    let Some(value) = value else {
        if spec.required {
            return Err(MessagingError::missing_element(msg_id, spec.name));
        }
        return Ok(());
    };

    if let Some(text) = value.as_text() {
        if !spec.admits(text.chars().count()) {
            return Err(MessagingError::invalid_value(msg_id, spec.name, text, spec));
        }
    }
    Ok(())
}

/// [`validate_field`] plus the value must be an unsigned integer
pub fn validate_digit_field(msg_id: &str, value: Option<&str>, spec: &FieldSpec) -> MessagingResult<()> {
    validate_field(msg_id, value, spec)?;
    if let Some(text) = value {
        if !is_digits(text) {
            return Err(MessagingError::invalid_value(msg_id, spec.name, text, "expected digits only"));
        }
    }
    Ok(())
}

/// [`validate_field`] plus the value must be one of `allowed` (exact match)
pub fn validate_choice_field(
    msg_id: &str,
    value: Option<&str>,
    spec: &FieldSpec,
    allowed: &[&str],
) -> MessagingResult<()> {
    validate_field(msg_id, value, spec)?;
    if let Some(text) = value {
        if !allowed.contains(&text) {
            return Err(MessagingError::invalid_value(
                msg_id,
                spec.name,
                text,
                format!("expected one of {}", allowed.join("/")),
            ));
        }
    }
    Ok(())
}

/// Non-empty and ASCII digits only
pub fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::errors::ErrorCode;
    use proptest::prelude::*;

    const PAN: FieldSpec = FieldSpec::new("pan", 13, 19).required();
    const DESC: FieldSpec = FieldSpec::at_least("desc", 1);

    #[test]
    fn test_required_field_missing() {
        let err = validate_field::<str>("m1", None, &PAN).unwrap_err();
        assert_eq!(err.error_code, ErrorCode::RequiredElementMissing);
        assert_eq!(err.error_detail, "pan");
        assert!(validate_field::<str>("m1", None, &DESC).is_ok());
    }

    #[test]
    fn test_length_violation_reports_bounds_and_value() {
        let err = validate_field("m1", Some("411111111111"), &PAN).unwrap_err();
        assert_eq!(err.error_code, ErrorCode::InvalidFormat);
        assert!(err.error_detail.contains("between 13 and 19"));
        assert!(err.error_detail.contains("411111111111"));
    }

    #[test]
    fn test_structured_values_skip_length() {
        let empty: Vec<String> = Vec::new();
        let spec = FieldSpec::new("protocol", 1, 2).required();
        assert!(validate_field("m1", Some(&empty), &spec).is_ok());
    }

    #[test]
    fn test_digit_field() {
        assert!(validate_digit_field("m1", Some("4111111111111111"), &PAN).is_ok());
        let err = validate_digit_field("m1", Some("4111-1111-1111-1"), &PAN).unwrap_err();
        assert!(err.error_detail.contains("digits"));
    }

    #[test]
    fn test_choice_field() {
        let spec = FieldSpec::exact("enrolled", 1).required();
        assert!(validate_choice_field("m1", Some("Y"), &spec, &["Y", "N", "U"]).is_ok());
        assert!(validate_choice_field("m1", Some("X"), &spec, &["Y", "N", "U"]).is_err());
    }

    proptest! {
        #[test]
        fn prop_bounded_length_matches_range(value in "[a-z]{0,30}") {
            let spec = FieldSpec::new("field", 5, 20);
            let len = value.chars().count();
            let result = validate_field("m1", Some(value.as_str()), &spec);
            prop_assert_eq!(result.is_ok(), (5..=20).contains(&len));
        }

        #[test]
        fn prop_unbounded_accepts_everything(value in ".{0,64}") {
            let spec = FieldSpec::unbounded("field").required();
            prop_assert!(validate_field("m1", Some(value.as_str()), &spec).is_ok());
        }
    }
}
