//! Structural validation of option structs, run before any SQL is built.

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid object identifier")]
    InvalidObjectIdentifier,
    #[error("exactly one of {structure} fields {fields:?} must be set")]
    ExactlyOneOf {
        structure: &'static str,
        fields: Vec<&'static str>,
    },
    #[error("at least one of {structure} fields {fields:?} must be set")]
    AtLeastOneOf {
        structure: &'static str,
        fields: Vec<&'static str>,
    },
    #[error("{structure}.{field} is invalid: {reason}")]
    InvalidValue {
        structure: &'static str,
        field: &'static str,
        reason: String,
    },
}

/// Every violation found in one option struct.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// Merge the result of a nested validation.
    pub fn extend_from(&mut self, result: Result<(), ValidationErrors>) {
        if let Err(nested) = result {
            self.0.extend(nested.0);
        }
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn contains(&self, error: &ValidationError) -> bool {
        self.0.contains(error)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self(vec![error])
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", e)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Implemented by every option struct and Set/Unset fragment.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Exactly one of the given presence flags is true.
pub fn exactly_one_value_set(set: &[bool]) -> bool {
    set.iter().filter(|v| **v).count() == 1
}

/// At least one of the given presence flags is true.
pub fn any_value_set(set: &[bool]) -> bool {
    set.iter().any(|v| *v)
}

pub fn err_exactly_one_of(structure: &'static str, fields: &[&'static str]) -> ValidationError {
    ValidationError::ExactlyOneOf {
        structure,
        fields: fields.to_vec(),
    }
}

pub fn err_at_least_one_of(structure: &'static str, fields: &[&'static str]) -> ValidationError {
    ValidationError::AtLeastOneOf {
        structure,
        fields: fields.to_vec(),
    }
}

/// Validate an identifier, recording [`ValidationError::InvalidObjectIdentifier`] when malformed.
pub fn check_identifier<I: crate::sdk::ObjectIdentifier>(errors: &mut ValidationErrors, id: &I) {
    if !id.is_valid() {
        errors.push(ValidationError::InvalidObjectIdentifier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one() {
        assert!(exactly_one_value_set(&[false, true, false]));
        assert!(!exactly_one_value_set(&[false, false]));
        assert!(!exactly_one_value_set(&[true, true]));
    }

    #[test]
    fn errors_accumulate_and_join() {
        let mut errs = ValidationErrors::new();
        errs.push(ValidationError::InvalidObjectIdentifier);
        errs.extend_from(Err(err_at_least_one_of("Set", &["A", "B"]).into()));
        let err = errs.into_result().unwrap_err();
        assert_eq!(err.errors().len(), 2);
        assert_eq!(
            err.to_string(),
            "invalid object identifier\nat least one of Set fields [\"A\", \"B\"] must be set"
        );
    }
}
