// Validation errors

use std::fmt;

/// Validation failure for a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,

    /// Human-readable message
    pub message: String,

    /// Constraint that was violated
    pub constraint: String,

    /// Rejected value, when it is safe to echo back
    pub value: Option<String>,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            constraint: "custom".to_string(),
            value: None,
        }
    }

    /// Set the constraint name.
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = constraint.into();
        self
    }

    /// Set the rejected value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation failures for one request.
///
/// The pipeline reports every violation in one response, so the collection
/// keeps accumulating instead of stopping at the first failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Add a single violation.
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Fold a validator result into the collection.
    pub fn check(&mut self, result: Result<(), ValidationError>) {
        if let Err(error) = result {
            self.errors.push(error);
        }
    }

    /// Fold a rule-set result into the collection.
    pub fn check_all(&mut self, result: Result<(), Vec<ValidationError>>) {
        if let Err(mut errors) = result {
            self.errors.append(&mut errors);
        }
    }

    /// Violations recorded against one field.
    pub fn field_errors(&self, field: &str) -> Vec<&ValidationError> {
        self.errors.iter().filter(|e| e.field == field).collect()
    }

    /// `Ok` when empty, otherwise the collection itself.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// JSON view for API bindings.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "errors": self.errors.iter().map(|e| {
                serde_json::json!({
                    "field": e.field,
                    "message": e.message,
                    "constraint": e.constraint,
                    "value": e.value,
                })
            }).collect::<Vec<_>>()
        })
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.errors {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}", error)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_builder() {
        let error = ValidationError::new("email", "email must be a valid email")
            .with_constraint("isEmail")
            .with_value("nope");

        assert_eq!(error.field, "email");
        assert_eq!(error.constraint, "isEmail");
        assert_eq!(error.value.as_deref(), Some("nope"));
    }

    #[test]
    fn test_collection_accumulates() {
        let mut errors = ValidationErrors::new();
        errors.add(ValidationError::new("a", "first"));
        errors.add(ValidationError::new("b", "second"));

        assert_eq!(errors.len(), 2);
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_check_folds_results() {
        let mut errors = ValidationErrors::new();
        errors.check(Ok(()));
        errors.check(Err(ValidationError::new("x", "bad")));

        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_field_errors() {
        let mut errors = ValidationErrors::new();
        errors.add(ValidationError::new("email", "taken"));
        errors.add(ValidationError::new("email", "malformed"));
        errors.add(ValidationError::new("phone", "too short"));

        assert_eq!(errors.field_errors("email").len(), 2);
        assert_eq!(errors.field_errors("phone").len(), 1);
    }

    #[test]
    fn test_empty_is_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_to_json_shape() {
        let errors: ValidationErrors = ValidationError::new("bvn", "must be 11 digits")
            .with_constraint("exactDigits")
            .into();

        let json = errors.to_json();
        assert_eq!(json["errors"][0]["field"], "bvn");
        assert_eq!(json["errors"][0]["constraint"], "exactDigits");
    }
}
