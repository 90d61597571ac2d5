// Validation rules builder

use crate::ValidationError;

type ValidatorFn = Box<dyn Fn(&str, &str) -> Result<(), ValidationError> + Send + Sync>;

/// Composable validation rules for a single string field.
///
/// Every rule runs; failures accumulate rather than short-circuiting.
pub struct ValidationRules {
    validators: Vec<ValidatorFn>,
    field: String,
}

impl ValidationRules {
    /// Create a rule set for a field.
    pub fn for_field(field: impl Into<String>) -> Self {
        Self {
            validators: Vec::new(),
            field: field.into(),
        }
    }

    /// Add a validator function.
    #[allow(clippy::should_implement_trait)]
    pub fn add<F>(mut self, validator: F) -> Self
    where
        F: Fn(&str, &str) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.validators.push(Box::new(validator));
        self
    }

    /// The field this rule set validates.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Validate a value against every rule.
    pub fn validate(&self, value: &str) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for validator in &self.validators {
            if let Err(error) = validator(value, &self.field) {
                errors.push(error);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::{IsEmail, MinLength, NotEmpty};

    #[test]
    fn test_rules_pass() {
        let rules = ValidationRules::for_field("email")
            .add(|value, field| NotEmpty::validate(value, field))
            .add(|value, field| IsEmail::validate(value, field));

        assert!(rules.validate("ada@kudi.example").is_ok());
    }

    #[test]
    fn test_rules_collect_every_failure() {
        let rules = ValidationRules::for_field("email")
            .add(|value, field| NotEmpty::validate(value, field))
            .add(|value, field| IsEmail::validate(value, field));

        let errors = rules.validate("").unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_rules_report_field() {
        let rules = ValidationRules::for_field("first_name")
            .add(|value, field| MinLength(2).validate(value, field));

        let errors = rules.validate("a").unwrap_err();
        assert_eq!(errors[0].field, "first_name");
    }
}
