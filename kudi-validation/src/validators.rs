// Built-in validators

use crate::ValidationError;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$").unwrap()
});

static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9]{7,15}$").unwrap());

static NUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

/// Validates that a string is not blank.
pub struct NotEmpty;

impl NotEmpty {
    pub fn validate(value: &str, field: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            Err(
                ValidationError::new(field, format!("{} should not be empty", field))
                    .with_constraint("notEmpty"),
            )
        } else {
            Ok(())
        }
    }
}

/// Validates minimum string length.
pub struct MinLength(pub usize);

impl MinLength {
    pub fn validate(&self, value: &str, field: &str) -> Result<(), ValidationError> {
        if value.len() < self.0 {
            Err(ValidationError::new(
                field,
                format!("{} must be at least {} characters", field, self.0),
            )
            .with_constraint("minLength")
            .with_value(value.to_string()))
        } else {
            Ok(())
        }
    }
}

/// Validates maximum string length.
pub struct MaxLength(pub usize);

impl MaxLength {
    pub fn validate(&self, value: &str, field: &str) -> Result<(), ValidationError> {
        if value.len() > self.0 {
            Err(ValidationError::new(
                field,
                format!("{} must be at most {} characters", field, self.0),
            )
            .with_constraint("maxLength")
            .with_value(value.to_string()))
        } else {
            Ok(())
        }
    }
}

/// Validates email format.
pub struct IsEmail;

impl IsEmail {
    pub fn validate(value: &str, field: &str) -> Result<(), ValidationError> {
        if EMAIL_REGEX.is_match(value) {
            Ok(())
        } else {
            Err(
                ValidationError::new(field, format!("{} must be a valid email", field))
                    .with_constraint("isEmail")
                    .with_value(value.to_string()),
            )
        }
    }
}

/// Validates a phone number: optional leading `+`, 7 to 15 digits.
pub struct IsPhone;

impl IsPhone {
    pub fn validate(value: &str, field: &str) -> Result<(), ValidationError> {
        if PHONE_REGEX.is_match(value) {
            Ok(())
        } else {
            Err(
                ValidationError::new(field, format!("{} must be a valid phone number", field))
                    .with_constraint("isPhone")
                    .with_value(value.to_string()),
            )
        }
    }
}

/// Validates numeric characters only.
pub struct IsNumeric;

impl IsNumeric {
    pub fn validate(value: &str, field: &str) -> Result<(), ValidationError> {
        if NUMERIC_REGEX.is_match(value) {
            Ok(())
        } else {
            Err(
                ValidationError::new(field, format!("{} must contain only digits", field))
                    .with_constraint("isNumeric")
                    .with_value(value.to_string()),
            )
        }
    }
}

/// Validates an exact count of digit characters (BVN, account numbers).
pub struct ExactDigits(pub usize);

impl ExactDigits {
    pub fn validate(&self, value: &str, field: &str) -> Result<(), ValidationError> {
        if value.len() == self.0 && NUMERIC_REGEX.is_match(value) {
            Ok(())
        } else {
            Err(ValidationError::new(
                field,
                format!("{} must be exactly {} digits", field, self.0),
            )
            .with_constraint("exactDigits")
            .with_value(value.to_string()))
        }
    }
}

/// Validates an integer within an inclusive range.
pub struct InRange(pub i64, pub i64);

impl InRange {
    pub fn validate(&self, value: i64, field: &str) -> Result<(), ValidationError> {
        if value >= self.0 && value <= self.1 {
            Ok(())
        } else {
            Err(ValidationError::new(
                field,
                format!("{} must be between {} and {}", field, self.0, self.1),
            )
            .with_constraint("inRange")
            .with_value(value.to_string()))
        }
    }
}

/// Validates a minimum age in whole years given a date of birth.
pub struct MinimumAge(pub u32);

impl MinimumAge {
    pub fn validate(&self, date_of_birth: NaiveDate, today: NaiveDate, field: &str) -> Result<(), ValidationError> {
        let mut age = today.years_since(date_of_birth).unwrap_or(0);
        if date_of_birth > today {
            age = 0;
        }
        if age >= self.0 {
            Ok(())
        } else {
            Err(ValidationError::new(
                field,
                format!("{} must correspond to an age of at least {} years", field, self.0),
            )
            .with_constraint("minimumAge")
            .with_value(date_of_birth.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_empty() {
        assert!(NotEmpty::validate("Ada", "first_name").is_ok());
        assert!(NotEmpty::validate("", "first_name").is_err());
        assert!(NotEmpty::validate("   ", "first_name").is_err());
    }

    #[test]
    fn test_is_email() {
        assert!(IsEmail::validate("ada@kudi.example", "email").is_ok());
        assert!(IsEmail::validate("ada.lovelace@bank.co.uk", "email").is_ok());
        assert!(IsEmail::validate("not-an-email", "email").is_err());
        assert!(IsEmail::validate("@missing-local.example", "email").is_err());
    }

    #[test]
    fn test_is_phone() {
        assert!(IsPhone::validate("+2348012345678", "phone").is_ok());
        assert!(IsPhone::validate("08012345678", "phone").is_ok());
        assert!(IsPhone::validate("12345", "phone").is_err());
        assert!(IsPhone::validate("phone-number", "phone").is_err());
    }

    #[test]
    fn test_exact_digits() {
        let bvn = ExactDigits(11);
        assert!(bvn.validate("22345678901", "bvn").is_ok());
        assert!(bvn.validate("2234567890", "bvn").is_err());
        assert!(bvn.validate("22345678abc", "bvn").is_err());
    }

    #[test]
    fn test_in_range() {
        let score = InRange(0, 1000);
        assert!(score.validate(640, "credit_score").is_ok());
        assert!(score.validate(0, "credit_score").is_ok());
        assert!(score.validate(1001, "credit_score").is_err());
        assert!(score.validate(-1, "credit_score").is_err());
    }

    #[test]
    fn test_minimum_age() {
        let adult = MinimumAge(18);
        let today = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();

        let of_age = NaiveDate::from_ymd_opt(2008, 8, 1).unwrap();
        assert!(adult.validate(of_age, today, "date_of_birth").is_ok());

        let one_day_short = NaiveDate::from_ymd_opt(2008, 8, 2).unwrap();
        assert!(adult.validate(one_day_short, today, "date_of_birth").is_err());

        let future = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        assert!(adult.validate(future, today, "date_of_birth").is_err());
    }

    #[test]
    fn test_length_bounds() {
        assert!(MinLength(2).validate("ab", "name").is_ok());
        assert!(MinLength(3).validate("ab", "name").is_err());
        assert!(MaxLength(5).validate("abcde", "name").is_ok());
        assert!(MaxLength(4).validate("abcde", "name").is_err());
    }
}
