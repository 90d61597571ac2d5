//! Declarative input validation for Kudi commands and queries.
//!
//! Validation runs as a pipeline stage before any handler executes. Rules
//! never short-circuit: a failing request reports every violation at once.
//!
//! # Examples
//!
//! ```
//! use kudi_validation::{IsEmail, NotEmpty, ValidationRules};
//!
//! let rules = ValidationRules::for_field("email")
//!     .add(|value, field| NotEmpty::validate(value, field))
//!     .add(|value, field| IsEmail::validate(value, field));
//!
//! assert!(rules.validate("ada@kudi.example").is_ok());
//! assert!(rules.validate("not-an-email").is_err());
//! ```

pub mod errors;
pub mod rules;
pub mod validators;

pub use errors::{ValidationError, ValidationErrors};
pub use rules::ValidationRules;
pub use validators::{
    ExactDigits, InRange, IsEmail, IsNumeric, IsPhone, MaxLength, MinLength, MinimumAge, NotEmpty,
};
