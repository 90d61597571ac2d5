//! Declarative validators registered per command in the composition root.

use crate::commands::{CreateAccount, CreateCustomer, DepositMoney, TransferMoney, WithdrawMoney};
use chrono::Utc;
use kudi_cqrs::RequestValidator;
use kudi_domain::Currency;
use kudi_validation::{
    ExactDigits, InRange, IsEmail, IsPhone, MinimumAge, NotEmpty, ValidationError, ValidationErrors,
};

/// Adult age required to open a customer record.
const MINIMUM_AGE_YEARS: u32 = 18;
/// Bank Verification Numbers are 11 digits.
const BVN_DIGITS: usize = 11;

/// Rules for [`CreateCustomer`].
pub struct CreateCustomerValidator;

impl RequestValidator<CreateCustomer> for CreateCustomerValidator {
    fn validate(&self, request: &CreateCustomer) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.check(NotEmpty::validate(&request.first_name, "first_name"));
        errors.check(NotEmpty::validate(&request.last_name, "last_name"));
        errors.check(IsEmail::validate(&request.email, "email"));
        errors.check(IsPhone::validate(&request.phone, "phone"));
        errors.check(NotEmpty::validate(&request.address, "address"));
        errors.check(ExactDigits(BVN_DIGITS).validate(&request.bvn, "bvn"));
        errors.check(InRange(0, 1000).validate(i64::from(request.credit_score), "credit_score"));
        errors.check(MinimumAge(MINIMUM_AGE_YEARS).validate(
            request.date_of_birth,
            Utc::now().date_naive(),
            "date_of_birth",
        ));

        errors.into_result()
    }
}

/// Rules for [`CreateAccount`].
pub struct CreateAccountValidator;

impl RequestValidator<CreateAccount> for CreateAccountValidator {
    fn validate(&self, request: &CreateAccount) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if Currency::from_code(&request.currency).is_none() {
            errors.add(
                ValidationError::new("currency", "currency must be a supported 3-letter code")
                    .with_constraint("isCurrency")
                    .with_value(request.currency.clone()),
            );
        }
        if request.initial_deposit < 0 {
            errors.add(
                ValidationError::new("initial_deposit", "initial deposit must not be negative")
                    .with_constraint("nonNegative")
                    .with_value(request.initial_deposit.to_string()),
            );
        }

        errors.into_result()
    }
}

/// Shared rules for the money-movement commands: a supported currency and a
/// strictly positive amount.
pub struct MoveMoneyRules;

impl MoveMoneyRules {
    fn check(amount: i64, currency: &str) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if Currency::from_code(currency).is_none() {
            errors.add(
                ValidationError::new("currency", "currency must be a supported 3-letter code")
                    .with_constraint("isCurrency")
                    .with_value(currency.to_string()),
            );
        }
        if amount <= 0 {
            errors.add(
                ValidationError::new("amount", "amount must be greater than zero")
                    .with_constraint("positive")
                    .with_value(amount.to_string()),
            );
        }

        errors.into_result()
    }
}

impl RequestValidator<TransferMoney> for MoveMoneyRules {
    fn validate(&self, request: &TransferMoney) -> Result<(), ValidationErrors> {
        let mut errors = match Self::check(request.amount, &request.currency) {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        if request.source_number == request.destination_number {
            errors.add(
                ValidationError::new(
                    "destination_number",
                    "source and destination accounts must differ",
                )
                .with_constraint("distinctAccounts"),
            );
        }
        errors.into_result()
    }
}

impl RequestValidator<DepositMoney> for MoveMoneyRules {
    fn validate(&self, request: &DepositMoney) -> Result<(), ValidationErrors> {
        Self::check(request.amount, &request.currency)
    }
}

impl RequestValidator<WithdrawMoney> for MoveMoneyRules {
    fn validate(&self, request: &WithdrawMoney) -> Result<(), ValidationErrors> {
        Self::check(request.amount, &request.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use kudi_domain::AccountType;
    use kudi_domain::CustomerId;

    fn valid_customer() -> CreateCustomer {
        CreateCustomer {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@kudi.example".into(),
            phone: "+2348012345678".into(),
            address: "12 Marina, Lagos".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 12, 10).unwrap(),
            bvn: "22345678901".into(),
            credit_score: 700,
            email_opt_in: true,
        }
    }

    #[test]
    fn test_valid_customer_passes() {
        assert!(CreateCustomerValidator.validate(&valid_customer()).is_ok());
    }

    #[test]
    fn test_underage_customer_rejected() {
        let mut command = valid_customer();
        command.date_of_birth = Utc::now().date_naive() - chrono::Duration::days(17 * 365);
        let errors = CreateCustomerValidator.validate(&command).unwrap_err();
        assert_eq!(errors.field_errors("date_of_birth").len(), 1);
    }

    #[test]
    fn test_every_violation_is_reported() {
        let command = CreateCustomer {
            first_name: "".into(),
            last_name: "".into(),
            email: "not-an-email".into(),
            phone: "nope".into(),
            address: "".into(),
            bvn: "123".into(),
            credit_score: -5,
            date_of_birth: Utc::now().date_naive(),
            email_opt_in: false,
        };
        let errors = CreateCustomerValidator.validate(&command).unwrap_err();
        // first_name, last_name, email, phone, address, bvn, credit_score, dob
        assert_eq!(errors.len(), 8);
    }

    #[test]
    fn test_create_account_rejects_unknown_currency() {
        let command = CreateAccount {
            customer_id: CustomerId::new(),
            account_type: AccountType::Savings,
            initial_deposit: 0,
            currency: "XXX".into(),
        };
        assert!(CreateAccountValidator.validate(&command).is_err());
    }

    #[test]
    fn test_create_account_rejects_negative_deposit() {
        let command = CreateAccount {
            customer_id: CustomerId::new(),
            account_type: AccountType::Checking,
            initial_deposit: -100,
            currency: "NGN".into(),
        };
        let errors = CreateAccountValidator.validate(&command).unwrap_err();
        assert_eq!(errors.field_errors("initial_deposit").len(), 1);
    }

    #[test]
    fn test_transfer_rejects_same_account() {
        let command = TransferMoney {
            source_number: "1234567890".into(),
            destination_number: "1234567890".into(),
            amount: 100,
            currency: "NGN".into(),
            reference: "".into(),
            description: "".into(),
        };
        let errors = MoveMoneyRules.validate(&command).unwrap_err();
        assert_eq!(errors.field_errors("destination_number").len(), 1);
    }

    #[test]
    fn test_withdraw_rejects_non_positive_amount() {
        let command = WithdrawMoney {
            account_number: "1234567890".into(),
            amount: 0,
            currency: "NGN".into(),
            description: "".into(),
        };
        assert!(MoveMoneyRules.validate(&command).is_err());
    }

    #[test]
    fn test_deposit_with_valid_input_passes() {
        let command = DepositMoney {
            account_number: "1234567890".into(),
            amount: 5_000,
            currency: "NGN".into(),
            description: "cash".into(),
        };
        assert!(MoveMoneyRules.validate(&command).is_ok());
    }
}
