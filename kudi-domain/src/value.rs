//! Value types: ids, currency, money, account numbers

use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque customer identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(Uuid);

/// Opaque account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

/// Opaque transaction identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

macro_rules! entity_id {
    ($name:ident) => {
        impl $name {
            /// Generate a fresh id.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }
    };
}

entity_id!(CustomerId);
entity_id!(AccountId);
entity_id!(TransactionId);

/// Supported currencies (ISO 4217).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    NGN,
    USD,
    EUR,
    GBP,
    KES,
    GHS,
    ZAR,
    JPY,
}

impl Currency {
    /// Three-letter currency code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NGN => "NGN",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::KES => "KES",
            Self::GHS => "GHS",
            Self::ZAR => "ZAR",
            Self::JPY => "JPY",
        }
    }

    /// Display symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::NGN => "₦",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::KES => "KSh",
            Self::GHS => "₵",
            Self::ZAR => "R",
            Self::JPY => "¥",
        }
    }

    /// Minor-unit decimal places.
    pub fn decimals(&self) -> u32 {
        match self {
            Self::JPY => 0,
            _ => 2,
        }
    }

    /// Parse a three-letter code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "NGN" => Some(Self::NGN),
            "USD" => Some(Self::USD),
            "EUR" => Some(Self::EUR),
            "GBP" => Some(Self::GBP),
            "KES" => Some(Self::KES),
            "GHS" => Some(Self::GHS),
            "ZAR" => Some(Self::ZAR),
            "JPY" => Some(Self::JPY),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Money: an amount in minor units plus its currency.
///
/// Arithmetic is checked; mixing currencies yields `None`, never a panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the smallest currency unit (kobo, cents, ...)
    pub amount: i64,
    /// Currency
    pub currency: Currency,
}

impl Money {
    /// Create from an amount in minor units.
    pub fn new(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Zero in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self { amount: 0, currency }
    }

    /// Create from a decimal major-unit amount, rounding to minor units.
    pub fn from_decimal(amount: Decimal, currency: Currency) -> Self {
        let multiplier = Decimal::from(10i64.pow(currency.decimals()));
        let minor = (amount * multiplier).round().to_i64().unwrap_or(0);
        Self {
            amount: minor,
            currency,
        }
    }

    /// Major-unit decimal view.
    pub fn to_decimal(&self) -> Decimal {
        let divisor = Decimal::from(10i64.pow(self.currency.decimals()));
        Decimal::from(self.amount) / divisor
    }

    /// Checked addition; `None` on currency mismatch or overflow.
    pub fn checked_add(self, other: Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount.checked_add(other.amount).map(|amount| Money {
            amount,
            currency: self.currency,
        })
    }

    /// Checked subtraction; `None` on currency mismatch or overflow.
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount.checked_sub(other.amount).map(|amount| Money {
            amount,
            currency: self.currency,
        })
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    pub fn is_negative(&self) -> bool {
        self.amount < 0
    }

    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }

    /// Format for display, e.g. `₦1234.50`.
    pub fn format(&self) -> String {
        format!(
            "{}{:.prec$}",
            self.currency.symbol(),
            self.to_decimal(),
            prec = self.currency.decimals() as usize
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

/// A 10-digit account number; the first digit is never zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountNumber(String);

impl AccountNumber {
    pub const LENGTH: usize = 10;

    /// Parse and validate a candidate account number.
    pub fn parse(value: &str) -> Result<Self, AccountNumberError> {
        let value = value.trim();
        if value.len() != Self::LENGTH {
            return Err(AccountNumberError::WrongLength(value.len()));
        }
        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AccountNumberError::NonNumeric);
        }
        if value.starts_with('0') {
            return Err(AccountNumberError::LeadingZero);
        }
        Ok(Self(value.to_string()))
    }

    /// Generate a random candidate account number.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut digits = String::with_capacity(Self::LENGTH);
        digits.push(char::from(b'1' + rng.random_range(0..9u8)));
        for _ in 1..Self::LENGTH {
            digits.push(char::from(b'0' + rng.random_range(0..10u8)));
        }
        Self(digits)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account number parse failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountNumberError {
    #[error("account number must be exactly 10 digits, got {0} characters")]
    WrongLength(usize),

    #[error("account number must contain only digits")]
    NonNumeric,

    #[error("account number must not start with zero")]
    LeadingZero,
}
