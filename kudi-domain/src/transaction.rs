//! Transactions: append-only children of an account.

use crate::value::{AccountId, Money, TransactionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Transfer,
    TransferIn,
    TransferOut,
    InterestCredit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "Deposit",
            Self::Withdrawal => "Withdrawal",
            Self::Transfer => "Transfer",
            Self::TransferIn => "TransferIn",
            Self::TransferOut => "TransferOut",
            Self::InterestCredit => "InterestCredit",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Deposit" => Some(Self::Deposit),
            "Withdrawal" => Some(Self::Withdrawal),
            "Transfer" => Some(Self::Transfer),
            "TransferIn" => Some(Self::TransferIn),
            "TransferOut" => Some(Self::TransferOut),
            "InterestCredit" => Some(Self::InterestCredit),
            _ => None,
        }
    }

    /// Sign of the balance change this entry represents: `+1` for credits,
    /// `-1` for debits.
    pub fn direction(&self) -> i64 {
        match self {
            Self::Deposit | Self::TransferIn | Self::InterestCredit => 1,
            Self::Withdrawal | Self::Transfer | Self::TransferOut => -1,
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable ledger entry. Never mutated after creation except for the
/// soft-delete markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    account_id: AccountId,
    transaction_type: TransactionType,
    amount: Money,
    description: String,
    timestamp: DateTime<Utc>,
    reference: String,
    is_deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
    deleted_by: Option<String>,
}

impl Transaction {
    /// Create a ledger entry.
    ///
    /// An empty or blank `reference` is replaced with a generated one of the
    /// form `YYYYMMDDhhmmss-<first 8 of the id>`; a caller-provided reference
    /// is stored verbatim.
    pub fn new(
        account_id: AccountId,
        transaction_type: TransactionType,
        amount: Money,
        description: &str,
        timestamp: DateTime<Utc>,
        reference: &str,
    ) -> Self {
        Self::new_with_id(
            TransactionId::new(),
            account_id,
            transaction_type,
            amount,
            description,
            timestamp,
            reference,
        )
    }

    pub(crate) fn new_with_id(
        id: TransactionId,
        account_id: AccountId,
        transaction_type: TransactionType,
        amount: Money,
        description: &str,
        timestamp: DateTime<Utc>,
        reference: &str,
    ) -> Self {
        let reference = if reference.trim().is_empty() {
            Self::generate_reference(timestamp, id)
        } else {
            reference.to_string()
        };

        Self {
            id,
            account_id,
            transaction_type,
            amount,
            description: description.to_string(),
            timestamp,
            reference,
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
        }
    }

    /// Create an interest-credit entry with an `INT-YYYYMMDD-XXXXXXXX`
    /// reference. The caller is responsible for crediting the owning
    /// account's balance as well.
    pub fn interest_credit(
        account_id: AccountId,
        amount: Money,
        when: DateTime<Utc>,
        description: &str,
    ) -> Self {
        let id = TransactionId::new();
        let mut buffer = Uuid::encode_buffer();
        let hex = id.as_uuid().simple().encode_upper(&mut buffer);
        let reference = format!("INT-{}-{}", when.format("%Y%m%d"), &hex[..8]);

        Self {
            id,
            account_id,
            transaction_type: TransactionType::InterestCredit,
            amount,
            description: description.to_string(),
            timestamp: when,
            reference,
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
        }
    }

    fn generate_reference(timestamp: DateTime<Utc>, id: TransactionId) -> String {
        let mut buffer = Uuid::encode_buffer();
        let hex = id.as_uuid().simple().encode_lower(&mut buffer);
        format!("{}-{}", timestamp.format("%Y%m%d%H%M%S"), &hex[..8])
    }

    /// Reconstruct a persisted entry. Used by the repositories.
    #[allow(clippy::too_many_arguments)]
    pub fn rehydrate(
        id: TransactionId,
        account_id: AccountId,
        transaction_type: TransactionType,
        amount: Money,
        description: String,
        timestamp: DateTime<Utc>,
        reference: String,
        is_deleted: bool,
        deleted_at: Option<DateTime<Utc>>,
        deleted_by: Option<String>,
    ) -> Self {
        Self {
            id,
            account_id,
            transaction_type,
            amount,
            description,
            timestamp,
            reference,
            is_deleted,
            deleted_at,
            deleted_by,
        }
    }

    /// Soft-delete this entry. The row remains; reads filter it out.
    pub fn soft_delete(&mut self, actor: &str, now: DateTime<Utc>) {
        self.is_deleted = true;
        self.deleted_at = Some(now);
        self.deleted_by = Some(actor.to_string());
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    pub fn deleted_by(&self) -> Option<&str> {
        self.deleted_by.as_deref()
    }

    /// Signed minor-unit balance effect of this entry.
    pub fn signed_amount(&self) -> i64 {
        self.transaction_type.direction() * self.amount.amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Currency;
    use chrono::TimeZone;

    fn naira(amount: i64) -> Money {
        Money::new(amount, Currency::NGN)
    }

    #[test]
    fn test_generated_reference_format() {
        let when = Utc.with_ymd_and_hms(2026, 8, 1, 14, 30, 5).unwrap();
        let txn = Transaction::new(
            AccountId::new(),
            TransactionType::Deposit,
            naira(5_000),
            "cash deposit",
            when,
            "",
        );

        let reference = txn.reference();
        assert!(reference.starts_with("20260801143005-"));
        let suffix = &reference["20260801143005-".len()..];
        assert_eq!(suffix.len(), 8);
        assert!(suffix.bytes().all(|b| b.is_ascii_hexdigit()));
        assert!(reference.contains(&txn.id().as_uuid().simple().to_string()[..8]));
    }

    #[test]
    fn test_caller_reference_is_stored_verbatim() {
        let txn = Transaction::new(
            AccountId::new(),
            TransactionType::TransferOut,
            naira(100),
            "transfer",
            Utc::now(),
            "R1",
        );
        assert_eq!(txn.reference(), "R1");
    }

    #[test]
    fn test_blank_reference_is_generated() {
        let txn = Transaction::new(
            AccountId::new(),
            TransactionType::Deposit,
            naira(100),
            "x",
            Utc::now(),
            "   ",
        );
        assert_ne!(txn.reference().trim(), "");
        assert!(txn.reference().contains('-'));
    }

    #[test]
    fn test_interest_credit_reference_format() {
        let when = Utc.with_ymd_and_hms(2026, 7, 31, 0, 0, 0).unwrap();
        let txn =
            Transaction::interest_credit(AccountId::new(), naira(1_479), when, "monthly interest");

        let reference = txn.reference();
        assert!(reference.starts_with("INT-20260731-"));
        let suffix = &reference["INT-20260731-".len()..];
        assert_eq!(suffix.len(), 8);
        assert!(suffix
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b)));
        assert_eq!(txn.transaction_type(), TransactionType::InterestCredit);
    }

    #[test]
    fn test_constructor_stores_every_input() {
        let account_id = AccountId::new();
        let when = Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap();
        let txn = Transaction::new(
            account_id,
            TransactionType::Withdrawal,
            naira(2_000),
            "atm withdrawal",
            when,
            "ATM-552",
        );

        assert_eq!(txn.account_id(), account_id);
        assert_eq!(txn.transaction_type(), TransactionType::Withdrawal);
        assert_eq!(txn.amount(), naira(2_000));
        assert_eq!(txn.description(), "atm withdrawal");
        assert_eq!(txn.timestamp(), when);
        assert_eq!(txn.reference(), "ATM-552");
        assert!(!txn.is_deleted());
    }

    #[test]
    fn test_soft_delete_marks_trio() {
        let mut txn = Transaction::new(
            AccountId::new(),
            TransactionType::Deposit,
            naira(100),
            "x",
            Utc::now(),
            "",
        );
        let now = Utc::now();
        txn.soft_delete("ops@kudi", now);

        assert!(txn.is_deleted());
        assert_eq!(txn.deleted_at(), Some(now));
        assert_eq!(txn.deleted_by(), Some("ops@kudi"));
    }

    #[test]
    fn test_signed_amounts() {
        let account = AccountId::new();
        let credit = Transaction::new(
            account,
            TransactionType::Deposit,
            naira(500),
            "",
            Utc::now(),
            "",
        );
        let debit = Transaction::new(
            account,
            TransactionType::TransferOut,
            naira(200),
            "",
            Utc::now(),
            "",
        );

        assert_eq!(credit.signed_amount(), 500);
        assert_eq!(debit.signed_amount(), -200);
    }
}
