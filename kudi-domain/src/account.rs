//! The account aggregate root.

use crate::error::BankError;
use crate::events::{AccountCreated, DomainEvent, InsufficientFunds, MoneyTransferred};
use crate::transaction::{Transaction, TransactionType};
use crate::value::{AccountId, AccountNumber, CustomerId, Money, TransactionId};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product type of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    Checking,
    Savings,
    FixedDeposit,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checking => "Checking",
            Self::Savings => "Savings",
            Self::FixedDeposit => "FixedDeposit",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Checking" => Some(Self::Checking),
            "Savings" => Some(Self::Savings),
            "FixedDeposit" => Some(Self::FixedDeposit),
            _ => None,
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountStatus {
    Active,
    Inactive,
    Closed,
    Suspended,
    Archived,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Closed => "Closed",
            Self::Suspended => "Suspended",
            Self::Archived => "Archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Active" => Some(Self::Active),
            "Inactive" => Some(Self::Inactive),
            "Closed" => Some(Self::Closed),
            "Suspended" => Some(Self::Suspended),
            "Archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// Outcome of a successful transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub transaction_id: TransactionId,
    pub reference: String,
    pub amount: Money,
}

/// The aggregate root of the write path.
///
/// Balance never goes below zero, the currency and account number never
/// change after opening, and all mutations go through the methods below.
/// Events queue in memory until the unit of work persists them.
#[derive(Debug, Clone)]
pub struct Account {
    id: AccountId,
    account_number: AccountNumber,
    customer_id: CustomerId,
    account_type: AccountType,
    balance: Money,
    date_opened: DateTime<Utc>,
    is_active: bool,
    is_deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
    deleted_by: Option<String>,
    row_version: Uuid,
    last_activity_at: DateTime<Utc>,
    status: AccountStatus,
    is_interest_bearing: bool,
    is_archived: bool,
    transactions: Vec<Transaction>,
    pending_events: Vec<DomainEvent>,
    pending_transactions: Vec<Transaction>,
}

impl Account {
    /// Savings accounts allow at most this many withdrawals per calendar
    /// month.
    pub const MONTHLY_WITHDRAWAL_LIMIT: u32 = 6;

    /// Open a new account.
    ///
    /// Requires a non-negative initial deposit. A positive initial deposit
    /// becomes the first ledger entry, so balance always equals the net of
    /// the account's transactions. Emits [`AccountCreated`].
    pub fn open(
        customer_id: CustomerId,
        account_number: AccountNumber,
        account_type: AccountType,
        initial_deposit: Money,
        now: DateTime<Utc>,
    ) -> Result<Self, BankError> {
        if initial_deposit.is_negative() {
            return Err(BankError::validation(
                "initial_deposit",
                "initial deposit must not be negative",
            ));
        }

        let mut account = Self {
            id: AccountId::new(),
            account_number,
            customer_id,
            account_type,
            balance: initial_deposit,
            date_opened: now,
            is_active: true,
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
            row_version: Uuid::new_v4(),
            last_activity_at: now,
            status: AccountStatus::Active,
            is_interest_bearing: matches!(
                account_type,
                AccountType::Savings | AccountType::FixedDeposit
            ),
            is_archived: false,
            transactions: Vec::new(),
            pending_events: Vec::new(),
            pending_transactions: Vec::new(),
        };

        if initial_deposit.is_positive() {
            let txn = Transaction::new(
                account.id,
                TransactionType::Deposit,
                initial_deposit,
                "Initial deposit",
                now,
                "",
            );
            account.transactions.push(txn.clone());
            account.pending_transactions.push(txn);
        }

        account
            .pending_events
            .push(DomainEvent::AccountCreated(AccountCreated::new(
                account.id,
                account.account_number.clone(),
                customer_id,
                account_type,
                initial_deposit,
                now,
            )));

        Ok(account)
    }

    /// Credit the account.
    pub fn deposit(
        &mut self,
        amount: Money,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<Transaction, BankError> {
        self.ensure_operational()?;
        self.ensure_positive(amount)?;
        self.ensure_same_currency(amount)?;

        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| BankError::Internal("balance overflow on deposit".into()))?;

        let txn = Transaction::new(
            self.id,
            TransactionType::Deposit,
            amount,
            description,
            now,
            "",
        );
        self.transactions.push(txn.clone());
        self.pending_transactions.push(txn.clone());
        self.last_activity_at = now;

        Ok(txn)
    }

    /// Debit the account.
    ///
    /// Savings accounts count this withdrawal together with the calendar
    /// month's earlier ones against [`Self::MONTHLY_WITHDRAWAL_LIMIT`]. A
    /// shortfall queues an [`InsufficientFunds`] event before failing.
    pub fn withdraw(
        &mut self,
        amount: Money,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<Transaction, BankError> {
        self.ensure_operational()?;
        self.ensure_positive(amount)?;
        self.ensure_same_currency(amount)?;

        if self.account_type == AccountType::Savings {
            let prior = self.withdrawals_in_month(now.year(), now.month());
            if prior + 1 > Self::MONTHLY_WITHDRAWAL_LIMIT {
                return Err(BankError::WithdrawalLimit {
                    account_number: self.account_number.clone(),
                    limit: Self::MONTHLY_WITHDRAWAL_LIMIT,
                });
            }
        }

        if self.balance.amount < amount.amount {
            self.pending_events
                .push(DomainEvent::InsufficientFunds(InsufficientFunds::new(
                    self.account_number.clone(),
                    amount,
                    self.balance,
                    "Withdraw",
                    now,
                )));
            return Err(BankError::InsufficientFunds {
                account_number: self.account_number.clone(),
                requested: amount,
                available: self.balance,
            });
        }

        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or_else(|| BankError::Internal("balance underflow on withdraw".into()))?;

        let txn = Transaction::new(
            self.id,
            TransactionType::Withdrawal,
            amount,
            description,
            now,
            "",
        );
        self.transactions.push(txn.clone());
        self.pending_transactions.push(txn.clone());
        self.last_activity_at = now;

        Ok(txn)
    }

    /// Move money to another account.
    ///
    /// The in-memory mutation is atomic: either both balances change and
    /// both child transactions exist, or nothing changed. Persistence
    /// atomicity belongs to the unit of work.
    pub fn transfer_to(
        &mut self,
        destination: &mut Account,
        amount: Money,
        reference: &str,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<TransferReceipt, BankError> {
        if self.id == destination.id {
            return Err(BankError::InvalidOperation(
                "transfer requires two distinct accounts".into(),
            ));
        }
        self.ensure_operational()?;
        destination.ensure_operational()?;
        self.ensure_positive(amount)?;
        self.ensure_same_currency(amount)?;
        if destination.balance.currency != amount.currency {
            return Err(BankError::validation(
                "currency",
                format!(
                    "destination account is denominated in {}",
                    destination.balance.currency
                ),
            ));
        }

        if self.balance.amount < amount.amount {
            self.pending_events
                .push(DomainEvent::InsufficientFunds(InsufficientFunds::new(
                    self.account_number.clone(),
                    amount,
                    self.balance,
                    "Transfer",
                    now,
                )));
            return Err(BankError::InsufficientFunds {
                account_number: self.account_number.clone(),
                requested: amount,
                available: self.balance,
            });
        }

        let transaction_id = TransactionId::new();
        let out_txn = Transaction::new_with_id(
            transaction_id,
            self.id,
            TransactionType::TransferOut,
            amount,
            description,
            now,
            reference,
        );
        // Both children share one reference, generated or caller-provided.
        let shared_reference = out_txn.reference().to_string();
        let in_txn = Transaction::new(
            destination.id,
            TransactionType::TransferIn,
            amount,
            description,
            now,
            &shared_reference,
        );

        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or_else(|| BankError::Internal("balance underflow on transfer".into()))?;
        destination.balance = destination
            .balance
            .checked_add(amount)
            .ok_or_else(|| BankError::Internal("balance overflow on transfer".into()))?;

        self.transactions.push(out_txn.clone());
        self.pending_transactions.push(out_txn);
        destination.transactions.push(in_txn.clone());
        destination.pending_transactions.push(in_txn);

        self.last_activity_at = now;
        destination.last_activity_at = now;

        self.pending_events
            .push(DomainEvent::MoneyTransferred(MoneyTransferred {
                event_id: Uuid::new_v4(),
                occurred_on: now,
                transaction_id,
                source_account_number: self.account_number.clone(),
                destination_account_number: destination.account_number.clone(),
                amount,
                reference: shared_reference.clone(),
                transfer_date: now,
            }));

        Ok(TransferReceipt {
            transaction_id,
            reference: shared_reference,
            amount,
        })
    }

    /// Credit interest. Builds the InterestCredit child and increments the
    /// balance in one step.
    pub fn post_interest(
        &mut self,
        amount: Money,
        when: DateTime<Utc>,
        description: &str,
    ) -> Result<Transaction, BankError> {
        if self.is_deleted || !self.is_active {
            return Err(BankError::InvalidOperation(
                "cannot post interest to an inactive account".into(),
            ));
        }
        self.ensure_positive(amount)?;
        self.ensure_same_currency(amount)?;

        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| BankError::Internal("balance overflow on interest credit".into()))?;

        let txn = Transaction::interest_credit(self.id, amount, when, description);
        self.transactions.push(txn.clone());
        self.pending_transactions.push(txn.clone());

        Ok(txn)
    }

    /// Close the account. The balance must be zero.
    pub fn close(&mut self, now: DateTime<Utc>) -> Result<(), BankError> {
        if self.is_deleted {
            return Err(BankError::InvalidOperation(
                "cannot close a deleted account".into(),
            ));
        }
        if !self.balance.is_zero() {
            return Err(BankError::InvalidOperation(format!(
                "cannot close account {} with balance {}",
                self.account_number, self.balance
            )));
        }
        self.status = AccountStatus::Closed;
        self.is_active = false;
        self.last_activity_at = now;
        Ok(())
    }

    /// Archive a dormant account. Archiving is not customer activity, so
    /// the last-activity timestamp is left alone.
    pub fn mark_archived(&mut self) {
        self.status = AccountStatus::Archived;
        self.is_archived = true;
        self.is_active = false;
    }

    /// Apply the dormancy rules: an Active account whose last activity is
    /// more than one year old becomes Inactive. Returns whether the status
    /// changed.
    pub fn update_status_based_on_rules(&mut self, now: DateTime<Utc>) -> bool {
        if self.status == AccountStatus::Active
            && now.signed_duration_since(self.last_activity_at) > chrono::Duration::days(365)
        {
            self.status = AccountStatus::Inactive;
            return true;
        }
        false
    }

    /// Record account activity.
    pub fn touch_activity(&mut self, now: DateTime<Utc>) {
        self.last_activity_at = now;
    }

    pub fn set_interest_bearing(&mut self, interest_bearing: bool) {
        self.is_interest_bearing = interest_bearing;
    }

    /// Soft-delete the account. Requires a zero balance.
    pub fn soft_delete(&mut self, actor: &str, now: DateTime<Utc>) -> Result<(), BankError> {
        if !self.balance.is_zero() {
            return Err(BankError::InvalidOperation(format!(
                "cannot delete account {} with balance {}",
                self.account_number, self.balance
            )));
        }
        self.is_deleted = true;
        self.is_active = false;
        self.deleted_at = Some(now);
        self.deleted_by = Some(actor.to_string());
        Ok(())
    }

    fn ensure_operational(&self) -> Result<(), BankError> {
        if self.is_deleted {
            return Err(BankError::InvalidOperation(format!(
                "account {} is deleted",
                self.account_number
            )));
        }
        if !self.is_active
            || matches!(
                self.status,
                AccountStatus::Closed | AccountStatus::Suspended | AccountStatus::Archived
            )
        {
            return Err(BankError::InvalidOperation(format!(
                "account {} is not active",
                self.account_number
            )));
        }
        Ok(())
    }

    fn ensure_positive(&self, amount: Money) -> Result<(), BankError> {
        if !amount.is_positive() {
            return Err(BankError::validation(
                "amount",
                "amount must be greater than zero",
            ));
        }
        Ok(())
    }

    fn ensure_same_currency(&self, amount: Money) -> Result<(), BankError> {
        if amount.currency != self.balance.currency {
            return Err(BankError::validation(
                "currency",
                format!(
                    "account {} is denominated in {}, got {}",
                    self.account_number, self.balance.currency, amount.currency
                ),
            ));
        }
        Ok(())
    }

    fn withdrawals_in_month(&self, year: i32, month: u32) -> u32 {
        self.transactions
            .iter()
            .filter(|t| {
                !t.is_deleted()
                    && t.transaction_type() == TransactionType::Withdrawal
                    && t.timestamp().year() == year
                    && t.timestamp().month() == month
            })
            .count() as u32
    }

    // --- event and child-transaction queues (unit-of-work surface) ---

    /// Events queued since load, in emission order.
    pub fn pending_events(&self) -> &[DomainEvent] {
        &self.pending_events
    }

    /// Drain the pending events. Called by the unit of work inside commit.
    pub fn take_pending_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Restore previously drained events after a failed commit, ahead of
    /// anything queued since.
    pub fn restore_pending_events(&mut self, mut events: Vec<DomainEvent>) {
        events.append(&mut self.pending_events);
        self.pending_events = events;
    }

    /// Child transactions created since load.
    pub fn pending_transactions(&self) -> &[Transaction] {
        &self.pending_transactions
    }

    /// Drain the uncommitted child transactions.
    pub fn take_pending_transactions(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.pending_transactions)
    }

    /// Restore previously drained child transactions after a failed commit.
    pub fn restore_pending_transactions(&mut self, mut transactions: Vec<Transaction>) {
        transactions.append(&mut self.pending_transactions);
        self.pending_transactions = transactions;
    }

    // --- accessors ---

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn account_number(&self) -> &AccountNumber {
        &self.account_number
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn date_opened(&self) -> DateTime<Utc> {
        self.date_opened
    }

    pub fn is_active(&self) -> bool {
        self.is_active
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

    pub fn row_version(&self) -> Uuid {
        self.row_version
    }

    /// Rotate the concurrency token. Called by the repository after a
    /// successful persisted update.
    pub fn set_row_version(&mut self, row_version: Uuid) {
        self.row_version = row_version;
    }

    pub fn last_activity_at(&self) -> DateTime<Utc> {
        self.last_activity_at
    }

    pub fn status(&self) -> AccountStatus {
        self.status
    }

    pub fn is_interest_bearing(&self) -> bool {
        self.is_interest_bearing
    }

    pub fn is_archived(&self) -> bool {
        self.is_archived
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Reconstruct a persisted account. Used by the repositories.
    #[allow(clippy::too_many_arguments)]
    pub fn rehydrate(
        id: AccountId,
        account_number: AccountNumber,
        customer_id: CustomerId,
        account_type: AccountType,
        balance: Money,
        date_opened: DateTime<Utc>,
        is_active: bool,
        is_deleted: bool,
        deleted_at: Option<DateTime<Utc>>,
        deleted_by: Option<String>,
        row_version: Uuid,
        last_activity_at: DateTime<Utc>,
        status: AccountStatus,
        is_interest_bearing: bool,
        is_archived: bool,
        transactions: Vec<Transaction>,
    ) -> Self {
        Self {
            id,
            account_number,
            customer_id,
            account_type,
            balance,
            date_opened,
            is_active,
            is_deleted,
            deleted_at,
            deleted_by,
            row_version,
            last_activity_at,
            status,
            is_interest_bearing,
            is_archived,
            transactions,
            pending_events: Vec::new(),
            pending_transactions: Vec::new(),
        }
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

    fn open_account(account_type: AccountType, balance: i64) -> Account {
        let mut account = Account::open(
            CustomerId::new(),
            AccountNumber::parse("1234567890").unwrap(),
            account_type,
            naira(balance),
            Utc::now(),
        )
        .unwrap();
        // Start each test from a clean queue; opening already emitted
        // AccountCreated and possibly an initial deposit.
        account.take_pending_events();
        account.take_pending_transactions();
        account
    }

    #[test]
    fn test_open_emits_account_created() {
        let account = Account::open(
            CustomerId::new(),
            AccountNumber::parse("1234567890").unwrap(),
            AccountType::Savings,
            naira(10_000),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(account.balance(), naira(10_000));
        assert_eq!(account.status(), AccountStatus::Active);
        assert!(account.is_interest_bearing());
        assert_eq!(account.pending_events().len(), 1);
        assert!(matches!(
            account.pending_events()[0],
            DomainEvent::AccountCreated(_)
        ));
        // The opening balance is itself a ledger entry.
        assert_eq!(account.transactions().len(), 1);
    }

    #[test]
    fn test_open_rejects_negative_deposit() {
        let result = Account::open(
            CustomerId::new(),
            AccountNumber::parse("1234567890").unwrap(),
            AccountType::Checking,
            naira(-1),
            Utc::now(),
        );
        assert!(matches!(result, Err(BankError::Validation(_))));
    }

    #[test]
    fn test_deposit_increases_balance() {
        let mut account = open_account(AccountType::Checking, 1_000);
        let txn = account.deposit(naira(500), "cash", Utc::now()).unwrap();

        assert_eq!(account.balance(), naira(1_500));
        assert_eq!(txn.transaction_type(), TransactionType::Deposit);
        assert_eq!(account.pending_transactions().len(), 1);
    }

    #[test]
    fn test_deposit_rejects_currency_mismatch() {
        let mut account = open_account(AccountType::Checking, 1_000);
        let result = account.deposit(Money::new(500, Currency::USD), "fx", Utc::now());
        assert!(matches!(result, Err(BankError::Validation(_))));
        assert_eq!(account.balance(), naira(1_000));
    }

    #[test]
    fn test_withdraw_exact_balance_succeeds() {
        let mut account = open_account(AccountType::Checking, 10_000);
        account.withdraw(naira(10_000), "all", Utc::now()).unwrap();
        assert_eq!(account.balance(), naira(0));
    }

    #[test]
    fn test_withdraw_one_minor_unit_over_fails() {
        let mut account = open_account(AccountType::Checking, 10_000);
        let result = account.withdraw(naira(10_001), "too much", Utc::now());

        assert!(matches!(result, Err(BankError::InsufficientFunds { .. })));
        assert_eq!(account.balance(), naira(10_000));
        // The refusal is itself an observable domain event.
        assert_eq!(account.pending_events().len(), 1);
        match &account.pending_events()[0] {
            DomainEvent::InsufficientFunds(e) => {
                assert_eq!(e.operation, "Withdraw");
                assert_eq!(e.requested_amount, naira(10_001));
                assert_eq!(e.current_balance, naira(10_000));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_savings_monthly_withdrawal_cap() {
        let mut account = open_account(AccountType::Savings, 1_000_000);
        let november = |day| Utc.with_ymd_and_hms(2026, 11, day, 10, 0, 0).unwrap();

        for day in 1..=6 {
            account.withdraw(naira(1_000), "spend", november(day)).unwrap();
        }

        let seventh = account.withdraw(naira(1_000), "spend", november(7));
        assert!(matches!(
            seventh,
            Err(BankError::WithdrawalLimit { limit: 6, .. })
        ));

        // A new calendar month resets the count.
        let december = Utc.with_ymd_and_hms(2026, 12, 1, 9, 0, 0).unwrap();
        assert!(account.withdraw(naira(1_000), "spend", december).is_ok());
    }

    #[test]
    fn test_checking_has_no_withdrawal_cap() {
        let mut account = open_account(AccountType::Checking, 1_000_000);
        let now = Utc::now();
        for _ in 0..10 {
            account.withdraw(naira(1_000), "spend", now).unwrap();
        }
        assert_eq!(account.balance(), naira(990_000));
    }

    #[test]
    fn test_transfer_conserves_money_and_emits_once() {
        let mut source = open_account(AccountType::Checking, 100_000);
        let mut destination = Account::open(
            CustomerId::new(),
            AccountNumber::parse("9876543210").unwrap(),
            AccountType::Checking,
            naira(50_000),
            Utc::now(),
        )
        .unwrap();
        destination.take_pending_events();

        let receipt = source
            .transfer_to(&mut destination, naira(20_000), "R1", "rent", Utc::now())
            .unwrap();

        assert_eq!(source.balance(), naira(80_000));
        assert_eq!(destination.balance(), naira(70_000));
        assert_eq!(receipt.reference, "R1");

        let transfers: Vec<_> = source
            .pending_events()
            .iter()
            .filter(|e| matches!(e, DomainEvent::MoneyTransferred(_)))
            .collect();
        assert_eq!(transfers.len(), 1);
        match transfers[0] {
            DomainEvent::MoneyTransferred(e) => {
                assert_eq!(e.amount, naira(20_000));
                assert_eq!(e.reference, "R1");
                assert_eq!(e.transaction_id, receipt.transaction_id);
            }
            _ => unreachable!(),
        }

        // One child on each side, sharing the reference.
        assert_eq!(source.pending_transactions().len(), 1);
        assert_eq!(destination.pending_transactions().len(), 1);
        assert_eq!(
            source.pending_transactions()[0].transaction_type(),
            TransactionType::TransferOut
        );
        assert_eq!(
            destination.pending_transactions()[0].transaction_type(),
            TransactionType::TransferIn
        );
        assert_eq!(destination.pending_transactions()[0].reference(), "R1");
    }

    #[test]
    fn test_transfer_shortfall_mutates_nothing() {
        let mut source = open_account(AccountType::Checking, 100);
        let mut destination = Account::open(
            CustomerId::new(),
            AccountNumber::parse("9876543210").unwrap(),
            AccountType::Checking,
            naira(0),
            Utc::now(),
        )
        .unwrap();
        destination.take_pending_events();

        let result = source.transfer_to(&mut destination, naira(500), "", "x", Utc::now());

        assert!(matches!(result, Err(BankError::InsufficientFunds { .. })));
        assert_eq!(source.balance(), naira(100));
        assert_eq!(destination.balance(), naira(0));
        assert!(destination.pending_transactions().is_empty());
        assert_eq!(source.pending_events().len(), 1);
        match &source.pending_events()[0] {
            DomainEvent::InsufficientFunds(e) => assert_eq!(e.operation, "Transfer"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_transfer_rejects_currency_mismatch() {
        let mut source = open_account(AccountType::Checking, 100_000);
        let mut destination = Account::open(
            CustomerId::new(),
            AccountNumber::parse("9876543210").unwrap(),
            AccountType::Checking,
            Money::new(0, Currency::USD),
            Utc::now(),
        )
        .unwrap();
        destination.take_pending_events();

        let result = source.transfer_to(
            &mut destination,
            Money::new(100, Currency::USD),
            "",
            "fx",
            Utc::now(),
        );

        assert!(matches!(result, Err(BankError::Validation(_))));
        assert_eq!(source.balance(), naira(100_000));
        assert!(source.pending_events().is_empty());
    }

    #[test]
    fn test_transfer_requires_distinct_accounts() {
        let mut source = open_account(AccountType::Checking, 100_000);
        let mut clone = source.clone();
        let result = source.transfer_to(&mut clone, naira(100), "", "self", Utc::now());
        assert!(matches!(result, Err(BankError::InvalidOperation(_))));
    }

    #[test]
    fn test_transfer_generates_shared_reference_when_blank() {
        let mut source = open_account(AccountType::Checking, 100_000);
        let mut destination = Account::open(
            CustomerId::new(),
            AccountNumber::parse("9876543210").unwrap(),
            AccountType::Checking,
            naira(0),
            Utc::now(),
        )
        .unwrap();
        destination.take_pending_events();

        let receipt = source
            .transfer_to(&mut destination, naira(100), "", "x", Utc::now())
            .unwrap();

        assert!(!receipt.reference.is_empty());
        assert_eq!(source.pending_transactions()[0].reference(), receipt.reference);
        assert_eq!(
            destination.pending_transactions()[0].reference(),
            receipt.reference
        );
    }

    #[test]
    fn test_close_requires_zero_balance() {
        let mut funded = open_account(AccountType::Checking, 100);
        assert!(matches!(
            funded.close(Utc::now()),
            Err(BankError::InvalidOperation(_))
        ));

        let mut empty = open_account(AccountType::Checking, 0);
        empty.close(Utc::now()).unwrap();
        assert_eq!(empty.status(), AccountStatus::Closed);
        assert!(!empty.is_active());
        assert!(matches!(
            empty.deposit(naira(100), "late", Utc::now()),
            Err(BankError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_dormancy_rules() {
        let mut account = open_account(AccountType::Checking, 0);
        let opened = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        account.touch_activity(opened);

        // Thirteen months later the account goes dormant.
        let later = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        assert!(account.update_status_based_on_rules(later));
        assert_eq!(account.status(), AccountStatus::Inactive);

        // A second pass is a no-op.
        assert!(!account.update_status_based_on_rules(later));
    }

    #[test]
    fn test_mark_archived() {
        let mut account = open_account(AccountType::Checking, 0);
        account.mark_archived();
        assert_eq!(account.status(), AccountStatus::Archived);
        assert!(account.is_archived());
        assert!(!account.is_active());
    }

    #[test]
    fn test_post_interest_credits_balance() {
        let mut account = open_account(AccountType::Savings, 1_200_000);
        let txn = account
            .post_interest(naira(1_479), Utc::now(), "Monthly interest")
            .unwrap();

        assert_eq!(account.balance(), naira(1_201_479));
        assert_eq!(txn.transaction_type(), TransactionType::InterestCredit);
        assert!(txn.reference().starts_with("INT-"));
    }

    #[test]
    fn test_pending_events_take_and_restore() {
        let mut account = open_account(AccountType::Checking, 100);
        let _ = account.withdraw(naira(500), "fail", Utc::now());
        assert_eq!(account.pending_events().len(), 1);

        let drained = account.take_pending_events();
        assert_eq!(drained.len(), 1);
        assert!(account.pending_events().is_empty());

        account.restore_pending_events(drained);
        assert_eq!(account.pending_events().len(), 1);
    }

    #[test]
    fn test_soft_delete_requires_zero_balance() {
        let mut funded = open_account(AccountType::Checking, 50);
        assert!(funded.soft_delete("ops", Utc::now()).is_err());

        let mut empty = open_account(AccountType::Checking, 0);
        empty.soft_delete("ops", Utc::now()).unwrap();
        assert!(empty.is_deleted());
        assert_eq!(empty.deleted_by(), Some("ops"));
        assert!(matches!(
            empty.deposit(naira(1), "late", Utc::now()),
            Err(BankError::InvalidOperation(_))
        ));
    }
}
