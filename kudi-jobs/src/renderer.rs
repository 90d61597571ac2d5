//! Statement rendering.

use chrono::NaiveDate;
use kudi_domain::{Account, Customer, Transaction};

/// Renders a statement artifact for emailing. PDF output lives behind this
/// seam in a separate service.
pub trait StatementRenderer: Send + Sync {
    fn render(
        &self,
        account: &Account,
        owner: &Customer,
        transactions: &[Transaction],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<u8>;
}

/// Plain-text statement renderer.
#[derive(Debug, Clone, Default)]
pub struct TextStatementRenderer;

impl TextStatementRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl StatementRenderer for TextStatementRenderer {
    fn render(
        &self,
        account: &Account,
        owner: &Customer,
        transactions: &[Transaction],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<u8> {
        let mut out = String::new();
        out.push_str("KUDI ACCOUNT STATEMENT\n");
        out.push_str("======================\n\n");
        out.push_str(&format!("Customer:  {}\n", owner.full_name()));
        out.push_str(&format!("Account:   {} ({})\n", account.account_number(), account.account_type()));
        out.push_str(&format!("Period:    {start} to {end}\n"));
        out.push_str(&format!("Balance:   {}\n\n", account.balance()));

        out.push_str(&format!(
            "{:<12} {:<16} {:>14}  {}\n",
            "DATE", "TYPE", "AMOUNT", "REFERENCE"
        ));
        for transaction in transactions {
            out.push_str(&format!(
                "{:<12} {:<16} {:>14}  {}\n",
                transaction.timestamp().format("%Y-%m-%d"),
                transaction.transaction_type().as_str(),
                transaction.amount().format(),
                transaction.reference()
            ));
        }
        if transactions.is_empty() {
            out.push_str("No transactions in this period.\n");
        }

        out.into_bytes()
    }
}
