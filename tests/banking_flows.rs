//! End-to-end domain flows across the workspace crates.

use chrono::{TimeZone, Utc};
use kudi::domain::{
    Account, AccountNumber, AccountType, BankError, Currency, CustomerId, DomainEvent, Money,
};
use kudi::outbox::codec;
use kudi::outbox::OutboxMessage;

fn naira(amount: i64) -> Money {
    Money::new(amount, Currency::NGN)
}

fn open(number: &str, account_type: AccountType, balance: i64) -> Account {
    let mut account = Account::open(
        CustomerId::new(),
        AccountNumber::parse(number).unwrap(),
        account_type,
        naira(balance),
        Utc::now(),
    )
    .unwrap();
    account.take_pending_events();
    account.take_pending_transactions();
    account
}

#[test]
fn transfer_emits_one_event_that_round_trips_through_the_outbox() {
    let mut source = open("1000000001", AccountType::Checking, 100_000);
    let mut destination = open("1000000002", AccountType::Checking, 50_000);

    source
        .transfer_to(&mut destination, naira(20_000), "R1", "rent", Utc::now())
        .unwrap();

    assert_eq!(source.balance(), naira(80_000));
    assert_eq!(destination.balance(), naira(70_000));

    let events = source.take_pending_events();
    assert_eq!(events.len(), 1);

    // The event survives the outbox wire format unchanged.
    let message = OutboxMessage::from_event(&events[0]).unwrap();
    assert_eq!(message.event_type, "MoneyTransferred");
    assert!(message.is_pending());
    assert_eq!(message.decode(), Some(events[0].clone()));
}

#[test]
fn independent_transfers_commute() {
    // Two transfers touching disjoint account pairs end at the same
    // balances in either order.
    let run = |first_then_second: bool| {
        let mut a = open("1000000001", AccountType::Checking, 100_000);
        let mut b = open("1000000002", AccountType::Checking, 0);
        let mut c = open("1000000003", AccountType::Checking, 50_000);
        let mut d = open("1000000004", AccountType::Checking, 0);

        let now = Utc::now();
        if first_then_second {
            a.transfer_to(&mut b, naira(30_000), "", "x", now).unwrap();
            c.transfer_to(&mut d, naira(10_000), "", "y", now).unwrap();
        } else {
            c.transfer_to(&mut d, naira(10_000), "", "y", now).unwrap();
            a.transfer_to(&mut b, naira(30_000), "", "x", now).unwrap();
        }
        (a.balance(), b.balance(), c.balance(), d.balance())
    };

    assert_eq!(run(true), run(false));
}

#[test]
fn withdraw_boundary_at_exact_balance() {
    let mut account = open("1000000001", AccountType::Checking, 10_000);
    assert!(account.withdraw(naira(10_000), "all", Utc::now()).is_ok());

    let mut account = open("1000000002", AccountType::Checking, 10_000);
    let result = account.withdraw(naira(10_001), "over", Utc::now());
    assert!(matches!(result, Err(BankError::InsufficientFunds { .. })));
}

#[test]
fn savings_cap_resets_across_months() {
    let mut account = open("1000000001", AccountType::Savings, 1_000_000);
    let november = |day| Utc.with_ymd_and_hms(2026, 11, day, 12, 0, 0).unwrap();

    for day in 1..=6 {
        account.withdraw(naira(100), "spend", november(day)).unwrap();
    }
    assert!(matches!(
        account.withdraw(naira(100), "spend", november(7)),
        Err(BankError::WithdrawalLimit { .. })
    ));

    let december = Utc.with_ymd_and_hms(2026, 12, 1, 12, 0, 0).unwrap();
    assert!(account.withdraw(naira(100), "spend", december).is_ok());
}

#[test]
fn cross_currency_transfer_is_rejected_without_events() {
    let mut source = open("1000000001", AccountType::Checking, 100_000);
    let mut destination = Account::open(
        CustomerId::new(),
        AccountNumber::parse("1000000002").unwrap(),
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
    assert!(source.pending_events().is_empty());
    assert_eq!(source.balance(), naira(100_000));
}

#[test]
fn unknown_event_tags_decode_to_none() {
    let payload = serde_json::json!({
        "type": "AccountFrozen",
        "event_id": uuid::Uuid::new_v4(),
        "occurred_on": Utc::now(),
    });
    assert_eq!(codec::decode(&payload), None);
}

#[test]
fn committed_events_match_aggregate_emissions() {
    let mut source = open("1000000001", AccountType::Checking, 10_000);
    let mut destination = open("1000000002", AccountType::Checking, 0);
    let now = Utc::now();

    // A failing withdrawal and a succeeding transfer queue one event each.
    let _ = source.withdraw(naira(50_000), "too much", now);
    source
        .transfer_to(&mut destination, naira(5_000), "", "ok", now)
        .unwrap();

    let events = source.take_pending_events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], DomainEvent::InsufficientFunds(_)));
    assert!(matches!(events[1], DomainEvent::MoneyTransferred(_)));

    // Emission order survives the outbox ordering key.
    assert!(events[0].occurred_on() <= events[1].occurred_on());
}
