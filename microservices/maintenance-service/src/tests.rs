//! Maintenance service integration tests
//!
//! Exercise the payment lifecycle end to end against the mock gateway:
//! rate resolution, order creation guards, verification, receipts, and
//! the staleness sweep.

use chrono::Duration;
use rust_decimal_macros::dec;
use samaj_core::{Month, UserType};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::PaymentError;
use crate::gateway::{MockGateway, PaymentGateway};
use crate::ledger::PaymentLedger;
use crate::orders::OrderManager;
use crate::rates::RateResolver;
use crate::types::{Membership, OrderStatus, RateCard, Receipt};

fn month(s: &str) -> Month {
    s.parse().unwrap()
}

fn rate_card(society_id: Uuid) -> RateCard {
    RateCard {
        society_id,
        society_name: "Green Acres".to_string(),
        chairman_id: Uuid::new_v4(),
        owner_rate: Some(dec!(2000)),
        tenant_rate: Some(dec!(2500)),
    }
}

fn membership(society_id: Uuid, user_type: UserType) -> Membership {
    Membership {
        member_id: Uuid::new_v4(),
        society_id,
        user_type,
    }
}

fn manager(ledger: PaymentLedger) -> OrderManager {
    OrderManager::new(
        Arc::new(MockGateway),
        ledger,
        Duration::minutes(30),
        "INR",
    )
}

fn mock_receipt(member_id: Uuid, society_id: Uuid, month: Month) -> Receipt {
    Receipt {
        id: Uuid::new_v4(),
        order_id: Uuid::new_v4(),
        member_id,
        society_id,
        month,
        amount: dec!(2000),
        gateway_payment_id: "pay_mock_1".to_string(),
        gateway_signature: "sig_mock_1".to_string(),
        payment_date: chrono::Utc::now(),
    }
}

// Rate resolution

#[test]
fn due_follows_occupancy_type() {
    let society_id = Uuid::new_v4();
    let rates = rate_card(society_id);
    let m = month("2025-06");

    let owner_due =
        RateResolver::resolve_due(&membership(society_id, UserType::Owner), &rates, m).unwrap();
    assert_eq!(owner_due.amount, dec!(2000));

    let tenant_due =
        RateResolver::resolve_due(&membership(society_id, UserType::Tenant), &rates, m).unwrap();
    assert_eq!(tenant_due.amount, dec!(2500));
}

#[test]
fn unset_or_zero_rate_is_not_a_free_month() {
    let society_id = Uuid::new_v4();
    let mut rates = rate_card(society_id);
    rates.tenant_rate = None;
    rates.owner_rate = Some(dec!(0));
    let m = month("2025-06");

    let err = RateResolver::resolve_due(&membership(society_id, UserType::Tenant), &rates, m)
        .unwrap_err();
    assert!(matches!(err, PaymentError::RateNotConfigured(UserType::Tenant)));

    let err = RateResolver::resolve_due(&membership(society_id, UserType::Owner), &rates, m)
        .unwrap_err();
    assert!(matches!(err, PaymentError::RateNotConfigured(UserType::Owner)));
}

// Order creation guards

#[tokio::test]
async fn client_amount_is_checked_against_the_recomputed_due() {
    let society_id = Uuid::new_v4();
    let rates = rate_card(society_id);
    let member = membership(society_id, UserType::Owner);
    let mgr = manager(PaymentLedger::new());

    let err = mgr
        .create_order(&member, &rates, month("2025-06"), dec!(1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PaymentError::AmountMismatch { expected, got }
            if expected == dec!(2000) && got == dec!(1)
    ));
}

#[tokio::test]
async fn paid_month_rejects_new_orders() {
    let society_id = Uuid::new_v4();
    let rates = rate_card(society_id);
    let member = membership(society_id, UserType::Owner);
    let m = month("2025-06");

    let ledger = PaymentLedger::new();
    ledger
        .record(mock_receipt(member.member_id, society_id, m))
        .unwrap();

    let mgr = manager(ledger);
    let err = mgr
        .create_order(&member, &rates, m, dec!(2000))
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::AlreadyPaid(paid) if paid == m));
}

#[tokio::test]
async fn repeated_create_returns_the_same_order() {
    let society_id = Uuid::new_v4();
    let rates = rate_card(society_id);
    let member = membership(society_id, UserType::Owner);
    let mgr = manager(PaymentLedger::new());

    let first = mgr
        .create_order(&member, &rates, month("2025-06"), dec!(2000))
        .await
        .unwrap();
    let second = mgr
        .create_order(&member, &rates, month("2025-06"), dec!(2000))
        .await
        .unwrap();

    assert_eq!(first.gateway_order_id, second.gateway_order_id);
    assert!(first.mock_mode);
    assert_eq!(first.amount_minor, 200_000);
}

#[tokio::test]
async fn concurrent_creates_settle_on_one_order() {
    let society_id = Uuid::new_v4();
    let rates = rate_card(society_id);
    let member = membership(society_id, UserType::Owner);
    let mgr = manager(PaymentLedger::new());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let mgr = mgr.clone();
        let rates = rates.clone();
        handles.push(tokio::spawn(async move {
            mgr.create_order(&member, &rates, month("2025-06"), dec!(2000))
                .await
                .unwrap()
        }));
    }

    let mut order_ids = Vec::new();
    for handle in handles {
        order_ids.push(handle.await.unwrap().gateway_order_id);
    }
    order_ids.sort();
    order_ids.dedup();
    assert_eq!(order_ids.len(), 1, "all creators must see the same order");
}

#[tokio::test]
async fn different_months_get_independent_orders() {
    let society_id = Uuid::new_v4();
    let rates = rate_card(society_id);
    let member = membership(society_id, UserType::Owner);
    let mgr = manager(PaymentLedger::new());

    let june = mgr
        .create_order(&member, &rates, month("2025-06"), dec!(2000))
        .await
        .unwrap();
    let july = mgr
        .create_order(&member, &rates, month("2025-07"), dec!(2000))
        .await
        .unwrap();
    assert_ne!(june.gateway_order_id, july.gateway_order_id);
}

// Verification and the ledger

#[tokio::test]
async fn mock_checkout_end_to_end() {
    let society_id = Uuid::new_v4();
    let rates = rate_card(society_id);
    let member = membership(society_id, UserType::Owner);
    let ledger = PaymentLedger::new();
    let mgr = manager(ledger.clone());
    let m = month("2025-06");

    let descriptor = mgr.create_order(&member, &rates, m, dec!(2000)).await.unwrap();
    assert!(descriptor.mock_mode);
    assert!(descriptor.gateway_key.is_none());

    let receipt = mgr
        .verify_and_record(&descriptor.gateway_order_id, "pay_mock_42", "sig_mock_42")
        .unwrap();
    assert_eq!(receipt.member_id, member.member_id);
    assert_eq!(receipt.month, m);
    assert_eq!(receipt.amount, dec!(2000));

    assert!(ledger.is_paid(member.member_id, m));
    let listed = ledger.list_receipts(member.member_id);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, receipt.id);

    let order = mgr.order(&descriptor.gateway_order_id).unwrap();
    assert_eq!(order.status, OrderStatus::Verified);
}

#[tokio::test]
async fn verified_order_cannot_be_verified_twice() {
    let society_id = Uuid::new_v4();
    let rates = rate_card(society_id);
    let member = membership(society_id, UserType::Owner);
    let ledger = PaymentLedger::new();
    let mgr = manager(ledger.clone());

    let descriptor = mgr
        .create_order(&member, &rates, month("2025-06"), dec!(2000))
        .await
        .unwrap();
    mgr.verify_and_record(&descriptor.gateway_order_id, "pay_mock_1", "sig_mock_1")
        .unwrap();

    let err = mgr
        .verify_and_record(&descriptor.gateway_order_id, "pay_mock_1", "sig_mock_1")
        .unwrap_err();
    assert!(matches!(err, PaymentError::OrderAlreadyProcessed(_)));
    assert_eq!(ledger.receipt_count(), 1);
}

#[tokio::test]
async fn bad_signature_fails_the_order_and_writes_nothing() {
    let society_id = Uuid::new_v4();
    let rates = rate_card(society_id);
    let member = membership(society_id, UserType::Owner);
    let ledger = PaymentLedger::new();
    let mgr = manager(ledger.clone());
    let m = month("2025-06");

    let descriptor = mgr.create_order(&member, &rates, m, dec!(2000)).await.unwrap();
    let err = mgr
        .verify_and_record(&descriptor.gateway_order_id, "pay_real_1", "not-a-mock-sig")
        .unwrap_err();
    assert!(matches!(err, PaymentError::InvalidSignature(_)));

    let order = mgr.order(&descriptor.gateway_order_id).unwrap();
    assert_eq!(order.status, OrderStatus::Failed);
    assert_eq!(ledger.receipt_count(), 0);
    assert!(!ledger.is_paid(member.member_id, m));

    // The month slot is free again for a retry.
    let retry = mgr.create_order(&member, &rates, m, dec!(2000)).await.unwrap();
    assert_ne!(retry.gateway_order_id, descriptor.gateway_order_id);
}

#[test]
fn unknown_order_is_rejected() {
    let mgr = manager(PaymentLedger::new());
    let err = mgr
        .verify_and_record("order_mock_nope", "pay_mock_1", "sig_mock_1")
        .unwrap_err();
    assert!(matches!(err, PaymentError::OrderNotFound(_)));
}

#[test]
fn ledger_admits_one_receipt_per_member_month() {
    let ledger = PaymentLedger::new();
    let member_id = Uuid::new_v4();
    let society_id = Uuid::new_v4();
    let m = month("2025-06");

    let mut handles = Vec::new();
    for _ in 0..4 {
        let ledger = ledger.clone();
        let receipt = mock_receipt(member_id, society_id, m);
        handles.push(std::thread::spawn(move || ledger.record(receipt).is_ok()));
    }

    let recorded: usize = handles
        .into_iter()
        .map(|h| h.join().unwrap() as usize)
        .sum();
    assert_eq!(recorded, 1);
    assert_eq!(ledger.receipt_count(), 1);
}

#[test]
fn receipts_sort_most_recent_month_first() {
    let ledger = PaymentLedger::new();
    let member_id = Uuid::new_v4();
    let society_id = Uuid::new_v4();

    for m in ["2025-04", "2025-06", "2025-05"] {
        ledger
            .record(mock_receipt(member_id, society_id, month(m)))
            .unwrap();
    }

    let months: Vec<String> = ledger
        .list_receipts(member_id)
        .iter()
        .map(|r| r.month.to_string())
        .collect();
    assert_eq!(months, vec!["2025-06", "2025-05", "2025-04"]);
}

// Staleness sweep

#[tokio::test]
async fn stale_orders_are_abandoned_and_the_slot_reopens() {
    let society_id = Uuid::new_v4();
    let rates = rate_card(society_id);
    let member = membership(society_id, UserType::Owner);
    // Zero window: every created order is immediately stale.
    let mgr = OrderManager::new(
        Arc::new(MockGateway),
        PaymentLedger::new(),
        Duration::zero(),
        "INR",
    );
    let m = month("2025-06");

    let first = mgr.create_order(&member, &rates, m, dec!(2000)).await.unwrap();
    assert_eq!(mgr.sweep_stale(), 1);

    let order = mgr.order(&first.gateway_order_id).unwrap();
    assert_eq!(order.status, OrderStatus::Abandoned);

    let err = mgr
        .verify_and_record(&first.gateway_order_id, "pay_mock_1", "sig_mock_1")
        .unwrap_err();
    assert!(matches!(err, PaymentError::OrderAlreadyProcessed(_)));

    let fresh = mgr.create_order(&member, &rates, m, dec!(2000)).await.unwrap();
    assert_ne!(fresh.gateway_order_id, first.gateway_order_id);
}

// Gateway mode gating

#[test]
fn real_gateway_never_accepts_mock_identifiers() {
    let gw = crate::gateway::RazorpayGateway::new(
        "rzp_test_key",
        "rzp_test_secret",
        std::time::Duration::from_secs(5),
    )
    .unwrap();
    assert!(!gw.verify_signature("order_mock_1", "pay_mock_1", "sig_mock_1"));
    assert_eq!(gw.mode(), crate::types::GatewayMode::Real);
}
