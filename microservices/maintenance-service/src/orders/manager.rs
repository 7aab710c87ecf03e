//! Order Manager
//!
//! Owns the payment-order lifecycle: create (with the at-most-one-active-
//! order-per-month guard), verify-and-record, and the staleness sweep for
//! abandoned orders.
//!
//! Lock discipline: the gateway round trip never happens under a lock.
//! The (member, month) active slot and the ledger's receipt index are
//! insert-or-fail maps; when two creations race, the loser discards its
//! gateway order and returns the winner's descriptor.

use chrono::{Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use samaj_core::Month;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::PaymentError;
use crate::gateway::PaymentGateway;
use crate::ledger::PaymentLedger;
use crate::rates::RateResolver;
use crate::types::{
    GatewayMode, Membership, OrderDescriptor, OrderStatus, PaymentOrder, RateCard, Receipt,
};

#[derive(Clone)]
pub struct OrderManager {
    gateway: Arc<dyn PaymentGateway>,
    ledger: PaymentLedger,
    /// All orders, keyed by gateway order id
    orders: Arc<DashMap<String, PaymentOrder>>,
    /// Unique constraint: at most one active order per (member_id, month)
    active: Arc<DashMap<(Uuid, Month), String>>,
    stale_after: Duration,
    currency: String,
}

impl OrderManager {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        ledger: PaymentLedger,
        stale_after: Duration,
        currency: &str,
    ) -> Self {
        Self {
            gateway,
            ledger,
            orders: Arc::new(DashMap::new()),
            active: Arc::new(DashMap::new()),
            stale_after,
            currency: currency.to_string(),
        }
    }

    /// Create a payment order for a member/month.
    ///
    /// The due amount is recomputed here from the rate card; the caller's
    /// amount is only checked against it, never charged.
    pub async fn create_order(
        &self,
        membership: &Membership,
        rates: &RateCard,
        month: Month,
        requested_amount: Decimal,
    ) -> Result<OrderDescriptor, PaymentError> {
        let due = RateResolver::resolve_due(membership, rates, month)?;
        if requested_amount != due.amount {
            return Err(PaymentError::AmountMismatch {
                expected: due.amount,
                got: requested_amount,
            });
        }

        if self.ledger.is_paid(membership.member_id, month) {
            return Err(PaymentError::AlreadyPaid(month));
        }

        // An active fresh order already staged for this month is returned
        // as-is rather than billed twice.
        if let Some(existing) = self.active_order(membership.member_id, month) {
            return Ok(self.descriptor(&existing));
        }

        let amount_minor = Self::to_minor_units(due.amount);
        let receipt_ref = format!("maint-{}-{}", membership.member_id, month);

        // Gateway round trip happens with no lock held.
        let remote = self
            .gateway
            .create_remote_order(amount_minor, &self.currency, &receipt_ref)
            .await?;

        let order = PaymentOrder {
            id: Uuid::new_v4(),
            member_id: membership.member_id,
            society_id: membership.society_id,
            month,
            amount: due.amount,
            gateway_order_id: remote.gateway_order_id.clone(),
            status: OrderStatus::Created,
            created_at: Utc::now(),
        };
        self.orders
            .insert(order.gateway_order_id.clone(), order.clone());

        // Insert-or-fail on the (member, month) active slot. Losing the
        // race means another creation landed first; discard ours.
        match self.active.entry((membership.member_id, month)) {
            Entry::Occupied(mut slot) => {
                let winner = self.orders.get(slot.get()).map(|o| o.clone());
                match winner {
                    Some(winner)
                        if winner.gateway_order_id != order.gateway_order_id
                            && winner.status == OrderStatus::Created
                            && !self.is_stale(&winner) =>
                    {
                        self.orders.remove(&order.gateway_order_id);
                        debug!(
                            gateway_order_id = %order.gateway_order_id,
                            member_id = %membership.member_id,
                            month = %month,
                            "Discarded duplicate order, active order already staged"
                        );
                        return Ok(self.descriptor(&winner));
                    }
                    _ => {
                        slot.insert(order.gateway_order_id.clone());
                    }
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(order.gateway_order_id.clone());
            }
        }

        info!(
            order_id = %order.id,
            gateway_order_id = %order.gateway_order_id,
            member_id = %membership.member_id,
            month = %month,
            amount = %order.amount,
            mode = ?self.gateway.mode(),
            "Payment order created"
        );
        Ok(self.descriptor(&order))
    }

    /// Validate a completed payment and record its receipt.
    ///
    /// The ledger's (member, month) index insert is the commit point:
    /// exactly one receipt per verified order, none on any failure path.
    pub fn verify_and_record(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        gateway_signature: &str,
    ) -> Result<Receipt, PaymentError> {
        let order = self
            .orders
            .get(gateway_order_id)
            .map(|o| o.clone())
            .ok_or_else(|| PaymentError::OrderNotFound(gateway_order_id.to_string()))?;

        if order.status != OrderStatus::Created {
            return Err(PaymentError::OrderAlreadyProcessed(
                gateway_order_id.to_string(),
            ));
        }

        if !self.gateway.verify_signature(
            &order.gateway_order_id,
            gateway_payment_id,
            gateway_signature,
        ) {
            self.fail_order(&order);
            warn!(
                gateway_order_id = %gateway_order_id,
                member_id = %order.member_id,
                "Payment signature rejected"
            );
            return Err(PaymentError::InvalidSignature(gateway_order_id.to_string()));
        }

        let receipt = Receipt {
            id: Uuid::new_v4(),
            order_id: order.id,
            member_id: order.member_id,
            society_id: order.society_id,
            month: order.month,
            amount: order.amount,
            gateway_payment_id: gateway_payment_id.to_string(),
            gateway_signature: gateway_signature.to_string(),
            payment_date: Utc::now(),
        };

        let receipt = match self.ledger.record(receipt) {
            Ok(receipt) => receipt,
            Err(e) => {
                // Lost a race with another verified order for the month.
                self.fail_order(&order);
                return Err(e);
            }
        };

        if let Some(mut stored) = self.orders.get_mut(gateway_order_id) {
            stored.status = OrderStatus::Verified;
        }
        self.release_slot(&order);

        info!(
            gateway_order_id = %gateway_order_id,
            receipt_id = %receipt.id,
            month = %receipt.month,
            "Payment verified"
        );
        Ok(receipt)
    }

    /// Mark orders stuck in `created` past the staleness window as
    /// abandoned and free their month slots. Returns how many were swept.
    pub fn sweep_stale(&self) -> usize {
        let cutoff = Utc::now() - self.stale_after;
        let stale: Vec<PaymentOrder> = self
            .orders
            .iter()
            .filter(|o| o.value().status == OrderStatus::Created && o.value().created_at <= cutoff)
            .map(|o| o.value().clone())
            .collect();

        let mut swept = 0;
        for order in stale {
            let abandoned = match self.orders.get_mut(&order.gateway_order_id) {
                Some(mut stored) if stored.status == OrderStatus::Created => {
                    stored.status = OrderStatus::Abandoned;
                    true
                }
                _ => false,
            };
            if abandoned {
                self.release_slot(&order);
                swept += 1;
                info!(
                    gateway_order_id = %order.gateway_order_id,
                    member_id = %order.member_id,
                    month = %order.month,
                    "Order abandoned after staleness window"
                );
            }
        }
        swept
    }

    pub fn order(&self, gateway_order_id: &str) -> Option<PaymentOrder> {
        self.orders.get(gateway_order_id).map(|o| o.clone())
    }

    fn active_order(&self, member_id: Uuid, month: Month) -> Option<PaymentOrder> {
        let gateway_order_id = self.active.get(&(member_id, month))?.clone();
        self.orders
            .get(&gateway_order_id)
            .map(|o| o.clone())
            .filter(|o| o.status == OrderStatus::Created && !self.is_stale(o))
    }

    fn is_stale(&self, order: &PaymentOrder) -> bool {
        order.created_at <= Utc::now() - self.stale_after
    }

    fn fail_order(&self, order: &PaymentOrder) {
        if let Some(mut stored) = self.orders.get_mut(&order.gateway_order_id) {
            if stored.status == OrderStatus::Created {
                stored.status = OrderStatus::Failed;
            }
        }
        self.release_slot(order);
    }

    fn release_slot(&self, order: &PaymentOrder) {
        self.active
            .remove_if(&(order.member_id, order.month), |_, gateway_order_id| {
                gateway_order_id == &order.gateway_order_id
            });
    }

    fn descriptor(&self, order: &PaymentOrder) -> OrderDescriptor {
        OrderDescriptor {
            order_id: order.id,
            gateway_order_id: order.gateway_order_id.clone(),
            amount: order.amount,
            amount_minor: Self::to_minor_units(order.amount),
            currency: self.currency.clone(),
            gateway_key: self.gateway.public_key(),
            mock_mode: self.gateway.mode() == GatewayMode::Mock,
            month: order.month,
        }
    }

    fn to_minor_units(amount: Decimal) -> u64 {
        (amount * Decimal::from(100)).round().to_u64().unwrap_or(0)
    }
}
