//! Payment Ledger
//!
//! Durable receipts plus the (member, month) unique index that makes
//! double-charging impossible. Receipts are immutable once recorded; the
//! index insert is the serialization point, so concurrent verifications
//! for the same month settle to exactly one receipt.

use dashmap::DashMap;
use samaj_core::Month;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::PaymentError;
use crate::types::Receipt;

#[derive(Clone)]
pub struct PaymentLedger {
    receipts: Arc<DashMap<Uuid, Receipt>>,
    /// Unique constraint: at most one receipt per (member_id, month)
    by_member_month: Arc<DashMap<(Uuid, Month), Uuid>>,
}

impl PaymentLedger {
    pub fn new() -> Self {
        Self {
            receipts: Arc::new(DashMap::new()),
            by_member_month: Arc::new(DashMap::new()),
        }
    }

    /// Record a receipt, insert-or-fail on the (member, month) index.
    pub fn record(&self, receipt: Receipt) -> Result<Receipt, PaymentError> {
        match self
            .by_member_month
            .entry((receipt.member_id, receipt.month))
        {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(PaymentError::DuplicatePayment(receipt.month))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(receipt.id);
                self.receipts.insert(receipt.id, receipt.clone());
                info!(
                    receipt_id = %receipt.id,
                    member_id = %receipt.member_id,
                    month = %receipt.month,
                    amount = %receipt.amount,
                    "Receipt recorded"
                );
                Ok(receipt)
            }
        }
    }

    /// Whether a receipt exists for the member/month.
    pub fn is_paid(&self, member_id: Uuid, month: Month) -> bool {
        self.by_member_month.contains_key(&(member_id, month))
    }

    /// A member's receipts, month descending.
    pub fn list_receipts(&self, member_id: Uuid) -> Vec<Receipt> {
        let mut receipts: Vec<Receipt> = self
            .receipts
            .iter()
            .filter(|r| r.value().member_id == member_id)
            .map(|r| r.value().clone())
            .collect();
        receipts.sort_by(|a, b| b.month.cmp(&a.month));
        receipts
    }

    /// All receipts for a society, most recent payment first.
    pub fn society_receipts(&self, society_id: Uuid) -> Vec<Receipt> {
        let mut receipts: Vec<Receipt> = self
            .receipts
            .iter()
            .filter(|r| r.value().society_id == society_id)
            .map(|r| r.value().clone())
            .collect();
        receipts.sort_by(|a, b| b.payment_date.cmp(&a.payment_date));
        receipts
    }

    pub fn receipt_count(&self) -> usize {
        self.receipts.len()
    }
}

impl Default for PaymentLedger {
    fn default() -> Self {
        Self::new()
    }
}
