//! Rate Resolver
//!
//! Determines the monthly amount owed by a member from the society's
//! configured rates and the member's occupancy type. Pure; the order
//! manager recomputes through this on every order so client-supplied
//! amounts are never trusted.

use rust_decimal::Decimal;
use samaj_core::Month;

use crate::error::PaymentError;
use crate::types::{MaintenanceDue, Membership, RateCard};

pub struct RateResolver;

impl RateResolver {
    /// Resolve the maintenance due for a member/month.
    ///
    /// An unset or zero rate is not a free month: order creation against
    /// it must fail, so this reports `RateNotConfigured` instead of
    /// silently resolving to zero.
    pub fn resolve_due(
        membership: &Membership,
        rates: &RateCard,
        month: Month,
    ) -> Result<MaintenanceDue, PaymentError> {
        if membership.society_id != rates.society_id {
            return Err(PaymentError::StorageUnavailable(
                "directory returned a rate card for the wrong society".to_string(),
            ));
        }

        let amount = rates
            .rate_for(membership.user_type)
            .filter(|amount| *amount > Decimal::ZERO)
            .ok_or(PaymentError::RateNotConfigured(membership.user_type))?;

        Ok(MaintenanceDue {
            amount,
            user_type: membership.user_type,
            month,
        })
    }
}
