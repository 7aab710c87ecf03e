//! Maintenance Service Types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use samaj_core::{Month, Role, UserType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Member record as served by the society service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberProfile {
    pub id: Uuid,
    pub name: String,
    pub phone_number: String,
    pub role: Role,
    pub society_id: Option<Uuid>,
    pub user_type: Option<UserType>,
}

impl MemberProfile {
    /// Society membership, if the member has joined one.
    pub fn membership(&self) -> Option<Membership> {
        Some(Membership {
            member_id: self.id,
            society_id: self.society_id?,
            user_type: self.user_type?,
        })
    }
}

/// A member's resolved society membership
#[derive(Debug, Clone, Copy)]
pub struct Membership {
    pub member_id: Uuid,
    pub society_id: Uuid,
    pub user_type: UserType,
}

/// Society-level maintenance rates as served by the society service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateCard {
    #[serde(rename = "id")]
    pub society_id: Uuid,
    #[serde(rename = "name")]
    pub society_name: String,
    pub chairman_id: Uuid,
    #[serde(rename = "owner_maintenance_rate")]
    pub owner_rate: Option<Decimal>,
    #[serde(rename = "tenant_maintenance_rate")]
    pub tenant_rate: Option<Decimal>,
}

impl RateCard {
    pub fn rate_for(&self, user_type: UserType) -> Option<Decimal> {
        match user_type {
            UserType::Owner => self.owner_rate,
            UserType::Tenant => self.tenant_rate,
        }
    }
}

/// Monthly amount owed by a member; derived, never stored
#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceDue {
    pub amount: Decimal,
    pub user_type: UserType,
    pub month: Month,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Verified,
    Failed,
    Abandoned,
}

/// Staged payment intent registered with the gateway before completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub id: Uuid,
    pub member_id: Uuid,
    pub society_id: Uuid,
    pub month: Month,
    pub amount: Decimal,
    pub gateway_order_id: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// What the client needs to hand the order to the gateway checkout
#[derive(Debug, Clone, Serialize)]
pub struct OrderDescriptor {
    pub order_id: Uuid,
    pub gateway_order_id: String,
    pub amount: Decimal,
    /// Amount in minor units (paise)
    pub amount_minor: u64,
    pub currency: String,
    pub gateway_key: Option<String>,
    pub mock_mode: bool,
    pub month: Month,
}

/// Durable record of a completed, verified payment. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub id: Uuid,
    pub order_id: Uuid,
    pub member_id: Uuid,
    pub society_id: Uuid,
    pub month: Month,
    pub amount: Decimal,
    pub gateway_payment_id: String,
    pub gateway_signature: String,
    pub payment_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayMode {
    Real,
    Mock,
}

/// Order descriptor as returned by the gateway adapter
#[derive(Debug, Clone)]
pub struct GatewayOrder {
    pub gateway_order_id: String,
    pub public_key: Option<String>,
    pub mode: GatewayMode,
}
