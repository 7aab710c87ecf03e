//! Society Service Types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use samaj_core::{PhoneNumber, Role, UserType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated resident or chairman
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub phone_number: PhoneNumber,
    pub name: String,
    pub role: Role,
    pub society_id: Option<Uuid>,
    pub user_type: Option<UserType>,
    pub created_at: DateTime<Utc>,
}

impl Member {
    pub fn new(phone_number: PhoneNumber, name: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            phone_number,
            name,
            role,
            society_id: None,
            user_type: None,
            created_at: Utc::now(),
        }
    }
}

/// Bank account descriptor for a society
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankAccount {
    pub account_number: String,
    pub ifsc: String,
    pub bank_name: String,
}

/// A residential society
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Society {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub chairman_id: Uuid,
    pub bank_account: Option<BankAccount>,
    pub owner_maintenance_rate: Option<Decimal>,
    pub tenant_maintenance_rate: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

impl Society {
    pub fn new(name: String, address: String, chairman_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            address,
            chairman_id,
            bank_account: None,
            owner_maintenance_rate: None,
            tenant_maintenance_rate: None,
            created_at: Utc::now(),
        }
    }
}

/// Broadcast notification for a society.
///
/// Read marks live in a separate `(notification_id, member_id)` relation,
/// not on the message itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub society_id: Uuid,
    pub message: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Notification as served to a member, with their read flag resolved
#[derive(Debug, Clone, Serialize)]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: Notification,
    pub read: bool,
}
