//! Auth Service
//!
//! Phone OTP issuance/verification and JWT minting.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::Rng;
use samaj_core::{PhoneNumber, Result, Role, SamajError, TokenKeys};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct OtpEntry {
    code: String,
    expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AuthService {
    /// Pending OTPs keyed by normalized phone number
    otps: Arc<DashMap<String, OtpEntry>>,
    keys: TokenKeys,
    otp_ttl: Duration,
}

impl AuthService {
    pub fn new(keys: TokenKeys, otp_ttl_minutes: i64) -> Self {
        Self {
            otps: Arc::new(DashMap::new()),
            keys,
            otp_ttl: Duration::minutes(otp_ttl_minutes),
        }
    }

    /// Issue a 6-digit OTP for a phone number, replacing any pending one.
    ///
    /// An SMS gateway would deliver this in production; for now the code is
    /// logged and returned to the caller.
    pub fn issue_otp(&self, phone: &PhoneNumber) -> String {
        let code = format!("{:06}", rand::thread_rng().gen_range(0..=999_999u32));
        self.otps.insert(
            phone.as_str().to_string(),
            OtpEntry {
                code: code.clone(),
                expires_at: Utc::now() + self.otp_ttl,
            },
        );

        info!(phone = %phone, "OTP issued");
        code
    }

    /// Check an OTP without consuming it.
    pub fn check_otp(&self, phone: &PhoneNumber, code: &str) -> Result<()> {
        let entry = self
            .otps
            .get(phone.as_str())
            .ok_or_else(|| SamajError::Auth("OTP not found, request a new one".to_string()))?;

        if entry.expires_at < Utc::now() {
            return Err(SamajError::Auth(
                "OTP expired, request a new one".to_string(),
            ));
        }
        if entry.code != code {
            return Err(SamajError::Auth("Invalid OTP".to_string()));
        }
        Ok(())
    }

    /// Remove a used OTP so it cannot be replayed.
    pub fn consume_otp(&self, phone: &PhoneNumber) {
        self.otps.remove(phone.as_str());
    }

    pub fn generate_token(&self, member_id: Uuid, phone: &PhoneNumber, role: Role) -> Result<String> {
        self.keys.generate(member_id, phone, role)
    }

    pub fn keys(&self) -> &TokenKeys {
        &self.keys
    }
}
