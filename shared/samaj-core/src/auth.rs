//! Bearer-token claims shared between services
//!
//! The society service mints tokens after OTP verification; the
//! maintenance service validates the same tokens, so both build their
//! keys from the same secret and issuer configuration.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{PhoneNumber, Role};
use crate::error::{Result, SamajError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Member id
    pub sub: String,
    pub iss: String,
    pub phone_number: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl Claims {
    pub fn member_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| SamajError::Auth("malformed subject claim".to_string()))
    }
}

#[derive(Clone)]
pub struct TokenKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    expiry_secs: u64,
}

impl TokenKeys {
    pub fn new(secret: &str, issuer: &str, expiry_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
            expiry_secs,
        }
    }

    /// Generate an access token for a member
    pub fn generate(&self, member_id: Uuid, phone: &PhoneNumber, role: Role) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.expiry_secs as i64);

        let claims = Claims {
            sub: member_id.to_string(),
            iss: self.issuer.clone(),
            phone_number: phone.as_str().to_string(),
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| SamajError::Internal(e.to_string()))
    }

    /// Validate a token and return its claims
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| SamajError::Auth(e.to_string()))?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        let keys = TokenKeys::new("test-secret", "samaj", 3600);
        let member_id = Uuid::new_v4();
        let phone = PhoneNumber::new("9876543210");

        let token = keys.generate(member_id, &phone, Role::Chairman).unwrap();
        let claims = keys.validate(&token).unwrap();

        assert_eq!(claims.member_id().unwrap(), member_id);
        assert_eq!(claims.phone_number, "919876543210");
        assert_eq!(claims.role, Role::Chairman);
    }

    #[test]
    fn token_from_wrong_secret_is_rejected() {
        let minting = TokenKeys::new("secret-a", "samaj", 3600);
        let checking = TokenKeys::new("secret-b", "samaj", 3600);

        let token = minting
            .generate(Uuid::new_v4(), &PhoneNumber::new("9876543210"), Role::User)
            .unwrap();
        assert!(checking.validate(&token).is_err());
    }

    #[test]
    fn token_with_wrong_issuer_is_rejected() {
        let minting = TokenKeys::new("secret", "other-platform", 3600);
        let checking = TokenKeys::new("secret", "samaj", 3600);

        let token = minting
            .generate(Uuid::new_v4(), &PhoneNumber::new("9876543210"), Role::User)
            .unwrap();
        assert!(checking.validate(&token).is_err());
    }
}
