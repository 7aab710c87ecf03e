//! Member directory
//!
//! The maintenance service does not own member or society records; it
//! resolves them through the society service. The trait keeps that seam
//! explicit so tests can substitute a static directory.

use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

use crate::error::PaymentError;
use crate::types::{MemberProfile, RateCard};

#[async_trait]
pub trait MemberDirectory: Send + Sync {
    async fn profile(&self, member_id: Uuid) -> Result<MemberProfile, PaymentError>;
    async fn rate_card(&self, society_id: Uuid) -> Result<RateCard, PaymentError>;
}

/// Directory backed by the society service's internal REST endpoints
pub struct HttpDirectory {
    base_url: String,
    http: reqwest::Client,
}

impl HttpDirectory {
    pub fn new(base_url: &str, timeout: Duration) -> samaj_core::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| samaj_core::SamajError::Config(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, PaymentError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .map_err(|e| PaymentError::StorageUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PaymentError::StorageUnavailable(format!(
                "directory returned {} for {}",
                response.status(),
                path
            )));
        }

        response
            .json()
            .await
            .map_err(|e| PaymentError::StorageUnavailable(e.to_string()))
    }
}

#[async_trait]
impl MemberDirectory for HttpDirectory {
    async fn profile(&self, member_id: Uuid) -> Result<MemberProfile, PaymentError> {
        self.fetch(&format!("/api/internal/members/{}", member_id))
            .await
    }

    async fn rate_card(&self, society_id: Uuid) -> Result<RateCard, PaymentError> {
        self.fetch(&format!("/api/internal/societies/{}", society_id))
            .await
    }
}
