//! Razorpay gateway

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use std::time::Duration;

use crate::error::PaymentError;
use crate::gateway::PaymentGateway;
use crate::types::{GatewayMode, GatewayOrder};

const ORDERS_URL: &str = "https://api.razorpay.com/v1/orders";

type HmacSha256 = Hmac<Sha256>;

pub struct RazorpayGateway {
    key_id: String,
    key_secret: String,
    http: reqwest::Client,
}

impl RazorpayGateway {
    pub fn new(key_id: &str, key_secret: &str, timeout: Duration) -> samaj_core::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| samaj_core::SamajError::Config(e.to_string()))?;

        Ok(Self {
            key_id: key_id.to_string(),
            key_secret: key_secret.to_string(),
            http,
        })
    }

    /// Expected signature for an (order, payment) pair:
    /// hex(HMAC-SHA256(key_secret, "{order_id}|{payment_id}")).
    fn expected_signature(&self, gateway_order_id: &str, gateway_payment_id: &str) -> Option<String> {
        let mut mac = HmacSha256::new_from_slice(self.key_secret.as_bytes()).ok()?;
        mac.update(format!("{}|{}", gateway_order_id, gateway_payment_id).as_bytes());
        Some(hex::encode(mac.finalize().into_bytes()))
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    fn mode(&self) -> GatewayMode {
        GatewayMode::Real
    }

    fn public_key(&self) -> Option<String> {
        Some(self.key_id.clone())
    }

    async fn create_remote_order(
        &self,
        amount_minor: u64,
        currency: &str,
        receipt_ref: &str,
    ) -> Result<GatewayOrder, PaymentError> {
        let payload = json!({
            "amount": amount_minor,
            "currency": currency,
            "receipt": receipt_ref,
            "payment_capture": 1
        });

        let response = self
            .http
            .post(ORDERS_URL)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&payload)
            .send()
            .await
            .map_err(|e| PaymentError::GatewayUnavailable(e.to_string()))?;

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PaymentError::GatewayUnavailable(e.to_string()))?;

        let order_id = result["id"].as_str().filter(|id| !id.is_empty()).ok_or_else(|| {
            PaymentError::GatewayUnavailable(
                result["error"]["description"]
                    .as_str()
                    .unwrap_or("order creation rejected")
                    .to_string(),
            )
        })?;

        Ok(GatewayOrder {
            gateway_order_id: order_id.to_string(),
            public_key: Some(self.key_id.clone()),
            mode: GatewayMode::Real,
        })
    }

    fn verify_signature(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        signature: &str,
    ) -> bool {
        match self.expected_signature(gateway_order_id, gateway_payment_id) {
            Some(expected) => expected == signature,
            None => false,
        }
    }
}
