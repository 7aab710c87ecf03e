//! Mock gateway
//!
//! Used when no gateway credentials are configured. Synthesizes order ids
//! locally and accepts only the documented mock identifier pattern
//! (`pay_mock_*` payment id with a `sig_mock_*` signature), so clients can
//! simulate checkout without a processor round trip.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::PaymentError;
use crate::gateway::PaymentGateway;
use crate::types::{GatewayMode, GatewayOrder};

pub const MOCK_ORDER_PREFIX: &str = "order_mock_";
pub const MOCK_PAYMENT_PREFIX: &str = "pay_mock_";
pub const MOCK_SIGNATURE_PREFIX: &str = "sig_mock_";

pub struct MockGateway;

#[async_trait]
impl PaymentGateway for MockGateway {
    fn mode(&self) -> GatewayMode {
        GatewayMode::Mock
    }

    fn public_key(&self) -> Option<String> {
        None
    }

    async fn create_remote_order(
        &self,
        _amount_minor: u64,
        _currency: &str,
        _receipt_ref: &str,
    ) -> Result<GatewayOrder, PaymentError> {
        let suffix = Uuid::new_v4().simple().to_string();
        Ok(GatewayOrder {
            gateway_order_id: format!("{}{}", MOCK_ORDER_PREFIX, &suffix[..8]),
            public_key: None,
            mode: GatewayMode::Mock,
        })
    }

    fn verify_signature(
        &self,
        _gateway_order_id: &str,
        gateway_payment_id: &str,
        signature: &str,
    ) -> bool {
        gateway_payment_id.starts_with(MOCK_PAYMENT_PREFIX)
            && signature.starts_with(MOCK_SIGNATURE_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn synthesizes_prefixed_order_ids() {
        let order = MockGateway
            .create_remote_order(200_000, "INR", "maint-test")
            .await
            .unwrap();
        assert!(order.gateway_order_id.starts_with(MOCK_ORDER_PREFIX));
        assert_eq!(order.mode, GatewayMode::Mock);
        assert!(order.public_key.is_none());
    }

    #[test]
    fn accepts_only_the_mock_pattern() {
        let gw = MockGateway;
        assert!(gw.verify_signature("order_mock_1", "pay_mock_1700000000", "sig_mock_1700000000"));
        assert!(!gw.verify_signature("order_mock_1", "pay_real_123", "sig_mock_1"));
        assert!(!gw.verify_signature("order_mock_1", "pay_mock_1", "real-signature"));
    }
}
