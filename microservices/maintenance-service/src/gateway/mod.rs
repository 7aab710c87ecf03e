//! Gateway Adapter
//!
//! One trait, two implementations: the real Razorpay processor and a
//! deterministic mock for demo/test deployments. Which one runs is a
//! deployment decision made once at startup from configuration; request
//! handlers never branch on mock-ness, and a deployment configured with
//! real credentials never accepts mock signatures.

mod mock;
mod razorpay;

pub use mock::MockGateway;
pub use razorpay::RazorpayGateway;

use async_trait::async_trait;

use crate::error::PaymentError;
use crate::types::{GatewayMode, GatewayOrder};

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn mode(&self) -> GatewayMode;

    /// Caller-visible key the checkout UI needs; absent in mock mode.
    fn public_key(&self) -> Option<String>;

    /// Register an order with the processor.
    async fn create_remote_order(
        &self,
        amount_minor: u64,
        currency: &str,
        receipt_ref: &str,
    ) -> Result<GatewayOrder, PaymentError>;

    /// Check a completed payment's signature against this deployment's
    /// shared secret (or the documented mock pattern in mock mode).
    fn verify_signature(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        signature: &str,
    ) -> bool;
}
