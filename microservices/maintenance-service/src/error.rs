//! Payment lifecycle error taxonomy
//!
//! Every failure mode of the order/verify flow is a distinct kind so
//! clients can render a precise message and decide whether a retry makes
//! sense. Only `GatewayUnavailable` and `StorageUnavailable` are
//! retryable; `InvalidSignature` and `DuplicatePayment` are permanent.

use rust_decimal::Decimal;
use samaj_core::{Month, UserType};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("maintenance rate not configured for {0}s")]
    RateNotConfigured(UserType),

    #[error("amount {got} does not match the maintenance due of {expected}")]
    AmountMismatch { expected: Decimal, got: Decimal },

    #[error("maintenance already paid for {0}")]
    AlreadyPaid(Month),

    #[error("payment gateway unavailable: {0}")]
    GatewayUnavailable(String),

    #[error("payment order not found: {0}")]
    OrderNotFound(String),

    #[error("payment order already processed: {0}")]
    OrderAlreadyProcessed(String),

    #[error("payment signature mismatch for order {0}")]
    InvalidSignature(String),

    #[error("a receipt already exists for {0}")]
    DuplicatePayment(Month),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl PaymentError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::RateNotConfigured(_) => 422,
            Self::AmountMismatch { .. } => 400,
            Self::AlreadyPaid(_) => 409,
            Self::GatewayUnavailable(_) => 503,
            Self::OrderNotFound(_) => 404,
            Self::OrderAlreadyProcessed(_) => 409,
            Self::InvalidSignature(_) => 400,
            Self::DuplicatePayment(_) => 409,
            Self::StorageUnavailable(_) => 503,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::RateNotConfigured(_) => "RATE_NOT_CONFIGURED",
            Self::AmountMismatch { .. } => "AMOUNT_MISMATCH",
            Self::AlreadyPaid(_) => "ALREADY_PAID",
            Self::GatewayUnavailable(_) => "GATEWAY_UNAVAILABLE",
            Self::OrderNotFound(_) => "ORDER_NOT_FOUND",
            Self::OrderAlreadyProcessed(_) => "ORDER_ALREADY_PROCESSED",
            Self::InvalidSignature(_) => "INVALID_SIGNATURE",
            Self::DuplicatePayment(_) => "DUPLICATE_PAYMENT",
            Self::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
        }
    }
}
