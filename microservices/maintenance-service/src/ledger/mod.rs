mod service;

pub use service::PaymentLedger;
