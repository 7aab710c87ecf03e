//! Maintenance Service
//!
//! Monthly maintenance billing for registered societies:
//! - Per-society owner/tenant rate resolution
//! - Payment-order lifecycle against the payment gateway
//! - Signature verification and the receipts ledger
//! - Chairman-facing collection views
//!
//! The gateway adapter is picked at startup: real Razorpay when both
//! credentials are configured, the mock adapter otherwise.

#![allow(dead_code)]

use samaj_core::{HealthStatus, ReadinessStatus, Result, SamajService, ServiceRuntime, TokenKeys};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

mod api;
mod directory;
mod error;
mod gateway;
mod ledger;
mod orders;
mod rates;
mod types;

#[cfg(test)]
mod tests;

pub use directory::{HttpDirectory, MemberDirectory};
pub use error::PaymentError;
pub use gateway::{MockGateway, PaymentGateway, RazorpayGateway};
pub use ledger::PaymentLedger;
pub use orders::OrderManager;
pub use rates::RateResolver;
pub use types::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                "maintenance_service=debug"
                    .parse()
                    .expect("valid tracing directive"),
            ),
        )
        .json()
        .init();

    info!("Starting Maintenance Service");

    let service = Arc::new(MaintenanceService::new()?);
    ServiceRuntime::run(service).await
}

pub struct MaintenanceService {
    config: MaintenanceConfig,
    directory: Arc<dyn MemberDirectory>,
    manager: OrderManager,
    ledger: PaymentLedger,
    keys: TokenKeys,
    start_time: std::time::Instant,
}

#[derive(Debug, Clone)]
pub struct MaintenanceConfig {
    pub http_bind: String,
    pub society_service_url: String,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_expiry_secs: u64,
    pub razorpay_key_id: Option<String>,
    pub razorpay_key_secret: Option<String>,
    pub currency: String,
    pub stale_after_minutes: i64,
    pub sweep_interval_secs: u64,
    pub upstream_timeout_secs: u64,
}

impl MaintenanceConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            http_bind: std::env::var("HTTP_BIND").unwrap_or_else(|_| "0.0.0.0:8081".to_string()),
            society_service_url: std::env::var("SOCIETY_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            jwt_secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "change-me-in-production".to_string()),
            jwt_issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "samaj".to_string()),
            jwt_expiry_secs: std::env::var("JWT_EXPIRY_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30 * 24 * 3600),
            razorpay_key_id: std::env::var("RAZORPAY_KEY_ID")
                .ok()
                .filter(|s| !s.is_empty()),
            razorpay_key_secret: std::env::var("RAZORPAY_KEY_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
            currency: std::env::var("CURRENCY").unwrap_or_else(|_| "INR".to_string()),
            stale_after_minutes: std::env::var("STALE_AFTER_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            sweep_interval_secs: std::env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),
            upstream_timeout_secs: std::env::var("UPSTREAM_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        })
    }
}

impl MaintenanceService {
    pub fn new() -> Result<Self> {
        let config = MaintenanceConfig::from_env()?;
        let timeout = Duration::from_secs(config.upstream_timeout_secs);

        let gateway: Arc<dyn PaymentGateway> =
            match (&config.razorpay_key_id, &config.razorpay_key_secret) {
                (Some(key_id), Some(key_secret)) => {
                    info!("Payment gateway: Razorpay (live)");
                    Arc::new(RazorpayGateway::new(key_id, key_secret, timeout)?)
                }
                _ => {
                    info!("Payment gateway: mock (no credentials configured)");
                    Arc::new(MockGateway)
                }
            };

        let directory: Arc<dyn MemberDirectory> =
            Arc::new(HttpDirectory::new(&config.society_service_url, timeout)?);

        let ledger = PaymentLedger::new();
        let manager = OrderManager::new(
            gateway,
            ledger.clone(),
            chrono::Duration::minutes(config.stale_after_minutes),
            &config.currency,
        );
        let keys = TokenKeys::new(&config.jwt_secret, &config.jwt_issuer, config.jwt_expiry_secs);

        Ok(Self {
            config,
            directory,
            manager,
            ledger,
            keys,
            start_time: std::time::Instant::now(),
        })
    }
}

#[async_trait::async_trait]
impl SamajService for MaintenanceService {
    fn service_id(&self) -> &'static str {
        "maintenance-service"
    }

    async fn health(&self) -> HealthStatus {
        HealthStatus {
            healthy: true,
            service_id: self.service_id().to_string(),
            version: self.version().to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    async fn ready(&self) -> ReadinessStatus {
        ReadinessStatus {
            ready: true,
            dependencies: vec![],
        }
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down Maintenance Service");
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        info!(http = %self.config.http_bind, "Starting Maintenance Service HTTP server");

        // Periodic sweep for orders abandoned in the gateway checkout.
        let sweeper = self.manager.clone();
        let interval = Duration::from_secs(self.config.sweep_interval_secs);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let swept = sweeper.sweep_stale();
                if swept > 0 {
                    debug!(swept, "Stale order sweep completed");
                }
            }
        });

        let rest_router = api::rest::create_router(
            self.directory.clone(),
            self.manager.clone(),
            self.ledger.clone(),
            self.keys.clone(),
        );

        let listener = tokio::net::TcpListener::bind(&self.config.http_bind).await?;
        axum::serve(listener, rest_router).await?;

        Ok(())
    }
}
