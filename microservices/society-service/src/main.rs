//! Society Service
//!
//! Resident-facing identity and society management:
//! - Phone OTP authentication with JWT sessions
//! - Society registration, bank details, maintenance rates
//! - Membership (owner/tenant) and member listing
//! - Broadcast notifications with per-member read marks

#![allow(dead_code)]

use samaj_core::{HealthStatus, ReadinessStatus, Result, SamajService, ServiceRuntime, TokenKeys};
use std::sync::Arc;
use tracing::info;

mod api;
mod auth;
mod notifications;
mod registry;
mod types;

#[cfg(test)]
mod tests;

pub use auth::AuthService;
pub use notifications::NotificationService;
pub use registry::RegistryService;
pub use types::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("society_service=debug".parse().expect("valid tracing directive")),
        )
        .json()
        .init();

    info!("Starting Society Service");

    let service = Arc::new(SocietyService::new()?);
    ServiceRuntime::run(service).await
}

pub struct SocietyService {
    config: SocietyConfig,
    auth_service: AuthService,
    registry: RegistryService,
    notifications: NotificationService,
    start_time: std::time::Instant,
}

#[derive(Debug, Clone)]
pub struct SocietyConfig {
    pub http_bind: String,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_expiry_secs: u64,
    pub otp_ttl_minutes: i64,
}

impl SocietyConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            http_bind: std::env::var("HTTP_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            jwt_secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "change-me-in-production".to_string()),
            jwt_issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "samaj".to_string()),
            jwt_expiry_secs: std::env::var("JWT_EXPIRY_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30 * 24 * 3600),
            otp_ttl_minutes: std::env::var("OTP_TTL_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        })
    }
}

impl SocietyService {
    pub fn new() -> Result<Self> {
        let config = SocietyConfig::from_env()?;

        let keys = TokenKeys::new(&config.jwt_secret, &config.jwt_issuer, config.jwt_expiry_secs);
        let auth_service = AuthService::new(keys, config.otp_ttl_minutes);
        let registry = RegistryService::new();
        let notifications = NotificationService::new();

        Ok(Self {
            config,
            auth_service,
            registry,
            notifications,
            start_time: std::time::Instant::now(),
        })
    }
}

#[async_trait::async_trait]
impl SamajService for SocietyService {
    fn service_id(&self) -> &'static str {
        "society-service"
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
        info!("Shutting down Society Service");
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        info!(http = %self.config.http_bind, "Starting Society Service HTTP server");

        let rest_router = api::rest::create_router(
            self.auth_service.clone(),
            self.registry.clone(),
            self.notifications.clone(),
        );

        let listener = tokio::net::TcpListener::bind(&self.config.http_bind).await?;
        axum::serve(listener, rest_router).await?;

        Ok(())
    }
}
