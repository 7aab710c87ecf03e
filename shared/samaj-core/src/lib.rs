//! Samaj Core - Shared domain types and service infrastructure
//!
//! This crate provides:
//! - Standard service trait all microservices must implement
//! - Common domain types (Month, PhoneNumber, member roles)
//! - Bearer-token claims shared between services
//! - Error handling utilities

pub mod auth;
pub mod domain;
pub mod error;
pub mod service;

pub use auth::{Claims, TokenKeys};
pub use domain::*;
pub use error::{Result, SamajError};
pub use service::{DependencyStatus, HealthStatus, ReadinessStatus, SamajService, ServiceRuntime};
