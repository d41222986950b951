//! # API Shared
//!
//! Shared definitions for the clinic APIs.
//!
//! Contains:
//! - Request/response types (`dto` module) with OpenAPI schemas
//! - Shared services like `HealthService`
//!
//! Used by `clinic-api-rest` and the `clinic-run` binary.

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
