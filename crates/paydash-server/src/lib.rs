//! Paydash dashboard backend: configuration, backend wiring and HTTP surface.
//!
//! Routes:
//!
//! - `POST /dashboard/v1/auth/login`, `POST /dashboard/v1/auth/refresh` (public)
//! - `GET /dashboard/v1/payments` (bearer access token required)
//! - `GET /healthz`

pub mod cache;
pub mod config;
pub mod observability;
pub mod payments;
pub mod server;

pub use config::AppConfig;
pub use observability::{
    apply_configured_level, apply_logging_level, init_tracing, init_tracing_with_level,
};
pub use payments::PaymentService;
pub use server::{AppState, PaydashServer, ServerBuilder, build_app, build_state};
