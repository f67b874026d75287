//! Payments listing: cache-aside service and HTTP handler.

mod handlers;
mod service;

pub use handlers::{PAYMENTS_PATH, PaymentListParams, PaymentListResponse, list_payments_handler};
pub use service::{CACHE_TTL, PaymentService, cache_key};
