//! Core domain types for the Paydash dashboard backend.
//!
//! This crate has no I/O. It defines:
//!
//! - [`Principal`]: an authenticated dashboard user
//! - [`Payment`] and [`PaymentStatus`]: rows served by the listing endpoint
//! - [`PaymentFilters`], [`SortSpec`], [`PaymentListQuery`]: the listing query model
//! - [`AppError`]: the four-kind error taxonomy and its HTTP envelope

pub mod error;
pub mod payment;
pub mod principal;
pub mod query;
pub mod response;

pub use error::{AppError, BoxError, ErrorCode};
pub use payment::{Payment, PaymentStatus, UnknownPaymentStatus};
pub use principal::Principal;
pub use query::{
    FilterField, PaymentFilters, PaymentListQuery, SortClause, SortDirection, SortField, SortSpec,
};
pub use response::ErrorEnvelope;

/// Result type for Paydash operations.
pub type AppResult<T> = Result<T, AppError>;
