use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use paydash_auth::BearerAuth;
use paydash_core::{AppError, AppResult, Payment, PaymentFilters, SortSpec};
use serde::{Deserialize, Serialize};

use super::service::PaymentService;

pub const PAYMENTS_PATH: &str = "/dashboard/v1/payments";

/// Query string of `GET /dashboard/v1/payments`.
#[derive(Debug, Default, Deserialize)]
pub struct PaymentListParams {
    pub status: Option<String>,
    pub id: Option<String>,
    pub sort: Option<String>,
}

/// Characters that delimit pairs in the cache key.
const RESERVED_FILTER_CHARS: [char; 2] = [';', '='];

impl PaymentListParams {
    /// Splits the query into filters and sort.
    ///
    /// # Errors
    ///
    /// `BadRequest` if a filter value contains `;` or `=`; such values would
    /// share a cache key with a different filter set.
    fn into_parts(self) -> AppResult<(PaymentFilters, SortSpec)> {
        let mut filters = PaymentFilters::new();
        for (name, value) in [("status", self.status), ("id", self.id)] {
            let Some(value) = value else { continue };
            if value.contains(RESERVED_FILTER_CHARS) {
                return Err(AppError::bad_request(format!(
                    "filter '{name}' must not contain ';' or '='"
                )));
            }
            filters.insert(name, value);
        }
        Ok((filters, SortSpec::parse(self.sort.unwrap_or_default())))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentListResponse {
    pub payments: Vec<Payment>,
}

/// `GET /dashboard/v1/payments?status=&id=&sort=`
pub async fn list_payments_handler(
    BearerAuth(auth): BearerAuth,
    State(service): State<Arc<PaymentService>>,
    params: Result<Query<PaymentListParams>, QueryRejection>,
) -> AppResult<Json<PaymentListResponse>> {
    let Query(params) = params.map_err(|rejection| {
        AppError::bad_request(format!("invalid query: {}", rejection.body_text()))
    })?;

    let (filters, sort) = params.into_parts()?;
    tracing::debug!(
        subject = %auth.subject(),
        token_expires_at = auth.expires_at(),
        filters = filters.len(),
        sort = %sort,
        "listing payments"
    );

    let payments = service.list(filters, sort).await?;
    Ok(Json(PaymentListResponse { payments }))
}
