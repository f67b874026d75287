use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, FromRef},
    middleware,
    routing::get,
};
use paydash_auth::{
    AuthService, AuthState, http::auth_routes, middleware::authentication_middleware,
};
use paydash_db_memory::{InMemoryPaymentStore, InMemoryUserStore};
use paydash_db_postgres::{PostgresPaymentStore, PostgresUserStore, create_pool};
use paydash_storage::{DynKeyValueStore, DynPaymentQuery, DynUserLookup};
use serde_json::json;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};

use crate::{
    cache::create_kv_store,
    config::{AppConfig, StorageBackend},
    payments::{PAYMENTS_PATH, PaymentService, list_payments_handler},
};

pub const HEALTH_PATH: &str = "/healthz";

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    pub payments: Arc<PaymentService>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<AppState> for Arc<PaymentService> {
    fn from_ref(state: &AppState) -> Self {
        state.payments.clone()
    }
}

impl AppState {
    /// Wires the services over already-constructed stores.
    pub fn from_stores(
        cfg: &AppConfig,
        users: DynUserLookup,
        payments: DynPaymentQuery,
        kv: DynKeyValueStore,
    ) -> Self {
        let service = AuthService::new(&cfg.auth, users, kv.clone());
        let cache = cfg.cache.enabled.then_some(kv);
        let payments = PaymentService::new(
            payments,
            cache,
            cfg.cache.timeout(),
            cfg.auth.store_timeout(),
        );
        Self {
            auth: AuthState::new(Arc::new(service)),
            payments: Arc::new(payments),
        }
    }
}

/// Connects the configured backends and builds the application state.
///
/// Any backend that is configured but unreachable aborts startup.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let (users, payments): (DynUserLookup, DynPaymentQuery) = match cfg.storage.backend {
        StorageBackend::Postgres => {
            let pool = create_pool(&cfg.storage.postgres).await?;
            (
                Arc::new(PostgresUserStore::new(pool.clone())),
                Arc::new(PostgresPaymentStore::new(pool)),
            )
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; data is not persisted");
            (
                Arc::new(InMemoryUserStore::new()),
                Arc::new(InMemoryPaymentStore::new()),
            )
        }
    };

    let kv = create_kv_store(&cfg.redis).await?;

    Ok(AppState::from_stores(cfg, users, payments, kv))
}

pub fn build_app(state: AppState, cfg: &AppConfig) -> Router {
    let body_limit = cfg.server.body_limit_bytes;

    let protected = Router::new()
        .route(PAYMENTS_PATH, get(list_payments_handler))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            authentication_middleware,
        ));

    Router::new()
        .route(HEALTH_PATH, get(healthz))
        .merge(auth_routes())
        .merge(protected)
        .with_state(state)
        .layer(TimeoutLayer::new(cfg.request_timeout()))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri().path(),
                        http.status_code = Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request completed"
                        );
                    },
                ),
        )
        .layer(DefaultBodyLimit::max(body_limit))
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub struct PaydashServer {
    addr: SocketAddr,
    app: Router,
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub async fn build(self) -> anyhow::Result<PaydashServer> {
        let state = build_state(&self.config).await?;
        let app = build_app(state, &self.config);

        Ok(PaydashServer {
            addr: self.addr,
            app,
        })
    }
}

impl PaydashServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
