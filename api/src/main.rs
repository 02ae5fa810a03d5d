use anyhow::Context;
use axum::{
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    handler::Handler,
    middleware,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use common::Entry;
use std::sync::Arc;
use tera::Tera;
use tower::ServiceBuilder;

mod auth;
mod config;
mod error;
mod handlers;
#[cfg(test)]
mod in_memory_store;
mod pg_store;
mod utils;

#[cfg(test)]
mod tests;

use config::Config;
use error::StoreError;
#[cfg(test)]
use in_memory_store::InMemoryStore;
use pg_store::PgStore;

/// Largest accepted `POST /new` body.
pub const MAX_BODY_BYTES: usize = 1 << 20;

pub const LAST_TEMPLATE: &str = "last.html";

/// The journal's backing store. Every call goes straight to storage.
#[axum::async_trait]
pub trait EntryStore: Send + Sync {
    async fn add(&self, entry: &Entry) -> Result<(), StoreError>;

    /// Entries with `start <= time <= end`, oldest first.
    async fn query(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Entry>, StoreError>;

    /// The most recently inserted entry, or [`StoreError::NotFound`].
    async fn last(&self) -> Result<Entry, StoreError>;

    async fn health(&self) -> Result<(), StoreError>;

    async fn close(&self);
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn EntryStore>,
    pub cfg: Arc<Config>,
    pub templates: Arc<Tera>,
}

impl AppState {
    pub fn new(db: impl EntryStore + 'static, cfg: Config) -> Result<Self, tera::Error> {
        let mut templates = Tera::default();
        templates.add_raw_template(LAST_TEMPLATE, include_str!("../templates/last.html"))?;

        Ok(Self {
            db: Arc::new(db),
            cfg: Arc::new(cfg),
            templates: Arc::new(templates),
        })
    }
}

pub fn app_builder(state: AppState) -> Router {
    // Auth wraps the handler only, so other methods on /new still get 405.
    let new_entry = handlers::new_entry.layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_bearer,
    ));

    Router::new()
        .route("/last", get(handlers::last))
        .route("/query", get(handlers::query))
        .route("/health", get(handlers::health))
        .route(
            "/new",
            post(new_entry).layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handlers::handle_timeout))
                .timeout(state.cfg.request_timeout()),
        )
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("listen for shutdown signal: {err}");
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::from_env().context("load configuration")?;

    // set up logging
    tracing_subscriber::fmt()
        .with_env_filter(cfg.log_level.as_str())
        .init();

    let db = PgStore::connect(&cfg.database_url, cfg.db_timeout())
        .await
        .context("connect to database")?;
    tracing::info!("database ready");

    let addr = cfg.socket_addr();
    let state = AppState::new(db, cfg).context("load templates")?;
    let app = app_builder(state.clone());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;

    tracing::info!("Server running on http://{addr}");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    state.db.close().await;
    served.context("serve")
}
