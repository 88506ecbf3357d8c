//! Sheetwrap API Server implementation
//!
//! HTTP JSON API using Axum. Exposes reflow, projection, conversion and
//! template memory lookups for tools that cannot run the CLI.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::handlers;
use crate::config::FormatterConfig;
use crate::formatter::{Formatter, GeminiFormatter};
use crate::memory::{InMemoryStore, JsonFileStore, TemplateMemory, TemplateStore};

/// API Server configuration
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Template memory file; process-local memory when absent
    pub memory: Option<PathBuf>,
    pub formatter: FormatterConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            memory: None,
            formatter: FormatterConfig::default(),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub version: String,
    pub store: Box<dyn TemplateStore>,
    /// `None` when no API key is configured; conversions are then refused
    pub formatter: Option<Arc<dyn Formatter>>,
}

impl AppState {
    pub fn new(store: Box<dyn TemplateStore>, formatter: Option<Arc<dyn Formatter>>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            store,
            formatter,
        }
    }

    /// Build state from configuration
    pub fn from_config(config: &ApiConfig) -> Self {
        let store: Box<dyn TemplateStore> = match &config.memory {
            Some(path) => Box::new(JsonFileStore::new(path)),
            None => Box::new(InMemoryStore::new()),
        };

        let formatter = match GeminiFormatter::new(&config.formatter) {
            Ok(formatter) => Some(Arc::new(formatter) as Arc<dyn Formatter>),
            Err(e) => {
                warn!("Conversions disabled: {}", e);
                None
            }
        };

        Self::new(store, formatter)
    }

    pub fn memory(&self) -> TemplateMemory<&dyn TemplateStore> {
        TemplateMemory::new(self.store.as_ref())
    }
}

/// Build the router with all routes and middleware
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        // Core API endpoints
        .route("/api/v1/reflow", post(handlers::reflow))
        .route("/api/v1/project", post(handlers::project))
        .route("/api/v1/convert", post(handlers::convert))
        .route("/api/v1/memory", get(handlers::memory_list))
        .route("/api/v1/memory/:signature", get(handlers::memory_show))
        // State and middleware
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the API server
pub async fn run_api_server(config: ApiConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("SHEETWRAP_LOG")
                .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| "sheetwrap=info,tower_http=info".into()),
        )
        .init();

    let state = Arc::new(AppState::from_config(&config));
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("🔥 Sheetwrap API Server starting on http://{}", addr);
    info!("   Endpoints: /api/v1/reflow, /api/v1/project, /api/v1/convert, /api/v1/memory");
    info!("   Health: /health, Version: /version");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Sheetwrap API Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}
