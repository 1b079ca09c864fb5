use std::{net::SocketAddr, sync::Arc};

use axum::http::HeaderValue;
use axum::Router;
use configs::{AppConfig, CorsConfig, ServerConfig};
use models::db::Store;
use service::auth::repo::mongo::MongoAuthRepository;
use service::auth::repository::AuthRepository;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, auth::ServerState};

/// Explicit origin list with credentials; methods and headers mirror the preflight.
pub fn build_cors(cfg: &CorsConfig) -> Result<CorsLayer, StartupError> {
    let origins = cfg
        .allowed_origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o)
                .map_err(|_| StartupError::InvalidConfig(format!("invalid CORS origin: {o}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if origins.is_empty() {
        warn!("no CORS origins configured; cross-origin requests will be refused");
    }
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

fn bind_addr(cfg: &ServerConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bad bind address {}:{}: {e}", cfg.host, cfg.port)))
}

/// Router over any repository; used by `run` and by tests with the mock.
pub fn build_app(repo: Arc<dyn AuthRepository>, cors: &CorsConfig) -> Result<Router, StartupError> {
    let state = ServerState::new(repo);
    Ok(routes::build_router(state, build_cors(cors)?))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
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
    info!("shutdown signal received");
}

/// Open the store, ensure the unique email index, serve until a shutdown signal,
/// then close the store.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let store = Store::connect(&cfg.database)
        .await
        .map_err(|e| StartupError::Store(e.to_string()))?;

    let repo = MongoAuthRepository::new(store.clone());
    repo.ensure_indexes()
        .await
        .map_err(|e| StartupError::Store(format!("cannot ensure unique email index: {e}")))?;

    let app = build_app(Arc::new(repo), &cfg.cors)?;

    let addr = bind_addr(&cfg.server)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, origins = ?cfg.cors.allowed_origins, "accounts server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    Ok(())
}
