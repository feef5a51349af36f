use std::sync::Arc;

use axum::Router;
use configs::AppConfig;
use models::db::DbGateway;
use service::songs::{repo::seaorm::SeaOrmSongRepository, SongService};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire gateway, repository and service into the application router.
pub fn build_app(gateway: Arc<DbGateway>, cfg: &AppConfig) -> Router {
    let repo = Arc::new(SeaOrmSongRepository::new(gateway));
    let state = ServerState {
        songs: Arc::new(SongService::new(repo)),
        expose_error_details: !cfg.app.is_production(),
    };
    routes::build_router(state, build_cors())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(err = %e, "failed to listen for ctrl_c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(err = %e, "failed to listen for SIGTERM");
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

/// Public entry: connect the database, serve HTTP until a shutdown signal,
/// then release the connection.
pub async fn run(cfg: AppConfig) -> Result<(), StartupError> {
    let addr = cfg
        .server
        .bind_addr()
        .map_err(|e| StartupError::InvalidConfig(e.to_string()))?;

    let gateway = Arc::new(DbGateway::new());
    gateway
        .connect(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;

    let app = build_app(Arc::clone(&gateway), &cfg);

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(anyhow::Error::from)?;
    info!(%addr, environment = %cfg.app.environment, "songs api listening");
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Err(e) = gateway.disconnect().await {
        warn!(err = %e, "database disconnect failed");
    }
    served.map_err(anyhow::Error::from)?;
    info!("server stopped");
    Ok(())
}
