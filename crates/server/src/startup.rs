use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_from_env;
use configs::AppConfig;
use dotenvy::dotenv;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use service::clients::OkapiClient;
use service::location::ConfiguredLocationMappings;
use service::retrieval::repo::seaorm::SeaOrmRetrievalQueueRepository;
use service::{RetrievalQueueService, ReturnItemService};

use crate::errors::StartupError;
use crate::routes::{self, ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Wire the services over one database pool and one upstream client.
pub fn build_state(cfg: &AppConfig, db: DatabaseConnection) -> Result<ServerState, StartupError> {
    let okapi = Arc::new(OkapiClient::from_config(&cfg.okapi)?);
    let repo = Arc::new(SeaOrmRetrievalQueueRepository { db });
    let locations = Arc::new(ConfiguredLocationMappings::from_config(&cfg.location_mappings));
    if locations.is_empty() {
        warn!("no location mappings configured; item moved events will all be ignored");
    }

    let retrievals = RetrievalQueueService::new(repo.clone(), locations, okapi.clone(), okapi.clone());
    let returns = ReturnItemService::new(okapi.clone(), okapi.clone(), repo, okapi);
    Ok(ServerState { retrievals: Arc::new(retrievals), returns: Arc::new(returns) })
}

/// Public entry: load config, prepare the database and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = AppConfig::load_or_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;

    let db = models::db::connect_with_config(&models::db::DatabaseConfig::from(&cfg.database)).await?;
    models::db::test_connection(&db).await?;
    if cfg.database.run_migrations {
        migration::Migrator::up(&db, None).await?;
        info!("database migrations applied");
    }

    let state = build_state(&cfg, db)?;
    let app: Router = routes::build_router(state, build_cors());

    let addr = bind_addr(&cfg)?;
    info!(%addr, okapi = %cfg.okapi.url, tenant = %cfg.okapi.tenant, "starting remote storage server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;
    Ok(())
}
