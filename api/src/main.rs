use std::path::PathBuf;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing::info;

use tw_api::app::create_app;
use tw_api::routes::auth::AppState;
use tw_api::telemetry::init_tracing;
use tw_core::services::TokenManager;
use tw_infra::connect_cache;
use tw_shared::config::AppConfig;

/// Optional path of the configuration file, overriding the per-environment default
const CONFIG_PATH_VAR: &str = "TW_CONFIG";

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config_path = std::env::var(CONFIG_PATH_VAR).ok().map(PathBuf::from);
    let config =
        AppConfig::load(config_path.as_deref()).context("failed to load configuration")?;

    init_tracing(&config.logging);
    info!(
        environment = %config.environment,
        algorithm = %config.jwt.algorithm,
        "Starting Tokenwarden API Server"
    );

    let cache = connect_cache(&config.cache)
        .await
        .context("failed to initialize revocation cache")?;
    let tokens = TokenManager::with_system_clock(&config.jwt, cache)
        .context("failed to initialize token manager")?;
    let state = web::Data::new(AppState::new(tokens));

    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    let mut server = HttpServer::new(move || create_app(state.clone()));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await?;

    info!("Server stopped");
    Ok(())
}
