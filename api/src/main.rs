use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use tk_api::config::ApiConfig;
use tk_api::telemetry::init_tracing;
use tk_api::{routes, AppState, JwtAuthentication};
use tk_core::TokenLifecycleManager;
use tk_infra::RepositoryFactory;
use tracing::info;
use tracing_actix_web::TracingLogger;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("Failed to load configuration")?;
    init_tracing(&config.app.logging)?;

    info!("Starting TokenKeep API Server");

    let factory = RepositoryFactory::new();
    let repository = factory
        .create(&config.app.storage)
        .await
        .context("Failed to create cache repository")?;
    let manager = Arc::new(TokenLifecycleManager::new(config.app.auth.clone(), repository)?);

    let state = web::Data::new(AppState::new(Arc::clone(&manager)));
    let authentication = JwtAuthentication::new(manager).exclude(config.server.exclude_paths.clone());

    let (host, port) = config.server.bind_address();
    info!("Server will bind to: {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(authentication.clone())
            .wrap(TracingLogger::default())
            .configure(routes::configure)
    })
    .bind((host, port))?
    .run()
    .await?;

    Ok(())
}
