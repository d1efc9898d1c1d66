//! Immunoscreen
//!
//! Main entry point for the Immunoscreen service.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use immunoscreen::config::{self, LogConfig};
use immunoscreen::core::{AssessmentService, MlClient};
use immunoscreen::{api, db};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let config = config::load_config().context("Failed to load configuration")?;

    // Initialize logger
    init_tracing(&config.log);

    // Connect to database
    let database = db::Database::connect(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to connect to database")?;

    // Run migrations
    database
        .run_migrations()
        .await
        .context("Failed to run database migrations")?;

    let ml_client = MlClient::new(&config.ml).context("Invalid ML service configuration")?;
    tracing::info!(url = %ml_client.predict_url(), "using prediction service");

    // Create app state
    let app_state = web::Data::new(api::AppState {
        assessments: AssessmentService::new(database.clone(), Arc::new(ml_client)),
        db: database,
    });

    let allowed_origins = config.server.allowed_origins.clone();
    let bind = (config.server.host.clone(), config.server.port);
    tracing::info!(host = %bind.0, port = bind.1, "starting HTTP server");

    // Start HTTP server
    HttpServer::new(move || {
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allow_any_method()
            .allow_any_header();

        App::new()
            .app_data(app_state.clone())
            .wrap(cors)
            .wrap(TracingLogger::default())
            .configure(api::configure)
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
