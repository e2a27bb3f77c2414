use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use dotenvy::dotenv;

mod api;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod routes;
mod service;
mod store;
mod utils;

use config::Config;
use db::{init_db, run_migrations};

use crate::docs::ApiDoc;
use crate::service::attendance::AttendanceReconciler;
use crate::service::employee::EmployeeRegistry;
use crate::store::mysql::{MySqlAttendanceStore, MySqlEmployeeStore};
use crate::store::{AttendanceStore, EmployeeStore};
use crate::utils::clock::SystemClock;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Back office time clock is running"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "backoffice.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(addr = %config.server_addr, "Server starting...");

    let pool = init_db(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to connect to database")?;

    if config.run_migrations {
        run_migrations(&pool)
            .await
            .context("Failed to apply migrations")?;
    }

    let limiter = routes::build_limiter(config.rate_per_min)
        .context("Invalid rate limit configuration")?;

    let points: Arc<dyn AttendanceStore> = Arc::new(MySqlAttendanceStore::new(pool.clone()));
    let employees: Arc<dyn EmployeeStore> = Arc::new(MySqlEmployeeStore::new(pool.clone()));
    let reconciler = Data::new(AttendanceReconciler::new(
        points.clone(),
        Arc::new(SystemClock),
    ));
    let registry = Data::new(EmployeeRegistry::new(employees, points));
    let server_addr = config.server_addr.clone();
    let api_prefix = config.api_prefix.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .configure(api::extractor_errors)
            .app_data(reconciler.clone())
            .app_data(registry.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, &api_prefix, &limiter))
    })
    .bind(server_addr)?
    .run()
    .await?;

    info!("Server stopped, closing database pool");
    pool.close().await;

    Ok(())
}
