use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use dotenvy::dotenv;
use std::sync::Arc;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod service;
mod store;
mod utils;

use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use crate::routes::Limiters;
use crate::service::attendance::AttendanceService;
use crate::service::reasons::ReasonService;
use crate::service::roster::RosterService;
use crate::service::work_day::WorkClock;
use crate::store::EmployeeDirectory;
use crate::store::mysql::MySqlStore;
use crate::utils::scan_lock::ScanLocks;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "davomat.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(timezone = %config.timezone, "Server starting...");

    let pool = init_db(&config.database_url).await?;
    let store = Arc::new(MySqlStore::new(pool));

    let attendance = Data::new(AttendanceService::new(
        store.clone(),
        store.clone(),
        ScanLocks::new(config.scan_lock_idle),
    ));
    let reasons = Data::new(ReasonService::new(store.clone()));
    let roster = Data::new(RosterService::new(
        store.clone(),
        config.arrival_window,
        config.departure_window,
    ));
    let directory: Data<dyn EmployeeDirectory> = Data::from(store as Arc<dyn EmployeeDirectory>);
    let clock = Data::new(WorkClock::new(config.timezone));
    let limiters = Limiters::from_config(&config)?;

    let server_addr = config.server_addr.clone();
    let config_data = Data::new(config);

    HttpServer::new(move || {
        let config = config_data.clone();
        let limiters = limiters.clone();
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard so JS/CSS assets resolve
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(config.clone())
            .app_data(attendance.clone())
            .app_data(reasons.clone())
            .app_data(roster.clone())
            .app_data(directory.clone())
            .app_data(clock.clone())
            .configure(|cfg| routes::configure(cfg, &config, limiters))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run()
    .await
    .context("Server terminated")
}
