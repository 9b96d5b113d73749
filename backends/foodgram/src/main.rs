use std::error::Error;

use actix::SyncArbiter;
use actix_web::{middleware, web, App, HttpServer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use foodgram::config::Configuration;
use foodgram::db::{self, DbExecutor};
use foodgram::routes::{not_found, routes};
use foodgram::utils::MediaStore;
use foodgram::AppState;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Configuration::from_env()?;
    let pool = db::connect(&config)?;

    let media = MediaStore::new(&config.media_root);
    let page_size = config.page_size;
    let addr = SyncArbiter::start(config.db_workers, move || {
        DbExecutor::new(pool.clone(), media.clone(), page_size)
    });

    let state = AppState::new(addr, &config.jwt_secret);

    info!(address = %config.bind_address, port = config.port, "starting server");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024))
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .service(routes())
            .default_service(web::to(not_found))
    })
    .bind((config.bind_address.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
