use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info, warn};

use quill_blog::cache::CacheStore;
use quill_blog::cache::memory::InMemoryCacheStore;
use quill_blog::config::AppConfig;
use quill_blog::database::db::init_database;
use quill_blog::database::redis::{RedisCacheStore, connect_to_redis};
use quill_blog::middleware::not_found::not_found;
use quill_blog::router::index::routes;
use quill_blog::router::services::{AppServices, Stores};

async fn cache_store(redis_url: &str) -> Arc<dyn CacheStore> {
    match connect_to_redis(redis_url).await {
        Ok(client) => Arc::new(RedisCacheStore::new(&client)),
        Err(e) => {
            warn!("Redis unavailable ({}), using the in-process cache", e);
            Arc::new(InMemoryCacheStore::new())
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let db = init_database(&config).await.map_err(|e| {
        error!("Failed to prepare MongoDB: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    let cache = cache_store(&config.redis_url).await;
    let services = AppServices::new(Stores::mongo(&db, cache), &config);

    info!("Starting server on http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(|cfg| services.configure(cfg))
            .configure(routes)
            .default_service(web::route().to(not_found))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    info!("Server has stopped");

    Ok(())
}
