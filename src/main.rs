use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;

use tour_reviews::api;
use tour_reviews::config::Config;
use tour_reviews::db::Database;
use tour_reviews::store::ReviewStore;
use tour_reviews::validation::Denylist;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize the review store
    let db = match Database::open(&config.db_path).await {
        Ok(db) => db,
        Err(e) => {
            log::error!("Failed to initialize review store: {}", e);
            std::process::exit(1);
        }
    };
    let store: Arc<dyn ReviewStore> = Arc::new(db);
    let store = web::Data::from(store);
    let denylist = web::Data::new(Denylist::default());

    let addr = config.address();
    let static_dir = config.static_dir.clone();
    log::info!("Server listening on http://{}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .app_data(denylist.clone())
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            // API routes BEFORE the static fallback
            .configure(api::configure)
            .service(api::spa_service(&static_dir))
    })
    .bind(&addr)?
    .run()
    .await
}
