use std::{net::TcpListener, sync::Arc, time::Duration};

use actix_web::web;
use env_logger::Env;
use prospector::{
    configuration::get_configuration,
    services::{ExtractionCache, OpenaiClient, PageScraper, PgHistoryStore},
    startup::run,
};
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().expect("Failed to read configuration.");

    let pool_options = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(15 * 60)) // 15 minutes
        .max_lifetime(None);

    let connection_pool = pool_options.connect_lazy_with(configuration.database.with_db());
    if let Err(e) = sqlx::migrate!("./migrations").run(&connection_pool).await {
        log::error!("Failed to run database migrations: {}", e);
    }

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(address)?;

    let openai_client = OpenaiClient::new(configuration.api_keys.openai, &configuration.provider);
    let history_store = PgHistoryStore::new(connection_pool);
    let page_scraper =
        PageScraper::new(&configuration.scraper).expect("Failed to build the page scraper.");
    let extraction_cache = web::Data::new(ExtractionCache::default());

    // Spawn background tasks
    let cache_clone = extraction_cache.clone();
    let prune_interval = Duration::from_secs(configuration.cache.prune_interval_secs.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(prune_interval);
        loop {
            interval.tick().await;
            let evicted = cache_clone.prune();
            if evicted > 0 {
                log::info!("Pruned {} expired extraction cache entries", evicted);
            }
        }
    });

    run(
        listener,
        Arc::new(openai_client),
        Arc::new(history_store),
        Arc::new(page_scraper),
        extraction_cache,
        configuration.scraper,
    )?
    .await
}
