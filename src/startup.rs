use std::{net::TcpListener, sync::Arc};

use actix_web::{
    dev::Server,
    middleware::Logger,
    web::{self, Data},
    App, HttpServer,
};

use crate::{
    configuration::ScraperSettings,
    routes::{cache_route, company_route, default_route, niche_route},
    services::{ExtractionCache, HistoryStore, PageFetcher, TextProvider},
};

pub fn run(
    listener: TcpListener,
    provider: Arc<dyn TextProvider>,
    history_store: Arc<dyn HistoryStore>,
    page_fetcher: Arc<dyn PageFetcher>,
    extraction_cache: Data<ExtractionCache>,
    scraper_settings: ScraperSettings,
) -> Result<Server, std::io::Error> {
    let provider: Data<dyn TextProvider> = Data::from(provider);
    let history_store: Data<dyn HistoryStore> = Data::from(history_store);
    let page_fetcher: Data<dyn PageFetcher> = Data::from(page_fetcher);
    let scraper_settings = Data::new(scraper_settings);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(default_route::default)
            .service(web::scope("/niche").service(niche_route::get_candidates))
            .service(web::scope("/company").service(company_route::analyze_company))
            .service(web::scope("/cache").service(cache_route::cache_stats))
            .app_data(provider.clone())
            .app_data(history_store.clone())
            .app_data(page_fetcher.clone())
            .app_data(extraction_cache.clone())
            .app_data(scraper_settings.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
