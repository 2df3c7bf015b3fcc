use actix_web::{post, web, HttpResponse};
use serde::Deserialize;

use crate::{
    configuration::ScraperSettings,
    routes::error_response,
    services::{is_absolute_url, CompanyAnalyzer, ExtractionCache, PageFetcher, TextProvider},
};

#[derive(Deserialize)]
struct AnalyzeCompanyBody {
    name: String,
    website: String,
    text: Option<String>,
}

#[post("/analyze")]
async fn analyze_company(
    cache: web::Data<ExtractionCache>,
    provider: web::Data<dyn TextProvider>,
    fetcher: web::Data<dyn PageFetcher>,
    scraper_settings: web::Data<ScraperSettings>,
    body: web::Json<AnalyzeCompanyBody>,
) -> HttpResponse {
    let body = body.into_inner();
    if !is_absolute_url(body.website.trim()) {
        return HttpResponse::BadRequest().body("website must be an absolute URL");
    }

    let analyzer = CompanyAnalyzer::new(
        cache.get_ref(),
        provider.get_ref(),
        fetcher.get_ref(),
        scraper_settings.text_budget,
    );

    match analyzer
        .analyze(body.name.trim(), body.website.trim(), body.text)
        .await
    {
        Ok(analysis) => HttpResponse::Ok().json(analysis),
        Err(e) => error_response(e),
    }
}
