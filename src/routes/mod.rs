pub mod cache_route;
pub mod company_route;
pub mod default_route;
pub mod niche_route;

use actix_web::HttpResponse;
use serde_json::json;

use crate::error::{ScoutError, ScrapeError};

/// Everything `ScoutError` carries comes from the provider or a fetched page,
/// so it surfaces as a gateway error.
pub(crate) fn error_response(error: ScoutError) -> HttpResponse {
    log::error!("Request failed: {}", error);

    let body = json!({ "error": error.to_string() });
    match error {
        ScoutError::Scrape(ScrapeError::Timeout { .. }) => HttpResponse::GatewayTimeout().json(body),
        _ => HttpResponse::BadGateway().json(body),
    }
}
