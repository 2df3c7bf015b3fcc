use actix_web::{get, web, HttpResponse};

use crate::services::ExtractionCache;

#[get("/stats")]
async fn cache_stats(cache: web::Data<ExtractionCache>) -> HttpResponse {
    HttpResponse::Ok().json(cache.stats())
}
