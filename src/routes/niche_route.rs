use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    routes::error_response,
    services::{HistoryStore, NicheSearch, TextProvider, MAX_CANDIDATES},
};

fn default_count() -> usize {
    MAX_CANDIDATES
}

fn default_randomize() -> bool {
    true
}

#[derive(Deserialize)]
struct GetCandidatesQuery {
    query: String,
    workspace_id: Uuid,
    #[serde(default = "default_count")]
    count: usize,
    #[serde(default = "default_randomize")]
    randomize: bool,
}

#[get("/candidates")]
async fn get_candidates(
    provider: web::Data<dyn TextProvider>,
    store: web::Data<dyn HistoryStore>,
    query: web::Query<GetCandidatesQuery>,
) -> HttpResponse {
    let niche = query.query.trim();
    if niche.is_empty() {
        return HttpResponse::BadRequest().body("query must not be empty");
    }

    match NicheSearch::new(provider.get_ref(), store.get_ref())
        .run(niche, query.workspace_id, query.count, query.randomize)
        .await
    {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;

    use super::*;
    use crate::services::testing::{InMemoryHistoryStore, ScriptedProvider};

    fn app_data(
        responses: Vec<&str>,
    ) -> (web::Data<dyn TextProvider>, web::Data<dyn HistoryStore>) {
        let provider: Arc<dyn TextProvider> = Arc::new(ScriptedProvider::new(responses));
        let store: Arc<dyn HistoryStore> = Arc::new(InMemoryHistoryStore::default());
        (web::Data::from(provider), web::Data::from(store))
    }

    #[actix_web::test]
    async fn get_candidates_returns_selection() {
        let (provider, store) = app_data(vec![
            r#"[{"name":"Acme","website":"https://acme.com","reason":"CRM for plumbers"}]"#,
        ]);
        let app = test::init_service(
            App::new()
                .app_data(provider)
                .app_data(store)
                .service(web::scope("/niche").service(get_candidates)),
        )
        .await;

        let uri = format!(
            "/niche/candidates?query=CRM%20Tools&workspace_id={}&count=3",
            Uuid::new_v4()
        );
        let body: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri(&uri).to_request()).await;

        assert_eq!(body["niche_key"], "crm_tools");
        assert_eq!(body["selected"][0]["name"], "Acme");
        assert_eq!(body["stats"]["unique"], 1);
    }

    #[actix_web::test]
    async fn get_candidates_maps_provider_errors() {
        let (provider, store) = app_data(vec!["not json"]);
        let app = test::init_service(
            App::new()
                .app_data(provider)
                .app_data(store)
                .service(web::scope("/niche").service(get_candidates)),
        )
        .await;

        let uri = format!("/niche/candidates?query=crm&workspace_id={}", Uuid::new_v4());
        let response = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[actix_web::test]
    async fn get_candidates_rejects_blank_query() {
        let (provider, store) = app_data(vec![]);
        let app = test::init_service(
            App::new()
                .app_data(provider)
                .app_data(store)
                .service(web::scope("/niche").service(get_candidates)),
        )
        .await;

        let uri = format!("/niche/candidates?query=%20&workspace_id={}", Uuid::new_v4());
        let response = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
