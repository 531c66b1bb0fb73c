// Route exports
pub mod listings;
pub mod matches;

use actix_web::web;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::core::{ListingStore, Matcher};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<ListingStore>>,
    pub matcher: Matcher,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(listings::configure),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DescriptionGenerator, GeneratorSettings};
    use crate::models::{AddListingResponse, ErrorResponse, HealthResponse};
    use crate::services::{CompletionOptions, LanguageModel, LlmError};
    use actix_web::{test, App};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct FixedModel;

    #[async_trait]
    impl LanguageModel for FixedModel {
        async fn complete(&self, _: &str, _: &str, _: &CompletionOptions) -> Result<String, LlmError> {
            Ok("A bright Lakeside home with a garage. There is a pool out back.".to_string())
        }
    }

    fn create_state() -> AppState {
        let generator = DescriptionGenerator::new(Arc::new(FixedModel), GeneratorSettings::default());
        AppState {
            store: Arc::new(RwLock::new(ListingStore::default())),
            matcher: Matcher::new(generator),
        }
    }

    fn listing_body(id: u64) -> Value {
        json!({
            "id": id,
            "price": 300000,
            "location": "Lakeside",
            "bedrooms": 3,
            "bathrooms": 2,
            "features": ["garage", "garden"],
            "description": "Family home close to the lake."
        })
    }

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(create_state()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/health").to_request();
        let resp: HealthResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp.status, "healthy");
        assert_eq!(resp.listings, 0);
        assert_eq!(resp.cached_descriptions, None);
    }

    #[actix_web::test]
    async fn test_add_duplicate_listing_conflicts() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(create_state()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/listings")
            .set_json(listing_body(1))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let body: AddListingResponse = test::read_body_json(resp).await;
        assert_eq!(body.listing_id, 1);

        let req = test::TestRequest::post()
            .uri("/api/v1/listings")
            .set_json(listing_body(1))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 409);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.status_code, 409);
    }

    #[actix_web::test]
    async fn test_get_missing_listing() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(create_state()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/listings/42").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn test_find_matches_end_to_end() {
        let state = create_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/listings")
            .set_json(listing_body(1))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/matches/find")
            .set_json(json!({ "preference": "Lakeside under 350k", "limit": 3 }))
            .to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;

        let matches = resp["matches"].as_array().unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0]["listing"]["id"], 1);
        let description = matches[0]["description"].as_str().unwrap();
        assert_eq!(description, "A bright Lakeside home with a garage.");
        assert!(resp["failures"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_find_matches_rejects_unparseable_preference() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(create_state()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/matches/find")
            .set_json(json!({ "preference": "something nice" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 400);
    }
}
