use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::core::MatchError;
use crate::models::{ErrorResponse, FindMatchesRequest, FindMatchesResponse, GenerationFailure, HealthResponse};
use crate::routes::AppState;

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/find", web::post().to(find_matches));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let listings = state.store.read().await.len();

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        listings,
        cached_descriptions: state.matcher.cache_stats().map(|stats| stats.entries),
        timestamp: chrono::Utc::now(),
    })
}

/// Find matches endpoint
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// {
///   "preference": "3 bedrooms in Lakeside under $350k with a garden",
///   "limit": 5
/// }
/// ```
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_matches request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    tracing::info!("Finding matches for preference: {:?}, limit: {:?}", req.preference, req.limit);

    let outcome = match state
        .matcher
        .find_matches(&state.store, &req.preference, req.limit.map(usize::from))
        .await
    {
        Ok(outcome) => outcome,
        Err(MatchError::Parse(e)) => {
            tracing::info!("Could not parse preference: {}", e);
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Unusable preference".to_string(),
                message: e.to_string(),
                status_code: 400,
            });
        }
    };

    let response = FindMatchesResponse {
        query: outcome.query,
        matches: outcome.matches,
        failures: outcome
            .failures
            .iter()
            .map(|e| GenerationFailure {
                listing_id: e.listing_id,
                message: e.source.to_string(),
            })
            .collect(),
        total_listings: outcome.total_listings,
    };

    tracing::info!(
        "Returning {} matches and {} failures (from {} listings)",
        response.matches.len(),
        response.failures.len(),
        response.total_listings
    );

    HttpResponse::Ok().json(response)
}
