use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::models::{AddListingRequest, AddListingResponse, ErrorResponse, Listing};
use crate::routes::AppState;

/// Configure listing routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/listings", web::post().to(add_listing))
        .route("/listings/{id}", web::get().to(get_listing));
}

/// Add listing endpoint
///
/// POST /api/v1/listings
///
/// Responds `409 Conflict` if the id is already stored.
async fn add_listing(
    state: web::Data<AppState>,
    req: web::Json<AddListingRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let listing = Listing::from(req.into_inner());
    let result = state.store.write().await.add(listing);

    match result {
        Ok(listing) => {
            tracing::info!("Added listing {} in {}", listing.id, listing.location);
            HttpResponse::Created().json(AddListingResponse {
                success: true,
                listing_id: listing.id,
            })
        }
        Err(e) => {
            tracing::info!("Rejected listing: {}", e);
            HttpResponse::Conflict().json(ErrorResponse {
                error: "Duplicate listing".to_string(),
                message: e.to_string(),
                status_code: 409,
            })
        }
    }
}

/// GET /api/v1/listings/{id}
async fn get_listing(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> impl Responder {
    let id = path.into_inner();

    match state.store.read().await.get(id) {
        Some(listing) => HttpResponse::Ok().json(listing.as_ref()),
        None => HttpResponse::NotFound().json(ErrorResponse {
            error: "Listing not found".to_string(),
            message: format!("No listing with id {}", id),
            status_code: 404,
        }),
    }
}
