use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use validator::Validate;

use crate::models::domain::Listing;

/// Request to find matching listings for a buyer statement
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindMatchesRequest {
    #[validate(length(min = 1, max = 2000))]
    pub preference: String,
    #[serde(default)]
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u16>,
}

/// Request to add a listing to the store
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddListingRequest {
    #[validate(range(min = 1))]
    pub id: u64,
    #[validate(range(min = 1))]
    pub price: u64,
    #[validate(length(min = 1))]
    pub location: String,
    pub bedrooms: u8,
    pub bathrooms: u8,
    #[serde(default)]
    pub features: BTreeSet<String>,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "sizeSqft", default)]
    pub size_sqft: Option<u32>,
    #[serde(rename = "neighborhoodDescription", default)]
    pub neighborhood_description: Option<String>,
}

impl From<AddListingRequest> for Listing {
    fn from(req: AddListingRequest) -> Self {
        Listing {
            id: req.id,
            price: req.price,
            location: req.location,
            bedrooms: req.bedrooms,
            bathrooms: req.bathrooms,
            features: req.features,
            description: req.description,
            size_sqft: req.size_sqft,
            neighborhood_description: req.neighborhood_description,
        }
    }
}
