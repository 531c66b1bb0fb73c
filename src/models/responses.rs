use serde::{Deserialize, Serialize};
use crate::models::domain::{MatchResult, PreferenceQuery};

/// Response for find matches endpoint
#[derive(Debug, Clone, Serialize)]
pub struct FindMatchesResponse {
    pub query: PreferenceQuery,
    pub matches: Vec<MatchResult>,
    pub failures: Vec<GenerationFailure>,
    pub total_listings: usize,
}

/// A listing that matched but whose description could not be generated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationFailure {
    #[serde(rename = "listingId")]
    pub listing_id: u64,
    pub message: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub listings: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_descriptions: Option<u64>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Add listing response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddListingResponse {
    pub success: bool,
    #[serde(rename = "listingId")]
    pub listing_id: u64,
}
