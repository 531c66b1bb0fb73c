// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Listing, BudgetRange, PreferenceQuery, MatchResult, ScoredListing, ScoringWeights};
pub use requests::{FindMatchesRequest, AddListingRequest};
pub use responses::{FindMatchesResponse, GenerationFailure, HealthResponse, ErrorResponse, AddListingResponse};
