//! HomeMatch - retrieval-augmented property matching service
//!
//! Buyers describe what they want in plain language. The statement is parsed
//! into a structured query, matching listings are retrieved from the store,
//! and a language model writes a personalized description of each one that
//! only mentions what the listing actually has.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{ListingStore, Matcher, PreferenceParser, DescriptionGenerator, ParseError, DuplicateIdError, GenerationError};
pub use models::{Listing, PreferenceQuery, MatchResult, ScoringWeights, FindMatchesRequest, FindMatchesResponse};
