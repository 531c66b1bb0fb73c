// Core algorithm exports
pub mod filters;
pub mod generator;
pub mod matcher;
pub mod parser;
pub mod scoring;
pub mod store;
pub mod text;

pub use filters::{matches_budget, matches_location, matches_rooms, satisfies_any_constraint, shared_features};
pub use generator::{DescriptionGenerator, GenerationError, GeneratorSettings};
pub use matcher::{Matcher, MatchError, MatchOutcome, Retrieval};
pub use parser::{ParseError, PreferenceParser};
pub use scoring::calculate_match_score;
pub use store::{DuplicateIdError, ListingStore, SeedError};
