use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::models::{Listing, PreferenceQuery, ScoredListing, ScoringWeights};
use crate::core::{filters::satisfies_any_constraint, scoring::calculate_match_score};

/// Adding a listing whose id is already stored
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Listing {0} already exists")]
pub struct DuplicateIdError(pub u64);

/// Errors that can occur while loading a seed file
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed file: {0}")]
    Json(#[from] serde_json::Error),
}

/// In-memory listing store
///
/// Listings are keyed by id in a `BTreeMap`, so iteration is always in
/// ascending id order and ranking ties resolve deterministically.
#[derive(Debug, Clone, Default)]
pub struct ListingStore {
    listings: BTreeMap<u64, Arc<Listing>>,
    weights: ScoringWeights,
}

impl ListingStore {
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            listings: BTreeMap::new(),
            weights,
        }
    }

    /// Add a listing; the store is left untouched if the id is taken
    pub fn add(&mut self, listing: Listing) -> Result<Arc<Listing>, DuplicateIdError> {
        if self.listings.contains_key(&listing.id) {
            return Err(DuplicateIdError(listing.id));
        }

        let listing = Arc::new(listing.normalized());
        self.listings.insert(listing.id, Arc::clone(&listing));

        tracing::debug!("Stored listing {} ({})", listing.id, listing.location);
        Ok(listing)
    }

    pub fn get(&self, id: u64) -> Option<Arc<Listing>> {
        self.listings.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// All distinct locations in the store
    pub fn locations(&self) -> BTreeSet<String> {
        self.listings.values().map(|l| l.location.clone()).collect()
    }

    /// All distinct feature tags in the store
    pub fn feature_tags(&self) -> BTreeSet<String> {
        self.listings
            .values()
            .flat_map(|l| l.features.iter().cloned())
            .collect()
    }

    /// Retrieve up to `limit` listings for a query
    ///
    /// # Pipeline Stages
    /// 1. Overlap gate: at least one query constraint must be satisfied
    /// 2. Scoring on budget, location, feature and room fit
    /// 3. Ranking by score (descending), then id (ascending)
    pub fn query(&self, query: &PreferenceQuery, limit: usize) -> Vec<ScoredListing> {
        let mut scored: Vec<ScoredListing> = self
            .listings
            .values()
            .filter(|listing| satisfies_any_constraint(listing, query))
            .map(|listing| {
                let (score, shared_features) = calculate_match_score(listing, query, &self.weights);
                ScoredListing {
                    listing: Arc::clone(listing),
                    score,
                    shared_features,
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.listing.id.cmp(&b.listing.id))
        });

        scored.truncate(limit);

        tracing::trace!(
            "Query matched {} of {} listings",
            scored.len(),
            self.listings.len()
        );

        scored
    }

    /// Bulk-load listings from a JSON array file
    ///
    /// Duplicate ids in the file are logged and skipped. Returns the number of
    /// listings added.
    pub fn load_seed<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, SeedError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let listings: Vec<Listing> = serde_json::from_str(&raw)?;

        let mut added = 0;
        for listing in listings {
            match self.add(listing) {
                Ok(_) => added += 1,
                Err(e) => tracing::warn!("Skipping seed listing: {}", e),
            }
        }

        Ok(added)
    }
}
