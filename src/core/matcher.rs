use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::core::{
    generator::{DescriptionGenerator, GenerationError},
    parser::{ParseError, PreferenceParser},
    store::ListingStore,
};
use crate::models::{MatchResult, PreferenceQuery, ScoredListing};
use crate::services::CacheStats;

/// Errors that stop a search before any description is generated
#[derive(Debug, Error)]
pub enum MatchError {
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Listings retrieved for a statement, ready to be described
#[derive(Debug, Clone)]
pub struct Retrieval {
    pub query: PreferenceQuery,
    pub candidates: Vec<ScoredListing>,
    pub lexicon: BTreeSet<String>,
    pub total_listings: usize,
}

/// Result of the matching process
///
/// `failures` holds listings that were retrieved but could not be described;
/// `matches` keeps the store's ranking order.
#[derive(Debug)]
pub struct MatchOutcome {
    pub query: PreferenceQuery,
    pub matches: Vec<MatchResult>,
    pub failures: Vec<GenerationError>,
    pub total_listings: usize,
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Parse the buyer statement against the store's vocabulary
/// 2. Retrieve and rank overlapping listings
/// 3. Generate grounded descriptions, concurrently and in rank order
#[derive(Clone)]
pub struct Matcher {
    generator: DescriptionGenerator,
    default_limit: usize,
    max_limit: usize,
    max_concurrency: usize,
}

impl Matcher {
    pub fn new(generator: DescriptionGenerator) -> Self {
        Self {
            generator,
            default_limit: 5,
            max_limit: 50,
            max_concurrency: 4,
        }
    }

    pub fn with_limits(mut self, default_limit: usize, max_limit: usize) -> Self {
        self.max_limit = max_limit.max(1);
        self.default_limit = default_limit.clamp(1, self.max_limit);
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.generator.cache_stats()
    }

    /// Resolve a requested limit against the configured default and cap
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit)
    }

    /// Parse a statement and retrieve candidates from the store
    ///
    /// Synchronous so callers can hold a store lock for exactly this step.
    pub fn retrieve(
        &self,
        store: &ListingStore,
        statement: &str,
        limit: Option<usize>,
    ) -> Result<Retrieval, ParseError> {
        let parser = PreferenceParser::for_store(store);
        let query = parser.parse(statement)?;
        let candidates = store.query(&query, self.effective_limit(limit));

        let mut lexicon = parser.feature_lexicon().clone();
        lexicon.extend(query.features.iter().cloned());

        Ok(Retrieval {
            query,
            candidates,
            lexicon,
            total_listings: store.len(),
        })
    }

    /// Describe every retrieved listing
    ///
    /// At most `max_concurrency` provider calls run at once. A failed
    /// description moves its listing into `failures` without affecting the
    /// others.
    pub async fn describe(&self, retrieval: Retrieval) -> MatchOutcome {
        let Retrieval {
            query,
            candidates,
            lexicon,
            total_listings,
        } = retrieval;

        let generated: Vec<(ScoredListing, Result<String, GenerationError>)> = stream::iter(candidates)
            .map(|candidate| {
                let query = &query;
                let lexicon = &lexicon;
                async move {
                    let description = self
                        .generator
                        .describe(query, &candidate.listing, lexicon)
                        .await;
                    (candidate, description)
                }
            })
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let mut matches = Vec::with_capacity(generated.len());
        let mut failures = Vec::new();

        for (candidate, description) in generated {
            match description {
                Ok(description) => matches.push(MatchResult {
                    listing: candidate.listing,
                    score: candidate.score,
                    description,
                }),
                Err(e) => {
                    tracing::error!("{}", e);
                    failures.push(e);
                }
            }
        }

        MatchOutcome {
            query,
            matches,
            failures,
            total_listings,
        }
    }

    /// Run the full pipeline against a shared store
    ///
    /// The read lock is released before any description is generated.
    pub async fn find_matches(
        &self,
        store: &RwLock<ListingStore>,
        statement: &str,
        limit: Option<usize>,
    ) -> Result<MatchOutcome, MatchError> {
        let retrieval = {
            let store = store.read().await;
            self.retrieve(&store, statement, limit)?
        };

        tracing::debug!(
            "Retrieved {} candidates from {} listings",
            retrieval.candidates.len(),
            retrieval.total_listings
        );

        let outcome = self.describe(retrieval).await;

        tracing::info!(
            "Matched {} listings ({} generation failures) from {} listings",
            outcome.matches.len(),
            outcome.failures.len(),
            outcome.total_listings
        );

        Ok(outcome)
    }
}
