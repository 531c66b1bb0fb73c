use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// A property listing held by the store
///
/// Listings are immutable once stored; the store hands out `Arc<Listing>`
/// handles so match results can reference them without copying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: u64,
    pub price: u64,
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

impl Listing {
    /// Whether the listing carries the given feature tag (case-insensitive)
    pub fn has_feature(&self, tag: &str) -> bool {
        let tag = tag.to_lowercase();
        self.features.contains(&tag)
    }

    /// Lowercase and trim feature tags, dropping empty ones
    pub fn normalized(mut self) -> Self {
        self.features = self
            .features
            .into_iter()
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect();
        self.location = self.location.trim().to_string();
        self
    }
}

/// Inclusive price bounds; either side may be open
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetRange {
    pub min: Option<u64>,
    pub max: Option<u64>,
}

impl BudgetRange {
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    #[inline]
    pub fn contains(&self, price: u64) -> bool {
        self.min.map_or(true, |min| price >= min) && self.max.map_or(true, |max| price <= max)
    }
}

/// Structured buyer intent extracted from a free-text statement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceQuery {
    pub budget: BudgetRange,
    pub locations: BTreeSet<String>,
    pub features: BTreeSet<String>,
    #[serde(rename = "minBedrooms")]
    pub min_bedrooms: Option<u8>,
    #[serde(rename = "minBathrooms")]
    pub min_bathrooms: Option<u8>,
    /// The original statement, kept for prompt grounding
    pub statement: String,
}

impl PreferenceQuery {
    /// Whether the query carries at least one constraint the store can match on
    pub fn has_constraints(&self) -> bool {
        !self.budget.is_unbounded()
            || !self.locations.is_empty()
            || !self.features.is_empty()
            || self.min_bedrooms.is_some()
            || self.min_bathrooms.is_some()
    }
}

/// A listing paired with its relevance score and generated description
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub listing: Arc<Listing>,
    pub score: f64,
    pub description: String,
}

/// A listing selected by the store, before a description is generated
#[derive(Debug, Clone)]
pub struct ScoredListing {
    pub listing: Arc<Listing>,
    pub score: f64,
    pub shared_features: Vec<String>,
}

/// Scoring weights
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub budget: f64,
    pub location: f64,
    pub features: f64,
    pub rooms: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            budget: 0.35,
            location: 0.25,
            features: 0.30,
            rooms: 0.10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_contains() {
        let budget = BudgetRange { min: Some(100), max: Some(200) };
        assert!(budget.contains(100));
        assert!(budget.contains(200));
        assert!(!budget.contains(99));
        assert!(!budget.contains(201));
        assert!(BudgetRange::default().contains(u64::MAX));
    }

    #[test]
    fn test_normalized_listing() {
        let listing = Listing {
            id: 1,
            price: 1,
            location: " Lakeside ".to_string(),
            bedrooms: 1,
            bathrooms: 1,
            features: ["Garage ".to_string(), "".to_string()].into_iter().collect(),
            description: String::new(),
            size_sqft: None,
            neighborhood_description: None,
        }
        .normalized();

        assert_eq!(listing.location, "Lakeside");
        assert_eq!(listing.features.len(), 1);
        assert!(listing.has_feature("GARAGE"));
    }

    #[test]
    fn test_query_without_constraints() {
        let query = PreferenceQuery {
            statement: "anything".to_string(),
            ..Default::default()
        };
        assert!(!query.has_constraints());
    }
}
