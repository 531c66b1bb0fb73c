use crate::models::{Listing, PreferenceQuery, ScoringWeights};
use crate::core::filters::{matches_location, shared_features};

/// Calculate a relevance score (0-100) for a listing against a query
///
/// Scoring formula:
/// score = (
///     budget_score * 0.35 +        # Inside the budget = 1, decays outside
///     location_score * 0.25 +      # Desired location = 1
///     feature_score * 0.30 +       # Fraction of desired features present
///     rooms_score * 0.10           # Meets minimum bedrooms/bathrooms
/// )
///
/// Components for constraints the query does not carry are left out and the
/// remaining weights are renormalized, so a query that only names features is
/// ranked purely on feature overlap.
pub fn calculate_match_score(
    listing: &Listing,
    query: &PreferenceQuery,
    weights: &ScoringWeights,
) -> (f64, Vec<String>) {
    let shared = shared_features(listing, query);

    let mut total = 0.0;
    let mut weight_sum = 0.0;

    if !query.budget.is_unbounded() {
        total += calculate_budget_score(listing.price, query.budget.min, query.budget.max) * weights.budget;
        weight_sum += weights.budget;
    }

    if !query.locations.is_empty() {
        let location_score = if matches_location(listing, query) { 1.0 } else { 0.0 };
        total += location_score * weights.location;
        weight_sum += weights.location;
    }

    if !query.features.is_empty() {
        let feature_score = shared.len() as f64 / query.features.len() as f64;
        total += feature_score * weights.features;
        weight_sum += weights.features;
    }

    if query.min_bedrooms.is_some() || query.min_bathrooms.is_some() {
        let rooms_score = calculate_rooms_score(listing, query.min_bedrooms, query.min_bathrooms);
        total += rooms_score * weights.rooms;
        weight_sum += weights.rooms;
    }

    let score = if weight_sum > 0.0 {
        total / weight_sum * 100.0
    } else {
        0.0
    };

    (score.clamp(0.0, 100.0), shared)
}

/// Calculate budget score (0-1)
/// Inside the range = 1, outside decays exponentially with the relative overshoot
#[inline]
fn calculate_budget_score(price: u64, min: Option<u64>, max: Option<u64>) -> f64 {
    let price = price as f64;

    let overshoot = match (min, max) {
        (_, Some(max)) if price > max as f64 => (price - max as f64) / (max as f64).max(1.0),
        (Some(min), _) if price < min as f64 => (min as f64 - price) / (min as f64).max(1.0),
        _ => 0.0,
    };

    // 10% over budget scores ~0.37
    (-overshoot * 10.0).exp()
}

/// Calculate rooms score (0-1)
/// Each room constraint contributes equally; a shortfall of one room halves it
#[inline]
fn calculate_rooms_score(listing: &Listing, min_bedrooms: Option<u8>, min_bathrooms: Option<u8>) -> f64 {
    let parts: Vec<f64> = [
        min_bedrooms.map(|min| room_fit(listing.bedrooms, min)),
        min_bathrooms.map(|min| room_fit(listing.bathrooms, min)),
    ]
    .into_iter()
    .flatten()
    .collect();

    if parts.is_empty() {
        return 1.0;
    }

    parts.iter().sum::<f64>() / parts.len() as f64
}

#[inline]
fn room_fit(actual: u8, wanted: u8) -> f64 {
    if actual >= wanted {
        1.0
    } else {
        0.5_f64.powi((wanted - actual) as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BudgetRange;

    fn create_test_listing(price: u64, location: &str, features: &[&str]) -> Listing {
        Listing {
            id: 1,
            price,
            location: location.to_string(),
            bedrooms: 3,
            bathrooms: 2,
            features: features.iter().map(|s| s.to_string()).collect(),
            description: String::new(),
            size_sqft: None,
            neighborhood_description: None,
        }
    }

    fn create_test_query() -> PreferenceQuery {
        PreferenceQuery {
            budget: BudgetRange { min: None, max: Some(350_000) },
            locations: ["Lakeside".to_string()].into_iter().collect(),
            features: ["garage".to_string(), "pool".to_string()].into_iter().collect(),
            min_bedrooms: Some(3),
            min_bathrooms: None,
            statement: "test".to_string(),
        }
    }

    #[test]
    fn test_calculate_match_score() {
        let listing = create_test_listing(300_000, "Lakeside", &["garage", "garden"]);
        let query = create_test_query();
        let weights = ScoringWeights::default();

        let (score, shared) = calculate_match_score(&listing, &query, &weights);

        assert!(score > 0.0 && score <= 100.0);
        assert_eq!(shared, vec!["garage"]);
    }

    #[test]
    fn test_perfect_match_scores_100() {
        let listing = create_test_listing(300_000, "Lakeside", &["garage", "pool"]);
        let query = create_test_query();

        let (score, _) = calculate_match_score(&listing, &query, &ScoringWeights::default());

        assert!((score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_budget_score() {
        assert_eq!(calculate_budget_score(300, None, Some(350)), 1.0);
        assert_eq!(calculate_budget_score(300, Some(300), None), 1.0);

        let over = calculate_budget_score(385, None, Some(350));
        assert!(over > 0.3 && over < 0.5);

        let way_over = calculate_budget_score(700, None, Some(350));
        assert!(way_over < 0.01);
    }

    #[test]
    fn test_rooms_score() {
        let listing = create_test_listing(1, "x", &[]);
        assert_eq!(calculate_rooms_score(&listing, Some(3), None), 1.0);
        assert_eq!(calculate_rooms_score(&listing, Some(4), None), 0.5);
        assert_eq!(calculate_rooms_score(&listing, Some(3), Some(3)), 0.75);
    }

    #[test]
    fn test_unused_components_renormalized() {
        let listing = create_test_listing(900_000, "Downtown", &["garage"]);
        let query = PreferenceQuery {
            features: ["garage".to_string()].into_iter().collect(),
            statement: "a garage".to_string(),
            ..Default::default()
        };

        let (score, _) = calculate_match_score(&listing, &query, &ScoringWeights::default());

        assert!((score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_cheaper_listing_scores_higher_when_over_budget() {
        let query = create_test_query();
        let weights = ScoringWeights::default();
        let near = create_test_listing(360_000, "Lakeside", &["garage"]);
        let far = create_test_listing(500_000, "Lakeside", &["garage"]);

        let (near_score, _) = calculate_match_score(&near, &query, &weights);
        let (far_score, _) = calculate_match_score(&far, &query, &weights);

        assert!(near_score > far_score);
    }
}
