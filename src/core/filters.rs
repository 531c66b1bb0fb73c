use crate::models::{Listing, PreferenceQuery};

/// Check whether a listing's price falls inside the query's budget
///
/// Returns `false` when the query has no budget at all, so an unbounded
/// budget never counts as an overlapping constraint.
#[inline]
pub fn matches_budget(listing: &Listing, query: &PreferenceQuery) -> bool {
    !query.budget.is_unbounded() && query.budget.contains(listing.price)
}

/// Check whether the listing is in one of the desired locations
#[inline]
pub fn matches_location(listing: &Listing, query: &PreferenceQuery) -> bool {
    query
        .locations
        .iter()
        .any(|loc| loc.eq_ignore_ascii_case(&listing.location))
}

/// Check whether the listing satisfies the minimum room counts that were asked for
///
/// Only counts as a match when at least one room constraint is present.
#[inline]
pub fn matches_rooms(listing: &Listing, query: &PreferenceQuery) -> bool {
    if query.min_bedrooms.is_none() && query.min_bathrooms.is_none() {
        return false;
    }

    query.min_bedrooms.map_or(true, |min| listing.bedrooms >= min)
        && query.min_bathrooms.map_or(true, |min| listing.bathrooms >= min)
}

/// Feature tags shared between the listing and the query, in tag order
pub fn shared_features(listing: &Listing, query: &PreferenceQuery) -> Vec<String> {
    query
        .features
        .iter()
        .filter(|tag| listing.has_feature(tag))
        .cloned()
        .collect()
}

/// Retrieval gate: a listing is a candidate only if it overlaps the query
/// on at least one constraint
#[inline]
pub fn satisfies_any_constraint(listing: &Listing, query: &PreferenceQuery) -> bool {
    matches_budget(listing, query)
        || matches_location(listing, query)
        || matches_rooms(listing, query)
        || query.features.iter().any(|tag| listing.has_feature(tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BudgetRange;

    fn create_test_listing() -> Listing {
        Listing {
            id: 1,
            price: 300_000,
            location: "Lakeside".to_string(),
            bedrooms: 3,
            bathrooms: 2,
            features: ["garage", "garden"].iter().map(|s| s.to_string()).collect(),
            description: "A quiet family home".to_string(),
            size_sqft: Some(1800),
            neighborhood_description: None,
        }
    }

    fn create_test_query() -> PreferenceQuery {
        PreferenceQuery {
            statement: "test".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_budget_match() {
        let listing = create_test_listing();
        let mut query = create_test_query();
        assert!(!matches_budget(&listing, &query));

        query.budget = BudgetRange { min: None, max: Some(350_000) };
        assert!(matches_budget(&listing, &query));

        query.budget = BudgetRange { min: None, max: Some(250_000) };
        assert!(!matches_budget(&listing, &query));
    }

    #[test]
    fn test_location_match_is_case_insensitive() {
        let listing = create_test_listing();
        let mut query = create_test_query();
        query.locations.insert("lakeside".to_string());

        assert!(matches_location(&listing, &query));
    }

    #[test]
    fn test_rooms_match() {
        let listing = create_test_listing();
        let mut query = create_test_query();
        assert!(!matches_rooms(&listing, &query));

        query.min_bedrooms = Some(3);
        assert!(matches_rooms(&listing, &query));

        query.min_bathrooms = Some(3);
        assert!(!matches_rooms(&listing, &query));
    }

    #[test]
    fn test_shared_features() {
        let listing = create_test_listing();
        let mut query = create_test_query();
        query.features = ["garden", "pool"].iter().map(|s| s.to_string()).collect();

        assert_eq!(shared_features(&listing, &query), vec!["garden"]);
        assert!(satisfies_any_constraint(&listing, &query));
    }

    #[test]
    fn test_no_overlap() {
        let listing = create_test_listing();
        let mut query = create_test_query();
        query.features.insert("pool".to_string());
        query.locations.insert("Downtown".to_string());

        assert!(!satisfies_any_constraint(&listing, &query));
    }
}
