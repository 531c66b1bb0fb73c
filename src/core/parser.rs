use regex::{Captures, Regex};
use std::collections::BTreeSet;
use std::sync::LazyLock;
use thiserror::Error;

use crate::core::{store::ListingStore, text::mentions_positively};
use crate::models::{BudgetRange, PreferenceQuery};

/// Errors that can occur while parsing a buyer statement
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Preference statement is empty")]
    Empty,

    #[error("No searchable constraints found in statement: {0}")]
    NoConstraints(String),

    #[error("Budget minimum {min} exceeds maximum {max}")]
    InvalidBudget { min: u64, max: u64 },
}

/// Features recognized even when no stored listing carries them yet
pub const BUILTIN_FEATURES: &[&str] = &[
    "garage",
    "garden",
    "pool",
    "fireplace",
    "balcony",
    "basement",
    "patio",
    "deck",
    "porch",
    "gym",
    "parking",
    "elevator",
    "laundry",
    "waterfront",
    "solar panels",
    "hardwood floors",
    "central air",
    "home office",
    "walk-in closet",
];

/// Alternate phrasings mapped onto a canonical feature tag
pub const FEATURE_SYNONYMS: &[(&str, &str)] = &[
    ("yard", "garden"),
    ("backyard", "garden"),
    ("swimming pool", "pool"),
    ("terrace", "balcony"),
    ("carport", "parking"),
    ("air conditioning", "central air"),
    ("study", "home office"),
    ("cellar", "basement"),
    ("lake view", "waterfront"),
];

/// Smallest number treated as a price; smaller amounts are room counts etc.
const MIN_PRICE: u64 = 1_000;

const AMOUNT: &str = r"\$?\s*(\d{1,3}(?:,\d{3})+|\d+(?:\.\d+)?)\s*(k|m|million|thousand)?\b";

static BETWEEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"between\s+{AMOUNT}\s+and\s+{AMOUNT}")).expect("valid between regex")
});

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{AMOUNT}\s*(?:-|–|to)\s*{AMOUNT}")).expect("valid range regex")
});

static MAX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?:\b(?:under|below|less than|up to|at most|no more than|maximum of|maximum|max|budget of|budget is|within)|<=|<|≤)\s*(?:of\s+)?{AMOUNT}"
    ))
    .expect("valid max regex")
});

static MIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?:\b(?:over|above|more than|at least|minimum of|minimum|min|starting at)|>=|>|≥)\s*{AMOUNT}"
    ))
    .expect("valid min regex")
});

static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(AMOUNT).expect("valid amount regex"));

const COUNT: &str = r"\d+(?:\.\d+)?|one|two|three|four|five|six|seven|eight|nine|ten";

/// "3 bedrooms", "3-4 beds", "two or three baths"; the lower count is the minimum
static ROOMS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b({COUNT})(?:\s*(?:-|–|to|or)\s*({COUNT}))?\s*-?\s*(bedrooms?|beds?|br|bathrooms?|baths?)\b"
    ))
    .expect("valid rooms regex")
});

/// Floor areas ("2000 sqft", "1,500-2,000 square feet") are never budgets
static AREA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:\d[\d,]*(?:\.\d+)?\s*(?:-|–|to)\s*)?\d[\d,]*(?:\.\d+)?\s*k?\s*(?:sq\.?\s*(?:ft|feet|foot)|sqft|square\s+(?:feet|foot|ft|meters?|metres?)|sf\b|m2\b|m²)",
    )
    .expect("valid area regex")
});

/// Converts free-text buyer statements into a [`PreferenceQuery`]
///
/// Extraction is rule based: budget phrases and room counts come from
/// patterns, locations and features from whole-word matches against known
/// vocabularies. The feature lexicon always includes [`BUILTIN_FEATURES`].
#[derive(Debug, Clone)]
pub struct PreferenceParser {
    locations: BTreeSet<String>,
    features: BTreeSet<String>,
}

impl PreferenceParser {
    pub fn new() -> Self {
        Self {
            locations: BTreeSet::new(),
            features: BUILTIN_FEATURES.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Parser whose vocabulary covers every location and tag in the store
    pub fn for_store(store: &ListingStore) -> Self {
        Self::new()
            .with_locations(store.locations())
            .with_features(store.feature_tags())
    }

    pub fn with_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locations.extend(locations.into_iter().map(Into::into));
        self
    }

    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features
            .extend(features.into_iter().map(|f| f.into().to_lowercase()));
        self
    }

    /// Every feature term the parser recognizes
    pub fn feature_lexicon(&self) -> &BTreeSet<String> {
        &self.features
    }

    /// Parse a statement into a query
    pub fn parse(&self, statement: &str) -> Result<PreferenceQuery, ParseError> {
        let statement = statement.trim();
        if statement.is_empty() {
            return Err(ParseError::Empty);
        }

        let lower = statement.to_lowercase();

        let budget = extract_budget(&lower);
        if let (Some(min), Some(max)) = (budget.min, budget.max) {
            if min > max {
                return Err(ParseError::InvalidBudget { min, max });
            }
        }

        let (min_bedrooms, min_bathrooms) = extract_rooms(&lower);

        let locations = self
            .locations
            .iter()
            .filter(|loc| mentions_positively(&lower, loc))
            .cloned()
            .collect();

        let features = self.extract_features(&lower);

        let query = PreferenceQuery {
            budget,
            locations,
            features,
            min_bedrooms,
            min_bathrooms,
            statement: statement.to_string(),
        };

        if !query.has_constraints() {
            return Err(ParseError::NoConstraints(statement.to_string()));
        }

        tracing::debug!(
            "Parsed preference: budget={:?}, locations={:?}, features={:?}, bedrooms={:?}, bathrooms={:?}",
            query.budget,
            query.locations,
            query.features,
            query.min_bedrooms,
            query.min_bathrooms
        );

        Ok(query)
    }

    fn extract_features(&self, lower: &str) -> BTreeSet<String> {
        let mut features: BTreeSet<String> = self
            .features
            .iter()
            .filter(|f| mentions_positively(lower, f))
            .cloned()
            .collect();

        for (alias, canonical) in FEATURE_SYNONYMS {
            if mentions_positively(lower, alias) {
                features.insert(canonical.to_string());
            }
        }

        features
    }
}

impl Default for PreferenceParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an amount capture pair (digits, suffix) into a whole number
fn parse_amount(digits: &str, suffix: Option<&str>) -> Option<u64> {
    let value: f64 = digits.replace(',', "").parse().ok()?;
    let multiplier = match suffix {
        Some("k") | Some("thousand") => 1_000.0,
        Some("m") | Some("million") => 1_000_000.0,
        _ => 1.0,
    };
    let amount = (value * multiplier).round();
    (amount >= 0.0).then_some(amount as u64)
}

/// Amount from capture groups `idx` (digits) and `idx + 1` (suffix), if it looks like a price
fn price_at(caps: &Captures<'_>, idx: usize) -> Option<u64> {
    let digits = caps.get(idx)?.as_str();
    let suffix = caps.get(idx + 1).map(|m| m.as_str());
    parse_amount(digits, suffix).filter(|&amount| amount >= MIN_PRICE)
}

/// Extract budget bounds from a lowercased statement
///
/// "between X and Y" and "X-Y" set both bounds; "under X" style phrases set
/// the maximum, "at least X" style phrases the minimum. A lone amount written
/// with a currency sign or magnitude suffix is read as a maximum. Floor areas
/// are removed first.
fn extract_budget(lower: &str) -> BudgetRange {
    let without_areas = AREA_RE.replace_all(lower, " ");
    let lower: &str = &without_areas;

    for re in [&*BETWEEN_RE, &*RANGE_RE] {
        for caps in re.captures_iter(lower) {
            if let (Some(a), Some(b)) = (price_at(&caps, 1), price_at(&caps, 3)) {
                return BudgetRange {
                    min: Some(a.min(b)),
                    max: Some(a.max(b)),
                };
            }
        }
    }

    let max = MAX_RE.captures_iter(lower).find_map(|caps| price_at(&caps, 1));
    let min = MIN_RE.captures_iter(lower).find_map(|caps| price_at(&caps, 1));

    if max.is_some() || min.is_some() {
        return BudgetRange { min, max };
    }

    let bare = AMOUNT_RE.captures_iter(lower).find_map(|caps| {
        let whole = caps.get(0)?.as_str();
        let explicit = whole.contains('$') || caps.get(2).is_some();
        if explicit { price_at(&caps, 1) } else { None }
    });

    BudgetRange { min: None, max: bare }
}

fn number_word(word: &str) -> Option<u8> {
    let n = match word {
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        other => {
            let value: f64 = other.parse().ok()?;
            if !(0.0..=u8::MAX as f64).contains(&value) {
                return None;
            }
            value.floor() as u8
        }
    };
    Some(n)
}

/// Extract minimum bedroom and bathroom counts
fn extract_rooms(lower: &str) -> (Option<u8>, Option<u8>) {
    let mut bedrooms = None;
    let mut bathrooms = None;

    for caps in ROOMS_RE.captures_iter(lower) {
        let (Some(count), Some(kind)) = (caps.get(1), caps.get(3)) else {
            continue;
        };
        let Some(count) = number_word(count.as_str()) else {
            continue;
        };

        if kind.as_str().starts_with("bed") || kind.as_str() == "br" {
            bedrooms.get_or_insert(count);
        } else {
            bathrooms.get_or_insert(count);
        }
    }

    (bedrooms, bathrooms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> PreferenceParser {
        PreferenceParser::new().with_locations(["Lakeside", "Downtown", "Green Hills"])
    }

    #[test]
    fn test_parse_example_statement() {
        let query = parser()
            .parse("A house in Lakeside under $350,000 with a garage")
            .unwrap();

        assert_eq!(query.budget, BudgetRange { min: None, max: Some(350_000) });
        assert!(query.locations.contains("Lakeside"));
        assert!(query.features.contains("garage"));
        assert_eq!(query.statement, "A house in Lakeside under $350,000 with a garage");
    }

    #[test]
    fn test_budget_suffixes() {
        assert_eq!(extract_budget("under 350k"), BudgetRange { min: None, max: Some(350_000) });
        assert_eq!(extract_budget("up to $1.2m"), BudgetRange { min: None, max: Some(1_200_000) });
        assert_eq!(extract_budget("at least 2 million"), BudgetRange { min: Some(2_000_000), max: None });
    }

    #[test]
    fn test_budget_ranges() {
        assert_eq!(
            extract_budget("between 200k and 300k"),
            BudgetRange { min: Some(200_000), max: Some(300_000) }
        );
        assert_eq!(
            extract_budget("$300,000 - $400,000"),
            BudgetRange { min: Some(300_000), max: Some(400_000) }
        );
    }

    #[test]
    fn test_bare_amount_is_max() {
        assert_eq!(extract_budget("my budget: $500k"), BudgetRange { min: None, max: Some(500_000) });
        assert!(extract_budget("3 kids and 2 dogs").is_unbounded());
    }

    #[test]
    fn test_room_counts_are_not_prices() {
        let query = parser().parse("at least 3 bedrooms and 2.5 baths").unwrap();

        assert!(query.budget.is_unbounded());
        assert_eq!(query.min_bedrooms, Some(3));
        assert_eq!(query.min_bathrooms, Some(2));
    }

    #[test]
    fn test_number_words_and_hyphens() {
        assert_eq!(extract_rooms("a three-bedroom house"), (Some(3), None));
        assert_eq!(extract_rooms("4br 2 bath"), (Some(4), Some(2)));
    }

    #[test]
    fn test_room_ranges_use_lower_bound() {
        assert_eq!(extract_rooms("3-4 bedrooms"), (Some(3), None));
        assert_eq!(extract_rooms("two or three bedrooms, 1 to 2 baths"), (Some(2), Some(1)));
    }

    #[test]
    fn test_floor_area_is_not_a_budget() {
        assert!(extract_budget("at least 2000 sqft").is_unbounded());
        assert!(extract_budget("under 1500 square feet").is_unbounded());
        assert!(extract_budget("1,500-2,000 sq ft").is_unbounded());
        assert_eq!(
            extract_budget("2000 sq ft under $400k"),
            BudgetRange { min: None, max: Some(400_000) }
        );
    }

    #[test]
    fn test_synonyms_and_negation() {
        let query = parser()
            .parse("Something with a big yard but no pool, in Green Hills")
            .unwrap();

        assert!(query.features.contains("garden"));
        assert!(!query.features.contains("pool"));
        assert!(query.locations.contains("Green Hills"));
    }

    #[test]
    fn test_store_vocabulary() {
        let parser = PreferenceParser::new().with_features(["Wine Cellar"]);
        let query = parser.parse("must have a wine cellar").unwrap();

        assert!(query.features.contains("wine cellar"));
    }

    #[test]
    fn test_empty_statement() {
        assert_eq!(parser().parse("   "), Err(ParseError::Empty));
    }

    #[test]
    fn test_no_constraints() {
        let result = parser().parse("I want something nice");
        assert!(matches!(result, Err(ParseError::NoConstraints(_))));
    }

    #[test]
    fn test_inverted_budget() {
        let result = parser().parse("over 500k and under 300k");
        assert_eq!(result, Err(ParseError::InvalidBudget { min: 500_000, max: 300_000 }));
    }
}
