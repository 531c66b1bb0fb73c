use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::core::parser::FEATURE_SYNONYMS;
use crate::core::text::{contains_term, split_sentences, truncate_at_word};
use crate::models::{Listing, PreferenceQuery};
use crate::services::{CacheKey, CacheStats, CompletionOptions, DescriptionCache, LanguageModel, LlmError};

/// A description could not be generated for a listing
#[derive(Debug, Error)]
#[error("Failed to generate description for listing {listing_id}: {source}")]
pub struct GenerationError {
    pub listing_id: u64,
    #[source]
    pub source: LlmError,
}

/// Tunables for description generation
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub options: CompletionOptions,
    pub max_chars: usize,
    pub timeout: Duration,
    pub retry_backoff: Duration,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            options: CompletionOptions::default(),
            max_chars: 600,
            timeout: Duration::from_secs(30),
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// Writes personalized, grounded listing descriptions through a language model
///
/// The model only ever sees the listing's own fields. Its output is then
/// filtered: any sentence naming a known feature the listing does not carry
/// is dropped, and the remainder is cut to `max_chars`.
#[derive(Clone)]
pub struct DescriptionGenerator {
    llm: Arc<dyn LanguageModel>,
    settings: GeneratorSettings,
    cache: Option<DescriptionCache>,
}

impl DescriptionGenerator {
    pub fn new(llm: Arc<dyn LanguageModel>, settings: GeneratorSettings) -> Self {
        Self {
            llm,
            settings,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: DescriptionCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Statistics of the description cache, if one is attached
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(DescriptionCache::stats)
    }

    /// Generate a description of `listing` tailored to `query`
    ///
    /// `lexicon` is the set of feature terms the grounding filter knows about.
    /// A failed provider call is retried once, then surfaced with the listing
    /// id attached. The cache holds raw model output, so grounding always runs
    /// against the current lexicon.
    pub async fn describe(
        &self,
        query: &PreferenceQuery,
        listing: &Listing,
        lexicon: &BTreeSet<String>,
    ) -> Result<String, GenerationError> {
        let cache_key = CacheKey::description(listing.id, &query.statement);
        let cached = match &self.cache {
            Some(cache) => cache.get(&cache_key).await,
            None => None,
        };

        let raw = match cached {
            Some(raw) => raw,
            None => {
                let raw = self.generate(query, listing).await?;
                if let Some(cache) = &self.cache {
                    cache.set(cache_key, raw.clone()).await;
                }
                raw
            }
        };

        Ok(ground_description(&raw, listing, lexicon, self.settings.max_chars))
    }

    async fn generate(&self, query: &PreferenceQuery, listing: &Listing) -> Result<String, GenerationError> {
        let system = self.system_prompt();
        let prompt = build_listing_prompt(query, listing);

        let first = match self.complete_with_timeout(&system, &prompt).await {
            Ok(text) => return Ok(text),
            Err(e) => e,
        };

        let backoff = self.retry_delay(&first);
        tracing::warn!(
            "Description for listing {} failed ({}), retrying in {:?}",
            listing.id,
            first,
            backoff
        );
        tokio::time::sleep(backoff).await;

        self.complete_with_timeout(&system, &prompt)
            .await
            .map_err(|source| GenerationError {
                listing_id: listing.id,
                source,
            })
    }

    /// Transient failures wait out the configured backoff, rate limits twice
    /// as long; anything else is retried straight away
    fn retry_delay(&self, error: &LlmError) -> Duration {
        match error {
            LlmError::RateLimited => self.settings.retry_backoff * 2,
            e if e.is_retryable() => self.settings.retry_backoff,
            _ => Duration::ZERO,
        }
    }

    async fn complete_with_timeout(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let call = self.llm.complete(system, prompt, &self.settings.options);
        match tokio::time::timeout(self.settings.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(self.settings.timeout.as_millis() as u64)),
        }
    }

    fn system_prompt(&self) -> String {
        format!(
            "You are a real-estate agent writing a personalized description of a single property \
             for a prospective buyer. Use only the facts given under LISTING. Do not mention any \
             feature, amenity or detail that is not listed there, even if the buyer asked for it. \
             Highlight the listed facts that match the buyer's preferences. Write plain prose in \
             at most {} characters.",
            self.settings.max_chars
        )
    }
}

/// Render a listing's fields as the only context handed to the model
pub fn build_listing_prompt(query: &PreferenceQuery, listing: &Listing) -> String {
    let mut lines = vec![
        "BUYER PREFERENCES:".to_string(),
        query.statement.clone(),
        String::new(),
        "LISTING:".to_string(),
        format!("- Location: {}", listing.location),
        format!("- Price: {}", format_price(listing.price)),
        format!("- Bedrooms: {}", listing.bedrooms),
        format!("- Bathrooms: {}", listing.bathrooms),
    ];

    if let Some(size) = listing.size_sqft {
        lines.push(format!("- Size: {} sqft", size));
    }
    if !listing.features.is_empty() {
        let features: Vec<&str> = listing.features.iter().map(String::as_str).collect();
        lines.push(format!("- Features: {}", features.join(", ")));
    }
    if !listing.description.trim().is_empty() {
        lines.push(format!("- Description: {}", listing.description.trim()));
    }
    if let Some(neighborhood) = listing
        .neighborhood_description
        .as_deref()
        .filter(|n| !n.trim().is_empty())
    {
        lines.push(format!("- Neighborhood: {}", neighborhood.trim()));
    }

    lines.join("\n")
}

/// Keep only sentences that mention no feature absent from the listing, then
/// truncate; falls back to [`fallback_description`] when nothing survives
///
/// Absent features are the lexicon terms the listing lacks plus every
/// synonym of such a term ("backyard" for a listing without a garden).
pub fn ground_description(
    text: &str,
    listing: &Listing,
    lexicon: &BTreeSet<String>,
    max_chars: usize,
) -> String {
    let mut absent: Vec<&str> = lexicon
        .iter()
        .map(String::as_str)
        .filter(|term| !listing.has_feature(term))
        .collect();
    absent.extend(
        FEATURE_SYNONYMS
            .iter()
            .filter(|(alias, canonical)| !listing.has_feature(canonical) && !listing.has_feature(alias))
            .map(|(alias, _)| *alias),
    );

    let kept: Vec<String> = split_sentences(text)
        .into_iter()
        .filter(|sentence| {
            let ungrounded = absent.iter().find(|term| contains_term(sentence, term));
            if let Some(term) = ungrounded {
                tracing::debug!(
                    "Dropping sentence for listing {}: mentions absent feature '{}'",
                    listing.id,
                    term
                );
            }
            ungrounded.is_none()
        })
        .collect();

    let grounded = if kept.is_empty() {
        fallback_description(listing)
    } else {
        kept.join(" ")
    };

    truncate_at_word(&grounded, max_chars)
}

/// Description assembled purely from the listing's fields
pub fn fallback_description(listing: &Listing) -> String {
    let mut description = format!(
        "A {}-bedroom, {}-bathroom home in {} listed at {}.",
        listing.bedrooms,
        listing.bathrooms,
        listing.location,
        format_price(listing.price)
    );

    if !listing.features.is_empty() {
        let features: Vec<&str> = listing.features.iter().map(String::as_str).collect();
        description.push_str(&format!(" It comes with: {}.", features.join(", ")));
    }

    description
}

/// Format a price with a dollar sign and thousands separators
pub fn format_price(price: u64) -> String {
    let digits = price.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    format!("${}", out)
}
