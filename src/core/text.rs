//! Small text helpers shared by the parser and the description generator.

/// Words that negate a feature mentioned right after them ("no pool")
const NEGATIONS: &[&str] = &["no", "not", "without", "never", "avoid", "don't", "dont", "nor"];

/// How many words before a term are checked for a negation
const NEGATION_WINDOW: usize = 3;

#[inline]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Byte offsets of every whole-word occurrence of `term` in `haystack`
///
/// Both arguments are expected to be lowercased already.
pub fn find_term<'a>(haystack: &'a str, term: &'a str) -> impl Iterator<Item = usize> + 'a {
    haystack
        .match_indices(term)
        .map(|(idx, _)| idx)
        .filter(move |&idx| {
            let before_ok = haystack[..idx].chars().next_back().map_or(true, |c| !is_word_char(c));
            let after_ok = haystack[idx + term.len()..]
                .chars()
                .next()
                .map_or(true, |c| !is_word_char(c));
            !term.is_empty() && before_ok && after_ok
        })
}

/// The term itself plus its regular plural spellings
///
/// "garage" also matches "garages", "porch" matches "porches" and
/// "balcony" matches "balconies".
pub fn term_forms(term: &str) -> Vec<String> {
    let term = term.to_lowercase();
    let mut forms = vec![format!("{}s", term), format!("{}es", term)];

    if let Some(stem) = term.strip_suffix('y') {
        let consonant_before = stem
            .chars()
            .next_back()
            .map_or(false, |c| c.is_alphabetic() && !"aeiou".contains(c));
        if consonant_before && stem.chars().count() > 1 {
            forms.push(format!("{}ies", stem));
        }
    }

    forms.insert(0, term);
    forms
}

/// Whole-word, case-insensitive containment of a term or one of its plurals
pub fn contains_term(haystack: &str, term: &str) -> bool {
    let haystack = haystack.to_lowercase();
    term_forms(term)
        .iter()
        .any(|form| find_term(&haystack, form).next().is_some())
}

/// Like [`contains_term`], but ignores occurrences preceded by a negation
/// within a few words ("without a pool")
pub fn mentions_positively(haystack: &str, term: &str) -> bool {
    let haystack = haystack.to_lowercase();
    let forms = term_forms(term);

    forms.iter().any(|form| {
        let mut hits = find_term(&haystack, form);
        hits.any(|idx| !is_negated(&haystack[..idx]))
    })
}

/// Negations only reach back to the start of the current clause
fn is_negated(prefix: &str) -> bool {
    let clause = prefix
        .rfind(|c: char| matches!(c, ',' | ';' | '.' | '!' | '?'))
        .map_or(prefix, |idx| &prefix[idx + 1..]);

    clause
        .split(|c: char| !(is_word_char(c) || c == '\''))
        .filter(|w| !w.is_empty())
        .rev()
        .take(NEGATION_WINDOW)
        .take_while(|w| *w != "but")
        .any(|w| NEGATIONS.contains(&w))
}

/// Split text into sentences, keeping the terminating punctuation
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        // "2.5 baths" and "$1.2m" are not sentence ends
        let decimal_point = c == '.' && chars.peek().map_or(false, |n| n.is_ascii_digit());
        if matches!(c, '.' | '!' | '?' | '\n') && !decimal_point {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }

    sentences
}

/// Truncate to at most `max_chars` characters (ellipsis included), cutting
/// at a word boundary
pub fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    let trimmed = match cut.rfind(char::is_whitespace) {
        Some(idx) if idx > 0 => &cut[..idx],
        _ => cut.as_str(),
    };

    let trimmed = trimmed.trim_end_matches(|c: char| c == ',' || c == ';' || c == ':' || c.is_whitespace());
    format!("{}…", trimmed)
}

/// Lowercase and collapse whitespace, used for cache keys
pub fn normalize_statement(statement: &str) -> String {
    statement
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
