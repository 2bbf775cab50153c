use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    // Words keep single interior apostrophes, periods and hyphens: "u.s.", "o'neil", "e-mail".
    static ref RE: Regex = Regex::new(r"[\p{L}\p{N}]+(?:['.\-][\p{L}\p{N}]+)*").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Split text into raw word tokens after NFKC normalization.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>();
    RE.find_iter(&normalized).map(|m| m.as_str().to_string()).collect()
}

/// Turn one raw token into an index term: NFKC, lowercase, strip surrounding
/// punctuation, stem. Yields an empty string if nothing indexable is left.
pub fn normalize(raw: &str) -> String {
    let lowered = raw.nfkc().collect::<String>().to_lowercase();
    let trimmed = lowered.trim_matches(|c: char| !c.is_alphanumeric());
    if trimmed.is_empty() {
        return String::new();
    }
    STEMMER.stem(trimmed).into_owned()
}

/// Tokenize and normalize, preserving order and repeats.
pub fn terms(text: &str) -> Vec<String> {
    tokenize(text)
        .iter()
        .map(|t| normalize(t))
        .filter(|t| !t.is_empty())
        .collect()
}
