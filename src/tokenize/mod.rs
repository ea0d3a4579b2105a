//! Shared tokenization pipeline: HTML tag classification, word
//! splitting, stemming and stopword filtering.
//!
//! This is the "shared model" slice of the system — both the indexer
//! and the search engine tokenize through [`TokenPipeline`] so that a
//! query term and an indexed term are always stemmed identically.

pub mod html;

use std::collections::HashSet;

/// Tags whose text contributes tokens at normal weight.
pub const TEXT_TAGS: &[&str] = &["p", "ul", "ol", "li", "table", "tr", "td", "cite", "q"];

/// Tags whose text contributes tokens at `important_mult` weight, and
/// whose stopwords are retained rather than dropped.
pub const IMPORTANT_TAGS: &[&str] = &["h1", "h2", "h3", "b", "strong", "title"];

pub fn is_important_tag(name: &str) -> bool {
    IMPORTANT_TAGS.contains(&name)
}

pub fn is_indexed_tag(name: &str) -> bool {
    TEXT_TAGS.contains(&name) || IMPORTANT_TAGS.contains(&name)
}

/// Stemmer + stopword filter shared by indexing and querying.
pub struct TokenPipeline {
    stopwords: HashSet<String>,
}

impl Default for TokenPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenPipeline {
    pub fn new() -> Self {
        let stopwords = stop_words::get(stop_words::LANGUAGE::English)
            .into_iter()
            .collect();
        Self { stopwords }
    }

    /// Lowercase + Porter-stem a single word. The caller is responsible
    /// for having already restricted `word` to alphanumeric characters.
    fn normalize(&self, word: &str) -> String {
        porter_stemmer::stem(&word.to_lowercase())
    }

    pub fn is_stopword(&self, stemmed: &str) -> bool {
        self.stopwords.contains(stemmed)
    }

    /// Tokenize a query string: split, lowercase, stem. No stopword
    /// filtering or weighting — queries are scored term-by-term as
    /// typed.
    pub fn tokenize_query(&self, text: &str) -> Vec<String> {
        split_alnum_words(text).map(|w| self.normalize(w)).collect()
    }

    /// Tokenize one HTML tag's text per the indexing rules:
    /// - stopwords are dropped unless the tag is important
    /// - tokens from an important tag are emitted `important_mult` times
    pub fn tokenize_tag(&self, text: &str, is_important: bool, important_mult: u32) -> Vec<String> {
        let mut out = Vec::new();
        for word in split_alnum_words(text) {
            let token = self.normalize(word);
            if token.is_empty() {
                continue;
            }
            if !is_important && self.is_stopword(&token) {
                continue;
            }
            let reps = if is_important { important_mult } else { 1 };
            for _ in 0..reps {
                out.push(token.clone());
            }
        }
        out
    }
}

/// Split on non-alphanumeric boundaries, dropping empty pieces. Every
/// resulting piece is alphanumeric by construction, which is equivalent
/// to a whitespace/punctuation tokenizer followed by an `is_alnum`
/// filter.
fn split_alnum_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_stopwords_outside_important_tags() {
        let pipeline = TokenPipeline::new();
        let tokens = pipeline.tokenize_tag("the quick fox", false, 3);
        assert!(!tokens.iter().any(|t| t == &pipeline.normalize("the")));
    }

    #[test]
    fn retains_and_triples_stopwords_inside_important_tags() {
        let pipeline = TokenPipeline::new();
        let tokens = pipeline.tokenize_tag("the", true, 3);
        assert_eq!(tokens.len(), 3);
        assert!(tokens.iter().all(|t| t == &pipeline.normalize("the")));
    }

    #[test]
    fn splits_on_punctuation() {
        let words: Vec<&str> = split_alnum_words("co-op, rock'n'roll").collect();
        assert_eq!(words, vec!["co", "op", "rock", "n", "roll"]);
    }
}
