//! TF-IDF comparison of two texts.
//!
//! The corpus is made of the two compared texts only. With 2 documents the inverse
//! document frequency can only take 2 values, so weights are mostly driven by term counts:
//! scores are a coarse lexical overlap, not a corpus-level relevance.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use super::stop_words::is_stop_word;
use crate::domain::{
    entities::lexical::{LexicalSimilarityResult, TermScore},
    projection_error::ProjectionError,
};

/// Maximum size of the vocabulary, the most frequent terms of the corpus are kept
pub const MAX_FEATURES: usize = 100;
/// Maximum number of terms returned for each text
pub const MAX_TERMS: usize = 50;

/// Words of at least 2 characters
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").unwrap());

#[tracing::instrument(
    name = "Scoring lexical similarity",
    skip(main_text, cited_text),
    fields(main_len = main_text.len(), cited_len = cited_text.len())
)]
pub fn score_lexical_similarity(
    main_text: &str,
    cited_text: &str,
) -> Result<LexicalSimilarityResult, ProjectionError> {
    let main_text = main_text.trim();
    let cited_text = cited_text.trim();
    if main_text.is_empty() || cited_text.is_empty() {
        return Err(ProjectionError::EmptyInput(
            "main and cited texts are required".to_string(),
        ));
    }

    let counts = [count_terms(main_text), count_terms(cited_text)];
    let vocabulary = build_vocabulary(&counts);
    if vocabulary.is_empty() {
        return Err(ProjectionError::EmptyInput(
            "empty vocabulary, the texts may only contain stop words".to_string(),
        ));
    }
    debug!(features = vocabulary.len(), "Vocabulary built");

    let idf: Vec<f64> = vocabulary
        .iter()
        .map(|term| {
            let document_frequency = counts.iter().filter(|c| c.contains_key(term)).count();
            inverse_document_frequency(counts.len(), document_frequency)
        })
        .collect();

    let main_weights = weigh(&counts[0], &vocabulary, &idf);
    let cited_weights = weigh(&counts[1], &vocabulary, &idf);

    // Rows are L2-normalized: the dot product is the cosine similarity
    let similarity = main_weights
        .iter()
        .zip(cited_weights.iter())
        .map(|(a, b)| a * b)
        .sum();

    Ok(LexicalSimilarityResult {
        similarity,
        main_terms: top_terms(&vocabulary, &main_weights),
        cited_terms: top_terms(&vocabulary, &cited_weights),
    })
}

/// Lowercased words, stop words removed
fn tokenize(text: &str) -> Vec<String> {
    let text = text.to_lowercase();
    WORD_RE
        .find_iter(&text)
        .map(|word| word.as_str())
        .filter(|word| !is_stop_word(word))
        .map(str::to_string)
        .collect()
}

/// Counts unigrams and bigrams of a text
fn count_terms(text: &str) -> BTreeMap<String, usize> {
    let words = tokenize(text);
    let bigrams = words.windows(2).map(|pair| pair.join(" "));

    let mut counts = BTreeMap::new();
    for term in words.iter().cloned().chain(bigrams) {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}

/// Terms of the corpus, in lexicographic order, capped to the `MAX_FEATURES` most frequent ones
fn build_vocabulary(counts: &[BTreeMap<String, usize>]) -> Vec<String> {
    let mut corpus_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for document_counts in counts {
        for (term, count) in document_counts {
            *corpus_counts.entry(term.as_str()).or_insert(0) += count;
        }
    }

    let mut by_frequency: Vec<(&str, usize)> = corpus_counts.into_iter().collect();
    // Stable: equally frequent terms keep their lexicographic order
    by_frequency.sort_by(|a, b| b.1.cmp(&a.1));

    by_frequency
        .into_iter()
        .take(MAX_FEATURES)
        .map(|(term, _)| term.to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Smoothed IDF, as if an extra document contained every term once
fn inverse_document_frequency(nb_documents: usize, document_frequency: usize) -> f64 {
    ((1.0 + nb_documents as f64) / (1.0 + document_frequency as f64)).ln() + 1.0
}

/// L2-normalized TF-IDF weights of a document, aligned on the vocabulary
fn weigh(counts: &BTreeMap<String, usize>, vocabulary: &[String], idf: &[f64]) -> Vec<f64> {
    let weights: Vec<f64> = vocabulary
        .iter()
        .zip(idf)
        .map(|(term, idf)| *counts.get(term).unwrap_or(&0) as f64 * idf)
        .collect();

    let norm = weights.iter().map(|w| w * w).sum::<f64>().sqrt();
    if norm == 0.0 {
        return weights;
    }
    weights.into_iter().map(|w| w / norm).collect()
}

/// Terms with a positive weight, heaviest first, ties kept in vocabulary order
fn top_terms(vocabulary: &[String], weights: &[f64]) -> Vec<TermScore> {
    let mut terms: Vec<TermScore> = vocabulary
        .iter()
        .zip(weights)
        .filter(|(_, weight)| **weight > 0.0)
        .map(|(term, weight)| TermScore {
            token: term.clone(),
            score: *weight,
        })
        .collect();

    terms.sort_by(|a, b| b.score.total_cmp(&a.score));
    terms.truncate(MAX_TERMS);
    terms
}
