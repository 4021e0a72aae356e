use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TermScore {
    pub token: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LexicalSimilarityResult {
    pub similarity: f64,
    pub main_terms: Vec<TermScore>,
    pub cited_terms: Vec<TermScore>,
}
