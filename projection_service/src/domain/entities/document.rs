use serde::{Deserialize, Serialize};

/// Components of a document embedding, as produced by the embedding provider
pub type EmbeddingVector = Vec<f64>;

/// Embedding reduced to 3 components, only used for spatial plotting
pub type ReducedEmbedding = [f64; 3];

/// Identifier of a document: patent numbers come either as strings or integers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DocumentId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentId::Number(id) => id.fmt(f),
            DocumentId::Text(id) => id.fmt(f),
        }
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        DocumentId::Text(value.to_string())
    }
}

impl From<i64> for DocumentId {
    fn from(value: i64) -> Self {
        DocumentId::Number(value)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentRef {
    pub id: DocumentId,
    pub embedding: EmbeddingVector,
    /// Reduced embeddings are not always computed, the spatial projection needs them
    #[serde(default)]
    pub reduced_embedding: Option<Vec<f64>>,
}

/// One main patent compared against the patents it cites
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ComparisonRequest {
    pub main_patent: DocumentRef,
    pub cited_patents: Vec<DocumentRef>,
}
