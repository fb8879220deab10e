use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::embedding::{Embedder, cosine_similarity};
use crate::error::ChatError;
use crate::index::{Document, SummaryIndex};

/// A retrieved document with its similarity to the query.
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f32,
}

/// Trait for similarity retrieval over the pre-built index.
#[async_trait]
pub trait DocumentRetriever: Send + Sync {
    /// Return up to `k` documents ordered by descending similarity to the
    /// query. Fails with [`ChatError::IndexUnavailable`] when the index is
    /// empty or the query cannot be embedded against it.
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredDocument>, ChatError>;
}

/// Nearest-neighbor retriever over an in-memory [`SummaryIndex`].
///
/// Embeds the query with the same scheme the index was built with and ranks
/// every indexed document by cosine similarity.
pub struct IndexRetriever {
    index: SummaryIndex,
    embedder: Arc<dyn Embedder>,
}

impl IndexRetriever {
    pub fn new(index: SummaryIndex, embedder: Arc<dyn Embedder>) -> Self {
        Self { index, embedder }
    }
}

#[async_trait]
impl DocumentRetriever for IndexRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredDocument>, ChatError> {
        if self.index.is_empty() {
            return Err(ChatError::IndexUnavailable(
                "the similarity index is empty — build it before serving".into(),
            ));
        }

        let query_embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| ChatError::IndexUnavailable(format!("query embedding failed: {e}")))?;

        let mut scored: Vec<ScoredDocument> = self
            .index
            .documents
            .iter()
            .filter(|doc| doc.embedding.len() == query_embedding.len())
            .map(|doc| ScoredDocument {
                document: doc.document.clone(),
                score: cosine_similarity(&query_embedding, &doc.embedding),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);

        debug!(k, returned = scored.len(), "retrieval completed");
        Ok(scored)
    }
}
