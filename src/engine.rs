use std::sync::Arc;
use tracing::{info, warn};

use crate::error::ChatError;
use crate::extractor::FactExtractor;
use crate::generation::Generator;
use crate::profile::ProfileStore;
use crate::prompt;
use crate::retriever::DocumentRetriever;

/// The conversation orchestrator. Sequences one turn strictly through
/// extract → merge → retrieve → compose → generate; only the Profile Store
/// carries state across turns.
///
/// Component implementations are injected, so LLM-backed stages can be
/// replaced with test doubles.
pub struct ChatEngine {
    extractor: Arc<dyn FactExtractor>,
    retriever: Arc<dyn DocumentRetriever>,
    generator: Arc<dyn Generator>,
    profiles: ProfileStore,
    top_k: usize,
}

impl ChatEngine {
    pub fn new(
        extractor: Arc<dyn FactExtractor>,
        retriever: Arc<dyn DocumentRetriever>,
        generator: Arc<dyn Generator>,
        top_k: usize,
    ) -> Self {
        Self {
            extractor,
            retriever,
            generator,
            profiles: ProfileStore::new(),
            top_k,
        }
    }

    /// Run one conversation turn and return the grounded answer.
    ///
    /// A failed extraction is absorbed: the turn continues with no profile
    /// update and the failure is logged. Retrieval and generation failures
    /// abort the turn.
    pub async fn chat(
        &self,
        session: &str,
        message: &str,
        history: &[String],
    ) -> Result<String, ChatError> {
        match self.extractor.extract(message).await {
            Ok(partial) => {
                let profile = self.profiles.merge(session, &partial).await;
                info!(session, known = %profile.summarize(), "facts updated");
            }
            Err(e) => {
                warn!(session, "continuing without profile update: {e}");
            }
        }

        let facts = self.profiles.summarize(session).await;
        let query = composite_query(&facts, history, message);

        let retrieved = self.retriever.retrieve(&query, self.top_k).await?;
        let context = retrieved
            .iter()
            .map(|d| d.document.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = prompt::compose(&facts, &context, &query);
        self.generator.generate(&prompt).await
    }

    /// Clear the session's accumulated facts. Idempotent; does not affect
    /// in-flight turns.
    pub async fn reset(&self, session: &str) {
        self.profiles.reset(session).await;
    }

    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }
}

/// Build the single string used both as the retrieval query and as the
/// question slot: the facts digest first, then the full ordered history,
/// then the current message.
fn composite_query(facts: &str, history: &[String], message: &str) -> String {
    let mut query = format!("Známá fakta: {facts}\n");
    for prior in history {
        query.push_str(prior);
        query.push('\n');
    }
    query.push_str(message);
    query
}
