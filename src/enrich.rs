//! Enrichment orchestrator.
//!
//! Resolves each title to an artifact via the cache, falling back to
//! generation under a hard per-request budget. Titles are processed strictly
//! in input order so earlier titles are preferentially serviced when the
//! budget runs out; results come back in the same order.

use std::sync::Arc;

use crate::cache::index::SimilarityIndex;
use crate::cache::policy::{decide, Decision};
use crate::cache::writer::{remember, RememberError};
use crate::embedding::EmbeddingProvider;
use crate::generate::ImageGenerator;

/// How a title's result was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleOutcome {
    /// A stored artifact was similar enough to reuse.
    CacheHit,
    /// A new artifact was generated and remembered for future reuse.
    Generated,
    /// A new artifact was generated but the cache write failed; the artifact
    /// is still usable, only future reuse is lost.
    GeneratedNotCached,
    /// The generation budget was already spent when this miss arrived.
    BudgetExhausted,
    /// Embedding or generation failed for this title; the rest of the batch
    /// is unaffected.
    Failed,
}

/// Per-title enrichment result, in input order.
#[derive(Debug, Clone)]
pub struct EnrichedTitle {
    pub title: String,
    pub artifact: Option<String>,
    pub outcome: TitleOutcome,
}

/// Wires the embedder, similarity index, and generator into the per-title
/// resolution pipeline.
pub struct Enricher {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn SimilarityIndex>,
    generator: Arc<dyn ImageGenerator>,
    similarity_threshold: f64,
}

impl Enricher {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn SimilarityIndex>,
        generator: Arc<dyn ImageGenerator>,
        similarity_threshold: f64,
    ) -> Self {
        Self {
            embedder,
            index,
            generator,
            similarity_threshold,
        }
    }

    /// Resolve every title to an artifact (or none), spending at most
    /// `max_generations` calls to the generator, in input order.
    pub async fn enrich(
        &self,
        titles: &[String],
        max_generations: usize,
    ) -> Vec<EnrichedTitle> {
        let mut results = Vec::with_capacity(titles.len());
        let mut generations_used = 0usize;

        for title in titles {
            let result = self
                .resolve_title(title, &mut generations_used, max_generations)
                .await;
            tracing::debug!(title = %title, outcome = ?result.outcome, "title resolved");
            results.push(result);
        }

        results
    }

    async fn resolve_title(
        &self,
        title: &str,
        generations_used: &mut usize,
        max_generations: usize,
    ) -> EnrichedTitle {
        let vector = match self.embedder.embed(title) {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(title, error = %err, "embedding failed, skipping title");
                return EnrichedTitle {
                    title: title.to_string(),
                    artifact: None,
                    outcome: TitleOutcome::Failed,
                };
            }
        };

        // A storage failure on the read path degrades to "no match": the
        // cache is a cost optimization, not a correctness requirement.
        let best = match self.index.query(&vector, 1) {
            Ok(matches) => matches.into_iter().next(),
            Err(err) => {
                tracing::warn!(title, error = %err, "index query failed, treating as miss");
                None
            }
        };

        if let Some(scored) = &best {
            tracing::info!(title, score = scored.score, "vector search score");
        }

        match decide(best.as_ref(), self.similarity_threshold) {
            Decision::Hit(artifact_ref) => EnrichedTitle {
                title: title.to_string(),
                artifact: Some(artifact_ref),
                outcome: TitleOutcome::CacheHit,
            },
            Decision::Miss => {
                self.generate_and_remember(title, generations_used, max_generations)
                    .await
            }
        }
    }

    async fn generate_and_remember(
        &self,
        title: &str,
        generations_used: &mut usize,
        max_generations: usize,
    ) -> EnrichedTitle {
        if *generations_used >= max_generations {
            tracing::info!(title, max_generations, "generation budget exhausted");
            return EnrichedTitle {
                title: title.to_string(),
                artifact: None,
                outcome: TitleOutcome::BudgetExhausted,
            };
        }

        // Budget is consumed by the attempt, success or not: a failed call
        // still cost a round-trip to the rate-limited backend.
        *generations_used += 1;

        let artifact = match self.generator.generate(title).await {
            Ok(artifact) => artifact,
            Err(err) => {
                tracing::warn!(title, error = %err, "image generation failed");
                return EnrichedTitle {
                    title: title.to_string(),
                    artifact: None,
                    outcome: TitleOutcome::Failed,
                };
            }
        };

        // Best-effort: the artifact is already in hand, a failed write only
        // loses the future-reuse benefit.
        let outcome = match remember(self.embedder.as_ref(), self.index.as_ref(), title, &artifact)
        {
            Ok(_) => TitleOutcome::Generated,
            Err(RememberError::Storage(err)) => {
                tracing::warn!(title, error = %err, "failed to cache generated image");
                TitleOutcome::GeneratedNotCached
            }
            Err(RememberError::Embedding(err)) => {
                tracing::warn!(title, error = %err, "failed to re-embed title for caching");
                TitleOutcome::GeneratedNotCached
            }
        };

        EnrichedTitle {
            title: title.to_string(),
            artifact: Some(artifact),
            outcome,
        }
    }
}
