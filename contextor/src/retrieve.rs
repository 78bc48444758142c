//! Context retrieval: uploaded-document excerpts and the emissions summary.
//!
//! Neither source can fail the request. A failing collaborator turns its
//! source into [`ContextSource::Degraded`], which renders as empty text.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::collaborators::{Embedder, EmissionsReader, VectorSearcher};
use crate::error::ContextorError;
use crate::summary;

/// Outcome of reading one context source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContextSource {
    /// Non-empty text to put in the prompt.
    Present(String),
    /// The source answered, but had nothing to contribute.
    Absent,
    /// The source failed; the reason is kept for logs and tests.
    Degraded(String),
}

impl ContextSource {
    pub fn from_text(text: String) -> Self {
        if text.is_empty() {
            Self::Absent
        } else {
            Self::Present(text)
        }
    }

    /// Prompt text; empty unless `Present`.
    pub fn text(&self) -> &str {
        match self {
            Self::Present(t) => t,
            Self::Absent | Self::Degraded(_) => "",
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetrievedContext {
    pub document: ContextSource,
    pub emissions: ContextSource,
}

/// Row limits for each read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetrievalLimits {
    pub document_top_k: u64,
    pub hotspots: usize,
    pub recommendations: usize,
    pub events: usize,
}

impl Default for RetrievalLimits {
    fn default() -> Self {
        Self {
            document_top_k: 3,
            hotspots: 10,
            recommendations: 5,
            events: 10,
        }
    }
}

pub struct ContextRetriever {
    embedder: Arc<dyn Embedder>,
    searcher: Arc<dyn VectorSearcher>,
    emissions: Arc<dyn EmissionsReader>,
    limits: RetrievalLimits,
}

impl ContextRetriever {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        searcher: Arc<dyn VectorSearcher>,
        emissions: Arc<dyn EmissionsReader>,
        limits: RetrievalLimits,
    ) -> Self {
        Self {
            embedder,
            searcher,
            emissions,
            limits,
        }
    }

    /// Both context sources for `question`. Never fails.
    #[instrument(skip_all)]
    pub async fn retrieve(&self, question: &str) -> RetrievedContext {
        let document = self.document_context(question).await;
        let emissions = self.emissions_context().await;
        RetrievedContext {
            document,
            emissions,
        }
    }

    /// Excerpts of the nearest uploaded chunks, blank-line separated.
    pub async fn document_context(&self, question: &str) -> ContextSource {
        match self.fetch_document_context(question).await {
            Ok(text) => ContextSource::from_text(text),
            Err(e) => {
                warn!(error = %e, "document search failed; continuing without document context");
                ContextSource::Degraded(e.to_string())
            }
        }
    }

    async fn fetch_document_context(&self, question: &str) -> Result<String, ContextorError> {
        let vector = self.embedder.embed(question).await?;
        let mut matches = self
            .searcher
            .search(vector, None, self.limits.document_top_k)
            .await?;
        matches.truncate(usize::try_from(self.limits.document_top_k).unwrap_or(usize::MAX));

        if matches.is_empty() {
            info!("no relevant document chunks found");
        } else {
            info!(count = matches.len(), "found relevant document chunks");
        }

        Ok(matches
            .iter()
            .map(|m| m.text_excerpt.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n"))
    }

    /// Summary of hotspots, recommendations and recent activity.
    ///
    /// The three reads are independent: each failure only drops its own
    /// paragraphs. The result is `Degraded` only when nothing was rendered
    /// and at least one read failed.
    pub async fn emissions_context(&self) -> ContextSource {
        let mut paragraphs: Vec<String> = Vec::new();
        let mut failures: Vec<String> = Vec::new();

        match self.emissions.active_hotspots(self.limits.hotspots).await {
            Ok(rows) => paragraphs.extend(summary::hotspot_paragraphs(&rows)),
            Err(e) => {
                warn!(error = %e, "hotspot read failed");
                failures.push(format!("hotspots: {e}"));
            }
        }

        match self
            .emissions
            .pending_recommendations(self.limits.recommendations)
            .await
        {
            Ok(rows) => paragraphs.extend(summary::recommendation_paragraph(&rows)),
            Err(e) => {
                warn!(error = %e, "recommendation read failed");
                failures.push(format!("recommendations: {e}"));
            }
        }

        match self.emissions.recent_events(self.limits.events).await {
            Ok(rows) => paragraphs.extend(summary::activity_paragraph(&rows)),
            Err(e) => {
                warn!(error = %e, "event read failed");
                failures.push(format!("events: {e}"));
            }
        }

        debug!(
            paragraphs = paragraphs.len(),
            failures = failures.len(),
            "emissions context built"
        );

        if !paragraphs.is_empty() {
            ContextSource::Present(paragraphs.join("\n\n"))
        } else if failures.is_empty() {
            ContextSource::Absent
        } else {
            ContextSource::Degraded(failures.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    fn retriever(fx: &Fixture) -> ContextRetriever {
        ContextRetriever::new(
            fx.embedder.clone(),
            fx.searcher.clone(),
            fx.emissions.clone(),
            RetrievalLimits::default(),
        )
    }

    #[tokio::test]
    async fn joins_non_empty_excerpts() {
        let fx = Fixture::default();
        fx.searcher.set_matches(vec![
            chunk("a.pdf", 0.9, "alpha"),
            chunk("b.pdf", 0.8, ""),
            chunk("c.pdf", 0.7, "gamma"),
        ]);
        let ctx = retriever(&fx).document_context("q").await;
        assert_eq!(ctx, ContextSource::Present("alpha\n\ngamma".into()));
        assert_eq!(fx.searcher.last_top_k(), Some(3));
    }

    #[tokio::test]
    async fn embedding_failure_degrades_document_context() {
        let fx = Fixture::default();
        fx.embedder.fail();
        let ctx = retriever(&fx).document_context("q").await;
        assert!(ctx.is_degraded());
        assert_eq!(ctx.text(), "");
        assert_eq!(fx.searcher.calls(), 0);
    }

    #[tokio::test]
    async fn one_failed_read_keeps_the_others() {
        let fx = Fixture::default();
        fx.emissions.set_hotspots(vec![supplier_hotspot()]);
        fx.emissions.fail_recommendations();
        fx.emissions.set_events(vec![event("S1"), event("S1")]);

        let ctx = retriever(&fx).emissions_context().await;
        let text = ctx.text();
        assert!(text.contains("1 active hotspots"));
        assert!(!text.contains("Pending Recommendations"));
        assert!(text.ends_with("Recent Activity: 2 events from 1 suppliers (S1)"));
    }

    #[tokio::test]
    async fn all_reads_failing_is_degraded() {
        let fx = Fixture::default();
        fx.emissions.fail_all();
        let ctx = retriever(&fx).emissions_context().await;
        assert!(ctx.is_degraded());
        assert_eq!(ctx.text(), "");
    }

    #[tokio::test]
    async fn empty_tables_are_absent() {
        let fx = Fixture::default();
        let ctx = retriever(&fx).emissions_context().await;
        assert_eq!(ctx, ContextSource::Absent);
    }

    #[tokio::test]
    async fn identical_data_gives_identical_context() {
        let fx = Fixture::default();
        fx.searcher.set_matches(vec![chunk("a.pdf", 0.9, "alpha")]);
        fx.emissions.set_hotspots(vec![supplier_hotspot()]);
        fx.emissions.set_events(vec![event("S2"), event("S1")]);

        let r = retriever(&fx);
        let first = r.retrieve("same question").await;
        let second = r.retrieve("same question").await;
        assert_eq!(first, second);
        assert!(first.document.is_present() && first.emissions.is_present());
    }
}
