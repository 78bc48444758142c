//! Request orchestration for `chat` and document `query`.

use std::sync::Arc;

use rag_store::{DocFilter, clamp_excerpt};
use tracing::{error, info, instrument};

use crate::api_types::{ChatRequest, ChatResponse, Citation, QueryAnswer, QueryRequest};
use crate::cfg::ContextorConfig;
use crate::collaborators::{AnswerGenerator, Embedder, EmissionsReader, Sleeper, VectorSearcher};
use crate::error::ContextorError;
use crate::generate::{RetryPolicy, generate_answer};
use crate::prompt::{assemble_prompt, build_source_context, query_prompt};
use crate::retrieve::{ContextRetriever, RetrievedContext};

/// Shown instead of a model answer once generation is exhausted.
pub const FALLBACK_RESPONSE: &str = "I apologize, but I'm experiencing temporary difficulties connecting to the AI service. However, I can still help you! Here's what I can tell you:\n\n\
• You have active hotspots that need attention\n\
• There are pending recommendations to reduce emissions\n\
• Your emissions data is being monitored\n\n\
Please try asking your question again in a moment, or try rephrasing it.";

pub const FALLBACK_ERROR: &str = "AI service temporarily unavailable";

pub const NO_SOURCES_ANSWER: &str =
    "I don't have enough information in the uploaded notes to answer that.";

const CITATION_EXCERPT_CHARS: usize = 150;

/// Everything the pipeline talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub embedder: Arc<dyn Embedder>,
    pub searcher: Arc<dyn VectorSearcher>,
    pub emissions: Arc<dyn EmissionsReader>,
    pub llm: Arc<dyn AnswerGenerator>,
    pub sleeper: Arc<dyn Sleeper>,
}

pub struct ChatPipeline {
    retriever: ContextRetriever,
    embedder: Arc<dyn Embedder>,
    searcher: Arc<dyn VectorSearcher>,
    llm: Arc<dyn AnswerGenerator>,
    sleeper: Arc<dyn Sleeper>,
    retry: RetryPolicy,
    query_top_k: u64,
}

impl ChatPipeline {
    pub fn new(c: Collaborators, cfg: &ContextorConfig) -> Self {
        let retriever = ContextRetriever::new(
            c.embedder.clone(),
            c.searcher.clone(),
            c.emissions,
            cfg.retrieval_limits(),
        );
        Self {
            retriever,
            embedder: c.embedder,
            searcher: c.searcher,
            llm: c.llm,
            sleeper: c.sleeper,
            retry: cfg.retry_policy(),
            query_top_k: cfg.query_top_k,
        }
    }

    /// Answers one chat message.
    ///
    /// Only a missing or blank message is an error. Generation failures
    /// produce the fallback response with `error` set.
    #[instrument(skip_all)]
    pub async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse, ContextorError> {
        let message = required_text(req.message.as_deref(), "Message is required")?;
        info!(message = %preview(message, 50), "processing chat message");

        let ctx = self.retriever.retrieve(message).await;
        let system = assemble_prompt(ctx.emissions.text(), ctx.document.text());

        match generate_answer(
            self.llm.as_ref(),
            self.sleeper.as_ref(),
            &self.retry,
            message,
            &system,
        )
        .await
        {
            Ok(answer) => {
                info!("chat response generated");
                Ok(answered(answer, &ctx))
            }
            Err(e) => {
                error!(error = %e, "chat failed; returning fallback");
                Ok(fallback())
            }
        }
    }

    /// Grounded answer over uploaded documents, with citations.
    ///
    /// Single model call; failures propagate to the caller.
    #[instrument(skip_all)]
    pub async fn query(&self, req: &QueryRequest) -> Result<QueryAnswer, ContextorError> {
        let question = required_text(req.question.as_deref(), "Question is required")?;
        let top_k = req.top_k.filter(|k| *k > 0).unwrap_or(self.query_top_k);
        let filter = req
            .file_name
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(DocFilter::file_name);

        let vector = self.embedder.embed(question).await?;
        let matches = self.searcher.search(vector, filter.as_ref(), top_k).await?;

        if matches.is_empty() {
            info!("no document chunks matched; skipping generation");
            return Ok(QueryAnswer {
                answer: NO_SOURCES_ANSWER.to_string(),
                citations: Vec::new(),
            });
        }

        let prompt = query_prompt(&build_source_context(&matches), question);
        let answer = self.llm.invoke(&prompt).await?;

        let citations = matches
            .into_iter()
            .map(|m| Citation {
                excerpt: clamp_excerpt(&m.text_excerpt, CITATION_EXCERPT_CHARS),
                file_name: m.source_file_name,
                page: m.page_number,
                score: m.similarity_score,
            })
            .collect();

        info!("generated answer for query");
        Ok(QueryAnswer { answer, citations })
    }
}

fn required_text<'a>(v: Option<&'a str>, msg: &'static str) -> Result<&'a str, ContextorError> {
    match v {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(ContextorError::Validation(msg)),
    }
}

fn answered(answer: String, ctx: &RetrievedContext) -> ChatResponse {
    ChatResponse {
        response: answer,
        has_document_context: ctx.document.is_present(),
        has_emissions_context: ctx.emissions.is_present(),
        error: None,
    }
}

pub fn fallback() -> ChatResponse {
    ChatResponse {
        response: FALLBACK_RESPONSE.to_string(),
        has_document_context: false,
        has_emissions_context: false,
        error: Some(FALLBACK_ERROR.to_string()),
    }
}

fn preview(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    fn pipeline(fx: &Fixture) -> ChatPipeline {
        ChatPipeline::new(fx.collaborators(), &ContextorConfig::default())
    }

    #[tokio::test]
    async fn blank_message_calls_nothing() {
        for msg in [None, Some(""), Some("   \n\t")] {
            let fx = Fixture::with_llm(FakeLlm::answering("unused"));
            let req = ChatRequest {
                message: msg.map(str::to_string),
                context: None,
            };
            let err = pipeline(&fx).chat(&req).await.unwrap_err();
            assert!(matches!(err, ContextorError::Validation(_)));
            assert_eq!(fx.total_calls(), 0);
        }
    }

    #[tokio::test]
    async fn empty_sources_and_first_try_success() {
        let fx = Fixture::with_llm(FakeLlm::answering("Hello"));
        let out = pipeline(&fx).chat(&ChatRequest::new("Hi")).await.unwrap();
        assert_eq!(
            out,
            ChatResponse {
                response: "Hello".into(),
                has_document_context: false,
                has_emissions_context: false,
                error: None,
            }
        );
        assert_eq!(fx.llm.calls(), 1);
    }

    #[tokio::test]
    async fn failing_stores_still_answer() {
        let fx = Fixture::with_llm(FakeLlm::answering("Still here"));
        fx.searcher.fail();
        fx.emissions.fail_all();

        let out = pipeline(&fx).chat(&ChatRequest::new("status?")).await.unwrap();
        assert_eq!(out.response, "Still here");
        assert!(!out.has_document_context && !out.has_emissions_context);
        assert!(out.error.is_none());
        assert!(fx.llm.prompts()[0].contains("No documents have been uploaded yet"));
    }

    #[tokio::test]
    async fn exhausted_generation_returns_fallback() {
        let fx = Fixture::with_llm(FakeLlm::scripted(vec![Reply::Fail; 3]));
        fx.emissions.set_hotspots(vec![supplier_hotspot()]);
        fx.searcher.set_matches(vec![chunk("a.pdf", 0.9, "alpha")]);

        let out = pipeline(&fx).chat(&ChatRequest::new("help")).await.unwrap();
        assert_eq!(out, fallback());
        assert_eq!(out.error.as_deref(), Some(FALLBACK_ERROR));
        assert_eq!(fx.llm.calls(), 3);
        assert_eq!(fx.sleeper.delays().len(), 2);
    }

    #[tokio::test]
    async fn flags_follow_present_sources() {
        let fx = Fixture::with_llm(FakeLlm::answering("ok"));
        fx.emissions.set_hotspots(vec![supplier_hotspot()]);

        let out = pipeline(&fx).chat(&ChatRequest::new("q")).await.unwrap();
        assert!(out.has_emissions_context);
        assert!(!out.has_document_context);

        let prompt = &fx.llm.prompts()[0];
        assert!(prompt.contains("1 active hotspots"));
        assert!(prompt.contains("A (CRITICAL: 100.00 kg CO₂, 100.0% above baseline)"));
        assert!(prompt.ends_with("User Question: q\n\nProvide a helpful, concise answer:"));
    }

    #[tokio::test]
    async fn query_cites_sources_with_clamped_excerpts() {
        let fx = Fixture::with_llm(FakeLlm::answering("Scope 3 is indirect [a.pdf p1]."));
        let long = "x".repeat(400);
        fx.searcher
            .set_matches(vec![chunk("a.pdf", 0.91, &long), chunk("b.pdf", 0.52, "short")]);

        let req = QueryRequest {
            question: Some("What is scope 3?".into()),
            top_k: None,
            file_name: Some("a.pdf".into()),
        };
        let out = pipeline(&fx).query(&req).await.unwrap();

        assert_eq!(out.answer, "Scope 3 is indirect [a.pdf p1].");
        assert_eq!(out.citations.len(), 2);
        assert_eq!(out.citations[0].excerpt.chars().count(), 153);
        assert_eq!(out.citations[1].excerpt, "short...");
        assert_eq!(fx.searcher.last_top_k(), Some(5));
        assert_eq!(
            fx.searcher.last_filter(),
            Some(vec![("fileName".to_string(), serde_json::json!("a.pdf"))])
        );
        assert!(fx.llm.prompts()[0].contains("[Source 2: b.pdf, Page 1]\nshort"));
    }

    #[tokio::test]
    async fn query_without_matches_skips_the_model() {
        let fx = Fixture::with_llm(FakeLlm::answering("unused"));
        let req = QueryRequest {
            question: Some("anything?".into()),
            top_k: Some(2),
            file_name: None,
        };
        let out = pipeline(&fx).query(&req).await.unwrap();
        assert_eq!(out.answer, NO_SOURCES_ANSWER);
        assert!(out.citations.is_empty());
        assert_eq!(fx.llm.calls(), 0);
        assert_eq!(fx.searcher.last_top_k(), Some(2));
        assert_eq!(fx.searcher.last_filter(), None);
    }

    #[tokio::test]
    async fn query_propagates_search_failure() {
        let fx = Fixture::with_llm(FakeLlm::answering("unused"));
        fx.searcher.fail();
        let req = QueryRequest {
            question: Some("q".into()),
            ..Default::default()
        };
        assert!(matches!(
            pipeline(&fx).query(&req).await,
            Err(ContextorError::Unavailable(_))
        ));
    }
}
