//! Prompt builders: the chat system prompt, the per-attempt chat prompt and
//! the document Q&A template.

use rag_store::DocumentChunkMatch;

const PREAMBLE: &str = "You are a Carbon Intelligence AI assistant helping users understand and reduce their carbon emissions.

You have access to:
1. Real-time emissions data from their supply chain
2. Uploaded documents (PDFs, text files) that users have shared
3. Active hotspots and recommendations

";

pub const DOCUMENT_INSTRUCTION: &str = "IMPORTANT: The user just uploaded a document. Answer their questions based on the document content above.";

pub const NO_DOCUMENT_INSTRUCTION: &str =
    "Note: No documents have been uploaded yet. Focus on emissions data.";

const CLOSING: &str = "Provide helpful, actionable advice. Be concise but informative. Use specific numbers and quotes from the context when available.";

/// System prompt for one chat turn.
///
/// Exactly one of [`DOCUMENT_INSTRUCTION`] / [`NO_DOCUMENT_INSTRUCTION`] is
/// included, depending on whether `document_context` is empty.
pub fn assemble_prompt(emissions_context: &str, document_context: &str) -> String {
    let mut out = String::with_capacity(
        PREAMBLE.len() + emissions_context.len() + document_context.len() + 512,
    );
    out.push_str(PREAMBLE);

    if !emissions_context.is_empty() {
        out.push_str("Current Emissions Data:\n");
        out.push_str(emissions_context);
        out.push('\n');
    }
    out.push_str("\n\n");

    if document_context.is_empty() {
        out.push_str(NO_DOCUMENT_INSTRUCTION);
    } else {
        out.push_str("Uploaded Documents Content:\n");
        out.push_str(document_context);
        out.push_str("\n\n");
        out.push_str(DOCUMENT_INSTRUCTION);
    }

    out.push_str("\n\n");
    out.push_str(CLOSING);
    out
}

/// The text actually sent to the model on every generation attempt.
pub fn chat_prompt(system: &str, message: &str) -> String {
    format!("{system}\n\nUser Question: {message}\n\nProvide a helpful, concise answer:")
}

/// `[Source i: file, Page p]` blocks separated by horizontal rules.
pub fn build_source_context(matches: &[DocumentChunkMatch]) -> String {
    matches
        .iter()
        .enumerate()
        .map(|(i, m)| {
            format!(
                "[Source {}: {}, Page {}]\n{}",
                i + 1,
                m.source_file_name,
                m.page_number,
                m.text_excerpt
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

/// Grounded Q&A over uploaded notes.
pub fn query_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful assistant for students. Answer questions based ONLY on the provided context from uploaded PDF notes.

Context from PDFs:
{context}

Question: {question}

Instructions:
- Answer concisely and accurately based on the context
- Cite the source (file name and page number) when possible
- If the context doesn't contain enough information, say \"I don't have enough information in the uploaded notes to answer that.\"
- Do not make up information or use knowledge outside the provided context

Answer:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_documents_instruction_when_only_emissions() {
        let p = assemble_prompt("Current Emissions Status: 1 active hotspots", "");
        assert!(p.starts_with("You are a Carbon Intelligence AI assistant"));
        assert!(p.contains("Current Emissions Data:\nCurrent Emissions Status"));
        assert!(p.contains(NO_DOCUMENT_INSTRUCTION));
        assert!(!p.contains(DOCUMENT_INSTRUCTION));
        assert!(!p.contains("Uploaded Documents Content"));
        assert!(p.ends_with(CLOSING));
    }

    #[test]
    fn document_instruction_when_only_documents() {
        let p = assemble_prompt("", "Scope 3 covers indirect emissions.");
        assert!(p.contains("Uploaded Documents Content:\nScope 3 covers indirect emissions.\n\n"));
        assert!(p.contains(DOCUMENT_INSTRUCTION));
        assert!(!p.contains(NO_DOCUMENT_INSTRUCTION));
        assert!(!p.contains("Current Emissions Data"));
    }

    #[test]
    fn blocks_keep_their_order() {
        let p = assemble_prompt("EMI", "DOC");
        let e = p.find("Current Emissions Data").unwrap();
        let d = p.find("Uploaded Documents Content").unwrap();
        let c = p.find(CLOSING).unwrap();
        assert!(e < d && d < c);
    }

    #[test]
    fn chat_prompt_wraps_question() {
        assert_eq!(
            chat_prompt("SYS", "Why?"),
            "SYS\n\nUser Question: Why?\n\nProvide a helpful, concise answer:"
        );
    }

    #[test]
    fn source_blocks_are_numbered() {
        let m = |f: &str, p: u32, t: &str| DocumentChunkMatch {
            source_file_name: f.into(),
            page_number: p,
            similarity_score: 0.5,
            text_excerpt: t.into(),
        };
        let ctx = build_source_context(&[m("a.pdf", 1, "alpha"), m("b.pdf", 7, "beta")]);
        assert_eq!(
            ctx,
            "[Source 1: a.pdf, Page 1]\nalpha\n\n---\n\n[Source 2: b.pdf, Page 7]\nbeta"
        );
        let q = query_prompt(&ctx, "What is beta?");
        assert!(q.contains("Question: What is beta?"));
        assert!(q.ends_with("Answer:"));
    }
}
