//! PDF text extraction, one string per page.

use tracing::debug;

use crate::errors::RagError;

/// Extracts the text of every page, in page order.
///
/// Pages without a text layer come back as empty strings so page numbers
/// stay aligned with the document.
pub fn extract_pdf_pages(bytes: &[u8]) -> Result<Vec<String>, RagError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| RagError::Pdf(e.to_string()))?;
    debug!(pages = pages.len(), "pdf text extracted");
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bytes_that_are_not_a_pdf() {
        let err = extract_pdf_pages(b"plain text, no header").unwrap_err();
        assert!(matches!(err, RagError::Pdf(_)));
    }
}
