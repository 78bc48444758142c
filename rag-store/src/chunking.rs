//! Page text to overlapping, size-bounded chunks.

use serde::Serialize;

/// One unit of ingestion: the text stored as `textExcerpt` under a page.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentChunk {
    pub file_name: String,
    /// 1-based page number.
    pub page: u32,
    pub text: String,
}

/// Window sizes in characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkingOptions {
    pub max_chars: usize,
    pub overlap: usize,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            max_chars: 1000,
            overlap: 200,
        }
    }
}

/// Splits each page into chunks of at most `max_chars` characters.
///
/// Whitespace is collapsed first. Windows end on a word boundary when one
/// exists in the back half of the window, and consecutive windows share
/// `overlap` characters. Blank pages produce nothing.
pub fn chunk_pages(
    file_name: &str,
    pages: &[String],
    opts: ChunkingOptions,
) -> Vec<DocumentChunk> {
    let max = opts.max_chars.max(1);
    let overlap = opts.overlap.min(max / 2);

    let mut out = Vec::new();
    for (idx, page) in pages.iter().enumerate() {
        let chars: Vec<char> = collapse_whitespace(page).chars().collect();
        let page_no = u32::try_from(idx + 1).unwrap_or(u32::MAX);

        let mut start = 0;
        while start < chars.len() {
            let mut end = (start + max).min(chars.len());
            if end < chars.len() {
                if let Some(ws) = chars[start + max / 2..end].iter().rposition(|c| *c == ' ') {
                    end = start + max / 2 + ws;
                }
            }

            let text: String = chars[start..end].iter().collect();
            let text = text.trim();
            if !text.is_empty() {
                out.push(DocumentChunk {
                    file_name: file_name.to_string(),
                    page: page_no,
                    text: text.to_string(),
                });
            }

            if end == chars.len() {
                break;
            }
            start = (end - overlap).max(start + 1);
        }
    }
    out
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(max_chars: usize, overlap: usize) -> ChunkingOptions {
        ChunkingOptions { max_chars, overlap }
    }

    #[test]
    fn short_pages_are_one_chunk_each_and_blank_pages_skipped() {
        let pages = vec![
            "Scope 1\n\n emissions".to_string(),
            "   ".to_string(),
            "Scope 3".to_string(),
        ];
        let out = chunk_pages("esg.pdf", &pages, ChunkingOptions::default());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "Scope 1 emissions");
        assert_eq!(out[0].page, 1);
        assert_eq!(out[1].page, 3);
        assert_eq!(out[1].file_name, "esg.pdf");
    }

    #[test]
    fn long_page_splits_on_words_with_overlap() {
        let page = "alpha beta gamma delta epsilon zeta eta theta".to_string();
        let out = chunk_pages("a.pdf", &[page], opts(16, 6));

        assert!(out.len() > 1);
        assert!(out.iter().all(|c| c.text.chars().count() <= 16));
        assert!(out.iter().all(|c| c.page == 1));
        assert!(out[0].text.starts_with("alpha beta"));
        assert!(out.last().unwrap().text.ends_with("theta"));
        // consecutive chunks share text
        let tail: String = out[0].text.chars().rev().take(3).collect();
        let tail: String = tail.chars().rev().collect();
        assert!(out[1].text.contains(&tail), "{:?}", out);
    }

    #[test]
    fn unbroken_text_is_cut_at_the_limit() {
        let out = chunk_pages("a.pdf", &["x".repeat(25)], opts(10, 0));
        let lens: Vec<_> = out.iter().map(|c| c.text.len()).collect();
        assert_eq!(lens, [10, 10, 5]);
    }
}
