//! Chunks + vectors to Qdrant points.
//!
//! The payload mirrors what [`crate::DocumentChunkMatch::from_payload`] reads
//! back: `fileName`, `page` and `textExcerpt`, plus the `uploadId` the chunk
//! came from.

use std::collections::HashMap;

use qdrant_client::qdrant::{PointId, PointStruct, Value as QValue};
use uuid::Uuid;

use crate::chunking::DocumentChunk;
use crate::errors::RagError;

/// Deterministic UUIDv5 from an arbitrary string id.
pub fn stable_uuid(id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, id.as_bytes())
}

/// Pairs every chunk with its vector. All vectors must have `vector_size`
/// entries; re-ingesting the same upload overwrites the same point ids.
pub fn build_points(
    upload_id: &str,
    chunks: &[DocumentChunk],
    vectors: Vec<Vec<f32>>,
    vector_size: usize,
) -> Result<Vec<PointStruct>, RagError> {
    if chunks.len() != vectors.len() {
        return Err(RagError::Config(format!(
            "{} chunks but {} vectors",
            chunks.len(),
            vectors.len()
        )));
    }

    let mut pts = Vec::with_capacity(chunks.len());
    for (idx, (chunk, vector)) in chunks.iter().zip(vectors).enumerate() {
        if vector.len() != vector_size {
            return Err(RagError::VectorSizeMismatch {
                got: vector.len(),
                want: vector_size,
            });
        }
        let pid: PointId = stable_uuid(&format!("{upload_id}:{idx}")).to_string().into();
        pts.push(PointStruct {
            id: Some(pid),
            payload: chunk_payload(upload_id, chunk),
            vectors: Some(vector.into()),
            ..Default::default()
        });
    }
    Ok(pts)
}

fn chunk_payload(upload_id: &str, chunk: &DocumentChunk) -> HashMap<String, QValue> {
    let mut payload: HashMap<String, QValue> = HashMap::new();
    payload.insert("fileName".into(), QValue::from(chunk.file_name.clone()));
    payload.insert("page".into(), QValue::from(i64::from(chunk.page)));
    payload.insert("textExcerpt".into(), QValue::from(chunk.text.clone()));
    payload.insert("uploadId".into(), QValue::from(upload_id.to_string()));
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocumentChunkMatch;
    use crate::qdrant_facade::payload_to_json;

    fn chunk(page: u32, text: &str) -> DocumentChunk {
        DocumentChunk {
            file_name: "esg-2024.pdf".into(),
            page,
            text: text.into(),
        }
    }

    #[test]
    fn payload_reads_back_as_a_search_match() {
        let pts = build_points("up-1", &[chunk(4, "Scope 3 ...")], vec![vec![0.1, 0.2]], 2).unwrap();
        let json = payload_to_json(pts[0].payload.clone());
        assert_eq!(json["uploadId"], "up-1");

        let m = DocumentChunkMatch::from_payload(0.7, &json);
        assert_eq!(m.source_file_name, "esg-2024.pdf");
        assert_eq!(m.page_number, 4);
        assert_eq!(m.text_excerpt, "Scope 3 ...");
    }

    #[test]
    fn point_ids_are_stable_per_upload_and_position() {
        let chunks = [chunk(1, "a"), chunk(1, "b")];
        let a = build_points("up-1", &chunks, vec![vec![0.0]; 2], 1).unwrap();
        let b = build_points("up-1", &chunks, vec![vec![1.0]; 2], 1).unwrap();
        let c = build_points("up-2", &chunks, vec![vec![0.0]; 2], 1).unwrap();
        assert_eq!(a[0].id, b[0].id);
        assert_ne!(a[0].id, a[1].id);
        assert_ne!(a[0].id, c[0].id);
    }

    #[test]
    fn rejects_wrong_sized_or_missing_vectors() {
        let chunks = [chunk(1, "a"), chunk(2, "b")];
        assert!(matches!(
            build_points("u", &chunks, vec![vec![0.0; 3], vec![0.0; 2]], 3),
            Err(RagError::VectorSizeMismatch { got: 2, want: 3 })
        ));
        assert!(matches!(
            build_points("u", &chunks, vec![vec![0.0; 3]], 3),
            Err(RagError::Config(_))
        ));
    }
}
