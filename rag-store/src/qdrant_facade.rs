//! Thin adapter around `qdrant-client` to isolate API usage.

use crate::config::RagConfig;
use crate::errors::RagError;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, Filter, PointStruct, SearchParamsBuilder,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QValue, VectorParamsBuilder, value::Kind,
};
use tracing::{debug, info, warn};

/// Facade over the Qdrant client bound to one collection.
pub struct QdrantFacade {
    client: Qdrant,
    collection: String,
}

impl QdrantFacade {
    /// Creates a new facade from the given configuration.
    pub fn new(cfg: &RagConfig) -> Result<Self, RagError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        info!(url = %cfg.qdrant_url, collection = %cfg.collection, "Qdrant facade ready");
        Ok(Self {
            client,
            collection: cfg.collection.clone(),
        })
    }

    /// Creates the collection (cosine distance) unless it already exists.
    pub async fn ensure_collection(&self, vector_size: usize) -> Result<(), RagError> {
        match self.client.collection_info(&self.collection).await {
            Ok(_) => {
                debug!(collection = %self.collection, "collection already exists");
                return Ok(());
            }
            Err(err) => {
                warn!(
                    collection = %self.collection,
                    error = %err,
                    "collection not found, will be created"
                );
            }
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(vector_size as u64, Distance::Cosine)),
            )
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        info!(collection = %self.collection, vector_size, "collection created");
        Ok(())
    }

    /// Upserts a batch of points and waits for the write to be applied.
    ///
    /// Returns the number of points sent.
    pub async fn upsert_points(&self, points: Vec<PointStruct>) -> Result<u64, RagError> {
        if points.is_empty() {
            debug!("no points provided for upsert");
            return Ok(0);
        }
        let n = points.len() as u64;

        let res = self
            .client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        debug!(points = n, result = ?res.result, "upsert applied");
        Ok(n)
    }

    /// Similarity search returning `(score, payload)` tuples ordered by score.
    pub async fn search(
        &self,
        vector: Vec<f32>,
        top_k: u64,
        filter: Option<Filter>,
        exact: bool,
    ) -> Result<Vec<(f32, serde_json::Value)>, RagError> {
        debug!(
            collection = %self.collection,
            top_k,
            filtered = filter.is_some(),
            exact,
            "qdrant search"
        );

        let mut builder =
            SearchPointsBuilder::new(&self.collection, vector, top_k).with_payload(true);
        if let Some(f) = filter {
            builder = builder.filter(f);
        }
        if exact {
            builder = builder.params(SearchParamsBuilder::default().exact(true));
        }

        let res = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        let out: Vec<_> = res
            .result
            .into_iter()
            .map(|p| (p.score, payload_to_json(p.payload)))
            .collect();

        debug!(hits = out.len(), "qdrant search completed");
        Ok(out)
    }
}

/// Converts a Qdrant payload map into a JSON object.
pub(crate) fn payload_to_json(p: std::collections::HashMap<String, QValue>) -> serde_json::Value {
    serde_json::Value::Object(p.into_iter().map(|(k, v)| (k, qvalue_to_json(v))).collect())
}

fn qvalue_to_json(v: QValue) -> serde_json::Value {
    match v.kind {
        Some(Kind::StringValue(s)) => serde_json::Value::String(s),
        Some(Kind::IntegerValue(i)) => serde_json::Value::Number(i.into()),
        Some(Kind::DoubleValue(f)) => serde_json::json!(f),
        Some(Kind::BoolValue(b)) => serde_json::Value::Bool(b),
        Some(Kind::ListValue(list)) => {
            serde_json::Value::Array(list.values.into_iter().map(qvalue_to_json).collect())
        }
        Some(Kind::StructValue(s)) => payload_to_json(s.fields),
        Some(Kind::NullValue(_)) | None => serde_json::Value::Null,
    }
}
