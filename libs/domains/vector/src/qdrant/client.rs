use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    self, CreateCollectionBuilder, DeletePointsBuilder, Distance, ListValue, PointId, PointStruct,
    SearchPointsBuilder, Struct, UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
    value::Kind,
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::QdrantConfig;
use crate::error::{VectorError, VectorResult};
use crate::models::{DistanceMetric, IndexEntry, SearchQuery, SearchResult, VectorConfig};
use crate::repository::VectorRepository;

/// Qdrant-backed implementation of VectorRepository
pub struct QdrantRepository {
    client: Qdrant,
    collection: String,
    id_field: String,
    vector_config: VectorConfig,
}

impl QdrantRepository {
    pub fn new(config: QdrantConfig, vector_config: VectorConfig) -> VectorResult<Self> {
        let mut builder = Qdrant::from_url(&config.url);

        if let Some(api_key) = config.api_key {
            builder = builder.api_key(api_key);
        }

        builder = builder.timeout(Duration::from_secs(config.timeout_secs));

        let client = builder
            .build()
            .map_err(|e| VectorError::Qdrant(format!("Failed to build client: {}", e)))?;

        Ok(Self::from_client(
            client,
            config.collection,
            config.id_field,
            vector_config,
        ))
    }

    pub fn from_client(
        client: Qdrant,
        collection: impl Into<String>,
        id_field: impl Into<String>,
        vector_config: VectorConfig,
    ) -> Self {
        Self {
            client,
            collection: collection.into(),
            id_field: id_field.into(),
            vector_config,
        }
    }

    fn to_qdrant_distance(metric: DistanceMetric) -> Distance {
        match metric {
            DistanceMetric::Cosine => Distance::Cosine,
            DistanceMetric::Euclidean => Distance::Euclid,
            DistanceMetric::DotProduct => Distance::Dot,
            DistanceMetric::Manhattan => Distance::Manhattan,
        }
    }

    /// Point id for an external id: UUIDs are used as-is, anything else
    /// (e.g. a MongoDB ObjectId) maps to a stable UUIDv5.
    pub fn point_id_for(id: &str) -> PointId {
        let uuid = Uuid::parse_str(id)
            .unwrap_or_else(|_| Uuid::new_v5(&Uuid::NAMESPACE_OID, id.as_bytes()));
        PointId::from(uuid.to_string())
    }

    fn point_id_to_string(point_id: &PointId) -> VectorResult<String> {
        match &point_id.point_id_options {
            Some(qdrant::point_id::PointIdOptions::Uuid(uuid)) => Ok(uuid.clone()),
            Some(qdrant::point_id::PointIdOptions::Num(num)) => Ok(num.to_string()),
            None => Err(VectorError::Internal("Missing point ID".to_string())),
        }
    }

    /// Payload as stored: the caller's fields plus the external id
    fn payload_to_qdrant(&self, id: &str, payload: Option<serde_json::Value>) -> HashMap<String, QdrantValue> {
        let mut result = HashMap::new();

        if let Some(serde_json::Value::Object(map)) = payload {
            for (key, val) in map {
                result.insert(key, json_to_qdrant_value(val));
            }
        }

        result.insert(self.id_field.clone(), QdrantValue::from(id.to_string()));

        result
    }

    fn check_dimension(&self, values: &[f32]) -> VectorResult<()> {
        let expected = self.vector_config.dimension as usize;
        if values.len() != expected {
            return Err(VectorError::Validation(format!(
                "vector has {} dimensions, collection '{}' expects {}",
                values.len(),
                self.collection,
                expected
            )));
        }
        Ok(())
    }

    async fn existing_dimension(&self) -> VectorResult<Option<u32>> {
        let info = self.client.collection_info(&self.collection).await?;
        let size = info
            .result
            .and_then(|r| r.config)
            .and_then(|c| c.params)
            .and_then(|p| p.vectors_config)
            .and_then(|vc| vc.config)
            .and_then(|config| match config {
                qdrant::vectors_config::Config::Params(p) => Some(p.size),
                qdrant::vectors_config::Config::ParamsMap(map) => {
                    map.map.values().next().map(|p| p.size)
                }
            });
        Ok(size.map(|s| s as u32))
    }
}

fn json_to_qdrant_value(val: serde_json::Value) -> QdrantValue {
    let kind = match val {
        serde_json::Value::Null => Kind::NullValue(0),
        serde_json::Value::Bool(b) => Kind::BoolValue(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Kind::IntegerValue(i),
            None => Kind::DoubleValue(n.as_f64().unwrap_or_default()),
        },
        serde_json::Value::String(s) => Kind::StringValue(s),
        serde_json::Value::Array(items) => Kind::ListValue(ListValue {
            values: items.into_iter().map(json_to_qdrant_value).collect(),
        }),
        serde_json::Value::Object(map) => Kind::StructValue(Struct {
            fields: map
                .into_iter()
                .map(|(k, v)| (k, json_to_qdrant_value(v)))
                .collect(),
        }),
    };
    QdrantValue { kind: Some(kind) }
}

fn qdrant_value_to_json(val: QdrantValue) -> serde_json::Value {
    match val.kind {
        None | Some(Kind::NullValue(_)) => serde_json::Value::Null,
        Some(Kind::BoolValue(b)) => serde_json::Value::Bool(b),
        Some(Kind::IntegerValue(i)) => serde_json::Value::Number(i.into()),
        Some(Kind::DoubleValue(f)) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Some(Kind::StringValue(s)) => serde_json::Value::String(s),
        Some(Kind::ListValue(list)) => {
            serde_json::Value::Array(list.values.into_iter().map(qdrant_value_to_json).collect())
        }
        Some(Kind::StructValue(st)) => serde_json::Value::Object(
            st.fields
                .into_iter()
                .map(|(k, v)| (k, qdrant_value_to_json(v)))
                .collect(),
        ),
    }
}

fn qdrant_to_payload(payload: HashMap<String, QdrantValue>) -> Option<serde_json::Value> {
    if payload.is_empty() {
        return None;
    }

    let map = payload
        .into_iter()
        .map(|(key, val)| (key, qdrant_value_to_json(val)))
        .collect();

    Some(serde_json::Value::Object(map))
}

#[async_trait]
impl VectorRepository for QdrantRepository {
    fn collection_name(&self) -> &str {
        &self.collection
    }

    fn vector_config(&self) -> &VectorConfig {
        &self.vector_config
    }

    async fn collection_exists(&self) -> VectorResult<bool> {
        Ok(self.client.collection_exists(&self.collection).await?)
    }

    #[instrument(skip(self), fields(collection = %self.collection))]
    async fn ensure_collection(&self) -> VectorResult<bool> {
        if self.collection_exists().await? {
            if let Some(existing) = self.existing_dimension().await? {
                if existing != self.vector_config.dimension {
                    return Err(VectorError::Config(format!(
                        "collection '{}' stores {}-dimensional vectors but the embedding dimension is {}",
                        self.collection, existing, self.vector_config.dimension
                    )));
                }
            }
            debug!("Collection already exists");
            return Ok(false);
        }

        let builder = CreateCollectionBuilder::new(&self.collection).vectors_config(
            VectorParamsBuilder::new(
                self.vector_config.dimension as u64,
                Self::to_qdrant_distance(self.vector_config.distance),
            ),
        );

        self.client.create_collection(builder).await?;

        info!(
            dimension = self.vector_config.dimension,
            distance = ?self.vector_config.distance,
            "Collection created"
        );
        Ok(true)
    }

    #[instrument(skip(self, entry), fields(collection = %self.collection, id = %entry.id))]
    async fn upsert(&self, entry: IndexEntry) -> VectorResult<String> {
        self.check_dimension(&entry.values)?;

        let IndexEntry {
            id,
            values,
            payload,
        } = entry;

        let point = PointStruct::new(
            Self::point_id_for(&id),
            values,
            self.payload_to_qdrant(&id, payload),
        );

        let builder = UpsertPointsBuilder::new(&self.collection, vec![point]).wait(true);
        self.client.upsert_points(builder).await?;

        Ok(id)
    }

    #[instrument(skip(self, query), fields(collection = %self.collection, limit = query.limit))]
    async fn search(&self, query: SearchQuery) -> VectorResult<Vec<SearchResult>> {
        self.check_dimension(&query.vector)?;

        let mut builder =
            SearchPointsBuilder::new(&self.collection, query.vector, query.limit as u64);

        if let Some(threshold) = query.score_threshold {
            builder = builder.score_threshold(threshold);
        }

        // The external id lives in the payload, so it is always fetched
        builder = builder.with_payload(true);

        let results = self.client.search_points(builder).await?;

        results
            .result
            .into_iter()
            .map(|point| {
                let point_id = point
                    .id
                    .as_ref()
                    .map(Self::point_id_to_string)
                    .transpose()?
                    .ok_or_else(|| VectorError::Internal("Missing point ID".to_string()))?;

                let payload = qdrant_to_payload(point.payload);
                let id = payload
                    .as_ref()
                    .and_then(|p| p.get(&self.id_field))
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
                    .unwrap_or(point_id);

                Ok(SearchResult {
                    id,
                    score: point.score,
                    payload: if query.with_payloads { payload } else { None },
                })
            })
            .collect()
    }

    #[instrument(skip(self), fields(collection = %self.collection))]
    async fn delete(&self, id: &str) -> VectorResult<()> {
        let builder = DeletePointsBuilder::new(&self.collection)
            .points(vec![Self::point_id_for(id)])
            .wait(true);

        self.client.delete_points(builder).await?;
        Ok(())
    }
}
