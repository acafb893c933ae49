//! Backfill against real MongoDB and Qdrant containers.
//!
//! Run with `cargo test -p domain_recipes -- --ignored` (needs docker).

use std::sync::Arc;

use async_trait::async_trait;
use domain_recipes::{
    BackfillPipeline, MongoRecipeRepository, RecipeEmbedder, RecipeRepository, recipe_text,
};
use domain_vector::{
    EmbeddingConfig, EmbeddingModel, EmbeddingProvider, EmbeddingResult, QdrantConfig,
    QdrantRepository, SearchQuery, VectorRepository, VectorResult,
};
use mongodb::bson::{Document, doc, oid::ObjectId};
use test_utils::{TestDataBuilder, TestMongo, TestQdrant, assertions::assert_some};

const DIMENSION: u32 = 16;

/// Deterministic stand-in for a model: hashes characters into buckets
struct BucketProvider;

#[async_trait]
impl EmbeddingProvider for BucketProvider {
    async fn embed(&self, _model: &EmbeddingModel, text: &str) -> VectorResult<EmbeddingResult> {
        let mut values = vec![0.01_f32; DIMENSION as usize];
        for (i, byte) in text.bytes().enumerate() {
            values[(byte as usize + i) % DIMENSION as usize] += 1.0;
        }
        Ok(EmbeddingResult::new(values))
    }
}

struct Harness {
    _mongo: TestMongo,
    _qdrant: TestQdrant,
    recipes: Arc<MongoRecipeRepository>,
    index: Arc<QdrantRepository>,
    raw: mongodb::Collection<Document>,
    embedder: RecipeEmbedder,
}

async fn harness(test_name: &str) -> Harness {
    let mongo = TestMongo::new().await;
    let qdrant = TestQdrant::new().await;
    let builder = TestDataBuilder::from_test_name(test_name);

    let db = mongo.database(&builder.name("db", "main"));
    let raw = db.collection::<Document>("recipes");
    let recipes = Arc::new(MongoRecipeRepository::new(db));

    let index = Arc::new(
        QdrantRepository::new(
            QdrantConfig::new(qdrant.grpc_url(), "recipes"),
            domain_vector::VectorConfig::new(DIMENSION),
        )
        .unwrap(),
    );

    let embedder = RecipeEmbedder::new(
        Arc::new(BucketProvider),
        EmbeddingConfig {
            model: EmbeddingModel::default(),
            dimension: DIMENSION,
        },
    );

    Harness {
        _mongo: mongo,
        _qdrant: qdrant,
        recipes,
        index,
        raw,
        embedder,
    }
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_backfill_links_and_indexes_pending_recipes() {
    let h = harness("test_backfill_links_and_indexes_pending_recipes").await;

    let soup = ObjectId::new();
    let salad = ObjectId::new();
    h.raw
        .insert_many([
            doc! {
                "_id": soup,
                "name": "Soup",
                "ingredients": [{ "name": "carrot" }, { "name": "onion" }],
                "instructions": ["Chop.", "Boil.", "Simmer.", "Serve."],
                "tags": ["vegan"],
            },
            doc! { "_id": salad, "name": "Salad", "tags": [] },
            doc! {
                "_id": ObjectId::new(),
                "name": "Done",
                "embedding": {
                    "qdrantCollection": "recipes",
                    "vectorId": "x",
                    "embeddedAt": mongodb::bson::DateTime::now(),
                },
            },
        ])
        .await
        .unwrap();

    let pipeline = BackfillPipeline::new(h.recipes.clone(), h.index.clone(), h.embedder.clone());
    pipeline.prepare().await.unwrap();

    let report = pipeline.run().await.unwrap();
    assert_eq!(report.success_count, 2);
    assert_eq!(report.error_count, 0);

    let stored = assert_some(
        h.recipes.get_by_id(&soup.to_hex()).await.unwrap(),
        "soup after backfill",
    );
    let reference = assert_some(stored.embedding.clone(), "soup reference");
    assert_eq!(reference.index_name, "recipes");
    assert_eq!(reference.vector_id, soup.to_hex());
    assert!(stored.updated_at.is_some());

    let query = h.embedder.embed_text(&recipe_text(&stored)).await.unwrap();
    let hits = h.index.search(SearchQuery::new(query, 1)).await.unwrap();
    assert_eq!(hits[0].id, soup.to_hex());
    assert_eq!(assert_some(hits[0].payload.clone(), "payload")["recipeName"], "Soup");

    let second = pipeline.run().await.unwrap();
    assert_eq!(second.processed(), 0);
    assert_eq!(h.recipes.count_needing_embedding().await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_undecodable_recipe_does_not_stop_run() {
    let h = harness("test_undecodable_recipe_does_not_stop_run").await;

    h.raw
        .insert_many([
            doc! { "_id": "broken", "instructions": "not a list" },
            doc! { "_id": "fine", "name": "Toast" },
        ])
        .await
        .unwrap();

    let pipeline = BackfillPipeline::new(h.recipes.clone(), h.index.clone(), h.embedder.clone());
    pipeline.prepare().await.unwrap();

    let report = pipeline.run().await.unwrap();
    assert_eq!(report.success_count, 1);
    assert_eq!(report.error_count, 1);
    assert_eq!(report.failures[0].recipe_id, "broken");

    let fine = assert_some(h.recipes.get_by_id("fine").await.unwrap(), "fine");
    assert!(fine.embedding.is_some());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_update_reference_for_unknown_id_is_not_found() {
    let h = harness("test_update_reference_for_unknown_id_is_not_found").await;

    let result = h
        .recipes
        .update_embedding_reference(&ObjectId::new().to_hex(), "recipes", "v1")
        .await;

    assert!(matches!(result, Err(domain_recipes::RecipeError::NotFound(_))));
    assert_eq!(h.raw.count_documents(doc! {}).await.unwrap(), 0);
}
