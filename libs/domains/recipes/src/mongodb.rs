//! MongoDB implementation of RecipeRepository
//!
//! Stored layout (camelCase, shared with the meal planner backend):
//!
//! ```text
//! {
//!   _id: ObjectId | string,
//!   name, ingredients: [{ name, quantity, unit }], instructions: [string], tags: [string],
//!   embedding: { qdrantCollection, vectorId, embeddedAt },
//!   updatedAt
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use mongodb::{
    Collection, Database,
    bson::{self, Bson, Document, doc, oid::ObjectId},
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{RecipeError, RecipeResult};
use crate::models::{EmbeddingReference, Recipe, RecipeIngredient};
use crate::repository::{RecipeRepository, RecipeStream};

/// MongoDB implementation of the RecipeRepository
pub struct MongoRecipeRepository {
    collection: Collection<Document>,
}

impl MongoRecipeRepository {
    /// Repository over the `recipes` collection
    pub fn new(db: Database) -> Self {
        Self::with_collection(db, "recipes")
    }

    pub fn with_collection(db: Database, collection_name: &str) -> Self {
        let collection = db.collection::<Document>(collection_name);
        Self { collection }
    }

    /// Get the underlying collection for advanced operations
    pub fn collection(&self) -> &Collection<Document> {
        &self.collection
    }

    /// Matches a missing or null `embedding`
    fn pending_filter() -> Document {
        doc! { "embedding": Bson::Null }
    }

    /// `_id` filter for an id that may be stored as ObjectId or as a string
    fn id_filter(id: &str) -> RecipeResult<Document> {
        if id.trim().is_empty() {
            return Err(RecipeError::InvalidId(id.to_string()));
        }

        let filter = match ObjectId::parse_str(id) {
            Ok(oid) => doc! { "_id": { "$in": [Bson::ObjectId(oid), Bson::String(id.to_string())] } },
            Err(_) => doc! { "_id": id },
        };
        Ok(filter)
    }

    fn reference_update(reference: &EmbeddingReference) -> Document {
        let now = to_bson_datetime(reference.embedded_at);
        doc! {
            "$set": {
                "embedding": {
                    "qdrantCollection": &reference.index_name,
                    "vectorId": &reference.vector_id,
                    "embeddedAt": now,
                },
                "updatedAt": now,
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecipeDocument {
    name: Option<String>,
    ingredients: Option<Vec<IngredientDocument>>,
    instructions: Option<Vec<String>>,
    tags: Option<Vec<String>>,
    embedding: Option<EmbeddingDocument>,
    updated_at: Option<bson::DateTime>,
}

#[derive(Debug, Deserialize)]
struct IngredientDocument {
    name: Option<String>,
    quantity: Option<Bson>,
    unit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmbeddingDocument {
    qdrant_collection: String,
    vector_id: String,
    embedded_at: bson::DateTime,
}

impl From<IngredientDocument> for RecipeIngredient {
    fn from(doc: IngredientDocument) -> Self {
        let quantity = doc.quantity.and_then(|q| match q {
            Bson::Double(v) => Some(v),
            Bson::Int32(v) => Some(v as f64),
            Bson::Int64(v) => Some(v as f64),
            Bson::String(s) => s.trim().parse().ok(),
            _ => None,
        });

        Self {
            name: doc.name,
            quantity,
            unit: doc.unit,
        }
    }
}

fn id_to_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn to_utc(dt: bson::DateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis()).unwrap_or_default()
}

fn to_bson_datetime(dt: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(dt.timestamp_millis())
}

/// Decode a raw document, keeping its id on failure
fn decode_recipe(document: Document) -> RecipeResult<Recipe> {
    let id = document
        .get("_id")
        .map(id_to_string)
        .ok_or_else(|| RecipeError::InvalidDocument {
            id: "<missing>".to_string(),
            details: "document has no _id".to_string(),
        })?;

    let parsed: RecipeDocument =
        bson::from_document(document).map_err(|e| RecipeError::InvalidDocument {
            id: id.clone(),
            details: e.to_string(),
        })?;

    Ok(Recipe {
        id,
        name: parsed.name,
        ingredients: parsed
            .ingredients
            .unwrap_or_default()
            .into_iter()
            .map(RecipeIngredient::from)
            .collect(),
        instructions: parsed.instructions.unwrap_or_default(),
        tags: parsed.tags.unwrap_or_default(),
        embedding: parsed.embedding.map(|e| EmbeddingReference {
            index_name: e.qdrant_collection,
            vector_id: e.vector_id,
            embedded_at: to_utc(e.embedded_at),
        }),
        updated_at: parsed.updated_at.map(to_utc),
    })
}

#[async_trait]
impl RecipeRepository for MongoRecipeRepository {
    #[instrument(skip(self))]
    async fn records_needing_embedding(&self) -> RecipeResult<RecipeStream> {
        let cursor = self
            .collection
            .find(Self::pending_filter())
            .sort(doc! { "_id": 1 })
            .await?;

        let stream = cursor
            .map(|result| result.map_err(RecipeError::from).and_then(decode_recipe))
            .boxed();

        Ok(stream)
    }

    #[instrument(skip(self))]
    async fn count_needing_embedding(&self) -> RecipeResult<u64> {
        let count = self
            .collection
            .count_documents(Self::pending_filter())
            .await?;
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &str) -> RecipeResult<Option<Recipe>> {
        let filter = Self::id_filter(id)?;
        self.collection
            .find_one(filter)
            .await?
            .map(decode_recipe)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn update_embedding_reference(
        &self,
        recipe_id: &str,
        index_name: &str,
        vector_id: &str,
    ) -> RecipeResult<EmbeddingReference> {
        let filter = Self::id_filter(recipe_id)?;
        let reference = EmbeddingReference::new(index_name, vector_id);

        let result = self
            .collection
            .update_one(filter, Self::reference_update(&reference))
            .await?;

        if result.matched_count == 0 {
            return Err(RecipeError::NotFound(recipe_id.to_string()));
        }

        tracing::info!(recipe_id, index_name, vector_id, "Embedding reference stored");
        Ok(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_filter_matches_null_embedding() {
        let filter = MongoRecipeRepository::pending_filter();
        assert_eq!(filter.get("embedding"), Some(&Bson::Null));
    }

    #[test]
    fn test_id_filter_object_id_matches_both_forms() {
        let id = "65f1c2a9e4b0a1b2c3d4e5f6";
        let filter = MongoRecipeRepository::id_filter(id).unwrap();

        let candidates = filter
            .get_document("_id")
            .unwrap()
            .get_array("$in")
            .unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(
            candidates[0],
            Bson::ObjectId(ObjectId::parse_str(id).unwrap())
        );
        assert_eq!(candidates[1], Bson::String(id.to_string()));
    }

    #[test]
    fn test_id_filter_plain_string() {
        let filter = MongoRecipeRepository::id_filter("soup-42").unwrap();
        assert_eq!(filter.get_str("_id").unwrap(), "soup-42");
    }

    #[test]
    fn test_id_filter_rejects_blank() {
        assert!(matches!(
            MongoRecipeRepository::id_filter("  "),
            Err(RecipeError::InvalidId(_))
        ));
    }

    #[test]
    fn test_decode_full_document() {
        let oid = ObjectId::new();
        let embedded_at = bson::DateTime::from_millis(1_700_000_000_000);
        let document = doc! {
            "_id": oid,
            "name": "Soup",
            "ingredients": [
                { "name": "carrot", "quantity": 2, "unit": "pcs" },
                { "name": "salt", "quantity": "0.5", "unit": "tsp" },
            ],
            "instructions": ["Chop.", "Boil."],
            "tags": ["vegan"],
            "servings": 4,
            "embedding": {
                "qdrantCollection": "recipes",
                "vectorId": oid.to_hex(),
                "embeddedAt": embedded_at,
            },
            "updatedAt": embedded_at,
        };

        let recipe = decode_recipe(document).unwrap();

        assert_eq!(recipe.id, oid.to_hex());
        assert_eq!(recipe.name.as_deref(), Some("Soup"));
        assert_eq!(recipe.ingredients[0].quantity, Some(2.0));
        assert_eq!(recipe.ingredients[1].quantity, Some(0.5));
        assert_eq!(recipe.tags, vec!["vegan"]);

        let reference = recipe.embedding.unwrap();
        assert_eq!(reference.index_name, "recipes");
        assert_eq!(reference.vector_id, oid.to_hex());
        assert_eq!(reference.embedded_at.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_decode_sparse_document() {
        let recipe = decode_recipe(doc! { "_id": "r1", "embedding": Bson::Null }).unwrap();

        assert_eq!(recipe.id, "r1");
        assert!(recipe.name.is_none());
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.needs_embedding());
    }

    #[test]
    fn test_decode_bad_field_keeps_id() {
        let err = decode_recipe(doc! { "_id": "r2", "instructions": "not a list" }).unwrap_err();

        match err {
            RecipeError::InvalidDocument { id, .. } => assert_eq!(id, "r2"),
            other => panic!("expected InvalidDocument, got {other:?}"),
        }
    }

    #[test]
    fn test_reference_update_layout() {
        let reference = EmbeddingReference::new("recipes", "r1");
        let update = MongoRecipeRepository::reference_update(&reference);

        let set = update.get_document("$set").unwrap();
        let embedding = set.get_document("embedding").unwrap();
        assert_eq!(embedding.get_str("qdrantCollection").unwrap(), "recipes");
        assert_eq!(embedding.get_str("vectorId").unwrap(), "r1");
        assert_eq!(
            embedding.get_datetime("embeddedAt").unwrap(),
            set.get_datetime("updatedAt").unwrap()
        );
    }
}
