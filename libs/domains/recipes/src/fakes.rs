//! In-memory store and index used by the backfill tests

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use domain_vector::{
    IndexEntry, SearchQuery, SearchResult, VectorConfig, VectorError, VectorRepository,
    VectorResult,
};
use futures::StreamExt;
use futures::stream;

use crate::error::{RecipeError, RecipeResult};
use crate::models::{EmbeddingReference, Recipe};
use crate::repository::{RecipeRepository, RecipeStream};

pub struct InMemoryRecipes {
    recipes: Mutex<Vec<Recipe>>,
    fail_link: Mutex<HashSet<String>>,
}

impl InMemoryRecipes {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self {
            recipes: Mutex::new(recipes),
            fail_link: Mutex::new(HashSet::new()),
        }
    }

    /// Reference writes for `id` fail until `clear_failures`
    pub fn failing_link_on(self, id: &str) -> Self {
        self.fail_link.lock().unwrap().insert(id.to_string());
        self
    }

    pub fn clear_failures(&self) {
        self.fail_link.lock().unwrap().clear();
    }

    pub fn get(&self, id: &str) -> Option<Recipe> {
        self.recipes
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    pub fn pending_ids(&self) -> Vec<String> {
        self.recipes
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.needs_embedding())
            .map(|r| r.id.clone())
            .collect()
    }
}

#[async_trait]
impl RecipeRepository for InMemoryRecipes {
    async fn records_needing_embedding(&self) -> RecipeResult<RecipeStream> {
        let pending: Vec<RecipeResult<Recipe>> = self
            .recipes
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.needs_embedding())
            .cloned()
            .map(Ok)
            .collect();
        Ok(stream::iter(pending).boxed())
    }

    async fn count_needing_embedding(&self) -> RecipeResult<u64> {
        Ok(self.pending_ids().len() as u64)
    }

    async fn get_by_id(&self, id: &str) -> RecipeResult<Option<Recipe>> {
        Ok(self.get(id))
    }

    async fn update_embedding_reference(
        &self,
        recipe_id: &str,
        index_name: &str,
        vector_id: &str,
    ) -> RecipeResult<EmbeddingReference> {
        if self.fail_link.lock().unwrap().contains(recipe_id) {
            return Err(RecipeError::Database("write concern timeout".into()));
        }

        let mut recipes = self.recipes.lock().unwrap();
        let recipe = recipes
            .iter_mut()
            .find(|r| r.id == recipe_id)
            .ok_or_else(|| RecipeError::NotFound(recipe_id.to_string()))?;

        let reference = EmbeddingReference::new(index_name, vector_id);
        recipe.embedding = Some(reference.clone());
        recipe.updated_at = Some(reference.embedded_at);
        Ok(reference)
    }
}

pub struct InMemoryIndex {
    collection: String,
    config: VectorConfig,
    created: Mutex<bool>,
    entries: Mutex<HashMap<String, IndexEntry>>,
    upserts: Mutex<HashMap<String, usize>>,
    fail_on: HashSet<String>,
}

impl InMemoryIndex {
    pub fn new(collection: &str, dimension: u32) -> Self {
        Self {
            collection: collection.to_string(),
            config: VectorConfig::new(dimension),
            created: Mutex::new(false),
            entries: Mutex::new(HashMap::new()),
            upserts: Mutex::new(HashMap::new()),
            fail_on: HashSet::new(),
        }
    }

    pub fn failing_on(mut self, id: &str) -> Self {
        self.fail_on.insert(id.to_string());
        self
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn get(&self, id: &str) -> Option<IndexEntry> {
        self.entries.lock().unwrap().get(id).cloned()
    }

    pub fn upserts_for(&self, id: &str) -> usize {
        self.upserts.lock().unwrap().get(id).copied().unwrap_or_default()
    }
}

#[async_trait]
impl VectorRepository for InMemoryIndex {
    fn collection_name(&self) -> &str {
        &self.collection
    }

    fn vector_config(&self) -> &VectorConfig {
        &self.config
    }

    async fn collection_exists(&self) -> VectorResult<bool> {
        Ok(*self.created.lock().unwrap())
    }

    async fn ensure_collection(&self) -> VectorResult<bool> {
        let mut created = self.created.lock().unwrap();
        let newly = !*created;
        *created = true;
        Ok(newly)
    }

    async fn upsert(&self, entry: IndexEntry) -> VectorResult<String> {
        if self.fail_on.contains(&entry.id) {
            return Err(VectorError::Qdrant("service unavailable".into()));
        }
        if entry.values.len() != self.config.dimension as usize {
            return Err(VectorError::Validation("dimension mismatch".into()));
        }

        *self
            .upserts
            .lock()
            .unwrap()
            .entry(entry.id.clone())
            .or_default() += 1;

        let id = entry.id.clone();
        self.entries.lock().unwrap().insert(id.clone(), entry);
        Ok(id)
    }

    async fn search(&self, query: SearchQuery) -> VectorResult<Vec<SearchResult>> {
        let entries = self.entries.lock().unwrap();
        let mut hits: Vec<SearchResult> = entries
            .values()
            .map(|e| SearchResult {
                id: e.id.clone(),
                score: e.values.iter().zip(&query.vector).map(|(a, b)| a * b).sum(),
                payload: e.payload.clone(),
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(query.limit as usize);
        Ok(hits)
    }

    async fn delete(&self, id: &str) -> VectorResult<()> {
        self.entries.lock().unwrap().remove(id);
        Ok(())
    }
}
