//! Embedding backfill
//!
//! One sequential pass over the recipes that have no embedding reference.
//! Each recipe moves `Pending -> Embedded -> Indexed -> Linked`, or stops at
//! the first failing step. A failure is recorded and the pass moves on to
//! the next recipe; nothing is retried within a run.
//!
//! When the index write succeeds but the reference write fails, the recipe
//! stays unlinked and is picked up again by the next run. The index entry is
//! keyed by the recipe id, so the second attempt overwrites the first.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use domain_vector::{IndexEntry, VectorRepository};
use futures::StreamExt;
use serde::Serialize;
use serde_json::json;
use strum::Display;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::embedder::RecipeEmbedder;
use crate::error::{RecipeError, RecipeResult};
use crate::models::Recipe;
use crate::repository::RecipeRepository;

/// Progress of one recipe through a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RecordState {
    Pending,
    Embedded,
    Indexed,
    Linked,
}

/// Step at which a recipe failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// The stored document could not be read as a recipe
    Decode,
    Embed,
    Index,
    Link,
}

/// Per-recipe failure, collected into the report instead of aborting the run
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{stage} failed for recipe {recipe_id}: {detail}")]
pub struct RecordFailure {
    pub stage: FailureStage,
    pub recipe_id: String,
    pub detail: String,
}

impl RecordFailure {
    pub fn new(stage: FailureStage, recipe_id: impl Into<String>, detail: impl ToString) -> Self {
        Self {
            stage,
            recipe_id: recipe_id.into(),
            detail: detail.to_string(),
        }
    }
}

/// Outcome of one run
#[derive(Debug, Clone, Serialize)]
pub struct BackfillReport {
    pub success_count: u64,
    pub error_count: u64,
    pub failures: Vec<RecordFailure>,
    pub duration_ms: u64,
    pub started_at: DateTime<Utc>,
}

impl BackfillReport {
    fn start() -> Self {
        Self {
            success_count: 0,
            error_count: 0,
            failures: Vec::new(),
            duration_ms: 0,
            started_at: Utc::now(),
        }
    }

    /// Recipes visited in this run
    pub fn processed(&self) -> u64 {
        self.success_count + self.error_count
    }

    fn record(&mut self, outcome: Result<String, RecordFailure>) {
        match outcome {
            Ok(_) => self.success_count += 1,
            Err(failure) => {
                self.error_count += 1;
                self.failures.push(failure);
            }
        }
    }
}

/// Sequential embed, index and link pass over unembedded recipes
pub struct BackfillPipeline<R: RecipeRepository, V: VectorRepository> {
    recipes: Arc<R>,
    index: Arc<V>,
    embedder: RecipeEmbedder,
    limit: Option<usize>,
}

impl<R: RecipeRepository, V: VectorRepository> BackfillPipeline<R, V> {
    pub fn new(recipes: Arc<R>, index: Arc<V>, embedder: RecipeEmbedder) -> Self {
        Self {
            recipes,
            index,
            embedder,
            limit: None,
        }
    }

    /// Visit at most `limit` recipes per run
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Setup checks: create the collection if needed and make sure the model
    /// answers with the configured width. Errors here should abort the run.
    #[instrument(skip(self), fields(collection = self.index.collection_name()))]
    pub async fn prepare(&self) -> RecipeResult<()> {
        let created = self.index.ensure_collection().await?;
        if created {
            info!("Created vector collection");
        }
        self.embedder.probe().await?;
        Ok(())
    }

    /// Run one pass. Only failures to read the work set are returned as
    /// errors; per-recipe failures end up in the report.
    pub async fn run(&self) -> RecipeResult<BackfillReport> {
        let timer = Instant::now();
        let mut report = BackfillReport::start();

        let pending = self.recipes.count_needing_embedding().await?;
        info!(
            pending,
            limit = ?self.limit,
            collection = self.index.collection_name(),
            "Starting embedding backfill"
        );

        let stream = self.recipes.records_needing_embedding().await?;
        let mut stream = match self.limit {
            Some(limit) => stream.take(limit).boxed(),
            None => stream,
        };

        while let Some(item) = stream.next().await {
            let outcome = match item {
                Ok(recipe) => self.process_record(&recipe).await,
                Err(RecipeError::InvalidDocument { id, details }) => {
                    let failure = RecordFailure::new(FailureStage::Decode, id, details);
                    error!(
                        recipe_id = %failure.recipe_id,
                        stage = %failure.stage,
                        error = %failure.detail,
                        "Skipping unreadable recipe"
                    );
                    Err(failure)
                }
                Err(other) => {
                    report.duration_ms = timer.elapsed().as_millis() as u64;
                    error!(
                        success_count = report.success_count,
                        error_count = report.error_count,
                        duration_ms = report.duration_ms,
                        error = %other,
                        "Embedding backfill aborted"
                    );
                    return Err(other);
                }
            };
            report.record(outcome);
        }

        report.duration_ms = timer.elapsed().as_millis() as u64;

        if report.error_count > 0 {
            warn!(
                success_count = report.success_count,
                error_count = report.error_count,
                duration_ms = report.duration_ms,
                "Embedding backfill finished with errors"
            );
        } else {
            info!(
                success_count = report.success_count,
                error_count = report.error_count,
                duration_ms = report.duration_ms,
                "Embedding backfill finished"
            );
        }

        Ok(report)
    }

    /// Embed, index and link one recipe. Returns the recipe id once linked.
    pub async fn process_record(&self, recipe: &Recipe) -> Result<String, RecordFailure> {
        let recipe_id = recipe.id.as_str();
        let recipe_name = recipe.name.as_deref().unwrap_or_default();

        let result = self.advance(recipe).await;
        match &result {
            Ok(_) => info!(recipe_id, recipe_name, "Embedded recipe"),
            Err(failure) => error!(
                recipe_id,
                stage = %failure.stage,
                error = %failure.detail,
                "Failed to embed recipe"
            ),
        }
        result
    }

    async fn advance(&self, recipe: &Recipe) -> Result<String, RecordFailure> {
        let recipe_id = recipe.id.as_str();
        debug!(recipe_id, state = %RecordState::Pending);

        let values = self
            .embedder
            .embed_recipe(recipe)
            .await
            .map_err(|e| RecordFailure::new(FailureStage::Embed, recipe_id, e))?;
        debug!(recipe_id, state = %RecordState::Embedded);

        let entry = IndexEntry::new(recipe_id, values).with_payload(json!({
            "recipeId": recipe_id,
            "recipeName": recipe.name,
            "tags": recipe.tags,
        }));
        let vector_id = self
            .index
            .upsert(entry)
            .await
            .map_err(|e| RecordFailure::new(FailureStage::Index, recipe_id, e))?;
        if vector_id != recipe_id {
            return Err(RecordFailure::new(
                FailureStage::Index,
                recipe_id,
                format!("index returned id {vector_id}"),
            ));
        }
        debug!(recipe_id, state = %RecordState::Indexed);

        self.recipes
            .update_embedding_reference(recipe_id, self.index.collection_name(), &vector_id)
            .await
            .map_err(|e| RecordFailure::new(FailureStage::Link, recipe_id, e))?;
        debug!(recipe_id, state = %RecordState::Linked);

        Ok(vector_id)
    }
}
