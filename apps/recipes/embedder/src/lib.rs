//! Recipe Embedder
//!
//! Batch job that embeds recipes missing an embedding, stores the vectors in
//! Qdrant and writes the reference back to MongoDB. Also exposes the search
//! and delete paths of the index for manual checks.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use core_config::FromEnv;
use core_config::tracing::init_tracing;
use database::common::retry_if;
use database::mongodb::connect_from_config_with_retry;
use domain_recipes::{
    BackfillPipeline, BackfillReport, MongoRecipeRepository, RecipeEmbedder, RecipeError,
};
use domain_vector::{
    OpenAIProvider, QdrantRepository, SearchQuery, SearchResult, VectorRepository,
};
use eyre::{Result, WrapErr, eyre};
use tracing::info;

pub mod config;

pub use config::Config;

#[derive(Debug, Parser)]
#[command(name = "recipe-embedder")]
#[command(about = "Embed recipes into the vector index and link them back")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum Commands {
    /// Embed every recipe without an embedding reference (default)
    Backfill {
        /// Visit at most this many recipes
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Embed a query text and print the nearest recipes as JSON
    Search {
        text: String,

        /// Maximum number of hits
        #[arg(short, long, default_value_t = 5)]
        limit: u32,
    },

    /// Remove a recipe's entry from the vector index
    Delete { recipe_id: String },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Backfill { limit: None }
    }
}

/// Load configuration, set up logging and execute the requested command.
///
/// Errors returned here are setup failures; per-recipe failures only show
/// up in the backfill report and logs.
pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env().wrap_err("Invalid configuration")?;
    init_tracing(&config.environment);

    match cli.command.unwrap_or_default() {
        Commands::Backfill { limit } => {
            backfill(&config, limit).await?;
        }
        Commands::Search { text, limit } => {
            let hits = search(&config, &text, limit).await?;
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        Commands::Delete { recipe_id } => {
            vector_index(&config)?.delete(&recipe_id).await?;
            info!(recipe_id = %recipe_id, "Removed recipe from vector index");
        }
    }

    Ok(())
}

fn vector_index(config: &Config) -> Result<QdrantRepository> {
    QdrantRepository::new(config.qdrant.clone(), config.embedding.vector_config())
        .wrap_err("Failed to create Qdrant client")
}

fn embedder(config: &Config) -> Result<RecipeEmbedder> {
    let provider = OpenAIProvider::new(config.provider.clone())
        .wrap_err("Failed to create embedding client")?;
    Ok(RecipeEmbedder::new(Arc::new(provider), config.embedding.clone()))
}

async fn backfill(config: &Config, limit: Option<usize>) -> Result<BackfillReport> {
    info!("Connecting to MongoDB...");
    let client = connect_from_config_with_retry(&config.mongo, None)
        .await
        .map_err(|e| eyre!("MongoDB connection failed: {}", e))?;

    let result: Result<BackfillReport> = async {
        let recipes = Arc::new(MongoRecipeRepository::with_collection(
            client.database(&config.mongo.database),
            &config.recipes_collection,
        ));
        let index = Arc::new(vector_index(config)?);
        let pipeline = BackfillPipeline::new(recipes, index, embedder(config)?).with_limit(limit);

        retry_if(|| pipeline.prepare(), RecipeError::is_transient)
            .await
            .wrap_err("Vector index or embedding model unavailable")?;

        pipeline.run().await.wrap_err("Backfill aborted")
    }
    .await;

    client.shutdown().await;
    info!("MongoDB connection closed");

    result
}

async fn search(config: &Config, text: &str, limit: u32) -> Result<Vec<SearchResult>> {
    let index = vector_index(config)?;
    let values = embedder(config)?.embed_text(text).await?;
    let hits = index.search(SearchQuery::new(values, limit)).await?;
    Ok(hits)
}
