use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recipe as read from the document store
///
/// Every descriptive field is optional because stored documents are not
/// guaranteed to carry them. Missing lists decode as empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub embedding: Option<EmbeddingReference>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Recipe {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_ingredients<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients = names.into_iter().map(RecipeIngredient::named).collect();
        self
    }

    pub fn with_instructions<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instructions = steps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Absence of a reference means the recipe still needs an embedding
    pub fn needs_embedding(&self) -> bool {
        self.embedding.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
}

impl RecipeIngredient {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Pointer from a recipe to its entry in the vector index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingReference {
    /// Vector index collection holding the entry
    pub index_name: String,
    pub vector_id: String,
    pub embedded_at: DateTime<Utc>,
}

impl EmbeddingReference {
    pub fn new(index_name: impl Into<String>, vector_id: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            vector_id: vector_id.into(),
            embedded_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_fills_fields() {
        let recipe = Recipe::new("r1")
            .with_name("Soup")
            .with_ingredients(["carrot", "onion"])
            .with_instructions(["Chop.", "Boil."])
            .with_tags(["vegan"]);

        assert_eq!(recipe.id, "r1");
        assert_eq!(recipe.name.as_deref(), Some("Soup"));
        assert_eq!(recipe.ingredients[1].name.as_deref(), Some("onion"));
        assert_eq!(recipe.instructions.len(), 2);
        assert_eq!(recipe.tags, vec!["vegan"]);
        assert!(recipe.needs_embedding());
    }

    #[test]
    fn test_reference_marks_recipe_embedded() {
        let mut recipe = Recipe::new("r1");
        recipe.embedding = Some(EmbeddingReference::new("recipes", "r1"));
        assert!(!recipe.needs_embedding());
    }
}
