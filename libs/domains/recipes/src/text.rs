//! Text fed to the embedding model for a recipe

use crate::models::Recipe;

const SEGMENT_SEPARATOR: &str = " | ";
const INSTRUCTION_LIMIT: usize = 3;

/// Builds the embedding input: name, then ingredient names, then the first
/// three instructions. Empty segments are left out, so a recipe with no
/// content produces `""`.
///
/// ```
/// use domain_recipes::{Recipe, recipe_text};
///
/// let recipe = Recipe::new("r1")
///     .with_name("Soup")
///     .with_ingredients(["carrot", "onion"])
///     .with_instructions(["Chop.", "Boil.", "Simmer.", "Serve."]);
///
/// assert_eq!(
///     recipe_text(&recipe),
///     "Soup | Ingredients: carrot, onion | Instructions: Chop. Boil. Simmer."
/// );
/// ```
pub fn recipe_text(recipe: &Recipe) -> String {
    let mut segments: Vec<String> = Vec::with_capacity(3);

    if let Some(name) = recipe.name.as_deref().filter(|n| !n.is_empty()) {
        segments.push(name.to_string());
    }

    if !recipe.ingredients.is_empty() {
        let names: Vec<&str> = recipe
            .ingredients
            .iter()
            .map(|i| i.name.as_deref().unwrap_or_default())
            .collect();
        segments.push(format!("Ingredients: {}", names.join(", ")));
    }

    if !recipe.instructions.is_empty() {
        let steps: Vec<&str> = recipe
            .instructions
            .iter()
            .take(INSTRUCTION_LIMIT)
            .map(String::as_str)
            .collect();
        segments.push(format!("Instructions: {}", steps.join(" ")));
    }

    segments.join(SEGMENT_SEPARATOR)
}
