use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::form::Form;

pub type Id = i64;

/// The two user↔recipe relations served by the membership ledger. Stored as
/// its snake_case token in the `memberships.kind` column.
#[derive(
    Clone, Copy, Debug, PartialEq, PartialOrd, sqlx::Type, Serialize, Deserialize, Eq, Ord, Hash,
)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MembershipKind {
    Favorite,
    ShoppingList,
}

impl MembershipKind {
    /// Human-readable name of the collection, used in conflict messages.
    pub fn collection(self) -> &'static str {
        match self {
            MembershipKind::Favorite => "favorites",
            MembershipKind::ShoppingList => "the shopping list",
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct User {
    pub id: Id,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Ingredient {
    pub id: Id,
    pub name: String,
    pub measurement_unit: String,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Tag {
    pub id: Id,
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Recipe {
    pub id: Id,
    pub author_id: Id,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i64,
    pub created_at: DateTime<Utc>,
}

/// Short recipe form returned by membership actions and subscription
/// listings.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct RecipeSummary {
    pub id: Id,
    pub name: String,
    pub image: String,
    pub cooking_time: i64,
}

/// One resolved ingredient line of a recipe, joined against the catalog.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct IngredientPartRow {
    pub recipe_id: Id,
    pub id: Id,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngredientPart {
    pub id: Id,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

impl From<IngredientPartRow> for IngredientPart {
    fn from(row: IngredientPartRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            measurement_unit: row.measurement_unit,
            amount: row.amount,
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct TagLinkRow {
    pub recipe_id: Id,
    pub id: Id,
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl From<TagLinkRow> for Tag {
    fn from(row: TagLinkRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            color: row.color,
            slug: row.slug,
        }
    }
}

/// Recipe author as embedded in read projections, annotated relative to the
/// requesting viewer. `is_subscribed` stays `false` for anonymous viewers.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorProfile {
    pub id: Id,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

/// Full read projection of a recipe: resolved ingredient lines and tag
/// objects, never raw foreign keys. The viewer-relative flags are always
/// present and `false` for anonymous viewers.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetails {
    pub id: Id,
    pub author: AuthorProfile,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i64,
    pub created_at: DateTime<Utc>,
    pub ingredients: Vec<IngredientPart>,
    pub tags: Vec<Tag>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Scalar fields of a recipe submission. Ingredient and tag sets travel
/// separately.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRecipe {
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct IngredientAmount {
    pub ingredient_id: Id,
    pub amount: i64,
}

/// One aggregated shopping-list line: amounts summed over every recipe in
/// the cart, grouped by (name, measurement unit).
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: i64,
}

/// Subscribed-to author with their newest recipes attached.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionProfile {
    pub id: Id,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub recipes: Vec<RecipeSummary>,
    pub recipes_count: i64,
}

/// Filter inputs of the recipe query engine. Tag slugs match with OR
/// semantics; the membership flags only apply to authenticated viewers.
#[derive(Debug, Default, Clone)]
pub struct RecipeQuery {
    pub tag_slugs: Vec<String>,
    pub author: Option<Id>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

impl RecipeQuery {
    /// Decodes the collaborator-facing query parameters. Unrecognized or
    /// malformed values are treated as absent, never as errors.
    pub fn from_form(form: &Form) -> Self {
        Self {
            tag_slugs: form.get_list("tags"),
            author: form.get_id("author"),
            is_favorited: form.get_flag("is_favorited").unwrap_or(false),
            is_in_shopping_cart: form.get_flag("is_in_shopping_cart").unwrap_or(false),
        }
    }
}
