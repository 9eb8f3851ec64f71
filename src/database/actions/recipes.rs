use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sqlx::{Pool, QueryBuilder, Sqlite, Transaction};

use crate::error::Error;
use crate::schema::{
    AuthorProfile, Id, IngredientAmount, IngredientPart, IngredientPartRow, MembershipKind,
    NewRecipe, Recipe, RecipeDetails, RecipeQuery, Tag, TagLinkRow, User,
};
use crate::session::Viewer;

use super::ingredients::get_ingredient;
use super::memberships::membership_recipe_ids;
use super::tags::get_tag;
use super::users::subscribed_author_ids;

fn validate_fields(fields: &NewRecipe) -> Result<(), Error> {
    if fields.cooking_time < 1 {
        return Err(Error::validation(
            "cooking_time",
            "Cooking time must be at least one minute",
        ));
    }

    Ok(())
}

fn validate_ingredients(parts: &[IngredientAmount]) -> Result<(), Error> {
    if parts.is_empty() {
        return Err(Error::validation(
            "ingredients",
            "At least one ingredient is required",
        ));
    }

    let mut seen: HashSet<Id> = HashSet::new();
    for part in parts {
        if part.amount < 1 {
            return Err(Error::validation(
                "ingredients",
                "Ingredient amount must be at least 1",
            ));
        }
        if !seen.insert(part.ingredient_id) {
            return Err(Error::validation("ingredients", "Ingredients must be unique"));
        }
    }

    Ok(())
}

fn validate_tags(tag_ids: &[Id]) -> Result<(), Error> {
    if tag_ids.is_empty() {
        return Err(Error::validation("tags", "At least one tag is required"));
    }

    let mut seen: HashSet<Id> = HashSet::new();
    for tag_id in tag_ids {
        if !seen.insert(*tag_id) {
            return Err(Error::validation("tags", "Tags must be unique"));
        }
    }

    Ok(())
}

async fn resolve_ingredients(parts: &[IngredientAmount], pool: &Pool<Sqlite>) -> Result<(), Error> {
    for part in parts {
        if get_ingredient(part.ingredient_id, pool).await?.is_none() {
            return Err(Error::validation(
                "ingredients",
                "No ingredient exists with the specified id",
            ));
        }
    }

    Ok(())
}

async fn resolve_tags(tag_ids: &[Id], pool: &Pool<Sqlite>) -> Result<(), Error> {
    for tag_id in tag_ids {
        if get_tag(*tag_id, pool).await?.is_none() {
            return Err(Error::validation("tags", "No tag exists with the specified id"));
        }
    }

    Ok(())
}

async fn insert_ingredient_rows(
    recipe_id: Id,
    parts: &[IngredientAmount],
    tr: &mut Transaction<'_, Sqlite>,
) -> Result<(), Error> {
    let mut query_builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) ");

    query_builder.push_values(parts.iter(), |mut b, part| {
        b.push_bind(recipe_id)
            .push_bind(part.ingredient_id)
            .push_bind(part.amount);
    });

    query_builder.build().execute(&mut **tr).await?;

    Ok(())
}

async fn insert_tag_rows(
    recipe_id: Id,
    tag_ids: &[Id],
    tr: &mut Transaction<'_, Sqlite>,
) -> Result<(), Error> {
    let mut query_builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO recipe_tags (recipe_id, tag_id) ");

    query_builder.push_values(tag_ids.iter(), |mut b, tag_id| {
        b.push_bind(recipe_id).push_bind(*tag_id);
    });

    query_builder.build().execute(&mut **tr).await?;

    Ok(())
}

/// Validates and persists a recipe with its ingredient and tag sets as one
/// atomic unit. Partial writes are never observable.
pub async fn create_recipe(
    author: Viewer,
    fields: &NewRecipe,
    ingredients: &[IngredientAmount],
    tag_ids: &[Id],
    pool: &Pool<Sqlite>,
) -> Result<Id, Error> {
    let author_id = author.require_user()?;

    validate_fields(fields)?;
    validate_ingredients(ingredients)?;
    validate_tags(tag_ids)?;
    resolve_ingredients(ingredients, pool).await?;
    resolve_tags(tag_ids, pool).await?;

    let mut tr = pool.begin().await?;

    let row: (Id,) = sqlx::query_as(
        "
        INSERT INTO recipes (author_id, name, image, text, cooking_time, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
    ",
    )
    .bind(author_id)
    .bind(&fields.name)
    .bind(&fields.image)
    .bind(&fields.text)
    .bind(fields.cooking_time)
    .bind(Utc::now())
    .fetch_one(&mut *tr)
    .await?;

    let recipe_id = row.0;
    insert_ingredient_rows(recipe_id, ingredients, &mut tr).await?;
    insert_tag_rows(recipe_id, tag_ids, &mut tr).await?;

    tr.commit().await?;

    Ok(recipe_id)
}

pub async fn get_recipe(id: Id, pool: &Pool<Sqlite>) -> Result<Option<Recipe>, Error> {
    let row: Option<Recipe> = sqlx::query_as("SELECT * FROM recipes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Fetches a recipe for mutation. Missing recipes surface before ownership
/// so callers get NotFound over Forbidden for dead ids.
pub async fn get_recipe_mut(id: Id, editor_id: Id, pool: &Pool<Sqlite>) -> Result<Recipe, Error> {
    match get_recipe(id, pool).await? {
        Some(recipe) => {
            if recipe.author_id != editor_id {
                Err(Error::forbidden("Only the author can modify this recipe"))
            } else {
                Ok(recipe)
            }
        }
        None => Err(Error::not_found("No recipe exists with the specified id")),
    }
}

/// Replaces the recipe's scalar fields, and wholesale-replaces the
/// ingredient and/or tag sets when provided. The delete-then-reinsert runs
/// inside one transaction; a concurrent reader never sees an empty set.
pub async fn update_recipe(
    recipe_id: Id,
    editor: Viewer,
    fields: &NewRecipe,
    ingredients: Option<&[IngredientAmount]>,
    tag_ids: Option<&[Id]>,
    pool: &Pool<Sqlite>,
) -> Result<(), Error> {
    let editor_id = editor.require_user()?;
    get_recipe_mut(recipe_id, editor_id, pool).await?;

    validate_fields(fields)?;
    if let Some(parts) = ingredients {
        validate_ingredients(parts)?;
        resolve_ingredients(parts, pool).await?;
    }
    if let Some(tags) = tag_ids {
        validate_tags(tags)?;
        resolve_tags(tags, pool).await?;
    }

    let mut tr = pool.begin().await?;

    sqlx::query(
        "UPDATE recipes SET name = $1, image = $2, text = $3, cooking_time = $4 WHERE id = $5",
    )
    .bind(&fields.name)
    .bind(&fields.image)
    .bind(&fields.text)
    .bind(fields.cooking_time)
    .bind(recipe_id)
    .execute(&mut *tr)
    .await?;

    if let Some(parts) = ingredients {
        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *tr)
            .await?;

        insert_ingredient_rows(recipe_id, parts, &mut tr).await?;
    }

    if let Some(tags) = tag_ids {
        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *tr)
            .await?;

        insert_tag_rows(recipe_id, tags, &mut tr).await?;
    }

    tr.commit().await?;

    Ok(())
}

/// Deletes a recipe and cascades its ingredient rows, tag rows and every
/// favorite/shopping-list membership referencing it.
pub async fn delete_recipe(recipe_id: Id, editor: Viewer, pool: &Pool<Sqlite>) -> Result<(), Error> {
    let editor_id = editor.require_user()?;
    get_recipe_mut(recipe_id, editor_id, pool).await?;

    let mut tr = pool.begin().await?;

    sqlx::query("DELETE FROM memberships WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *tr)
        .await?;

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *tr)
        .await?;

    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *tr)
        .await?;

    sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(recipe_id)
        .execute(&mut *tr)
        .await?;

    tr.commit().await?;

    Ok(())
}

/// Full read projection of a single recipe.
pub async fn get_recipe_details(
    recipe_id: Id,
    viewer: Viewer,
    pool: &Pool<Sqlite>,
) -> Result<RecipeDetails, Error> {
    let recipe = get_recipe(recipe_id, pool)
        .await?
        .ok_or_else(|| Error::not_found("No recipe exists with the specified id"))?;

    let details = load_details(vec![recipe], viewer, pool).await?;

    details
        .into_iter()
        .next()
        .ok_or_else(|| Error::not_found("No recipe exists with the specified id"))
}

/// Filter + annotate over the recipe collection. Tag slugs match with OR
/// semantics, membership flags only narrow for authenticated viewers, and
/// results come back newest-created first (id as tie-break).
pub async fn fetch_recipes(
    query: &RecipeQuery,
    viewer: Viewer,
    pool: &Pool<Sqlite>,
) -> Result<Vec<RecipeDetails>, Error> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT DISTINCT r.* FROM recipes r");

    if !query.tag_slugs.is_empty() {
        builder.push(
            " INNER JOIN recipe_tags rt ON rt.recipe_id = r.id INNER JOIN tags t ON t.id = rt.tag_id",
        );
    }

    builder.push(" WHERE 1 = 1");

    if !query.tag_slugs.is_empty() {
        builder.push(" AND t.slug IN (");
        let mut slugs = builder.separated(", ");
        for slug in &query.tag_slugs {
            slugs.push_bind(slug.clone());
        }
        builder.push(")");
    }

    if let Some(author_id) = query.author {
        builder.push(" AND r.author_id = ");
        builder.push_bind(author_id);
    }

    if let Some(user_id) = viewer.user_id() {
        if query.is_favorited {
            builder.push(" AND r.id IN (SELECT recipe_id FROM memberships WHERE kind = ");
            builder.push_bind(MembershipKind::Favorite);
            builder.push(" AND user_id = ");
            builder.push_bind(user_id);
            builder.push(")");
        }
        if query.is_in_shopping_cart {
            builder.push(" AND r.id IN (SELECT recipe_id FROM memberships WHERE kind = ");
            builder.push_bind(MembershipKind::ShoppingList);
            builder.push(" AND user_id = ");
            builder.push_bind(user_id);
            builder.push(")");
        }
    }

    builder.push(" ORDER BY r.created_at DESC, r.id DESC");

    let rows: Vec<Recipe> = builder.build_query_as().fetch_all(pool).await?;

    load_details(rows, viewer, pool).await
}

/// Resolves rows into projections with one batched query per relation
/// instead of per-recipe probes.
async fn load_details(
    recipes: Vec<Recipe>,
    viewer: Viewer,
    pool: &Pool<Sqlite>,
) -> Result<Vec<RecipeDetails>, Error> {
    if recipes.is_empty() {
        return Ok(vec![]);
    }

    let ids: Vec<Id> = recipes.iter().map(|recipe| recipe.id).collect();

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "
        SELECT ri.recipe_id AS recipe_id, i.id AS id, i.name AS name,
               i.measurement_unit AS measurement_unit, ri.amount AS amount
        FROM recipe_ingredients ri
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id IN (",
    );
    let mut separated = builder.separated(", ");
    for id in &ids {
        separated.push_bind(*id);
    }
    builder.push(") ORDER BY i.name");

    let part_rows: Vec<IngredientPartRow> = builder.build_query_as().fetch_all(pool).await?;
    let mut parts_by_recipe: HashMap<Id, Vec<IngredientPart>> = HashMap::new();
    for row in part_rows {
        parts_by_recipe
            .entry(row.recipe_id)
            .or_default()
            .push(row.into());
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "
        SELECT rt.recipe_id AS recipe_id, t.id AS id, t.name AS name,
               t.color AS color, t.slug AS slug
        FROM recipe_tags rt
        INNER JOIN tags t ON t.id = rt.tag_id
        WHERE rt.recipe_id IN (",
    );
    let mut separated = builder.separated(", ");
    for id in &ids {
        separated.push_bind(*id);
    }
    builder.push(") ORDER BY t.name");

    let tag_rows: Vec<TagLinkRow> = builder.build_query_as().fetch_all(pool).await?;
    let mut tags_by_recipe: HashMap<Id, Vec<Tag>> = HashMap::new();
    for row in tag_rows {
        tags_by_recipe
            .entry(row.recipe_id)
            .or_default()
            .push(row.into());
    }

    let author_ids: HashSet<Id> = recipes.iter().map(|recipe| recipe.author_id).collect();
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM users WHERE id IN (");
    let mut separated = builder.separated(", ");
    for id in &author_ids {
        separated.push_bind(*id);
    }
    builder.push(")");

    let authors: Vec<User> = builder.build_query_as().fetch_all(pool).await?;
    let authors: HashMap<Id, User> = authors.into_iter().map(|user| (user.id, user)).collect();

    let (favorites, in_cart, subscribed) = match viewer.user_id() {
        Some(user_id) => (
            membership_recipe_ids(MembershipKind::Favorite, user_id, pool).await?,
            membership_recipe_ids(MembershipKind::ShoppingList, user_id, pool).await?,
            subscribed_author_ids(user_id, pool).await?,
        ),
        None => (HashSet::new(), HashSet::new(), HashSet::new()),
    };

    let mut details = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        let author = authors
            .get(&recipe.author_id)
            .ok_or_else(|| Error::not_found("The recipe author no longer exists"))?;

        details.push(RecipeDetails {
            id: recipe.id,
            author: AuthorProfile {
                id: author.id,
                email: author.email.clone(),
                username: author.username.clone(),
                first_name: author.first_name.clone(),
                last_name: author.last_name.clone(),
                is_subscribed: subscribed.contains(&recipe.author_id),
            },
            name: recipe.name,
            image: recipe.image,
            text: recipe.text,
            cooking_time: recipe.cooking_time,
            created_at: recipe.created_at,
            ingredients: parts_by_recipe.remove(&recipe.id).unwrap_or_default(),
            tags: tags_by_recipe.remove(&recipe.id).unwrap_or_default(),
            is_favorited: favorites.contains(&recipe.id),
            is_in_shopping_cart: in_cart.contains(&recipe.id),
        });
    }

    Ok(details)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(ingredient_id: Id, amount: i64) -> IngredientAmount {
        IngredientAmount {
            ingredient_id,
            amount,
        }
    }

    #[test]
    fn rejects_empty_and_duplicate_ingredients() {
        assert!(matches!(
            validate_ingredients(&[]),
            Err(Error::Validation { field, .. }) if field == "ingredients"
        ));
        assert!(matches!(
            validate_ingredients(&[part(1, 2), part(1, 3)]),
            Err(Error::Validation { field, .. }) if field == "ingredients"
        ));
        assert!(validate_ingredients(&[part(1, 2), part(2, 3)]).is_ok());
    }

    #[test]
    fn rejects_non_positive_amounts() {
        assert!(validate_ingredients(&[part(1, 0)]).is_err());
        assert!(validate_ingredients(&[part(1, -4)]).is_err());
        assert!(validate_ingredients(&[part(1, 1)]).is_ok());
    }

    #[test]
    fn rejects_empty_and_duplicate_tags() {
        assert!(matches!(
            validate_tags(&[]),
            Err(Error::Validation { field, .. }) if field == "tags"
        ));
        assert!(validate_tags(&[7, 7]).is_err());
        assert!(validate_tags(&[7, 8]).is_ok());
    }

    #[test]
    fn rejects_zero_cooking_time() {
        let fields = NewRecipe {
            name: "Toast".to_string(),
            image: "img/toast.png".to_string(),
            text: "Toast the bread.".to_string(),
            cooking_time: 0,
        };
        assert!(matches!(
            validate_fields(&fields),
            Err(Error::Validation { field, .. }) if field == "cooking_time"
        ));
    }
}
