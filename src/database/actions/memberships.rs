use std::collections::HashSet;

use sqlx::{Pool, Sqlite};

use crate::error::Error;
use crate::schema::{Id, MembershipKind, RecipeSummary};
use crate::session::Viewer;

use super::recipes::get_recipe;

/// Records a (user, recipe) membership of the given kind. The unique index
/// on (kind, user, recipe) makes racing double-adds converge to one row and
/// one conflict.
pub async fn add_membership(
    kind: MembershipKind,
    user_id: Id,
    recipe_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<RecipeSummary, Error> {
    let recipe = match get_recipe(recipe_id, pool).await? {
        Some(recipe) => recipe,
        None => return Err(Error::not_found("No recipe exists with the specified id")),
    };

    let result = sqlx::query(
        "INSERT INTO memberships (kind, user_id, recipe_id) VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
    )
    .bind(kind)
    .bind(user_id)
    .bind(recipe_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::conflict(&format!(
            "Recipe is already in {}",
            kind.collection()
        )));
    }

    Ok(RecipeSummary {
        id: recipe.id,
        name: recipe.name,
        image: recipe.image,
        cooking_time: recipe.cooking_time,
    })
}

pub async fn remove_membership(
    kind: MembershipKind,
    user_id: Id,
    recipe_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<(), Error> {
    if get_recipe(recipe_id, pool).await?.is_none() {
        return Err(Error::not_found("No recipe exists with the specified id"));
    }

    let result =
        sqlx::query("DELETE FROM memberships WHERE kind = $1 AND user_id = $2 AND recipe_id = $3")
            .bind(kind)
            .bind(user_id)
            .bind(recipe_id)
            .execute(pool)
            .await?;

    if result.rows_affected() == 0 {
        return Err(Error::conflict(&format!(
            "Recipe is not in {}",
            kind.collection()
        )));
    }

    Ok(())
}

/// Pure existence check. Anonymous viewers evaluate to `false` without
/// touching the store.
pub async fn has_membership(
    kind: MembershipKind,
    viewer: Viewer,
    recipe_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<bool, Error> {
    let user_id = match viewer.user_id() {
        Some(id) => id,
        None => return Ok(false),
    };

    let row: Option<(Id,)> = sqlx::query_as(
        "SELECT recipe_id FROM memberships WHERE kind = $1 AND user_id = $2 AND recipe_id = $3",
    )
    .bind(kind)
    .bind(user_id)
    .bind(recipe_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.is_some())
}

/// Recipe ids of a user's collection, fetched once per request so list
/// annotation is a set probe instead of a query per recipe.
pub async fn membership_recipe_ids(
    kind: MembershipKind,
    user_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<HashSet<Id>, Error> {
    let rows: Vec<(Id,)> =
        sqlx::query_as("SELECT recipe_id FROM memberships WHERE kind = $1 AND user_id = $2")
            .bind(kind)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(|r| r.0).collect())
}

pub async fn list_memberships(
    kind: MembershipKind,
    user_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<Vec<RecipeSummary>, Error> {
    let rows: Vec<RecipeSummary> = sqlx::query_as(
        "
        SELECT r.id, r.name, r.image, r.cooking_time
        FROM memberships m
        INNER JOIN recipes r ON r.id = m.recipe_id
        WHERE m.kind = $1 AND m.user_id = $2
        ORDER BY r.created_at DESC, r.id DESC
    ",
    )
    .bind(kind)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
