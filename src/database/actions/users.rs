use std::collections::HashSet;

use sqlx::{Pool, Sqlite};

use crate::error::Error;
use crate::schema::{Id, RecipeSummary, SubscriptionProfile, User};
use crate::session::Viewer;

pub async fn get_user(username: &str, pool: &Pool<Sqlite>) -> Result<Option<User>, Error> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn get_user_by_id(user_id: Id, pool: &Pool<Sqlite>) -> Result<Option<User>, Error> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Registers a profile. Credentials and tokens are handled by the
/// authentication layer, not here.
pub async fn register_user(
    email: &str,
    username: &str,
    first_name: &str,
    last_name: &str,
    pool: &Pool<Sqlite>,
) -> Result<Id, Error> {
    let row: Option<(Id,)> = sqlx::query_as(
        "
        INSERT INTO users (email, username, first_name, last_name)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT DO NOTHING RETURNING id;
    ",
    )
    .bind(email)
    .bind(username)
    .bind(first_name)
    .bind(last_name)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(id) => Ok(id.0),
        None => Err(Error::conflict(
            "A user with this email or username already exists",
        )),
    }
}

pub async fn subscribe(user_id: Id, author_id: Id, pool: &Pool<Sqlite>) -> Result<(), Error> {
    if user_id == author_id {
        return Err(Error::validation(
            "subscription",
            "You cannot subscribe to yourself",
        ));
    }

    if get_user_by_id(author_id, pool).await?.is_none() {
        return Err(Error::not_found("No user exists with the specified id"));
    }

    let result = sqlx::query(
        "INSERT INTO subscriptions (user_id, author_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(user_id)
    .bind(author_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::conflict("You are already subscribed to this user"));
    }

    Ok(())
}

pub async fn unsubscribe(user_id: Id, author_id: Id, pool: &Pool<Sqlite>) -> Result<(), Error> {
    if get_user_by_id(author_id, pool).await?.is_none() {
        return Err(Error::not_found("No user exists with the specified id"));
    }

    let result = sqlx::query("DELETE FROM subscriptions WHERE user_id = $1 AND author_id = $2")
        .bind(user_id)
        .bind(author_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::conflict("You are not subscribed to this user"));
    }

    Ok(())
}

/// Pure existence check; anonymous viewers and self-lookups are `false`
/// without touching the store.
pub async fn is_subscribed(viewer: Viewer, author_id: Id, pool: &Pool<Sqlite>) -> Result<bool, Error> {
    let user_id = match viewer.user_id() {
        Some(id) if id != author_id => id,
        _ => return Ok(false),
    };

    let row: Option<(Id,)> =
        sqlx::query_as("SELECT author_id FROM subscriptions WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .fetch_optional(pool)
            .await?;

    Ok(row.is_some())
}

/// Ids of every author the user subscribes to, fetched once per request for
/// batched annotation.
pub async fn subscribed_author_ids(user_id: Id, pool: &Pool<Sqlite>) -> Result<HashSet<Id>, Error> {
    let rows: Vec<(Id,)> = sqlx::query_as("SELECT author_id FROM subscriptions WHERE user_id = $1")
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|r| r.0).collect())
}

/// Authors the user subscribes to, each carrying their newest recipes.
/// `recipes_limit` caps the embedded recipe list, not the count.
pub async fn list_subscriptions(
    user_id: Id,
    recipes_limit: Option<i64>,
    pool: &Pool<Sqlite>,
) -> Result<Vec<SubscriptionProfile>, Error> {
    let authors: Vec<User> = sqlx::query_as(
        "
        SELECT u.*
        FROM subscriptions s
        INNER JOIN users u ON u.id = s.author_id
        WHERE s.user_id = $1
        ORDER BY u.id
    ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut profiles = Vec::with_capacity(authors.len());
    for author in authors {
        let recipes: Vec<RecipeSummary> = sqlx::query_as(
            "
            SELECT id, name, image, cooking_time FROM recipes
            WHERE author_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
        ",
        )
        .bind(author.id)
        .bind(recipes_limit.unwrap_or(-1))
        .fetch_all(pool)
        .await?;

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
            .bind(author.id)
            .fetch_one(pool)
            .await?;

        profiles.push(SubscriptionProfile {
            id: author.id,
            email: author.email,
            username: author.username,
            first_name: author.first_name,
            last_name: author.last_name,
            is_subscribed: true,
            recipes,
            recipes_count: count.0,
        });
    }

    Ok(profiles)
}
