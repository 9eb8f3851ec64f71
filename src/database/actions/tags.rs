use sqlx::{Pool, Sqlite};

use crate::error::Error;
use crate::schema::{Id, Tag};

/// Creates a tag. Name, color and slug are each unique across the table.
pub async fn create_tag(
    name: &str,
    color: &str,
    slug: &str,
    pool: &Pool<Sqlite>,
) -> Result<Id, Error> {
    let row: Option<(Id,)> = sqlx::query_as(
        "INSERT INTO tags (name, color, slug) VALUES ($1, $2, $3) ON CONFLICT DO NOTHING RETURNING id",
    )
    .bind(name)
    .bind(color)
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(id) => Ok(id.0),
        None => Err(Error::conflict(
            "A tag with this name, color or slug already exists",
        )),
    }
}

pub async fn get_tag(id: Id, pool: &Pool<Sqlite>) -> Result<Option<Tag>, Error> {
    let row: Option<Tag> = sqlx::query_as("SELECT * FROM tags WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn find_tag(slug: &str, pool: &Pool<Sqlite>) -> Result<Option<Id>, Error> {
    let row: Option<(Id,)> = sqlx::query_as("SELECT id FROM tags WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| r.0))
}

pub async fn list_tags(pool: &Pool<Sqlite>) -> Result<Vec<Tag>, Error> {
    let rows: Vec<Tag> = sqlx::query_as("SELECT * FROM tags ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(rows)
}
