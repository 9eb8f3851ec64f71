use sqlx::{Pool, Sqlite};

use crate::error::Error;
use crate::schema::{Id, Ingredient};

/// Creates a catalog ingredient. The (name, unit) pair is unique; the same
/// name may exist under a different unit.
pub async fn create_ingredient(
    name: &str,
    measurement_unit: &str,
    pool: &Pool<Sqlite>,
) -> Result<Id, Error> {
    let row: Option<(Id,)> = sqlx::query_as(
        "INSERT INTO ingredients (name, measurement_unit) VALUES ($1, $2) ON CONFLICT DO NOTHING RETURNING id",
    )
    .bind(name)
    .bind(measurement_unit)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(id) => Ok(id.0),
        None => Err(Error::conflict(
            "An ingredient with this name and measurement unit already exists",
        )),
    }
}

pub async fn get_ingredient(id: Id, pool: &Pool<Sqlite>) -> Result<Option<Ingredient>, Error> {
    let row: Option<Ingredient> = sqlx::query_as("SELECT * FROM ingredients WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn find_ingredient(
    name: &str,
    measurement_unit: &str,
    pool: &Pool<Sqlite>,
) -> Result<Option<Id>, Error> {
    let row: Option<(Id,)> = sqlx::query_as(
        "SELECT id FROM ingredients WHERE LOWER(name) = LOWER($1) AND measurement_unit = $2",
    )
    .bind(name)
    .bind(measurement_unit)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.0))
}

/// Lists the catalog, optionally narrowed to names starting with `search`.
pub async fn list_ingredients(
    search: Option<&str>,
    pool: &Pool<Sqlite>,
) -> Result<Vec<Ingredient>, Error> {
    let rows: Vec<Ingredient> = match search {
        Some(prefix) => {
            sqlx::query_as(
                "SELECT * FROM ingredients WHERE name LIKE $1 || '%' ORDER BY name, measurement_unit",
            )
            .bind(prefix)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as("SELECT * FROM ingredients ORDER BY name, measurement_unit")
                .fetch_all(pool)
                .await?
        }
    };

    Ok(rows)
}
