use sqlx::{Pool, Sqlite};

use crate::error::Error;

/// Schema DDL, one statement per entry. Uniqueness rules live here so that
/// racing writers are resolved by the store, not by application checks.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        username TEXT NOT NULL UNIQUE,
        first_name TEXT NOT NULL DEFAULT '',
        last_name TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS ingredients (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        measurement_unit TEXT NOT NULL,
        UNIQUE (name, measurement_unit)
    )",
    "CREATE TABLE IF NOT EXISTS tags (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        color TEXT NOT NULL UNIQUE,
        slug TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS recipes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        author_id INTEGER NOT NULL REFERENCES users (id),
        name TEXT NOT NULL,
        image TEXT NOT NULL,
        text TEXT NOT NULL,
        cooking_time INTEGER NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS recipe_ingredients (
        recipe_id INTEGER NOT NULL REFERENCES recipes (id),
        ingredient_id INTEGER NOT NULL REFERENCES ingredients (id),
        amount INTEGER NOT NULL,
        UNIQUE (recipe_id, ingredient_id)
    )",
    "CREATE TABLE IF NOT EXISTS recipe_tags (
        recipe_id INTEGER NOT NULL REFERENCES recipes (id),
        tag_id INTEGER NOT NULL REFERENCES tags (id),
        UNIQUE (recipe_id, tag_id)
    )",
    "CREATE TABLE IF NOT EXISTS memberships (
        kind TEXT NOT NULL,
        user_id INTEGER NOT NULL REFERENCES users (id),
        recipe_id INTEGER NOT NULL REFERENCES recipes (id),
        UNIQUE (kind, user_id, recipe_id)
    )",
    "CREATE TABLE IF NOT EXISTS subscriptions (
        user_id INTEGER NOT NULL REFERENCES users (id),
        author_id INTEGER NOT NULL REFERENCES users (id),
        UNIQUE (user_id, author_id)
    )",
    "CREATE INDEX IF NOT EXISTS idx_recipes_author ON recipes (author_id)",
    "CREATE INDEX IF NOT EXISTS idx_memberships_user ON memberships (kind, user_id)",
];

/// Creates every table and index of the schema. Idempotent.
pub async fn init_database(pool: &Pool<Sqlite>) -> Result<(), Error> {
    for &statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}
