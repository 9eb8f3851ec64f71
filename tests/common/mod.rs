#![allow(dead_code)]

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};

use mealbook_sdk::actions::{ingredients, recipes, tags, users};
use mealbook_sdk::migrations::init_database;
use mealbook_sdk::schema::{Id, IngredientAmount, NewRecipe};
use mealbook_sdk::session::Viewer;

/// Fresh in-memory database with the schema applied. One connection so the
/// database lives as long as the pool.
pub async fn setup_pool() -> Pool<Sqlite> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database should open");

    init_database(&pool).await.expect("schema should apply");

    pool
}

pub async fn seed_user(name: &str, pool: &Pool<Sqlite>) -> Id {
    users::register_user(&format!("{name}@example.com"), name, "Test", "Cook", pool)
        .await
        .expect("user should register")
}

pub async fn seed_ingredient(name: &str, unit: &str, pool: &Pool<Sqlite>) -> Id {
    ingredients::create_ingredient(name, unit, pool)
        .await
        .expect("ingredient should insert")
}

pub async fn seed_tag(name: &str, color: &str, slug: &str, pool: &Pool<Sqlite>) -> Id {
    tags::create_tag(name, color, slug, pool)
        .await
        .expect("tag should insert")
}

pub fn recipe_fields(name: &str) -> NewRecipe {
    NewRecipe {
        name: name.to_string(),
        image: format!("recipe/images/{name}.png"),
        text: format!("How to make {name}."),
        cooking_time: 15,
    }
}

pub async fn seed_recipe(
    author: Id,
    name: &str,
    parts: &[(Id, i64)],
    tag_ids: &[Id],
    pool: &Pool<Sqlite>,
) -> Id {
    let parts: Vec<IngredientAmount> = parts
        .iter()
        .map(|(ingredient_id, amount)| IngredientAmount {
            ingredient_id: *ingredient_id,
            amount: *amount,
        })
        .collect();

    recipes::create_recipe(Viewer::User(author), &recipe_fields(name), &parts, tag_ids, pool)
        .await
        .expect("recipe should insert")
}

pub async fn count_rows(table: &str, pool: &Pool<Sqlite>) -> i64 {
    let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("count should run");

    row.0
}
