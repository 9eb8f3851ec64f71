use sqlx::{Pool, Sqlite};

use crate::error::Error;
use crate::schema::{Id, MembershipKind, ShoppingListItem};

/// Merges every recipe in the user's shopping list into one ingredient
/// aggregate: amounts summed per (name, measurement unit) pair, ordered by
/// name so repeated exports come out identical. An empty shopping list
/// yields an empty aggregate.
pub async fn aggregate_shopping_list(
    user_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<Vec<ShoppingListItem>, Error> {
    let rows: Vec<ShoppingListItem> = sqlx::query_as(
        "
        SELECT i.name AS name, i.measurement_unit AS measurement_unit,
               SUM(ri.amount) AS total_amount
        FROM memberships m
        INNER JOIN recipe_ingredients ri ON ri.recipe_id = m.recipe_id
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE m.kind = $1 AND m.user_id = $2
        GROUP BY i.name, i.measurement_unit
        ORDER BY i.name, i.measurement_unit
    ",
    )
    .bind(MembershipKind::ShoppingList)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
