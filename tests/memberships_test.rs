mod common;

use common::*;

use mealbook_sdk::actions::{memberships, users};
use mealbook_sdk::error::Error;
use mealbook_sdk::schema::MembershipKind;
use mealbook_sdk::session::Viewer;

#[tokio::test]
async fn double_add_converges_to_one_row_and_one_conflict() {
    let pool = setup_pool().await;
    let author = seed_user("alice", &pool).await;
    let fan = seed_user("bob", &pool).await;
    let flour = seed_ingredient("flour", "g", &pool).await;
    let tag = seed_tag("Dinner", "#49B64E", "dinner", &pool).await;
    let recipe_id = seed_recipe(author, "Bread", &[(flour, 500)], &[tag], &pool).await;

    let summary = memberships::add_membership(MembershipKind::Favorite, fan, recipe_id, &pool)
        .await
        .expect("first add should pass");
    assert_eq!(summary.id, recipe_id);
    assert_eq!(summary.name, "Bread");

    let second = memberships::add_membership(MembershipKind::Favorite, fan, recipe_id, &pool).await;
    assert!(matches!(second, Err(Error::Conflict(_))));

    assert_eq!(count_rows("memberships", &pool).await, 1);
}

#[tokio::test]
async fn remove_requires_an_existing_membership() {
    let pool = setup_pool().await;
    let author = seed_user("alice", &pool).await;
    let fan = seed_user("bob", &pool).await;
    let flour = seed_ingredient("flour", "g", &pool).await;
    let tag = seed_tag("Dinner", "#49B64E", "dinner", &pool).await;
    let recipe_id = seed_recipe(author, "Bread", &[(flour, 500)], &[tag], &pool).await;

    let missing =
        memberships::remove_membership(MembershipKind::ShoppingList, fan, recipe_id, &pool).await;
    assert!(matches!(missing, Err(Error::Conflict(_))));

    memberships::add_membership(MembershipKind::ShoppingList, fan, recipe_id, &pool)
        .await
        .expect("add should pass");
    memberships::remove_membership(MembershipKind::ShoppingList, fan, recipe_id, &pool)
        .await
        .expect("remove should pass");

    assert_eq!(count_rows("memberships", &pool).await, 0);
}

#[tokio::test]
async fn membership_actions_on_missing_recipes_are_not_found() {
    let pool = setup_pool().await;
    let fan = seed_user("bob", &pool).await;

    let add = memberships::add_membership(MembershipKind::Favorite, fan, 4711, &pool).await;
    assert!(matches!(add, Err(Error::NotFound(_))));

    let remove = memberships::remove_membership(MembershipKind::Favorite, fan, 4711, &pool).await;
    assert!(matches!(remove, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn favorite_and_shopping_list_are_independent_relations() {
    let pool = setup_pool().await;
    let author = seed_user("alice", &pool).await;
    let fan = seed_user("bob", &pool).await;
    let flour = seed_ingredient("flour", "g", &pool).await;
    let tag = seed_tag("Dinner", "#49B64E", "dinner", &pool).await;
    let recipe_id = seed_recipe(author, "Bread", &[(flour, 500)], &[tag], &pool).await;

    memberships::add_membership(MembershipKind::Favorite, fan, recipe_id, &pool)
        .await
        .expect("favorite should insert");

    assert!(
        memberships::has_membership(MembershipKind::Favorite, Viewer::User(fan), recipe_id, &pool)
            .await
            .expect("check should run")
    );
    assert!(!memberships::has_membership(
        MembershipKind::ShoppingList,
        Viewer::User(fan),
        recipe_id,
        &pool
    )
    .await
    .expect("check should run"));

    // The same (user, recipe) pair can sit in both relations.
    memberships::add_membership(MembershipKind::ShoppingList, fan, recipe_id, &pool)
        .await
        .expect("cart entry should insert");
    assert_eq!(count_rows("memberships", &pool).await, 2);
}

#[tokio::test]
async fn anonymous_membership_checks_are_false_not_errors() {
    let pool = setup_pool().await;
    let author = seed_user("alice", &pool).await;
    let flour = seed_ingredient("flour", "g", &pool).await;
    let tag = seed_tag("Dinner", "#49B64E", "dinner", &pool).await;
    let recipe_id = seed_recipe(author, "Bread", &[(flour, 500)], &[tag], &pool).await;

    let favorited =
        memberships::has_membership(MembershipKind::Favorite, Viewer::Anonymous, recipe_id, &pool)
            .await
            .expect("check should run");
    assert!(!favorited);
}

#[tokio::test]
async fn list_memberships_returns_summaries_newest_first() {
    let pool = setup_pool().await;
    let author = seed_user("alice", &pool).await;
    let fan = seed_user("bob", &pool).await;
    let flour = seed_ingredient("flour", "g", &pool).await;
    let tag = seed_tag("Dinner", "#49B64E", "dinner", &pool).await;

    let older = seed_recipe(author, "Bread", &[(flour, 500)], &[tag], &pool).await;
    let newer = seed_recipe(author, "Buns", &[(flour, 250)], &[tag], &pool).await;

    memberships::add_membership(MembershipKind::Favorite, fan, older, &pool)
        .await
        .expect("favorite should insert");
    memberships::add_membership(MembershipKind::Favorite, fan, newer, &pool)
        .await
        .expect("favorite should insert");

    let listed = memberships::list_memberships(MembershipKind::Favorite, fan, &pool)
        .await
        .expect("listing should run");

    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, newer);
    assert_eq!(listed[1].id, older);
}

#[tokio::test]
async fn self_subscription_is_rejected_without_a_row() {
    let pool = setup_pool().await;
    let alice = seed_user("alice", &pool).await;

    let result = users::subscribe(alice, alice, &pool).await;
    assert!(matches!(result, Err(Error::Validation { field, .. }) if field == "subscription"));
    assert_eq!(count_rows("subscriptions", &pool).await, 0);
}

#[tokio::test]
async fn subscriptions_enforce_uniqueness_and_existence() {
    let pool = setup_pool().await;
    let alice = seed_user("alice", &pool).await;
    let bob = seed_user("bob", &pool).await;

    let ghost = users::subscribe(alice, 4711, &pool).await;
    assert!(matches!(ghost, Err(Error::NotFound(_))));

    users::subscribe(alice, bob, &pool)
        .await
        .expect("subscription should insert");

    let duplicate = users::subscribe(alice, bob, &pool).await;
    assert!(matches!(duplicate, Err(Error::Conflict(_))));
    assert_eq!(count_rows("subscriptions", &pool).await, 1);

    assert!(users::is_subscribed(Viewer::User(alice), bob, &pool)
        .await
        .expect("check should run"));
    assert!(!users::is_subscribed(Viewer::Anonymous, bob, &pool)
        .await
        .expect("check should run"));
    assert!(!users::is_subscribed(Viewer::User(bob), bob, &pool)
        .await
        .expect("check should run"));

    users::unsubscribe(alice, bob, &pool)
        .await
        .expect("unsubscribe should pass");
    let repeated = users::unsubscribe(alice, bob, &pool).await;
    assert!(matches!(repeated, Err(Error::Conflict(_))));
}

#[tokio::test]
async fn subscription_listing_embeds_limited_recipes_and_full_count() {
    let pool = setup_pool().await;
    let alice = seed_user("alice", &pool).await;
    let bob = seed_user("bob", &pool).await;
    let flour = seed_ingredient("flour", "g", &pool).await;
    let tag = seed_tag("Dinner", "#49B64E", "dinner", &pool).await;

    seed_recipe(bob, "Bread", &[(flour, 500)], &[tag], &pool).await;
    seed_recipe(bob, "Buns", &[(flour, 250)], &[tag], &pool).await;
    let newest = seed_recipe(bob, "Bagels", &[(flour, 300)], &[tag], &pool).await;

    users::subscribe(alice, bob, &pool)
        .await
        .expect("subscription should insert");

    let profiles = users::list_subscriptions(alice, Some(2), &pool)
        .await
        .expect("listing should run");

    assert_eq!(profiles.len(), 1);
    let profile = &profiles[0];
    assert_eq!(profile.username, "bob");
    assert!(profile.is_subscribed);
    assert_eq!(profile.recipes_count, 3);
    assert_eq!(profile.recipes.len(), 2);
    assert_eq!(profile.recipes[0].id, newest);

    let unlimited = users::list_subscriptions(alice, None, &pool)
        .await
        .expect("listing should run");
    assert_eq!(unlimited[0].recipes.len(), 3);
}
