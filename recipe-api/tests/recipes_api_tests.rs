/// Integration tests for the recipe endpoints

mod common;

use axum::http::{Method, StatusCode};
use common::{names, TestContext};
use recipe_shared::models::attribute::AttributeKind;
use recipe_shared::store::RecordStore;
use serde_json::{json, Value};

async fn post_recipe(ctx: &TestContext, body: Value) -> (StatusCode, Value) {
    ctx.send(Method::POST, "/v1/recipes", Some(&ctx.auth_header()), Some(body))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_recipes_require_auth() {
    let ctx = TestContext::new().await.unwrap();

    let (status, _) = ctx.send(Method::GET, "/v1/recipes", None, None).await.unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_recipe_with_new_tags() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = post_recipe(
        &ctx,
        json!({
            "title": "Thai Prawn Curry",
            "time_minutes": 30,
            "price": "2.50",
            "tags": [{ "name": "Thai" }, { "name": "Dinner" }]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "Thai Prawn Curry");
    assert_eq!(body["price"], "2.50");
    assert_eq!(body["description"], "");
    assert_eq!(names(&body["tags"]), vec!["Thai", "Dinner"]);

    let tags = ctx.store.find_owned(AttributeKind::Tag, ctx.user.id).await.unwrap();
    assert_eq!(tags.len(), 2);
}

#[tokio::test]
async fn test_create_recipe_reuses_existing_ingredient() {
    let ctx = TestContext::new().await.unwrap();
    let lemon = ctx
        .create_attribute(AttributeKind::Ingredient, ctx.user.id, "Lemon")
        .await
        .unwrap();

    let (status, body) = post_recipe(
        &ctx,
        json!({
            "title": "Vietnamese Soup",
            "time_minutes": 25,
            "price": "2.55",
            "ingredients": [{ "name": "Lemon" }, { "name": "Fish Sauce" }]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ingredients"][0]["id"], lemon.id);

    let rows = ctx
        .store
        .find_owned(AttributeKind::Ingredient, ctx.user.id)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn test_create_recipe_validation() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = post_recipe(
        &ctx,
        json!({ "title": "", "time_minutes": 5, "price": "1.00" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "title");

    let (status, body) = post_recipe(
        &ctx,
        json!({ "title": "Gold", "time_minutes": 5, "price": "1000.00" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "price");
}

#[tokio::test]
async fn test_list_recipes_limited_to_user_newest_first() {
    let ctx = TestContext::new().await.unwrap();
    let other = ctx.create_user("other@example.com").await.unwrap();
    ctx.create_recipe(other.user.id, "Not mine").await.unwrap();
    let first = ctx.create_recipe(ctx.user.id, "First").await.unwrap();
    let second = ctx.create_recipe(ctx.user.id, "Second").await.unwrap();

    let (status, body) = ctx.get("/v1/recipes").await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn test_filter_recipes_by_tags() {
    let ctx = TestContext::new().await.unwrap();
    let vegan = ctx
        .create_attribute(AttributeKind::Tag, ctx.user.id, "Vegan")
        .await
        .unwrap();
    let veg = ctx
        .create_attribute(AttributeKind::Tag, ctx.user.id, "Vegetarian")
        .await
        .unwrap();
    let curry = ctx.create_recipe(ctx.user.id, "Curry").await.unwrap();
    let tahini = ctx.create_recipe(ctx.user.id, "Tahini").await.unwrap();
    ctx.create_recipe(ctx.user.id, "Fish and chips").await.unwrap();
    ctx.store
        .assign(AttributeKind::Tag, curry.id, vegan.id, ctx.user.id)
        .await
        .unwrap();
    ctx.store
        .assign(AttributeKind::Tag, tahini.id, veg.id, ctx.user.id)
        .await
        .unwrap();

    let (status, body) = ctx
        .get(&format!("/v1/recipes?tags={},{}", vegan.id, veg.id))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Tahini", "Curry"]);

    let (status, _) = ctx.get("/v1/recipes?tags=abc").await.unwrap();
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_partial_update_keeps_other_fields() {
    let ctx = TestContext::new().await.unwrap();
    let recipe = ctx.create_recipe(ctx.user.id, "Sample").await.unwrap();

    let (status, body) = ctx
        .send(
            Method::PATCH,
            &format!("/v1/recipes/{}", recipe.id),
            Some(&ctx.auth_header()),
            Some(json!({ "title": "New title", "link": "https://example.com/recipe" })),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "New title");
    assert_eq!(body["link"], "https://example.com/recipe");
    assert_eq!(body["time_minutes"], 10);
    assert_eq!(body["price"], "5.00");
}

#[tokio::test]
async fn test_update_replaces_tag_set() {
    let ctx = TestContext::new().await.unwrap();
    let breakfast = ctx
        .create_attribute(AttributeKind::Tag, ctx.user.id, "Breakfast")
        .await
        .unwrap();
    let recipe = ctx.create_recipe(ctx.user.id, "Eggs").await.unwrap();
    ctx.store
        .assign(AttributeKind::Tag, recipe.id, breakfast.id, ctx.user.id)
        .await
        .unwrap();
    let uri = format!("/v1/recipes/{}", recipe.id);

    let (status, body) = ctx
        .send(
            Method::PATCH,
            &uri,
            Some(&ctx.auth_header()),
            Some(json!({ "tags": [{ "name": "Lunch" }] })),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body["tags"]), vec!["Lunch"]);

    // Old tag survives, only the association is dropped
    let (_, tags) = ctx.get("/v1/tags").await.unwrap();
    assert_eq!(names(&tags), vec!["Lunch", "Breakfast"]);

    let (_, body) = ctx
        .send(
            Method::PATCH,
            &uri,
            Some(&ctx.auth_header()),
            Some(json!({ "tags": [] })),
        )
        .await
        .unwrap();
    assert_eq!(body["tags"], json!([]));
}

#[tokio::test]
async fn test_other_users_recipe_is_not_found() {
    let ctx = TestContext::new().await.unwrap();
    let other = ctx.create_user("other@example.com").await.unwrap();
    let recipe = ctx.create_recipe(other.user.id, "Secret").await.unwrap();
    let uri = format!("/v1/recipes/{}", recipe.id);

    let (status, _) = ctx.get(&uri).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .send(
            Method::PATCH,
            &uri,
            Some(&ctx.auth_header()),
            Some(json!({ "title": "Mine now" })),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .send(Method::DELETE, &uri, Some(&ctx.auth_header()), None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = ctx
        .send(Method::GET, &uri, Some(&other.auth_header()), None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Secret");
}

#[tokio::test]
async fn test_delete_recipe() {
    let ctx = TestContext::new().await.unwrap();
    let recipe = ctx.create_recipe(ctx.user.id, "Toast").await.unwrap();
    let uri = format!("/v1/recipes/{}", recipe.id);

    let (status, _) = ctx
        .send(Method::DELETE, &uri, Some(&ctx.auth_header()), None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx.get(&uri).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patch_foreign_recipe_creates_no_tags() {
    let ctx = TestContext::new().await.unwrap();
    let other = ctx.create_user("other@example.com").await.unwrap();
    let recipe = ctx.create_recipe(other.user.id, "Secret").await.unwrap();

    let (status, _) = ctx
        .send(
            Method::PATCH,
            &format!("/v1/recipes/{}", recipe.id),
            Some(&ctx.auth_header()),
            Some(json!({ "tags": [{ "name": "Mine" }] })),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);

    let tags = ctx.store.find_owned(AttributeKind::Tag, ctx.user.id).await.unwrap();
    assert!(tags.is_empty());
}

#[tokio::test]
async fn test_overlong_attribute_name_rejected_before_write() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = post_recipe(
        &ctx,
        json!({
            "title": "Soup",
            "time_minutes": 5,
            "price": "1.00",
            "tags": [{ "name": "Starter" }],
            "ingredients": [{ "name": "x".repeat(256) }]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "ingredients");

    let (_, body) = ctx.get("/v1/recipes").await.unwrap();
    assert_eq!(body, json!([]));
    let (_, body) = ctx.get("/v1/tags").await.unwrap();
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_malformed_recipe_requests_use_error_body() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.get("/v1/recipes/abc").await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, body) = post_recipe(
        &ctx,
        json!({ "title": "Soup", "time_minutes": "five", "price": "1.00" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "body");

    let (status, body) = ctx.get("/v1/recipes?tags=1&tags=2").await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}
