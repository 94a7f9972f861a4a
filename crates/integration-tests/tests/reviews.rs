//! Review and reply writes against a live database.

use reqwest::StatusCode;
use serde_json::{Value, json};

use threadline_integration_tests::TestContext;

async fn review_count(ctx: &TestContext) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM storefront.review")
        .fetch_one(&ctx.pool)
        .await
        .expect("count reviews")
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_review_without_score_is_rejected() {
    let ctx = TestContext::new().await;
    let product = ctx.fixtures.shirts[0];

    let response = ctx
        .client
        .post(ctx.url(&format!("/products/{product}/reviews")))
        .header("Authorization", ctx.bearer(ctx.fixtures.shopper))
        .json(&json!({ "description": "Lovely fabric" }))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body["MESSAGE"], "KEY_ERROR");
    assert_eq!(review_count(&ctx).await, 0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_review_updates_average() {
    let ctx = TestContext::new().await;
    let product = ctx.fixtures.shirts[0];

    for (user, score) in [(ctx.fixtures.shopper, 5), (ctx.fixtures.other_shopper, 2)] {
        let response = ctx
            .client
            .post(ctx.url(&format!("/products/{product}/reviews")))
            .header("Authorization", ctx.bearer(user))
            .json(&json!({ "score": score }))
            .send()
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let (_, detail) = ctx.get_json(&format!("/products/{product}")).await;
    assert_eq!(detail["PRODUCT_INFO"]["review_score_avg"], 3.5);
    assert_eq!(review_count(&ctx).await, 2);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_only_author_can_delete_review() {
    let ctx = TestContext::new().await;
    let product = ctx.fixtures.shirts[0];

    let created: Value = ctx
        .client
        .post(ctx.url(&format!("/products/{product}/reviews")))
        .header("Authorization", ctx.bearer(ctx.fixtures.shopper))
        .json(&json!({ "score": 4, "description": "Fits well" }))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    let review_id = created["REVIEW_ID"].as_i64().expect("REVIEW_ID");
    let path = format!("/products/{product}/reviews/{review_id}");

    let stranger = ctx
        .client
        .delete(ctx.url(&path))
        .header("Authorization", ctx.bearer(ctx.fixtures.other_shopper))
        .send()
        .await
        .expect("request");
    assert_eq!(stranger.status(), StatusCode::BAD_REQUEST);
    assert_eq!(review_count(&ctx).await, 1);

    let author = ctx
        .client
        .delete(ctx.url(&path))
        .header("Authorization", ctx.bearer(ctx.fixtures.shopper))
        .send()
        .await
        .expect("request");
    assert_eq!(author.status(), StatusCode::NO_CONTENT);
    assert_eq!(review_count(&ctx).await, 0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_reply_thread() {
    let ctx = TestContext::new().await;
    let product = ctx.fixtures.shirts[1];

    let created: Value = ctx
        .client
        .post(ctx.url(&format!("/products/{product}/reviews")))
        .header("Authorization", ctx.bearer(ctx.fixtures.shopper))
        .json(&json!({ "score": 3 }))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    let review_id = created["REVIEW_ID"].as_i64().expect("REVIEW_ID");

    let blank = ctx
        .client
        .post(ctx.url(&format!("/reviews/{review_id}/replies")))
        .header("Authorization", ctx.bearer(ctx.fixtures.other_shopper))
        .json(&json!({ "comment": "   " }))
        .send()
        .await
        .expect("request");
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

    let reply = ctx
        .client
        .post(ctx.url(&format!("/reviews/{review_id}/replies")))
        .header("Authorization", ctx.bearer(ctx.fixtures.other_shopper))
        .json(&json!({ "comment": "Agreed" }))
        .send()
        .await
        .expect("request");
    assert_eq!(reply.status(), StatusCode::CREATED);

    let (status, body) = ctx.get_json(&format!("/reviews/{review_id}/replies")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["REPLY_LIST"][0]["comment"], "Agreed");
    assert_eq!(body["REPLY_LIST"][0]["user_name"], "Grace");
}
