use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    response::Response,
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tower::ServiceExt;

use resolver_evict::{api, app, forwarder::ForwarderKind};

use crate::common::{FlakyTable, settings, state};

mod common;

// Deserialize a Response into T
async fn json<T: DeserializeOwned>(response: Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn router(forwarder: ForwarderKind) -> Router {
    api::build_router(state(forwarder))
}

fn graphql(body: Value) -> Request<Body> {
    Request::post("/graphql")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn put_fruit(field: &str, bowl_id: i64, name: &str, count: i64) -> Request<Body> {
    graphql(json!({
        "operationType": "Mutation",
        "field": field,
        "arguments": { "bowlId": bowl_id, "name": name, "count": count }
    }))
}

fn get_fruit(bowl_id: i64) -> Request<Body> {
    graphql(json!({
        "operationType": "Query",
        "field": "fruit",
        "arguments": { "bowlId": bowl_id }
    }))
}

#[tokio::test]
async fn mutation_response_has_no_sentinel() {
    let router = router(ForwarderKind::Script);

    let response = router
        .oneshot(put_fruit("putFruit", 1, "apple", 5))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json(response).await;
    assert_eq!(
        body,
        json!({ "data": { "putFruit": { "bowlId": 1, "name": "apple", "count": 5 } } })
    );
}

#[tokio::test]
async fn put_then_read_through_http() {
    let router = router(ForwarderKind::Template);

    let response = router
        .clone()
        .oneshot(put_fruit("putFruitWithoutEviction", 1, "pear", 2))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // prime the cache
    let body: Value = json(router.clone().oneshot(get_fruit(1)).await.unwrap()).await;
    assert_eq!(body["data"]["fruit"], json!({ "name": "pear", "count": 2 }));

    router
        .clone()
        .oneshot(put_fruit("putFruitWithoutEviction", 1, "fig", 1))
        .await
        .unwrap();
    let body: Value = json(router.clone().oneshot(get_fruit(1)).await.unwrap()).await;
    assert_eq!(
        body["data"]["fruit"],
        json!({ "name": "pear", "count": 2 }),
        "entry should still be cached"
    );

    router
        .clone()
        .oneshot(put_fruit("putFruit", 1, "apple", 5))
        .await
        .unwrap();
    let body: Value = json(router.clone().oneshot(get_fruit(1)).await.unwrap()).await;
    assert_eq!(body["data"]["fruit"], json!({ "name": "apple", "count": 5 }));

    let diag: Value = json(
        router
            .oneshot(Request::get("/diag").body(Body::empty()).unwrap())
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(diag, json!({ "hits": 1, "misses": 2, "evictions": 1 }));
}

#[tokio::test]
async fn flush_drops_cached_reads() {
    let router = router(ForwarderKind::Template);

    router
        .clone()
        .oneshot(put_fruit("putFruitWithoutEviction", 3, "lime", 4))
        .await
        .unwrap();
    router.clone().oneshot(get_fruit(3)).await.unwrap();
    router
        .clone()
        .oneshot(put_fruit("putFruitWithoutEviction", 3, "lemon", 6))
        .await
        .unwrap();

    let response = router
        .clone()
        .oneshot(Request::delete("/cache").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body: Value = json(router.oneshot(get_fruit(3)).await.unwrap()).await;
    assert_eq!(body["data"]["fruit"], json!({ "name": "lemon", "count": 6 }));
}

#[tokio::test]
async fn invalid_arguments_are_bad_requests() {
    let router = router(ForwarderKind::Template);

    let response = router
        .oneshot(put_fruit("putFruit", 1, "", 5))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json(response).await;
    assert_eq!(body["errors"][0]["message"], "fruit name is empty");
}

#[tokio::test]
async fn unknown_field_is_a_bad_request() {
    let router = router(ForwarderKind::Script);

    let response = router
        .oneshot(graphql(json!({ "operationType": "Query", "field": "bowls" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json(response).await;
    assert_eq!(body["errors"][0]["message"], "no resolver for Query.bowls");
}

#[tokio::test]
async fn malformed_request_body_is_a_bad_request() {
    let router = router(ForwarderKind::Template);

    let response = router
        .oneshot(graphql(json!({ "field": "fruit" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json(response).await;
    assert!(body["errors"][0]["message"].is_string());
}

#[tokio::test]
async fn failed_write_is_an_internal_error() {
    let table = Arc::new(FlakyTable::default());
    let router = api::build_router(app::build_app_state(
        &settings(ForwarderKind::Script),
        table.clone(),
    ));

    router
        .clone()
        .oneshot(put_fruit("putFruitWithoutEviction", 1, "apple", 5))
        .await
        .unwrap();
    router.clone().oneshot(get_fruit(1)).await.unwrap();

    table.set_fail_writes(true);
    let response = router
        .clone()
        .oneshot(put_fruit("putFruit", 1, "kiwi", 3))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = json(response).await;
    assert_eq!(body["errors"][0]["message"], "Internal server error");

    let diag: Value = json(
        router
            .oneshot(Request::get("/diag").body(Body::empty()).unwrap())
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(diag["evictions"], 0);
}
