mod common;

use axum_test::TestServer;
use kv_gateway::routes::router;

fn server() -> (TestServer, kv_gateway::AppState) {
    let state = common::create_test_state();
    let server = TestServer::new(router(state.clone())).unwrap();
    (server, state)
}

#[tokio::test]
async fn test_set_then_get() {
    let (server, _) = server();

    let response = server.get("/redis/set").add_query_param("key", "greeting").await;
    response.assert_status_ok();
    response.assert_text("true");

    let response = server.get("/redis/get").add_query_param("key", "greeting").await;
    response.assert_status_ok();

    let body = response.text();
    let suffix = body
        .strip_prefix("greeting")
        .expect("value starts with the key");
    let millis: i64 = suffix.parse().expect("value ends with epoch millis");
    assert!(millis > 0);
}

#[tokio::test]
async fn test_set_writes_through_facade() {
    let (server, state) = server();

    server
        .post("/redis/set")
        .add_query_param("key", "counter")
        .await
        .assert_text("true");

    let stored = state.kv.get("counter").await.unwrap().unwrap();
    assert!(stored.starts_with("counter"));
}

#[tokio::test]
async fn test_routes_accept_any_method() {
    let (server, state) = server();
    state.kv.set("k", "v").await.unwrap();

    server.get("/redis/get").add_query_param("key", "k").await.assert_text("v");
    server.post("/redis/get").add_query_param("key", "k").await.assert_text("v");
    server.put("/redis/get").add_query_param("key", "k").await.assert_text("v");
    server.delete("/redis/get").add_query_param("key", "k").await.assert_text("v");
}

#[tokio::test]
async fn test_get_missing_key_returns_empty_body() {
    let (server, _) = server();

    let response = server.get("/redis/get").add_query_param("key", "absent").await;
    response.assert_status_ok();
    response.assert_text("");
}

#[tokio::test]
async fn test_missing_key_param() {
    let (server, _) = server();

    server.get("/redis/set").await.assert_text("false");
    server.get("/redis/get").await.assert_text("");
    server.get("/redis/set").add_query_param("key", "").await.assert_text("false");
}

#[tokio::test]
async fn test_get_wrong_type_returns_empty_body() {
    let (server, state) = server();
    state.kv.l_push("queue", "a").await.unwrap();

    server.get("/redis/get").add_query_param("key", "queue").await.assert_text("");
}
