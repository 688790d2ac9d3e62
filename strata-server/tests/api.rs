//! Router-level tests that exercise routing and error mapping without a
//! database. Handlers that reach a shard database are covered by the ignored
//! live tests in strata-shard.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use strata_server::api;
use strata_server::state::AppState;
use strata_shard::prelude::*;

fn test_state() -> AppState {
    let config = ShardConfig::builder()
        .shard_count(3)
        .endpoints(vec![
            ProxyEndpoint::new("pgbouncer1", 6432),
            ProxyEndpoint::new("pgbouncer2", 6432),
        ])
        .user("test")
        .password("test")
        .build()
        .unwrap();
    AppState::new(ShardRegistry::new(config))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn generate_workspaces_reports_distribution() {
    let app = api::router(test_state());

    let response = app
        .oneshot(
            Request::get("/api/generate-workspaces?count=12")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["workspaces"].as_array().unwrap().len(), 12);

    let distribution = json["distribution"].as_object().unwrap();
    for shard in ["shard0", "shard1", "shard2"] {
        assert!(distribution.contains_key(shard), "missing {shard}");
    }
    let total: u64 = distribution.values().map(|v| v.as_u64().unwrap()).sum();
    assert_eq!(total, 12);
}

#[tokio::test]
async fn generate_workspaces_defaults_to_ten() {
    let app = api::router(test_state());

    let response = app
        .oneshot(
            Request::get("/api/generate-workspaces")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["workspaces"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn create_block_rejects_malformed_workspace_id() {
    let app = api::router(test_state());

    let response = app
        .oneshot(
            Request::post("/api/blocks")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"workspaceId": "short"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "invalid workspace id");
}

#[tokio::test]
async fn update_block_rejects_malformed_workspace_id() {
    let app = api::router(test_state());

    let response = app
        .oneshot(
            Request::put("/api/blocks/4a1f0fd0-2cbb-4d31-b2b9-1f4f3bd4b0aa")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"workspaceId": "not-hex-xxxxxxxx", "properties": {}}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "invalid workspace id");
}

#[tokio::test]
async fn list_blocks_rejects_malformed_workspace_id() {
    let app = api::router(test_state());

    let response = app
        .oneshot(
            Request::get("/api/workspaces/short/blocks")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_routing_never_creates_pools() {
    let state = test_state();
    let app = api::router(state.clone());

    let response = app
        .oneshot(
            Request::get("/api/workspaces/short/blocks")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(state.registry.pool_count(), 0);
}
