//! End-to-end tests over real sockets, including the admin API.

use std::time::Duration;

use jobmarket_gateway::config::GatewayConfig;
use reqwest::StatusCode;
use serde_json::Value;

mod common;

#[tokio::test]
async fn test_connection_address_keys_clients() {
    let gateway = common::spawn_gateway(common::test_config(60_000, 2)).await;
    let client = common::client();

    for expected in ["1", "0"] {
        let res = client.get(gateway.url("/api/jobs")).send().await.expect("gateway unreachable");
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()["x-ratelimit-remaining"], expected);
    }

    let res = client.get(gateway.url("/api/jobs")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(res.headers().contains_key("retry-after"));

    // Same socket address, different forwarded identity: fresh quota.
    let res = client
        .get(gateway.url("/api/jobs"))
        .header("x-forwarded-for", "192.0.2.50")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    gateway.stop().await;
}

#[tokio::test]
async fn test_admin_inspect_and_sweep() {
    let gateway = common::spawn_gateway(common::test_config(200, 5)).await;
    let client = common::client();

    client
        .get(gateway.url("/api/skills"))
        .header("x-forwarded-for", "198.51.100.77")
        .send()
        .await
        .unwrap();

    let res = client
        .get(gateway.admin_url("/admin/limits/198.51.100.77"))
        .bearer_auth(common::ADMIN_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["key"], "rate_limit:198.51.100.77");
    assert_eq!(body["count"], 1);
    assert_eq!(body["remaining"], 4);

    let res = client
        .get(gateway.admin_url("/admin/status"))
        .bearer_auth(common::ADMIN_KEY)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["tracked_keys"], 1);
    assert_eq!(body["max_requests"], 5);

    tokio::time::sleep(Duration::from_millis(300)).await;

    let res = client
        .get(gateway.admin_url("/admin/limits/198.51.100.77"))
        .bearer_auth(common::ADMIN_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(gateway.admin_url("/admin/sweep"))
        .bearer_auth(common::ADMIN_KEY)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["evicted"], 1);
    assert_eq!(body["tracked_keys"], 0);

    gateway.stop().await;
}

#[tokio::test]
async fn test_admin_requires_bearer_key() {
    let gateway = common::spawn_gateway(common::test_config(60_000, 5)).await;
    let client = common::client();

    let res = client.get(gateway.admin_url("/admin/status")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(gateway.admin_url("/admin/status"))
        .bearer_auth("wrong-key")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    gateway.stop().await;
}

#[tokio::test]
async fn test_sweeper_runs_with_server() {
    let mut config: GatewayConfig = common::test_config(50, 5);
    config.rate_limit.sweep_interval_secs = 1;
    config.rate_limit.sweep_grace_ms = 0;
    let gateway = common::spawn_gateway(config).await;
    let client = common::client();

    client
        .get(gateway.url("/api/jobs"))
        .header("x-forwarded-for", "198.51.100.1")
        .send()
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(2_500)).await;

    let res = client
        .get(gateway.admin_url("/admin/status"))
        .bearer_auth(common::ADMIN_KEY)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["tracked_keys"], 0);

    gateway.stop().await;
}
