// HTTP gateway client tests against a mock server

use mockito::{Matcher, Server};
use rust_decimal_macros::dec;
use serde_json::json;
use std::time::Duration;
use subnet_stake_watcher::{
    ChainClient, HttpChainClient, StakeRequest, SubmitOptions, SubmitOutcome, WatcherError,
};

const ENDPOINT: &str = "ws://127.0.0.1:9944";

fn client_for(server: &Server) -> HttpChainClient {
    HttpChainClient::new(&server.url(), ENDPOINT, Duration::from_secs(5))
        .expect("Failed to build client")
}

fn stake_request() -> StakeRequest {
    StakeRequest {
        wallet: "c0".to_string(),
        hotkey_ss58: "5HotkeyA".to_string(),
        netuid: 117,
        amount: dec!(0.5),
        options: SubmitOptions::default(),
    }
}

#[tokio::test]
async fn test_price_query() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/subnets/117/price")
        .match_header("x-chain-endpoint", ENDPOINT)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"price": "0.001634"}"#)
        .create_async()
        .await;

    let price = client_for(&server).get_price(117).await.expect("price query failed");

    assert_eq!(price, dec!(0.001634));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_balance_and_stake_queries() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/accounts/5ColdkeyA/balance")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"free": 1.25}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/v1/hotkeys/5HotkeyA/stake/0")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"stake": "42.5"}"#)
        .create_async()
        .await;

    let client = client_for(&server);

    assert_eq!(client.get_balance("5ColdkeyA").await.expect("balance"), dec!(1.25));
    assert_eq!(client.get_stake("5HotkeyA", 0).await.expect("stake"), dec!(42.5));
}

#[tokio::test]
async fn test_subnet_hotkeys() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/subnets/117/hotkeys")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"hotkeys": ["5Alpha", "5Beta"]}"#)
        .create_async()
        .await;

    let hotkeys = client_for(&server).subnet_hotkeys(117).await.expect("hotkeys");
    assert_eq!(hotkeys, vec!["5Alpha".to_string(), "5Beta".to_string()]);
}

#[tokio::test]
async fn test_server_error_is_query_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/subnets/117/price")
        .with_status(502)
        .with_body("node unreachable")
        .create_async()
        .await;

    match client_for(&server).get_price(117).await {
        Err(WatcherError::Query(msg)) => {
            assert!(msg.contains("502"));
            assert!(msg.contains("node unreachable"));
        }
        other => panic!("expected query error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_query_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/subnets/117/price")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"value": 1}"#)
        .create_async()
        .await;

    let result = client_for(&server).get_price(117).await;
    assert!(matches!(result, Err(WatcherError::Query(_))));
}

#[tokio::test]
async fn test_submit_stake_outcomes() {
    let mut server = Server::new_async().await;
    let confirmed = server
        .mock("POST", "/v1/extrinsics/add_stake")
        .match_header("x-chain-endpoint", ENDPOINT)
        .match_body(Matcher::PartialJson(json!({
            "wallet": "c0",
            "hotkey_ss58": "5HotkeyA",
            "netuid": 117
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": true}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let outcome = client.submit_stake(&stake_request()).await.expect("submit failed");

    assert_eq!(outcome, SubmitOutcome::Confirmed);
    confirmed.assert_async().await;
}

#[tokio::test]
async fn test_submit_unstake_rejected_and_unknown() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v1/extrinsics/remove_stake")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": false, "message": "rate tolerance exceeded"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    assert_eq!(
        client.submit_unstake(&stake_request()).await.expect("submit failed"),
        SubmitOutcome::Rejected
    );

    server.reset_async().await;
    server
        .mock("POST", "/v1/extrinsics/remove_stake")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "submitted"}"#)
        .create_async()
        .await;

    assert_eq!(
        client.submit_unstake(&stake_request()).await.expect("submit failed"),
        SubmitOutcome::Unknown
    );
}

#[tokio::test]
async fn test_submit_http_error_is_submission_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v1/extrinsics/add_stake")
        .with_status(500)
        .with_body("signer locked")
        .create_async()
        .await;

    match client_for(&server).submit_stake(&stake_request()).await {
        Err(WatcherError::Submission(msg)) => assert!(msg.contains("signer locked")),
        other => panic!("expected submission error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_gateway_is_query_error() {
    // Nothing listens on port 9 locally
    let client = HttpChainClient::new("http://127.0.0.1:9", ENDPOINT, Duration::from_secs(2))
        .expect("Failed to build client");

    let error = client.get_price(117).await.expect_err("query should fail");
    assert!(matches!(error, WatcherError::Query(_)));
    assert!(error.is_retryable());
}
