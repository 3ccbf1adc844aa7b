use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use solana_whale_watcher::api::{create_router, AppState};
use solana_whale_watcher::blockchain::{BlockScanner, SolanaRpcClient};
use solana_whale_watcher::pipeline::Pipeline;
use solana_whale_watcher::prices::PriceResolver;
use solana_whale_watcher::registry::TokenRegistry;

const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

fn test_registry() -> Arc<TokenRegistry> {
    let token_list = serde_json::json!({
        "name": "Test Token List",
        "tokens": [
            {
                "chainId": 101,
                "address": USDC_MINT,
                "symbol": "USDC",
                "name": "USD Coin",
                "decimals": 6,
                "extensions": {"coingeckoId": "usd-coin"}
            }
        ]
    });

    let registry = TokenRegistry::from_token_list(&token_list.to_string())
        .expect("Fixture token list should parse");
    Arc::new(registry)
}

/// Mount a mock node answering getSlot with `slot` and getBlock with `block`
async fn mount_single_block_node(server: &MockServer, slot: u64, block: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(move |request: &wiremock::Request| {
            let body: Value =
                serde_json::from_slice(&request.body).expect("RPC request body should be JSON");
            let result = match body["method"].as_str() {
                Some("getSlot") => serde_json::json!(slot),
                _ => block.clone(),
            };
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": result
            }))
        })
        .mount(server)
        .await;
}

fn usdc_block(amount: &str) -> serde_json::Value {
    serde_json::json!({
        "blockhash": "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N",
        "parentSlot": 0,
        "transactions": [
            {
                "transaction": {
                    "message": {
                        "instructions": [
                            {
                                "programId": "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA",
                                "parsed": {
                                    "type": "transferChecked",
                                    "info": {
                                        "source": "3emsAVdmGKERbHjmGfQ6oZ1e35dkf5iYcS6U4CPKFVaa",
                                        "destination": "58V21myqqDsnqmGgGukbiuGjy9NqTaUeSfFLnDjqV9EV",
                                        "mint": USDC_MINT,
                                        "tokenAmount": {
                                            "amount": amount,
                                            "decimals": 6,
                                            "uiAmount": null,
                                            "uiAmountString": amount
                                        }
                                    }
                                }
                            }
                        ]
                    }
                }
            }
        ]
    })
}

/// Helper to build an app backed by mock collaborators
fn create_test_app(
    rpc_uri: String,
    price_uri: String,
    window_size: u64,
    threshold_usd: f64,
    deadline: Duration,
) -> Router {
    let scanner = BlockScanner::new(SolanaRpcClient::new(rpc_uri), window_size);
    let resolver = PriceResolver::new(price_uri);
    let pipeline = Pipeline::new(scanner, resolver, test_registry(), threshold_usd, deadline);

    create_router(AppState {
        pipeline: Arc::new(pipeline),
    })
}

#[tokio::test]
async fn test_transactions_endpoint_returns_enriched_array() {
    let rpc_server = MockServer::start().await;
    let price_server = MockServer::start().await;

    let slot = 250_100_000u64;
    mount_single_block_node(&rpc_server, slot, usdc_block("7500000000")).await;

    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "usd-coin": {"usd": 1.0}
        })))
        .mount(&price_server)
        .await;

    let app = create_test_app(
        rpc_server.uri(),
        price_server.uri(),
        1,
        1000.0,
        Duration::from_secs(10),
    );

    let request = Request::builder()
        .uri("/transactions")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("application/json"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();

    let transfers = json.as_array().expect("Body should be a JSON array");
    assert_eq!(transfers.len(), 1);

    let transfer = &transfers[0];
    assert_eq!(transfer["slot"], slot);
    assert_eq!(transfer["mint"], USDC_MINT);
    assert_eq!(transfer["raw_amount"], 7_500_000_000u64);
    assert_eq!(transfer["decimals"], 6);
    assert_eq!(transfer["amount"], 7500.0);
    assert_eq!(transfer["usd_value"], 7500.0);
    assert_eq!(transfer["feed_id"], "usd-coin");
    assert_eq!(transfer["unit_price"], 1.0);
    assert!(transfer.get("source").is_some());
    assert!(transfer.get("destination").is_some());
}

#[tokio::test]
async fn test_transactions_endpoint_returns_empty_array() {
    let rpc_server = MockServer::start().await;
    let price_server = MockServer::start().await;

    // Node has no latest slot; the request still succeeds with []
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": null
        })))
        .mount(&rpc_server)
        .await;

    let app = create_test_app(
        rpc_server.uri(),
        price_server.uri(),
        5,
        1000.0,
        Duration::from_secs(10),
    );

    let request = Request::builder()
        .uri("/transactions")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, serde_json::json!([]));
}

#[tokio::test]
async fn test_transactions_endpoint_reports_internal_errors() {
    let rpc_server = MockServer::start().await;
    let price_server = MockServer::start().await;

    // Stall the node past the pipeline deadline
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": 250_100_000u64
                }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&rpc_server)
        .await;

    let app = create_test_app(
        rpc_server.uri(),
        price_server.uri(),
        1,
        1000.0,
        Duration::from_secs(1),
    );

    let request = Request::builder()
        .uri("/transactions")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();

    let error = json["error"].as_str().expect("Error field should be a string");
    assert!(!error.is_empty());
    assert_eq!(
        json.as_object().unwrap().len(),
        1,
        "Error payload carries only the error field"
    );
}

#[tokio::test]
async fn test_health_endpoint() {
    let rpc_server = MockServer::start().await;
    let price_server = MockServer::start().await;

    let app = create_test_app(
        rpc_server.uri(),
        price_server.uri(),
        4,
        2500.0,
        Duration::from_secs(10),
    );

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "healthy");
    assert_eq!(json["registry_tokens"], 1);
    assert_eq!(json["window_size"], 4);
    assert_eq!(json["threshold_usd"], 2500.0);
}

#[tokio::test]
async fn test_cors_allows_cross_origin_requests() {
    let rpc_server = MockServer::start().await;
    let price_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": null
        })))
        .mount(&rpc_server)
        .await;

    let app = create_test_app(
        rpc_server.uri(),
        price_server.uri(),
        1,
        1000.0,
        Duration::from_secs(10),
    );

    let request = Request::builder()
        .uri("/transactions")
        .header("origin", "https://dashboard.example.com")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
