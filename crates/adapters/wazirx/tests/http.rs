// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Integration tests for the WazirX HTTP client using a mock Axum server.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Router,
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use rstest::rstest;
use rust_decimal_macros::dec;
use serde_json::json;
use tokio::sync::Mutex;
use wazirx::{
    WazirxErrorKind, WazirxHttpClient, WazirxHttpConfig, WazirxOrderSide, WazirxOrderStatus,
    http::models::WazirxPlaceOrderParams,
};
use wazirx_cryptography::hmac_signature;

const API_KEY: &str = "integration-key";
const API_SECRET: &str = "integration-secret";

#[derive(Clone, Default)]
struct TestServerState {
    request_count: Arc<Mutex<usize>>,
    last_body: Arc<Mutex<Option<String>>>,
}

/// Checks the `signature` field closing `payload` against the rest of it.
fn has_valid_signature(headers: &HeaderMap, payload: &str) -> bool {
    let api_key_ok = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == API_KEY);

    let Some((canonical, signature)) = payload.rsplit_once("&signature=") else {
        return false;
    };
    api_key_ok
        && canonical.contains("recvWindow=")
        && canonical.contains("timestamp=")
        && hmac_signature(API_SECRET.as_bytes(), canonical) == signature
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"code": 2005, "message": "Signature is incorrect."})),
    )
        .into_response()
}

fn ticker_json() -> serde_json::Value {
    json!({
        "symbol": "btcinr",
        "baseAsset": "btc",
        "quoteAsset": "inr",
        "openPrice": "5000000.0",
        "lowPrice": "4900000.0",
        "highPrice": "5100000.0",
        "lastPrice": "5050000.0",
        "volume": "12.5",
        "bidPrice": "5049000.0",
        "askPrice": "5051000.0",
        "at": 1_700_000_000_000u64
    })
}

fn order_json(status: &str) -> serde_json::Value {
    json!({
        "id": 42,
        "clientOrderId": "it-1",
        "symbol": "btcinr",
        "price": "5000000",
        "origQty": "0.001",
        "executedQty": "0",
        "status": status,
        "type": "limit",
        "side": "buy",
        "createdTime": 1_700_000_000_000u64,
        "updatedTime": 1_700_000_000_000u64
    })
}

async fn bump(state: &TestServerState) -> usize {
    let mut count = state.request_count.lock().await;
    *count += 1;
    *count
}

async fn handle_funds(
    State(state): State<TestServerState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    bump(&state).await;
    if !has_valid_signature(&headers, query.as_deref().unwrap_or_default()) {
        return unauthorized();
    }
    Json(json!([
        {"asset": "inr", "free": "1000.0", "locked": "0.0"},
        {"asset": "btc", "free": "0.5", "locked": "0.1"}
    ]))
    .into_response()
}

async fn handle_ticker(State(state): State<TestServerState>, RawQuery(query): RawQuery) -> Response {
    bump(&state).await;
    let query = query.unwrap_or_default();
    let fields: Vec<&str> = query.split('&').collect();
    let unsigned_public = fields.contains(&"symbol=btcinr")
        && fields.contains(&"recvWindow=2000")
        && fields.iter().any(|field| field.starts_with("timestamp="))
        && !fields.iter().any(|field| field.starts_with("signature="));
    if !unsigned_public {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "unexpected query"})),
        )
            .into_response();
    }
    Json(ticker_json()).into_response()
}

async fn handle_rate_limited(State(state): State<TestServerState>) -> Response {
    bump(&state).await;
    (
        StatusCode::TOO_MANY_REQUESTS,
        [("Retry-After", "2")],
        Json(json!({"message": "Rate limit exceeded"})),
    )
        .into_response()
}

async fn handle_banned(State(state): State<TestServerState>) -> Response {
    bump(&state).await;
    (
        StatusCode::IM_A_TEAPOT,
        [("Retry-After", "30")],
        Json(json!({"message": "IP banned"})),
    )
        .into_response()
}

async fn handle_flaky_tickers(State(state): State<TestServerState>) -> Response {
    if bump(&state).await == 1 {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"message": "Rate limit exceeded"})),
        )
            .into_response();
    }
    Json(json!([ticker_json()])).into_response()
}

async fn handle_slow_order_status(
    State(state): State<TestServerState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    if bump(&state).await == 1 {
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    if !has_valid_signature(&headers, query.as_deref().unwrap_or_default()) {
        return unauthorized();
    }
    Json(order_json("wait")).into_response()
}

async fn handle_place_order(
    State(state): State<TestServerState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    bump(&state).await;
    *state.last_body.lock().await = Some(body.clone());

    let form = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"));
    if !form || !has_valid_signature(&headers, &body) {
        return unauthorized();
    }
    Json(order_json("idle")).into_response()
}

fn create_router(state: TestServerState) -> Router {
    Router::new()
        .route("/sapi/v1/funds", get(handle_funds))
        .route("/sapi/v1/ticker/24hr", get(handle_ticker))
        .route("/sapi/v1/tickers/24hr", get(handle_flaky_tickers))
        .route(
            "/sapi/v1/order",
            get(handle_slow_order_status).post(handle_place_order),
        )
        .route("/sapi/v1/limited", get(handle_rate_limited))
        .route("/sapi/v1/banned", get(handle_banned))
        .with_state(state)
}

async fn start_test_server(state: TestServerState) -> SocketAddr {
    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test server");
    let addr = listener.local_addr().expect("missing local addr");

    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .await
            .expect("test server failed");
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    addr
}

fn create_client(addr: SocketAddr, retry_count: u32, timeout_ms: Option<u64>) -> WazirxHttpClient {
    let config = WazirxHttpConfig {
        base_url_http: Some(format!("http://{addr}/sapi/v1")),
        retry_count,
        http_timeout_ms: timeout_ms,
        ..WazirxHttpConfig::with_credentials(API_KEY, API_SECRET)
    };
    WazirxHttpClient::new(&config).expect("failed to create client")
}

#[rstest]
#[tokio::test]
async fn test_get_funds_is_signed() {
    let state = TestServerState::default();
    let addr = start_test_server(state.clone()).await;
    let client = create_client(addr, 0, None);

    let funds = client.get_funds(None).await.unwrap();

    assert_eq!(funds.len(), 2);
    assert_eq!(funds[1].asset.as_str(), "btc");
    assert_eq!(funds[1].locked, dec!(0.1));
}

#[rstest]
#[tokio::test]
async fn test_wrong_secret_surfaces_exchange_message() {
    let addr = start_test_server(TestServerState::default()).await;
    let config = WazirxHttpConfig {
        base_url_http: Some(format!("http://{addr}/sapi/v1")),
        ..WazirxHttpConfig::with_credentials(API_KEY, "wrong-secret")
    };
    let client = WazirxHttpClient::new(&config).unwrap();

    let error = client.get_funds(None).await.unwrap_err();

    assert_eq!(error.kind(), WazirxErrorKind::ExchangeError);
    assert_eq!(error.to_string(), "Exchange error: Signature is incorrect.");
}

#[rstest]
#[tokio::test]
async fn test_get_ticker_is_public_and_cached() {
    let state = TestServerState::default();
    let addr = start_test_server(state.clone()).await;
    let client = create_client(addr, 0, None);

    let first = client.get_ticker("btcinr", None).await.unwrap();
    let second = client.get_ticker("btcinr", None).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.last_price, dec!(5050000.0));
    assert_eq!(*state.request_count.lock().await, 1);
}

#[rstest]
#[tokio::test]
async fn test_place_order_sends_signed_form() {
    let state = TestServerState::default();
    let addr = start_test_server(state.clone()).await;
    let client = create_client(addr, 0, None);
    let params = WazirxPlaceOrderParams::limit(
        "btcinr",
        WazirxOrderSide::Buy,
        dec!(5000000),
        dec!(0.001),
    )
    .with_client_order_id("it-1");

    let order = client.place_order(&params).await.unwrap();

    assert_eq!(order.id, 42);
    assert_eq!(order.status, WazirxOrderStatus::Idle);
    let body = state.last_body.lock().await.clone().unwrap();
    assert!(body.starts_with("clientOrderId=it-1&price=5000000&quantity=0.001&recvWindow="));
    assert!(body.contains("&side=buy&symbol=btcinr&timestamp="));
}

#[rstest]
#[tokio::test]
async fn test_rate_limited_response_blocks_followups() {
    let state = TestServerState::default();
    let addr = start_test_server(state.clone()).await;
    let client = create_client(addr, 0, None);
    let spec = wazirx::RequestSpec::get("/limited").public();

    let error = client.execute(spec.clone(), None).await.unwrap_err();
    assert_eq!(error.kind(), WazirxErrorKind::RateLimitExceeded);
    assert_eq!(error.retry_after(), Some(Duration::from_secs(2)));

    // Refused locally for the Retry-After period
    let error = client.execute(spec, None).await.unwrap_err();
    assert_eq!(error.kind(), WazirxErrorKind::RateLimitExceeded);
    assert_eq!(*state.request_count.lock().await, 1);
}

#[rstest]
#[tokio::test]
async fn test_ban_blocks_every_endpoint() {
    let state = TestServerState::default();
    let addr = start_test_server(state.clone()).await;
    let client = create_client(addr, 0, None);

    let error = client
        .execute(wazirx::RequestSpec::get("/banned").public(), None)
        .await
        .unwrap_err();
    assert_eq!(error.kind(), WazirxErrorKind::Banned);

    let error = client.get_funds(Some(3)).await.unwrap_err();
    assert_eq!(error.kind(), WazirxErrorKind::Banned);
    assert!(error.retry_after().unwrap() > Duration::from_secs(25));
    assert_eq!(*state.request_count.lock().await, 1);
}

#[rstest]
#[tokio::test]
async fn test_retry_absorbs_rate_limit() {
    let state = TestServerState::default();
    let addr = start_test_server(state.clone()).await;
    let client = create_client(addr, 0, None);

    let tickers = client.get_tickers(Some(2)).await.unwrap();

    assert_eq!(tickers.len(), 1);
    assert_eq!(*state.request_count.lock().await, 2);
}

#[rstest]
#[tokio::test]
async fn test_timeout_is_retried_with_fresh_signature() {
    let state = TestServerState::default();
    let addr = start_test_server(state.clone()).await;
    let client = create_client(addr, 2, Some(200));

    let order = client.get_order_status("it-1", None).await.unwrap();

    assert_eq!(order.status, WazirxOrderStatus::Wait);
    assert_eq!(*state.request_count.lock().await, 2);
}

#[rstest]
#[tokio::test]
async fn test_timeout_without_retry_is_gateway_timeout() {
    let addr = start_test_server(TestServerState::default()).await;
    let client = create_client(addr, 0, Some(200));

    let error = client.get_order_status("it-1", None).await.unwrap_err();

    assert_eq!(error.kind(), WazirxErrorKind::GatewayTimeout);
}
