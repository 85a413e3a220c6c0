//! API 라우트 통합 테스트 (인메모리 저장소 + 스크립트 소스 + mock Fyers 서버).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use mockito::Matcher;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use stock_api::{create_api_router, ApiConfig, AppState};
use stock_core::{
    CandleSource, DateRange, HistoryResponse, NewCandle, RawCandle, SeriesKey, SourceError,
    FYERS_INTEGRATION,
};
use stock_data::{HistoryStore, MemoryHistoryStore};
use stock_exchange::{FyersClient, FyersConfig};
use tower::ServiceExt;

/// 미리 정한 응답을 순서대로 돌려주고, 소진되면 빈 목록을 돌려주는 소스.
#[derive(Default)]
struct ScriptedSource {
    responses: Mutex<VecDeque<HistoryResponse>>,
    calls: Mutex<usize>,
}

impl ScriptedSource {
    fn new(responses: Vec<HistoryResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(0),
        })
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl CandleSource for ScriptedSource {
    async fn fetch_daily(
        &self,
        _access_token: &str,
        _symbol: &str,
        _range: &DateRange,
    ) -> Result<HistoryResponse, SourceError> {
        *self.calls.lock().unwrap() += 1;
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(HistoryResponse::Candles(vec![])))
    }
}

const SYMBOL: &str = "NSE:SBIN-EQ";

fn sbin() -> SeriesKey {
    SeriesKey::new(SYMBOL, "NSE")
}

fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
}

fn candle(n: i64, open: i64, close: i64) -> NewCandle {
    NewCandle {
        timestamp: day(n),
        open: Decimal::from(open),
        high: Decimal::from(open.max(close)),
        low: Decimal::from(open.min(close)),
        close: Decimal::from(close),
        volume: 1000,
    }
}

fn app(state: AppState) -> Router {
    create_api_router().with_state(Arc::new(state))
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

async fn seeded_store() -> Arc<MemoryHistoryStore> {
    let store = Arc::new(MemoryHistoryStore::new());
    store.register_series(&sbin()).await.unwrap();
    store
        .upsert_credential(FYERS_INTEGRATION, "token-abc", None)
        .await
        .unwrap();
    store
}

fn fyers_client(server: &mockito::Server) -> FyersClient {
    let config = FyersConfig::new(
        "APP-100".to_string(),
        "SECRET".to_string(),
        "http://localhost:3000/auth/fyers/callback".to_string(),
    )
    .with_api_base_url(server.url())
    .with_data_base_url(server.url());
    FyersClient::new(config).unwrap()
}

// ==================== 히스토그램 ====================

#[tokio::test]
async fn histogram_counts_candles_from_second_of_january() {
    let store = seeded_store().await;
    let series = store.find_active_series(&sbin()).await.unwrap().unwrap();
    store
        .insert_candles(
            series.id,
            &[
                // 1월 1일은 집계 제외
                candle(0, 100, 1000),
                candle(1, 100, 120),
                candle(2, 100, 130),
                candle(3, 500, 100),
                candle(4, 100, 100),
            ],
        )
        .await
        .unwrap();

    let response = send(
        app(AppState::new(store, ApiConfig::default())),
        "GET",
        &format!("/api/v1/stocks/{}?start_year=2024", SYMBOL),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let text = body_text(response).await;
    let histogram: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(histogram["0 to 50"], 3);
    assert_eq!(histogram["-300 and below"], 1);
    assert_eq!(histogram["300 and above"], 0);
    assert_eq!(histogram.as_object().unwrap().len(), 14);

    // 구간 순서 유지
    let lowest = text.find("-300 and below").unwrap();
    let zero = text.find("\"0 to 50\"").unwrap();
    let highest = text.find("300 and above").unwrap();
    assert!(lowest < zero && zero < highest);
}

#[tokio::test]
async fn histogram_for_unknown_symbol_is_not_found() {
    let response = send(
        app(AppState::new(
            Arc::new(MemoryHistoryStore::new()),
            ApiConfig::default(),
        )),
        "GET",
        "/api/v1/stocks/NSE:UNKNOWN-EQ",
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "SERIES_NOT_FOUND");
}

#[tokio::test]
async fn histogram_with_unrepresentable_year_is_bad_request() {
    let store = seeded_store().await;
    let response = send(
        app(AppState::new(store, ApiConfig::default())),
        "GET",
        &format!("/api/v1/stocks/{}?start_year=2147483647", SYMBOL),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_INPUT");
}

// ==================== 백필 ====================

#[tokio::test]
async fn backfill_inserts_new_candles() {
    let store = seeded_store().await;
    let raw: Vec<RawCandle> = (1..=3)
        .map(|n| RawCandle {
            timestamp: day(n).timestamp(),
            open: 600.0,
            high: 610.0,
            low: 590.0,
            close: 605.5,
            volume: 12000.0,
        })
        .collect();
    let source = ScriptedSource::new(vec![HistoryResponse::Candles(raw)]);
    let state = AppState::new(store.clone(), ApiConfig::default()).with_source(source.clone());

    let response = send(
        app(state),
        "POST",
        &format!("/api/v1/stocks/{}?start_year=2024", SYMBOL),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let outcome = body_json(response).await;
    assert_eq!(outcome["status"], "completed");
    assert_eq!(outcome["fetched"], 3);
    assert_eq!(outcome["inserted"], 3);
    assert!(source.calls() >= 1);

    let series = store.find_active_series(&sbin()).await.unwrap().unwrap();
    assert_eq!(
        store.last_candle_time(series.id).await.unwrap(),
        Some(day(3))
    );
}

#[tokio::test]
async fn backfill_upstream_failure_returns_bad_gateway_with_payload() {
    let store = seeded_store().await;
    let payload = json!({"s": "error", "code": -16, "message": "token expired"});
    let source = ScriptedSource::new(vec![HistoryResponse::Failure {
        reason: "token expired".to_string(),
        payload: payload.clone(),
    }]);
    let state = AppState::new(store.clone(), ApiConfig::default()).with_source(source);

    let response = send(
        app(state),
        "POST",
        &format!("/api/v1/stocks/{}?start_year=2024", SYMBOL),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = body_json(response).await;
    assert_eq!(body["code"], "UPSTREAM_ERROR");
    assert_eq!(body["details"], payload);
    assert_eq!(store.candle_count().await, 0);
}

#[tokio::test]
async fn backfill_without_source_is_unavailable() {
    let store = seeded_store().await;
    let response = send(
        app(AppState::new(store, ApiConfig::default())),
        "POST",
        &format!("/api/v1/stocks/{}", SYMBOL),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "FYERS_NOT_CONFIGURED");
}

#[tokio::test]
async fn backfill_rejects_out_of_range_start_year() {
    let store = seeded_store().await;
    let source = ScriptedSource::new(vec![]);
    let next_year = Utc::now().year() + 1;

    for year in [-200000, 1899, next_year] {
        let state =
            AppState::new(store.clone(), ApiConfig::default()).with_source(source.clone());
        let response = send(
            app(state),
            "POST",
            &format!("/api/v1/stocks/{}?start_year={}", SYMBOL, year),
            None,
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "year {}", year);
        assert_eq!(body_json(response).await["code"], "INVALID_INPUT");
    }

    assert_eq!(source.calls(), 0);
    assert_eq!(store.candle_count().await, 0);
}

#[tokio::test]
async fn backfill_without_credential_is_not_found() {
    let store = Arc::new(MemoryHistoryStore::new());
    store.register_series(&sbin()).await.unwrap();
    let source = ScriptedSource::new(vec![]);
    let state = AppState::new(store, ApiConfig::default()).with_source(source.clone());

    let response = send(
        app(state),
        "POST",
        &format!("/api/v1/stocks/{}", SYMBOL),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "CREDENTIAL_NOT_FOUND");
    assert_eq!(source.calls(), 0);
}

// ==================== 심볼 ====================

#[tokio::test]
async fn register_and_list_series() {
    let store = Arc::new(MemoryHistoryStore::new());
    let router = app(AppState::new(store, ApiConfig::default()));

    let response = send(
        router.clone(),
        "POST",
        "/api/v1/series",
        Some(json!({"ticker": "  NSE:NIFTY50-INDEX "})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["ticker"], "NSE:NIFTY50-INDEX");
    assert_eq!(created["exchange"], "NSE");
    assert_eq!(created["is_active"], true);

    let response = send(
        router.clone(),
        "POST",
        "/api/v1/series",
        Some(json!({"ticker": "BSE:SENSEX-INDEX", "exchange": "BSE"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(router, "GET", "/api/v1/series", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let list = body_json(response).await;
    assert_eq!(list["total"], 2);
}

#[tokio::test]
async fn register_series_with_blank_ticker_is_rejected() {
    let response = send(
        app(AppState::new(
            Arc::new(MemoryHistoryStore::new()),
            ApiConfig::default(),
        )),
        "POST",
        "/api/v1/series",
        Some(json!({"ticker": "   "})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ==================== 인증 ====================

#[tokio::test]
async fn start_auth_redirects_to_upstream() {
    let server = mockito::Server::new_async().await;
    let state = AppState::new(Arc::new(MemoryHistoryStore::new()), ApiConfig::default())
        .with_fyers(fyers_client(&server));

    let response = send(app(state), "GET", "/auth/fyers", None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.starts_with(&server.url()));
    assert!(location.contains("client_id=APP-100"));
    assert!(location.contains("response_type=code"));
}

#[tokio::test]
async fn start_auth_without_fyers_is_unavailable() {
    let response = send(
        app(AppState::new(
            Arc::new(MemoryHistoryStore::new()),
            ApiConfig::default(),
        )),
        "GET",
        "/auth/fyers",
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn callback_without_code_is_bad_request() {
    let server = mockito::Server::new_async().await;
    let state = AppState::new(Arc::new(MemoryHistoryStore::new()), ApiConfig::default())
        .with_fyers(fyers_client(&server));

    let response = send(app(state), "GET", "/auth/fyers/callback", None).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn callback_stores_exchanged_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/validate-authcode")
        .match_body(Matcher::PartialJson(json!({"code": "auth-xyz"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"s":"ok","code":200,"access_token":"new-token","refresh_token":"new-refresh"}"#)
        .create_async()
        .await;

    let store = Arc::new(MemoryHistoryStore::new());
    let state = AppState::new(store.clone(), ApiConfig::default()).with_fyers(fyers_client(&server));

    let response = send(
        app(state),
        "GET",
        "/auth/fyers/callback?auth_code=auth-xyz",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    mock.assert_async().await;

    let body = body_json(response).await;
    assert_eq!(body["website"], FYERS_INTEGRATION);
    assert_eq!(body["has_refresh_token"], true);

    let credential = store
        .get_credential(FYERS_INTEGRATION)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(credential.access_token(), Some("new-token"));
}

#[tokio::test]
async fn callback_rejected_by_upstream_is_bad_gateway() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/validate-authcode")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"s":"error","code":-413,"message":"invalid auth code"}"#)
        .create_async()
        .await;

    let store = Arc::new(MemoryHistoryStore::new());
    let state = AppState::new(store.clone(), ApiConfig::default()).with_fyers(fyers_client(&server));

    let response = send(
        app(state),
        "GET",
        "/auth/fyers/callback?auth_code=bad",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = body_json(response).await;
    assert_eq!(body["code"], "UPSTREAM_ERROR");
    assert_eq!(body["details"]["message"], "invalid auth code");
    assert!(store
        .get_credential(FYERS_INTEGRATION)
        .await
        .unwrap()
        .is_none());
}
