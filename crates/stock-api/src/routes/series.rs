//! 추적 심볼 관리 endpoint.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use stock_core::{Series, SeriesKey};
use tracing::info;
use validator::Validate;

use crate::error::{data_error, validation_error, ApiResult};
use crate::state::AppState;

/// 심볼 목록 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct SeriesListResponse {
    pub series: Vec<Series>,
    pub total: usize,
}

/// 심볼 등록 요청.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterSeriesRequest {
    /// 업스트림 심볼 (예: "NSE:NIFTY50-INDEX")
    #[validate(length(min = 1, max = 64, message = "티커는 1-64자여야 합니다"))]
    pub ticker: String,
    /// 거래소 (기본: 설정값)
    #[serde(default)]
    #[validate(length(min = 1, max = 16, message = "거래소는 1-16자여야 합니다"))]
    pub exchange: Option<String>,
}

/// 심볼 목록 조회.
///
/// GET /api/v1/series
pub async fn list_series(State(state): State<Arc<AppState>>) -> ApiResult<Json<SeriesListResponse>> {
    let series = state.store.list_series().await.map_err(data_error)?;
    let total = series.len();

    Ok(Json(SeriesListResponse { series, total }))
}

/// 심볼 등록 (이미 있으면 활성화).
///
/// POST /api/v1/series
pub async fn register_series(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterSeriesRequest>,
) -> ApiResult<(StatusCode, Json<Series>)> {
    let request = RegisterSeriesRequest {
        ticker: request.ticker.trim().to_string(),
        exchange: request.exchange.map(|e| e.trim().to_string()),
    };
    request.validate().map_err(validation_error)?;

    let exchange = request
        .exchange
        .unwrap_or_else(|| state.config.series_exchange.clone());
    let key = SeriesKey::new(request.ticker, exchange);

    let series = state
        .store
        .register_series(&key)
        .await
        .map_err(data_error)?;

    info!(series = %key, id = series.id, "심볼 등록");
    Ok((StatusCode::CREATED, Json(series)))
}

/// 심볼 라우터 생성.
pub fn series_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_series).post(register_series))
}
