//! 종목별 히스토그램/백필 endpoint.
//!
//! - `GET /api/v1/stocks/{symbol}`: 저장된 일봉의 변동폭 히스토그램
//! - `POST /api/v1/stocks/{symbol}`: 마지막 저장 시점 이후 일봉 백필

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use stock_core::{time_unit, year_start, ChangeHistogram, SeriesKey};
use stock_data::BackfillOutcome;
use tracing::{debug, info};

use crate::error::{api_error, backfill_error, data_error, ApiResult};
use crate::state::AppState;

/// 허용하는 가장 이른 시작 연도.
pub const MIN_START_YEAR: i32 = 1900;

/// 시작 연도 쿼리 파라미터.
#[derive(Debug, Default, Deserialize)]
pub struct StockQuery {
    /// 시작 연도 (기본: 설정값, 보통 2001)
    pub start_year: Option<i32>,
}

fn series_key(state: &AppState, symbol: &str) -> ApiResult<SeriesKey> {
    let ticker = symbol.trim();
    if ticker.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "INVALID_INPUT",
            "심볼이 비어 있습니다",
        ));
    }
    Ok(SeriesKey::new(ticker, state.config.series_exchange.as_str()))
}

/// 시작 연도 결정. `MIN_START_YEAR`부터 올해까지만 허용.
fn resolve_start_year(state: &AppState, query: &StockQuery) -> ApiResult<i32> {
    let year = query.start_year.unwrap_or(state.config.backfill_start_year);
    let current = Utc::now().year();
    if !(MIN_START_YEAR..=current).contains(&year) {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "INVALID_INPUT",
            format!(
                "start_year는 {}년부터 {}년 사이여야 합니다: {}",
                MIN_START_YEAR, current, year
            ),
        ));
    }
    Ok(year)
}

/// 일간 변동폭(종가 - 시가) 히스토그램 조회.
///
/// GET /api/v1/stocks/{symbol}?start_year=2001
///
/// `start_year`년 1월 2일 이후(포함) 캔들을 집계합니다.
pub async fn get_histogram(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<StockQuery>,
) -> ApiResult<Json<ChangeHistogram>> {
    let key = series_key(&state, &symbol)?;
    let start_year = resolve_start_year(&state, &query)?;

    let since = year_start(start_year)
        .map(|start| start + time_unit())
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, "INVALID_INPUT", e.to_string()))?;

    let series = state
        .store
        .find_active_series(&key)
        .await
        .map_err(data_error)?
        .ok_or_else(|| {
            api_error(
                StatusCode::NOT_FOUND,
                "SERIES_NOT_FOUND",
                format!("심볼을 찾을 수 없습니다: {}", key),
            )
        })?;

    let candles = state
        .store
        .candles_since(series.id, since)
        .await
        .map_err(data_error)?;

    let histogram = ChangeHistogram::from_candles(&candles);
    debug!(series = %key, candles = histogram.total(), "히스토그램 집계");

    Ok(Json(histogram))
}

/// 마지막 저장 시점 이후 일봉 백필.
///
/// POST /api/v1/stocks/{symbol}?start_year=2001
pub async fn run_backfill(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<StockQuery>,
) -> ApiResult<Json<BackfillOutcome>> {
    let key = series_key(&state, &symbol)?;
    let start_year = resolve_start_year(&state, &query)?;

    let service = state.backfill_service().ok_or_else(|| {
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "FYERS_NOT_CONFIGURED",
            "캔들 데이터 소스가 설정되지 않았습니다",
        )
    })?;

    info!(series = %key, start_year, "백필 요청");
    let outcome = service
        .run(&key, start_year)
        .await
        .map_err(backfill_error)?;

    Ok(Json(outcome))
}

/// 종목 라우터 생성.
pub fn stocks_router() -> Router<Arc<AppState>> {
    Router::new().route("/{symbol}", get(get_histogram).post(run_backfill))
}
