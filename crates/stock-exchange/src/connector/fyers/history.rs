//! Fyers 일봉 히스토리 조회.
//!
//! `GET {data_url}/history/` 응답을 [`HistoryResponse`]로 분류합니다.
//! - `{"s":"ok","candles":[...]}` → `Candles`
//! - `{"s":"no_data"}` → 빈 `Candles`
//! - 그 외 (에러 응답, 객체가 아님, 잘못된 캔들 튜플) → `Failure`

use async_trait::async_trait;
use serde_json::Value;
use stock_core::{CandleSource, DateRange, HistoryResponse, RawCandle, SourceError};
use tracing::{debug, instrument, warn};

use super::FyersClient;
use crate::ExchangeError;

/// 일봉 해상도.
const RESOLUTION_DAILY: &str = "D";

impl FyersClient {
    /// 구간 하나의 일봉 히스토리 조회.
    ///
    /// 업스트림이 에러 형태로 응답하면 `Ok(HistoryResponse::Failure)`를 반환하고,
    /// 전송 자체가 실패한 경우에만 `Err`를 반환합니다.
    #[instrument(skip(self, access_token, range), fields(range = %range))]
    pub async fn fetch_history(
        &self,
        access_token: &str,
        symbol: &str,
        range: &DateRange,
    ) -> Result<HistoryResponse, ExchangeError> {
        let url = format!("{}/history/", self.config.data_base_url);
        let query = [
            ("symbol", symbol.to_string()),
            ("resolution", RESOLUTION_DAILY.to_string()),
            ("date_format", "0".to_string()),
            ("range_from", range.start.timestamp().to_string()),
            ("range_to", range.end.timestamp().to_string()),
            ("cont_flag", "1".to_string()),
        ];

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header(access_token))
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let payload = match serde_json::from_str::<Value>(&body) {
            Ok(value) => value,
            Err(e) => {
                warn!(%status, "History response is not JSON: {}", e);
                return Ok(HistoryResponse::failure(
                    format!("JSON이 아닌 응답 (HTTP {})", status),
                    Value::String(body),
                ));
            }
        };

        let history = parse_history_payload(payload);
        match &history {
            HistoryResponse::Candles(candles) => {
                debug!(count = candles.len(), "History chunk fetched");
            }
            HistoryResponse::Failure { reason, .. } => {
                warn!(%status, "History request failed: {}", reason);
            }
        }

        Ok(history)
    }
}

/// 히스토리 응답 JSON 분류.
pub fn parse_history_payload(payload: Value) -> HistoryResponse {
    let Some(object) = payload.as_object() else {
        return HistoryResponse::failure("응답이 JSON 객체가 아님", payload);
    };

    match object.get("s").and_then(Value::as_str) {
        Some("ok") => {}
        Some("no_data") => return HistoryResponse::Candles(Vec::new()),
        other => {
            let reason = object
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("알 수 없는 상태: {:?}", other));
            return HistoryResponse::failure(reason, payload);
        }
    }

    let Some(candles) = object.get("candles") else {
        return HistoryResponse::failure("candles 필드 없음", payload);
    };

    match serde_json::from_value::<Vec<RawCandle>>(candles.clone()) {
        Ok(candles) => HistoryResponse::Candles(candles),
        Err(e) => HistoryResponse::failure(format!("잘못된 캔들 형식: {}", e), payload),
    }
}

#[async_trait]
impl CandleSource for FyersClient {
    async fn fetch_daily(
        &self,
        access_token: &str,
        symbol: &str,
        range: &DateRange,
    ) -> Result<HistoryResponse, SourceError> {
        self.fetch_history(access_token, symbol, range)
            .await
            .map_err(SourceError::from)
    }
}
