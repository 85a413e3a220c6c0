//! 인메모리 스토리지 구현.
//!
//! 데이터베이스 없이 백필/라우트를 검증할 때 사용합니다.
//! PostgreSQL 구현과 같은 고유 제약을 흉내냅니다.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stock_core::{Candle, Credential, NewCandle, Series, SeriesKey};
use tokio::sync::Mutex;

use super::HistoryStore;
use crate::error::Result;

#[derive(Default)]
struct Tables {
    series: Vec<Series>,
    credentials: Vec<Credential>,
    /// (series_id, timestamp) → candle
    candles: BTreeMap<(i32, DateTime<Utc>), Candle>,
    next_candle_id: i64,
}

/// 인메모리 [`HistoryStore`].
#[derive(Default)]
pub struct MemoryHistoryStore {
    tables: Mutex<Tables>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 전체 캔들 수.
    pub async fn candle_count(&self) -> usize {
        self.tables.lock().await.candles.len()
    }

    /// 비활성 상태의 심볼 행 추가 (테스트 준비용).
    pub async fn insert_inactive_series(&self, key: &SeriesKey) -> Series {
        let mut tables = self.tables.lock().await;
        let series = Series {
            id: tables.series.len() as i32 + 1,
            ticker: key.ticker.clone(),
            exchange: key.exchange.clone(),
            is_active: false,
        };
        tables.series.push(series.clone());
        series
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn find_active_series(&self, key: &SeriesKey) -> Result<Option<Series>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .series
            .iter()
            .find(|s| s.is_active && s.ticker == key.ticker && s.exchange == key.exchange)
            .cloned())
    }

    async fn list_series(&self) -> Result<Vec<Series>> {
        Ok(self.tables.lock().await.series.clone())
    }

    async fn register_series(&self, key: &SeriesKey) -> Result<Series> {
        let mut tables = self.tables.lock().await;

        let existing = tables
            .series
            .iter_mut()
            .filter(|s| s.ticker == key.ticker && s.exchange == key.exchange)
            .max_by_key(|s| (s.is_active, s.id));

        if let Some(series) = existing {
            series.is_active = true;
            return Ok(series.clone());
        }

        let series = Series {
            id: tables.series.len() as i32 + 1,
            ticker: key.ticker.clone(),
            exchange: key.exchange.clone(),
            is_active: true,
        };
        tables.series.push(series.clone());
        Ok(series)
    }

    async fn get_credential(&self, website: &str) -> Result<Option<Credential>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .credentials
            .iter()
            .find(|c| c.website == website)
            .cloned())
    }

    async fn upsert_credential(
        &self,
        website: &str,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<Credential> {
        let mut tables = self.tables.lock().await;
        let next_id = tables.credentials.len() as i32 + 1;

        match tables.credentials.iter_mut().find(|c| c.website == website) {
            Some(existing) => {
                existing.access_token = Some(access_token.to_string());
                existing.refresh_token = refresh_token.map(str::to_string);
                existing.updated_at = Utc::now();
                Ok(existing.clone())
            }
            None => {
                let credential = Credential {
                    id: next_id,
                    website: website.to_string(),
                    access_token: Some(access_token.to_string()),
                    refresh_token: refresh_token.map(str::to_string),
                    updated_at: Utc::now(),
                };
                tables.credentials.push(credential.clone());
                Ok(credential)
            }
        }
    }

    async fn last_candle_time(&self, series_id: i32) -> Result<Option<DateTime<Utc>>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .candles
            .keys()
            .filter(|(id, _)| *id == series_id)
            .map(|(_, ts)| *ts)
            .max())
    }

    async fn insert_candles(&self, series_id: i32, candles: &[NewCandle]) -> Result<u64> {
        let mut tables = self.tables.lock().await;
        let mut inserted = 0;

        for candle in candles {
            let key = (series_id, candle.timestamp);
            if tables.candles.contains_key(&key) {
                continue;
            }
            tables.next_candle_id += 1;
            let row = Candle {
                id: tables.next_candle_id,
                series_id,
                timestamp: candle.timestamp,
                open: candle.open,
                high: candle.high,
                low: candle.low,
                close: candle.close,
                volume: candle.volume,
            };
            tables.candles.insert(key, row);
            inserted += 1;
        }

        Ok(inserted)
    }

    async fn candles_since(&self, series_id: i32, since: DateTime<Utc>) -> Result<Vec<Candle>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .candles
            .range((series_id, since)..)
            .take_while(|((id, _), _)| *id == series_id)
            .map(|(_, candle)| candle.clone())
            .collect())
    }
}
