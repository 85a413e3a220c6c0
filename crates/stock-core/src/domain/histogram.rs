//! 일간 변동폭(종가 - 시가) 히스토그램.
//!
//! 고정 임계값 테이블을 기준으로 14개 구간에 캔들 수를 집계합니다.
//!
//! | 구간 | 범위 |
//! |------|------|
//! | `-300 and below` | change <= -300 |
//! | `-300 to -250` … `-50 to 0` | (-d, -d + 50], 단 0은 제외 |
//! | `0 to 50` … `250 to 300` | [d - 50, d) |
//! | `300 and above` | change >= 300 |

use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::Candle;

/// 정렬된 구간 경계값.
pub const CHANGE_THRESHOLDS: [i64; 13] = [
    -300, -250, -200, -150, -100, -50, 0, 50, 100, 150, 200, 250, 300,
];

/// 히스토그램 구간 하나.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramBucket {
    pub label: String,
    pub count: u64,
}

/// 변동폭 히스토그램.
///
/// JSON으로는 구간 순서를 유지한 `{label: count}` 객체로 직렬화됩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeHistogram {
    buckets: Vec<HistogramBucket>,
}

impl Default for ChangeHistogram {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeHistogram {
    /// 모든 구간이 0인 히스토그램 생성.
    pub fn new() -> Self {
        let first = CHANGE_THRESHOLDS[0];
        let last = CHANGE_THRESHOLDS[CHANGE_THRESHOLDS.len() - 1];

        let mut labels = Vec::with_capacity(CHANGE_THRESHOLDS.len() + 1);
        labels.push(format!("{} and below", first));
        labels.extend(
            CHANGE_THRESHOLDS
                .windows(2)
                .map(|w| format!("{} to {}", w[0], w[1])),
        );
        labels.push(format!("{} and above", last));

        Self {
            buckets: labels
                .into_iter()
                .map(|label| HistogramBucket { label, count: 0 })
                .collect(),
        }
    }

    /// 캔들 목록으로 히스토그램 생성.
    pub fn from_candles<'a>(candles: impl IntoIterator<Item = &'a Candle>) -> Self {
        let mut histogram = Self::new();
        for candle in candles {
            histogram.record(candle.change());
        }
        histogram
    }

    /// 변동폭이 속하는 구간 인덱스.
    ///
    /// 음수는 상한 포함, 0 이상은 하한 포함 규칙으로 경계값을 이진 탐색합니다.
    pub fn bucket_index(change: Decimal) -> usize {
        let thresholds = CHANGE_THRESHOLDS.map(Decimal::from);
        if change >= Decimal::ZERO {
            thresholds.partition_point(|t| *t <= change)
        } else {
            thresholds.partition_point(|t| *t < change)
        }
    }

    /// 변동폭 하나 집계.
    pub fn record(&mut self, change: Decimal) {
        let index = Self::bucket_index(change);
        self.buckets[index].count += 1;
    }

    /// 구간 목록 (순서 유지).
    pub fn buckets(&self) -> &[HistogramBucket] {
        &self.buckets
    }

    /// 라벨로 개수 조회.
    pub fn count(&self, label: &str) -> Option<u64> {
        self.buckets
            .iter()
            .find(|b| b.label == label)
            .map(|b| b.count)
    }

    /// 전체 집계 수.
    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).sum()
    }
}

impl Serialize for ChangeHistogram {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for bucket in &self.buckets {
            map.serialize_entry(&bucket.label, &bucket.count)?;
        }
        map.end()
    }
}
