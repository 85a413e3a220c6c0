//! 도메인 모델.

pub mod candle;
pub mod candle_source;
pub mod credential;
pub mod histogram;
pub mod series;

pub use candle::{Candle, HistoryResponse, NewCandle, RawCandle};
pub use candle_source::{CandleSource, SourceError};
pub use credential::{Credential, FYERS_INTEGRATION};
pub use histogram::{ChangeHistogram, HistogramBucket, CHANGE_THRESHOLDS};
pub use series::{Series, SeriesKey};
