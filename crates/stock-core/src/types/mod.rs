//! 공용 값 타입.

pub mod range;

pub use range::*;
