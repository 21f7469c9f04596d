//! 캐싱 레이어.
//!
//! - Series 캐시: 종목 코드별 일봉 시계열 TTL 캐시

pub mod series;

pub use series::{SeriesCache, SeriesCacheStats};
