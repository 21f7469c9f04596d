//! 분석 시스템 전반에서 사용되는 공통 타입.

mod decimal;
mod market_clock;

pub use decimal::*;
pub use market_clock::*;
