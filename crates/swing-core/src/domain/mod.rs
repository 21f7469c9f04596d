//! 패턴 분석을 위한 도메인 모델.

mod instrument;
mod pattern;
mod price;

pub use instrument::*;
pub use pattern::*;
pub use price::*;
